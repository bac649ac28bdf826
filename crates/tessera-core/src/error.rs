use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the Tessera workspace.
#[derive(Error, Debug)]
pub enum TesseraError {
    // ── Skill parsing errors ───────────────────────────────────
    #[error("malformed skill descriptor at {}: {reason}", path.display())]
    MalformedDescriptor { path: PathBuf, reason: String },

    #[error("not a skill directory (no SKILL.md): {}", .0.display())]
    NotASkillDirectory(PathBuf),

    // ── Skill management errors ────────────────────────────────
    #[error("skill not found: {0}")]
    SkillNotFound(String),

    #[error("skill '{name}' already exists at {}", path.display())]
    SkillExists { name: String, path: PathBuf },

    #[error("invalid skill name '{0}': use 1-64 lowercase letters, digits, and single hyphens")]
    InvalidSkillName(String),

    #[error("cannot modify built-in skill '{0}'")]
    ProtectedSkill(String),

    #[error("file '{file}' not found in skill '{skill}'")]
    HelperFileNotFound { skill: String, file: String },

    #[error("file '{file}' already exists in skill '{skill}'")]
    HelperFileExists { skill: String, file: String },

    #[error("invalid helper file name: {0}")]
    InvalidHelperFile(String),

    // ── Role errors ────────────────────────────────────────────
    #[error("unknown role '{0}': expected 'developer' or 'user'")]
    UnknownRole(String),

    // ── Config errors ──────────────────────────────────────────
    #[error("config error: {0}")]
    Config(String),

    // ── Generic wrappers ───────────────────────────────────────
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TesseraError>;

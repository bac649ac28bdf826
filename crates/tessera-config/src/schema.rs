use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration, maps to `tessera.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseraConfig {
    pub skills: SkillsConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

// ── Skills ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    /// Directory of skills shipped with the installation (e.g. the skill-authoring
    /// meta-skill). Scanned first so user skills can shadow it.
    pub builtin_dir: Option<PathBuf>,
    /// Whether `builtin_dir` is scanned at all.
    pub include_builtin: bool,
    /// Writable directory where new skills are created.
    pub user_dir: PathBuf,
    /// Additional read-only roots, scanned after `user_dir`.
    pub extra_dirs: Vec<PathBuf>,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            builtin_dir: None,
            include_builtin: true,
            user_dir: PathBuf::from("skills"),
            extra_dirs: vec![],
        }
    }
}

impl SkillsConfig {
    /// Scan roots in registry order: built-in, user, then extras.
    ///
    /// Later roots override earlier ones on name collision, so a user skill
    /// shadows a built-in skill of the same name.
    pub fn roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        let builtin = if self.include_builtin {
            self.builtin_dir.clone()
        } else {
            None
        };
        let candidates = builtin
            .into_iter()
            .chain(std::iter::once(self.user_dir.clone()))
            .chain(self.extra_dirs.iter().cloned());
        for dir in candidates {
            if !roots.contains(&dir) {
                roots.push(dir);
            }
        }
        roots
    }
}

// ── Server ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listen address.
    pub listen: String,
    /// Optional API key required as `Authorization: Bearer <key>`.
    pub api_key: Option<String>,
    /// Enable permissive CORS (for browser front-ends in development).
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8787".into(),
            api_key: None,
            cors: false,
        }
    }
}

// ── Logging ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Output format: "pretty", "compact", "json".
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

// ── Validation ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let icon = match self.severity {
            WarningSeverity::Error => "❌",
            WarningSeverity::Warning => "⚠️ ",
            WarningSeverity::Info => "💡",
        };
        write!(f, "{} {}: {}", icon, self.field, self.message)?;
        if let Some(ref h) = self.hint {
            write!(f, "\n   ↳ {}", h)?;
        }
        Ok(())
    }
}

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

impl TesseraConfig {
    /// Validate the config and return a list of warnings/errors.
    /// Returns `Err` with all messages joined if any severity is Error.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, String> {
        let mut warnings = Vec::new();

        // ── Logging ───
        if !VALID_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.level".into(),
                message: format!("unknown log level '{}'", self.logging.level),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", VALID_LEVELS.join(", "))),
            });
        }
        if !VALID_FORMATS.contains(&self.logging.format.as_str()) {
            warnings.push(ConfigWarning {
                field: "logging.format".into(),
                message: format!("unknown log format '{}'", self.logging.format),
                severity: WarningSeverity::Warning,
                hint: Some(format!("Valid values: {}", VALID_FORMATS.join(", "))),
            });
        }

        // ── Server ───
        let listen = self.server.listen.trim();
        if listen.is_empty() {
            warnings.push(ConfigWarning {
                field: "server.listen".into(),
                message: "listen address is empty".into(),
                severity: WarningSeverity::Error,
                hint: Some("Set to e.g. '127.0.0.1:8787'".into()),
            });
        } else if !is_loopback(listen) && self.server.api_key.is_none() {
            warnings.push(ConfigWarning {
                field: "server.api_key".into(),
                message: format!("server listens on {} without an API key", listen),
                severity: WarningSeverity::Warning,
                hint: Some("Set server.api_key or bind to 127.0.0.1".into()),
            });
        }

        // ── Skills ───
        if self.skills.builtin_dir.as_ref() == Some(&self.skills.user_dir) {
            warnings.push(ConfigWarning {
                field: "skills.user_dir".into(),
                message: "user_dir is the same as builtin_dir".into(),
                severity: WarningSeverity::Warning,
                hint: Some("User skills created there can never be deleted".into()),
            });
        }
        if self.skills.builtin_dir.is_some() && !self.skills.include_builtin {
            warnings.push(ConfigWarning {
                field: "skills.include_builtin".into(),
                message: "builtin_dir is set but include_builtin is false".into(),
                severity: WarningSeverity::Info,
                hint: None,
            });
        }

        let errors: Vec<String> = warnings
            .iter()
            .filter(|w| w.severity == WarningSeverity::Error)
            .map(|w| w.to_string())
            .collect();
        if !errors.is_empty() {
            return Err(errors.join("\n"));
        }

        Ok(warnings)
    }
}

fn is_loopback(listen: &str) -> bool {
    listen.starts_with("127.") || listen.starts_with("localhost") || listen.starts_with("[::1]")
}

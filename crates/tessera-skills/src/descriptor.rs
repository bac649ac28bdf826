use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tessera_core::{Role, TesseraError};
use tracing::{debug, warn};

use crate::frontmatter;

/// Descriptor file expected at the top level of every skill directory.
pub const SKILL_FILENAME: &str = "SKILL.md";
/// Version assigned when the frontmatter has none.
pub const DEFAULT_VERSION: &str = "0.1.0";
/// Longest description kept, in characters, including the `...` marker.
pub const MAX_DESCRIPTION_CHARS: usize = 1024;

const KNOWN_FIELDS: [&str; 5] = [
    "name",
    "description",
    "role-restriction",
    "allowed-tools",
    "version",
];

fn default_version() -> String {
    DEFAULT_VERSION.into()
}

/// One parsed skill.
///
/// Immutable after construction; re-parsing the directory yields a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDescriptor {
    /// Absolute path of the skill directory.
    pub path: PathBuf,
    /// Logical name. Registry key, so later scans shadow earlier ones by it.
    pub name: String,
    /// At most [`MAX_DESCRIPTION_CHARS`] characters.
    #[serde(default)]
    pub description: String,
    /// `Some("developer")` hides the skill from every other role. Any other
    /// value is kept as written.
    #[serde(default)]
    pub role_restriction: Option<String>,
    /// Tool names in source order, duplicates kept.
    #[serde(default)]
    pub allowed_tools: Vec<String>,
    #[serde(default = "default_version")]
    pub version: String,
    /// Frontmatter keys not modelled above.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
    /// The full frontmatter mapping as parsed.
    #[serde(default)]
    pub raw_metadata: Value,
}

impl SkillDescriptor {
    pub fn is_developer_only(&self) -> bool {
        self.role_restriction.as_deref() == Some("developer")
    }

    /// Developers see everything; everyone else sees all but developer-only skills.
    pub fn is_visible_to(&self, role: Role) -> bool {
        role.is_developer() || !self.is_developer_only()
    }

    pub fn declares_tool(&self, tool: &str) -> bool {
        self.allowed_tools.iter().any(|t| t == tool)
    }

    /// Path of this skill's `SKILL.md`.
    pub fn skill_file(&self) -> PathBuf {
        self.path.join(SKILL_FILENAME)
    }

    /// Every regular file in the skill directory except `SKILL.md`, sorted by name.
    pub fn helper_files(&self) -> Vec<HelperFile> {
        helper_files_in(&self.path)
    }
}

/// A file shipped next to `SKILL.md` (prompt, template, schema, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperFile {
    pub name: String,
    pub size_bytes: u64,
}

pub(crate) fn helper_files_in(dir: &Path) -> Vec<HelperFile> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<HelperFile> = entries
        .filter_map(|e| e.ok())
        .filter_map(|entry| {
            let meta = entry.metadata().ok()?;
            if !meta.is_file() {
                return None;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name == SKILL_FILENAME {
                return None;
            }
            Some(HelperFile {
                name,
                size_bytes: meta.len(),
            })
        })
        .collect();
    files.sort_by(|a, b| a.name.cmp(&b.name));
    files
}

/// A defect the parser recovered from. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkillWarning {
    /// Text before the frontmatter block was discarded.
    FrontmatterRelocated,
    /// No frontmatter block existed; one was generated.
    FrontmatterSynthesized,
    /// The block was not a valid YAML mapping; fields were recovered line by line.
    InvalidMetadataSyntax { error: String },
    MissingName { fallback: String },
    DescriptionTruncated { original_len: usize },
    /// The normalized file could not be written back.
    PersistFailed { error: String },
}

impl fmt::Display for SkillWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillWarning::FrontmatterRelocated => {
                f.write_str("frontmatter was not at the top of SKILL.md; leading text was dropped")
            }
            SkillWarning::FrontmatterSynthesized => {
                f.write_str("SKILL.md had no frontmatter; a minimal block was generated")
            }
            SkillWarning::InvalidMetadataSyntax { error } => write!(
                f,
                "frontmatter is not valid YAML ({error}); fields were recovered line by line"
            ),
            SkillWarning::MissingName { fallback } => {
                write!(f, "frontmatter has no 'name'; using directory name '{fallback}'")
            }
            SkillWarning::DescriptionTruncated { original_len } => write!(
                f,
                "description is {original_len} characters; truncated to {MAX_DESCRIPTION_CHARS}"
            ),
            SkillWarning::PersistFailed { error } => {
                write!(f, "could not write normalized SKILL.md back to disk: {error}")
            }
        }
    }
}

/// Controls the parser's only side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Write the normalized text back when it differs from what was read.
    pub persist: bool,
}

impl ParseOptions {
    /// Load path: heal the file on disk.
    pub const LOAD: Self = Self { persist: true };
    /// Validation path: never touch disk.
    pub const READ_ONLY: Self = Self { persist: false };
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::LOAD
    }
}

/// Output of [`parse_skill`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSkill {
    pub descriptor: SkillDescriptor,
    pub warnings: Vec<SkillWarning>,
    /// The descriptor file was rewritten on disk.
    pub rewritten: bool,
}

/// Parse a skill directory's descriptor file.
///
/// Only an unreadable (or non UTF-8) file is a hard failure. Every other
/// defect is repaired and reported in [`ParsedSkill::warnings`]:
///
/// - BOM / leading blank lines / missing trailing newline are normalized
/// - a block below stray text is lifted to the top
/// - no block at all: one is synthesized from the directory name and first heading
/// - invalid YAML: fields are recovered line by line
/// - missing name: the directory name is used
/// - description over [`MAX_DESCRIPTION_CHARS`]: truncated with `...`
///
/// With [`ParseOptions::persist`] the repaired text replaces the file so the
/// next parse is clean.
pub fn parse_skill(
    skill_dir: &Path,
    skill_file: &Path,
    options: ParseOptions,
) -> tessera_core::Result<ParsedSkill> {
    let bytes = std::fs::read(skill_file).map_err(|e| TesseraError::MalformedDescriptor {
        path: skill_file.to_path_buf(),
        reason: format!("cannot read file: {e}"),
    })?;
    let raw = String::from_utf8(bytes).map_err(|e| TesseraError::MalformedDescriptor {
        path: skill_file.to_path_buf(),
        reason: format!("not valid UTF-8: {e}"),
    })?;

    let path = resolve_dir(skill_dir);
    let dir_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "skill".to_string());

    let mut warnings = Vec::new();
    let normalized = frontmatter::normalize(&raw);
    if normalized.relocated {
        warnings.push(SkillWarning::FrontmatterRelocated);
    }

    let text = if frontmatter::split(&normalized.text).is_some() {
        normalized.text
    } else {
        warnings.push(SkillWarning::FrontmatterSynthesized);
        frontmatter::synthesize(&dir_name, &normalized.text, DEFAULT_VERSION)
    };

    let block = frontmatter::split(&text).map(|(block, _)| block).unwrap_or("");
    let metadata = match frontmatter::parse_metadata(block) {
        Ok(map) => map,
        Err(error) => {
            warnings.push(SkillWarning::InvalidMetadataSyntax { error });
            frontmatter::recover_fields(block)
        }
    };

    let descriptor = build_descriptor(path, &dir_name, metadata, &mut warnings);

    let mut rewritten = false;
    if options.persist && text != raw {
        match std::fs::write(skill_file, &text) {
            Ok(()) => {
                rewritten = true;
                debug!(skill = %descriptor.name, path = ?skill_file, "rewrote normalized SKILL.md");
            }
            Err(e) => warnings.push(SkillWarning::PersistFailed {
                error: e.to_string(),
            }),
        }
    }

    for w in &warnings {
        if options.persist {
            warn!(skill = %descriptor.name, path = ?skill_file, "{w}");
        } else {
            debug!(skill = %descriptor.name, path = ?skill_file, "{w}");
        }
    }

    Ok(ParsedSkill {
        descriptor,
        warnings,
        rewritten,
    })
}

fn build_descriptor(
    path: PathBuf,
    dir_name: &str,
    metadata: Map<String, Value>,
    warnings: &mut Vec<SkillWarning>,
) -> SkillDescriptor {
    let name = match metadata.get("name").and_then(scalar_string) {
        Some(n) if !n.trim().is_empty() => n,
        _ => {
            warnings.push(SkillWarning::MissingName {
                fallback: dir_name.to_string(),
            });
            dir_name.to_string()
        }
    };

    let mut description = metadata
        .get("description")
        .and_then(scalar_string)
        .unwrap_or_default();
    let original_len = description.chars().count();
    if original_len > MAX_DESCRIPTION_CHARS {
        description = description
            .chars()
            .take(MAX_DESCRIPTION_CHARS - 3)
            .chain("...".chars())
            .collect();
        warnings.push(SkillWarning::DescriptionTruncated { original_len });
    }

    let role_restriction = metadata
        .get("role-restriction")
        .and_then(scalar_string)
        .filter(|r| !r.trim().is_empty());

    let allowed_tools = metadata
        .get("allowed-tools")
        .map(parse_allowed_tools)
        .unwrap_or_default();

    let version = metadata
        .get("version")
        .and_then(scalar_string)
        .unwrap_or_else(default_version);

    let extra = metadata
        .iter()
        .filter(|(k, _)| !KNOWN_FIELDS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    SkillDescriptor {
        path,
        name,
        description,
        role_restriction,
        allowed_tools,
        version,
        extra,
        raw_metadata: Value::Object(metadata),
    }
}

/// `allowed-tools` is either a whitespace-delimited string or a list.
/// Anything else means no tools.
fn parse_allowed_tools(raw: &Value) -> Vec<String> {
    match raw {
        Value::String(s) => s.split_whitespace().map(str::to_string).collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn resolve_dir(dir: &Path) -> PathBuf {
    dir.canonicalize()
        .or_else(|_| std::path::absolute(dir))
        .unwrap_or_else(|_| dir.to_path_buf())
}

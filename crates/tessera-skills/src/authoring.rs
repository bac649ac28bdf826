//! Creating, deleting, and editing skills on disk.
//!
//! These back the `tessera skills new/delete/files` commands and the
//! matching HTTP endpoints. New skills always go into the writable user root;
//! skills found in the built-in root are protected from deletion.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tessera_core::TesseraError;
use tracing::info;

use crate::descriptor::{SkillDescriptor, DEFAULT_VERSION, SKILL_FILENAME};
use crate::registry::SkillRegistry;

const MAX_NAME_LEN: usize = 64;

/// Turn free-form input ("My Skill", "my_skill") into a kebab-case name.
pub fn normalize_skill_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .collect()
}

/// 1-64 chars of `[a-z0-9-]`, no leading/trailing hyphen, no `--`.
pub fn validate_skill_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--")
}

/// Input for [`create_skill`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewSkill {
    pub name: String,
    pub description: String,
    pub role_restriction: Option<String>,
    pub allowed_tools: Vec<String>,
    pub version: String,
    /// Markdown body. Empty means a generated heading plus placeholder comments.
    pub body: String,
}

impl Default for NewSkill {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            role_restriction: None,
            allowed_tools: Vec::new(),
            version: DEFAULT_VERSION.into(),
            body: String::new(),
        }
    }
}

impl NewSkill {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// The `SKILL.md` text this skill is created with.
    pub fn render(&self) -> String {
        let mut out = String::from("---\n");
        out.push_str(&format!("name: {}\n", yaml_scalar(&self.name)));
        out.push_str(&format!("description: {}\n", yaml_scalar(&self.description)));
        if let Some(role) = self.role_restriction.as_deref().filter(|r| !r.is_empty()) {
            out.push_str(&format!("role-restriction: {}\n", yaml_scalar(role)));
        }
        if !self.allowed_tools.is_empty() {
            out.push_str(&format!(
                "allowed-tools: {}\n",
                yaml_scalar(&self.allowed_tools.join(" "))
            ));
        }
        out.push_str(&format!("version: {}\n", yaml_scalar(&self.version)));
        out.push_str("---\n\n");

        let body = self.body.trim();
        if body.is_empty() {
            out.push_str(&format!("# {}\n\n", title_case(&self.name)));
            out.push_str("<!-- Describe what the agent should do when this skill is active. -->\n");
            out.push_str("<!-- Helper files in this directory can be referenced via read_file. -->\n");
        } else {
            out.push_str(body);
            out.push('\n');
        }
        out
    }
}

/// Plain YAML scalar, quoted only when it would not read back as the same string.
fn yaml_scalar(s: &str) -> String {
    match serde_yaml::to_string(s) {
        Ok(yaml) => yaml.trim_end_matches('\n').to_string(),
        Err(_) => format!("{s:?}"),
    }
}

fn title_case(name: &str) -> String {
    name.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scaffold a new skill directory under `root`. Returns the directory.
pub fn create_skill(root: &Path, skill: &NewSkill) -> tessera_core::Result<PathBuf> {
    if !validate_skill_name(&skill.name) {
        return Err(TesseraError::InvalidSkillName(skill.name.clone()));
    }
    let dir = root.join(&skill.name);
    if dir.exists() {
        return Err(TesseraError::SkillExists {
            name: skill.name.clone(),
            path: dir,
        });
    }

    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join(SKILL_FILENAME), skill.render())?;
    info!(skill = %skill.name, path = ?dir, "created skill");
    Ok(dir)
}

/// Delete a user skill directory.
///
/// Refuses names that exist as skills in `builtin_root` and any target that
/// resolves inside it.
pub fn delete_skill(
    user_root: &Path,
    builtin_root: Option<&Path>,
    name: &str,
) -> tessera_core::Result<PathBuf> {
    if !is_plain_component(name) {
        return Err(TesseraError::InvalidSkillName(name.to_string()));
    }

    let target = user_root.join(name);
    if let Some(builtin_root) = builtin_root {
        let builtin = SkillRegistry::from_roots(&[builtin_root]);
        if builtin.contains(name) {
            return Err(TesseraError::ProtectedSkill(name.to_string()));
        }
        if let (Ok(target), Ok(builtin_root)) = (target.canonicalize(), builtin_root.canonicalize())
        {
            if target.starts_with(&builtin_root) {
                return Err(TesseraError::ProtectedSkill(name.to_string()));
            }
        }
    }

    if !target.is_dir() {
        return Err(TesseraError::SkillNotFound(name.to_string()));
    }

    std::fs::remove_dir_all(&target)?;
    info!(skill = %name, path = ?target, "deleted skill");
    Ok(target)
}

fn is_plain_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

fn helper_path(skill: &SkillDescriptor, filename: &str) -> tessera_core::Result<PathBuf> {
    if !is_plain_component(filename) {
        return Err(TesseraError::InvalidHelperFile(filename.to_string()));
    }
    Ok(skill.path.join(filename))
}

fn reject_skill_md(filename: &str) -> tessera_core::Result<()> {
    if filename == SKILL_FILENAME {
        return Err(TesseraError::InvalidHelperFile(format!(
            "{SKILL_FILENAME} is not a helper file"
        )));
    }
    Ok(())
}

/// Write a helper file into the skill directory.
pub fn write_helper_file(
    skill: &SkillDescriptor,
    filename: &str,
    contents: &[u8],
    overwrite: bool,
) -> tessera_core::Result<PathBuf> {
    reject_skill_md(filename)?;
    let target = helper_path(skill, filename)?;
    if target.exists() && !overwrite {
        return Err(TesseraError::HelperFileExists {
            skill: skill.name.clone(),
            file: filename.to_string(),
        });
    }
    std::fs::write(&target, contents)?;
    info!(skill = %skill.name, file = %filename, bytes = contents.len(), "wrote helper file");
    Ok(target)
}

/// Read any file in the skill directory, `SKILL.md` included.
pub fn read_helper_file(skill: &SkillDescriptor, filename: &str) -> tessera_core::Result<Vec<u8>> {
    let target = helper_path(skill, filename)?;
    if !target.is_file() {
        return Err(TesseraError::HelperFileNotFound {
            skill: skill.name.clone(),
            file: filename.to_string(),
        });
    }
    Ok(std::fs::read(&target)?)
}

pub fn remove_helper_file(skill: &SkillDescriptor, filename: &str) -> tessera_core::Result<()> {
    reject_skill_md(filename)?;
    let target = helper_path(skill, filename)?;
    if !target.is_file() {
        return Err(TesseraError::HelperFileNotFound {
            skill: skill.name.clone(),
            file: filename.to_string(),
        });
    }
    std::fs::remove_file(&target)?;
    info!(skill = %skill.name, file = %filename, "removed helper file");
    Ok(())
}

/// Starter content for a new helper file, picked by extension.
pub fn helper_template(filename: &str, skill_name: &str) -> String {
    let ext = Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "md" | "txt" | "" => {
            format!("# {filename}\n\n<!-- Helper file for the '{skill_name}' skill. -->\n")
        }
        "json" => format!("{{\n  \"skill\": \"{skill_name}\"\n}}\n"),
        "yaml" | "yml" => format!("# Helper config for {skill_name}\nskill: {skill_name}\n"),
        "j2" | "jinja2" => format!("{{# Jinja2 template for {skill_name} #}}\n"),
        _ => format!("# {filename}: helper file for {skill_name}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{parse_skill, ParseOptions};

    fn load(dir: &Path) -> SkillDescriptor {
        parse_skill(dir, &dir.join(SKILL_FILENAME), ParseOptions::READ_ONLY)
            .unwrap()
            .descriptor
    }

    #[test]
    fn normalizes_names() {
        assert_eq!(normalize_skill_name("  My Skill "), "my-skill");
        assert_eq!(normalize_skill_name("data_cleaner"), "data-cleaner");
    }

    #[test]
    fn validates_names() {
        assert!(validate_skill_name("my-skill"));
        assert!(validate_skill_name("a1"));
        assert!(!validate_skill_name(""));
        assert!(!validate_skill_name("-lead"));
        assert!(!validate_skill_name("trail-"));
        assert!(!validate_skill_name("double--hyphen"));
        assert!(!validate_skill_name("Upper"));
        assert!(!validate_skill_name("under_score"));
        assert!(!validate_skill_name(&"a".repeat(65)));
        assert!(validate_skill_name(&"a".repeat(64)));
    }

    #[test]
    fn create_writes_parseable_skill() {
        let tmp = tempfile::tempdir().unwrap();
        let skill = NewSkill {
            role_restriction: Some("developer".into()),
            allowed_tools: vec!["read_file".into(), "execute".into()],
            ..NewSkill::new("report-writer", "Writes reports: weekly, monthly")
        };
        let dir = create_skill(tmp.path(), &skill).unwrap();

        let content = std::fs::read_to_string(dir.join(SKILL_FILENAME)).unwrap();
        assert!(content.contains("# Report Writer"));
        assert!(content.contains("<!-- Describe what the agent should do"));

        let d = load(&dir);
        assert_eq!(d.name, "report-writer");
        assert_eq!(d.description, "Writes reports: weekly, monthly");
        assert!(d.is_developer_only());
        assert_eq!(d.allowed_tools, vec!["read_file", "execute"]);
        assert_eq!(d.version, "0.1.0");
    }

    #[test]
    fn create_with_body_uses_it() {
        let tmp = tempfile::tempdir().unwrap();
        let skill = NewSkill {
            body: "\n# Custom\n\nDo the thing.\n\n".into(),
            ..NewSkill::new("custom", "d")
        };
        let dir = create_skill(tmp.path(), &skill).unwrap();
        let content = std::fs::read_to_string(dir.join(SKILL_FILENAME)).unwrap();
        assert!(content.ends_with("---\n\n# Custom\n\nDo the thing.\n"));
        assert!(!content.contains("role-restriction"));
        assert!(!content.contains("allowed-tools"));
    }

    #[test]
    fn create_refuses_bad_name_and_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let err = create_skill(tmp.path(), &NewSkill::new("Bad Name", "d")).unwrap_err();
        assert!(matches!(err, TesseraError::InvalidSkillName(_)));

        create_skill(tmp.path(), &NewSkill::new("dup", "d")).unwrap();
        let err = create_skill(tmp.path(), &NewSkill::new("dup", "d")).unwrap_err();
        assert!(matches!(err, TesseraError::SkillExists { .. }));
    }

    #[test]
    fn delete_protects_builtins() {
        let builtin = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        create_skill(builtin.path(), &NewSkill::new("skill-developer", "meta")).unwrap();
        create_skill(user.path(), &NewSkill::new("skill-developer", "shadow")).unwrap();

        let err = delete_skill(user.path(), Some(builtin.path()), "skill-developer").unwrap_err();
        assert!(matches!(err, TesseraError::ProtectedSkill(_)));
        assert!(user.path().join("skill-developer").is_dir());
    }

    #[test]
    fn delete_refuses_target_inside_builtin_root() {
        let builtin = tempfile::tempdir().unwrap();
        let nested = builtin.path().join("user-skills");
        std::fs::create_dir_all(nested.join("mine")).unwrap();

        let err = delete_skill(&nested, Some(builtin.path()), "mine").unwrap_err();
        assert!(matches!(err, TesseraError::ProtectedSkill(_)));
    }

    #[test]
    fn delete_removes_user_skill() {
        let user = tempfile::tempdir().unwrap();
        let dir = create_skill(user.path(), &NewSkill::new("temp", "d")).unwrap();
        delete_skill(user.path(), None, "temp").unwrap();
        assert!(!dir.exists());

        let err = delete_skill(user.path(), None, "temp").unwrap_err();
        assert!(matches!(err, TesseraError::SkillNotFound(_)));
    }

    #[test]
    fn delete_rejects_traversal() {
        let user = tempfile::tempdir().unwrap();
        let err = delete_skill(user.path(), None, "../etc").unwrap_err();
        assert!(matches!(err, TesseraError::InvalidSkillName(_)));
    }

    #[test]
    fn helper_file_lifecycle() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = create_skill(tmp.path(), &NewSkill::new("helpers", "d")).unwrap();
        let skill = load(&dir);

        write_helper_file(&skill, "prompt.md", b"# Prompt\n", false).unwrap();
        assert_eq!(read_helper_file(&skill, "prompt.md").unwrap(), b"# Prompt\n");

        let err = write_helper_file(&skill, "prompt.md", b"again", false).unwrap_err();
        assert!(matches!(err, TesseraError::HelperFileExists { .. }));
        write_helper_file(&skill, "prompt.md", b"again", true).unwrap();
        assert_eq!(read_helper_file(&skill, "prompt.md").unwrap(), b"again");

        assert_eq!(skill.helper_files().len(), 1);
        remove_helper_file(&skill, "prompt.md").unwrap();
        let err = remove_helper_file(&skill, "prompt.md").unwrap_err();
        assert!(matches!(err, TesseraError::HelperFileNotFound { .. }));
    }

    #[test]
    fn helper_file_guards() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = create_skill(tmp.path(), &NewSkill::new("guarded", "d")).unwrap();
        let skill = load(&dir);

        for bad in ["", "..", "../escape.md", "sub/file.md"] {
            let err = write_helper_file(&skill, bad, b"x", true).unwrap_err();
            assert!(matches!(err, TesseraError::InvalidHelperFile(_)), "{bad}");
        }
        let err = remove_helper_file(&skill, SKILL_FILENAME).unwrap_err();
        assert!(matches!(err, TesseraError::InvalidHelperFile(_)));
        assert!(read_helper_file(&skill, SKILL_FILENAME).is_ok());
    }

    #[test]
    fn helper_templates_by_extension() {
        assert!(helper_template("notes.md", "s").starts_with("# notes.md"));
        assert!(helper_template("README", "s").contains("'s' skill"));
        assert_eq!(helper_template("schema.json", "s"), "{\n  \"skill\": \"s\"\n}\n");
        assert!(helper_template("cfg.YML", "s").contains("skill: s"));
        assert_eq!(helper_template("page.j2", "s"), "{# Jinja2 template for s #}\n");
        assert_eq!(helper_template("run.sh", "s"), "# run.sh: helper file for s\n");
    }
}

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::descriptor::{parse_skill, ParseOptions, SKILL_FILENAME};

/// `role-restriction` values accepted by explicit validation.
///
/// Plain loading keeps any value; only this check is strict.
pub const RECOGNIZED_ROLE_RESTRICTIONS: [&str; 2] = ["developer", "user"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn finish(mut self) -> Self {
        self.valid = self.errors.is_empty();
        self
    }
}

/// Check a skill directory without modifying anything on disk.
///
/// Defects the load path would silently repair are listed as warnings here;
/// an unreadable descriptor or an unrecognised `role-restriction` is an error.
pub fn validate_skill_dir(dir: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !dir.is_dir() {
        report
            .errors
            .push(format!("{} is not a directory", dir.display()));
        return report.finish();
    }

    let skill_md = dir.join(SKILL_FILENAME);
    if !skill_md.is_file() {
        report.errors.push(format!("{SKILL_FILENAME} is missing"));
        return report.finish();
    }

    let parsed = match parse_skill(dir, &skill_md, ParseOptions::READ_ONLY) {
        Ok(parsed) => parsed,
        Err(e) => {
            report.errors.push(e.to_string());
            return report.finish();
        }
    };

    report
        .warnings
        .extend(parsed.warnings.iter().map(|w| w.to_string()));

    let skill = &parsed.descriptor;
    let unrecognized = skill
        .role_restriction
        .as_deref()
        .filter(|r| !RECOGNIZED_ROLE_RESTRICTIONS.contains(r));
    if let Some(role) = unrecognized {
        report.errors.push(format!(
            "invalid role-restriction '{role}': must be 'developer', 'user', or omitted"
        ));
    }
    if skill.description.trim().is_empty() {
        report.warnings.push("description is empty".into());
    }
    if skill.name.contains('_') && !skill.name.contains('-') {
        report.warnings.push(format!(
            "name '{}' uses underscores; prefer kebab-case",
            skill.name
        ));
    }

    report.finish()
}

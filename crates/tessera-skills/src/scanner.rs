use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::descriptor::{parse_skill, ParseOptions, SkillDescriptor, SKILL_FILENAME};

/// Walks one scan root for skill directories.
///
/// Only immediate subdirectories holding a `SKILL.md` are candidates; other
/// children are ignored. A candidate that fails to parse is reported and
/// skipped, never aborting the rest of the scan.
pub struct SkillScanner {
    root: PathBuf,
    options: ParseOptions,
}

/// A candidate directory that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanWarning {
    pub dir: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub skills: Vec<SkillDescriptor>,
    pub warnings: Vec<ScanWarning>,
}

impl SkillScanner {
    /// Scanner on the load path: repaired descriptors are written back.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_options(root, ParseOptions::LOAD)
    }

    pub fn with_options(root: impl Into<PathBuf>, options: ParseOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All skills that parsed, in lexicographic directory order.
    pub fn load(&self) -> Vec<SkillDescriptor> {
        self.scan_report().skills
    }

    /// Like [`load`](Self::load), plus the directories that were skipped and why.
    ///
    /// A missing root (or one that is not a directory) is an empty report.
    pub fn scan_report(&self) -> ScanReport {
        let mut report = ScanReport::default();

        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(root = ?self.root, error = %e, "skills root not readable, skipping");
                return report;
            }
        };

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        candidates.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        for dir in candidates {
            let skill_md = dir.join(SKILL_FILENAME);
            if !skill_md.exists() {
                continue;
            }
            match parse_skill(&dir, &skill_md, self.options) {
                Ok(parsed) => report.skills.push(parsed.descriptor),
                Err(e) => {
                    warn!(dir = ?dir, error = %e, "could not load skill");
                    report.warnings.push(ScanWarning {
                        dir,
                        reason: e.to_string(),
                    });
                }
            }
        }

        debug!(
            root = ?self.root,
            loaded = report.skills.len(),
            skipped = report.warnings.len(),
            "scanned skills root"
        );
        report
    }
}

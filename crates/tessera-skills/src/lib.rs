//! # tessera-skills
//!
//! Skills are directories containing a `SKILL.md`: YAML frontmatter followed
//! by Markdown instructions the agent reads when the skill is active. Any
//! other file in the directory is a helper file (prompt, schema, template).
//!
//! ## SKILL.md Format
//!
//! ```markdown
//! ---
//! name: report-writer
//! description: Turn raw notes into a weekly status report
//! role-restriction: developer          # optional; omit for all roles
//! allowed-tools: read_file write_file  # space-delimited string or YAML list
//! version: 0.1.0
//! ---
//!
//! # Report Writer
//!
//! 1. Read `template.md` with read_file
//! 2. ...
//! ```
//!
//! ## Pieces
//!
//! - [`parse_skill`]: one directory to one [`SkillDescriptor`], repairing
//!   malformed frontmatter and (optionally) writing the repair back.
//! - [`SkillScanner`]: every skill directory under one root; bad candidates
//!   are skipped with a warning.
//! - [`SkillRegistry`]: name-keyed index over several roots, last scan wins,
//!   filtered by [`Role`](tessera_core::Role).
//! - [`validate_skill_dir`]: side-effect-free check for authoring tools.
//! - [`authoring`]: create / delete skills and manage helper files.

pub mod authoring;
pub mod descriptor;
pub mod frontmatter;
pub mod registry;
pub mod scanner;
pub mod validate;

pub use authoring::{
    create_skill, delete_skill, helper_template, normalize_skill_name, read_helper_file,
    remove_helper_file, validate_skill_name, write_helper_file, NewSkill,
};
pub use descriptor::{
    parse_skill, HelperFile, ParseOptions, ParsedSkill, SkillDescriptor, SkillWarning,
    DEFAULT_VERSION, MAX_DESCRIPTION_CHARS, SKILL_FILENAME,
};
pub use registry::SkillRegistry;
pub use scanner::{ScanReport, ScanWarning, SkillScanner};
pub use validate::{validate_skill_dir, ValidationReport};

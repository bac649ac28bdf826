use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tessera_core::{Role, TesseraError};
use tracing::{debug, trace};

use crate::descriptor::{parse_skill, ParseOptions, SkillDescriptor, SKILL_FILENAME};
use crate::scanner::SkillScanner;

/// In-memory index of skills keyed by name.
///
/// Roots are scanned in call order and a later descriptor with the same name
/// replaces the earlier one, so the usual sequence is built-in root first and
/// the user root second:
///
/// ```no_run
/// # use tessera_skills::SkillRegistry;
/// # use tessera_core::Role;
/// let mut registry = SkillRegistry::new();
/// registry.scan("/opt/tessera/skills");
/// registry.scan("./skills"); // may shadow built-ins
/// let paths = registry.paths_for_role(Role::User);
/// ```
///
/// Not meant for concurrent mutation. Request handlers build a fresh registry
/// and only query it.
#[derive(Debug, Default)]
pub struct SkillRegistry {
    skills: HashMap<String, SkillDescriptor>,
    /// Names in first-insertion order.
    order: Vec<String>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry by scanning each root in order.
    pub fn from_roots<P: AsRef<Path>>(roots: &[P]) -> Self {
        Self::from_roots_with(roots, ParseOptions::LOAD)
    }

    /// Like [`from_roots`](Self::from_roots) with explicit parse options.
    /// [`ParseOptions::READ_ONLY`] gives a lookup that never rewrites a
    /// `SKILL.md`.
    pub fn from_roots_with<P: AsRef<Path>>(roots: &[P], options: ParseOptions) -> Self {
        let mut registry = Self::new();
        for root in roots {
            registry.scan_with(root.as_ref(), options);
        }
        registry
    }

    /// Scan `root` and insert every skill found, overriding same-named entries.
    ///
    /// Returns exactly what the scanner produced.
    pub fn scan(&mut self, root: impl AsRef<Path>) -> Vec<SkillDescriptor> {
        self.scan_with(root, ParseOptions::LOAD)
    }

    pub fn scan_with(
        &mut self,
        root: impl AsRef<Path>,
        options: ParseOptions,
    ) -> Vec<SkillDescriptor> {
        let root = root.as_ref();
        debug!(root = ?root, persist = options.persist, "registry scan");
        let found = SkillScanner::with_options(root, options).load();
        for skill in &found {
            self.insert(skill.clone());
        }
        debug!(root = ?root, count = found.len(), "registry scan complete");
        found
    }

    /// Hot-register one skill directory without re-scanning its root.
    pub fn register(&mut self, skill_dir: impl AsRef<Path>) -> tessera_core::Result<SkillDescriptor> {
        let skill_dir = skill_dir.as_ref();
        let skill_md = skill_dir.join(SKILL_FILENAME);
        if !skill_md.exists() {
            return Err(TesseraError::NotASkillDirectory(skill_dir.to_path_buf()));
        }
        let parsed = parse_skill(skill_dir, &skill_md, ParseOptions::LOAD)?;
        let descriptor = parsed.descriptor;
        debug!(skill = %descriptor.name, path = ?skill_dir, "hot-registered skill");
        self.insert(descriptor.clone());
        Ok(descriptor)
    }

    fn insert(&mut self, skill: SkillDescriptor) {
        let name = skill.name.clone();
        if self.skills.insert(name.clone(), skill).is_some() {
            debug!(skill = %name, "skill overrides a previously registered entry");
        } else {
            debug!(skill = %name, "registered skill");
            self.order.push(name);
        }
    }

    /// Directory paths of every skill `role` may use.
    pub fn paths_for_role(&self, role: Role) -> Vec<PathBuf> {
        let paths: Vec<PathBuf> = self
            .visible_to(role)
            .into_iter()
            .map(|s| s.path.clone())
            .collect();
        debug!(%role, count = paths.len(), "paths_for_role");
        paths
    }

    /// Descriptors visible to `role`, in registration order.
    pub fn visible_to(&self, role: Role) -> Vec<&SkillDescriptor> {
        self.iter()
            .filter(|s| {
                let visible = s.is_visible_to(role);
                if visible {
                    trace!(%role, skill = %s.name, "including skill");
                } else {
                    trace!(%role, skill = %s.name, "excluding developer-only skill");
                }
                visible
            })
            .collect()
    }

    /// Whether any skill visible to `role` lists `tool` in `allowed-tools`.
    ///
    /// Used to decide if a session has to be granted e.g. shell execution.
    pub fn any_visible_declares_tool(&self, role: Role, tool: &str) -> bool {
        self.iter().any(|s| s.is_visible_to(role) && s.declares_tool(tool))
    }

    pub fn get(&self, name: &str) -> Option<&SkillDescriptor> {
        self.skills.get(name)
    }

    /// Snapshot of all descriptors.
    pub fn all(&self) -> Vec<SkillDescriptor> {
        self.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillDescriptor> {
        self.order.iter().filter_map(|name| self.skills.get(name))
    }

    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.skills.contains_key(name)
    }

    /// Drop a skill from the registry (not from disk).
    pub fn remove(&mut self, name: &str) -> Option<SkillDescriptor> {
        let removed = self.skills.remove(name)?;
        self.order.retain(|n| n != name);
        Some(removed)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

use std::io::{IsTerminal, Read};
use std::path::Path;

use tessera_config::SkillsConfig;
use tessera_core::TesseraError;
use tessera_skills::{NewSkill, SkillDescriptor, SkillRegistry};

use super::{FilesAction, RoleFilter, SkillsAction};

pub(super) fn cmd_skills(skills: &SkillsConfig, action: SkillsAction) -> tessera_core::Result<()> {
    let roots = skills.roots();

    match action {
        // Validation reads the directory as-is; loading the roots first would
        // rewrite a malformed SKILL.md before it is checked.
        SkillsAction::Validate { path } => validate(&path),
        SkillsAction::List { role } => list(&SkillRegistry::from_roots(&roots), &roots, role),
        SkillsAction::Show { name } => {
            let registry = SkillRegistry::from_roots(&roots);
            show(find(&registry, &name)?)
        }
        SkillsAction::New {
            name,
            description,
            developer_only,
            tools,
            body,
        } => {
            let mut new_skill = NewSkill::new(tessera_skills::normalize_skill_name(&name), description);
            if developer_only {
                new_skill.role_restriction = Some(tessera_core::Role::Developer.to_string());
            }
            new_skill.allowed_tools = tools;
            new_skill.body = body.unwrap_or_default();

            let dir = tessera_skills::create_skill(&skills.user_dir, &new_skill)?;
            let skill = SkillRegistry::from_roots(&roots).register(&dir)?;
            println!("✅ Created skill '{}'", skill.name);
            println!("   {}", skill.skill_file().display());
            Ok(())
        }
        SkillsAction::Delete { name, force } => {
            if !force && !confirm(&format!("Delete skill '{name}' and all of its files?")) {
                println!("Aborted.");
                return Ok(());
            }
            let path =
                tessera_skills::delete_skill(&skills.user_dir, skills.builtin_dir.as_deref(), &name)?;
            println!("✅ Deleted skill '{name}' ({})", path.display());
            Ok(())
        }
        SkillsAction::Files { action } => files(&SkillRegistry::from_roots(&roots), action),
    }
}

fn find<'a>(registry: &'a SkillRegistry, name: &str) -> tessera_core::Result<&'a SkillDescriptor> {
    registry
        .get(name)
        .ok_or_else(|| TesseraError::SkillNotFound(name.to_string()))
}

fn list(
    registry: &SkillRegistry,
    roots: &[std::path::PathBuf],
    filter: RoleFilter,
) -> tessera_core::Result<()> {
    let mut skills: Vec<&SkillDescriptor> = match filter.role() {
        Some(role) => registry.visible_to(role),
        None => registry.iter().collect(),
    };
    skills.sort_by(|a, b| a.name.cmp(&b.name));

    if skills.is_empty() {
        let searched: Vec<String> = roots.iter().map(|r| r.display().to_string()).collect();
        println!("No skills found in {}", searched.join(", "));
        println!("  Create one with: tessera skills new <name> -d \"<description>\"");
        return Ok(());
    }

    println!("\x1b[1mSkills ({}):\x1b[0m\n", skills.len());
    for s in skills {
        let badge = if s.is_developer_only() {
            " \x1b[33m[developer]\x1b[0m"
        } else {
            ""
        };
        println!("  \x1b[36m{}\x1b[0m v{}{}", s.name, s.version, badge);
        println!("    {}", preview(&s.description, 60));
        println!("    Path: {}", s.path.display());
    }
    Ok(())
}

fn show(skill: &SkillDescriptor) -> tessera_core::Result<()> {
    println!("\x1b[1m{}\x1b[0m v{}", skill.name, skill.version);
    println!("  {}", skill.description);
    println!(
        "  Role: {}",
        skill.role_restriction.as_deref().unwrap_or("all")
    );
    if !skill.allowed_tools.is_empty() {
        println!("  Tools: {}", skill.allowed_tools.join(", "));
    }
    println!("  Path: {}", skill.path.display());

    let helpers = skill.helper_files();
    if !helpers.is_empty() {
        println!("\n  \x1b[1mHelper files:\x1b[0m");
        for h in helpers {
            println!("    {} ({} bytes)", h.name, h.size_bytes);
        }
    }

    let content = std::fs::read_to_string(skill.skill_file())?;
    println!("\n  \x1b[1m{}:\x1b[0m", tessera_skills::SKILL_FILENAME);
    for line in content.lines() {
        println!("    {line}");
    }
    Ok(())
}

fn validate(path: &Path) -> tessera_core::Result<()> {
    let report = tessera_skills::validate_skill_dir(path);
    for error in &report.errors {
        println!("  \x1b[31m✗\x1b[0m {error}");
    }
    for warning in &report.warnings {
        println!("  \x1b[33m⚠\x1b[0m {warning}");
    }

    if report.valid {
        println!("✅ {} is a valid skill", path.display());
        Ok(())
    } else {
        Err(TesseraError::MalformedDescriptor {
            path: path.to_path_buf(),
            reason: format!("{} validation error(s)", report.errors.len()),
        })
    }
}

fn files(registry: &SkillRegistry, action: FilesAction) -> tessera_core::Result<()> {
    match action {
        FilesAction::List { skill } => {
            let skill = find(registry, &skill)?;
            let helpers = skill.helper_files();
            if helpers.is_empty() {
                println!("No helper files in '{}'.", skill.name);
            }
            for h in helpers {
                println!("  {:<32} {:>8} bytes", h.name, h.size_bytes);
            }
        }
        FilesAction::Show { skill, file } => {
            let skill = find(registry, &skill)?;
            let bytes = tessera_skills::read_helper_file(skill, &file)?;
            print!("{}", String::from_utf8_lossy(&bytes));
        }
        FilesAction::Add {
            skill,
            file,
            content,
            force,
        } => {
            let skill = find(registry, &skill)?;
            let content = match content {
                Some(content) => content,
                None if !std::io::stdin().is_terminal() => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
                None => tessera_skills::helper_template(&file, &skill.name),
            };
            let path = tessera_skills::write_helper_file(skill, &file, content.as_bytes(), force)?;
            println!("✅ Wrote {} ({} bytes)", path.display(), content.len());
        }
        FilesAction::Remove { skill, file } => {
            let skill = find(registry, &skill)?;
            tessera_skills::remove_helper_file(skill, &file)?;
            println!("✅ Removed '{file}' from '{}'", skill.name);
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> bool {
    use dialoguer::{Confirm, theme::ColorfulTheme};
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}

/// First `max` characters of the first line, with `...` when cut.
fn preview(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= max && line.len() == text.trim_end().len() {
        return line.to_string();
    }
    let cut: String = line.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}

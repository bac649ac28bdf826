#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use tessera_config::ConfigLoader;
    use tessera_config::schema::*;

    // ── Default tests ──────────────────────────────────────────

    #[test]
    fn test_skills_config_defaults() {
        let config = SkillsConfig::default();
        assert!(config.builtin_dir.is_none());
        assert!(config.include_builtin);
        assert_eq!(config.user_dir, PathBuf::from("skills"));
        assert!(config.extra_dirs.is_empty());
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen, "127.0.0.1:8787");
        assert!(config.api_key.is_none());
        assert!(!config.cors);
    }

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, "pretty");
    }

    #[test]
    fn test_default_config_validates_cleanly() {
        let warnings = TesseraConfig::default().validate().unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    // ── Scan root ordering ─────────────────────────────────────

    #[test]
    fn test_roots_builtin_then_user_then_extras() {
        let config = SkillsConfig {
            builtin_dir: Some(PathBuf::from("/opt/tessera/builtin")),
            include_builtin: true,
            user_dir: PathBuf::from("/home/me/skills"),
            extra_dirs: vec![PathBuf::from("/srv/shared-skills")],
        };
        assert_eq!(
            config.roots(),
            vec![
                PathBuf::from("/opt/tessera/builtin"),
                PathBuf::from("/home/me/skills"),
                PathBuf::from("/srv/shared-skills"),
            ]
        );
    }

    #[test]
    fn test_roots_excludes_builtin_when_disabled() {
        let config = SkillsConfig {
            builtin_dir: Some(PathBuf::from("/opt/tessera/builtin")),
            include_builtin: false,
            ..Default::default()
        };
        assert_eq!(config.roots(), vec![PathBuf::from("skills")]);
    }

    #[test]
    fn test_roots_deduplicates_keeping_first() {
        let config = SkillsConfig {
            builtin_dir: None,
            include_builtin: true,
            user_dir: PathBuf::from("skills"),
            extra_dirs: vec![PathBuf::from("more"), PathBuf::from("skills")],
        };
        assert_eq!(
            config.roots(),
            vec![PathBuf::from("skills"), PathBuf::from("more")]
        );
    }

    // ── TOML tests ─────────────────────────────────────────────

    #[test]
    fn test_config_toml_roundtrip() {
        let config = TesseraConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let restored: TesseraConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(restored.skills.user_dir, config.skills.user_dir);
        assert_eq!(restored.server.listen, config.server.listen);
        assert_eq!(restored.logging.level, config.logging.level);
    }

    #[test]
    fn test_partial_toml_applies_defaults() {
        let toml_str = r#"
[skills]
user_dir = "/data/skills"
extra_dirs = ["/data/team-skills"]
"#;
        let config: TesseraConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.skills.user_dir, PathBuf::from("/data/skills"));
        assert_eq!(config.skills.extra_dirs.len(), 1);
        // Defaults should fill in
        assert!(config.skills.include_builtin);
        assert_eq!(config.server.listen, "127.0.0.1:8787");
        assert_eq!(config.logging.format, "pretty");
    }

    // ── Validation tests ───────────────────────────────────────

    #[test]
    fn test_validate_empty_listen_is_error() {
        let mut config = TesseraConfig::default();
        config.server.listen = "  ".into();
        let err = config.validate().unwrap_err();
        assert!(err.contains("server.listen"));
    }

    #[test]
    fn test_validate_public_listen_without_key_warns() {
        let mut config = TesseraConfig::default();
        config.server.listen = "0.0.0.0:8787".into();
        let warnings = config.validate().unwrap();
        assert!(warnings.iter().any(|w| w.field == "server.api_key"
            && w.severity == WarningSeverity::Warning));

        config.server.api_key = Some("secret".into());
        let warnings = config.validate().unwrap();
        assert!(!warnings.iter().any(|w| w.field == "server.api_key"));
    }

    #[test]
    fn test_validate_unknown_log_level_and_format() {
        let mut config = TesseraConfig::default();
        config.logging.level = "verbose".into();
        config.logging.format = "xml".into();
        let warnings = config.validate().unwrap();
        assert!(warnings.iter().any(|w| w.field == "logging.level"));
        assert!(warnings.iter().any(|w| w.field == "logging.format"));
    }

    #[test]
    fn test_validate_user_dir_same_as_builtin() {
        let mut config = TesseraConfig::default();
        config.skills.builtin_dir = Some(PathBuf::from("skills"));
        let warnings = config.validate().unwrap();
        assert!(warnings.iter().any(|w| w.field == "skills.user_dir"));
    }

    #[test]
    fn test_warning_display_includes_hint() {
        let w = ConfigWarning {
            field: "logging.level".into(),
            message: "unknown log level 'loud'".into(),
            severity: WarningSeverity::Warning,
            hint: Some("Valid values: info".into()),
        };
        let s = w.to_string();
        assert!(s.contains("logging.level"));
        assert!(s.contains("↳ Valid values: info"));
    }

    // ── ConfigLoader tests ─────────────────────────────────────

    #[test]
    fn test_config_loader_with_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("tessera.toml");
        let mut f = std::fs::File::create(&config_path).unwrap();
        writeln!(
            f,
            r#"
[skills]
builtin_dir = "/opt/tessera/builtin"
user_dir = "/var/lib/tessera/skills"

[server]
listen = "127.0.0.1:9000"
cors = true

[logging]
format = "json"
"#
        )
        .unwrap();

        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        let config = loader.get();
        assert_eq!(
            config.skills.builtin_dir,
            Some(PathBuf::from("/opt/tessera/builtin"))
        );
        assert_eq!(config.server.listen, "127.0.0.1:9000");
        assert!(config.server.cors);
        assert_eq!(config.logging.format, "json");
        assert_eq!(loader.path(), config_path.as_path());
    }

    #[test]
    fn test_config_loader_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("absent.toml");
        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        assert!(loader.get().skills.include_builtin);
    }

    #[test]
    fn test_config_loader_invalid_toml_errors() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("tessera.toml");
        std::fs::write(&config_path, "[skills\nuser_dir = ").unwrap();
        assert!(ConfigLoader::load(Some(config_path.as_path())).is_err());
    }

    #[test]
    fn test_config_loader_rejects_validation_errors() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("tessera.toml");
        std::fs::write(&config_path, "[server]\nlisten = \"\"\n").unwrap();

        match ConfigLoader::load(Some(config_path.as_path())) {
            Err(tessera_core::TesseraError::Config(msg)) => {
                assert!(msg.contains("server.listen"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("empty listen address should fail validation"),
        }
    }

    #[test]
    fn test_config_loader_reload() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("tessera.toml");

        std::fs::write(
            &config_path,
            r#"
[logging]
format = "compact"
"#,
        )
        .unwrap();

        let loader = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        assert_eq!(loader.get().logging.format, "compact");

        std::fs::write(
            &config_path,
            r#"
[logging]
format = "json"
"#,
        )
        .unwrap();

        loader.reload().unwrap();
        assert_eq!(loader.get().logging.format, "json");
    }

    // ── JSON roundtrip ─────────────────────────────────────────

    #[test]
    fn test_config_json_roundtrip() {
        let config = TesseraConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: TesseraConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.server.listen, config.server.listen);
    }
}

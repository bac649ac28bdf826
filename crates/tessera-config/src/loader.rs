use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::schema::TesseraConfig;

/// Loads and holds the Tessera configuration.
pub struct ConfigLoader {
    config: RwLock<TesseraConfig>,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > TESSERA_CONFIG env > ~/.tessera/tessera.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("TESSERA_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".tessera")
            .join("tessera.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> tessera_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            Self::read_file(&config_path)?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            TesseraConfig::default()
        };

        let config = Self::apply_env_overrides(config);

        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(tessera_core::TesseraError::Config(e));
            }
        }

        Ok(Self {
            config: RwLock::new(config),
            config_path,
        })
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> TesseraConfig {
        self.config.read().clone()
    }

    /// Path the config was loaded from (may not exist).
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Reload the config from disk.
    pub fn reload(&self) -> tessera_core::Result<()> {
        if !self.config_path.exists() {
            return Err(tessera_core::TesseraError::Config(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }
        let new_config = Self::apply_env_overrides(Self::read_file(&self.config_path)?);
        new_config
            .validate()
            .map_err(tessera_core::TesseraError::Config)?;
        *self.config.write() = new_config;
        info!("configuration reloaded");
        Ok(())
    }

    fn read_file(path: &Path) -> tessera_core::Result<TesseraConfig> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str::<TesseraConfig>(&raw).map_err(|e| {
            tessera_core::TesseraError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Apply env var overrides (TESSERA_SKILLS_DIR, TESSERA_LOG_LEVEL, etc.)
    pub fn apply_env_overrides(mut config: TesseraConfig) -> TesseraConfig {
        if let Ok(v) = std::env::var("TESSERA_SKILLS_DIR") {
            config.skills.user_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("TESSERA_BUILTIN_SKILLS_DIR") {
            config.skills.builtin_dir = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("TESSERA_SERVER_LISTEN") {
            config.server.listen = v;
        }
        if let Ok(v) = std::env::var("TESSERA_LOG_LEVEL") {
            config.logging.level = v;
        }
        // Config file takes priority, env is the fallback.
        if config.server.api_key.is_none() {
            if let Ok(v) = std::env::var("TESSERA_API_KEY") {
                config.server.api_key = Some(v);
            }
        }
        config
    }
}

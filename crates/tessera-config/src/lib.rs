//! # tessera-config
//!
//! Configuration system for Tessera. Reads from `tessera.toml`, environment
//! variables, and CLI overrides, in that precedence order.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::TesseraConfig;
pub use schema::{ConfigWarning, LoggingConfig, ServerConfig, SkillsConfig, WarningSeverity};

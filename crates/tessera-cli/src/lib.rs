//! # tessera-cli
//!
//! Command-line interface for Tessera.
//!
//! ## Commands
//!
//! - `tessera skills list|show|validate|new|delete|files`: browse and author skills
//! - `tessera serve`: run the HTTP API
//! - `tessera config`: print the effective configuration
//! - `tessera completions <shell>`: shell completion scripts

pub mod commands;

pub use commands::Cli;

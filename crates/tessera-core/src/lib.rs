//! # tessera-core
//!
//! Core types shared by every crate in the Tessera workspace: the unified
//! error type and the caller roles that gate which skills an agent may load.

pub mod error;
pub mod role;

pub use error::{Result, TesseraError};
pub use role::{Role, RoleContext};

//! Shared data model for CodeQuest levels.

pub mod defs;
pub mod validate;

pub use defs::*;
pub use validate::{ValidationError, validate_catalog};

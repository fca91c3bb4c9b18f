//! Loading the level catalog and engine settings.
//!
//! The catalog compiled into the binary is the fallback; a `levels.toml` in
//! the data directory, or an explicit path, takes precedence. Every catalog
//! is validated before use.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use codequest_data::Catalog;
use log::info;

use crate::data_paths::data_path;
use crate::settings::{EngineSettings, load_settings};

const BUILTIN_LEVELS: &str = include_str!("../data/levels.toml");

/// The level catalog shipped with the engine.
///
/// # Errors
/// Fails only if the bundled TOML is malformed or invalid.
pub fn builtin_catalog() -> Result<Catalog> {
    let catalog: Catalog = toml::from_str(BUILTIN_LEVELS).context("parsing builtin level catalog")?;
    validate(&catalog)?;
    Ok(catalog)
}

/// Load and validate a catalog from `toml_path`.
///
/// # Errors
/// Errors on file IO, TOML parsing, or validation failure.
pub fn load_catalog(toml_path: &Path) -> Result<Catalog> {
    let text = fs::read_to_string(toml_path)
        .with_context(|| format!("reading level catalog from '{}'", toml_path.display()))?;
    let catalog: Catalog =
        toml::from_str(&text).with_context(|| format!("parsing level catalog from '{}'", toml_path.display()))?;
    validate(&catalog).with_context(|| format!("validating level catalog '{}'", toml_path.display()))?;
    info!(
        "{} levels loaded from '{}'",
        catalog.levels.len(),
        toml_path.display()
    );
    Ok(catalog)
}

/// Catalog from `explicit` if given, else the data directory, else the builtin one.
///
/// # Errors
/// Errors if the chosen file cannot be loaded; a missing data-directory file is not an error.
pub fn resolve_catalog(explicit: Option<&Path>) -> Result<Catalog> {
    if let Some(path) = explicit {
        return load_catalog(path);
    }
    let on_disk = data_path("levels.toml");
    if on_disk.is_file() {
        return load_catalog(&on_disk);
    }
    info!("no level catalog at '{}', using builtin levels", on_disk.display());
    builtin_catalog()
}

/// Engine settings from the data directory, or defaults.
pub fn default_settings() -> EngineSettings {
    load_settings(&data_path("settings.toml"))
}

/// Validate a catalog and return a single aggregated error.
fn validate(catalog: &Catalog) -> Result<()> {
    let errors = codequest_data::validate_catalog(catalog);
    if errors.is_empty() {
        return Ok(());
    }
    let details = errors
        .into_iter()
        .map(|err| format!("- {err}"))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("level catalog validation failed:\n{details}");
}

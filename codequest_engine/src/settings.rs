//! Engine runtime settings.
//!
//! Pacing and enemy timing come from `settings.toml`. The file is optional;
//! anything missing or unreadable falls back to the defaults below.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::schedule::{EnemyPattern, EnemySchedule};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Delay between loop iterations, in milliseconds.
    pub pacing_ms: u64,
    pub enemy: EnemySettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            pacing_ms: 500,
            enemy: EnemySettings::default(),
        }
    }
}

impl EngineSettings {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Same settings with loop pacing switched off.
    #[must_use]
    pub fn without_pacing(mut self) -> Self {
        self.pacing_ms = 0;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySettings {
    pub period_ms: u64,
    pub pattern: EnemyPattern,
}

impl Default for EnemySettings {
    fn default() -> Self {
        Self {
            period_ms: 2000,
            pattern: EnemyPattern::default(),
        }
    }
}

impl EnemySettings {
    pub fn schedule(&self) -> EnemySchedule {
        EnemySchedule::new(self.pattern.clone(), Duration::from_millis(self.period_ms))
    }
}

/// Load settings from `toml_path`, falling back to defaults on error.
pub fn load_settings(toml_path: &Path) -> EngineSettings {
    match try_load_settings(toml_path) {
        Ok(settings) => {
            info!(
                "engine settings loaded from '{}' (pacing {}ms)",
                toml_path.display(),
                settings.pacing_ms
            );
            settings
        },
        Err(e) => {
            warn!(
                "Could not load engine settings from '{}': {e:#}. Using defaults.",
                toml_path.display()
            );
            EngineSettings::default()
        },
    }
}

/// # Errors
/// Returns an error if the file cannot be read or parsed.
fn try_load_settings(toml_path: &Path) -> Result<EngineSettings> {
    let text = fs::read_to_string(toml_path)
        .with_context(|| format!("reading engine settings from '{}'", toml_path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing engine settings from '{}'", toml_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Proximity;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings: EngineSettings = toml::from_str("pacing_ms = 0").expect("settings");
        assert_eq!(settings.pacing(), Duration::ZERO);
        assert_eq!(settings.enemy, EnemySettings::default());
    }

    #[test]
    fn bundled_settings_parse() {
        let settings: EngineSettings = toml::from_str(include_str!("../data/settings.toml")).expect("bundled settings");
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn random_pattern_is_accepted() {
        let settings: EngineSettings = toml::from_str(
            r#"
[enemy]
period_ms = 750
pattern = { mode = "random" }
"#,
        )
        .expect("settings");
        assert_eq!(settings.enemy.pattern, EnemyPattern::Random);
        assert_eq!(settings.enemy.schedule().period(), Duration::from_millis(750));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = load_settings(Path::new("definitely/not/here/settings.toml"));
        assert_eq!(settings, EngineSettings::default());
    }

    #[test]
    fn schedule_starts_far() {
        let mut schedule = EngineSettings::default().enemy.schedule();
        assert_eq!(schedule.tick(), Proximity::Far);
    }
}

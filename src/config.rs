//! Configuration loaded from `~/.config/annolens/config.toml`.
//!
//! ```toml
//! [playback]
//! tick_interval_ms = 250
//! seek_units = "seconds"
//!
//! [filters]
//! disabled_classifiers = ["speech"]
//! disabled_models = ["Ground-Truth"]
//!
//! [listing]
//! format = "markdown"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::annotate::{FilterState, ListingFormat};
use crate::playback::SeekUnits;

const DEFAULT_TICK_INTERVAL_MS: u64 = 250;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub playback: PlaybackConfig,
    pub filters: FilterConfig,
    pub listing: ListingConfig,
}

/// `[playback]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Progress tick period of the replay loop.
    pub tick_interval_ms: u64,
    /// Seek unit of the simulated primary engine.
    pub seek_units: SeekUnits,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            seek_units: SeekUnits::Seconds,
        }
    }
}

/// `[filters]` section: keys switched off when a session starts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub disabled_classifiers: Vec<String>,
    pub disabled_models: Vec<String>,
}

/// `[listing]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub format: ListingFormat,
}

impl Config {
    /// Replay tick period; zero is treated as the default.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        match self.playback.tick_interval_ms {
            0 => Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            ms => Duration::from_millis(ms),
        }
    }

    /// Switch off the configured classifiers and models.
    ///
    /// Keys that do not occur in this session's annotations are skipped with
    /// a warning.
    pub fn apply_filters(&self, filters: &mut FilterState) {
        for classifier in &self.filters.disabled_classifiers {
            if let Err(e) = filters.set_classifier(classifier, false) {
                warn!("Config: {e}");
            }
        }
        for model in &self.filters.disabled_models {
            if let Err(e) = filters.set_model(model, false) {
                warn!("Config: {e}");
            }
        }
    }
}

/// Load configuration.
///
/// With an explicit `path` the file must exist. Without one, the default
/// location is used and a missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let path = config_path();
            if !path.exists() {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Config::default());
            }
            path
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let config: Config =
        toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))?;

    debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Return the path to the default config file.
#[must_use]
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("annolens")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{Annotation, AnnotationSet};

    #[test]
    fn parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.playback.tick_interval_ms, 250);
        assert_eq!(config.playback.seek_units, SeekUnits::Seconds);
        assert_eq!(config.listing.format, ListingFormat::Text);
        assert!(config.filters.disabled_classifiers.is_empty());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
[playback]
tick_interval_ms = 100
seek_units = "fraction"

[filters]
disabled_classifiers = ["speech"]
disabled_models = ["Ground-Truth"]

[listing]
format = "json"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert_eq!(config.playback.seek_units, SeekUnits::Fraction);
        assert_eq!(config.filters.disabled_classifiers, vec!["speech"]);
        assert_eq!(config.listing.format, ListingFormat::Json);
    }

    #[test]
    fn zero_tick_uses_default() {
        let config: Config = toml::from_str("[playback]\ntick_interval_ms = 0").unwrap();
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn invalid_seek_units_rejected() {
        assert!(toml::from_str::<Config>("[playback]\nseek_units = \"frames\"").is_err());
    }

    #[test]
    fn apply_filters_skips_unknown_keys() {
        let set = AnnotationSet::from_annotations(vec![
            Annotation::point("violence", 0).with_model("modelA"),
            Annotation::point("speech", 0),
        ]);
        let mut filters = FilterState::seed(&set);

        let config: Config = toml::from_str(
            "[filters]\ndisabled_classifiers = [\"speech\", \"explosions\"]\ndisabled_models = [\"modelA\"]",
        )
        .unwrap();
        config.apply_filters(&mut filters);

        assert_eq!(filters.classifier_enabled("speech"), Some(false));
        assert_eq!(filters.classifier_enabled("violence"), Some(true));
        assert_eq!(filters.classifier_enabled("explosions"), None);
        assert_eq!(filters.model_enabled("modelA"), Some(false));
    }

    #[test]
    fn missing_explicit_path_is_error() {
        let err = load_config(Some(Path::new("/nonexistent/annolens.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}

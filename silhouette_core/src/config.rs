//! Configuration file support for Silhouette.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/silhouette/config.toml`.

use crate::catalog::REQUIRED_DEFAULTS;
use crate::types::{fields, MeasurementSystem, Season};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub estimation: EstimationConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Estimation pipeline configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct EstimationConfig {
    /// Pins the season instead of deriving it from the calendar
    #[serde(default)]
    pub season: Option<Season>,
}

/// Values used for required measurements the caller did not supply
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DefaultsConfig {
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default = "default_bust")]
    pub bust: f64,
    #[serde(default = "default_waist")]
    pub waist: f64,
    #[serde(default = "default_hips")]
    pub hips: f64,
    #[serde(default = "default_inseam")]
    pub inseam: f64,
    #[serde(default = "default_shoulder_width")]
    pub shoulder_width: f64,
    #[serde(default = "default_arm_length")]
    pub arm_length: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            height: default_height(),
            weight: default_weight(),
            bust: default_bust(),
            waist: default_waist(),
            hips: default_hips(),
            inseam: default_inseam(),
            shoulder_width: default_shoulder_width(),
            arm_length: default_arm_length(),
        }
    }
}

impl DefaultsConfig {
    /// Field/value pairs in pipeline order
    pub fn entries(&self) -> [(&'static str, f64); 8] {
        [
            (fields::HEIGHT, self.height),
            (fields::WEIGHT, self.weight),
            (fields::BUST, self.bust),
            (fields::WAIST, self.waist),
            (fields::HIPS, self.hips),
            (fields::INSEAM, self.inseam),
            (fields::SHOULDER_WIDTH, self.shoulder_width),
            (fields::ARM_LENGTH, self.arm_length),
        ]
    }
}

/// Output configuration for the CLI
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub system: MeasurementSystem,
}

// Default value functions
fn builtin_default(field: &str) -> f64 {
    REQUIRED_DEFAULTS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, value)| *value)
        .unwrap_or_default()
}

fn default_height() -> f64 {
    builtin_default(fields::HEIGHT)
}

fn default_weight() -> f64 {
    builtin_default(fields::WEIGHT)
}

fn default_bust() -> f64 {
    builtin_default(fields::BUST)
}

fn default_waist() -> f64 {
    builtin_default(fields::WAIST)
}

fn default_hips() -> f64 {
    builtin_default(fields::HIPS)
}

fn default_inseam() -> f64 {
    builtin_default(fields::INSEAM)
}

fn default_shoulder_width() -> f64 {
    builtin_default(fields::SHOULDER_WIDTH)
}

fn default_arm_length() -> f64 {
    builtin_default(fields::ARM_LENGTH)
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("silhouette").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Defaults must be finite and non-negative
    pub fn validate(&self) -> Result<()> {
        for (field, value) in self.defaults.entries() {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "default {} must be a finite non-negative number, got {}",
                    field, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.estimation.season, None);
        assert_eq!(config.defaults.height, 165.0);
        assert_eq!(config.defaults.inseam, 75.0);
        assert_eq!(config.defaults.arm_length, 58.0);
        assert_eq!(config.output.system, MeasurementSystem::Metric);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config {
            estimation: EstimationConfig {
                season: Some(Season::Winter),
            },
            ..Config::default()
        };
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[estimation]
season = "summer"

[defaults]
height = 172.5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.estimation.season, Some(Season::Summer));
        assert_eq!(config.defaults.height, 172.5);
        assert_eq!(config.defaults.weight, 60.0); // default
    }

    #[test]
    fn test_unknown_season_rejected() {
        let toml_str = r#"
[estimation]
season = "monsoon"
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.output.system = MeasurementSystem::Imperial;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.output.system, MeasurementSystem::Imperial);
    }

    #[test]
    fn test_negative_default_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\nwaist = -3.0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}

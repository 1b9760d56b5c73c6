use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    location::DEFAULT_GEOCLUE_COMMAND, model::Coordinates, present::UnitPolicy,
    provider::openweather::DEFAULT_BASE_URL,
};

/// Environment variable that overrides the API key from the config file.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// fahrenheit_locales = ["[en_US]", "en_LR", "en_MM"]
///
/// [location]
/// latitude = 12.97
/// longitude = 77.59
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,

    pub base_url: Option<String>,

    /// Locale identifiers that select Fahrenheit. `None` keeps the built-in list.
    pub fahrenheit_locales: Option<Vec<String>>,

    pub request_timeout_secs: Option<u64>,

    /// Upper bound on waiting for a location fix. Unset waits indefinitely.
    pub location_timeout_secs: Option<u64>,

    pub geoclue_command: Option<String>,

    /// Fixed location used instead of geoclue.
    pub location: Option<Coordinates>,
}

impl Config {
    /// API key from the environment or the config file.
    pub fn api_key(&self) -> Result<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();

        from_env
            .into_iter()
            .chain(self.api_key.clone())
            .find(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `geoweather configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn geoclue_command(&self) -> &str {
        self.geoclue_command.as_deref().unwrap_or(DEFAULT_GEOCLUE_COMMAND)
    }

    pub fn unit_policy(&self) -> UnitPolicy {
        match &self.fahrenheit_locales {
            Some(locales) => UnitPolicy::new(locales.clone()),
            None => UnitPolicy::default(),
        }
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the local key-value store holding the cached response.
    pub fn store_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().join("store.json"))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "geoweather", "geoweather")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::present::TemperatureUnit;

    #[test]
    fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            api_key: Some("KEY".into()),
            fahrenheit_locales: Some(vec!["en_US".into()]),
            location_timeout_secs: Some(30),
            location: Some(Coordinates::new(12.97, 77.59)),
            ..Config::default()
        };
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn parses_hand_written_toml() {
        let cfg: Config = toml::from_str(
            r#"
            api_key = "abc"
            base_url = "http://localhost:9999"

            [location]
            latitude = 1.5
            longitude = -2.25
            "#,
        )
        .unwrap();

        assert_eq!(cfg.base_url(), "http://localhost:9999");
        assert_eq!(cfg.location, Some(Coordinates::new(1.5, -2.25)));
        assert_eq!(cfg.geoclue_command(), DEFAULT_GEOCLUE_COMMAND);
    }

    #[test]
    fn invalid_toml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn unit_policy_uses_configured_locales() {
        let cfg = Config {
            fahrenheit_locales: Some(vec!["en_US".into()]),
            ..Config::default()
        };
        assert_eq!(cfg.unit_policy().unit_for_locale("en_US"), TemperatureUnit::Fahrenheit);

        let default = Config::default().unit_policy();
        assert_eq!(default.unit_for_locale("en_LR"), TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn blank_api_key_is_missing() {
        let cfg = Config {
            api_key: Some("  ".into()),
            ..Config::default()
        };
        if std::env::var(API_KEY_ENV).is_err() {
            let err = cfg.api_key().unwrap_err();
            assert!(err.to_string().contains("geoweather configure"));
        }
    }
}

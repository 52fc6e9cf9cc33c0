use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{registry, retry::RetryPolicy};

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// locations = ["tbilisi", "batumi"]
///
/// [retry]
/// max_retries = 3
/// delay_between_requests_ms = 800
/// attempt_timeout_ms = 5000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// WeatherAPI.com key.
    pub api_key: Option<String>,

    /// Override for the provider base URL.
    pub base_url: Option<String>,

    /// Curated location ids; the major cities when absent.
    pub locations: Option<Vec<String>>,

    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Config {
    /// Load config from the default path, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the default path, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
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
        let dirs = ProjectDirs::from("ge", "amindi", "amindi")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) -> Result<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(anyhow!(
                "API key must not be empty.\n\
                 Hint: copy the key from your WeatherAPI.com dashboard and run `amindi configure` again."
            ));
        }

        self.api_key = Some(api_key.to_string());
        Ok(())
    }

    /// API key from the environment, falling back to the stored one.
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }

    /// Curated ids to aggregate, defaulting to the major cities.
    pub fn curated_location_ids(&self) -> Vec<String> {
        match &self.locations {
            Some(ids) => ids.clone(),
            None => registry::MAJOR_CITY_IDS.iter().map(|id| id.to_string()).collect(),
        }
    }
}

/// The environment key wins over the stored one; blank keys count as unset.
pub fn resolve_api_key(env: Option<String>, stored: Option<&str>) -> Option<String> {
    let non_blank = |key: &str| {
        let key = key.trim();
        (!key.is_empty()).then(|| key.to_string())
    };

    env.as_deref().and_then(non_blank).or_else(|| stored.and_then(non_blank))
}

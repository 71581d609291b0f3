use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use crate::{geolocation::LocationSource, model::Coordinates};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_LOOKUP_URL: &str = "http://ip-api.com/json";

/// Overrides `api_url` from the config file when set.
pub const API_URL_ENV: &str = "FEELS_API_URL";

/// Where the device position comes from.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocationConfig {
    /// Absent means no source is available.
    pub source: Option<LocationSource>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Endpoint used by the "ip" source.
    pub lookup_url: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// api_url = "http://localhost:8000"
///
/// [location]
/// source = "fixed"
/// latitude = 48.85
/// longitude = 2.35
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,

    #[serde(default)]
    pub location: LocationConfig,
}

impl Config {
    /// Backend base URL, honouring the environment override.
    pub fn api_url(&self) -> String {
        self.resolve_api_url(env::var(API_URL_ENV).ok())
    }

    fn resolve_api_url(&self, from_env: Option<String>) -> String {
        from_env
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// The URL written in the config file, ignoring the environment override.
    pub fn stored_api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn set_api_url(&mut self, url: String) {
        self.api_url = Some(url);
    }

    pub fn set_location_source(&mut self, source: LocationSource) {
        self.location.source = Some(source);
    }

    /// Store a fixed position and make it the active source.
    pub fn set_fixed_location(&mut self, coords: Coordinates) {
        self.location.latitude = Some(coords.latitude);
        self.location.longitude = Some(coords.longitude);
        self.set_location_source(LocationSource::Fixed);
    }

    pub fn fixed_location(&self) -> Option<Coordinates> {
        match (self.location.latitude, self.location.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
            _ => None,
        }
    }

    pub fn lookup_url(&self) -> &str {
        self.location.lookup_url.as_deref().unwrap_or(DEFAULT_LOOKUP_URL)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read config file: {}", path.display()));
            }
        };

        toml::from_str(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Write as TOML, creating the config directory on first save.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let rendered = toml::to_string_pretty(self).context("Failed to encode config as TOML")?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        fs::write(path, rendered).with_context(|| format!("Failed to write {}", path.display()))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weather-feels", "feels")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the persisted session credential.
    pub fn credential_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("token"))
    }
}

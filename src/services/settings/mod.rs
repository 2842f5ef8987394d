// Settings service
// Loads and stores `Settings` as TOML in the per-user config directory

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::Settings;

const SETTINGS_FILE: &str = "settings.toml";
const TOKEN_FILE: &str = "token";

/// Where the app keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub settings_file: PathBuf,
    pub token_file: PathBuf,
}

impl AppPaths {
    /// Platform config and data directories, or the working directory as a fallback.
    pub fn discover() -> Self {
        match ProjectDirs::from("", "", "shift-calendar") {
            Some(dirs) => Self {
                settings_file: dirs.config_dir().join(SETTINGS_FILE),
                token_file: dirs.data_dir().join(TOKEN_FILE),
            },
            None => {
                log::warn!("No home directory found, keeping files in the working directory");
                Self::in_dir(Path::new("."))
            }
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self {
            settings_file: dir.join(SETTINGS_FILE),
            token_file: dir.join(TOKEN_FILE),
        }
    }
}

pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the current settings; a missing file yields the defaults
    pub fn get(&self) -> Result<Settings> {
        if !self.path.exists() {
            log::info!("No settings at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let settings = Settings::from_toml(&content).context("Failed to parse settings")?;
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;
        Ok(settings)
    }

    /// Update settings
    pub fn update(&self, settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = settings.to_toml().context("Failed to serialize settings")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))?;
        Ok(())
    }

    /// Reset settings to defaults
    pub fn reset(&self) -> Result<()> {
        self.update(&Settings::default())
    }
}

/// Load settings, falling back to defaults when the file is unusable.
pub fn load_settings_or_default(service: &SettingsService) -> Settings {
    match service.get() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Failed to load settings, using defaults: {:#}", e);
            Settings::default()
        }
    }
}

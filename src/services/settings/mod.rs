//! Loads and stores [`Settings`] as TOML in the platform config directory.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::Settings;

pub const CONFIG_FILENAME: &str = "config.toml";
pub const DATABASE_FILENAME: &str = "rooms.db";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "RoomScheduler", "RoomScheduler")
}

pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/config.toml`, or the working directory when no home
    /// directory can be resolved.
    pub fn from_default_location() -> Self {
        match project_dirs() {
            Some(dirs) => Self::new(dirs.config_dir().join(CONFIG_FILENAME)),
            None => {
                log::warn!("Unable to resolve project directory; using current dir for config");
                Self::new(CONFIG_FILENAME)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the config file.
    pub fn try_load(&self) -> Result<Settings> {
        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings in {}: {}", self.path.display(), e))?;
        Ok(settings)
    }

    /// Settings from disk; defaults when the file is missing or unusable.
    pub fn load(&self) -> Settings {
        if !self.path.exists() {
            log::info!("No config at {}, using defaults", self.path.display());
            return Settings::default();
        }

        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{:#}; using defaults", e);
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;

        log::info!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// Database file from the settings, falling back to the platform data
/// directory.
pub fn resolve_database_path(settings: &Settings) -> PathBuf {
    if let Some(path) = &settings.database_path {
        return path.clone();
    }

    match project_dirs() {
        Some(dirs) => {
            let data_dir = dirs.data_dir();
            if let Err(e) = std::fs::create_dir_all(data_dir) {
                log::warn!("Failed to create data directory {}: {}", data_dir.display(), e);
            }
            data_dir.join(DATABASE_FILENAME)
        }
        None => PathBuf::from(DATABASE_FILENAME),
    }
}

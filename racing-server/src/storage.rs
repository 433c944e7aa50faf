//! Settings persistence
//!
//! Settings live in one JSON file. A missing or unreadable file is not an
//! error: the engine starts with defaults and the problem is logged.
//!
//! Default path: `~/.local/share/racing/settings.json`

use log::{debug, info, warn};
use racing_core::RacingSettings;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{get_project_dirs, SETTINGS_FILE};
use crate::ServerError;

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store in the user data directory
    pub fn new() -> Result<Self, ServerError> {
        let project_dirs = get_project_dirs()?;
        let path = project_dirs.data_dir().join(SETTINGS_FILE);
        debug!("Settings file: {}", path.display());
        Ok(Self { path })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, falling back to defaults
    pub fn load(&self) -> RacingSettings {
        if !self.path.exists() {
            debug!(
                "No settings at {}, using defaults",
                self.path.display()
            );
            return RacingSettings::default();
        }

        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                warn!("Failed to open settings {}: {}", self.path.display(), e);
                return RacingSettings::default();
            }
        };

        let settings: RacingSettings = match serde_json::from_reader(BufReader::new(file)) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to parse settings {}: {}", self.path.display(), e);
                return RacingSettings::default();
            }
        };

        if let Err(e) = settings.validate() {
            warn!("Ignoring settings {}: {}", self.path.display(), e);
            return RacingSettings::default();
        }

        debug!("Loaded settings from {}", self.path.display());
        settings
    }

    pub fn save(&self, settings: &RacingSettings) -> Result<(), ServerError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let file = fs::File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, settings)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        info!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

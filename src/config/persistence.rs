use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::HistoryConfig;

/// Errors that can occur while loading or saving preferences
#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Failed to (de)serialize preferences: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to access preferences: {0}")]
    IoError(#[from] io::Error),
}

/// Result type for preference operations
pub type PreferencesResult<T> = Result<T, PreferencesError>;

const PREFERENCES_FILE: &str = "history.json";

/// Stores the history settings as JSON in a preferences directory
#[derive(Debug, Clone)]
pub struct Preferences {
    /// Directory where the preferences file lives
    dir: PathBuf,
}

impl Preferences {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(PREFERENCES_FILE)
    }

    /// Loads the saved settings. A missing file is not an error and yields
    /// the defaults.
    pub fn load(&self) -> PreferencesResult<HistoryConfig> {
        let path = self.path();
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("No preferences at {}, using defaults", path.display());
                return Ok(HistoryConfig::default());
            }
            Err(err) => return Err(err.into()),
        };
        let config: HistoryConfig = serde_json::from_str(&json)?;
        log::info!("Loaded preferences from {}: {} undo levels", path.display(), config.undo_levels);
        Ok(config)
    }

    /// Loads the undo depth, falling back to the default on any error
    pub fn load_undo_levels(&self) -> usize {
        match self.load() {
            Ok(config) => config.undo_levels,
            Err(err) => {
                log::warn!("Could not load preferences: {}", err);
                HistoryConfig::default().undo_levels
            }
        }
    }

    pub fn save(&self, config: &HistoryConfig) -> PreferencesResult<()> {
        // Create the directory if it doesn't exist
        fs::create_dir_all(&self.dir)?;

        let json = serde_json::to_string_pretty(config)?;
        fs::write(self.path(), json)?;
        log::debug!("Saved preferences to {}", self.path().display());
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

//! Player settings and preferences
//!
//! Persisted separately from the best score, as a small JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Forward feedback signals (start/click/failure) to the device
    pub haptics: bool,
    /// File backing the best-score store
    pub score_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            haptics: true,
            score_file: PathBuf::from("cactus_dash_scores.json"),
        }
    }
}

impl Settings {
    /// Load settings from disk, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }
}

//! Engine configuration.
//!
//! Every field has a default, so a config file only needs to list what it overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for gestures, shortcuts and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Screen distance a press may travel and still count as a click.
    pub click_threshold: f64,
    /// Marquees no larger than this on both axes (screen px) are click-throughs.
    pub marquee_threshold: f64,
    /// Hit radius of selection handles, in screen pixels.
    pub handle_hit_radius: f64,
    /// Distance of the rotate handle above the top edge, in screen pixels.
    pub rotate_handle_offset: f64,
    /// Zoom factor per wheel notch towards the user.
    pub wheel_zoom_in: f64,
    /// Zoom factor per wheel notch away from the user.
    pub wheel_zoom_out: f64,
    /// Size delta per wheel notch when resizing the selection.
    pub wheel_resize_step: f64,
    /// Degrees per rotate shortcut.
    pub keyboard_rotate_step: f64,
    /// Size delta per resize shortcut.
    pub keyboard_resize_step: f64,
    /// Canvas offset between consecutive pastes.
    pub paste_offset: f64,
    /// Largest width or height of a placed image.
    pub max_image_size: f64,
    /// Minimum time between autosaves, in milliseconds.
    pub autosave_interval_ms: u64,
    /// Undo snapshots kept.
    pub undo_history: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            click_threshold: 2.0,
            marquee_threshold: 5.0,
            handle_hit_radius: 10.0,
            rotate_handle_offset: 30.0,
            wheel_zoom_in: 1.1,
            wheel_zoom_out: 0.9,
            wheel_resize_step: 5.0,
            keyboard_rotate_step: 5.0,
            keyboard_resize_step: 10.0,
            paste_offset: 20.0,
            max_image_size: 500.0,
            autosave_interval_ms: 2000,
            undo_history: crate::scene::DEFAULT_UNDO_HISTORY,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }
}

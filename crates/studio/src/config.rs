//! Session configuration.

use canvas::{MAX_CANVAS_SIZE, MIN_CANVAS_SIZE};
use std::path::PathBuf;

/// Studio session configuration.
#[derive(Clone, Debug)]
pub struct StudioConfig {
    /// Canvas side length in pixels.
    pub canvas_size: usize,
    /// Playback rate in frames per second.
    pub frame_rate: u32,
    /// Undo/redo depth kept per layer.
    pub undo_capacity: usize,
    /// Whether the periodic autosave runs.
    pub autosave_enabled: bool,
    /// Seconds between autosave attempts.
    pub autosave_interval_secs: f64,
    /// Where the autosave blob is written.
    pub autosave_path: PathBuf,
}

impl StudioConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the canvas side length, clamped to the supported range.
    pub fn with_canvas_size(mut self, size: usize) -> Self {
        self.canvas_size = size.clamp(MIN_CANVAS_SIZE, MAX_CANVAS_SIZE);
        self
    }

    /// Set the playback frame rate.
    pub fn with_frame_rate(mut self, rate: u32) -> Self {
        self.frame_rate = rate;
        self
    }

    /// Set the per-layer undo depth.
    pub fn with_undo_capacity(mut self, capacity: usize) -> Self {
        self.undo_capacity = capacity;
        self
    }

    /// Enable or disable the periodic autosave.
    pub fn with_autosave(mut self, enabled: bool) -> Self {
        self.autosave_enabled = enabled;
        self
    }

    /// Set the autosave destination.
    pub fn with_autosave_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.autosave_path = path.into();
        self
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            canvas_size: 32,
            frame_rate: 12,
            undo_capacity: 60,
            autosave_enabled: true,
            autosave_interval_secs: 60.0,
            autosave_path: PathBuf::from("pixel_studio_autosave.bytes"),
        }
    }
}

//! Configuration management for playhead
//!
//! This module holds the tunables the state machine consumes: buffering
//! watchdog timing, seek timescale, transport rates for fast-forward and
//! rewind, the lifecycle pause/resume policy booleans, and the time
//! observation intervals. The configuration is consumed, not owned, by the
//! core: it is supplied at controller construction and never mutated by a
//! state handler.

use crate::utils::error::{PlayerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Player configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfiguration {
    /// Total time in seconds the buffering state waits for the buffer to
    /// fill before giving up and moving to waiting-for-network
    pub buffer_observing_timeout: f64,

    /// Interval in seconds between buffering watchdog ticks
    pub buffer_observing_time_interval: f64,

    /// Timescale used to quantize seek targets (units per second)
    pub preferred_timescale: u32,

    /// Rate applied by the fast-forward command
    pub fast_forward_rate: f64,

    /// Rate applied by the rewind command (negative = reverse)
    pub rewind_rate: f64,

    /// Pause playback when the application resigns active
    pub playback_pauses_when_resigning_active: bool,

    /// Pause playback when the application enters the background
    pub playback_pauses_when_backgrounded: bool,

    /// Resume interrupted playback when the application becomes active
    pub playback_resumes_when_became_active: bool,

    /// Resume interrupted playback when the application enters the foreground
    pub playback_resumes_when_entering_foreground: bool,

    /// Pause playback when the audio route loses its external device
    pub playback_pauses_when_route_changes: bool,

    /// Fraction of the media duration between boundary time reports
    pub boundary_time_observer_multiplier: f64,

    /// Interval in seconds between periodic time reports while playing
    pub periodic_time_interval: f64,
}

impl Default for PlayerConfiguration {
    fn default() -> Self {
        Self {
            buffer_observing_timeout: 30.0,
            buffer_observing_time_interval: 0.3,
            preferred_timescale: 1000,
            fast_forward_rate: 2.0,
            rewind_rate: -1.0,
            playback_pauses_when_resigning_active: true,
            playback_pauses_when_backgrounded: true,
            playback_resumes_when_became_active: true,
            playback_resumes_when_entering_foreground: true,
            playback_pauses_when_route_changes: true,
            boundary_time_observer_multiplier: 0.25,
            periodic_time_interval: 0.5,
        }
    }
}

impl PlayerConfiguration {
    /// Load configuration from a JSON file
    pub fn load_from(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| PlayerError::ConfigurationFailure(format!("read failed: {}", e)))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| PlayerError::ConfigurationFailure(format!("parse failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| PlayerError::ConfigurationFailure(format!("serialize failed: {}", e)))?;
        std::fs::write(path, data)
            .map_err(|e| PlayerError::ConfigurationFailure(format!("write failed: {}", e)))?;
        Ok(())
    }

    /// Check the numeric fields hold usable values
    pub fn validate(&self) -> Result<()> {
        if self.buffer_observing_timeout <= 0.0
            || self.buffer_observing_time_interval <= 0.0
            || self.periodic_time_interval <= 0.0
            || self.preferred_timescale == 0
        {
            return Err(PlayerError::ConfigurationFailure(
                "non-positive interval or timescale".to_string(),
            ));
        }
        Ok(())
    }

    /// Buffering watchdog tick interval as a Duration
    pub fn buffer_tick_interval(&self) -> Duration {
        Duration::from_secs_f64(self.buffer_observing_time_interval)
    }

    /// Number of watchdog ticks before the buffering timeout elapses
    ///
    /// Seeded with the ceiling so expiry lands within one interval of the
    /// configured timeout.
    pub fn buffer_tick_budget(&self) -> u32 {
        (self.buffer_observing_timeout / self.buffer_observing_time_interval).ceil() as u32
    }

    /// Periodic time observation interval as a Duration
    pub fn periodic_interval(&self) -> Duration {
        Duration::from_secs_f64(self.periodic_time_interval)
    }
}

//! Interruption snapshot
//!
//! When an external interruption forces a pause, the controller records
//! what was interrupted and whether it may resume. At most one snapshot
//! exists at a time; a newer interruption overwrites fields rather than
//! stacking, and any explicit user command discards it.

use crate::player::PlaybackState;

/// What forced the interruption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionReason {
    /// The application resigned active
    AppResignedActive,

    /// The application entered the background
    AppEnteredBackground,

    /// The audio session was interrupted
    AudioSessionInterrupted,

    /// The audio route lost its external device
    RouteChanged,
}

/// Record of playback interrupted by an external event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSnapshot {
    /// State that was active when the interruption hit
    pub state: PlaybackState,

    /// Whether playback may resume once conditions allow
    pub should_resume: bool,

    /// What caused the interruption
    pub reason: InterruptionReason,
}

impl StateSnapshot {
    pub fn new(state: PlaybackState, should_resume: bool, reason: InterruptionReason) -> Self {
        Self {
            state,
            should_resume,
            reason,
        }
    }

    /// Overwrite this snapshot with a newer interruption
    pub fn overwrite(&mut self, state: PlaybackState, should_resume: bool, reason: InterruptionReason) {
        self.state = state;
        self.should_resume = should_resume;
        self.reason = reason;
    }
}

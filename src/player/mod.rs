//! Player module for playhead
//!
//! This module holds the playback state machine: the nine-variant state
//! enum with its derived predicates, the event surface delivered to
//! registered handlers, the typed reasons a command can be rejected with,
//! and the controller that owns exactly one state handler at a time.

mod controller;
mod states;

pub use controller::PlayerController;

use crate::rate::PlaybackRate;
use crate::utils::error::PlayerError;
use std::fmt;

/// Playback state
///
/// Exactly one is active at a time per controller. `Failed` is a unit
/// variant; the typed error is available from `PlayerController::error()`
/// and the `Failed` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No media loaded
    Idle,

    /// Media is being loaded
    Loading,

    /// Media loaded and ready, transport not started
    Loaded,

    /// Waiting for enough buffered data to play
    Buffering,

    /// Playback paused at the current position
    Paused,

    /// Transport advancing
    Playing,

    /// Transport stopped, engine item cleared
    Stopped,

    /// Waiting for connectivity to come back
    WaitingForNetwork,

    /// A failure occurred; re-load is the only recovery
    Failed,
}

impl PlaybackState {
    /// Buffering, playing or waiting for network
    pub fn is_playback_active(&self) -> bool {
        matches!(
            self,
            PlaybackState::Buffering | PlaybackState::Playing | PlaybackState::WaitingForNetwork
        )
    }

    /// Loading or loaded
    pub fn is_loading_active(&self) -> bool {
        matches!(self, PlaybackState::Loading | PlaybackState::Loaded)
    }

    /// Idle, paused, stopped or failed
    pub fn is_playback_inactive(&self) -> bool {
        matches!(
            self,
            PlaybackState::Idle
                | PlaybackState::Paused
                | PlaybackState::Stopped
                | PlaybackState::Failed
        )
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Loading => "loading",
            PlaybackState::Loaded => "loaded",
            PlaybackState::Buffering => "buffering",
            PlaybackState::Paused => "paused",
            PlaybackState::Playing => "playing",
            PlaybackState::Stopped => "stopped",
            PlaybackState::WaitingForNetwork => "waitingForNetwork",
            PlaybackState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Why a command was rejected
///
/// A rejection is not an error and never transitions state; it is reported
/// through [`PlayerEvent::ActionUnavailable`] so callers always get a
/// deterministic response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableActionReason {
    LoadMediaFirst,
    WaitTillMediaLoaded,
    ActionNotPermitted,
    AlreadyPlaying,
    AlreadyPaused,
    AlreadyStopped,
    AlreadyTryingToPlay,
    CanNotPlayAtSpecifiedRate,
    CanNotStepForward,
    CanNotStepBackward,
    SeekPositionNotAvailable,
    SeekOverstepPosition,
    WaitingForEstablishedNetwork,
    PlayerCanNoLongerPlay,
}

impl fmt::Display for UnavailableActionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnavailableActionReason::LoadMediaFirst => "load media first",
            UnavailableActionReason::WaitTillMediaLoaded => "wait till media is loaded",
            UnavailableActionReason::ActionNotPermitted => "action not permitted",
            UnavailableActionReason::AlreadyPlaying => "already playing",
            UnavailableActionReason::AlreadyPaused => "already paused",
            UnavailableActionReason::AlreadyStopped => "already stopped",
            UnavailableActionReason::AlreadyTryingToPlay => "already trying to play",
            UnavailableActionReason::CanNotPlayAtSpecifiedRate => "cannot play at specified rate",
            UnavailableActionReason::CanNotStepForward => "cannot step forward",
            UnavailableActionReason::CanNotStepBackward => "cannot step backward",
            UnavailableActionReason::SeekPositionNotAvailable => "seek position not available",
            UnavailableActionReason::SeekOverstepPosition => "seek oversteps media duration",
            UnavailableActionReason::WaitingForEstablishedNetwork => {
                "waiting for an established network"
            }
            UnavailableActionReason::PlayerCanNoLongerPlay => "player can no longer play",
        };
        write!(f, "{}", text)
    }
}

/// Options for loading media
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Start playback as soon as the media is ready
    pub autoplay: bool,

    /// Initial position in seconds, applied once loaded
    pub position: Option<f64>,
}

impl LoadOptions {
    pub fn autoplay() -> Self {
        Self {
            autoplay: true,
            position: None,
        }
    }

    pub fn autoplay_at(position: f64) -> Self {
        Self {
            autoplay: true,
            position: Some(position),
        }
    }
}

/// Player event for external event handling
///
/// Fired downstream of the state machine: state changes come from the
/// transition primitive, everything else from the active state or the
/// observers, never directly from a command method.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// The active state changed
    StateChanged { state: PlaybackState },

    /// The current media was replaced
    MediaChanged { source: String },

    /// The target playback rate changed
    RateChanged { rate: PlaybackRate },

    /// Periodic position report while playing
    PositionChanged { seconds: f64 },

    /// A boundary time point was crossed
    BoundaryReached { seconds: f64 },

    /// The current item played to its end
    PlayedToEnd,

    /// Output volume changed
    VolumeChanged { volume: f32 },

    /// Output mute state changed
    MuteChanged { muted: bool },

    /// A command was rejected with a typed reason
    ActionUnavailable { reason: UnavailableActionReason },

    /// The player entered the failed state
    Failed { error: PlayerError },
}

/// Player event handler trait
pub trait PlayerEventHandler: Send {
    /// Handle a player event
    fn handle_event(&mut self, event: PlayerEvent);
}

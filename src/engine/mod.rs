//! Engine contract for playhead
//!
//! The playback engine is the opaque platform primitive this crate
//! orchestrates. The crate never decodes or renders: it only drives the
//! engine through this narrow trait and reacts to the signals the embedder
//! feeds back as [`EngineEvent`]s.
//!
//! Asynchronous engine callbacks must be re-dispatched onto the thread that
//! owns the controller before being handed to
//! `PlayerController::handle_engine_event`; the controller is not internally
//! thread-safe against concurrent command calls.

use std::time::SystemTime;

/// Readiness status of the engine's current item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    /// The item has not been evaluated yet
    Unknown,

    /// The item can be played
    ReadyToPlay,

    /// The item can no longer be played
    Failed,
}

/// The engine transport's own view of what it is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeControlStatus {
    /// Transport is paused
    Paused,

    /// Transport wants to play but is waiting (see [`WaitingReason`])
    WaitingToPlay,

    /// Transport is advancing
    Playing,
}

/// Engine-reported reason for waiting to play
///
/// `Other` exists so an unenumerated platform-reported reason is data, not
/// a crash; the waiting-for-network state treats it like a buffering stall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitingReason {
    /// The engine is holding playback to avoid a stall
    ToMinimizeStalls,

    /// The engine is still evaluating whether the buffer can sustain playback
    EvaluatingBufferingRate,

    /// There is no item installed to play
    NoItemToPlay,

    /// Playback is parked on an interstitial
    InterstitialEvent,

    /// Any reason this crate does not enumerate
    Other(String),
}

/// Asynchronous signals from the engine
///
/// The embedder observes its platform player and forwards these, in delivery
/// order, to the controller.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The current item's readiness status changed
    ItemStatusChanged(ItemStatus),

    /// Buffering flags changed
    BufferStatusChanged {
        is_buffer_full: bool,
        is_likely_to_keep_up: bool,
    },

    /// Playback stalled mid-item
    PlaybackStalled,

    /// The current item played to its end
    PlayedToEnd,

    /// The current item cannot reach its end
    FailedToPlayToEnd { is_network_error: bool },

    /// The transport's time-control status changed
    TimeControlStatusChanged(TimeControlStatus),

    /// A previously issued seek finished (or was superseded)
    SeekCompleted { finished: bool },

    /// The engine itself is unrecoverable; re-loading cannot help
    EngineFailed { reason: String },
}

/// The opaque platform player primitive
///
/// Implemented by the embedder. The state machine mutates the current item
/// only from the state that owns it at the time: loading installs it,
/// stopped/failed/idle clear it.
pub trait PlaybackEngine: Send {
    /// Install or clear the engine's current playable item
    fn replace_current_item(&mut self, source: Option<&str>);

    /// Begin or resume transport
    fn play(&mut self);

    /// Pause transport
    fn pause(&mut self);

    /// Apply a rate multiplier (also starts transport on most engines)
    fn set_rate(&mut self, rate: f64);

    /// Current rate multiplier
    fn rate(&self) -> f64;

    /// Seek to a position in seconds with the given tolerances
    fn seek(&mut self, to_seconds: f64, tolerance_before: f64, tolerance_after: f64);

    /// Seek to a wall-clock date (live streams)
    fn seek_to_date(&mut self, date: SystemTime);

    /// Step the transport by the given frame count (negative steps back)
    fn step(&mut self, count: i64);

    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Item duration in seconds, if known (None for live/indeterminate)
    fn duration(&self) -> Option<f64>;

    /// Readiness status of the current item
    fn status(&self) -> ItemStatus;

    /// Whether the playback buffer is full
    fn is_buffer_full(&self) -> bool;

    /// Whether the engine believes playback can be sustained
    fn is_likely_to_keep_up(&self) -> bool;

    /// Why the transport is waiting to play, if it is
    fn reason_for_waiting(&self) -> Option<WaitingReason>;

    /// Whether the current item supports stepping by `count`
    fn can_step(&self, count: i64) -> bool;

    /// Set output volume (0.0 to 1.0)
    fn set_volume(&mut self, volume: f32);

    /// Current output volume
    fn volume(&self) -> f32;

    /// Mute or unmute output
    fn set_muted(&mut self, muted: bool);

    /// Whether output is muted
    fn is_muted(&self) -> bool;
}

//! Playhead - a playback-state orchestration layer
//!
//! Playhead wraps an opaque platform media player primitive (the "engine")
//! and presents a single coherent command surface (load/play/pause/seek/
//! step/fast-forward/rewind) while internally tracking which of nine
//! mutually-exclusive playback states the engine is in, reacting to
//! asynchronous readiness/buffering/network/audio-route/app-lifecycle
//! signals, and re-entering consistent states after interruptions.
//!
//! The crate does not decode, render or touch the OS itself: the engine,
//! the media item and every OS notification source are narrow traits and
//! signal enums implemented by the embedder.

pub mod engine;
pub mod media;
pub mod observers;
pub mod player;
pub mod rate;
pub mod seek;
pub mod utils;

pub use engine::{EngineEvent, ItemStatus, PlaybackEngine, TimeControlStatus, WaitingReason};
pub use media::{CurrentMedia, MediaItem, MediaLifecycle, TimeRange};
pub use observers::{
    AppLifecycleEvent, AudioSessionEvent, InterruptionReason, NetworkStatus, StateSnapshot,
};
pub use player::{
    LoadOptions, PlaybackState, PlayerController, PlayerEvent, PlayerEventHandler,
    UnavailableActionReason,
};
pub use rate::PlaybackRate;
pub use seek::{SeekCompletion, SeekPosition, SeekTarget};
pub use utils::config::PlayerConfiguration;
pub use utils::error::{AssetFailure, ItemFailure, ItemPlaybackFailure, PlayerError, Result};

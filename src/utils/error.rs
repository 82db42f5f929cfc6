//! Error types for playhead
//!
//! This module defines the typed failures the state machine can report.
//! We use thiserror for convenient error type definitions. Note that a
//! rejected command (wrong state, unsupported rate, unseekable position)
//! is *not* an error: it is reported through the unavailable-action event
//! channel and never transitions state.

use thiserror::Error;

/// Main error type for playhead
///
/// Engine and asset failures are caught at the narrowest point (the Loading
/// state, the readiness signals) and translated into a transition to the
/// failed state carrying one of these values. They are never thrown across
/// the command surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    /// A transport command arrived while the engine has no current item
    #[error("no item to play")]
    NoItemToPlay,

    /// The current item stopped making progress and cannot reach its end
    #[error("item failed to play to end time")]
    ItemFailedToPlayToEndTime,

    /// The engine itself is unrecoverable; even re-loading is rejected
    #[error("player can no longer play: {reason}")]
    PlayerCanNoLongerPlay { reason: String },

    /// Asset-stage loading failure
    #[error("asset loading failed: {0}")]
    AssetLoadingFailed(#[from] AssetFailure),

    /// Playable-item-stage loading failure
    #[error("player item loading failed: {0}")]
    PlayerItemLoadingFailed(#[from] ItemFailure),

    /// The item loaded but playback of it failed
    #[error("player item failed to play: {0}")]
    PlayerItemFailedToPlay(#[from] ItemPlaybackFailure),

    /// Audio session collaborator failure, surfaced through the same channel
    #[error("audio session failure: {0}")]
    AudioSessionFailure(String),

    /// Now-playing session collaborator failure
    #[error("now playing session failure: {0}")]
    NowPlayingSessionFailure(String),

    /// Configuration could not be loaded or holds unusable values
    #[error("configuration error: {0}")]
    ConfigurationFailure(String),
}

/// Why an asset could not be initialized
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetFailure {
    /// The resource exists but is not playable media
    #[error("asset is not playable")]
    NotPlayable,

    /// The resource is DRM-protected and cannot be opened here
    #[error("asset has protected content")]
    ProtectedContent,

    /// A required asset property could not be loaded
    #[error("asset property loading failed: {0}")]
    PropertyKeyLoadingFailed(String),

    /// The asset is remote and there is no connectivity
    #[error("not connected to internet")]
    NotConnectedToInternet,

    /// Any other initialization failure
    #[error("asset initialization failed: {0}")]
    AssetInitializationFailed(String),
}

/// Why a playable item could not be created or readied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemFailure {
    /// The engine reported a failed status while readying the item
    #[error("item status loading failed: {0}")]
    StatusLoadingFailed(String),

    /// The asset handed to the item was rejected by the engine
    #[error("invalid asset")]
    InvalidAsset,
}

/// Why a readied item failed during playback
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItemPlaybackFailure {
    /// The engine reported a non-recoverable failure mid-item
    #[error("failed to play to end time")]
    FailedToPlayToEndTime,
}

/// Convenience type alias for Results in playhead
pub type Result<T> = std::result::Result<T, PlayerError>;

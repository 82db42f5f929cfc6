//! Media item contract and loading pipeline for playhead
//!
//! A media item is one loadable unit. The item itself (asset creation,
//! property fetching, playability validation, playable-item creation) is an
//! external capability implemented by the embedder; this module defines the
//! trait, the item lifecycle the controller tracks alongside it, and the
//! cancellable worker that sequences the loading steps off the owner thread.

use crate::rate::PlaybackRate;
use crate::utils::error::{AssetFailure, ItemFailure, PlayerError};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// A half-open interval of the media timeline, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Whether `t` falls inside `[start, end)`
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

/// Whether any of `ranges` contains `t`
pub fn ranges_contain(ranges: &[TimeRange], t: f64) -> bool {
    ranges.iter().any(|r| r.contains(t))
}

/// Loading lifecycle of the current media item
///
/// Progression is `Idle -> AssetLoaded -> PlayerItemLoaded -> ReadyToPlay`,
/// or `-> Failed` from any loading step. The controller keeps this jointly
/// consistent with its own playback state: playing implies `ReadyToPlay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaLifecycle {
    /// Nothing loaded yet
    Idle,

    /// The asset exists and its properties can be fetched
    AssetLoaded,

    /// A playable item was created from the asset
    PlayerItemLoaded,

    /// The engine accepted the item and can play it
    ReadyToPlay,

    /// A loading step failed
    Failed,
}

/// One loadable unit of media (external capability)
///
/// `fetch_asset_properties` and `validate_playability` take `&self` so the
/// loading worker can run them concurrently; implementations synchronize
/// internally if they share state.
pub trait MediaItem: Send + Sync {
    /// Identifier of the underlying resource (URL or path)
    fn source(&self) -> &str;

    /// Create the loadable asset representation
    fn create_asset(&mut self) -> Result<(), AssetFailure>;

    /// Load the asset property values (network/disk bound, cancellable)
    fn fetch_asset_properties(&self) -> Result<(), AssetFailure>;

    /// Check the asset is playable, distinguishing not-playable, protected
    /// content, missing connectivity and other failures
    fn validate_playability(&self) -> Result<(), AssetFailure>;

    /// Create the engine-ready playable item from the asset
    fn create_playable_item(&mut self) -> Result<(), ItemFailure>;

    /// Abort an in-flight asset initialization
    fn abort_asset_initialization(&mut self);

    /// Duration in seconds, None while unknown or for live media
    fn duration(&self) -> Option<f64>;

    /// Timeline intervals that are currently seek-targetable
    fn seekable_ranges(&self) -> Vec<TimeRange>;

    /// Timeline intervals that are already fetched
    fn loaded_ranges(&self) -> Vec<TimeRange>;

    /// Whether the item supports playback at the given rate
    fn can_play_at(&self, rate: PlaybackRate) -> bool;

    /// Whether the item supports stepping by the given frame count
    fn can_step(&self, count: i64) -> bool;
}

/// The controller's bookkeeping for the current media
///
/// Replaced wholesale on `load`. The boxed item travels to the loading
/// worker and returns with the `ItemCreated` progress signal, so `item` is
/// None while a load is in flight.
pub struct CurrentMedia {
    pub source: String,
    pub lifecycle: MediaLifecycle,
    pub item: Option<Box<dyn MediaItem>>,
}

impl CurrentMedia {
    pub fn new(source: String) -> Self {
        Self {
            source,
            lifecycle: MediaLifecycle::Idle,
            item: None,
        }
    }

    /// Whether the media finished loading and can be played
    pub fn is_ready(&self) -> bool {
        self.lifecycle == MediaLifecycle::ReadyToPlay
    }

    /// Whether the media is mid-load
    pub fn is_loading(&self) -> bool {
        matches!(
            self.lifecycle,
            MediaLifecycle::Idle | MediaLifecycle::AssetLoaded | MediaLifecycle::PlayerItemLoaded
        )
    }
}

impl std::fmt::Debug for CurrentMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentMedia")
            .field("source", &self.source)
            .field("lifecycle", &self.lifecycle)
            .field("item", &self.item.as_ref().map(|i| i.source().to_string()))
            .finish()
    }
}

/// Progress signals emitted by the loading worker
pub enum LoadProgress {
    /// `create_asset` succeeded
    AssetCreated,

    /// Property fetch and playability validation both succeeded
    AssetReady,

    /// The playable item exists; ownership of the media returns with it
    ItemCreated(Box<dyn MediaItem>),

    /// A loading step failed (suppressed when the load was cancelled)
    Failed(PlayerError),
}

impl std::fmt::Debug for LoadProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadProgress::AssetCreated => write!(f, "AssetCreated"),
            LoadProgress::AssetReady => write!(f, "AssetReady"),
            LoadProgress::ItemCreated(item) => write!(f, "ItemCreated({})", item.source()),
            LoadProgress::Failed(e) => write!(f, "Failed({})", e),
        }
    }
}

/// Spawn the loading worker for `item`
///
/// Sequencing: create asset, then property fetch and playability validation
/// concurrently, then playable-item creation. The worker checks `cancelled`
/// between steps; once set, it aborts the item and stops emitting, so late
/// failures after an explicit abort are swallowed rather than reported.
pub fn spawn_loader(
    mut item: Box<dyn MediaItem>,
    cancelled: Arc<AtomicBool>,
    emit: impl Fn(LoadProgress) + Send + 'static,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let source = item.source().to_string();
        debug!("loader: starting asset initialization for {}", source);

        if let Err(e) = item.create_asset() {
            if !cancelled.load(Ordering::SeqCst) {
                warn!("loader: asset creation failed for {}: {}", source, e);
                emit(LoadProgress::Failed(PlayerError::AssetLoadingFailed(e)));
            }
            return;
        }
        if cancelled.load(Ordering::SeqCst) {
            item.abort_asset_initialization();
            return;
        }
        emit(LoadProgress::AssetCreated);

        let readiness = thread::scope(|s| {
            let item_ref: &dyn MediaItem = &*item;
            let fetch = s.spawn(move || item_ref.fetch_asset_properties());
            let validate = s.spawn(move || item_ref.validate_playability());
            let fetched = fetch.join().unwrap_or_else(|_| {
                Err(AssetFailure::PropertyKeyLoadingFailed(
                    "property loader panicked".to_string(),
                ))
            });
            let validated = validate.join().unwrap_or_else(|_| {
                Err(AssetFailure::AssetInitializationFailed(
                    "playability validation panicked".to_string(),
                ))
            });
            fetched.and(validated)
        });
        if cancelled.load(Ordering::SeqCst) {
            item.abort_asset_initialization();
            return;
        }
        if let Err(e) = readiness {
            warn!("loader: asset readiness failed for {}: {}", source, e);
            emit(LoadProgress::Failed(PlayerError::AssetLoadingFailed(e)));
            return;
        }
        emit(LoadProgress::AssetReady);

        if let Err(e) = item.create_playable_item() {
            if !cancelled.load(Ordering::SeqCst) {
                warn!("loader: playable item creation failed for {}: {}", source, e);
                emit(LoadProgress::Failed(PlayerError::PlayerItemLoadingFailed(e)));
            }
            return;
        }
        if cancelled.load(Ordering::SeqCst) {
            item.abort_asset_initialization();
            return;
        }
        debug!("loader: playable item created for {}", source);
        emit(LoadProgress::ItemCreated(item));
    })
}

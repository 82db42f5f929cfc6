//! Loading state: drives the media item through its asset pipeline
//!
//! Owns the loader worker. Lifecycle signals from the worker advance the
//! media through asset creation, readiness validation and playable-item
//! creation; the item is then installed into the engine and the state waits
//! for the engine to report ready-to-play. Any step's failure moves to
//! failed unless the load was already aborted, in which case late failures
//! are swallowed.

use crate::engine::{EngineEvent, ItemStatus};
use crate::media::{spawn_loader, CurrentMedia, LoadProgress, MediaItem, MediaLifecycle};
use crate::player::controller::PlayerContext;
use crate::player::states::support::{InternalSignal, TaggedSignal};
use crate::player::states::{
    FailedState, LoadIntent, LoadedState, StateHandler, StoppedState, Transition,
};
use crate::player::{PlaybackState, PlayerEvent, UnavailableActionReason};
use crate::rate::PlaybackRate;
use crate::seek::SeekTarget;
use crate::utils::error::{ItemFailure, PlayerError};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub(crate) struct LoadingState {
    item: Option<Box<dyn MediaItem>>,
    intent: LoadIntent,
    cancelled: Arc<AtomicBool>,
}

impl LoadingState {
    pub fn new(item: Box<dyn MediaItem>, intent: LoadIntent) -> Self {
        Self {
            item: Some(item),
            intent,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    fn abort(&mut self, ctx: &mut PlayerContext) {
        self.cancelled.store(true, Ordering::SeqCst);
        if ctx.engine_item_installed {
            ctx.engine.replace_current_item(None);
            ctx.engine_item_installed = false;
        }
    }
}

impl StateHandler for LoadingState {
    fn playback_state(&self) -> PlaybackState {
        PlaybackState::Loading
    }

    fn did_enter(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        let Some(item) = self.item.take() else {
            return None;
        };
        let source = item.source().to_string();

        ctx.error = None;
        ctx.media = Some(CurrentMedia::new(source.clone()));
        ctx.emit(PlayerEvent::MediaChanged { source });

        let tx = ctx.signal_tx.clone();
        let epoch = ctx.epoch;
        // The worker is detached; it exits on its own after the last
        // progress signal or once the cancel flag is observed.
        let _worker = spawn_loader(item, Arc::clone(&self.cancelled), move |progress| {
            let _ = tx.send(TaggedSignal {
                epoch,
                signal: InternalSignal::Load(progress),
            });
        });
        None
    }

    fn will_exit(&mut self, _ctx: &mut PlayerContext) {
        // If the worker is still running this silences it; if it already
        // finished the flag is never read again.
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn play(&mut self, _ctx: &mut PlayerContext) -> Option<Transition> {
        // Queued intent, replayed once the media is ready.
        self.intent.autoplay = true;
        None
    }

    fn play_at(&mut self, ctx: &mut PlayerContext, rate: PlaybackRate) -> Option<Transition> {
        self.intent.autoplay = true;
        ctx.rate = rate;
        None
    }

    fn pause(&mut self, _ctx: &mut PlayerContext) -> Option<Transition> {
        self.intent.autoplay = false;
        None
    }

    fn stop(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        self.abort(ctx);
        Transition::to(StoppedState)
    }

    fn seek(&mut self, ctx: &mut PlayerContext, mut target: SeekTarget) -> Option<Transition> {
        if let Some(completion) = target.completion.take() {
            completion(false);
        }
        ctx.reject(UnavailableActionReason::WaitTillMediaLoaded)
    }

    fn step(&mut self, ctx: &mut PlayerContext, _count: i64) -> Option<Transition> {
        ctx.reject(UnavailableActionReason::WaitTillMediaLoaded)
    }

    fn on_internal_signal(
        &mut self,
        ctx: &mut PlayerContext,
        signal: InternalSignal,
    ) -> Option<Transition> {
        let InternalSignal::Load(progress) = signal else {
            return None;
        };
        match progress {
            LoadProgress::AssetCreated => {
                if let Some(media) = ctx.media.as_mut() {
                    media.lifecycle = MediaLifecycle::AssetLoaded;
                }
                None
            }
            LoadProgress::AssetReady => {
                debug!("loading: asset properties loaded and playable");
                None
            }
            LoadProgress::ItemCreated(item) => {
                let source = item.source().to_string();
                if let Some(media) = ctx.media.as_mut() {
                    media.lifecycle = MediaLifecycle::PlayerItemLoaded;
                    media.item = Some(item);
                }
                ctx.engine.replace_current_item(Some(&source));
                ctx.engine_item_installed = true;

                // The engine may already know the item's readiness.
                match ctx.engine.status() {
                    ItemStatus::ReadyToPlay => {
                        if let Some(media) = ctx.media.as_mut() {
                            media.lifecycle = MediaLifecycle::ReadyToPlay;
                        }
                        Transition::to(LoadedState::new(self.intent))
                    }
                    ItemStatus::Failed => Transition::to(FailedState::new(
                        PlayerError::PlayerItemLoadingFailed(ItemFailure::StatusLoadingFailed(
                            "engine rejected the installed item".to_string(),
                        )),
                    )),
                    ItemStatus::Unknown => None,
                }
            }
            LoadProgress::Failed(error) => Transition::to(FailedState::new(error)),
        }
    }

    fn on_engine_event(
        &mut self,
        ctx: &mut PlayerContext,
        event: &EngineEvent,
    ) -> Option<Transition> {
        match event {
            EngineEvent::ItemStatusChanged(ItemStatus::ReadyToPlay)
                if ctx.engine_item_installed =>
            {
                if let Some(media) = ctx.media.as_mut() {
                    media.lifecycle = MediaLifecycle::ReadyToPlay;
                }
                Transition::to(LoadedState::new(self.intent))
            }
            EngineEvent::ItemStatusChanged(ItemStatus::Failed) => Transition::to(FailedState::new(
                PlayerError::PlayerItemLoadingFailed(ItemFailure::StatusLoadingFailed(
                    "engine reported failed status".to_string(),
                )),
            )),
            _ => None,
        }
    }
}

//! Loaded state: media ready, transport not started
//!
//! Applies any position the load was requested at, then hands off to
//! buffering when the load carried autoplay intent.

use crate::engine::{EngineEvent, ItemStatus};
use crate::player::controller::PlayerContext;
use crate::player::states::{
    BufferingCarry, BufferingState, FailedState, LoadIntent, StateHandler, StoppedState,
    Transition,
};
use crate::player::{PlaybackState, UnavailableActionReason};
use crate::rate::PlaybackRate;
use crate::seek::SeekTarget;
use crate::utils::error::{ItemFailure, PlayerError};

pub(crate) struct LoadedState {
    intent: LoadIntent,
}

impl LoadedState {
    pub fn new(intent: LoadIntent) -> Self {
        Self { intent }
    }
}

impl StateHandler for LoadedState {
    fn playback_state(&self) -> PlaybackState {
        PlaybackState::Loaded
    }

    fn did_enter(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        if let Some(position) = self.intent.position.take() {
            let timescale = ctx.config.preferred_timescale;
            ctx.seeker
                .perform(ctx.engine.as_mut(), SeekTarget::time(position), timescale);
        }
        if self.intent.autoplay {
            return Transition::to(BufferingState::new(BufferingCarry::new(
                true,
                PlaybackState::Loaded,
            )));
        }
        None
    }

    fn play(&mut self, _ctx: &mut PlayerContext) -> Option<Transition> {
        Transition::to(BufferingState::new(BufferingCarry::new(
            true,
            PlaybackState::Loaded,
        )))
    }

    fn play_at(&mut self, ctx: &mut PlayerContext, rate: PlaybackRate) -> Option<Transition> {
        ctx.rate = rate;
        Transition::to(BufferingState::new(
            BufferingCarry::new(true, PlaybackState::Loaded).with_rate(Some(rate)),
        ))
    }

    fn pause(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        if self.intent.autoplay {
            // Cancel queued autoplay instead of rejecting.
            self.intent.autoplay = false;
            None
        } else {
            ctx.reject(UnavailableActionReason::AlreadyPaused)
        }
    }

    fn stop(&mut self, _ctx: &mut PlayerContext) -> Option<Transition> {
        Transition::to(StoppedState)
    }

    fn seek(&mut self, _ctx: &mut PlayerContext, target: SeekTarget) -> Option<Transition> {
        Transition::to(BufferingState::new(
            BufferingCarry::new(false, PlaybackState::Loaded).with_seek(target),
        ))
    }

    fn step(&mut self, ctx: &mut PlayerContext, count: i64) -> Option<Transition> {
        ctx.engine.step(count);
        None
    }

    fn on_engine_event(
        &mut self,
        _ctx: &mut PlayerContext,
        event: &EngineEvent,
    ) -> Option<Transition> {
        match event {
            EngineEvent::ItemStatusChanged(ItemStatus::Failed) => {
                Transition::to(FailedState::new(PlayerError::PlayerItemLoadingFailed(
                    ItemFailure::StatusLoadingFailed("engine reported failed status".to_string()),
                )))
            }
            _ => None,
        }
    }
}

//! Failed state: a typed error ended playback
//!
//! Entry reports the error to the registered handlers synchronously, before
//! any further command can change state. Re-`load` is the only recovery
//! path; when the engine itself is unrecoverable even `load` is rejected by
//! the controller.

use crate::media::MediaLifecycle;
use crate::player::controller::PlayerContext;
use crate::player::states::{StateHandler, Transition};
use crate::player::{PlaybackState, PlayerEvent, UnavailableActionReason};
use crate::rate::PlaybackRate;
use crate::seek::SeekTarget;
use crate::utils::error::PlayerError;
use log::error;

pub(crate) struct FailedState {
    error: PlayerError,
}

impl FailedState {
    pub fn new(error: PlayerError) -> Self {
        Self { error }
    }

    fn rejection(ctx: &PlayerContext) -> UnavailableActionReason {
        if ctx.engine_fatal {
            UnavailableActionReason::PlayerCanNoLongerPlay
        } else {
            UnavailableActionReason::LoadMediaFirst
        }
    }
}

impl StateHandler for FailedState {
    fn playback_state(&self) -> PlaybackState {
        PlaybackState::Failed
    }

    fn did_enter(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        error!("player: failed: {}", self.error);
        if matches!(self.error, PlayerError::PlayerCanNoLongerPlay { .. }) {
            ctx.engine_fatal = true;
        }
        ctx.engine.pause();
        ctx.engine.replace_current_item(None);
        ctx.engine_item_installed = false;
        ctx.seeker.supersede();
        if let Some(media) = ctx.media.as_mut() {
            media.lifecycle = MediaLifecycle::Failed;
        }
        ctx.error = Some(self.error.clone());
        ctx.emit(PlayerEvent::Failed {
            error: self.error.clone(),
        });
        None
    }

    fn play(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        let reason = Self::rejection(ctx);
        ctx.reject(reason)
    }

    fn play_at(&mut self, ctx: &mut PlayerContext, _rate: PlaybackRate) -> Option<Transition> {
        let reason = Self::rejection(ctx);
        ctx.reject(reason)
    }

    fn pause(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        let reason = Self::rejection(ctx);
        ctx.reject(reason)
    }

    fn stop(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        let reason = Self::rejection(ctx);
        ctx.reject(reason)
    }

    fn seek(&mut self, ctx: &mut PlayerContext, mut target: SeekTarget) -> Option<Transition> {
        if let Some(completion) = target.completion.take() {
            completion(false);
        }
        let reason = Self::rejection(ctx);
        ctx.reject(reason)
    }

    fn step(&mut self, ctx: &mut PlayerContext, _count: i64) -> Option<Transition> {
        let reason = Self::rejection(ctx);
        ctx.reject(reason)
    }
}

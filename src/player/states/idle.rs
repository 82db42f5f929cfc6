//! Idle state: no media loaded
//!
//! The initial state. Every transport command is rejected until media is
//! loaded; `load` is handled by the controller and replaces this handler
//! with a loading one.

use crate::player::controller::PlayerContext;
use crate::player::states::{StateHandler, Transition};
use crate::player::{PlaybackState, UnavailableActionReason};
use crate::rate::PlaybackRate;
use crate::seek::SeekTarget;

pub(crate) struct IdleState;

impl StateHandler for IdleState {
    fn playback_state(&self) -> PlaybackState {
        PlaybackState::Idle
    }

    fn did_enter(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        // Idle owns no media: make sure the engine agrees.
        if ctx.engine_item_installed {
            ctx.engine.replace_current_item(None);
            ctx.engine_item_installed = false;
        }
        None
    }

    fn play(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        ctx.reject(UnavailableActionReason::LoadMediaFirst)
    }

    fn play_at(&mut self, ctx: &mut PlayerContext, _rate: PlaybackRate) -> Option<Transition> {
        ctx.reject(UnavailableActionReason::LoadMediaFirst)
    }

    fn pause(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        ctx.reject(UnavailableActionReason::LoadMediaFirst)
    }

    fn stop(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        ctx.reject(UnavailableActionReason::AlreadyStopped)
    }

    fn seek(&mut self, ctx: &mut PlayerContext, mut target: SeekTarget) -> Option<Transition> {
        if let Some(completion) = target.completion.take() {
            completion(false);
        }
        ctx.reject(UnavailableActionReason::LoadMediaFirst)
    }

    fn step(&mut self, ctx: &mut PlayerContext, _count: i64) -> Option<Transition> {
        ctx.reject(UnavailableActionReason::LoadMediaFirst)
    }
}

//! Stopped state: transport halted, engine item cleared
//!
//! Reached by an explicit `stop()` or by playing to the end from a
//! buffering detour. Only a new `load` leaves this state.

use crate::player::controller::PlayerContext;
use crate::player::states::{FailedState, StateHandler, Transition};
use crate::player::{PlaybackState, UnavailableActionReason};
use crate::rate::PlaybackRate;
use crate::seek::SeekTarget;
use crate::engine::{EngineEvent, ItemStatus};
use crate::utils::error::{ItemFailure, PlayerError};

pub(crate) struct StoppedState;

impl StateHandler for StoppedState {
    fn playback_state(&self) -> PlaybackState {
        PlaybackState::Stopped
    }

    fn did_enter(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        ctx.engine.pause();
        // Stopped relinquishes the engine item; a later play must re-load.
        ctx.engine.replace_current_item(None);
        ctx.engine_item_installed = false;
        ctx.seeker.supersede();
        None
    }

    fn play(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        ctx.reject(UnavailableActionReason::LoadMediaFirst)
    }

    fn play_at(&mut self, ctx: &mut PlayerContext, _rate: PlaybackRate) -> Option<Transition> {
        ctx.reject(UnavailableActionReason::LoadMediaFirst)
    }

    fn pause(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        ctx.reject(UnavailableActionReason::AlreadyStopped)
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

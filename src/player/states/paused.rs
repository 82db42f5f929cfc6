//! Paused state: transport halted at the current position
//!
//! Also the landing state after playing to the end; playing again from
//! there restarts from the beginning.

use crate::engine::{EngineEvent, ItemStatus};
use crate::player::controller::PlayerContext;
use crate::player::states::{
    BufferingCarry, BufferingState, FailedState, LoadIntent, LoadingState, StateHandler,
    StoppedState, Transition, WaitingForNetworkState,
};
use crate::player::{PlaybackState, UnavailableActionReason};
use crate::rate::PlaybackRate;
use crate::seek::SeekTarget;
use crate::utils::error::PlayerError;

pub(crate) struct PausedState {
    played_to_end: bool,
}

impl PausedState {
    pub fn new(played_to_end: bool) -> Self {
        Self { played_to_end }
    }

    fn resume(&mut self, ctx: &mut PlayerContext, rate: Option<PlaybackRate>) -> Option<Transition> {
        if !ctx.media_is_ready() {
            // The media lost readiness (e.g. a recovery path); run the full
            // load again with play intent.
            let item = ctx.media.as_mut().and_then(|m| m.item.take());
            return match item {
                Some(item) => Transition::to(LoadingState::new(
                    item,
                    LoadIntent {
                        autoplay: true,
                        position: None,
                    },
                )),
                None => ctx.reject(UnavailableActionReason::LoadMediaFirst),
            };
        }
        let mut carry = BufferingCarry::new(true, PlaybackState::Paused).with_rate(rate);
        if self.played_to_end {
            // Restart from the top after end of media.
            carry = carry.with_seek(SeekTarget::time(0.0));
        }
        Transition::to(BufferingState::new(carry))
    }
}

impl StateHandler for PausedState {
    fn playback_state(&self) -> PlaybackState {
        PlaybackState::Paused
    }

    fn did_enter(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        ctx.engine.pause();
        None
    }

    fn play(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        self.resume(ctx, None)
    }

    fn play_at(&mut self, ctx: &mut PlayerContext, rate: PlaybackRate) -> Option<Transition> {
        ctx.rate = rate;
        self.resume(ctx, Some(rate))
    }

    fn pause(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        ctx.reject(UnavailableActionReason::AlreadyPaused)
    }

    fn stop(&mut self, _ctx: &mut PlayerContext) -> Option<Transition> {
        Transition::to(StoppedState)
    }

    fn seek(&mut self, _ctx: &mut PlayerContext, target: SeekTarget) -> Option<Transition> {
        Transition::to(BufferingState::new(
            BufferingCarry::new(false, PlaybackState::Paused).with_seek(target),
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
            EngineEvent::FailedToPlayToEnd { is_network_error } => {
                if *is_network_error {
                    Transition::to(WaitingForNetworkState::new(BufferingCarry::new(
                        false,
                        PlaybackState::Paused,
                    )))
                } else {
                    Transition::to(FailedState::new(PlayerError::ItemFailedToPlayToEndTime))
                }
            }
            EngineEvent::ItemStatusChanged(ItemStatus::Failed) => {
                Transition::to(FailedState::new(PlayerError::PlayerItemLoadingFailed(
                    crate::utils::error::ItemFailure::StatusLoadingFailed(
                        "engine reported failed status".to_string(),
                    ),
                )))
            }
            _ => None,
        }
    }
}

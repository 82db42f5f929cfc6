//! Waiting-for-network state: playback parked until connectivity returns
//!
//! Carries everything the interrupted playback needs to resume: the
//! autoplay flag, an in-flight rate request, the state that was active
//! before buffering began, and any seek requested while waiting. When the
//! path becomes satisfied the whole carry hands off to a fresh buffering
//! state, which applies the pending seek immediately after install.

use crate::engine::{EngineEvent, ItemStatus, WaitingReason};
use crate::observers::NetworkStatus;
use crate::player::controller::PlayerContext;
use crate::player::states::{
    BufferingCarry, BufferingState, FailedState, LoadIntent, LoadingState, StateHandler,
    PausedState, StoppedState, Transition,
};
use crate::player::{PlaybackState, UnavailableActionReason};
use crate::rate::PlaybackRate;
use crate::seek::SeekTarget;
use crate::utils::error::PlayerError;
use log::{debug, info};

pub(crate) struct WaitingForNetworkState {
    autoplay: bool,
    rate: Option<PlaybackRate>,
    prior: PlaybackState,
    pending_seek: Option<SeekTarget>,
}

impl WaitingForNetworkState {
    pub fn new(carry: BufferingCarry) -> Self {
        Self {
            autoplay: carry.autoplay,
            rate: carry.rate,
            prior: carry.prior,
            pending_seek: carry.pending_seek,
        }
    }

    fn carry(&mut self) -> BufferingCarry {
        BufferingCarry {
            autoplay: self.autoplay,
            rate: self.rate.take(),
            prior: self.prior,
            pending_seek: self.pending_seek.take(),
        }
    }

    fn discard_pending_seek(&mut self) {
        if let Some(mut target) = self.pending_seek.take() {
            if let Some(completion) = target.completion.take() {
                completion(false);
            }
        }
    }

    /// Decide where a play request goes once the network is satisfied
    fn resume_with_network(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        self.autoplay = true;
        match ctx.engine.reason_for_waiting() {
            Some(WaitingReason::NoItemToPlay) => {
                let item = ctx.media.as_mut().and_then(|m| m.item.take());
                match item {
                    Some(item) => Transition::to(LoadingState::new(
                        item,
                        LoadIntent {
                            autoplay: true,
                            position: None,
                        },
                    )),
                    None => ctx.reject(UnavailableActionReason::LoadMediaFirst),
                }
            }
            // Every other reason, enumerated or not, resolves by buffering.
            other => {
                debug!("waitingForNetwork: resuming via buffering ({:?})", other);
                Transition::to(BufferingState::new(self.carry()))
            }
        }
    }
}

impl StateHandler for WaitingForNetworkState {
    fn playback_state(&self) -> PlaybackState {
        PlaybackState::WaitingForNetwork
    }

    fn did_enter(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        info!("player: waiting for established network");
        ctx.engine.pause();
        None
    }

    fn play(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        if !ctx.network.is_satisfied() {
            // Remember the intent; it replays when the path comes back.
            self.autoplay = true;
            return ctx.reject(UnavailableActionReason::WaitingForEstablishedNetwork);
        }
        self.resume_with_network(ctx)
    }

    fn play_at(&mut self, ctx: &mut PlayerContext, rate: PlaybackRate) -> Option<Transition> {
        ctx.rate = rate;
        self.rate = Some(rate);
        if !ctx.network.is_satisfied() {
            self.autoplay = true;
            return ctx.reject(UnavailableActionReason::WaitingForEstablishedNetwork);
        }
        self.resume_with_network(ctx)
    }

    fn pause(&mut self, _ctx: &mut PlayerContext) -> Option<Transition> {
        self.discard_pending_seek();
        Transition::to(PausedState::new(false))
    }

    fn stop(&mut self, _ctx: &mut PlayerContext) -> Option<Transition> {
        self.discard_pending_seek();
        Transition::to(StoppedState)
    }

    fn seek(&mut self, _ctx: &mut PlayerContext, target: SeekTarget) -> Option<Transition> {
        // Stored, not performed: applied on the next transition to buffering.
        self.discard_pending_seek();
        self.pending_seek = Some(target);
        None
    }

    fn step(&mut self, ctx: &mut PlayerContext, _count: i64) -> Option<Transition> {
        ctx.reject(UnavailableActionReason::ActionNotPermitted)
    }

    fn on_network_status(
        &mut self,
        _ctx: &mut PlayerContext,
        status: NetworkStatus,
    ) -> Option<Transition> {
        match status {
            NetworkStatus::Satisfied => {
                info!("player: network satisfied, resuming via buffering");
                Transition::to(BufferingState::new(self.carry()))
            }
            NetworkStatus::Unsatisfied => None,
        }
    }

    fn on_engine_event(
        &mut self,
        _ctx: &mut PlayerContext,
        event: &EngineEvent,
    ) -> Option<Transition> {
        match event {
            EngineEvent::ItemStatusChanged(ItemStatus::Failed) => {
                Transition::to(FailedState::new(PlayerError::PlayerItemLoadingFailed(
                    crate::utils::error::ItemFailure::StatusLoadingFailed(
                        "engine reported failed status".to_string(),
                    ),
                )))
            }
            EngineEvent::FailedToPlayToEnd {
                is_network_error: false,
            } => Transition::to(FailedState::new(PlayerError::ItemFailedToPlayToEndTime)),
            _ => None,
        }
    }
}

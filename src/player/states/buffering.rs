//! Buffering state: playback held while the engine fills its buffer
//!
//! Owns the buffering watchdog: a repeating ticker seeded from the
//! configured timeout. The watchdog and the connectivity signal race to
//! move the machine to waiting-for-network; whichever fires first wins and
//! the loser is cancelled as part of the transition teardown. When the
//! buffer becomes ready first, playback starts (autoplay) or the state that
//! was active before buffering began is restored.

use crate::engine::{EngineEvent, ItemStatus};
use crate::observers::NetworkStatus;
use crate::player::controller::PlayerContext;
use crate::player::states::support::{InternalSignal, Ticker};
use crate::player::states::{
    BufferingCarry, FailedState, LoadIntent, LoadedState, PausedState, PlayingState, StateHandler,
    StoppedState, Transition, WaitingForNetworkState,
};
use crate::player::{PlaybackState, UnavailableActionReason};
use crate::rate::PlaybackRate;
use crate::seek::SeekTarget;
use crate::utils::error::PlayerError;
use log::{debug, warn};

pub(crate) struct BufferingState {
    autoplay: bool,
    rate: Option<PlaybackRate>,
    prior: PlaybackState,
    pending_seek: Option<SeekTarget>,
    remaining_ticks: u32,
    ticker: Option<Ticker>,
}

impl BufferingState {
    pub fn new(carry: BufferingCarry) -> Self {
        Self {
            autoplay: carry.autoplay,
            rate: carry.rate,
            prior: carry.prior,
            pending_seek: carry.pending_seek,
            remaining_ticks: 0,
            ticker: None,
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

    /// Proceed if the buffer is ready and no seek is in flight
    fn evaluate(&mut self, ctx: &mut PlayerContext, buffered: bool) -> Option<Transition> {
        if !buffered || ctx.seeker.is_seeking() {
            return None;
        }
        if self.autoplay {
            Transition::to(PlayingState::new(self.rate.take()))
        } else {
            self.revert(ctx)
        }
    }

    /// Restore the state that was active before buffering began
    fn revert(&mut self, _ctx: &mut PlayerContext) -> Option<Transition> {
        match self.prior {
            PlaybackState::Loaded => Transition::to(LoadedState::new(LoadIntent::default())),
            PlaybackState::Playing => Transition::to(PlayingState::new(self.rate.take())),
            _ => Transition::to(PausedState::new(false)),
        }
    }

    fn buffered(ctx: &PlayerContext) -> bool {
        ctx.engine.is_buffer_full() || ctx.engine.is_likely_to_keep_up()
    }
}

impl StateHandler for BufferingState {
    fn playback_state(&self) -> PlaybackState {
        PlaybackState::Buffering
    }

    fn did_enter(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        self.remaining_ticks = ctx.config.buffer_tick_budget();
        self.ticker = Some(Ticker::spawn(
            ctx.config.buffer_tick_interval(),
            ctx.epoch,
            ctx.signal_tx.clone(),
            || InternalSignal::BufferTick,
        ));

        if let Some(target) = self.pending_seek.take() {
            let timescale = ctx.config.preferred_timescale;
            ctx.seeker.perform(ctx.engine.as_mut(), target, timescale);
        }

        if !ctx.network.is_satisfied() && !Self::buffered(ctx) {
            debug!("buffering: no network on entry");
            return Transition::to(WaitingForNetworkState::new(self.carry()));
        }

        let buffered = Self::buffered(ctx);
        self.evaluate(ctx, buffered)
    }

    fn will_exit(&mut self, _ctx: &mut PlayerContext) {
        self.ticker = None;
    }

    fn play(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        ctx.reject(UnavailableActionReason::AlreadyTryingToPlay)
    }

    fn play_at(&mut self, ctx: &mut PlayerContext, _rate: PlaybackRate) -> Option<Transition> {
        ctx.reject(UnavailableActionReason::AlreadyTryingToPlay)
    }

    fn pause(&mut self, _ctx: &mut PlayerContext) -> Option<Transition> {
        Transition::to(PausedState::new(false))
    }

    fn stop(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        let timescale = ctx.config.preferred_timescale;
        ctx.seeker
            .perform(ctx.engine.as_mut(), SeekTarget::time(0.0), timescale);
        Transition::to(StoppedState)
    }

    fn seek(&mut self, ctx: &mut PlayerContext, target: SeekTarget) -> Option<Transition> {
        let timescale = ctx.config.preferred_timescale;
        ctx.seeker.perform(ctx.engine.as_mut(), target, timescale);
        None
    }

    fn step(&mut self, ctx: &mut PlayerContext, _count: i64) -> Option<Transition> {
        ctx.reject(UnavailableActionReason::ActionNotPermitted)
    }

    fn on_internal_signal(
        &mut self,
        ctx: &mut PlayerContext,
        signal: InternalSignal,
    ) -> Option<Transition> {
        let InternalSignal::BufferTick = signal else {
            return None;
        };
        let buffered = Self::buffered(ctx);
        if let Some(transition) = self.evaluate(ctx, buffered) {
            return Some(transition);
        }
        self.remaining_ticks = self.remaining_ticks.saturating_sub(1);
        if self.remaining_ticks == 0 {
            warn!("buffering: timeout expired, waiting for network");
            return Transition::to(WaitingForNetworkState::new(self.carry()));
        }
        None
    }

    fn on_engine_event(
        &mut self,
        ctx: &mut PlayerContext,
        event: &EngineEvent,
    ) -> Option<Transition> {
        match event {
            EngineEvent::BufferStatusChanged {
                is_buffer_full,
                is_likely_to_keep_up,
            } => self.evaluate(ctx, *is_buffer_full || *is_likely_to_keep_up),
            EngineEvent::SeekCompleted { .. } => {
                let buffered = Self::buffered(ctx);
                self.evaluate(ctx, buffered)
            }
            EngineEvent::PlayedToEnd => Transition::to(StoppedState),
            EngineEvent::PlaybackStalled => {
                Transition::to(WaitingForNetworkState::new(self.carry()))
            }
            EngineEvent::FailedToPlayToEnd { is_network_error } => {
                if *is_network_error {
                    Transition::to(WaitingForNetworkState::new(self.carry()))
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

    fn on_network_status(
        &mut self,
        ctx: &mut PlayerContext,
        status: NetworkStatus,
    ) -> Option<Transition> {
        match status {
            NetworkStatus::Unsatisfied => {
                warn!("buffering: connectivity lost");
                Transition::to(WaitingForNetworkState::new(self.carry()))
            }
            NetworkStatus::Satisfied => {
                let buffered = Self::buffered(ctx);
                self.evaluate(ctx, buffered)
            }
        }
    }
}

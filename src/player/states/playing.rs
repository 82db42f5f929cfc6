//! Playing state: transport advancing
//!
//! Owns the periodic time observer, which also reports boundary crossings
//! at configured fractions of the duration. Stalls detour through
//! buffering; network trouble detours through waiting-for-network with the
//! play intent carried along.

use crate::engine::{EngineEvent, ItemStatus, TimeControlStatus};
use crate::observers::NetworkStatus;
use crate::player::controller::PlayerContext;
use crate::player::states::support::{InternalSignal, Ticker};
use crate::player::states::{
    BufferingCarry, BufferingState, FailedState, PausedState, StateHandler, StoppedState,
    Transition, WaitingForNetworkState,
};
use crate::player::{PlaybackState, PlayerEvent, UnavailableActionReason};
use crate::rate::PlaybackRate;
use crate::seek::SeekTarget;
use crate::utils::error::PlayerError;
use log::debug;

pub(crate) struct PlayingState {
    rate: Option<PlaybackRate>,
    ticker: Option<Ticker>,
    boundaries: Vec<f64>,
    last_time: f64,
}

impl PlayingState {
    pub fn new(rate: Option<PlaybackRate>) -> Self {
        Self {
            rate,
            ticker: None,
            boundaries: Vec::new(),
            last_time: 0.0,
        }
    }

    fn detour_carry(&self, ctx: &PlayerContext) -> BufferingCarry {
        BufferingCarry::new(true, PlaybackState::Playing).with_rate(Some(ctx.rate))
    }
}

impl StateHandler for PlayingState {
    fn playback_state(&self) -> PlaybackState {
        PlaybackState::Playing
    }

    fn did_enter(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        debug_assert!(ctx.media_is_ready(), "playing requires ready media");

        if let Some(rate) = self.rate.take() {
            ctx.rate = rate;
            ctx.emit(PlayerEvent::RateChanged { rate });
        }
        if ctx.rate == PlaybackRate::normal() {
            ctx.engine.play();
        } else {
            ctx.engine.set_rate(ctx.rate.value());
        }

        self.last_time = ctx.engine.current_time();
        if let Some(duration) = ctx.engine.duration() {
            let multiplier = ctx.config.boundary_time_observer_multiplier;
            if multiplier > 0.0 {
                let mut boundary = duration * multiplier;
                while boundary < duration {
                    self.boundaries.push(boundary);
                    boundary += duration * multiplier;
                }
            }
        }
        self.ticker = Some(Ticker::spawn(
            ctx.config.periodic_interval(),
            ctx.epoch,
            ctx.signal_tx.clone(),
            || InternalSignal::TimeTick,
        ));
        None
    }

    fn will_exit(&mut self, _ctx: &mut PlayerContext) {
        self.ticker = None;
    }

    fn play(&mut self, ctx: &mut PlayerContext) -> Option<Transition> {
        ctx.reject(UnavailableActionReason::AlreadyPlaying)
    }

    fn play_at(&mut self, ctx: &mut PlayerContext, rate: PlaybackRate) -> Option<Transition> {
        if rate == ctx.rate {
            return ctx.reject(UnavailableActionReason::AlreadyPlaying);
        }
        ctx.rate = rate;
        ctx.engine.set_rate(rate.value());
        ctx.emit(PlayerEvent::RateChanged { rate });
        None
    }

    fn pause(&mut self, _ctx: &mut PlayerContext) -> Option<Transition> {
        Transition::to(PausedState::new(false))
    }

    fn stop(&mut self, _ctx: &mut PlayerContext) -> Option<Transition> {
        Transition::to(StoppedState)
    }

    fn seek(&mut self, ctx: &mut PlayerContext, target: SeekTarget) -> Option<Transition> {
        Transition::to(BufferingState::new(
            BufferingCarry::new(true, PlaybackState::Playing)
                .with_rate(Some(ctx.rate))
                .with_seek(target),
        ))
    }

    fn step(&mut self, ctx: &mut PlayerContext, count: i64) -> Option<Transition> {
        // Frame stepping is a paused-transport operation.
        ctx.engine.pause();
        ctx.engine.step(count);
        Transition::to(PausedState::new(false))
    }

    fn on_internal_signal(
        &mut self,
        ctx: &mut PlayerContext,
        signal: InternalSignal,
    ) -> Option<Transition> {
        let InternalSignal::TimeTick = signal else {
            return None;
        };
        let now = ctx.engine.current_time();
        ctx.emit(PlayerEvent::PositionChanged { seconds: now });
        let crossed: Vec<f64> = self
            .boundaries
            .iter()
            .copied()
            .filter(|b| self.last_time < *b && *b <= now)
            .collect();
        for boundary in crossed {
            debug!("playing: boundary {} crossed", boundary);
            ctx.emit(PlayerEvent::BoundaryReached { seconds: boundary });
        }
        self.last_time = now;
        None
    }

    fn on_engine_event(
        &mut self,
        ctx: &mut PlayerContext,
        event: &EngineEvent,
    ) -> Option<Transition> {
        match event {
            EngineEvent::PlayedToEnd => {
                ctx.emit(PlayerEvent::PlayedToEnd);
                Transition::to(PausedState::new(true))
            }
            EngineEvent::PlaybackStalled => {
                Transition::to(BufferingState::new(self.detour_carry(ctx)))
            }
            EngineEvent::FailedToPlayToEnd { is_network_error } => {
                if *is_network_error {
                    Transition::to(WaitingForNetworkState::new(self.detour_carry(ctx)))
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
            EngineEvent::TimeControlStatusChanged(TimeControlStatus::Paused)
                if !ctx.engine_item_installed =>
            {
                Transition::to(StoppedState)
            }
            _ => None,
        }
    }

    fn on_network_status(
        &mut self,
        ctx: &mut PlayerContext,
        status: NetworkStatus,
    ) -> Option<Transition> {
        if status == NetworkStatus::Unsatisfied && !ctx.engine.is_likely_to_keep_up() {
            return Transition::to(WaitingForNetworkState::new(self.detour_carry(ctx)));
        }
        None
    }
}

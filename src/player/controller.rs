//! Player controller implementation for playhead
//!
//! The controller is the owning context of the state machine: it holds the
//! engine, the current media, the configuration, the seek coordinator and
//! exactly one active state handler. Commands are applied to the active
//! handler after cross-cutting guards; asynchronous engine/OS signals enter
//! through the `handle_*` methods and worker signals through the internal
//! channel, all on the single thread that owns the controller.

use crate::engine::{EngineEvent, PlaybackEngine};
use crate::media::{CurrentMedia, MediaItem};
use crate::observers::{
    pauses_playback, resumes_playback, AppLifecycleEvent, AudioSessionEvent, InterruptionReason,
    NetworkStatus, StateSnapshot,
};
use crate::player::states::support::{InternalSignal, TaggedSignal};
use crate::player::states::{
    FailedState, IdleState, LoadIntent, LoadingState, StateHandler, Transition,
};
use crate::player::{
    LoadOptions, PlaybackState, PlayerEvent, PlayerEventHandler, UnavailableActionReason,
};
use crate::rate::PlaybackRate;
use crate::seek::{feasibility, SeekCompletion, SeekCoordinator, SeekPosition, SeekTarget};
use crate::utils::config::PlayerConfiguration;
use crate::utils::error::{PlayerError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info};
use std::time::{Duration, Instant, SystemTime};

/// Upper bound on entry-hook transition chains
///
/// Entry hooks only produce short chains (e.g. loaded immediately entering
/// buffering on autoplay). The guard turns an accidental cycle into a
/// logged error instead of unbounded recursion.
const MAX_TRANSITION_CHAIN: usize = 8;

/// Shared context handed to the active state handler
///
/// This is the controller minus the handler itself, so a handler can mutate
/// everything it needs while the controller retains ownership of the
/// polymorphic state.
pub(crate) struct PlayerContext {
    pub config: PlayerConfiguration,
    pub engine: Box<dyn PlaybackEngine>,
    pub media: Option<CurrentMedia>,
    pub state: PlaybackState,
    pub rate: PlaybackRate,
    pub error: Option<PlayerError>,
    pub engine_fatal: bool,
    pub engine_item_installed: bool,
    pub network: NetworkStatus,
    pub snapshot: Option<StateSnapshot>,
    pub seeker: SeekCoordinator,
    pub signal_tx: Sender<TaggedSignal>,
    pub epoch: u64,
    handlers: Vec<Box<dyn PlayerEventHandler>>,
}

impl PlayerContext {
    /// Deliver an event to every registered handler
    pub fn emit(&mut self, event: PlayerEvent) {
        for handler in self.handlers.iter_mut() {
            handler.handle_event(event.clone());
        }
    }

    /// Report a rejected command; never transitions
    pub fn reject(&mut self, reason: UnavailableActionReason) -> Option<Transition> {
        debug!("player: command rejected: {}", reason);
        self.emit(PlayerEvent::ActionUnavailable { reason });
        None
    }

    /// Whether the current media finished loading
    pub fn media_is_ready(&self) -> bool {
        self.media.as_ref().map(|m| m.is_ready()).unwrap_or(false)
    }

    /// Duration as the engine reports it, falling back to the item's view
    pub fn duration(&self) -> Option<f64> {
        self.engine.duration().or_else(|| {
            self.media
                .as_ref()
                .and_then(|m| m.item.as_ref())
                .and_then(|item| item.duration())
        })
    }
}

/// Main player controller
///
/// Not internally thread-safe: one logical owner issues commands and feeds
/// signals. Engine/OS callbacks must be re-dispatched onto that owner
/// before touching the controller.
pub struct PlayerController {
    ctx: PlayerContext,
    handler: Option<Box<dyn StateHandler>>,
    signal_rx: Receiver<TaggedSignal>,
}

impl PlayerController {
    /// Create a controller around an engine with the given configuration
    pub fn new(engine: Box<dyn PlaybackEngine>, config: PlayerConfiguration) -> Result<Self> {
        config.validate()?;
        let (signal_tx, signal_rx) = unbounded();

        let mut controller = Self {
            ctx: PlayerContext {
                config,
                engine,
                media: None,
                state: PlaybackState::Idle,
                rate: PlaybackRate::normal(),
                error: None,
                engine_fatal: false,
                engine_item_installed: false,
                network: NetworkStatus::Satisfied,
                snapshot: None,
                seeker: SeekCoordinator::new(),
                signal_tx,
                epoch: 0,
                handlers: Vec::new(),
            },
            handler: None,
            signal_rx,
        };

        // Install the initial state without a change() round trip: there is
        // no predecessor to tear down and no handler registered to observe
        // the notification yet.
        let mut idle = Box::new(IdleState);
        let chained = idle.did_enter(&mut controller.ctx);
        debug_assert!(chained.is_none());
        controller.handler = Some(idle);
        Ok(controller)
    }

    /// Register an event handler
    pub fn add_event_handler(&mut self, handler: Box<dyn PlayerEventHandler>) {
        self.ctx.handlers.push(handler);
    }

    // ------------------------------------------------------------------
    // Command surface
    // ------------------------------------------------------------------

    /// Load new media
    pub fn load(&mut self, media: Box<dyn MediaItem>) {
        self.load_with(media, LoadOptions::default());
    }

    /// Load new media with autoplay/position options
    ///
    /// If the current state is not idle, stopped or failed, an implicit
    /// `stop()` runs first so no media swap happens mid-playback.
    pub fn load_with(&mut self, media: Box<dyn MediaItem>, options: LoadOptions) {
        self.ctx.snapshot = None;
        if self.ctx.engine_fatal {
            self.ctx
                .emit(PlayerEvent::ActionUnavailable {
                    reason: UnavailableActionReason::PlayerCanNoLongerPlay,
                });
            return;
        }

        info!("player: load {}", media.source());
        if !matches!(
            self.state(),
            PlaybackState::Idle | PlaybackState::Stopped | PlaybackState::Failed
        ) {
            debug!("player: implicit stop before load");
            self.dispatch(|handler, ctx| handler.stop(ctx));
        }

        let intent = LoadIntent {
            autoplay: options.autoplay,
            position: options.position,
        };
        self.change(Box::new(LoadingState::new(media, intent)));
    }

    /// Start or resume playback
    pub fn play(&mut self) {
        self.ctx.snapshot = None;
        self.dispatch(|handler, ctx| handler.play(ctx));
    }

    /// Start or resume playback at a specific rate
    pub fn play_at(&mut self, rate: PlaybackRate) {
        self.ctx.snapshot = None;
        if let Err(reason) = self.can_play_at(rate) {
            self.ctx.emit(PlayerEvent::ActionUnavailable { reason });
            return;
        }
        self.dispatch(move |handler, ctx| handler.play_at(ctx, rate));
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.ctx.snapshot = None;
        self.dispatch(|handler, ctx| handler.pause(ctx));
    }

    /// Toggle between play and pause
    pub fn toggle_play_pause(&mut self) {
        if self.state().is_playback_active() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Stop playback and clear the engine item
    pub fn stop(&mut self) {
        self.ctx.snapshot = None;
        self.dispatch(|handler, ctx| handler.stop(ctx));
    }

    /// Seek to an absolute position in seconds
    pub fn seek_to(&mut self, seconds: f64) {
        self.seek(SeekTarget::time(seconds));
    }

    /// Seek to an absolute position with a completion handler
    pub fn seek_to_with(&mut self, seconds: f64, completion: SeekCompletion) {
        self.seek(SeekTarget::time_with(seconds, completion));
    }

    /// Seek relative to the current position
    pub fn seek_by(&mut self, offset: f64) {
        let target = self.ctx.engine.current_time() + offset;
        self.seek(SeekTarget::time(target));
    }

    /// Seek to a percentage of the known duration
    pub fn seek_to_percentage(&mut self, percentage: f64) {
        match self.ctx.duration() {
            Some(duration) => self.seek(SeekTarget::time(duration * percentage / 100.0)),
            None => {
                // No duration to translate against; a feasibility rejection,
                // not a caller contract violation.
                self.ctx.emit(PlayerEvent::ActionUnavailable {
                    reason: UnavailableActionReason::SeekPositionNotAvailable,
                });
            }
        }
    }

    /// Seek to a wall-clock date (live streams)
    pub fn seek_to_date(&mut self, date: SystemTime) {
        self.seek(SeekTarget::date(date));
    }

    /// Seek with a fully specified target
    pub fn seek(&mut self, target: SeekTarget) {
        self.ctx.snapshot = None;
        match self.can_seek(&target.position) {
            Ok(()) => self.dispatch(move |handler, ctx| handler.seek(ctx, target)),
            Err(reason) => {
                let mut target = target;
                if let Some(completion) = target.completion.take() {
                    completion(false);
                }
                self.ctx.emit(PlayerEvent::ActionUnavailable { reason });
            }
        }
    }

    /// Step the transport by a number of frames
    pub fn step(&mut self, count: i64) {
        self.ctx.snapshot = None;
        if let Err(reason) = self.can_step(count) {
            self.ctx.emit(PlayerEvent::ActionUnavailable { reason });
            return;
        }
        self.dispatch(move |handler, ctx| handler.step(ctx, count));
    }

    /// Play at the configured fast-forward rate
    pub fn fast_forward(&mut self) {
        let rate = PlaybackRate::custom(self.ctx.config.fast_forward_rate);
        self.play_at(rate);
    }

    /// Play at a caller-chosen fast-forward rate
    pub fn fast_forward_at(&mut self, rate: PlaybackRate) {
        self.play_at(rate);
    }

    /// Play at the configured rewind rate
    pub fn rewind(&mut self) {
        let rate = PlaybackRate::custom(self.ctx.config.rewind_rate);
        self.play_at(rate);
    }

    /// Play at a caller-chosen rewind rate
    pub fn rewind_at(&mut self, rate: PlaybackRate) {
        self.play_at(rate);
    }

    /// Set output volume (clamped to 0.0..=1.0)
    pub fn set_volume(&mut self, volume: f32) {
        let clamped = volume.clamp(0.0, 1.0);
        self.ctx.engine.set_volume(clamped);
        self.ctx.emit(PlayerEvent::VolumeChanged { volume: clamped });
    }

    /// Mute or unmute output
    pub fn set_muted(&mut self, muted: bool) {
        self.ctx.engine.set_muted(muted);
        self.ctx.emit(PlayerEvent::MuteChanged { muted });
    }

    // ------------------------------------------------------------------
    // Read-only surface
    // ------------------------------------------------------------------

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.ctx.state
    }

    /// Current media, if any
    pub fn current_media(&self) -> Option<&CurrentMedia> {
        self.ctx.media.as_ref()
    }

    /// Current position in seconds
    pub fn current_time(&self) -> f64 {
        self.ctx.engine.current_time()
    }

    /// Duration in seconds, if known
    pub fn duration(&self) -> Option<f64> {
        self.ctx.duration()
    }

    /// Target playback rate
    pub fn rate(&self) -> PlaybackRate {
        self.ctx.rate
    }

    /// Output volume
    pub fn volume(&self) -> f32 {
        self.ctx.engine.volume()
    }

    /// Whether output is muted
    pub fn is_muted(&self) -> bool {
        self.ctx.engine.is_muted()
    }

    /// The error carried by the failed state, if any
    pub fn error(&self) -> Option<&PlayerError> {
        self.ctx.error.as_ref()
    }

    // ------------------------------------------------------------------
    // Feasibility checks
    // ------------------------------------------------------------------

    /// Whether a seek to `position` would be accepted right now
    pub fn can_seek(&self, position: &SeekPosition) -> std::result::Result<(), UnavailableActionReason> {
        if self.ctx.engine_fatal {
            return Err(UnavailableActionReason::PlayerCanNoLongerPlay);
        }
        let media = match &self.ctx.media {
            Some(media) => media,
            None => return Err(UnavailableActionReason::LoadMediaFirst),
        };
        match self.state() {
            PlaybackState::Idle | PlaybackState::Failed | PlaybackState::Stopped => {
                return Err(UnavailableActionReason::LoadMediaFirst)
            }
            PlaybackState::Loading => return Err(UnavailableActionReason::WaitTillMediaLoaded),
            _ => {}
        }
        let (seekable, loaded) = match &media.item {
            Some(item) => (item.seekable_ranges(), item.loaded_ranges()),
            None => (Vec::new(), Vec::new()),
        };
        feasibility(position, self.ctx.duration(), &seekable, &loaded)
    }

    /// Whether a step by `count` would be accepted right now
    pub fn can_step(&self, count: i64) -> std::result::Result<(), UnavailableActionReason> {
        if self.ctx.engine_fatal {
            return Err(UnavailableActionReason::PlayerCanNoLongerPlay);
        }
        if self.ctx.media.is_none() {
            return Err(UnavailableActionReason::LoadMediaFirst);
        }
        match self.state() {
            PlaybackState::Idle | PlaybackState::Failed | PlaybackState::Stopped => {
                return Err(UnavailableActionReason::LoadMediaFirst)
            }
            PlaybackState::Loading => return Err(UnavailableActionReason::WaitTillMediaLoaded),
            _ => {}
        }
        if !self.ctx.engine.can_step(count) {
            return Err(if count >= 0 {
                UnavailableActionReason::CanNotStepForward
            } else {
                UnavailableActionReason::CanNotStepBackward
            });
        }
        Ok(())
    }

    /// Whether playback at `rate` would be accepted right now
    pub fn can_play_at(&self, rate: PlaybackRate) -> std::result::Result<(), UnavailableActionReason> {
        if self.ctx.engine_fatal {
            return Err(UnavailableActionReason::PlayerCanNoLongerPlay);
        }
        let media = match &self.ctx.media {
            Some(media) => media,
            None => return Err(UnavailableActionReason::LoadMediaFirst),
        };
        if let Some(item) = &media.item {
            if !item.can_play_at(rate) {
                return Err(UnavailableActionReason::CanNotPlayAtSpecifiedRate);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // External signal entrypoints
    // ------------------------------------------------------------------

    /// Feed an engine signal, in delivery order
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        debug!("player: engine event {:?} in {}", event, self.state());
        match &event {
            EngineEvent::SeekCompleted { finished } => {
                self.ctx.seeker.on_seek_completed(*finished);
            }
            // An unrecoverable engine fails the player from any state.
            EngineEvent::EngineFailed { reason } => {
                self.change(Box::new(FailedState::new(
                    PlayerError::PlayerCanNoLongerPlay {
                        reason: reason.clone(),
                    },
                )));
                return;
            }
            _ => {}
        }
        self.dispatch(|handler, ctx| handler.on_engine_event(ctx, &event));
    }

    /// Feed a connectivity change
    pub fn handle_network_event(&mut self, status: NetworkStatus) {
        debug!("player: network {:?} in {}", status, self.state());
        self.ctx.network = status;
        self.dispatch(move |handler, ctx| handler.on_network_status(ctx, status));
    }

    /// Feed an application lifecycle transition
    pub fn handle_lifecycle_event(&mut self, event: AppLifecycleEvent) {
        if pauses_playback(event, &self.ctx.config) && self.state().is_playback_active() {
            let reason = match event {
                AppLifecycleEvent::DidEnterBackground => InterruptionReason::AppEnteredBackground,
                _ => InterruptionReason::AppResignedActive,
            };
            self.record_snapshot(true, reason);
            info!("player: pausing for lifecycle event {:?}", event);
            self.dispatch(|handler, ctx| handler.pause(ctx));
        } else if resumes_playback(event, &self.ctx.config) {
            if let Some(snapshot) = self.ctx.snapshot.take() {
                let lifecycle_interruption = matches!(
                    snapshot.reason,
                    InterruptionReason::AppResignedActive | InterruptionReason::AppEnteredBackground
                );
                if lifecycle_interruption && snapshot.should_resume {
                    info!("player: resuming after lifecycle event {:?}", event);
                    self.dispatch(|handler, ctx| handler.play(ctx));
                } else {
                    self.ctx.snapshot = Some(snapshot);
                }
            }
        }
    }

    /// Feed an audio session transition
    pub fn handle_audio_session_event(&mut self, event: AudioSessionEvent) {
        match event {
            AudioSessionEvent::InterruptionBegan => {
                if self.state().is_playback_active() {
                    self.record_snapshot(true, InterruptionReason::AudioSessionInterrupted);
                    info!("player: pausing for audio session interruption");
                    self.dispatch(|handler, ctx| handler.pause(ctx));
                }
            }
            AudioSessionEvent::InterruptionEnded { should_resume } => {
                if let Some(snapshot) = self.ctx.snapshot.take() {
                    if snapshot.reason == InterruptionReason::AudioSessionInterrupted
                        && snapshot.should_resume
                        && should_resume
                    {
                        info!("player: resuming after audio session interruption");
                        self.dispatch(|handler, ctx| handler.play(ctx));
                    } else if snapshot.reason != InterruptionReason::AudioSessionInterrupted {
                        self.ctx.snapshot = Some(snapshot);
                    }
                }
            }
            AudioSessionEvent::RouteChanged {
                external_device_disconnected,
            } => {
                if external_device_disconnected
                    && self.ctx.config.playback_pauses_when_route_changes
                    && self.state().is_playback_active()
                {
                    // Unplugging a device must not auto-resume later.
                    self.record_snapshot(false, InterruptionReason::RouteChanged);
                    info!("player: pausing for audio route change");
                    self.dispatch(|handler, ctx| handler.pause(ctx));
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Internal signal pump
    // ------------------------------------------------------------------

    /// Drain worker signals for up to `budget`, dispatching in order
    pub fn process_signals(&mut self, budget: Duration) {
        let deadline = Instant::now() + budget;
        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match self.signal_rx.recv_timeout(deadline - now) {
                Ok(signal) => self.dispatch_signal(signal),
                Err(_) => break,
            }
        }
    }

    /// Drain any worker signals that are already queued
    pub fn try_process_signals(&mut self) {
        while let Ok(signal) = self.signal_rx.try_recv() {
            self.dispatch_signal(signal);
        }
    }

    fn dispatch_signal(&mut self, signal: TaggedSignal) {
        if signal.epoch != self.ctx.epoch {
            debug!(
                "player: dropping stale signal {:?} (epoch {} != {})",
                signal.signal, signal.epoch, self.ctx.epoch
            );
            return;
        }
        self.dispatch(move |handler, ctx| handler.on_internal_signal(ctx, signal.signal));
    }

    // ------------------------------------------------------------------
    // Transition machinery
    // ------------------------------------------------------------------

    fn record_snapshot(&mut self, should_resume: bool, reason: InterruptionReason) {
        let state = self.state();
        match &mut self.ctx.snapshot {
            Some(snapshot) => snapshot.overwrite(state, should_resume, reason),
            None => self.ctx.snapshot = Some(StateSnapshot::new(state, should_resume, reason)),
        }
    }

    fn dispatch<F>(&mut self, f: F)
    where
        F: FnOnce(&mut dyn StateHandler, &mut PlayerContext) -> Option<Transition>,
    {
        let Some(mut handler) = self.handler.take() else {
            error!("player: no active state handler");
            return;
        };
        let transition = f(handler.as_mut(), &mut self.ctx);
        self.handler = Some(handler);
        if let Some(Transition(next)) = transition {
            self.change(next);
        }
    }

    /// The sole transition primitive
    ///
    /// Ordering: the outgoing handler stops listening (teardown) before the
    /// new handler is installed; the new handler's entry hook runs while it
    /// is fully installed, so commands it issues re-enter it correctly; the
    /// state-change notification fires after the entry hook; a transition
    /// chained from the entry hook is followed afterwards, bounded by
    /// `MAX_TRANSITION_CHAIN`.
    fn change(&mut self, next: Box<dyn StateHandler>) {
        let mut next = next;
        let mut depth = 0usize;
        loop {
            depth += 1;

            if let Some(mut old) = self.handler.take() {
                old.will_exit(&mut self.ctx);
            }
            // Invalidate signals queued by workers of the outgoing handler.
            self.ctx.epoch += 1;

            let state = next.playback_state();
            self.before_state_change(state);
            info!("player: state -> {}", state);
            self.ctx.state = state;
            self.handler = Some(next);

            let chained = {
                let Some(mut handler) = self.handler.take() else {
                    return;
                };
                let chained = handler.did_enter(&mut self.ctx);
                self.handler = Some(handler);
                chained
            };
            self.after_state_change(state);
            self.ctx.emit(PlayerEvent::StateChanged { state });

            match chained {
                Some(Transition(n)) => {
                    if depth >= MAX_TRANSITION_CHAIN {
                        debug_assert!(false, "transition chain exceeded {}", MAX_TRANSITION_CHAIN);
                        error!(
                            "player: transition chain from {} exceeded {}, stopping at {}",
                            n.playback_state(),
                            MAX_TRANSITION_CHAIN,
                            state
                        );
                        break;
                    }
                    next = n;
                }
                None => break,
            }
        }
    }

    /// Extension point keyed by the incoming state
    fn before_state_change(&mut self, _target: PlaybackState) {}

    /// Extension point keyed by the installed state
    fn after_state_change(&mut self, _installed: PlaybackState) {}
}

impl Drop for PlayerController {
    fn drop(&mut self) {
        // Tear down any worker owned by the active handler.
        if let Some(mut handler) = self.handler.take() {
            handler.will_exit(&mut self.ctx);
        }
    }
}

impl std::fmt::Debug for PlayerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerController")
            .field("state", &self.ctx.state)
            .field("media", &self.ctx.media)
            .field("rate", &self.ctx.rate)
            .field("network", &self.ctx.network)
            .finish()
    }
}

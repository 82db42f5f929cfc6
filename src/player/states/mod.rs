//! State handlers for the playback state machine
//!
//! One concrete type per playback state, all sharing the [`StateHandler`]
//! contract: the full command surface, an entry hook that may chain into a
//! further transition, a teardown hook that runs before the successor is
//! installed, and the signal handlers for engine, network and worker
//! events. Deferred intent (autoplay, a pending seek, a target rate, the
//! state to revert to after buffering) is carried structurally through the
//! constructor arguments of the next handler, never through ad hoc flags on
//! the controller.

pub(crate) mod support;

mod buffering;
mod failed;
mod idle;
mod loaded;
mod loading;
mod paused;
mod playing;
mod stopped;
mod waiting_for_network;

pub(crate) use buffering::BufferingState;
pub(crate) use failed::FailedState;
pub(crate) use idle::IdleState;
pub(crate) use loaded::LoadedState;
pub(crate) use loading::LoadingState;
pub(crate) use paused::PausedState;
pub(crate) use playing::PlayingState;
pub(crate) use stopped::StoppedState;
pub(crate) use waiting_for_network::WaitingForNetworkState;

use crate::engine::EngineEvent;
use crate::observers::NetworkStatus;
use crate::player::controller::PlayerContext;
use crate::player::PlaybackState;
use crate::rate::PlaybackRate;
use crate::seek::SeekTarget;
use support::InternalSignal;

/// A requested state change, produced by the active handler
pub(crate) struct Transition(pub Box<dyn StateHandler>);

impl Transition {
    /// Wrap a concrete handler as the next state
    pub fn to(handler: impl StateHandler + 'static) -> Option<Transition> {
        Some(Transition(Box::new(handler)))
    }
}

/// Deferred load intent, carried from `load` through loading into loaded
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LoadIntent {
    pub autoplay: bool,
    pub position: Option<f64>,
}

/// Everything a buffering detour must preserve
///
/// Carried from the state that started buffering, through a possible
/// waiting-for-network hand-off, back into buffering: the autoplay flag, an
/// in-flight rate request, the state that was active before buffering began
/// (where buffering reverts on success without autoplay), and a seek
/// recorded while waiting.
pub(crate) struct BufferingCarry {
    pub autoplay: bool,
    pub rate: Option<PlaybackRate>,
    pub prior: PlaybackState,
    pub pending_seek: Option<SeekTarget>,
}

impl BufferingCarry {
    pub fn new(autoplay: bool, prior: PlaybackState) -> Self {
        Self {
            autoplay,
            rate: None,
            prior,
            pending_seek: None,
        }
    }

    pub fn with_seek(mut self, target: SeekTarget) -> Self {
        self.pending_seek = Some(target);
        self
    }

    pub fn with_rate(mut self, rate: Option<PlaybackRate>) -> Self {
        self.rate = rate;
        self
    }
}

/// Contract shared by the nine state handlers
///
/// Every handler implements the full command surface; a command that is not
/// supported in a given state reports a typed unavailable reason through the
/// event channel and returns no transition. Handlers are destroyed on exit:
/// `will_exit` runs before the successor is installed and must tear down any
/// owned workers first.
pub(crate) trait StateHandler: Send {
    /// Which playback state this handler represents
    fn playback_state(&self) -> PlaybackState;

    /// Entry hook, called once after installation; may chain a transition
    fn did_enter(&mut self, _ctx: &mut PlayerContext) -> Option<Transition> {
        None
    }

    /// Teardown hook, called before the successor is installed
    fn will_exit(&mut self, _ctx: &mut PlayerContext) {}

    fn play(&mut self, ctx: &mut PlayerContext) -> Option<Transition>;

    fn play_at(&mut self, ctx: &mut PlayerContext, rate: PlaybackRate) -> Option<Transition>;

    fn pause(&mut self, ctx: &mut PlayerContext) -> Option<Transition>;

    fn stop(&mut self, ctx: &mut PlayerContext) -> Option<Transition>;

    fn seek(&mut self, ctx: &mut PlayerContext, target: SeekTarget) -> Option<Transition>;

    fn step(&mut self, ctx: &mut PlayerContext, count: i64) -> Option<Transition>;

    /// An engine signal arrived while this handler is active
    fn on_engine_event(
        &mut self,
        _ctx: &mut PlayerContext,
        _event: &EngineEvent,
    ) -> Option<Transition> {
        None
    }

    /// Connectivity changed while this handler is active
    fn on_network_status(
        &mut self,
        _ctx: &mut PlayerContext,
        _status: NetworkStatus,
    ) -> Option<Transition> {
        None
    }

    /// A worker signal belonging to this handler's epoch arrived
    fn on_internal_signal(
        &mut self,
        _ctx: &mut PlayerContext,
        _signal: InternalSignal,
    ) -> Option<Transition> {
        None
    }
}

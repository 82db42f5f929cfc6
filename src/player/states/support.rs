//! Worker plumbing shared by the state handlers
//!
//! Internal signals (loader progress, watchdog and time-observer ticks)
//! travel over one crossbeam channel per controller, tagged with the epoch
//! that was current when the producing worker was started. The controller
//! bumps the epoch on every transition and drops stale signals, so a worker
//! belonging to a no-longer-active handler can never produce an observable
//! transition.

use crate::media::LoadProgress;
use crossbeam_channel::{bounded, select, tick, Sender};
use std::thread;
use std::time::Duration;

/// Signals produced by worker threads owned by state handlers
pub(crate) enum InternalSignal {
    /// Loading worker progress
    Load(LoadProgress),

    /// Buffering watchdog tick
    BufferTick,

    /// Periodic time observation tick
    TimeTick,
}

impl std::fmt::Debug for InternalSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternalSignal::Load(p) => write!(f, "Load({:?})", p),
            InternalSignal::BufferTick => write!(f, "BufferTick"),
            InternalSignal::TimeTick => write!(f, "TimeTick"),
        }
    }
}

/// An internal signal stamped with its producer's epoch
pub(crate) struct TaggedSignal {
    pub epoch: u64,
    pub signal: InternalSignal,
}

/// A repeating tick worker owned by a state handler
///
/// The thread stops when the `Ticker` is dropped: dropping the stop sender
/// disconnects the channel the worker selects on. Teardown is synchronous
/// from the state machine's point of view because any tick already queued
/// carries a stale epoch and is discarded by the controller.
pub(crate) struct Ticker {
    _stop: Sender<()>,
}

impl Ticker {
    pub fn spawn(
        interval: Duration,
        epoch: u64,
        tx: Sender<TaggedSignal>,
        make: fn() -> InternalSignal,
    ) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let _worker = thread::spawn(move || {
            let ticks = tick(interval);
            loop {
                select! {
                    recv(ticks) -> _ => {
                        let signal = TaggedSignal { epoch, signal: make() };
                        if tx.send(signal).is_err() {
                            break;
                        }
                    }
                    recv(stop_rx) -> _ => break,
                }
            }
        });
        Self { _stop: stop_tx }
    }
}

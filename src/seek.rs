//! Seek targets and the seek coordinator
//!
//! The coordinator decides whether a seek target is feasible against the
//! media's duration and its seekable/loaded time ranges, quantizes the
//! target to the configured timescale, performs the seek against the
//! engine and tracks the in-flight seek so its completion handler fires
//! exactly once.

use crate::engine::PlaybackEngine;
use crate::media::{ranges_contain, TimeRange};
use crate::player::UnavailableActionReason;
use log::debug;
use std::time::SystemTime;

/// Where a seek should land
#[derive(Debug, Clone, Copy)]
pub enum SeekPosition {
    /// A position on the media timeline, in seconds
    Time(f64),

    /// A wall-clock date (live streams with indeterminate duration)
    Date(SystemTime),
}

/// Completion callback invoked when the engine finishes (or supersedes) a seek
pub type SeekCompletion = Box<dyn FnOnce(bool) + Send>;

/// A pending seek request
///
/// Created transiently to represent caller intent; consumed (applied or
/// discarded) on the next viable state transition.
pub struct SeekTarget {
    pub position: SeekPosition,
    pub tolerance_before: f64,
    pub tolerance_after: f64,
    pub completion: Option<SeekCompletion>,
}

impl SeekTarget {
    /// A time seek with unbounded tolerances
    pub fn time(seconds: f64) -> Self {
        Self {
            position: SeekPosition::Time(seconds),
            tolerance_before: f64::INFINITY,
            tolerance_after: f64::INFINITY,
            completion: None,
        }
    }

    /// A time seek with a completion handler
    pub fn time_with(seconds: f64, completion: SeekCompletion) -> Self {
        Self {
            completion: Some(completion),
            ..Self::time(seconds)
        }
    }

    /// A date seek (live streams)
    pub fn date(date: SystemTime) -> Self {
        Self {
            position: SeekPosition::Date(date),
            tolerance_before: f64::INFINITY,
            tolerance_after: f64::INFINITY,
            completion: None,
        }
    }

    /// Narrow the allowed before/after slack
    pub fn with_tolerances(mut self, before: f64, after: f64) -> Self {
        self.tolerance_before = before;
        self.tolerance_after = after;
        self
    }
}

impl std::fmt::Debug for SeekTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeekTarget")
            .field("position", &self.position)
            .field("tolerance_before", &self.tolerance_before)
            .field("tolerance_after", &self.tolerance_after)
            .field("has_completion", &self.completion.is_some())
            .finish()
    }
}

/// Decide whether a seek position is reachable
///
/// A time target is seekable when it is non-negative and finite, and either
/// the duration is known and the target lies before it, or the duration is
/// unknown and the target falls inside the union of the seekable and loaded
/// ranges. Date targets only make sense against indeterminate-duration
/// media.
pub fn feasibility(
    position: &SeekPosition,
    duration: Option<f64>,
    seekable: &[TimeRange],
    loaded: &[TimeRange],
) -> Result<(), UnavailableActionReason> {
    match position {
        SeekPosition::Time(t) => {
            if !t.is_finite() || *t < 0.0 {
                return Err(UnavailableActionReason::SeekPositionNotAvailable);
            }
            match duration {
                Some(d) => {
                    if *t < d {
                        Ok(())
                    } else {
                        Err(UnavailableActionReason::SeekOverstepPosition)
                    }
                }
                None => {
                    if ranges_contain(seekable, *t) || ranges_contain(loaded, *t) {
                        Ok(())
                    } else {
                        Err(UnavailableActionReason::SeekPositionNotAvailable)
                    }
                }
            }
        }
        SeekPosition::Date(_) => {
            if duration.is_none() {
                Ok(())
            } else {
                Err(UnavailableActionReason::SeekPositionNotAvailable)
            }
        }
    }
}

/// Quantize a timeline position to the preferred timescale
pub fn quantize(seconds: f64, timescale: u32) -> f64 {
    let ts = timescale as f64;
    (seconds * ts).round() / ts
}

struct InFlightSeek {
    completion: Option<SeekCompletion>,
}

/// Performs seeks against the engine and tracks the in-flight one
#[derive(Default)]
pub struct SeekCoordinator {
    in_flight: Option<InFlightSeek>,
}

impl SeekCoordinator {
    pub fn new() -> Self {
        Self { in_flight: None }
    }

    /// Whether a seek is currently in flight
    pub fn is_seeking(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Issue `target` against the engine
    ///
    /// A seek issued while another is in flight supersedes it: the previous
    /// completion fires with `false` immediately.
    pub fn perform(&mut self, engine: &mut dyn PlaybackEngine, target: SeekTarget, timescale: u32) {
        self.supersede();
        match target.position {
            SeekPosition::Time(t) => {
                let quantized = quantize(t, timescale);
                debug!("seek: {} -> {} (timescale {})", t, quantized, timescale);
                engine.seek(quantized, target.tolerance_before, target.tolerance_after);
            }
            SeekPosition::Date(date) => {
                debug!("seek: to date {:?}", date);
                engine.seek_to_date(date);
            }
        }
        self.in_flight = Some(InFlightSeek {
            completion: target.completion,
        });
    }

    /// The engine reported the in-flight seek finished
    pub fn on_seek_completed(&mut self, finished: bool) {
        if let Some(mut seek) = self.in_flight.take() {
            if let Some(completion) = seek.completion.take() {
                completion(finished);
            }
        }
    }

    /// Discard the in-flight seek, firing its completion with `false`
    pub fn supersede(&mut self) {
        self.on_seek_completed(false);
    }
}

impl std::fmt::Debug for SeekCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeekCoordinator")
            .field("is_seeking", &self.is_seeking())
            .finish()
    }
}

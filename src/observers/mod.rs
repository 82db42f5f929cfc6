//! Observer contracts for playhead
//!
//! OS-level collaborators (connectivity, app lifecycle, the audio session)
//! reach the state machine only as the simple event enums defined here,
//! forwarded by the embedder onto the controller's owning thread. The
//! decision logic for what an event does (pause, resume, snapshot) is pure
//! and lives next to each contract so it can be tested without a platform.

mod audio_session;
mod lifecycle;
mod network;
mod snapshot;

pub use audio_session::AudioSessionEvent;
pub use lifecycle::{pauses_playback, resumes_playback, AppLifecycleEvent};
pub use network::NetworkStatus;
pub use snapshot::{InterruptionReason, StateSnapshot};

//! Audio session signal contract
//!
//! Interruptions (phone call, another app's audio) and route changes
//! (headphones unplugged) arrive as these events.

/// Audio session transitions the embedder forwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSessionEvent {
    /// The session was interrupted; playback must pause
    InterruptionBegan,

    /// The interruption ended, with the platform's resume hint
    InterruptionEnded { should_resume: bool },

    /// The audio route changed
    RouteChanged { external_device_disconnected: bool },
}

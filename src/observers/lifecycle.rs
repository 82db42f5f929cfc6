//! Application lifecycle signal contract
//!
//! Each event optionally pauses or resumes playback according to the
//! configuration flags; the mapping itself is pure.

use crate::utils::config::PlayerConfiguration;

/// Application lifecycle transitions the embedder forwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppLifecycleEvent {
    WillResignActive,
    DidBecomeActive,
    DidEnterBackground,
    WillEnterForeground,
}

/// Whether `event` should pause active playback under `config`
pub fn pauses_playback(event: AppLifecycleEvent, config: &PlayerConfiguration) -> bool {
    match event {
        AppLifecycleEvent::WillResignActive => config.playback_pauses_when_resigning_active,
        AppLifecycleEvent::DidEnterBackground => config.playback_pauses_when_backgrounded,
        _ => false,
    }
}

/// Whether `event` should resume interrupted playback under `config`
pub fn resumes_playback(event: AppLifecycleEvent, config: &PlayerConfiguration) -> bool {
    match event {
        AppLifecycleEvent::DidBecomeActive => config.playback_resumes_when_became_active,
        AppLifecycleEvent::WillEnterForeground => config.playback_resumes_when_entering_foreground,
        _ => false,
    }
}

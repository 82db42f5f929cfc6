//! Recovery scenario tests: buffering timeouts, connectivity detours,
//! pending seeks across the waiting-for-network hand-off, interruption
//! snapshots and timer teardown.

use playhead::{
    AppLifecycleEvent, AudioSessionEvent, EngineEvent, NetworkStatus, PlaybackRate, PlaybackState,
    PlayerConfiguration, WaitingReason,
};
use playhead_integration_tests::TestFixture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn fast_buffer_config() -> PlayerConfiguration {
    PlayerConfiguration {
        buffer_observing_timeout: 0.4,
        buffer_observing_time_interval: 0.1,
        ..Default::default()
    }
}

#[test]
fn test_buffering_timeout_moves_to_waiting_for_network() {
    let mut fixture = TestFixture::with_config(fast_buffer_config());
    fixture.load_ready_media("fake://movie", true);
    assert_eq!(fixture.controller.state(), PlaybackState::Buffering);

    // The buffer never becomes ready; the watchdog must fire within one
    // interval of the configured timeout.
    let entered = Instant::now();
    assert!(fixture.pump_until_state(PlaybackState::WaitingForNetwork, Duration::from_secs(3)));
    let elapsed = entered.elapsed();
    assert!(
        elapsed >= Duration::from_millis(200),
        "watchdog fired too early: {:?}",
        elapsed
    );
    assert!(
        elapsed <= Duration::from_millis(1500),
        "watchdog fired too late: {:?}",
        elapsed
    );
}

#[test]
fn test_connectivity_loss_forces_waiting_immediately() {
    let mut fixture = TestFixture::new();
    fixture.load_ready_media("fake://movie", true);
    assert_eq!(fixture.controller.state(), PlaybackState::Buffering);

    fixture
        .controller
        .handle_network_event(NetworkStatus::Unsatisfied);
    assert_eq!(fixture.controller.state(), PlaybackState::WaitingForNetwork);
}

#[test]
fn test_network_detour_preserves_autoplay_and_rate() {
    let mut fixture = TestFixture::new();
    fixture.load_ready_media("fake://movie", false);

    // Start at 2x.
    fixture.controller.play_at(PlaybackRate::superfast());
    fixture.engine.set_buffered(true);
    fixture
        .controller
        .handle_engine_event(EngineEvent::BufferStatusChanged {
            is_buffer_full: true,
            is_likely_to_keep_up: true,
        });
    assert_eq!(fixture.controller.state(), PlaybackState::Playing);

    // Connectivity drops while the buffer cannot sustain playback.
    fixture.engine.set_buffered(false);
    fixture.recorder.clear();
    fixture
        .controller
        .handle_network_event(NetworkStatus::Unsatisfied);
    assert_eq!(fixture.controller.state(), PlaybackState::WaitingForNetwork);

    // Connectivity returns; buffering resumes and fills.
    fixture
        .controller
        .handle_network_event(NetworkStatus::Satisfied);
    assert_eq!(fixture.controller.state(), PlaybackState::Buffering);
    fixture.engine.set_buffered(true);
    fixture
        .controller
        .handle_engine_event(EngineEvent::BufferStatusChanged {
            is_buffer_full: true,
            is_likely_to_keep_up: true,
        });

    assert_eq!(
        fixture.recorder.states(),
        vec![
            PlaybackState::WaitingForNetwork,
            PlaybackState::Buffering,
            PlaybackState::Playing,
        ]
    );
    // The detour preserved the 2x rate.
    assert_eq!(fixture.controller.rate(), PlaybackRate::superfast());
    assert_eq!(fixture.engine.rates_set().last(), Some(&2.0));
}

#[test]
fn test_play_while_waiting_queues_intent() {
    let mut fixture = TestFixture::new();
    fixture.start_playing("fake://movie");
    fixture.controller.pause();

    // Network drops, then the engine reports a network playback failure:
    // paused hands off to waiting without play intent.
    fixture
        .controller
        .handle_network_event(NetworkStatus::Unsatisfied);
    fixture
        .controller
        .handle_engine_event(EngineEvent::FailedToPlayToEnd {
            is_network_error: true,
        });
    assert_eq!(fixture.controller.state(), PlaybackState::WaitingForNetwork);

    // Play is rejected but remembered.
    fixture.recorder.clear();
    fixture.controller.play();
    assert_eq!(
        fixture.recorder.rejections(),
        vec![playhead::UnavailableActionReason::WaitingForEstablishedNetwork]
    );
    assert_eq!(fixture.controller.state(), PlaybackState::WaitingForNetwork);

    // Once the path is back the queued intent replays to playing.
    fixture.engine.set_buffered(true);
    fixture
        .controller
        .handle_network_event(NetworkStatus::Satisfied);
    assert_eq!(fixture.controller.state(), PlaybackState::Playing);
}

#[test]
fn test_pending_seek_survives_network_detour_exactly_once() {
    let mut fixture = TestFixture::new();
    fixture.start_playing("fake://movie");

    fixture.engine.set_buffered(false);
    fixture
        .controller
        .handle_network_event(NetworkStatus::Unsatisfied);
    assert_eq!(fixture.controller.state(), PlaybackState::WaitingForNetwork);

    let seeks_before = fixture.engine.seeks().len();
    let completions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&completions);
    fixture.controller.seek_to_with(
        42.0,
        Box::new(move |finished| {
            assert!(finished);
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    // Stored while waiting, not performed.
    assert_eq!(fixture.engine.seeks().len(), seeks_before);
    assert_eq!(completions.load(Ordering::SeqCst), 0);
    assert_eq!(fixture.controller.state(), PlaybackState::WaitingForNetwork);

    // Connectivity returns: buffering applies the seek immediately.
    fixture
        .controller
        .handle_network_event(NetworkStatus::Satisfied);
    assert_eq!(fixture.controller.state(), PlaybackState::Buffering);
    let seeks = fixture.engine.seeks();
    assert_eq!(seeks.len(), seeks_before + 1);
    assert_eq!(seeks.last(), Some(&42.0));

    // The engine finishes the seek; the completion fires exactly once.
    fixture
        .controller
        .handle_engine_event(EngineEvent::SeekCompleted { finished: true });
    assert_eq!(completions.load(Ordering::SeqCst), 1);

    fixture.engine.set_buffered(true);
    fixture
        .controller
        .handle_engine_event(EngineEvent::BufferStatusChanged {
            is_buffer_full: true,
            is_likely_to_keep_up: true,
        });
    assert_eq!(fixture.controller.state(), PlaybackState::Playing);
    assert_eq!(completions.load(Ordering::SeqCst), 1);
    // No duplicate seek was issued.
    assert_eq!(fixture.engine.seeks().len(), seeks_before + 1);
}

#[test]
fn test_unknown_waiting_reason_falls_back_to_buffering() {
    // Buffering times out while the network stays up, so play() in the
    // waiting state has to consult the engine's reason for waiting.
    let mut fixture = TestFixture::with_config(fast_buffer_config());
    fixture.load_ready_media("fake://movie", true);
    assert!(fixture.pump_until_state(PlaybackState::WaitingForNetwork, Duration::from_secs(3)));

    // The platform reports a reason this crate does not enumerate.
    fixture.engine.script(|script| {
        script.reason_for_waiting = Some(WaitingReason::Other("vendor-specific".to_string()));
    });
    fixture.recorder.clear();
    fixture.controller.play();
    // No panic, no rejection: the unknown reason resolves by buffering.
    assert_eq!(fixture.controller.state(), PlaybackState::Buffering);
    assert!(fixture.recorder.rejections().is_empty());
}

#[test]
fn test_stale_buffering_timer_never_fires_after_exit() {
    let mut fixture = TestFixture::with_config(PlayerConfiguration {
        buffer_observing_timeout: 0.2,
        buffer_observing_time_interval: 0.05,
        ..Default::default()
    });
    fixture.load_ready_media("fake://movie", true);
    assert_eq!(fixture.controller.state(), PlaybackState::Buffering);

    // Leave buffering before the watchdog expires.
    fixture.controller.pause();
    assert_eq!(fixture.controller.state(), PlaybackState::Paused);

    // Give the dead watchdog ample time to have queued ticks, then drain.
    std::thread::sleep(Duration::from_millis(400));
    fixture.pump(Duration::from_millis(100));
    assert_eq!(fixture.controller.state(), PlaybackState::Paused);
}

#[test]
fn test_lifecycle_interruption_pauses_and_resumes() {
    let mut fixture = TestFixture::new();
    fixture.start_playing("fake://movie");

    fixture
        .controller
        .handle_lifecycle_event(AppLifecycleEvent::WillResignActive);
    assert_eq!(fixture.controller.state(), PlaybackState::Paused);

    fixture.recorder.clear();
    fixture
        .controller
        .handle_lifecycle_event(AppLifecycleEvent::DidBecomeActive);
    // Resumes through buffering; the buffer is still warm.
    assert_eq!(fixture.controller.state(), PlaybackState::Playing);
    assert_eq!(
        fixture.recorder.states(),
        vec![PlaybackState::Buffering, PlaybackState::Playing]
    );
}

#[test]
fn test_lifecycle_resume_respects_configuration() {
    let mut fixture = TestFixture::with_config(PlayerConfiguration {
        playback_resumes_when_became_active: false,
        ..Default::default()
    });
    fixture.start_playing("fake://movie");

    fixture
        .controller
        .handle_lifecycle_event(AppLifecycleEvent::WillResignActive);
    assert_eq!(fixture.controller.state(), PlaybackState::Paused);

    fixture
        .controller
        .handle_lifecycle_event(AppLifecycleEvent::DidBecomeActive);
    assert_eq!(fixture.controller.state(), PlaybackState::Paused);
}

#[test]
fn test_audio_interruption_round_trip() {
    let mut fixture = TestFixture::new();
    fixture.start_playing("fake://movie");

    fixture
        .controller
        .handle_audio_session_event(AudioSessionEvent::InterruptionBegan);
    assert_eq!(fixture.controller.state(), PlaybackState::Paused);

    fixture
        .controller
        .handle_audio_session_event(AudioSessionEvent::InterruptionEnded {
            should_resume: true,
        });
    assert_eq!(fixture.controller.state(), PlaybackState::Playing);
}

#[test]
fn test_route_change_pauses_without_auto_resume() {
    let mut fixture = TestFixture::new();
    fixture.start_playing("fake://movie");

    fixture
        .controller
        .handle_audio_session_event(AudioSessionEvent::RouteChanged {
            external_device_disconnected: true,
        });
    assert_eq!(fixture.controller.state(), PlaybackState::Paused);

    // Neither the audio session nor the app lifecycle may auto-resume a
    // route-change pause.
    fixture
        .controller
        .handle_audio_session_event(AudioSessionEvent::InterruptionEnded {
            should_resume: true,
        });
    assert_eq!(fixture.controller.state(), PlaybackState::Paused);

    fixture
        .controller
        .handle_lifecycle_event(AppLifecycleEvent::DidBecomeActive);
    assert_eq!(fixture.controller.state(), PlaybackState::Paused);
}

#[test]
fn test_user_command_supersedes_snapshot() {
    let mut fixture = TestFixture::new();
    fixture.start_playing("fake://movie");

    fixture
        .controller
        .handle_lifecycle_event(AppLifecycleEvent::WillResignActive);
    assert_eq!(fixture.controller.state(), PlaybackState::Paused);

    // An explicit stop discards the interruption snapshot.
    fixture.controller.stop();
    assert_eq!(fixture.controller.state(), PlaybackState::Stopped);

    fixture
        .controller
        .handle_lifecycle_event(AppLifecycleEvent::DidBecomeActive);
    assert_eq!(fixture.controller.state(), PlaybackState::Stopped);
}

#[test]
fn test_no_item_waiting_reason_reloads() {
    let mut fixture = TestFixture::with_config(fast_buffer_config());
    fixture.load_ready_media("fake://movie", true);
    assert!(fixture.pump_until_state(PlaybackState::WaitingForNetwork, Duration::from_secs(3)));

    // The engine waits because it lost its item: play() runs the full load
    // again instead of buffering.
    fixture.engine.script(|script| {
        script.reason_for_waiting = Some(WaitingReason::NoItemToPlay);
    });
    fixture.recorder.clear();
    fixture.controller.play();
    assert_eq!(fixture.controller.state(), PlaybackState::Loading);

    // The reload carries play intent and settles back into buffering.
    assert!(fixture.pump_until_state(PlaybackState::Buffering, Duration::from_secs(5)));
    assert!(fixture
        .recorder
        .states()
        .starts_with(&[PlaybackState::Loading]));
}

//! Integration test utilities for playhead
//!
//! This module provides the fakes the scenario tests drive the state
//! machine with:
//! - A scriptable fake engine whose flags and recorded calls are shared
//!   with the test through a handle
//! - Scripted media items whose loading steps can be made to fail
//! - A recording event handler for asserting delegate sequences

use parking_lot::Mutex;
use playhead::{
    AssetFailure, ItemFailure, ItemStatus, LoadOptions, MediaItem, PlaybackEngine, PlaybackRate,
    PlaybackState, PlayerConfiguration, PlayerController, PlayerEvent, PlayerEventHandler,
    TimeRange, UnavailableActionReason, WaitingReason,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use std::time::{Duration, Instant, SystemTime};

/// Initialize test logging once per process
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

// ----------------------------------------------------------------------
// Fake engine
// ----------------------------------------------------------------------

/// Mutable script and call recording for the fake engine
#[derive(Debug)]
pub struct EngineScript {
    pub status: ItemStatus,
    pub ready_when_installed: bool,
    pub duration: Option<f64>,
    pub current_time: f64,
    pub buffer_full: bool,
    pub likely_to_keep_up: bool,
    pub reason_for_waiting: Option<WaitingReason>,
    pub can_step: bool,
    pub rate: f64,
    pub volume: f32,
    pub muted: bool,
    pub current_item: Option<String>,

    pub play_calls: usize,
    pub pause_calls: usize,
    pub seeks: Vec<f64>,
    pub rates_set: Vec<f64>,
    pub replacements: Vec<Option<String>>,
    pub steps: Vec<i64>,
}

impl Default for EngineScript {
    fn default() -> Self {
        Self {
            status: ItemStatus::Unknown,
            ready_when_installed: true,
            duration: Some(100.0),
            current_time: 0.0,
            buffer_full: false,
            likely_to_keep_up: false,
            reason_for_waiting: None,
            can_step: true,
            rate: 0.0,
            volume: 1.0,
            muted: false,
            current_item: None,
            play_calls: 0,
            pause_calls: 0,
            seeks: Vec::new(),
            rates_set: Vec::new(),
            replacements: Vec::new(),
            steps: Vec::new(),
        }
    }
}

/// Test-side handle onto the fake engine's script
#[derive(Clone)]
pub struct EngineHandle(Arc<Mutex<EngineScript>>);

impl EngineHandle {
    /// Mutate the script (flags, duration, waiting reason, ...)
    pub fn script<R>(&self, f: impl FnOnce(&mut EngineScript) -> R) -> R {
        f(&mut self.0.lock())
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.0.lock().seeks.clone()
    }

    pub fn rates_set(&self) -> Vec<f64> {
        self.0.lock().rates_set.clone()
    }

    pub fn replacements(&self) -> Vec<Option<String>> {
        self.0.lock().replacements.clone()
    }

    pub fn steps(&self) -> Vec<i64> {
        self.0.lock().steps.clone()
    }

    pub fn current_item(&self) -> Option<String> {
        self.0.lock().current_item.clone()
    }

    pub fn play_calls(&self) -> usize {
        self.0.lock().play_calls
    }

    pub fn pause_calls(&self) -> usize {
        self.0.lock().pause_calls
    }

    /// Mark the buffer as able to sustain playback
    pub fn set_buffered(&self, buffered: bool) {
        let mut script = self.0.lock();
        script.buffer_full = buffered;
        script.likely_to_keep_up = buffered;
    }
}

/// Fake playback engine driven entirely by its script
pub struct FakeEngine(Arc<Mutex<EngineScript>>);

impl FakeEngine {
    pub fn new() -> (Self, EngineHandle) {
        let shared = Arc::new(Mutex::new(EngineScript::default()));
        (Self(Arc::clone(&shared)), EngineHandle(shared))
    }
}

impl PlaybackEngine for FakeEngine {
    fn replace_current_item(&mut self, source: Option<&str>) {
        let mut script = self.0.lock();
        script.current_item = source.map(|s| s.to_string());
        script.replacements.push(source.map(|s| s.to_string()));
        script.status = match source {
            Some(_) if script.ready_when_installed => ItemStatus::ReadyToPlay,
            Some(_) => ItemStatus::Unknown,
            None => ItemStatus::Unknown,
        };
    }

    fn play(&mut self) {
        let mut script = self.0.lock();
        script.play_calls += 1;
        script.rate = 1.0;
    }

    fn pause(&mut self) {
        let mut script = self.0.lock();
        script.pause_calls += 1;
        script.rate = 0.0;
    }

    fn set_rate(&mut self, rate: f64) {
        let mut script = self.0.lock();
        script.rate = rate;
        script.rates_set.push(rate);
    }

    fn rate(&self) -> f64 {
        self.0.lock().rate
    }

    fn seek(&mut self, to_seconds: f64, _tolerance_before: f64, _tolerance_after: f64) {
        let mut script = self.0.lock();
        script.current_time = to_seconds;
        script.seeks.push(to_seconds);
    }

    fn seek_to_date(&mut self, _date: SystemTime) {
        self.0.lock().seeks.push(f64::NEG_INFINITY);
    }

    fn step(&mut self, count: i64) {
        self.0.lock().steps.push(count);
    }

    fn current_time(&self) -> f64 {
        self.0.lock().current_time
    }

    fn duration(&self) -> Option<f64> {
        let script = self.0.lock();
        if script.current_item.is_some() {
            script.duration
        } else {
            None
        }
    }

    fn status(&self) -> ItemStatus {
        self.0.lock().status
    }

    fn is_buffer_full(&self) -> bool {
        self.0.lock().buffer_full
    }

    fn is_likely_to_keep_up(&self) -> bool {
        self.0.lock().likely_to_keep_up
    }

    fn reason_for_waiting(&self) -> Option<WaitingReason> {
        self.0.lock().reason_for_waiting.clone()
    }

    fn can_step(&self, _count: i64) -> bool {
        self.0.lock().can_step
    }

    fn set_volume(&mut self, volume: f32) {
        self.0.lock().volume = volume;
    }

    fn volume(&self) -> f32 {
        self.0.lock().volume
    }

    fn set_muted(&mut self, muted: bool) {
        self.0.lock().muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.0.lock().muted
    }
}

// ----------------------------------------------------------------------
// Scripted media
// ----------------------------------------------------------------------

/// Failure script for a media item's loading steps
#[derive(Debug, Default, Clone)]
pub struct MediaScript {
    pub fail_create_asset: Option<AssetFailure>,
    pub fail_properties: Option<AssetFailure>,
    pub fail_validation: Option<AssetFailure>,
    pub fail_item: Option<ItemFailure>,
    pub property_fetch_delay: Option<Duration>,
    pub duration: Option<f64>,
    pub seekable: Vec<TimeRange>,
    pub loaded: Vec<TimeRange>,
    pub playable_at_any_rate: bool,
    pub steppable: bool,
}

impl MediaScript {
    pub fn ready() -> Self {
        Self {
            duration: Some(100.0),
            seekable: vec![TimeRange::new(0.0, 100.0)],
            loaded: vec![TimeRange::new(0.0, 30.0)],
            playable_at_any_rate: true,
            steppable: true,
            ..Default::default()
        }
    }
}

/// A media item whose loading pipeline follows its script
pub struct ScriptedMedia {
    source: String,
    script: MediaScript,
    aborted: Arc<AtomicBool>,
}

impl ScriptedMedia {
    pub fn new(source: &str, script: MediaScript) -> Self {
        Self {
            source: source.to_string(),
            script,
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn ready(source: &str) -> Self {
        Self::new(source, MediaScript::ready())
    }

    /// Observe whether the loader aborted this item
    pub fn abort_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.aborted)
    }
}

impl MediaItem for ScriptedMedia {
    fn source(&self) -> &str {
        &self.source
    }

    fn create_asset(&mut self) -> Result<(), AssetFailure> {
        match &self.script.fail_create_asset {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    fn fetch_asset_properties(&self) -> Result<(), AssetFailure> {
        if let Some(delay) = self.script.property_fetch_delay {
            std::thread::sleep(delay);
        }
        match &self.script.fail_properties {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    fn validate_playability(&self) -> Result<(), AssetFailure> {
        match &self.script.fail_validation {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    fn create_playable_item(&mut self) -> Result<(), ItemFailure> {
        match &self.script.fail_item {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    fn abort_asset_initialization(&mut self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    fn duration(&self) -> Option<f64> {
        self.script.duration
    }

    fn seekable_ranges(&self) -> Vec<TimeRange> {
        self.script.seekable.clone()
    }

    fn loaded_ranges(&self) -> Vec<TimeRange> {
        self.script.loaded.clone()
    }

    fn can_play_at(&self, _rate: PlaybackRate) -> bool {
        self.script.playable_at_any_rate
    }

    fn can_step(&self, _count: i64) -> bool {
        self.script.steppable
    }
}

// ----------------------------------------------------------------------
// Event recording
// ----------------------------------------------------------------------

/// Test-side view of the events a controller emitted
#[derive(Clone)]
pub struct Recorder(Arc<Mutex<Vec<PlayerEvent>>>);

struct RecordingHandler(Arc<Mutex<Vec<PlayerEvent>>>);

impl PlayerEventHandler for RecordingHandler {
    fn handle_event(&mut self, event: PlayerEvent) {
        self.0.lock().push(event);
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }

    pub fn handler(&self) -> Box<dyn PlayerEventHandler> {
        Box::new(RecordingHandler(Arc::clone(&self.0)))
    }

    pub fn events(&self) -> Vec<PlayerEvent> {
        self.0.lock().clone()
    }

    /// The sequence of observed state notifications
    pub fn states(&self) -> Vec<PlaybackState> {
        self.0
            .lock()
            .iter()
            .filter_map(|event| match event {
                PlayerEvent::StateChanged { state } => Some(*state),
                _ => None,
            })
            .collect()
    }

    /// The sequence of observed rejection reasons
    pub fn rejections(&self) -> Vec<UnavailableActionReason> {
        self.0
            .lock()
            .iter()
            .filter_map(|event| match event {
                PlayerEvent::ActionUnavailable { reason } => Some(*reason),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------
// Fixture
// ----------------------------------------------------------------------

/// A controller wired to a fake engine and a recorder
pub struct TestFixture {
    pub controller: PlayerController,
    pub engine: EngineHandle,
    pub recorder: Recorder,
}

impl TestFixture {
    /// Fixture with the default (long) buffering timeout
    pub fn new() -> Self {
        Self::with_config(PlayerConfiguration::default())
    }

    pub fn with_config(config: PlayerConfiguration) -> Self {
        init_logging();
        let (engine, handle) = FakeEngine::new();
        let mut controller =
            PlayerController::new(Box::new(engine), config).expect("valid configuration");
        let recorder = Recorder::new();
        controller.add_event_handler(recorder.handler());
        Self {
            controller,
            engine: handle,
            recorder,
        }
    }

    /// Pump worker signals until `state` is reached or `timeout` elapses
    pub fn pump_until_state(&mut self, state: PlaybackState, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.controller.state() == state {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            self.controller.process_signals(Duration::from_millis(10));
        }
    }

    /// Pump worker signals for a fixed period
    pub fn pump(&mut self, period: Duration) {
        self.controller.process_signals(period);
    }

    /// Load scripted ready media and settle into loaded (or buffering when
    /// autoplay is requested)
    pub fn load_ready_media(&mut self, source: &str, autoplay: bool) {
        self.controller.load_with(
            Box::new(ScriptedMedia::ready(source)),
            LoadOptions {
                autoplay,
                position: None,
            },
        );
        let target = if autoplay {
            PlaybackState::Buffering
        } else {
            PlaybackState::Loaded
        };
        assert!(
            self.pump_until_state(target, Duration::from_secs(5)),
            "media never reached {:?}, stuck in {:?}",
            target,
            self.controller.state()
        );
    }

    /// Drive the controller all the way to playing
    pub fn start_playing(&mut self, source: &str) {
        self.load_ready_media(source, true);
        self.engine.set_buffered(true);
        self.controller.handle_engine_event(playhead::EngineEvent::BufferStatusChanged {
            is_buffer_full: true,
            is_likely_to_keep_up: true,
        });
        assert_eq!(self.controller.state(), PlaybackState::Playing);
    }
}

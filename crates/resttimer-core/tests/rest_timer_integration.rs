//! Integration tests for the tick-driven rest timer.
//!
//! Uses tokio's paused clock so interval ticks and elapsed time advance
//! deterministically.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use resttimer_core::{
    AnalyticsReporter, ChannelAnalyticsSink, EffectDispatcher, HapticEvent, HapticSink,
    MonotonicClock, RestRecord, RestTimer, RestTimerHandle, SharedPreferences, SinkError,
    TimerEvent, TimerPhase,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::sleep;

#[derive(Default)]
struct RecordingHaptics {
    seen: Mutex<Vec<HapticEvent>>,
}

impl HapticSink for RecordingHaptics {
    fn notify(&self, event: HapticEvent) -> Result<(), SinkError> {
        self.seen.lock().unwrap().push(event);
        Ok(())
    }
}

struct Harness {
    timer: RestTimerHandle,
    records: UnboundedReceiver<RestRecord>,
    haptics: Arc<RecordingHaptics>,
}

fn harness(seconds: u32) -> Harness {
    let haptics = Arc::new(RecordingHaptics::default());
    let (sink, records) = ChannelAnalyticsSink::new();
    let dispatcher = EffectDispatcher::new(
        haptics.clone(),
        AnalyticsReporter::new(Arc::new(sink)),
        SharedPreferences::default(),
    )
    .with_identity(Some("alice".into()), Some("workout-1".into()));
    let timer = RestTimer::new(Arc::new(MonotonicClock::new()), seconds);
    let timer = RestTimerHandle::new(timer, dispatcher, Duration::from_secs(1)).unwrap();
    Harness {
        timer,
        records,
        haptics,
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Let the effect task drain what commands just queued.
async fn settle() {
    sleep(ms(1)).await;
}

#[tokio::test(start_paused = true)]
async fn countdown_runs_to_completion_and_records_once() {
    let mut h = harness(90);
    h.timer.start(None);
    sleep(ms(90_500)).await;

    let state = h.timer.state();
    assert_eq!(state.current_time, 0);
    assert!(state.is_completed);
    assert!(!state.is_running);
    assert_eq!(state.phase, TimerPhase::Completed);

    let record = h.records.try_recv().expect("one record");
    assert!(!record.was_skipped);
    assert_eq!(record.actual_time, 90);
    assert_eq!(record.suggested_time, 90);
    assert_eq!(record.user_id, "alice");
    assert!(h.records.try_recv().is_err());

    // nothing keeps ticking after completion
    sleep(ms(5_000)).await;
    assert_eq!(h.timer.state().current_time, 0);
    assert!(h.records.try_recv().is_err());

    let seen = h.haptics.seen.lock().unwrap().clone();
    assert_eq!(seen.first(), Some(&HapticEvent::Start));
    assert_eq!(seen.last(), Some(&HapticEvent::Complete));
    let low = seen.iter().filter(|e| **e == HapticEvent::LowTimeTick).count();
    assert_eq!(low, 10);
}

#[tokio::test(start_paused = true)]
async fn restarting_does_not_double_tick() {
    let h = harness(90);
    h.timer.start(None);
    h.timer.start(None);
    h.timer.start(None);
    sleep(ms(10_500)).await;
    assert_eq!(h.timer.state().current_time, 80);
}

#[tokio::test(start_paused = true)]
async fn stop_freezes_countdown_and_start_resumes() {
    let mut h = harness(90);
    h.timer.start(None);
    sleep(ms(30_500)).await;
    h.timer.stop();
    assert_eq!(h.timer.state().current_time, 60);

    sleep(ms(10_000)).await;
    let state = h.timer.state();
    assert_eq!(state.current_time, 60);
    assert!(!state.is_running);
    assert!(!state.is_completed);
    assert!(h.records.try_recv().is_err(), "stop must not record analytics");

    h.timer.start(None);
    sleep(ms(5_500)).await;
    assert_eq!(h.timer.state().current_time, 55);
}

#[tokio::test(start_paused = true)]
async fn no_events_after_stop_returns() {
    let h = harness(30);
    let mut events = h.timer.subscribe();
    h.timer.start(None);
    sleep(ms(3_500)).await;
    h.timer.stop();
    settle().await;
    let mut drained = Vec::new();
    while let Ok(ev) = events.try_recv() {
        drained.push(ev.haptic());
    }
    assert_eq!(drained.last(), Some(&HapticEvent::Stop));

    sleep(ms(10_000)).await;
    assert!(events.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn skip_reports_wall_clock_elapsed() {
    let mut h = harness(90);
    h.timer.start(None);
    sleep(ms(20_200)).await;
    h.timer.adjust(30);
    sleep(ms(25_000)).await;
    assert_eq!(h.timer.state().current_time, 75);

    h.timer.skip();
    let state = h.timer.state();
    assert_eq!(state.current_time, 0);
    assert!(state.is_completed);
    assert_eq!(state.phase, TimerPhase::Skipped);

    let record = h.records.recv().await.unwrap();
    assert!(record.was_skipped);
    assert_eq!(record.actual_time, 45);
    assert!(record.was_extended);
    assert!(h.records.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_ticks() {
    let h = harness(90);
    h.timer.start(None);
    sleep(ms(5_500)).await;
    h.timer.reset(Some(40));
    sleep(ms(5_000)).await;
    let state = h.timer.state();
    assert_eq!(state.current_time, 40);
    assert_eq!(state.phase, TimerPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn adjust_floor_holds_while_running() {
    let h = harness(20);
    h.timer.start(None);
    h.timer.adjust(-100);
    assert_eq!(h.timer.state().current_time, 15);
    assert!(h.timer.state().is_running);
    sleep(ms(1_500)).await;
    assert_eq!(h.timer.state().current_time, 14);
}

#[tokio::test(start_paused = true)]
async fn event_stream_mirrors_state_changes() {
    let h = harness(12);
    let mut events = h.timer.subscribe();
    h.timer.start(None);
    sleep(ms(12_500)).await;

    let mut kinds = Vec::new();
    while let Ok(ev) = events.try_recv() {
        kinds.push(ev.haptic());
        if let TimerEvent::Completed { actual_time, .. } = ev {
            assert_eq!(actual_time, 12);
        }
    }
    assert_eq!(kinds.first(), Some(&HapticEvent::Start));
    assert_eq!(kinds.last(), Some(&HapticEvent::Complete));
    assert_eq!(kinds.len(), 1 + 10 + 1);
}

struct SlowHaptics;

impl HapticSink for SlowHaptics {
    fn notify(&self, _event: HapticEvent) -> Result<(), SinkError> {
        std::thread::sleep(ms(500));
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_haptics_do_not_block_commands() {
    let dispatcher = EffectDispatcher::new(
        Arc::new(SlowHaptics),
        AnalyticsReporter::disabled(),
        SharedPreferences::default(),
    );
    let timer = RestTimer::new(Arc::new(MonotonicClock::new()), 60);
    let timer = RestTimerHandle::new(timer, dispatcher, Duration::from_secs(1)).unwrap();

    let began = std::time::Instant::now();
    timer.start(None);
    timer.adjust(10);
    timer.stop();
    assert!(began.elapsed() < ms(100), "commands waited on haptics: {:?}", began.elapsed());

    let state = timer.state();
    assert_eq!(state.current_time, 70);
    assert!(!state.is_running);
}

#[test]
fn handle_requires_runtime() {
    let dispatcher = EffectDispatcher::new(
        Arc::new(resttimer_core::NoopHaptics),
        AnalyticsReporter::disabled(),
        SharedPreferences::default(),
    );
    let timer = RestTimer::new(Arc::new(resttimer_core::ManualClock::new()), 60);
    assert!(RestTimerHandle::new(timer, dispatcher, Duration::from_secs(1)).is_err());
}

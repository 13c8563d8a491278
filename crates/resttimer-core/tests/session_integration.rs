//! End-to-end tests for a rest session: preferences, suggestions, seeding
//! and auto-start.

use std::sync::Arc;
use std::time::Duration;

use resttimer_core::{
    AnalyticsReporter, ChannelAnalyticsSink, Collaborators, CoreError, ExerciseType,
    FixedBaseline, HistoryBaselineSource, HistoryLog, MemoryPreferenceStore, MonotonicClock,
    NoopHaptics, PreferencePatch, PreferenceStore, RestSession, SessionConfig, TimeOfDay,
    TimerMode, TimerPhase, UserRestPreferences, WorkoutContext,
};

fn context(set_number: u32) -> WorkoutContext {
    WorkoutContext {
        exercise_name: "Back Squat".into(),
        exercise_type: ExerciseType::Strength,
        set_number,
        total_sets: 3,
        workout_progress: 0.5,
        is_compound_movement: true,
        intensity: 9,
        time_of_day: TimeOfDay::Evening,
        tends_to_skip_rests: false,
    }
}

async fn open(
    store: Arc<dyn PreferenceStore>,
    baseline: Option<u32>,
    analytics: AnalyticsReporter,
) -> RestSession {
    RestSession::open(
        SessionConfig::new("alice").with_workout("w-42"),
        Collaborators {
            preferences: store,
            baseline: Arc::new(FixedBaseline(baseline)),
            haptics: Arc::new(NoopHaptics),
            analytics,
            clock: Arc::new(MonotonicClock::new()),
        },
    )
    .await
    .unwrap()
}

async fn store_with(prefs: UserRestPreferences) -> Arc<MemoryPreferenceStore> {
    let store = Arc::new(MemoryPreferenceStore::new());
    store.store("alice", &prefs).await.unwrap();
    store
}

#[tokio::test(start_paused = true)]
async fn final_compound_set_scenario() {
    let store = store_with(UserRestPreferences {
        auto_start: false,
        ..Default::default()
    })
    .await;
    let session = open(store, Some(90), AnalyticsReporter::disabled()).await;

    let set = session.begin_rest(context(3)).await.unwrap();
    assert_eq!(set.suggested_time, 90);
    assert!(set.suggestions.len() <= 4);
    assert!(set
        .suggestions
        .windows(2)
        .all(|w| w[0].confidence >= w[1].confidence));

    let final_set = set.suggestions.iter().find(|s| s.reason == "Final set").unwrap();
    assert_eq!(final_set.time, 135);
    let compound = set
        .suggestions
        .iter()
        .find(|s| s.reason == "Compound movement")
        .unwrap();
    assert_eq!(compound.time, 120);
    let recommended = set.suggestions.iter().find(|s| s.reason == "Recommended").unwrap();
    assert!(final_set.confidence < recommended.confidence);

    let state = session.timer().state();
    assert_eq!(state.current_time, 90);
    assert_eq!(state.phase, TimerPhase::Idle);
    assert_eq!(state.mode, TimerMode::Adaptive);
}

#[tokio::test(start_paused = true)]
async fn auto_start_counts_down_immediately() {
    let session = open(
        Arc::new(MemoryPreferenceStore::new()),
        Some(60),
        AnalyticsReporter::disabled(),
    )
    .await;
    session.begin_rest(context(1)).await.unwrap();
    assert!(session.timer().state().is_running);
    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(session.timer().state().current_time, 55);
}

#[tokio::test(start_paused = true)]
async fn new_set_replaces_running_interval() {
    let session = open(
        Arc::new(MemoryPreferenceStore::new()),
        Some(60),
        AnalyticsReporter::disabled(),
    )
    .await;
    session.begin_rest(context(1)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10_500)).await;

    session.begin_rest(context(2)).await.unwrap();
    let state = session.timer().state();
    assert_eq!(state.current_time, 60);
    assert!(state.is_running);
}

#[tokio::test(start_paused = true)]
async fn pinned_initial_time_is_not_reseeded() {
    let store = store_with(UserRestPreferences {
        auto_start: false,
        ..Default::default()
    })
    .await;
    let session = open(store, Some(90), AnalyticsReporter::disabled()).await;

    session.pin_initial_time(Some(45));
    session.begin_rest(context(1)).await.unwrap();
    let state = session.timer().state();
    assert_eq!(state.current_time, 45);
    assert_eq!(state.suggested_time, 90);
    assert_eq!(state.mode, TimerMode::Manual);

    session.pin_initial_time(None);
    session.begin_rest(context(2)).await.unwrap();
    assert_eq!(session.timer().state().current_time, 90);
}

#[tokio::test(start_paused = true)]
async fn unavailable_collaborators_degrade_to_defaults() {
    let session = open(
        Arc::new(MemoryPreferenceStore::unavailable()),
        None,
        AnalyticsReporter::disabled(),
    )
    .await;
    assert_eq!(session.preferences(), UserRestPreferences::default());

    // no history: the user's default, untouched by workout progress
    let set = session.begin_rest(context(1)).await.unwrap();
    assert_eq!(set.suggested_time, 90);
    assert!(!set.from_history);
    assert_eq!(session.timer().state().mode, TimerMode::Auto);

    // remote save fails but the in-memory merge stands
    let pending = session.update_preferences(&PreferencePatch {
        default_rest_time: Some(120),
        ..Default::default()
    });
    pending.unwrap().await.unwrap();
    assert_eq!(session.preferences().default_rest_time, 120);
}

#[tokio::test(start_paused = true)]
async fn invalid_context_is_rejected() {
    let session = open(
        Arc::new(MemoryPreferenceStore::new()),
        None,
        AnalyticsReporter::disabled(),
    )
    .await;
    let bad = WorkoutContext {
        intensity: 0,
        ..context(1)
    };
    assert!(matches!(
        session.begin_rest(bad).await,
        Err(CoreError::Validation(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn completed_interval_feeds_history_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let log = HistoryLog::new(dir.path().join("history.jsonl"));
    let (sink, rx) = ChannelAnalyticsSink::new();
    let writer = log.clone().spawn_writer(rx);

    let session = RestSession::open(
        SessionConfig::new("alice").with_workout("w-1"),
        Collaborators {
            preferences: Arc::new(MemoryPreferenceStore::new()),
            baseline: Arc::new(HistoryBaselineSource::new(log.clone(), 10)),
            haptics: Arc::new(NoopHaptics),
            analytics: AnalyticsReporter::new(Arc::new(sink)),
            clock: Arc::new(MonotonicClock::new()),
        },
    )
    .await
    .unwrap();

    let first = session.begin_rest(context(1)).await.unwrap();
    assert!(!first.from_history);
    session.timer().set_performance_rating(Some(7));
    let rest = Duration::from_secs(first.suggested_time as u64);
    tokio::time::sleep(rest + Duration::from_millis(500)).await;
    assert!(session.timer().state().is_completed);

    drop(session);
    writer.await.unwrap();

    let records = log.read_all().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].performance_rating, Some(7));
    assert_eq!(records[0].workout_id, "w-1");
    assert_eq!(records[0].context.as_ref().unwrap().exercise_name, "Back Squat");

    let source = HistoryBaselineSource::new(log, 10);
    let learned = resttimer_core::HistoricalSource::optimal_rest_time(&source, "alice", &context(2))
        .await
        .unwrap();
    assert_eq!(learned, Some(first.suggested_time));
}

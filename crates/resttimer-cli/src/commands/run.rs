use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

use resttimer_core::{
    AnalyticsReporter, ChannelAnalyticsSink, Collaborators, Config, HapticSink,
    HistoryBaselineSource, HistoryLog, MonotonicClock, NoopHaptics, RestSession, SessionConfig,
};

use crate::common::{preference_store, runtime, CliResult, ContextArgs, TerminalHaptics};

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub context: ContextArgs,
    /// Pin the countdown to this many seconds instead of the suggestion
    #[arg(long)]
    pub seconds: Option<u32>,
    /// Skip the rest after this many seconds
    #[arg(long)]
    pub skip_after: Option<u64>,
    /// Add (or, if negative, remove) seconds right after starting
    #[arg(long, allow_hyphen_values = true)]
    pub adjust: Option<i64>,
    /// Rating (1-10) of the set just performed
    #[arg(long)]
    pub rating: Option<u8>,
    /// Workout id attached to the analytics record
    #[arg(long)]
    pub workout: Option<String>,
    /// User id (defaults to config user.id)
    #[arg(long)]
    pub user: Option<String>,
}

pub fn run(args: RunArgs) -> CliResult {
    let config = Config::load_or_default();
    let context = args.context.to_context();
    context.validate()?;
    let user_id = args.user.clone().unwrap_or_else(|| config.user.id.clone());
    let workout_id = args
        .workout
        .clone()
        .unwrap_or_else(|| format!("cli-{}", chrono::Local::now().format("%Y%m%d")));

    runtime()?.block_on(async move {
        let history = HistoryLog::new(config.history_path()?);
        let (analytics, writer) = if config.analytics.enabled {
            let (sink, rx) = ChannelAnalyticsSink::new();
            let writer = history.clone().spawn_writer(rx);
            (AnalyticsReporter::new(Arc::new(sink)), Some(writer))
        } else {
            (AnalyticsReporter::disabled(), None)
        };
        let haptics: Arc<dyn HapticSink> = if config.haptics.enabled {
            Arc::new(TerminalHaptics)
        } else {
            Arc::new(NoopHaptics)
        };

        let session = RestSession::open(
            SessionConfig {
                user_id,
                workout_id: Some(workout_id),
                tick_period: config.tick_period(),
                low_time_threshold_secs: config.timer.low_time_threshold_secs,
            },
            Collaborators {
                preferences: preference_store()?,
                baseline: Arc::new(HistoryBaselineSource::new(
                    history,
                    config.analytics.history_window,
                )),
                haptics,
                analytics,
                clock: Arc::new(MonotonicClock::new()),
            },
        )
        .await?;

        let mut events = session.timer().subscribe();
        session.pin_initial_time(args.seconds);
        let set = session.begin_rest(context).await?;
        println!("{}", serde_json::to_string(&set)?);

        session.timer().set_performance_rating(args.rating);
        if !session.timer().state().is_running {
            session.timer().start(None);
        }
        if let Some(delta) = args.adjust {
            session.timer().adjust(delta);
        }

        let mut skip_at = args
            .skip_after
            .map(|secs| tokio::time::Instant::now() + Duration::from_secs(secs));
        loop {
            let received = match skip_at {
                Some(deadline) => tokio::select! {
                    ev = events.recv() => ev,
                    _ = tokio::time::sleep_until(deadline) => {
                        skip_at = None;
                        session.timer().skip();
                        continue;
                    }
                },
                None => events.recv().await,
            };
            match received {
                Ok(event) => {
                    println!("{}", serde_json::to_string(&event)?);
                    if event.outcome().is_some() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "event output fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }

        // closing the session closes the analytics channel
        drop(session);
        if let Some(writer) = writer {
            writer.await?;
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

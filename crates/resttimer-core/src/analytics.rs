//! Per-interval analytics.
//!
//! One [`RestRecord`] is produced for each completed or skipped rest
//! interval. Delivery is best effort: failures are logged and dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::context::WorkoutContext;
use crate::error::SinkError;

/// How one rest interval was actually used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestRecord {
    pub id: Uuid,
    pub user_id: String,
    pub workout_id: String,
    #[serde(default)]
    pub context: Option<WorkoutContext>,
    pub suggested_time: u32,
    pub actual_time: u32,
    pub was_skipped: bool,
    pub was_extended: bool,
    #[serde(default)]
    pub performance_rating: Option<u8>,
    pub recorded_at: DateTime<Utc>,
}

/// Everything about an interval except who it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalReport {
    pub context: Option<WorkoutContext>,
    pub suggested_time: u32,
    pub actual_time: u32,
    pub was_skipped: bool,
    pub was_extended: bool,
    pub performance_rating: Option<u8>,
}

/// Destination for analytics records. Must not block.
pub trait AnalyticsSink: Send + Sync {
    fn submit(&self, record: RestRecord) -> Result<(), SinkError>;
}

/// Builds records and hands them to the sink.
#[derive(Clone)]
pub struct AnalyticsReporter {
    sink: std::sync::Arc<dyn AnalyticsSink>,
}

impl AnalyticsReporter {
    pub fn new(sink: std::sync::Arc<dyn AnalyticsSink>) -> Self {
        Self { sink }
    }

    /// Reporter that drops everything.
    pub fn disabled() -> Self {
        Self::new(std::sync::Arc::new(DiscardSink))
    }

    /// Record one interval. A missing user or workout id makes this a no-op.
    pub fn record(&self, user_id: Option<&str>, workout_id: Option<&str>, report: IntervalReport) {
        let (Some(user_id), Some(workout_id)) = (user_id, workout_id) else {
            tracing::debug!("no user or workout id, analytics record skipped");
            return;
        };
        let record = RestRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            workout_id: workout_id.to_string(),
            context: report.context,
            suggested_time: report.suggested_time,
            actual_time: report.actual_time,
            was_skipped: report.was_skipped,
            was_extended: report.was_extended,
            performance_rating: report.performance_rating,
            recorded_at: Utc::now(),
        };
        if let Err(e) = self.sink.submit(record) {
            tracing::warn!(error = %e, "failed to record rest analytics");
        }
    }
}

struct DiscardSink;

impl AnalyticsSink for DiscardSink {
    fn submit(&self, _record: RestRecord) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Non-blocking hand-off to whatever drains the receiver.
#[derive(Debug, Clone)]
pub struct ChannelAnalyticsSink {
    tx: mpsc::UnboundedSender<RestRecord>,
}

impl ChannelAnalyticsSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RestRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl AnalyticsSink for ChannelAnalyticsSink {
    fn submit(&self, record: RestRecord) -> Result<(), SinkError> {
        self.tx
            .send(record)
            .map_err(|_| SinkError::Closed("analytics-channel".into()))
    }
}

//! JSON-lines log of past rest intervals, and the baseline learned from it.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::analytics::RestRecord;
use crate::context::WorkoutContext;
use crate::error::StoreError;
use crate::suggestion::HistoricalSource;

/// Append-only record file, one JSON object per line.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, record: &RestRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// All readable records in file order. Malformed lines are skipped.
    pub async fn read_all(&self) -> Result<Vec<RestRecord>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut records = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RestRecord>(line) {
                Ok(r) => records.push(r),
                Err(e) => {
                    tracing::warn!(line = idx + 1, error = %e, "skipping malformed history line");
                }
            }
        }
        Ok(records)
    }

    /// Drain `rx` into the log until every sender is gone.
    pub fn spawn_writer(self, mut rx: mpsc::UnboundedReceiver<RestRecord>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                if let Err(e) = self.append(&record).await {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "failed to append rest history"
                    );
                }
            }
        })
    }
}

/// Historical baseline: median actual rest of the user's recent completed
/// intervals for the same exercise.
#[derive(Debug, Clone)]
pub struct HistoryBaselineSource {
    log: HistoryLog,
    window: usize,
}

impl HistoryBaselineSource {
    pub fn new(log: HistoryLog, window: usize) -> Self {
        Self {
            log,
            window: window.max(1),
        }
    }
}

#[async_trait]
impl HistoricalSource for HistoryBaselineSource {
    async fn optimal_rest_time(
        &self,
        user_id: &str,
        context: &WorkoutContext,
    ) -> Result<Option<u32>, StoreError> {
        let records = self.log.read_all().await?;
        let mut times: Vec<u32> = records
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id && !r.was_skipped && r.actual_time > 0)
            .filter(|r| {
                r.context
                    .as_ref()
                    .is_some_and(|c| c.exercise_name.eq_ignore_ascii_case(&context.exercise_name))
            })
            .take(self.window)
            .map(|r| r.actual_time)
            .collect();
        Ok(median(&mut times))
    }
}

fn median(values: &mut [u32]) -> Option<u32> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        let sum = values[mid - 1] as u64 + values[mid] as u64;
        Some(((sum + 1) / 2) as u32)
    } else {
        Some(values[mid])
    }
}

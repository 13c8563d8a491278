use async_trait::async_trait;
use std::sync::Arc;

use crate::context::WorkoutContext;
use crate::error::StoreError;

/// Supplies the "optimal" rest time learned from a user's past intervals.
///
/// `Ok(None)` means there is no signal for this context yet.
#[async_trait]
pub trait HistoricalSource: Send + Sync {
    async fn optimal_rest_time(
        &self,
        user_id: &str,
        context: &WorkoutContext,
    ) -> Result<Option<u32>, StoreError>;
}

pub type BaselineSource = Arc<dyn HistoricalSource>;

/// Always answers with the same value.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedBaseline(pub Option<u32>);

#[async_trait]
impl HistoricalSource for FixedBaseline {
    async fn optimal_rest_time(
        &self,
        _user_id: &str,
        _context: &WorkoutContext,
    ) -> Result<Option<u32>, StoreError> {
        Ok(self.0)
    }
}

//! Sales progress of a raffle, fetched from the status-counts endpoint.

use crate::aggregator::StatusBreakdown;
use crate::api::RaffleApi;
use crate::error::ApiResult;
use crate::types::{NumberStatusCounts, RaffleId, RaffleOption};

/// Counts and derived breakdown of one raffle
#[derive(Clone, Debug, PartialEq)]
pub struct RaffleProgress {
    /// Raffle the counts belong to
    pub raffle_id: RaffleId,
    /// Raw per-status counts
    pub counts: NumberStatusCounts,
    /// Stacked segments over the raffle's pool
    pub breakdown: StatusBreakdown,
}

impl RaffleProgress {
    /// Build the breakdown of `counts` against the raffle's pool size
    #[must_use]
    pub fn new(raffle: &RaffleOption, counts: NumberStatusCounts) -> Self {
        Self {
            raffle_id: raffle.id,
            counts,
            breakdown: StatusBreakdown::detailed(&counts, raffle.total_numbers),
        }
    }
}

/// Fetch the status counts of `raffle` and break them down
///
/// # Errors
///
/// Any [`ApiError`](crate::error::ApiError) from the status-counts call.
pub async fn load_progress(api: &dyn RaffleApi, raffle: &RaffleOption) -> ApiResult<RaffleProgress> {
    let counts = api.fetch_status_counts(raffle.id).await?;
    let progress = RaffleProgress::new(raffle, counts);

    if !progress.breakdown.is_consistent() {
        tracing::warn!(
            raffle_id = %raffle.id,
            total = raffle.total_numbers,
            counted = counts.sum(),
            "Status counts do not add up to the raffle's pool"
        );
    }

    Ok(progress)
}

//! Per-status ticket counts turned into stacked progress segments.
//!
//! Segments are laid out left to right in [`STACK_ORDER`]; each segment's
//! offset is the sum of the percentages before it. Counts that do not add
//! up to the pool size are reported as-is (see [`StatusBreakdown::is_consistent`]).

use crate::types::NumberStatusCounts;

/// Ticket status as shown in progress bars
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumberStatus {
    /// Paid
    Sold,
    /// Awaiting payment confirmation
    Pending,
    /// Held for a client
    Apartado,
    /// Free to buy
    Available,
}

/// Left-to-right order of the stacked bar
pub const STACK_ORDER: [NumberStatus; 4] = [
    NumberStatus::Sold,
    NumberStatus::Pending,
    NumberStatus::Apartado,
    NumberStatus::Available,
];

impl NumberStatus {
    const fn count_in(self, counts: &NumberStatusCounts) -> u64 {
        match self {
            Self::Sold => counts.sold,
            Self::Pending => counts.pending,
            Self::Apartado => counts.apartado,
            Self::Available => counts.available,
        }
    }
}

/// `count / total * 100`; zero for an empty pool
#[must_use]
#[allow(clippy::cast_precision_loss)] // ticket pools are far below 2^52
pub fn percent_of(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 * 100.0 / total as f64
}

/// Round to one decimal place
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// One-decimal percent label, e.g. `"30.0%"`
#[must_use]
pub fn percent_label(value: f64) -> String {
    format!("{:.1}%", round_one_decimal(value))
}

/// One stacked segment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Status this segment shows
    pub status: NumberStatus,
    /// Raw ticket count
    pub count: u64,
    /// Share of the pool, unrounded
    pub percent: f64,
    /// Where the segment starts, in percent of the bar
    pub offset: f64,
}

impl Segment {
    /// Display label of the share
    #[must_use]
    pub fn label(&self) -> String {
        percent_label(self.percent)
    }
}

/// Detailed breakdown across the four statuses
#[derive(Clone, Debug, PartialEq)]
pub struct StatusBreakdown {
    total: u64,
    counted: u64,
    segments: [Segment; 4],
}

impl StatusBreakdown {
    /// Compute percentages and stacking offsets for `counts` against `total`
    #[must_use]
    pub fn detailed(counts: &NumberStatusCounts, total: u64) -> Self {
        let mut offset = 0.0;
        let segments = STACK_ORDER.map(|status| {
            let count = status.count_in(counts);
            let percent = percent_of(count, total);
            let segment = Segment {
                status,
                count,
                percent,
                offset,
            };
            offset += percent;
            segment
        });

        Self {
            total,
            counted: counts.sum(),
            segments,
        }
    }

    /// Segments in stacking order
    #[must_use]
    pub const fn segments(&self) -> &[Segment; 4] {
        &self.segments
    }

    /// The segment for `status`
    #[must_use]
    pub fn segment(&self, status: NumberStatus) -> &Segment {
        let index = STACK_ORDER.iter().position(|s| *s == status).unwrap_or(0);
        &self.segments[index]
    }

    /// Pool size the percentages are relative to
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Whether the four counts add up to the pool size
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.counted == self.total
    }

    /// Collapse sold, pending and apartado into one "taken" share
    #[must_use]
    pub fn combined(&self) -> CombinedBreakdown {
        let taken_count = self
            .segments
            .iter()
            .filter(|s| s.status != NumberStatus::Available)
            .map(|s| s.count)
            .sum();
        let available_count = self.segment(NumberStatus::Available).count;

        CombinedBreakdown {
            taken_count,
            available_count,
            taken_percent: percent_of(taken_count, self.total),
            available_percent: percent_of(available_count, self.total),
        }
    }
}

/// Two-segment view for externally shared pages
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombinedBreakdown {
    /// Sold + pending + apartado
    pub taken_count: u64,
    /// Available
    pub available_count: u64,
    /// Share of taken tickets
    pub taken_percent: f64,
    /// Share of available tickets
    pub available_percent: f64,
}

impl CombinedBreakdown {
    /// Display label of the taken share
    #[must_use]
    pub fn taken_label(&self) -> String {
        percent_label(self.taken_percent)
    }
}

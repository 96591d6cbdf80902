//! Domain types for the reservation intake workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Backend identifier of a raffle
///
/// Zero is the "nothing chosen" sentinel the reservation form starts with.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RaffleId(u64);

impl RaffleId {
    /// Wrap a raw backend id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw backend id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this id refers to an actual raffle
    #[must_use]
    pub const fn is_chosen(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for RaffleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backend identifier of a client (the buyer the dialog reserves for)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(u64);

impl ClientId {
    /// Wrap a raw backend id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw backend id
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// A raffle as listed by the catalog endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaffleOption {
    /// Raffle id
    pub id: RaffleId,
    /// Display name
    pub name: String,
    /// Tax identification of the responsible organizer
    #[serde(rename = "nitResponsable", default)]
    pub identification: String,
    /// Size of the ticket pool; valid numbers are `0..total_numbers`
    #[serde(rename = "totalNumbers")]
    pub total_numbers: u64,
}

/// The raffle currently chosen in the reservation dialog
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChosenRaffle {
    /// Raffle id
    pub id: RaffleId,
    /// Display name
    pub name: String,
    /// Range bound used to validate entered numbers
    pub total_numbers: u64,
}

impl From<&RaffleOption> for ChosenRaffle {
    fn from(option: &RaffleOption) -> Self {
        Self {
            id: option.id,
            name: option.name.clone(),
            total_numbers: option.total_numbers,
        }
    }
}

// ============================================================================
// Ticket numbers
// ============================================================================

/// Canonical ticket number: decimal digits without leading zeros (`"0"` for zero)
///
/// Only [`crate::normalizer::normalize`] produces values of this type, so every
/// instance is canonical.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TicketNumber(String);

impl TicketNumber {
    /// Caller guarantees `digits` is already canonical
    pub(crate) const fn from_canonical(digits: String) -> Self {
        Self(digits)
    }

    /// The canonical digits
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value, or `None` if it does not fit in a `u64`
    #[must_use]
    pub fn value(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TicketNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for TicketNumber {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ============================================================================
// Reservation
// ============================================================================

/// Body of `POST /clients/{clientId}/buy-numbers`
///
/// Built once at submit time from the whole selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    /// Ticket numbers in selection order
    pub numbers: Vec<TicketNumber>,
    /// Raffle the numbers belong to
    pub raffle_id: RaffleId,
}

/// Per-status ticket counts of one raffle
///
/// Expected (not enforced) to sum to the raffle's `total_numbers`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberStatusCounts {
    /// Free to buy
    #[serde(default)]
    pub available: u64,
    /// Paid
    #[serde(default)]
    pub sold: u64,
    /// Awaiting payment confirmation
    #[serde(default)]
    pub pending: u64,
    /// Held for a client (soft reservation)
    #[serde(default)]
    pub apartado: u64,
}

impl NumberStatusCounts {
    /// Sum of all four statuses
    #[must_use]
    pub const fn sum(&self) -> u64 {
        self.available + self.sold + self.pending + self.apartado
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// Severity of a transient notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Confirmed state change
    Success,
    /// Remote failure the user must see
    Error,
}

/// Transient message shown to the user until dismissed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// Dialog-local id used for dismissal
    pub id: u64,
    /// Severity
    pub level: NotificationLevel,
    /// Text shown to the user
    pub message: String,
    /// When the notification was raised
    pub raised_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn raffle_option_reads_backend_field_names() {
        let json = r#"{"id":4,"name":"Gran Rifa","nitResponsable":"900123","totalNumbers":100}"#;
        let option: RaffleOption = serde_json::from_str(json).unwrap();

        assert_eq!(option.id, RaffleId::new(4));
        assert_eq!(option.identification, "900123");
        assert_eq!(option.total_numbers, 100);
    }

    #[test]
    fn reservation_request_uses_camel_case() {
        let request = ReservationRequest {
            numbers: vec![
                TicketNumber::from_canonical("7".to_string()),
                TicketNumber::from_canonical("70".to_string()),
            ],
            raffle_id: RaffleId::new(3),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"numbers": ["7", "70"], "raffleId": 3}));
    }

    #[test]
    fn zero_raffle_id_is_not_chosen() {
        assert!(!RaffleId::default().is_chosen());
        assert!(RaffleId::new(1).is_chosen());
    }

    #[test]
    fn status_counts_sum_all_statuses() {
        let counts = NumberStatusCounts {
            available: 5,
            sold: 3,
            pending: 1,
            apartado: 1,
        };
        assert_eq!(counts.sum(), 10);
    }
}

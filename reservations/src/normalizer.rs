//! Canonicalization and range checking of typed ticket numbers.
//!
//! Raw input goes through three steps before it may join a selection:
//!
//! 1. a leading minus sign rejects the entry outright
//! 2. every other non-digit character is stripped
//! 3. leading zeros are dropped (`"070"` → `"70"`, `"000"` → `"0"`)
//!
//! The result is then checked against the raffle's pool: `0 <= n < total`.
//! Rejections are soft: callers log them and discard the input.

use crate::types::TicketNumber;
use std::fmt::Display;
use thiserror::Error;

/// Why an entered number was discarded
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NumberRejection {
    /// No digits left after filtering
    #[error("input contains no digits")]
    Empty,

    /// Input was a negative number
    #[error("negative numbers are not tickets")]
    Negative,

    /// Value is not inside the raffle's pool
    #[error("number {value} is outside 0..{total}")]
    OutOfRange {
        /// Canonical digits of the rejected value
        value: String,
        /// Pool size of the active raffle
        total: u64,
    },

    /// Number is already part of the selection
    #[error("number {0} is already selected")]
    Duplicate(TicketNumber),

    /// No raffle chosen yet, so there is no bound to check against
    #[error("no raffle chosen")]
    NoActiveRaffle,
}

/// Canonicalize raw input into a ticket number, without any range check
///
/// # Errors
///
/// - [`NumberRejection::Negative`] if the trimmed input starts with `-`
/// - [`NumberRejection::Empty`] if no digits remain after filtering
pub fn normalize(raw: &str) -> Result<TicketNumber, NumberRejection> {
    let trimmed = raw.trim();
    if trimmed.starts_with('-') {
        return Err(NumberRejection::Negative);
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(NumberRejection::Empty);
    }

    let significant = digits.trim_start_matches('0');
    let canonical = if significant.is_empty() {
        "0".to_string()
    } else {
        significant.to_string()
    };

    Ok(TicketNumber::from_canonical(canonical))
}

/// Check that `number` lies in `0..total`
///
/// # Errors
///
/// Returns [`NumberRejection::OutOfRange`] otherwise, including for values
/// too large to fit a `u64`.
pub fn check_range(number: &TicketNumber, total: u64) -> Result<(), NumberRejection> {
    match number.value() {
        Some(value) if value < total => Ok(()),
        _ => Err(NumberRejection::OutOfRange {
            value: number.as_str().to_string(),
            total,
        }),
    }
}

/// [`normalize`] followed by [`check_range`]
///
/// # Errors
///
/// Any rejection of either step.
pub fn normalize_in_range(raw: &str, total: u64) -> Result<TicketNumber, NumberRejection> {
    let number = normalize(raw)?;
    check_range(&number, total)?;
    Ok(number)
}

/// Number of digits of the largest ticket (`total - 1`), at least one
#[must_use]
pub fn pad_width(total: u64) -> usize {
    let largest = total.saturating_sub(1);
    let mut width = 1;
    let mut rest = largest / 10;
    while rest > 0 {
        width += 1;
        rest /= 10;
    }
    width
}

/// Zero-pad a number to the width of the raffle's largest ticket
///
/// `format_padded(7, 100) == "07"`, `format_padded(7, 1000) == "007"`.
#[must_use]
pub fn format_padded(number: impl Display, total: u64) -> String {
    let width = pad_width(total);
    format!("{number:0>width$}")
}

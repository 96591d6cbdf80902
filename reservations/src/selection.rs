//! Ordered set of ticket numbers awaiting submission.

use crate::normalizer::{self, NumberRejection};
use crate::types::TicketNumber;

/// Distinct ticket numbers in the order they were entered
///
/// Lives only as long as one reservation dialog; never persisted. There is
/// no size cap here, limiting how many numbers are shown is a display concern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionSet {
    numbers: Vec<TicketNumber>,
}

impl SelectionSet {
    /// Empty selection
    #[must_use]
    pub const fn new() -> Self {
        Self {
            numbers: Vec::new(),
        }
    }

    /// Append `number` unless already present; returns whether it was inserted
    pub fn add(&mut self, number: TicketNumber) -> bool {
        if self.contains(&number) {
            return false;
        }
        self.numbers.push(number);
        true
    }

    /// Remove `number`; returns whether it was present
    pub fn remove(&mut self, number: &TicketNumber) -> bool {
        let before = self.numbers.len();
        self.numbers.retain(|n| n != number);
        self.numbers.len() != before
    }

    /// Whether `number` is selected
    #[must_use]
    pub fn contains(&self, number: &TicketNumber) -> bool {
        self.numbers.contains(number)
    }

    /// Normalize raw input, check it against `bound` and add it
    ///
    /// # Errors
    ///
    /// - [`NumberRejection::NoActiveRaffle`] when `bound` is `None`
    /// - any normalization or range rejection
    /// - [`NumberRejection::Duplicate`] if already selected
    pub fn enter(&mut self, raw: &str, bound: Option<u64>) -> Result<TicketNumber, NumberRejection> {
        let total = bound.ok_or(NumberRejection::NoActiveRaffle)?;
        let number = normalizer::normalize_in_range(raw, total)?;

        if self.add(number.clone()) {
            Ok(number)
        } else {
            Err(NumberRejection::Duplicate(number))
        }
    }

    /// Drop every number outside `0..total`, returning the dropped ones
    pub fn retain_in_range(&mut self, total: u64) -> Vec<TicketNumber> {
        let (kept, dropped): (Vec<_>, Vec<_>) = std::mem::take(&mut self.numbers)
            .into_iter()
            .partition(|n| normalizer::check_range(n, total).is_ok());
        self.numbers = kept;
        dropped
    }

    /// Selected numbers in entry order
    #[must_use]
    pub fn as_slice(&self) -> &[TicketNumber] {
        &self.numbers
    }

    /// Owned copy of the selection in entry order
    #[must_use]
    pub fn to_list(&self) -> Vec<TicketNumber> {
        self.numbers.clone()
    }

    /// Number of selected tickets
    #[must_use]
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    /// Whether nothing is selected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Forget every selected number
    pub fn clear(&mut self) {
        self.numbers.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;

    fn token(raw: &str) -> TicketNumber {
        normalize(raw).unwrap()
    }

    #[test]
    fn add_is_idempotent() {
        let mut selection = SelectionSet::new();

        assert!(selection.add(token("5")));
        assert!(!selection.add(token("05")));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn keeps_entry_order() {
        let mut selection = SelectionSet::new();
        for raw in ["9", "2", "40"] {
            selection.add(token(raw));
        }
        assert_eq!(selection.to_list(), vec![token("9"), token("2"), token("40")]);

        assert!(selection.remove(&token("2")));
        assert!(!selection.remove(&token("2")));
        assert_eq!(selection.as_slice(), &[token("9"), token("40")]);
    }

    #[test]
    fn enter_enforces_bound_and_uniqueness() {
        let mut selection = SelectionSet::new();

        assert_eq!(selection.enter("49", Some(50)).unwrap(), "49");
        assert!(matches!(
            selection.enter("50", Some(50)),
            Err(NumberRejection::OutOfRange { .. })
        ));
        assert_eq!(selection.enter("-1", Some(50)), Err(NumberRejection::Negative));
        assert_eq!(
            selection.enter("049", Some(50)),
            Err(NumberRejection::Duplicate(token("49")))
        );
        assert_eq!(selection.enter("3", None), Err(NumberRejection::NoActiveRaffle));
        assert_eq!(selection.to_list(), vec![token("49")]);
    }

    #[test]
    fn retain_in_range_prunes_for_smaller_pool() {
        let mut selection = SelectionSet::new();
        for raw in ["5", "150", "20", "99"] {
            selection.enter(raw, Some(1000)).unwrap();
        }

        let dropped = selection.retain_in_range(50);

        assert_eq!(dropped, vec![token("150"), token("99")]);
        assert_eq!(selection.to_list(), vec![token("5"), token("20")]);
    }
}

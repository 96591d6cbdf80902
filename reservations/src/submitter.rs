//! Form validation and the single in-flight submission guard.

use crate::error::ApiResult;
use crate::selection::SelectionSet;
use crate::types::{RaffleId, ReservationRequest};
use std::collections::BTreeMap;
use thiserror::Error;

/// Reservation form fields that can carry a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    /// The number picker
    Numbers,
    /// The raffle picker
    Raffle,
}

/// Local validation failure, shown next to its field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No number was selected
    #[error("Select at least one number")]
    EmptySelection,

    /// No raffle was chosen
    #[error("Choose a raffle")]
    NoRaffleChosen,
}

impl ValidationError {
    /// The field this error belongs to
    #[must_use]
    pub const fn field(self) -> FormField {
        match self {
            Self::EmptySelection => FormField::Numbers,
            Self::NoRaffleChosen => FormField::Raffle,
        }
    }
}

/// Field-scoped validation messages
pub type FieldErrors = BTreeMap<FormField, ValidationError>;

/// Outcome of validating the reservation form
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Validation {
    /// Ready to send
    Valid(ReservationRequest),
    /// At least one field is invalid
    FieldErrors(FieldErrors),
}

/// Validate the form and build the request
///
/// Both checks always run so every field message can be shown at once.
#[must_use]
pub fn validate(selection: &SelectionSet, raffle_id: RaffleId) -> Validation {
    let mut errors = FieldErrors::new();
    if selection.is_empty() {
        errors.insert(FormField::Numbers, ValidationError::EmptySelection);
    }
    if !raffle_id.is_chosen() {
        errors.insert(FormField::Raffle, ValidationError::NoRaffleChosen);
    }

    if errors.is_empty() {
        Validation::Valid(ReservationRequest {
            numbers: selection.to_list(),
            raffle_id,
        })
    } else {
        Validation::FieldErrors(errors)
    }
}

/// Why a submit attempt did not reach the network
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The form is invalid
    #[error("Reservation form has {} invalid field(s)", .0.len())]
    Invalid(FieldErrors),

    /// A previous submission has not answered yet
    #[error("A reservation is already being submitted")]
    AlreadyInFlight,
}

impl SubmitError {
    /// Whether validation failed with `error`
    #[must_use]
    pub fn has(&self, error: ValidationError) -> bool {
        matches!(self, Self::Invalid(errors) if errors.get(&error.field()) == Some(&error))
    }
}

/// Result of a submission that reached the backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 2xx with the backend's confirmation payload
    Accepted {
        /// Opaque success text
        message: String,
    },
    /// Non-2xx or transport failure
    Rejected {
        /// Text shown to the user
        message: String,
    },
}

impl From<ApiResult<String>> for SubmitOutcome {
    fn from(result: ApiResult<String>) -> Self {
        match result {
            Ok(message) => Self::Accepted { message },
            Err(error) => Self::Rejected {
                message: error.user_message(),
            },
        }
    }
}

/// Guards one reservation dialog against duplicate submissions
///
/// Protects against the same user double-submitting. Two users racing for
/// one number is settled by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReservationSubmitter {
    in_flight: bool,
}

impl ReservationSubmitter {
    /// Idle submitter
    #[must_use]
    pub const fn new() -> Self {
        Self { in_flight: false }
    }

    /// Whether a submission is outstanding
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Validate and mark a submission as outstanding
    ///
    /// On success the caller must issue exactly one reservation call with
    /// the returned request and report back through [`Self::finish`].
    ///
    /// # Errors
    ///
    /// - [`SubmitError::AlreadyInFlight`] while a call is outstanding
    /// - [`SubmitError::Invalid`] if the form does not validate
    pub fn begin(
        &mut self,
        selection: &SelectionSet,
        raffle_id: RaffleId,
    ) -> Result<ReservationRequest, SubmitError> {
        if self.in_flight {
            return Err(SubmitError::AlreadyInFlight);
        }

        match validate(selection, raffle_id) {
            Validation::Valid(request) => {
                self.in_flight = true;
                Ok(request)
            },
            Validation::FieldErrors(errors) => Err(SubmitError::Invalid(errors)),
        }
    }

    /// The outstanding call answered
    pub const fn finish(&mut self) {
        self.in_flight = false;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    fn selection(raw: &[&str]) -> SelectionSet {
        let mut selection = SelectionSet::new();
        for r in raw {
            selection.enter(r, Some(100)).unwrap();
        }
        selection
    }

    #[test]
    fn empty_selection_fails() {
        let mut submitter = ReservationSubmitter::new();
        let error = submitter.begin(&SelectionSet::new(), RaffleId::new(3)).unwrap_err();

        assert!(error.has(ValidationError::EmptySelection));
        assert!(!error.has(ValidationError::NoRaffleChosen));
        assert!(!submitter.is_in_flight());
    }

    #[test]
    fn unchosen_raffle_fails() {
        let mut submitter = ReservationSubmitter::new();
        let error = submitter.begin(&selection(&["5"]), RaffleId::new(0)).unwrap_err();

        assert!(error.has(ValidationError::NoRaffleChosen));
        assert!(!error.has(ValidationError::EmptySelection));
    }

    #[test]
    fn reports_every_invalid_field() {
        let Validation::FieldErrors(errors) = validate(&SelectionSet::new(), RaffleId::default()) else {
            panic!("expected field errors");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[&FormField::Numbers], ValidationError::EmptySelection);
        assert_eq!(errors[&FormField::Raffle], ValidationError::NoRaffleChosen);
    }

    #[test]
    fn second_begin_is_refused_until_finish() {
        let mut submitter = ReservationSubmitter::new();
        let numbers = selection(&["5", "07"]);

        let request = submitter.begin(&numbers, RaffleId::new(3)).unwrap();
        assert_eq!(request.numbers, numbers.to_list());
        assert_eq!(request.raffle_id, RaffleId::new(3));

        assert_eq!(
            submitter.begin(&numbers, RaffleId::new(3)),
            Err(SubmitError::AlreadyInFlight)
        );

        submitter.finish();
        assert!(submitter.begin(&numbers, RaffleId::new(3)).is_ok());
    }

    #[test]
    fn outcome_keeps_backend_message() {
        let outcome = SubmitOutcome::from(Err(ApiError::Rejected {
            status: 400,
            message: "Número no disponible".to_string(),
        }));
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected {
                message: "Número no disponible".to_string()
            }
        );
    }
}

//! Reservation dialog: the reducer driving number intake and submission.
//!
//! Flow of one dialog:
//! 1. `Opened` activates the catalog and fetches the first page
//! 2. `RaffleChosen` captures the raffle's pool size as the range bound
//! 3. `NumberEntered` normalizes, range-checks and de-duplicates input;
//!    rejected input is discarded silently
//! 4. `SubmitRequested` validates the form and issues exactly one
//!    buy-numbers call; further submits are refused until it answers
//! 5. `SubmitSucceeded` clears the selection and fires the refresh signal;
//!    `SubmitFailed` keeps the selection for a retry and raises a notification
//!
//! Closing the dialog resets local state but never cancels an in-flight call.
//! Every open starts a new generation. Answers carry the generation they were
//! issued in; an answer from an earlier open still raises its notification
//! and refresh, but leaves the current form and in-flight guard alone.

use crate::api::RaffleApi;
use crate::catalog::{CatalogBrowser, CatalogPage};
use crate::config::DialogConfig;
use crate::error::ApiError;
use crate::selection::SelectionSet;
use crate::submitter::{FieldErrors, FormField, ReservationSubmitter, SubmitError, SubmitOutcome};
use crate::types::{
    ChosenRaffle, ClientId, Notification, NotificationLevel, RaffleId, ReservationRequest,
    TicketNumber,
};
use raffle_desk_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer, smallvec};
use std::sync::Arc;

// ============================================================================
// State
// ============================================================================

/// State of one reservation dialog instance
#[derive(Clone, Debug)]
pub struct ReservationDialogState {
    /// Client the numbers are reserved for
    pub client_id: ClientId,
    /// Whether the dialog is shown
    pub open: bool,
    /// Incremented by every `Opened`; tags catalog fetches and submissions
    pub generation: u64,
    /// Raffle picker pages
    pub catalog: CatalogBrowser,
    /// Raffle whose pool bounds entered numbers
    pub chosen: Option<ChosenRaffle>,
    /// Numbers awaiting submission
    pub selection: SelectionSet,
    /// Single in-flight guard
    pub submitter: ReservationSubmitter,
    /// Field-scoped validation messages
    pub field_errors: FieldErrors,
    /// Visible transient notifications, oldest first
    pub notifications: Vec<Notification>,
    next_notification_id: u64,
}

impl ReservationDialogState {
    /// Closed dialog for `client_id`
    #[must_use]
    pub const fn new(client_id: ClientId, page_size: u32) -> Self {
        Self {
            client_id,
            open: false,
            generation: 0,
            catalog: CatalogBrowser::new(page_size),
            chosen: None,
            selection: SelectionSet::new(),
            submitter: ReservationSubmitter::new(),
            field_errors: FieldErrors::new(),
            notifications: Vec::new(),
            next_notification_id: 1,
        }
    }

    /// Id of the chosen raffle, or the zero sentinel
    #[must_use]
    pub fn chosen_raffle_id(&self) -> RaffleId {
        self.chosen.as_ref().map(|c| c.id).unwrap_or_default()
    }

    /// Range bound of the chosen raffle
    #[must_use]
    pub fn bound(&self) -> Option<u64> {
        self.chosen.as_ref().map(|c| c.total_numbers)
    }

    /// Most recent notification
    #[must_use]
    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.last()
    }

    fn reset_form(&mut self) {
        self.chosen = None;
        self.selection.clear();
        self.field_errors.clear();
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Everything the reservation dialog reacts to
#[derive(Clone, Debug, PartialEq)]
pub enum ReservationDialogAction {
    /// The dialog was opened
    Opened,
    /// The dialog was closed
    Closed,
    /// The user navigated to a catalog page
    CatalogPageRequested {
        /// Page number (1-based)
        page: u32,
    },
    /// A catalog fetch answered
    CatalogPageLoaded {
        /// Dialog generation the fetch was issued in
        generation: u64,
        /// Page the fetch was issued for
        page: u32,
        /// Fetched page or failure
        result: Result<CatalogPage, ApiError>,
    },
    /// A raffle was picked from the shown page
    RaffleChosen {
        /// Picked raffle
        raffle_id: RaffleId,
    },
    /// The user typed a number and confirmed it
    NumberEntered {
        /// Raw input text
        raw: String,
    },
    /// The user removed a selected number
    NumberRemoved {
        /// Number to remove
        number: TicketNumber,
    },
    /// The user pressed submit
    SubmitRequested,
    /// The backend accepted the reservation
    SubmitSucceeded {
        /// Dialog generation the submission was issued in
        generation: u64,
        /// What was reserved
        request: ReservationRequest,
        /// Backend confirmation text
        message: String,
    },
    /// The backend or the network rejected the reservation
    SubmitFailed {
        /// Dialog generation the submission was issued in
        generation: u64,
        /// Text shown to the user
        message: String,
    },
    /// A notification timed out or was closed
    NotificationDismissed {
        /// Notification id
        id: u64,
    },
}

// ============================================================================
// Environment
// ============================================================================

/// Callback fired after a confirmed reservation so dependent views refetch
pub trait RefreshSignal: Send + Sync {
    /// `request` was reserved for `client_id`
    fn reservation_confirmed(&self, client_id: ClientId, request: &ReservationRequest);
}

impl<F> RefreshSignal for F
where
    F: Fn(ClientId, &ReservationRequest) + Send + Sync,
{
    fn reservation_confirmed(&self, client_id: ClientId, request: &ReservationRequest) {
        self(client_id, request);
    }
}

/// Refresh signal that does nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRefresh;

impl RefreshSignal for NoRefresh {
    fn reservation_confirmed(&self, _client_id: ClientId, _request: &ReservationRequest) {}
}

/// Environment dependencies for the reservation dialog
#[derive(Clone)]
pub struct ReservationDialogEnvironment {
    /// Backend client bound to the user's session
    pub api: Arc<dyn RaffleApi>,
    /// Clock for notification timestamps
    pub clock: Arc<dyn Clock>,
    /// Fired after a confirmed reservation
    pub refresh: Arc<dyn RefreshSignal>,
    /// Page size and notification timing
    pub config: DialogConfig,
}

impl ReservationDialogEnvironment {
    /// Creates a new `ReservationDialogEnvironment`
    #[must_use]
    pub fn new(
        api: Arc<dyn RaffleApi>,
        clock: Arc<dyn Clock>,
        refresh: Arc<dyn RefreshSignal>,
        config: DialogConfig,
    ) -> Self {
        Self {
            api,
            clock,
            refresh,
            config,
        }
    }
}

// ============================================================================
// Reducer
// ============================================================================

type Effects = SmallVec<[Effect<ReservationDialogAction>; 4]>;

/// Reducer for the reservation dialog
#[derive(Clone, Copy, Debug, Default)]
pub struct ReservationDialogReducer;

impl ReservationDialogReducer {
    /// Creates a new `ReservationDialogReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn fetch_page(
        generation: u64,
        page: u32,
        env: &ReservationDialogEnvironment,
    ) -> Effect<ReservationDialogAction> {
        let api = Arc::clone(&env.api);
        let limit = env.config.page_size;

        Effect::future(async move {
            let result = api.fetch_raffles(page, limit).await;
            Some(ReservationDialogAction::CatalogPageLoaded {
                generation,
                page,
                result,
            })
        })
    }

    /// Raise a notification and schedule its dismissal
    fn notify(
        state: &mut ReservationDialogState,
        level: NotificationLevel,
        message: String,
        env: &ReservationDialogEnvironment,
    ) -> Effect<ReservationDialogAction> {
        let id = state.next_notification_id;
        state.next_notification_id += 1;
        state.notifications.push(Notification {
            id,
            level,
            message,
            raised_at: env.clock.now(),
        });

        Effect::delay(
            env.config.notification_duration,
            ReservationDialogAction::NotificationDismissed { id },
        )
    }

    fn choose_raffle(state: &mut ReservationDialogState, raffle_id: RaffleId) {
        let Some(option) = state.catalog.find(raffle_id) else {
            tracing::warn!(%raffle_id, "Chosen raffle is not on the shown page");
            return;
        };
        let chosen = ChosenRaffle::from(option);

        let dropped = state.selection.retain_in_range(chosen.total_numbers);
        if !dropped.is_empty() {
            tracing::info!(
                %raffle_id,
                dropped = dropped.len(),
                "Pruned selected numbers outside the new raffle's pool"
            );
        }

        state.field_errors.remove(&FormField::Raffle);
        state.chosen = Some(chosen);
    }

    fn submit(state: &mut ReservationDialogState, env: &ReservationDialogEnvironment) -> Effects {
        let raffle_id = state.chosen_raffle_id();

        match state.submitter.begin(&state.selection, raffle_id) {
            Ok(request) => {
                state.field_errors.clear();
                tracing::info!(
                    client_id = %state.client_id,
                    %raffle_id,
                    numbers = request.numbers.len(),
                    "Submitting reservation"
                );

                let api = Arc::clone(&env.api);
                let client_id = state.client_id;
                let generation = state.generation;
                smallvec![Effect::future(async move {
                    let outcome = SubmitOutcome::from(api.buy_numbers(client_id, request.clone()).await);
                    Some(match outcome {
                        SubmitOutcome::Accepted { message } => ReservationDialogAction::SubmitSucceeded {
                            generation,
                            request,
                            message,
                        },
                        SubmitOutcome::Rejected { message } => {
                            ReservationDialogAction::SubmitFailed { generation, message }
                        },
                    })
                })]
            },
            Err(SubmitError::Invalid(errors)) => {
                tracing::debug!(?errors, "Reservation form invalid");
                state.field_errors = errors;
                SmallVec::new()
            },
            Err(SubmitError::AlreadyInFlight) => {
                tracing::debug!("Submit refused: a reservation is already in flight");
                SmallVec::new()
            },
        }
    }
}

impl Reducer for ReservationDialogReducer {
    type State = ReservationDialogState;
    type Action = ReservationDialogAction;
    type Environment = ReservationDialogEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        match action {
            ReservationDialogAction::Opened => {
                if state.open {
                    return SmallVec::new();
                }
                state.open = true;
                state.generation += 1;
                // a call from an earlier open must not block this one
                state.submitter = ReservationSubmitter::new();
                state.reset_form();
                let page = state.catalog.activate();
                smallvec![Self::fetch_page(state.generation, page, env)]
            },

            ReservationDialogAction::Closed => {
                state.open = false;
                state.catalog.deactivate();
                state.reset_form();
                SmallVec::new()
            },

            ReservationDialogAction::CatalogPageRequested { page } => {
                match state.catalog.request(page) {
                    Some(page) => smallvec![Self::fetch_page(state.generation, page, env)],
                    None => {
                        tracing::debug!(page, "Catalog page not fetched: dialog closed or invalid page");
                        SmallVec::new()
                    },
                }
            },

            ReservationDialogAction::CatalogPageLoaded {
                generation,
                page,
                result,
            } if generation != state.generation => {
                tracing::debug!(
                    page,
                    generation,
                    ok = result.is_ok(),
                    "Dropped catalog answer from an earlier open"
                );
                SmallVec::new()
            },

            ReservationDialogAction::CatalogPageLoaded { page, result, .. } => match result {
                Ok(loaded) => {
                    let count = loaded.raffles.len();
                    if state.catalog.accept(loaded) {
                        tracing::info!(page, raffles = count, "Catalog page loaded");
                    } else {
                        tracing::debug!(page, "Dropped stale catalog page");
                    }
                    SmallVec::new()
                },
                Err(error) => {
                    if !state.catalog.fail(page) {
                        tracing::debug!(page, %error, "Dropped stale catalog failure");
                        return SmallVec::new();
                    }
                    tracing::warn!(page, %error, "Catalog page failed to load");
                    let message = format!("Could not load raffles: {}", error.user_message());
                    smallvec![Self::notify(state, NotificationLevel::Error, message, env)]
                },
            },

            ReservationDialogAction::RaffleChosen { raffle_id } => {
                if state.open {
                    Self::choose_raffle(state, raffle_id);
                }
                SmallVec::new()
            },

            ReservationDialogAction::NumberEntered { raw } => {
                if !state.open {
                    return SmallVec::new();
                }
                let bound = state.bound();
                match state.selection.enter(&raw, bound) {
                    Ok(number) => {
                        state.field_errors.remove(&FormField::Numbers);
                        tracing::debug!(%number, "Number selected");
                    },
                    Err(rejection) => {
                        tracing::debug!(%raw, %rejection, "Number entry discarded");
                    },
                }
                SmallVec::new()
            },

            ReservationDialogAction::NumberRemoved { number } => {
                state.selection.remove(&number);
                SmallVec::new()
            },

            ReservationDialogAction::SubmitRequested => Self::submit(state, env),

            ReservationDialogAction::SubmitSucceeded {
                generation,
                request,
                message,
            } => {
                if generation == state.generation {
                    state.submitter.finish();
                    state.selection.clear();
                    state.field_errors.clear();
                } else {
                    tracing::debug!(
                        generation,
                        "Confirmation from an earlier open leaves the form untouched"
                    );
                }
                tracing::info!(
                    client_id = %state.client_id,
                    raffle_id = %request.raffle_id,
                    "Reservation confirmed"
                );

                let refresh = Arc::clone(&env.refresh);
                let client_id = state.client_id;
                smallvec![
                    Effect::future(async move {
                        refresh.reservation_confirmed(client_id, &request);
                        None
                    }),
                    Self::notify(state, NotificationLevel::Success, message, env),
                ]
            },

            ReservationDialogAction::SubmitFailed { generation, message } => {
                if generation == state.generation {
                    state.submitter.finish();
                }
                tracing::error!(client_id = %state.client_id, %message, "Reservation rejected");
                smallvec![Self::notify(state, NotificationLevel::Error, message, env)]
            },

            ReservationDialogAction::NotificationDismissed { id } => {
                state.notifications.retain(|n| n.id != id);
                SmallVec::new()
            },
        }
    }
}

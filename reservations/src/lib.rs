//! Raffle desk reservation intake.
//!
//! Lets an operator reserve specific ticket numbers in a raffle on behalf
//! of a client. The workflow is one [`Reducer`](raffle_desk_core::reducer::Reducer)
//! run by the [`Store`](raffle_desk_runtime::Store):
//!
//! ```text
//!   Opened ─► catalog page fetch ─► RaffleChosen ─► NumberEntered*
//!                                                      │
//!                                               SubmitRequested
//!                                                      │ (one in flight)
//!                                        ┌─────────────┴─────────────┐
//!                                 SubmitSucceeded              SubmitFailed
//!                          clear selection, refresh     keep selection, notify
//! ```
//!
//! # Modules
//!
//! - [`normalizer`]: raw input to canonical ticket numbers and range checks
//! - [`selection`]: ordered, duplicate-free set of chosen numbers
//! - [`catalog`]: paged raffle picker with stale-response handling
//! - [`submitter`]: form validation and the single in-flight guard
//! - [`dialog`]: the reducer tying it together
//! - [`aggregator`]: per-status counts as stacked percentage segments
//! - [`api`]: the backend seam and its `reqwest` implementation
//!
//! # Example
//!
//! ```no_run
//! use raffle_desk_reservations::{
//!     ClientConfig, HttpRaffleApi, ReservationDialogAction, ReservationDialogEnvironment,
//!     ReservationDialogReducer, ReservationDialogState, dialog::NoRefresh,
//! };
//! use raffle_desk_core::environment::SystemClock;
//! use raffle_desk_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let env = ReservationDialogEnvironment::new(
//!     Arc::new(HttpRaffleApi::from_config(&config)?),
//!     Arc::new(SystemClock),
//!     Arc::new(NoRefresh),
//!     config.dialog(),
//! );
//! let state = ReservationDialogState::new(raffle_desk_reservations::ClientId::new(42), config.page_size);
//! let store = Store::new(state, ReservationDialogReducer::new(), env);
//!
//! store.send(ReservationDialogAction::Opened).await?.wait().await;
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod api;
pub mod catalog;
pub mod config;
pub mod dialog;
pub mod error;
pub mod normalizer;
pub mod progress;
pub mod selection;
pub mod submitter;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use aggregator::{CombinedBreakdown, NumberStatus, Segment, StatusBreakdown};
pub use api::{HttpRaffleApi, RaffleApi, Session};
pub use catalog::{CatalogBrowser, CatalogPage};
pub use config::{ClientConfig, DialogConfig};
pub use dialog::{
    RefreshSignal, ReservationDialogAction, ReservationDialogEnvironment, ReservationDialogReducer,
    ReservationDialogState,
};
pub use error::{ApiError, ApiResult, ConfigError};
pub use normalizer::NumberRejection;
pub use progress::{RaffleProgress, load_progress};
pub use selection::SelectionSet;
pub use submitter::{SubmitError, ValidationError};
pub use types::{
    ChosenRaffle, ClientId, Notification, NotificationLevel, NumberStatusCounts, RaffleId,
    RaffleOption, ReservationRequest, TicketNumber,
};

//! In-memory backend and refresh doubles for tests.

use crate::api::{ApiFuture, RaffleApi};
use crate::catalog::CatalogPage;
use crate::dialog::RefreshSignal;
use crate::error::{ApiError, ApiResult};
use crate::types::{ClientId, NumberStatusCounts, RaffleId, RaffleOption, ReservationRequest};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Semaphore;

/// Mock raffle backend.
///
/// Serves a fixed raffle list in pages, answers purchases with a
/// configurable result and records every call. A gated mock holds each
/// purchase until [`MockRaffleApi::release_purchase`] is called.
#[derive(Debug, Clone)]
pub struct MockRaffleApi {
    raffles: Arc<Vec<RaffleOption>>,
    catalog_error: Option<ApiError>,
    buy_result: Arc<Mutex<ApiResult<String>>>,
    status_counts: NumberStatusCounts,
    purchases: Arc<Mutex<Vec<(ClientId, ReservationRequest)>>>,
    catalog_calls: Arc<AtomicUsize>,
    status_calls: Arc<AtomicUsize>,
    gate: Option<Arc<Semaphore>>,
}

impl MockRaffleApi {
    /// Empty catalog; purchases succeed with `"Números comprados"`
    #[must_use]
    pub fn new() -> Self {
        Self {
            raffles: Arc::new(Vec::new()),
            catalog_error: None,
            buy_result: Arc::new(Mutex::new(Ok("Números comprados".to_string()))),
            status_counts: NumberStatusCounts::default(),
            purchases: Arc::new(Mutex::new(Vec::new())),
            catalog_calls: Arc::new(AtomicUsize::new(0)),
            status_calls: Arc::new(AtomicUsize::new(0)),
            gate: None,
        }
    }

    /// Serve `raffles` from the catalog endpoint
    #[must_use]
    pub fn with_raffles(mut self, raffles: Vec<RaffleOption>) -> Self {
        self.raffles = Arc::new(raffles);
        self
    }

    /// Fail every catalog fetch with `error`
    #[must_use]
    pub fn failing_catalog(mut self, error: ApiError) -> Self {
        self.catalog_error = Some(error);
        self
    }

    /// Answer purchases with `result`
    #[must_use]
    pub fn with_buy_result(self, result: ApiResult<String>) -> Self {
        self.set_buy_result(result);
        self
    }

    /// Change the purchase answer after construction
    pub fn set_buy_result(&self, result: ApiResult<String>) {
        *self.buy_result.lock().unwrap_or_else(PoisonError::into_inner) = result;
    }

    /// Serve `counts` from the status-counts endpoint
    #[must_use]
    pub const fn with_status_counts(mut self, counts: NumberStatusCounts) -> Self {
        self.status_counts = counts;
        self
    }

    /// Hold purchases until released
    #[must_use]
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let one held purchase answer
    pub fn release_purchase(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// Number of buy-numbers calls issued
    #[must_use]
    pub fn buy_calls(&self) -> usize {
        self.lock_purchases().len()
    }

    /// Every buy-numbers call, in issue order
    #[must_use]
    pub fn purchases(&self) -> Vec<(ClientId, ReservationRequest)> {
        self.lock_purchases().clone()
    }

    /// Number of catalog fetches issued
    #[must_use]
    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }

    /// Number of status-counts fetches issued
    #[must_use]
    pub fn status_count_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn lock_purchases(&self) -> std::sync::MutexGuard<'_, Vec<(ClientId, ReservationRequest)>> {
        self.purchases.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn page(&self, page: u32, limit: u32) -> CatalogPage {
        let skip = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        CatalogPage {
            page,
            page_size: limit,
            raffles: self.raffles.iter().skip(skip).take(limit as usize).cloned().collect(),
            total: Some(self.raffles.len() as u64),
        }
    }
}

impl Default for MockRaffleApi {
    fn default() -> Self {
        Self::new()
    }
}

impl RaffleApi for MockRaffleApi {
    fn fetch_raffles(&self, page: u32, limit: u32) -> ApiFuture<CatalogPage> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        let result = self
            .catalog_error
            .clone()
            .map_or_else(|| Ok(self.page(page, limit)), Err);

        Box::pin(async move { result })
    }

    fn buy_numbers(&self, client_id: ClientId, request: ReservationRequest) -> ApiFuture<String> {
        self.lock_purchases().push((client_id, request));
        let gate = self.gate.clone();
        let buy_result = Arc::clone(&self.buy_result);

        Box::pin(async move {
            if let Some(gate) = gate {
                let permit = gate
                    .acquire_owned()
                    .await
                    .map_err(|e| ApiError::Transport(e.to_string()))?;
                permit.forget();
            }
            buy_result.lock().unwrap_or_else(PoisonError::into_inner).clone()
        })
    }

    fn fetch_status_counts(&self, _raffle_id: RaffleId) -> ApiFuture<NumberStatusCounts> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let counts = self.status_counts;

        Box::pin(async move { Ok(counts) })
    }
}

/// Refresh signal recording every confirmation
#[derive(Debug, Clone, Default)]
pub struct RecordingRefresh {
    confirmations: Arc<Mutex<Vec<(ClientId, ReservationRequest)>>>,
}

impl RecordingRefresh {
    /// Creates a new `RecordingRefresh`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Confirmations received so far
    #[must_use]
    pub fn confirmations(&self) -> Vec<(ClientId, ReservationRequest)> {
        self.confirmations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RefreshSignal for RecordingRefresh {
    fn reservation_confirmed(&self, client_id: ClientId, request: &ReservationRequest) {
        self.confirmations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((client_id, request.clone()));
    }
}

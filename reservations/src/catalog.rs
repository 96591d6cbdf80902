//! Paginated raffle catalog backing the raffle picker.
//!
//! The catalog is only live while the reservation dialog is open. Pages are
//! keyed by number: a response for any page other than the latest requested
//! one is dropped.

use crate::types::{RaffleId, RaffleOption};
use serde::Deserialize;

/// Catalog pages are 1-based
pub const FIRST_PAGE: u32 = 1;

/// Wire shape of `GET /raffles?page={n}&limit={m}`
#[derive(Debug, Deserialize)]
struct CatalogResponse {
    raffles: Vec<RaffleOption>,
    #[serde(default)]
    total: Option<u64>,
}

/// One page of raffles
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogPage {
    /// Page number (1-based)
    pub page: u32,
    /// Requested page size
    pub page_size: u32,
    /// Raffles on this page
    pub raffles: Vec<RaffleOption>,
    /// Total raffle count, when the backend reports it
    pub total: Option<u64>,
}

impl CatalogPage {
    /// A page with no raffles
    #[must_use]
    pub const fn empty(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            raffles: Vec::new(),
            total: None,
        }
    }

    /// Parse a response body
    ///
    /// A body that fails schema validation degrades to an empty page; the
    /// failure is logged, not returned. Raffles with an empty pool are dropped.
    #[must_use]
    pub fn parse(body: &str, page: u32, page_size: u32) -> Self {
        let response: CatalogResponse = match serde_json::from_str(body) {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(page, %error, "Catalog response failed validation, treating as empty");
                return Self::empty(page, page_size);
            },
        };

        let (raffles, invalid): (Vec<_>, Vec<_>) = response
            .raffles
            .into_iter()
            .partition(|r| r.total_numbers > 0);
        if !invalid.is_empty() {
            tracing::warn!(page, dropped = invalid.len(), "Dropped raffles without tickets");
        }

        Self {
            page,
            page_size,
            raffles,
            total: response.total,
        }
    }

    /// Number of pages
    ///
    /// Uses `total` when present. Otherwise a full page implies at least one
    /// more page, and a short page is the last.
    #[must_use]
    pub fn page_count(&self) -> u32 {
        if let Some(total) = self.total {
            let size = u64::from(self.page_size.max(1));
            let pages = total.div_ceil(size).max(1);
            return u32::try_from(pages).unwrap_or(u32::MAX);
        }

        let full = u32::try_from(self.raffles.len()).is_ok_and(|len| len >= self.page_size);
        if full && !self.raffles.is_empty() {
            self.page.saturating_add(1)
        } else {
            self.page.max(FIRST_PAGE)
        }
    }

    /// Whether a later page exists
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.page < self.page_count()
    }

    /// Whether an earlier page exists
    #[must_use]
    pub const fn has_previous_page(&self) -> bool {
        self.page > FIRST_PAGE
    }

    /// Look up a raffle on this page
    #[must_use]
    pub fn find(&self, id: RaffleId) -> Option<&RaffleOption> {
        self.raffles.iter().find(|r| r.id == id)
    }
}

/// Catalog state of one reservation dialog
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogBrowser {
    active: bool,
    page_size: u32,
    requested_page: u32,
    loading: bool,
    current: CatalogPage,
}

impl CatalogBrowser {
    /// Inactive browser with the given page size
    #[must_use]
    pub const fn new(page_size: u32) -> Self {
        Self {
            active: false,
            page_size,
            requested_page: FIRST_PAGE,
            loading: false,
            current: CatalogPage::empty(FIRST_PAGE, page_size),
        }
    }

    /// Start browsing from the first page; returns the page to fetch
    pub const fn activate(&mut self) -> u32 {
        self.active = true;
        self.requested_page = FIRST_PAGE;
        self.loading = true;
        FIRST_PAGE
    }

    /// Stop browsing; pending responses will be dropped
    pub fn deactivate(&mut self) {
        self.active = false;
        self.loading = false;
        self.current = CatalogPage::empty(FIRST_PAGE, self.page_size);
    }

    /// Request `page`; returns it if a fetch should be issued
    ///
    /// Nothing is fetched while inactive or for page 0.
    pub const fn request(&mut self, page: u32) -> Option<u32> {
        if !self.active || page < FIRST_PAGE {
            return None;
        }
        self.requested_page = page;
        self.loading = true;
        Some(page)
    }

    /// Apply a fetched page; returns `false` if it was stale and dropped
    pub fn accept(&mut self, page: CatalogPage) -> bool {
        if !self.is_current_request(page.page) {
            return false;
        }
        self.loading = false;
        self.current = page;
        true
    }

    /// Record a failed fetch of `page`; returns `false` if it was stale
    ///
    /// The visible page becomes empty.
    pub fn fail(&mut self, page: u32) -> bool {
        if !self.is_current_request(page) {
            return false;
        }
        self.loading = false;
        self.current = CatalogPage::empty(page, self.page_size);
        true
    }

    const fn is_current_request(&self, page: u32) -> bool {
        self.active && page == self.requested_page
    }

    /// Whether the dialog is browsing
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether a page fetch is outstanding
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Page size used for fetches
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Latest requested page
    #[must_use]
    pub const fn requested_page(&self) -> u32 {
        self.requested_page
    }

    /// The page currently shown
    #[must_use]
    pub const fn current(&self) -> &CatalogPage {
        &self.current
    }

    /// Raffles currently shown
    #[must_use]
    pub fn raffles(&self) -> &[RaffleOption] {
        &self.current.raffles
    }

    /// Look up a raffle on the shown page
    #[must_use]
    pub fn find(&self, id: RaffleId) -> Option<&RaffleOption> {
        self.current.find(id)
    }
}

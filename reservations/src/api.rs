//! Raffle backend client.
//!
//! [`RaffleApi`] is the seam the reservation workflow talks through;
//! [`HttpRaffleApi`] implements it with `reqwest` against the REST backend.
//! Credentials travel in an explicit [`Session`], never in globals.

use crate::catalog::CatalogPage;
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::types::{ClientId, NumberStatusCounts, RaffleId, ReservationRequest};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future returned by [`RaffleApi`] methods
pub type ApiFuture<T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send>>;

/// Backend operations used by the reservation workflow
pub trait RaffleApi: Send + Sync {
    /// `GET /raffles?page={page}&limit={limit}`
    ///
    /// # Errors
    ///
    /// Transport failures and non-2xx responses. A body that fails schema
    /// validation is an empty page, not an error.
    fn fetch_raffles(&self, page: u32, limit: u32) -> ApiFuture<CatalogPage>;

    /// `POST /clients/{client_id}/buy-numbers`
    ///
    /// Returns the backend's confirmation text.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] carries the backend's `error` message verbatim.
    fn buy_numbers(&self, client_id: ClientId, request: ReservationRequest) -> ApiFuture<String>;

    /// `GET /raffles/{raffle_id}/numbers/status-counts`
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx responses and undecodable bodies.
    fn fetch_status_counts(&self, raffle_id: RaffleId) -> ApiFuture<NumberStatusCounts>;
}

/// Who is calling and where
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    base_url: String,
    token: Option<String>,
}

impl Session {
    /// Session against `base_url`, optionally authenticated
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Backend base URL without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

/// Error body of a rejected request
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// `reqwest`-backed [`RaffleApi`]
#[derive(Clone, Debug)]
pub struct HttpRaffleApi {
    client: Client,
    session: Session,
}

impl HttpRaffleApi {
    /// Create a client for `session` with a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the TLS backend fails to initialise.
    pub fn new(session: Session, timeout: Duration) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;

        Ok(Self { client, session })
    }

    /// Create a client from loaded configuration
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`].
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        Self::new(config.session(), config.request_timeout)
    }

    /// The session this client sends
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }
}

fn record(endpoint: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!("reservations.api.requests", "endpoint" => endpoint, "outcome" => outcome)
        .increment(1);
}

async fn send(request: RequestBuilder) -> ApiResult<Response> {
    request
        .send()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))
}

/// Turn a non-2xx response into [`ApiError::Rejected`]
async fn rejection(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body).map_or_else(
        |_| format!("Request failed with status {}", status.as_u16()),
        |b| b.error,
    );

    ApiError::Rejected {
        status: status.as_u16(),
        message,
    }
}

async fn read_text(response: Response) -> ApiResult<String> {
    response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))
}

/// Send and fail on any non-2xx status
async fn send_checked(request: RequestBuilder) -> ApiResult<Response> {
    let response = send(request).await?;
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(rejection(response).await)
    }
}

async fn fetch_catalog(request: RequestBuilder, page: u32, limit: u32) -> ApiResult<CatalogPage> {
    let response = send_checked(request).await?;
    let body = read_text(response).await?;
    Ok(CatalogPage::parse(&body, page, limit))
}

async fn post_reservation(request: RequestBuilder) -> ApiResult<String> {
    let response = send_checked(request).await?;
    let body = read_text(response).await?;
    // The payload is either a JSON string or plain text
    Ok(serde_json::from_str::<String>(&body).unwrap_or(body))
}

async fn fetch_counts(request: RequestBuilder) -> ApiResult<NumberStatusCounts> {
    send_checked(request)
        .await?
        .json::<NumberStatusCounts>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

impl RaffleApi for HttpRaffleApi {
    fn fetch_raffles(&self, page: u32, limit: u32) -> ApiFuture<CatalogPage> {
        let request = self.session.authorize(
            self.client
                .get(self.session.url("/raffles"))
                .query(&[("page", page), ("limit", limit)]),
        );

        Box::pin(async move {
            let result = fetch_catalog(request, page, limit).await;
            record("fetch_raffles", result.is_ok());
            result
        })
    }

    fn buy_numbers(&self, client_id: ClientId, request: ReservationRequest) -> ApiFuture<String> {
        let http = self.session.authorize(
            self.client
                .post(self.session.url(&format!("/clients/{client_id}/buy-numbers")))
                .json(&request),
        );

        Box::pin(async move {
            let result = post_reservation(http).await;
            if let Err(error) = &result {
                tracing::debug!(%client_id, %error, "buy-numbers rejected");
            }
            record("buy_numbers", result.is_ok());
            result
        })
    }

    fn fetch_status_counts(&self, raffle_id: RaffleId) -> ApiFuture<NumberStatusCounts> {
        let request = self.session.authorize(
            self.client
                .get(self.session.url(&format!("/raffles/{raffle_id}/numbers/status-counts"))),
        );

        Box::pin(async move {
            let result = fetch_counts(request).await;
            record("fetch_status_counts", result.is_ok());
            result
        })
    }
}

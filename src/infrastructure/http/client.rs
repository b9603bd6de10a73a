//! # HTTP Client
//!
//! Shared JSON-over-HTTP client used by the fee oracle and the swap
//! aggregator.
//!
//! # Examples
//!
//! ```ignore
//! use swap_executor::infrastructure::http::HttpClient;
//!
//! let client = HttpClient::new(5000)?;
//! let fees: SuggestedGasFees = client.get("https://gas.example/suggestedGasFees").await?;
//! ```

use crate::infrastructure::http::error::{HttpError, HttpResult};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP client wrapper.
///
/// Wraps a pooled `reqwest` client with a fixed per-request timeout and
/// uniform status/decoding error mapping. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client.
    client: Client,
    /// Request timeout in milliseconds.
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a new HTTP client with the specified timeout.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Internal` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> HttpResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| HttpError::internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, timeout_ms })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Makes a GET request and deserializes the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Timeout`/`Connection` if the request fails,
    /// `HttpError::Status` for non-2xx responses and `HttpError::Decode`
    /// if the body is not the expected JSON.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> HttpResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        self.handle_response(response).await
    }

    /// Makes a GET request with query parameters and deserializes the JSON
    /// response.
    ///
    /// # Errors
    ///
    /// Same as [`HttpClient::get`].
    pub async fn get_with_params<T: DeserializeOwned, P: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        params: &P,
    ) -> HttpResult<T> {
        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        self.handle_response(response).await
    }

    /// Handles the HTTP response, checking status and deserializing JSON.
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> HttpResult<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| HttpError::decode(format!("failed to parse response: {}", e)))
        } else {
            let error_body = response.text().await.unwrap_or_default();
            Err(HttpError::status(status.as_u16(), error_body))
        }
    }

    /// Maps a reqwest error to an HttpError.
    fn map_reqwest_error(&self, error: reqwest::Error) -> HttpError {
        if error.is_timeout() {
            HttpError::timeout(format!("request timed out after {}ms", self.timeout_ms))
        } else if error.is_connect() {
            HttpError::connection(format!("connection failed: {}", error))
        } else {
            HttpError::connection(format!("HTTP request failed: {}", error))
        }
    }
}

/// Joins a base URL and a path without doubling slashes.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

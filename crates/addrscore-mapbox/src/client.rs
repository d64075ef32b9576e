//! HTTP client for the Mapbox Search Geocoding v6 forward endpoint.
//!
//! Sends the raw address as free text, maps HTTP failures onto typed
//! errors, and converts features into ranked [`GeocodeCandidate`]s.

use std::time::Duration;

use addrscore_core::{AppConfig, GeocodeCandidate, Geocoder, GeocoderError};
use reqwest::{Client, StatusCode, Url};

use crate::error::MapboxError;
use crate::types::ForwardResponse;

const DEFAULT_BASE_URL: &str = "https://api.mapbox.com/";
const FORWARD_PATH: &str = "search/geocode/v6/forward";
const DEFAULT_LIMIT: u8 = 5;

/// Client for Mapbox forward geocoding.
///
/// Use [`MapboxClient::new`] for production or [`MapboxClient::with_base_url`]
/// to point at a mock server in tests. The inner `reqwest::Client` pools
/// connections, so one instance should be shared.
pub struct MapboxClient {
    client: Client,
    access_token: String,
    base_url: Url,
    timeout_ms: u64,
    limit: u8,
    language: Option<String>,
}

impl MapboxClient {
    /// Creates a client pointed at the production Mapbox API.
    ///
    /// # Errors
    ///
    /// Returns [`MapboxError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(access_token: &str, timeout_ms: u64, user_agent: &str) -> Result<Self, MapboxError> {
        Self::with_base_url(access_token, timeout_ms, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MapboxError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`MapboxError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        access_token: &str,
        timeout_ms: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, MapboxError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .connect_timeout(Duration::from_millis(timeout_ms.min(10_000)))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `join` appends rather than replaces
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| MapboxError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            access_token: access_token.to_owned(),
            base_url,
            timeout_ms,
            limit: DEFAULT_LIMIT,
            language: None,
        })
    }

    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// Same as [`MapboxClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, MapboxError> {
        Ok(Self::with_base_url(
            &config.mapbox_access_token,
            config.geocoder_timeout_ms,
            &config.user_agent,
            &config.geocoder_base_url,
        )?
        .with_limit(config.geocoder_limit)
        .with_language(config.geocoder_language.clone()))
    }

    /// Maximum number of candidates requested, clamped to the API's 1..=10.
    #[must_use]
    pub fn with_limit(mut self, limit: u8) -> Self {
        self.limit = limit.clamp(1, 10);
        self
    }

    /// IETF language tag for result text (`nl`, `de`), or `None` for the
    /// provider default.
    #[must_use]
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    /// Geocodes free-text `query` and returns candidates in provider order.
    ///
    /// # Errors
    ///
    /// - [`MapboxError::Unauthorized`] on HTTP 401/403.
    /// - [`MapboxError::RateLimited`] on HTTP 429.
    /// - [`MapboxError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`MapboxError::Timeout`] when the request timeout elapses.
    /// - [`MapboxError::Http`] on other network failures.
    /// - [`MapboxError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn forward_geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>, MapboxError> {
        let url = self.build_url(query)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            tracing::warn!(?retry_after_secs, "mapbox rate limit hit");
            return Err(MapboxError::RateLimited { retry_after_secs });
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(MapboxError::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            return Err(MapboxError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let parsed: ForwardResponse =
            serde_json::from_str(&body).map_err(|e| MapboxError::Deserialize {
                context: "forward geocode response".to_owned(),
                source: e,
            })?;

        let candidates: Vec<GeocodeCandidate> = parsed
            .features
            .into_iter()
            .enumerate()
            .map(|(rank, feature)| feature.into_candidate(rank))
            .collect();

        tracing::debug!(candidates = candidates.len(), "mapbox forward geocode");
        Ok(candidates)
    }

    /// Builds the request URL with percent-encoded query parameters.
    fn build_url(&self, query: &str) -> Result<Url, MapboxError> {
        let mut url = self
            .base_url
            .join(FORWARD_PATH)
            .map_err(|e| MapboxError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            pairs.append_pair("access_token", &self.access_token);
            pairs.append_pair("limit", &self.limit.to_string());
            pairs.append_pair("autocomplete", "false");
            if let Some(language) = &self.language {
                pairs.append_pair("language", language);
            }
        }
        Ok(url)
    }

    fn transport_error(&self, err: reqwest::Error) -> MapboxError {
        if err.is_timeout() {
            MapboxError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            MapboxError::Http(err)
        }
    }
}

impl Geocoder for MapboxClient {
    async fn forward(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocoderError> {
        self.forward_geocode(query).await.map_err(GeocoderError::from)
    }
}

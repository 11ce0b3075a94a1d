//! Remote catalog client
//!
//! Talks to the shelter dog catalog service (HTTP+JSON, session-cookie
//! authenticated). All consumers go through the [`CatalogApi`] trait so
//! stores and the search coordinator can be exercised against a scripted
//! backend in tests.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Instant;

use crate::error::ApiError;
use crate::search::query::SearchQuery;

use super::types::{
    Dog, LocationSearchRequest, LocationSearchResponse, LoginRequest, MatchResponse,
    SearchResponse,
};

/// Backend cap on a single locations query
pub const LOCATION_RESULT_CAP: u32 = 10_000;

/// Remote catalog interface
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /dogs/search` - ordered identifiers plus total count
    async fn search_dogs(&self, query: &SearchQuery) -> Result<SearchResponse, ApiError>;

    /// `POST /dogs` - hydrate identifiers into full records.
    ///
    /// The response order is NOT guaranteed to match the requested order;
    /// callers must re-order themselves.
    async fn fetch_dogs(&self, ids: &[String]) -> Result<Vec<Dog>, ApiError>;

    /// `POST /dogs/match` - pick a match from the given identifiers
    async fn match_dogs(&self, ids: &[String]) -> Result<MatchResponse, ApiError>;

    /// `GET /dogs/breeds` - all known breeds. Also doubles as the session
    /// probe: a 401 here means the session is gone.
    async fn list_breeds(&self) -> Result<Vec<String>, ApiError>;

    /// `POST /locations/search` - postal codes inside a bounding box
    async fn search_locations(
        &self,
        request: &LocationSearchRequest,
    ) -> Result<LocationSearchResponse, ApiError>;

    /// `POST /auth/login` - establish the session cookie
    async fn login(&self, name: &str, email: &str) -> Result<(), ApiError>;

    /// `POST /auth/logout` - drop the session
    async fn logout(&self) -> Result<(), ApiError>;
}

/// Catalog client configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://frontend-take-home-service.fetch.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// HTTP implementation of [`CatalogApi`]
pub struct HttpCatalogClient {
    config: ApiConfig,
    client: Client,
}

impl HttpCatalogClient {
    pub fn new(config: ApiConfig) -> Self {
        // Cookie store carries the session cookie across calls
        let client = Client::builder()
            .cookie_store(true)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    pub fn with_default_config() -> Self {
        Self::new(ApiConfig::default())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Map a non-2xx response to a typed error before any body decode.
    /// Non-2xx bodies cannot be assumed to hold the expected JSON shape.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthRequired);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::RequestFailed { status, message });
        }
        Ok(response)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn search_dogs(&self, query: &SearchQuery) -> Result<SearchResponse, ApiError> {
        let started = Instant::now();

        let response = self
            .client
            .get(self.url("/dogs/search"))
            .query(query.pairs())
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        let parsed: SearchResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(ApiError::from_decode)?;

        perf_debug!(
            "GET /dogs/search ({} ids, total {}) took {:?}",
            parsed.result_ids.len(),
            parsed.total,
            started.elapsed()
        );

        Ok(parsed)
    }

    async fn fetch_dogs(&self, ids: &[String]) -> Result<Vec<Dog>, ApiError> {
        let started = Instant::now();

        let response = self
            .client
            .post(self.url("/dogs"))
            .json(&ids)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        let dogs: Vec<Dog> = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(ApiError::from_decode)?;

        perf_debug!("POST /dogs ({} records) took {:?}", dogs.len(), started.elapsed());

        Ok(dogs)
    }

    async fn match_dogs(&self, ids: &[String]) -> Result<MatchResponse, ApiError> {
        let response = self
            .client
            .post(self.url("/dogs/match"))
            .json(&ids)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(ApiError::from_decode)
    }

    async fn list_breeds(&self) -> Result<Vec<String>, ApiError> {
        let response = self
            .client
            .get(self.url("/dogs/breeds"))
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(ApiError::from_decode)
    }

    async fn search_locations(
        &self,
        request: &LocationSearchRequest,
    ) -> Result<LocationSearchResponse, ApiError> {
        // Respect the stated backend limit regardless of what the caller asked for
        let capped = LocationSearchRequest {
            size: request.size.min(LOCATION_RESULT_CAP),
            geo_bounding_box: request.geo_bounding_box,
        };

        let started = Instant::now();

        let response = self
            .client
            .post(self.url("/locations/search"))
            .json(&capped)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        let parsed: LocationSearchResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(ApiError::from_decode)?;

        perf_debug!(
            "POST /locations/search ({} of {} locations) took {:?}",
            parsed.results.len(),
            parsed.total,
            started.elapsed()
        );

        Ok(parsed)
    }

    async fn login(&self, name: &str, email: &str) -> Result<(), ApiError> {
        let body = LoginRequest {
            name: name.to_string(),
            email: email.to_string(),
        };

        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&body)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        // Login answers a plain-text body; the cookie jar is the real result
        Self::check_status(response).await?;
        log::info!("Logged in as {}", name);
        Ok(())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/auth/logout"))
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        Self::check_status(response).await?;
        log::info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.base_url.starts_with("https://"));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_url_joins_path() {
        let client = HttpCatalogClient::new(ApiConfig {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 5,
        });
        assert_eq!(client.url("/dogs/search"), "http://localhost:8080/dogs/search");
    }
}

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{DonationMapError, Result};
use crate::types::{Candidate, Geocoder};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Geocoding adapter for the Google Maps geocode endpoint.
pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleGeocoder {
    pub fn new(api_key: impl Into<String>, timeout_seconds: u64) -> Result<Self> {
        Self::with_base_url(api_key, timeout_seconds, DEFAULT_BASE_URL)
    }

    /// Custom base URL for pointing at a mock server in tests.
    pub fn with_base_url(
        api_key: impl Into<String>,
        timeout_seconds: u64,
        base_url: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: ResultGeometry,
}

#[derive(Debug, Deserialize)]
struct ResultGeometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

#[async_trait::async_trait]
impl Geocoder for GoogleGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Vec<Candidate>> {
        let url = format!("{}/maps/api/geocode/json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let body: GeocodeResponse = response.json().await?;

        // ZERO_RESULTS is a successful lookup with no match; every other
        // non-OK status is a provider-side failure.
        match body.status.as_str() {
            "OK" | "ZERO_RESULTS" => {
                debug!("Geocoder returned {} candidates", body.results.len());
                Ok(body
                    .results
                    .iter()
                    .map(|r| Candidate {
                        lat: r.geometry.location.lat,
                        lng: r.geometry.location.lng,
                    })
                    .collect())
            }
            status => Err(DonationMapError::Api {
                message: format!(
                    "geocoding failed with status {status}: {}",
                    body.error_message.unwrap_or_default()
                ),
            }),
        }
    }
}

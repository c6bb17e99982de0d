use clap::ValueEnum;
use serde::Deserialize;

use crate::error::Result;

/// One spreadsheet row: an ordered sequence of string cells.
pub type RawRow = Vec<String>;

/// A geocoding candidate returned by the provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub lat: f64,
    pub lng: f64,
}

/// Policy for turning one donor record into map points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanoutMode {
    /// One point per donated unit, so quantity shows up as point density.
    #[default]
    OnePerQuantity,
    /// One point per donor row regardless of quantity.
    OnePerSpreadsheetRow,
}

/// Authenticated source of spreadsheet rows. Credential lifecycle (token
/// refresh, caching) stays behind the implementation.
#[async_trait::async_trait]
pub trait RowSource: Send + Sync {
    /// Unique identifier for this source, used in logs.
    fn source_name(&self) -> &'static str;

    /// Fetch all rows for the configured range, in sheet order.
    async fn fetch_rows(&self) -> Result<Vec<RawRow>>;
}

/// External service resolving a free-text address to coordinates.
/// An empty candidate list signals "no match"; transport problems are errors.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Vec<Candidate>>;
}

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{DonationMapError, Result};
use crate::types::{Geocoder, RawRow};

/// Trailing ZIP code and its leading separators on the last address line.
static TRAILING_ZIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \d-]+$").unwrap());

/// Full row shape: name, email, address, date, quantity, donation type.
pub const NUM_CELLS_EXPECTED: usize = 6;
/// Rows that omit the donation-type column; only accepted when the second
/// cell looks like an email, which rules out a column shift.
pub const NUM_CELLS_OK_WITH_EMAIL: usize = 5;

/// Upper bound on per-row quantity. Quantity drives point fan-out, so one
/// mistyped cell must not produce an unbounded feature list.
pub const MAX_QUANTITY: u32 = 10_000;

/// Shape check for a raw row before any parsing is attempted.
pub struct RecordValidator;

impl RecordValidator {
    pub fn validate(row: &[String]) -> Result<()> {
        let is_cell_count_good = row.len() == NUM_CELLS_EXPECTED;
        let is_row_missing_donation_type =
            row.len() == NUM_CELLS_OK_WITH_EMAIL && row[1].contains('@');

        if is_cell_count_good || is_row_missing_donation_type {
            Ok(())
        } else {
            Err(DonationMapError::ParseInput(format!(
                "need {} cells, got {}",
                NUM_CELLS_EXPECTED,
                row.len()
            )))
        }
    }
}

/// One donor row, fully parsed and geocoded. Either every field including
/// the coordinates is populated, or construction failed.
#[derive(Debug, Clone)]
pub struct DonationRecord {
    pub name: String,
    pub first_name: String,
    pub email: String,
    pub address: String,
    pub donation_date: String,
    pub quantity: u32,
    pub donation_type: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl DonationRecord {
    /// Build a record from a validated row, geocoding its normalized address.
    pub async fn from_row(row: &RawRow, geocoder: &dyn Geocoder) -> Result<Self> {
        RecordValidator::validate(row)?;

        let name = row[0].clone();
        let email = row[1].clone();
        let donation_date = row[3].clone();
        let quantity = parse_quantity(&row[4])?;
        let donation_type = row.get(5).cloned();

        let first_name = name
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string();
        let address = city_state_address(&row[2]);

        debug!("Geocoding '{}' for {}", address, name);
        let candidates = geocoder.geocode(&address).await?;
        let location = candidates.first().ok_or_else(|| DonationMapError::Location {
            message: format!("no result for '{}' ({})", address, name),
        })?;

        Ok(Self {
            name,
            first_name,
            email,
            address,
            donation_date,
            quantity,
            donation_type,
            latitude: location.lat,
            longitude: location.lng,
        })
    }
}

impl fmt::Display for DonationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -- {} -- {}, {}",
            self.name, self.address, self.latitude, self.longitude
        )
    }
}

/// Throw away any info but city/state: keep only the last line of the raw
/// address and strip the trailing ZIP code. Street-level detail never
/// reaches the geocoder or the published map.
pub fn city_state_address(raw_address: &str) -> String {
    let last_line = raw_address.lines().last().unwrap_or_default();
    TRAILING_ZIP.replace(last_line, "").into_owned()
}

fn parse_quantity(cell: &str) -> Result<u32> {
    let quantity: u32 = cell.trim().parse().map_err(|_| {
        DonationMapError::ParseInput(format!(
            "quantity '{cell}' is not a non-negative integer"
        ))
    })?;

    if quantity > MAX_QUANTITY {
        return Err(DonationMapError::ParseInput(format!(
            "quantity {quantity} is over the per-row limit of {MAX_QUANTITY}"
        )));
    }

    Ok(quantity)
}

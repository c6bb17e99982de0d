use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DonationMapError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),

    #[error("Bad input row: {0}")]
    ParseInput(String),

    #[error("Geocoding found no match: {message}")]
    Location { message: String },

    #[error("API error: {message}")]
    Api { message: String },
}

pub type Result<T> = std::result::Result<T, DonationMapError>;

/// Stable keys for the per-row failure bucket. Anything that is not a
/// data problem on our side (bad row, no geocoding match) lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ParseInput,
    Location,
    Other,
}

impl ErrorKind {
    pub fn classify(err: &DonationMapError) -> Self {
        match err {
            DonationMapError::ParseInput(_) => ErrorKind::ParseInput,
            DonationMapError::Location { .. } => ErrorKind::Location,
            _ => ErrorKind::Other,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::ParseInput => "parse_input",
            ErrorKind::Location => "location",
            ErrorKind::Other => "other",
        };
        write!(f, "{label}")
    }
}

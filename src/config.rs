use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{DonationMapError, Result};
use crate::types::FanoutMode;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub spreadsheet: SpreadsheetConfig,
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct SpreadsheetConfig {
    pub id: String,
    pub range: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingConfig {
    /// Falls back to the GEOCODING_API_KEY environment variable.
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    pub mode: Option<FanoutMode>,
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            DonationMapError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_parses_a_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[spreadsheet]
id = "sheet-123"
range = "Donations!A2:F2000"

[geocoding]
api_key = "test-key"
timeout_seconds = 5

[output]
mode = "one_per_spreadsheet_row"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.spreadsheet.id, "sheet-123");
        assert_eq!(config.spreadsheet.range, "Donations!A2:F2000");
        assert_eq!(config.spreadsheet.timeout_seconds, 10);
        assert_eq!(config.geocoding.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.geocoding.timeout_seconds, 5);
        assert_eq!(config.output.mode, Some(FanoutMode::OnePerSpreadsheetRow));
    }

    #[test]
    fn load_defaults_the_optional_sections() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[spreadsheet]
id = "sheet-123"
range = "Donations!A2:F2000"

[geocoding]
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.geocoding.api_key, None);
        assert_eq!(config.geocoding.timeout_seconds, 10);
        assert_eq!(config.output.mode, None);
    }

    #[test]
    fn load_reports_a_missing_file() {
        let err = Config::load(Path::new("does-not-exist.toml")).unwrap_err();
        assert!(err.to_string().contains("does-not-exist.toml"));
    }
}

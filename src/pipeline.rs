use std::collections::HashMap;

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use tracing::{debug, info, instrument, warn};

use crate::error::ErrorKind;
use crate::feature::FeatureCollection;
use crate::record::DonationRecord;
use crate::types::{FanoutMode, Geocoder, RawRow};

/// Options for a single pipeline run. The fan-out mode travels with the
/// run instead of living in a process-wide switch.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub mode: FanoutMode,
    /// Print per-row outcomes while processing.
    pub debug: bool,
}

/// Result of a complete pipeline run: every geocoded record plus the raw
/// rows that failed, bucketed by error kind for manual triage.
pub struct RunReport {
    pub mode: FanoutMode,
    pub records: Vec<DonationRecord>,
    pub failures: HashMap<ErrorKind, Vec<RawRow>>,
    pub total_rows: usize,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn failed_rows(&self) -> usize {
        self.failures.values().map(Vec::len).sum()
    }

    /// Assemble the output collection under this run's fan-out mode.
    /// Failed rows are simply absent: a handful of bad rows must not block
    /// publishing the rest.
    pub fn feature_collection(&self) -> FeatureCollection {
        let mut features = Vec::new();
        for record in &self.records {
            match self.mode {
                FanoutMode::OnePerQuantity => features.extend(record.features()),
                FanoutMode::OnePerSpreadsheetRow => features.push(record.feature()),
            }
        }
        FeatureCollection::new(features)
    }
}

pub struct Pipeline;

impl Pipeline {
    /// Process rows sequentially in sheet order. A row failure records the
    /// raw row under its error kind and the batch keeps going.
    #[instrument(skip(rows, geocoder, options))]
    pub async fn run(
        rows: Vec<RawRow>,
        geocoder: &dyn Geocoder,
        options: RunOptions,
    ) -> RunReport {
        info!("Processing {} rows", rows.len());
        counter!("donation_map_runs_total").increment(1);
        let t_run = std::time::Instant::now();

        let mut records = Vec::new();
        let mut failures: HashMap<ErrorKind, Vec<RawRow>> = HashMap::new();

        for (i, row) in rows.iter().enumerate() {
            let t_row = std::time::Instant::now();
            match DonationRecord::from_row(row, geocoder).await {
                Ok(record) => {
                    debug!(row = i, "Geocoded {}", record);
                    if options.debug {
                        println!("{i} {record}");
                    }
                    records.push(record);
                }
                Err(e) => {
                    let kind = ErrorKind::classify(&e);
                    warn!(row = i, kind = %kind, "Failed to process row: {}", e);
                    failures.entry(kind).or_default().push(row.clone());
                }
            }
            histogram!("donation_map_row_duration_seconds")
                .record(t_row.elapsed().as_secs_f64());
        }

        let failed: usize = failures.values().map(Vec::len).sum();
        info!(
            "Processed {} rows ({} geocoded, {} failed)",
            rows.len(),
            records.len(),
            failed
        );
        counter!("donation_map_rows_geocoded_total").increment(records.len() as u64);
        counter!("donation_map_rows_failed_total").increment(failed as u64);
        histogram!("donation_map_run_duration_seconds").record(t_run.elapsed().as_secs_f64());

        RunReport {
            mode: options.mode,
            total_rows: rows.len(),
            records,
            failures,
            finished_at: Utc::now(),
        }
    }
}

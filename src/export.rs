use std::{io::Write, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    core::{period::InvoicingPeriod, record::HourlyRecord},
    prelude::*,
};

/// CSV row, with the raw values exactly as the portal has reported them.
#[derive(Serialize)]
struct Row {
    #[serde(rename = "TimeStamp")]
    timestamp: DateTime<Utc>,

    #[serde(rename = "LocalTime")]
    local_time: String,

    #[serde(rename = "Consumption")]
    consumption: f64,

    #[serde(rename = "FixedConsumption")]
    fixed_consumption: Option<f64>,

    #[serde(rename = "OpenConsumption")]
    open_consumption: Option<f64>,

    #[serde(rename = "SpotPrice")]
    spot_price: f64,

    #[serde(rename = "FixedPrice")]
    fixed_price: Option<f64>,

    #[serde(rename = "ProfilePrice")]
    profile_price: f64,

    #[serde(rename = "DeliveryPrice")]
    delivery_price: f64,
}

impl From<&HourlyRecord> for Row {
    fn from(record: &HourlyRecord) -> Self {
        Self {
            timestamp: record.timestamp,
            local_time: record.local_timestamp().format("%Y-%m-%d %H:%M").to_string(),
            consumption: record.consumption,
            fixed_consumption: record.fixed_consumption,
            open_consumption: record.open_consumption,
            spot_price: record.spot_price,
            fixed_price: record.fixed_price,
            profile_price: record.profile_price,
            delivery_price: record.delivery_price,
        }
    }
}

/// `HourlyData_{first local date}-{last local date}.csv`, [`None`] for no records.
pub fn default_file_name(records: &[HourlyRecord]) -> Option<PathBuf> {
    let first = records.first()?.local_timestamp();
    let last = records.last()?.local_timestamp();
    Some(format!("HourlyData_{}-{}.csv", first.format("%Y-%m-%d"), last.format("%Y-%m-%d")).into())
}

pub fn write_csv<W: Write>(records: &[HourlyRecord], writer: W) -> Result {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(Row::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Export the period's hourly records into the file.
///
/// Returns the written path, or [`None`] when there is nothing to export.
#[instrument(skip_all, fields(period_id = %period.id))]
pub fn export(period: &InvoicingPeriod, path: Option<PathBuf>) -> Result<Option<PathBuf>> {
    let Some(records) = period.hourly_records().filter(|records| !records.is_empty()) else {
        warn!("no hourly data to export");
        return Ok(None);
    };
    let path = match path {
        Some(path) => path,
        None => default_file_name(records).context("no records to name the file after")?,
    };
    let file = std::fs::File::create(&path)
        .with_context(|| format!("failed to create `{}`", path.display()))?;
    write_csv(records, file)?;
    info!(path = %path.display(), n_records = records.len(), "exported");
    Ok(Some(path))
}

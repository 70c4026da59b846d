use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use itertools::Itertools;
use serde::Deserialize;

use crate::core::TIME_ZONE;

/// One hour of the invoicing period as reported by the portal.
///
/// Prices are in the portal's scale, which is ten times the cent price (euros per megawatt-hour).
/// Consumption is in megawatt-hours.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, bon::Builder)]
pub struct HourlyRecord {
    pub timestamp: DateTime<Utc>,
    pub consumption: f64,
    pub fixed_consumption: Option<f64>,
    pub open_consumption: Option<f64>,
    pub spot_price: f64,
    pub fixed_price: Option<f64>,
    pub profile_price: f64,
    pub delivery_price: f64,
}

impl HourlyRecord {
    pub fn local_timestamp(&self) -> DateTime<Tz> {
        self.timestamp.with_timezone(&TIME_ZONE)
    }

    fn validate(&self) -> Result<(), IngestError> {
        let prices = [
            ("SpotPrice", Some(self.spot_price)),
            ("FixedPrice", self.fixed_price),
            ("ProfilePrice", Some(self.profile_price)),
            ("DeliveryPrice", Some(self.delivery_price)),
        ];
        for (field, value) in prices {
            if let Some(value) = value
                && !value.is_finite()
            {
                return Err(IngestError::InvalidValue { timestamp: self.timestamp, field, value });
            }
        }

        // Consumption is never negative, the portal has no production data:
        let consumptions = [
            ("Consumption", Some(self.consumption)),
            ("FixedConsumption", self.fixed_consumption),
            ("OpenConsumption", self.open_consumption),
        ];
        for (field, value) in consumptions {
            if let Some(value) = value
                && !(value.is_finite() && value >= 0.0)
            {
                return Err(IngestError::InvalidValue { timestamp: self.timestamp, field, value });
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("malformed hourly data")]
    Json(#[from] serde_json::Error),

    #[error("`{field}` is missing at {timestamp}")]
    MissingField { timestamp: DateTime<Utc>, field: &'static str },

    #[error("`{field}` has invalid value {value} at {timestamp}")]
    InvalidValue { timestamp: DateTime<Utc>, field: &'static str, value: f64 },

    #[error("hourly records are not strictly ascending: {previous} is followed by {next}")]
    Unordered { previous: DateTime<Utc>, next: DateTime<Utc> },
}

/// Hourly record exactly as it comes from the portal, any field may be `null`.
#[derive(Deserialize)]
struct RawHourlyRecord {
    #[serde(rename = "TimeStamp")]
    timestamp: DateTime<Utc>,

    #[serde(rename = "Consumption")]
    consumption: Option<f64>,

    #[serde(rename = "FixedConsumption", default)]
    fixed_consumption: Option<f64>,

    #[serde(rename = "OpenConsumption", default)]
    open_consumption: Option<f64>,

    #[serde(rename = "SpotPrice")]
    spot_price: Option<f64>,

    #[serde(rename = "FixedPrice", default)]
    fixed_price: Option<f64>,

    #[serde(rename = "ProfilePrice")]
    profile_price: Option<f64>,

    #[serde(rename = "DeliveryPrice")]
    delivery_price: Option<f64>,
}

impl TryFrom<RawHourlyRecord> for HourlyRecord {
    type Error = IngestError;

    fn try_from(raw: RawHourlyRecord) -> Result<Self, Self::Error> {
        let timestamp = raw.timestamp;
        let required = |value: Option<f64>, field| {
            value.ok_or(IngestError::MissingField { timestamp, field })
        };
        Ok(Self {
            timestamp,
            consumption: required(raw.consumption, "Consumption")?,
            fixed_consumption: raw.fixed_consumption,
            open_consumption: raw.open_consumption,
            spot_price: required(raw.spot_price, "SpotPrice")?,
            fixed_price: raw.fixed_price,
            profile_price: required(raw.profile_price, "ProfilePrice")?,
            delivery_price: required(raw.delivery_price, "DeliveryPrice")?,
        })
    }
}

/// Validated hourly records of one invoicing period, strictly ascending by timestamp.
#[must_use]
#[derive(Clone, Debug, Default, derive_more::Deref)]
pub struct HourlyTable(Vec<HourlyRecord>);

impl HourlyTable {
    /// Validate the records, rejecting the entire batch on the first problem.
    pub fn try_new(records: Vec<HourlyRecord>) -> Result<Self, IngestError> {
        for record in &records {
            record.validate()?;
        }
        if let Some((previous, next)) =
            records.iter().tuple_windows().find(|(previous, next)| previous.timestamp >= next.timestamp)
        {
            return Err(IngestError::Unordered {
                previous: previous.timestamp,
                next: next.timestamp,
            });
        }
        Ok(Self(records))
    }

    /// Parse the portal's hourly data response.
    pub fn from_json(json: &str) -> Result<Self, IngestError> {
        let records = serde_json::from_str::<Vec<RawHourlyRecord>>(json)?
            .into_iter()
            .map(HourlyRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::try_new(records)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};

    use super::*;
    use crate::prelude::*;

    // language=json
    const RESPONSE: &str = r#"[
        {
            "TimeStamp": "2024-01-31T22:00:00Z",
            "Consumption": 0.0012,
            "FixedConsumption": null,
            "OpenConsumption": 0.0012,
            "SpotPrice": 95.5,
            "FixedPrice": null,
            "ProfilePrice": 3.1,
            "DeliveryPrice": 41.2
        },
        {
            "TimeStamp": "2024-01-31T23:00:00Z",
            "Consumption": 0.0009,
            "FixedConsumption": null,
            "OpenConsumption": 0.0009,
            "SpotPrice": -1.5,
            "FixedPrice": null,
            "ProfilePrice": 3.1,
            "DeliveryPrice": 41.2
        }
    ]"#;

    #[test]
    fn test_from_json_ok() -> Result {
        let table = HourlyTable::from_json(RESPONSE)?;
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].timestamp, Utc.with_ymd_and_hms(2024, 1, 31, 22, 0, 0).unwrap());
        assert_eq!(table[0].consumption, 0.0012);
        assert_eq!(table[0].fixed_consumption, None);
        assert_eq!(table[1].spot_price, -1.5);
        Ok(())
    }

    #[test]
    fn test_local_timestamp() -> Result {
        let table = HourlyTable::from_json(RESPONSE)?;
        let local = table[0].local_timestamp();
        assert_eq!(local.date_naive().to_string(), "2024-02-01");
        assert_eq!(local.hour(), 0);
        Ok(())
    }

    #[test]
    fn test_missing_field_err() {
        // language=json
        let response = r#"[{"TimeStamp": "2024-01-31T22:00:00Z", "Consumption": 0.1, "SpotPrice": null, "ProfilePrice": 1.0, "DeliveryPrice": 2.0}]"#;
        assert!(matches!(
            HourlyTable::from_json(response),
            Err(IngestError::MissingField { field: "SpotPrice", .. })
        ));
    }

    #[test]
    fn test_non_numeric_err() {
        // language=json
        let response = r#"[{"TimeStamp": "2024-01-31T22:00:00Z", "Consumption": "lots", "SpotPrice": 1.0, "ProfilePrice": 1.0, "DeliveryPrice": 2.0}]"#;
        assert!(matches!(HourlyTable::from_json(response), Err(IngestError::Json(_))));
    }

    #[test]
    fn test_negative_consumption_err() {
        let record = HourlyRecord::builder()
            .timestamp(Utc::now())
            .consumption(-0.1)
            .spot_price(1.0)
            .profile_price(1.0)
            .delivery_price(1.0)
            .build();
        assert!(matches!(
            HourlyTable::try_new(vec![record]),
            Err(IngestError::InvalidValue { field: "Consumption", .. })
        ));
    }

    #[test]
    fn test_non_finite_price_err() {
        let valid = HourlyRecord::builder()
            .timestamp(Utc.with_ymd_and_hms(2024, 1, 31, 22, 0, 0).unwrap())
            .consumption(0.1)
            .spot_price(1.0)
            .profile_price(1.0)
            .delivery_price(1.0)
            .build();
        let invalid = HourlyRecord {
            timestamp: valid.timestamp + chrono::TimeDelta::hours(1),
            spot_price: f64::NAN,
            ..valid
        };
        assert!(matches!(
            HourlyTable::try_new(vec![valid, invalid]),
            Err(IngestError::InvalidValue { field: "SpotPrice", value, .. }) if value.is_nan()
        ));

        let invalid = HourlyRecord { fixed_price: Some(f64::INFINITY), ..valid };
        assert!(matches!(
            HourlyTable::try_new(vec![invalid]),
            Err(IngestError::InvalidValue { field: "FixedPrice", .. })
        ));
    }

    #[test]
    fn test_descending_timestamps_err() {
        // language=json
        let response = r#"[
            {"TimeStamp": "2024-01-31T23:00:00Z", "Consumption": 0.1, "SpotPrice": 1.0, "ProfilePrice": 1.0, "DeliveryPrice": 2.0},
            {"TimeStamp": "2024-01-31T22:00:00Z", "Consumption": 0.1, "SpotPrice": 1.0, "ProfilePrice": 1.0, "DeliveryPrice": 2.0}
        ]"#;
        match HourlyTable::from_json(response) {
            Err(IngestError::Unordered { previous, next }) => {
                assert_eq!(previous, Utc.with_ymd_and_hms(2024, 1, 31, 23, 0, 0).unwrap());
                assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 31, 22, 0, 0).unwrap());
            }
            result => panic!("unexpected result: {result:?}"),
        }
    }

    #[test]
    fn test_invalid_json_record_err() {
        // language=json
        let response = r#"[{"TimeStamp": "2024-01-31T22:00:00Z", "Consumption": -0.1, "SpotPrice": 1.0, "ProfilePrice": 1.0, "DeliveryPrice": 2.0}]"#;
        assert!(matches!(
            HourlyTable::from_json(response),
            Err(IngestError::InvalidValue { field: "Consumption", .. })
        ));
    }

    #[test]
    fn test_duplicate_timestamp_err() {
        let record = HourlyRecord::builder()
            .timestamp(Utc::now())
            .consumption(0.1)
            .spot_price(1.0)
            .profile_price(1.0)
            .delivery_price(1.0)
            .build();
        assert!(matches!(
            HourlyTable::try_new(vec![record, record]),
            Err(IngestError::Unordered { .. })
        ));
    }

    #[test]
    fn test_empty_ok() -> Result {
        assert!(HourlyTable::from_json("[]")?.is_empty());
        Ok(())
    }
}

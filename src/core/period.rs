use std::{cell::OnceCell, ops::Mul};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use serde_with::{DefaultOnNull, serde_as};

use crate::{
    core::{
        TIME_ZONE,
        id::Id,
        record::{HourlyRecord, HourlyTable},
        slot::{Slot, SlotError},
        source::BillingSource,
    },
    prelude::*,
    quantity::{
        cost::Euros,
        energy::KilowattHours,
        percentage::Percentage,
        price::KilowattHourPrice,
    },
};

/// Billing cycle and the aggregator over its hourly data.
///
/// Every derived metric is [`None`] until the hourly data is attached, and when it is empty.
/// Once a metric is calculated, it is cached in the period for good.
pub struct InvoicingPeriod {
    pub id: Id,
    pub description: String,
    pub start: DateTime<Tz>,
    pub stop: DateTime<Tz>,

    /// The portal's JSON object the period has been built from.
    pub raw: serde_json::Value,

    hourly_records: Slot<HourlyTable>,
    vat_percentage: Slot<Percentage>,
    memo: Memo,
}

#[serde_as]
#[derive(Deserialize)]
struct PeriodData {
    #[serde(rename = "Id")]
    id: Id,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "Description", default)]
    description: String,

    #[serde(rename = "Start")]
    start: DateTime<Utc>,

    #[serde(rename = "Stop")]
    stop: DateTime<Utc>,
}

impl TryFrom<serde_json::Value> for InvoicingPeriod {
    type Error = serde_json::Error;

    fn try_from(raw: serde_json::Value) -> Result<Self, Self::Error> {
        let data = PeriodData::deserialize(&raw)?;
        Ok(Self {
            id: data.id,
            description: data.description,
            start: data.start.with_timezone(&TIME_ZONE),
            stop: data.stop.with_timezone(&TIME_ZONE),
            raw,
            hourly_records: Slot::default(),
            vat_percentage: Slot::default(),
            memo: Memo::default(),
        })
    }
}

impl InvoicingPeriod {
    pub fn attach_hourly_records(&mut self, table: HourlyTable) -> Result<(), SlotError> {
        self.hourly_records.attach(table)
    }

    pub fn attach_vat_percentage(&mut self, vat_percentage: Percentage) -> Result<(), SlotError> {
        self.vat_percentage.attach(vat_percentage)
    }

    /// Fetch whatever is still missing: the hourly data first, then the VAT.
    ///
    /// A failed fetch marks the respective data unavailable and is retried on the next call.
    #[instrument(skip_all, fields(period_id = %self.id, description = %self.description))]
    pub async fn fetch<S: BillingSource + ?Sized>(&mut self, source: &S, contract_id: Id) -> Result {
        self.fetch_hourly_records(source, contract_id).await?;
        self.fetch_vat_percentage(source).await
    }

    /// Fetch the hourly data unless it is already there.
    #[instrument(skip_all, fields(period_id = %self.id))]
    pub async fn fetch_hourly_records<S: BillingSource + ?Sized>(
        &mut self,
        source: &S,
        contract_id: Id,
    ) -> Result {
        if self.hourly_records.is_ready() {
            return Ok(());
        }
        match source.get_hourly_records(self.id, contract_id).await {
            Ok(table) => {
                info!(n_records = table.len(), "fetched hourly data");
                self.attach_hourly_records(table)?;
            }
            Err(error) => {
                warn!("failed to fetch the hourly data: {error:#}");
                self.hourly_records.mark_unavailable()?;
            }
        }
        Ok(())
    }

    async fn fetch_vat_percentage<S: BillingSource + ?Sized>(&mut self, source: &S) -> Result {
        if self.vat_percentage.is_ready() {
            return Ok(());
        }
        let on = self.start.date_naive();
        match source.get_vat_percentage(on).await {
            Ok(vat_percentage) => {
                info!(%on, %vat_percentage, "fetched VAT");
                self.attach_vat_percentage(vat_percentage)?;
            }
            Err(error) => {
                warn!(%on, "failed to fetch the VAT percentage: {error:#}");
                self.vat_percentage.mark_unavailable()?;
            }
        }
        Ok(())
    }

    /// Hourly records for export, [`None`] when not fetched (yet).
    pub const fn hourly_records(&self) -> Option<&HourlyTable> {
        self.hourly_records.get()
    }

    pub fn vat_percentage(&self) -> Option<Percentage> {
        self.vat_percentage.get().copied()
    }

    /// Add VAT on top of the price or cost.
    pub fn with_vat<T: Mul<f64, Output = T>>(&self, value: T) -> Option<T> {
        Some(self.vat_percentage()?.add_to(value))
    }

    pub fn average_spot_price(&self) -> Option<KilowattHourPrice> {
        memoize(&self.memo.average_spot_price, || self.mean_price(|record| Some(record.spot_price)))
    }

    /// Average fixed price, [`None`] when the contract has no fixed price at all.
    pub fn average_fixed_price(&self) -> Option<KilowattHourPrice> {
        memoize(&self.memo.average_fixed_price, || self.mean_price(|record| record.fixed_price))
    }

    pub fn profile_price(&self) -> Option<KilowattHourPrice> {
        memoize(&self.memo.profile_price, || self.mean_price(|record| Some(record.profile_price)))
    }

    pub fn delivery_price(&self) -> Option<KilowattHourPrice> {
        memoize(&self.memo.delivery_price, || self.mean_price(|record| Some(record.delivery_price)))
    }

    /// Consumption-weighted spot price, [`None`] when nothing has been consumed.
    pub fn weighted_spot_price(&self) -> Option<KilowattHourPrice> {
        memoize(&self.memo.weighted_spot_price, || {
            let records = self.non_empty_records()?;
            let total_consumption: f64 = records.iter().map(|record| record.consumption).sum();
            if total_consumption > 0.0 {
                let total_cost: f64 =
                    records.iter().map(|record| record.spot_price * record.consumption).sum();
                Some(KilowattHourPrice::from_raw(total_cost / total_consumption))
            } else {
                None
            }
        })
    }

    pub fn total_consumption(&self) -> Option<KilowattHours> {
        memoize(&self.memo.total_consumption, || self.sum_energy(|record| Some(record.consumption)))
    }

    pub fn total_fixed_consumption(&self) -> Option<KilowattHours> {
        memoize(&self.memo.total_fixed_consumption, || {
            self.sum_energy(|record| record.fixed_consumption)
        })
    }

    pub fn total_open_consumption(&self) -> Option<KilowattHours> {
        memoize(&self.memo.total_open_consumption, || {
            self.sum_energy(|record| record.open_consumption)
        })
    }

    pub fn total_spot_price(&self) -> Option<KilowattHourPrice> {
        memoize(&self.memo.total_spot_price, || {
            Some(self.average_spot_price()? + self.delivery_price()? + self.profile_price()?)
        })
    }

    pub fn total_weighted_spot_price(&self) -> Option<KilowattHourPrice> {
        memoize(&self.memo.total_weighted_spot_price, || {
            Some(self.weighted_spot_price()? + self.delivery_price()? + self.profile_price()?)
        })
    }

    /// Total fixed price, zero when there is no positive fixed price.
    pub fn total_fixed_price(&self) -> Option<KilowattHourPrice> {
        memoize(&self.memo.total_fixed_price, || {
            self.non_empty_records()?;
            match self.average_fixed_price() {
                Some(average_fixed_price) if average_fixed_price > KilowattHourPrice::ZERO => {
                    Some(average_fixed_price + self.delivery_price()? + self.profile_price()?)
                }
                _ => Some(KilowattHourPrice::ZERO),
            }
        })
    }

    pub fn total_spot_cost(&self) -> Option<Euros> {
        memoize(&self.memo.total_spot_cost, || {
            Some(self.total_spot_price()? * self.total_consumption()?)
        })
    }

    pub fn total_fixed_cost(&self) -> Option<Euros> {
        memoize(&self.memo.total_fixed_cost, || {
            Some(self.total_fixed_price()? * self.total_consumption()?)
        })
    }

    pub fn total_weighted_spot_cost(&self) -> Option<Euros> {
        memoize(&self.memo.total_weighted_spot_cost, || {
            Some(self.total_weighted_spot_price()? * self.total_consumption()?)
        })
    }

    fn non_empty_records(&self) -> Option<&HourlyTable> {
        self.hourly_records.get().filter(|table| !table.is_empty())
    }

    /// Mean of the present values, converted from the portal's price scale.
    fn mean_price(&self, field: impl Fn(&HourlyRecord) -> Option<f64>) -> Option<KilowattHourPrice> {
        let (sum, count) = self
            .non_empty_records()?
            .iter()
            .filter_map(field)
            .fold((0.0, 0_u32), |(sum, count), value| (sum + value, count + 1));
        (count != 0).then(|| KilowattHourPrice::from_raw(sum / f64::from(count)))
    }

    /// Sum of the present values, converted from megawatt-hours.
    fn sum_energy(&self, field: impl Fn(&HourlyRecord) -> Option<f64>) -> Option<KilowattHours> {
        let sum = self.non_empty_records()?.iter().filter_map(field).sum();
        Some(KilowattHours::from_megawatt_hours(sum))
    }
}

/// Unavailable values are not cached.
fn memoize<T: Copy>(cell: &OnceCell<T>, calculate: impl FnOnce() -> Option<T>) -> Option<T> {
    if let Some(value) = cell.get() {
        return Some(*value);
    }
    let value = calculate()?;
    Some(*cell.get_or_init(|| value))
}

#[derive(Default)]
struct Memo {
    average_spot_price: OnceCell<KilowattHourPrice>,
    average_fixed_price: OnceCell<KilowattHourPrice>,
    profile_price: OnceCell<KilowattHourPrice>,
    delivery_price: OnceCell<KilowattHourPrice>,
    weighted_spot_price: OnceCell<KilowattHourPrice>,
    total_consumption: OnceCell<KilowattHours>,
    total_fixed_consumption: OnceCell<KilowattHours>,
    total_open_consumption: OnceCell<KilowattHours>,
    total_spot_price: OnceCell<KilowattHourPrice>,
    total_fixed_price: OnceCell<KilowattHourPrice>,
    total_weighted_spot_price: OnceCell<KilowattHourPrice>,
    total_spot_cost: OnceCell<Euros>,
    total_fixed_cost: OnceCell<Euros>,
    total_weighted_spot_cost: OnceCell<Euros>,
}

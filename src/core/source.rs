use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    core::{id::Id, period::InvoicingPeriod, record::HourlyTable},
    prelude::*,
    quantity::percentage::Percentage,
};

/// Supplier of the raw billing data.
#[async_trait]
pub trait BillingSource: Sync {
    /// Invoicing periods with only their identity and time range populated.
    async fn get_invoicing_periods(&self) -> Result<Vec<InvoicingPeriod>>;

    async fn get_hourly_records(&self, period_id: Id, contract_id: Id) -> Result<HourlyTable>;

    /// VAT percentage in effect on the specified local date.
    async fn get_vat_percentage(&self, on: NaiveDate) -> Result<Percentage>;
}

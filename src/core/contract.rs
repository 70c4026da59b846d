use serde::Deserialize;
use serde_with::{DefaultOnError, serde_as};

use crate::{
    core::{
        id::Id,
        period::InvoicingPeriod,
        slot::Slot,
        source::BillingSource,
        strategy::FetchStrategy,
    },
    prelude::*,
};

/// Electricity contract, the owner of its invoicing periods.
///
/// The descriptive fields are informational, and their format is not documented,
/// so anything unexpected in there is simply dropped.
#[must_use]
#[serde_as]
#[derive(Deserialize)]
pub struct Contract {
    #[serde(rename = "Id")]
    pub id: Id,

    #[serde_as(as = "DefaultOnError")]
    #[serde(rename = "MeteringPointId", default)]
    pub metering_point_id: Option<Id>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(rename = "MeteringPoint", default)]
    pub metering_point: Option<String>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(rename = "ContractCode", default)]
    pub code: Option<String>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(rename = "Product", default)]
    pub product: Option<String>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(rename = "Created", default)]
    pub created: Option<String>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(rename = "Start", default)]
    pub start: Option<String>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(rename = "Stop", default)]
    pub stop: Option<String>,

    #[serde(skip)]
    invoicing_periods: Slot<Vec<InvoicingPeriod>>,
}

impl Contract {
    /// Fetch the invoicing periods once, and then (pre-)fetch their missing data with the strategy.
    #[instrument(skip_all, fields(contract_id = %self.id, strategy = ?strategy))]
    pub async fn fetch_invoicing_periods<S: BillingSource + ?Sized>(
        &mut self,
        source: &S,
        strategy: FetchStrategy,
    ) -> Result<&[InvoicingPeriod]> {
        if !self.invoicing_periods.is_ready() {
            match source.get_invoicing_periods().await {
                Ok(periods) => self.invoicing_periods.attach(periods)?,
                Err(error) => {
                    self.invoicing_periods.mark_unavailable()?;
                    return Err(error.context("failed to fetch the invoicing periods"));
                }
            }
        }
        let periods =
            self.invoicing_periods.get_mut().context("invoicing periods are not available")?;
        strategy.prefetch(source, self.id, periods).await?;
        Ok(periods.as_slice())
    }
}

use std::path::PathBuf;

use clap::Parser;

use crate::{
    cli::portal::{ContractArgs, PortalArgs},
    core::{id::Id, source::BillingSource},
    export::export,
    prelude::*,
};

#[derive(Parser)]
pub struct ExportArgs {
    #[clap(flatten)]
    portal: PortalArgs,

    #[clap(flatten)]
    contract: ContractArgs,

    #[clap(long = "period-id")]
    period_id: Id,

    /// Output file, defaults to `HourlyData_{first date}-{last date}.csv`.
    #[clap(long, short)]
    output: Option<PathBuf>,
}

impl ExportArgs {
    #[instrument(skip_all, fields(period_id = %self.period_id))]
    pub async fn run(self) -> Result {
        let api = self.portal.login().await?;
        let contract_id = self.contract.resolve(&api).await?;
        let mut period = api
            .get_invoicing_periods()
            .await?
            .into_iter()
            .find(|period| period.id == self.period_id)
            .with_context(|| format!("invoicing period `{}` is not available", self.period_id))?;
        period.fetch_hourly_records(&api, contract_id).await?;
        ensure!(period.hourly_records().is_some(), "failed to fetch the hourly data");
        export(&period, self.output)?;
        Ok(())
    }
}

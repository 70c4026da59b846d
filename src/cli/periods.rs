use clap::Parser;

use crate::{
    cli::portal::{ContractArgs, PortalArgs},
    core::{contract::Contract, strategy::FetchStrategy},
    prelude::*,
    tables::{build_costs_table, build_prices_table},
};

#[derive(Parser)]
pub struct PeriodsArgs {
    #[clap(flatten)]
    portal: PortalArgs,

    #[clap(flatten)]
    contract: ContractArgs,

    /// How to fetch the periods' hourly data and VAT.
    #[clap(long, value_enum, default_value_t = FetchStrategy::default(), env = "PKS_FETCH_STRATEGY")]
    strategy: FetchStrategy,

    /// Also print the raw period payloads.
    #[clap(long)]
    raw: bool,
}

impl PeriodsArgs {
    #[instrument(skip_all)]
    pub async fn run(self) -> Result {
        let api = self.portal.login().await?;

        let mut customer;
        let mut contract_by_id;
        let contract: &mut Contract = if let Some(contract_id) = self.contract.contract_id {
            contract_by_id = api.get_contract(contract_id).await?;
            &mut contract_by_id
        } else {
            customer = api.get_customer().await?;
            customer.contracts()?.first_mut().context("the customer has no contracts")?
        };
        info!(contract_id = %contract.id, "selected the contract");

        let periods = contract.fetch_invoicing_periods(&api, self.strategy).await?;
        println!("{}", build_prices_table(periods));
        println!("{}", build_costs_table(periods));
        if self.raw {
            for period in periods {
                println!("{:#}", period.raw);
            }
        }
        Ok(())
    }
}

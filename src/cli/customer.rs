use clap::Parser;

use crate::{
    cli::portal::PortalArgs,
    prelude::*,
    tables::{build_contracts_table, build_customer_table},
};

#[derive(Parser)]
pub struct CustomerArgs {
    #[clap(flatten)]
    portal: PortalArgs,
}

impl CustomerArgs {
    #[instrument(skip_all)]
    pub async fn run(self) -> Result {
        let api = self.portal.login().await?;
        let mut customer = api.get_customer().await?;
        println!("{}", build_customer_table(&customer));
        println!("{}", build_contracts_table(customer.contracts()?));
        Ok(())
    }
}

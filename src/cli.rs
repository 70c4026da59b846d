mod customer;
mod export;
mod periods;
mod portal;

use clap::{Parser, Subcommand};

use crate::{
    cli::{customer::CustomerArgs, export::ExportArgs, periods::PeriodsArgs},
    prelude::*,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the customer and their contracts.
    #[clap(name = "customer")]
    Customer(Box<CustomerArgs>),

    /// Show the invoicing periods of a contract with their price breakdown.
    #[clap(name = "periods")]
    Periods(Box<PeriodsArgs>),

    /// Export hourly data of an invoicing period into a CSV file.
    #[clap(name = "export")]
    Export(Box<ExportArgs>),
}

impl Command {
    pub async fn run(self) -> Result {
        match self {
            Self::Customer(args) => args.run().await,
            Self::Periods(args) => args.run().await,
            Self::Export(args) => args.run().await,
        }
    }
}

use std::time::Duration;

use clap::Parser;
use reqwest::Url;

use crate::{
    api::portal::{Api, Endpoints},
    core::id::Id,
    prelude::*,
};

#[derive(Parser)]
pub struct PortalArgs {
    #[clap(long, env = "PKS_USERNAME")]
    username: String,

    #[clap(long, env = "PKS_PASSWORD", hide_env_values = true)]
    password: String,

    #[clap(
        long = "login-url",
        env = "PKS_LOGIN_URL",
        default_value = "https://oma.pks.fi/eServices/Online/Login"
    )]
    login_url: Url,

    #[clap(
        long = "live-login-url",
        env = "PKS_LIVE_LOGIN_URL",
        default_value = "https://oma.pks.fi/eServices/Online/MoveToPKSLiveUser"
    )]
    live_login_url: Url,

    #[clap(long = "api-url", env = "PKS_API_URL", default_value = "https://live.pks.fi/Api")]
    api_url: Url,

    /// HTTP request timeout.
    #[clap(long = "timeout-secs", env = "PKS_TIMEOUT_SECS", default_value = "10")]
    timeout_secs: u64,
}

impl PortalArgs {
    pub async fn login(self) -> Result<Api> {
        let endpoints = Endpoints {
            login_url: self.login_url,
            live_login_url: self.live_login_url,
            api_url: self.api_url,
        };
        Api::login(
            endpoints,
            &self.username,
            &self.password,
            Duration::from_secs(self.timeout_secs),
        )
        .await
    }
}

#[derive(Parser)]
pub struct ContractArgs {
    /// Contract ID, defaults to the customer's first contract.
    #[clap(long = "contract-id", env = "PKS_CONTRACT_ID")]
    pub contract_id: Option<Id>,
}

impl ContractArgs {
    /// Resolve the contract ID, falling back to the customer's first contract.
    pub async fn resolve(&self, api: &Api) -> Result<Id> {
        if let Some(contract_id) = self.contract_id {
            return Ok(contract_id);
        }
        let mut customer = api.get_customer().await?;
        let contract = customer.contracts()?.first().context("the customer has no contracts")?;
        info!(contract_id = %contract.id, "using the first contract");
        Ok(contract.id)
    }
}

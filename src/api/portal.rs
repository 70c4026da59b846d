//! [PKS Live](https://live.pks.fi) customer portal client.

mod login;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::{
    core::{
        contract::Contract,
        customer::Customer,
        id::Id,
        period::InvoicingPeriod,
        record::HourlyTable,
        source::BillingSource,
    },
    prelude::*,
    quantity::percentage::Percentage,
};

/// Portal URLs.
#[derive(Clone)]
pub struct Endpoints {
    /// Web login page with the login form.
    pub login_url: Url,

    /// Page that transfers the web session to the Live API.
    pub live_login_url: Url,

    /// Base URL of the JSON API.
    pub api_url: Url,
}

/// Authenticated session with the portal.
pub struct Api {
    client: Client,
    api_url: Url,
}

impl Api {
    #[instrument(skip_all, fields(username = username))]
    pub async fn login(
        endpoints: Endpoints,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pks-live/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        info!("fetching the login page…");
        let login_page = client
            .get(endpoints.login_url.clone())
            .send()
            .await
            .context("failed to request the login page")?
            .error_for_status()
            .context("failed to fetch the login page")?
            .text()
            .await?;
        let token = login::extract_verification_token(&login_page)?;

        info!("logging in…");
        client
            .post(endpoints.login_url)
            .form(&[
                ("__RequestVerificationToken", token),
                ("UserName", username),
                ("Password", password),
            ])
            .send()
            .await
            .context("failed to submit the login form")?
            .error_for_status()
            .context("login failed")?;

        info!("moving to the Live session…");
        client
            .get(endpoints.live_login_url)
            .send()
            .await
            .context("failed to request the Live session")?
            .error_for_status()
            .context("failed to obtain the Live session")?;

        info!("logged in");
        Ok(Self { client, api_url: endpoints.api_url })
    }

    #[instrument(skip_all)]
    pub async fn get_customer(&self) -> Result<Customer> {
        let customer = self
            .get::<Vec<Customer>>(&["Customer"])
            .await?
            .into_iter()
            .next()
            .context("no customer in the response")?;
        info!(id = %customer.id, n_contracts = customer.n_contracts(), "fetched the customer");
        Ok(customer)
    }

    #[instrument(skip_all, fields(contract_id = %id))]
    pub async fn get_contract(&self, id: Id) -> Result<Contract> {
        self.get::<Vec<Contract>>(&["Customer", "Contracts", &id.to_string()])
            .await?
            .into_iter()
            .next()
            .with_context(|| format!("no contract `{id}` in the response"))
    }

    #[instrument(skip_all, level = Level::DEBUG, fields(path = ?path))]
    async fn get<R: DeserializeOwned>(&self, path: &[&str]) -> Result<R> {
        let text = self.get_text(path).await?;
        serde_json::from_str(&text).with_context(|| format!("failed to deserialize `{path:?}`"))
    }

    async fn get_text(&self, path: &[&str]) -> Result<String> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("invalid API base URL"))?
            .pop_if_empty()
            .extend(path);
        let text = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to call `{path:?}`"))?
            .error_for_status()
            .with_context(|| format!("`{path:?}` failed"))?
            .text()
            .await
            .with_context(|| format!("failed to read `{path:?}` response"))?;
        debug!(len = text.len(), "call succeeded");
        Ok(text)
    }
}

#[async_trait]
impl BillingSource for Api {
    #[instrument(skip_all)]
    async fn get_invoicing_periods(&self) -> Result<Vec<InvoicingPeriod>> {
        let periods = self
            .get::<Vec<serde_json::Value>>(&["Periods", "InvoicingPeriod", "Available"])
            .await?
            .into_iter()
            .map(InvoicingPeriod::try_from)
            .collect::<Result<Vec<_>, _>>()
            .context("malformed invoicing period")?;
        info!(n_periods = periods.len(), "fetched invoicing periods");
        Ok(periods)
    }

    #[instrument(skip_all, fields(period_id = %period_id, contract_id = %contract_id))]
    async fn get_hourly_records(&self, period_id: Id, contract_id: Id) -> Result<HourlyTable> {
        let text = self
            .get_text(&[
                "Customer",
                "Invoicing",
                "HourlyData",
                &period_id.to_string(),
                &contract_id.to_string(),
            ])
            .await?;
        Ok(HourlyTable::from_json(&text)?)
    }

    #[instrument(skip_all, fields(on = %on))]
    async fn get_vat_percentage(&self, on: NaiveDate) -> Result<Percentage> {
        self.get(&["Periods", "VatPercent", &on.format("%Y-%m-%d").to_string()]).await
    }
}

use std::fmt::{Display, Formatter};

use serde::Deserialize;
use serde_with::{DefaultOnError, DefaultOnNull, serde_as};

use crate::{
    core::{contract::Contract, id::Id, slot::Slot},
    prelude::*,
};

/// Portal customer.
///
/// Like with contracts, the personal details are informational,
/// and a value in an unexpected format is dropped instead of failing the customer.
#[must_use]
#[serde_as]
#[derive(Deserialize)]
pub struct Customer {
    #[serde(rename = "Id")]
    pub id: Id,

    #[serde_as(as = "DefaultOnError")]
    #[serde(rename = "CustomerCode", default)]
    pub code: Option<String>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(rename = "FirstName", default)]
    pub first_name: Option<String>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(rename = "LastName", default)]
    pub last_name: Option<String>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(rename = "CompanyName", default)]
    pub company_name: Option<String>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(rename = "Email", default)]
    pub email: Option<String>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(rename = "Phone", default)]
    pub phone: Option<String>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(rename = "AddressId", default)]
    pub address_id: Option<Id>,

    #[serde_as(as = "DefaultOnError")]
    #[serde(rename = "MainCustomerId", default)]
    pub main_customer_id: Option<Id>,

    /// Raw contracts as they came with the customer.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "Contracts", default)]
    contract_payloads: Vec<serde_json::Value>,

    #[serde(skip)]
    contracts: Slot<Vec<Contract>>,
}

impl Customer {
    pub fn n_contracts(&self) -> usize {
        self.contract_payloads.len()
    }

    /// Contracts, built from the raw payloads on the first call.
    pub fn contracts(&mut self) -> Result<&mut [Contract]> {
        if !self.contracts.is_ready() {
            let contracts = self
                .contract_payloads
                .iter()
                .map(Contract::deserialize)
                .collect::<Result<Vec<_>, _>>()
                .context("malformed contract")?;
            self.contracts.attach(contracts)?;
        }
        Ok(self.contracts.get_mut().context("contracts are not available")?.as_mut_slice())
    }
}

impl Display for Customer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.first_name, &self.last_name, &self.company_name) {
            (Some(first_name), Some(last_name), _) => write!(f, "{first_name} {last_name}"),
            (_, _, Some(company_name)) => write!(f, "{company_name}"),
            _ => write!(f, "#{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_ok() -> Result {
        // language=json
        let mut customer: Customer = serde_json::from_str(
            r#"{
                "Address": {"Street": "Sepänkatu 1"},
                "Contracts": [{"Id": 1, "Product": "Pörssisähkö"}, {"Id": "2"}],
                "Id": 1001,
                "CustomerCode": "123456",
                "FirstName": "Matti",
                "LastName": "Meikäläinen",
                "CompanyName": null,
                "Email": "matti@example.com",
                "Phone": null,
                "Identifier": "010101-123N",
                "AddressId": 5,
                "MainCustomerId": null
            }"#,
        )?;
        assert_eq!(customer.to_string(), "Matti Meikäläinen");
        assert_eq!(customer.n_contracts(), 2);
        let contracts = customer.contracts()?;
        assert_eq!(contracts[0].id, Id(1));
        assert_eq!(contracts[1].id, Id(2));
        Ok(())
    }

    #[test]
    fn test_unexpected_details_dropped() -> Result {
        // language=json
        let mut customer: Customer = serde_json::from_str(
            r#"{"Id": 1, "CustomerCode": 123456, "Phone": 358401234567, "Email": ["a", "b"], "AddressId": "nowhere", "Contracts": [{"Id": 1}]}"#,
        )?;
        assert_eq!(customer.id, Id(1));
        assert_eq!(customer.code, None);
        assert_eq!(customer.phone, None);
        assert_eq!(customer.email, None);
        assert_eq!(customer.address_id, None);
        assert_eq!(customer.contracts()?[0].id, Id(1));
        Ok(())
    }

    #[test]
    fn test_null_contracts_ok() -> Result {
        // language=json
        let mut customer: Customer =
            serde_json::from_str(r#"{"Id": 1, "CompanyName": "Oy Yhtiö Ab", "Contracts": null}"#)?;
        assert_eq!(customer.to_string(), "Oy Yhtiö Ab");
        assert!(customer.contracts()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_malformed_contract_err() -> Result {
        // language=json
        let mut customer: Customer =
            serde_json::from_str(r#"{"Id": 1, "Contracts": [{"Product": "no identifier"}]}"#)?;
        assert!(customer.contracts().is_err());
        Ok(())
    }
}

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

/// Portal object identifier.
///
/// The portal is not consistent about it and sometimes sends numeric strings.
#[serde_as]
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Deserialize,
    Serialize,
    derive_more::Display,
    derive_more::From,
    derive_more::FromStr,
)]
#[serde(transparent)]
pub struct Id(#[serde_as(as = "PickFirst<(_, DisplayFromStr)>")] pub u64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_deserialize_number_ok() -> Result {
        assert_eq!(serde_json::from_str::<Id>("42")?, Id(42));
        Ok(())
    }

    #[test]
    fn test_deserialize_string_ok() -> Result {
        assert_eq!(serde_json::from_str::<Id>(r#""42""#)?, Id(42));
        Ok(())
    }

    #[test]
    fn test_deserialize_garbage_err() {
        assert!(serde_json::from_str::<Id>(r#""forty-two""#).is_err());
    }
}

use serde::{Deserialize, Serialize};

/// An amount of money in minor units, e.g. cents.
///
/// ```rust
/// use moov_client::Amount;
///
/// let one_cent = Amount::new("usd", 1);
/// assert_eq!(one_cent.value, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("{value} {currency}")]
pub struct Amount {
    /// ISO 4217 currency code, lowercase.
    pub currency: String,
    /// Quantity in the smallest unit of the currency.
    pub value: i64,
}

impl Amount {
    /// Creates an amount.
    pub fn new(currency: impl Into<String>, value: i64) -> Self {
        Self {
            currency: currency.into(),
            value,
        }
    }
}

/// An amount of money as a decimal string, with up to 9 fractional digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("{value_decimal} {currency}")]
#[serde(rename_all = "camelCase")]
pub struct AmountDecimal {
    /// ISO 4217 currency code, lowercase.
    pub currency: String,
    /// Decimal quantity, e.g. `"12.987654321"`.
    pub value_decimal: String,
}

impl AmountDecimal {
    /// Creates a decimal amount.
    pub fn new(currency: impl Into<String>, value_decimal: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            value_decimal: value_decimal.into(),
        }
    }
}

//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(5,2)`: at most three digits before the
//! decimal point and exactly two after it. Binary floating point never
//! touches a price; JSON numbers are parsed through their decimal text form.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("Ensure this value is greater than or equal to 0.")]
    Negative,
    /// More fractional digits than the column can hold.
    #[error("Ensure that there are no more than {max} decimal places.")]
    TooManyDecimalPlaces {
        /// Maximum allowed decimal places.
        max: u32,
    },
    /// More integer digits than the column can hold.
    #[error("Ensure that there are no more than {max} digits before the decimal point.")]
    TooManyWholeDigits {
        /// Maximum allowed digits before the decimal point.
        max: u32,
    },
    /// The input is not a decimal number.
    #[error("A valid number is required.")]
    Invalid,
}

/// A recipe price in the store's single currency.
///
/// ```
/// use recipe_app_core::Price;
///
/// let price: Price = "5.5".parse().unwrap();
/// assert_eq!(price.to_string(), "5.50");
/// assert!("1000".parse::<Price>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Total significant digits the column holds.
    pub const MAX_DIGITS: u32 = 5;
    /// Digits kept after the decimal point.
    pub const DECIMAL_PLACES: u32 = 2;

    /// Validate an amount and fix its scale to two decimal places.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, has more than two
    /// significant decimal places, or more than three whole digits.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }

        let normalized = amount.normalize();
        if normalized.scale() > Self::DECIMAL_PLACES {
            return Err(PriceError::TooManyDecimalPlaces {
                max: Self::DECIMAL_PLACES,
            });
        }

        let whole_limit = Decimal::from(10_u32.pow(Self::MAX_DIGITS - Self::DECIMAL_PLACES));
        if normalized.trunc() >= whole_limit {
            return Err(PriceError::TooManyWholeDigits {
                max: Self::MAX_DIGITS - Self::DECIMAL_PLACES,
            });
        }

        let mut fixed = normalized.abs();
        fixed.rescale(Self::DECIMAL_PLACES);
        Ok(Self(fixed))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str_exact(s.trim()).map_err(|_| PriceError::Invalid)?;
        Self::new(amount)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

//! Collateral ratio from raw on-chain integers.

use crate::domain::units::{COLLATERAL_DECIMALS, DEBT_DECIMALS};
use crate::domain::{Decimal, PriceReading, ScaleError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Collateral value over debt; `1.5` means 150%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollateralRatio(Decimal);

impl CollateralRatio {
    pub fn new(value: Decimal) -> Self {
        CollateralRatio(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Ratio as a whole percentage for display (`1.505` becomes `150`).
    pub fn display_percent(&self) -> Decimal {
        self.0.as_percent().round_dp(0)
    }
}

impl fmt::Display for CollateralRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.as_percent().round_dp(2))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatioError {
    #[error("collateral ratio undefined: debt is zero")]
    DivisionUndefined,
    #[error("collateral ratio overflow (debt={debt}, collateral={collateral}, price={price})")]
    Overflow {
        debt: u128,
        collateral: u128,
        price: u128,
    },
    #[error(transparent)]
    Scale(#[from] ScaleError),
}

/// Compute `collateral * price / debt` in natural units.
///
/// Debt and collateral carry 18 implicit decimals, the price carries its own
/// exponent. Each operand is rescaled before multiplying so the product stays
/// within the decimal mantissa.
pub fn collateral_ratio(
    debt: u128,
    collateral: u128,
    price: &PriceReading,
) -> Result<CollateralRatio, RatioError> {
    if debt == 0 {
        return Err(RatioError::DivisionUndefined);
    }

    let debt_units = Decimal::from_scaled(debt, DEBT_DECIMALS)?;
    let collateral_units = Decimal::from_scaled(collateral, COLLATERAL_DECIMALS)?;
    let price_units = price.value()?;

    let overflow = || RatioError::Overflow {
        debt,
        collateral,
        price: price.answer,
    };
    let collateral_value = collateral_units
        .checked_mul(price_units)
        .ok_or_else(overflow)?;
    let ratio = collateral_value
        .checked_div(debt_units)
        .ok_or_else(overflow)?;

    Ok(CollateralRatio(ratio))
}

#[cfg(test)]
mod tests {
    use super::*;

    const E18: u128 = 1_000_000_000_000_000_000;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn price(usd: u128) -> PriceReading {
        PriceReading::new(usd * 100_000_000, 8)
    }

    #[test]
    fn test_ratio_basic() {
        let ratio = collateral_ratio(2000 * E18, 2 * E18, &price(2000)).unwrap();
        assert_eq!(ratio.value(), d("2"));
        assert_eq!(ratio.display_percent(), d("200"));
    }

    #[test]
    fn test_ratio_keeps_fractional_precision() {
        // 1.1 ETH at 1000 USD against 1000 debt: exactly 110%.
        let ratio = collateral_ratio(1000 * E18, 11 * E18 / 10, &price(1000)).unwrap();
        assert_eq!(ratio.value(), d("1.1"));

        // 1.0999 ETH must stay below 110%.
        let ratio = collateral_ratio(1000 * E18, 10_999 * E18 / 10_000, &price(1000)).unwrap();
        assert!(ratio.value() < d("1.10"));
        assert_eq!(ratio.value(), d("1.0999"));
    }

    #[test]
    fn test_ratio_uses_price_exponent() {
        let reading = PriceReading::new(123_456_789_012, 8);
        let ratio = collateral_ratio(E18, E18, &reading).unwrap();
        assert_eq!(ratio.value(), d("1234.56789012"));
    }

    #[test]
    fn test_zero_debt_is_undefined() {
        for collateral in [0, 1, 5 * E18] {
            assert_eq!(
                collateral_ratio(0, collateral, &price(2000)),
                Err(RatioError::DivisionUndefined)
            );
        }
    }

    #[test]
    fn test_ratio_monotonic_in_price_and_debt() {
        let debt = 1500 * E18;
        let collateral = 3 * E18;
        let mut last = Decimal::zero();
        for usd in [500, 1000, 1500, 2000, 4000] {
            let r = collateral_ratio(debt, collateral, &price(usd)).unwrap().value();
            assert!(r > last, "ratio should grow with price");
            last = r;
        }

        let mut last: Option<Decimal> = None;
        for debt_units in [100, 1000, 2000, 5000] {
            let r = collateral_ratio(debt_units * E18, collateral, &price(2000))
                .unwrap()
                .value();
            if let Some(prev) = last {
                assert!(r < prev, "ratio should shrink as debt grows");
            }
            last = Some(r);
        }
    }

    #[test]
    fn test_unrepresentable_amount_is_an_error() {
        let err = collateral_ratio(E18, u128::MAX, &price(2000)).unwrap_err();
        assert!(matches!(err, RatioError::Scale(_)));
    }

    #[test]
    fn test_display() {
        let ratio = CollateralRatio::new(d("1.23456"));
        assert_eq!(ratio.to_string(), "123.46%");
    }
}

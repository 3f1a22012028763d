//! Redemption exposure: how much collateral sits ahead of the monitored
//! position in redemption order.

use super::ratio::{collateral_ratio, CollateralRatio, RatioError};
use crate::domain::units::COLLATERAL_DECIMALS;
use crate::domain::{Decimal, Position, PriceReading, ScaleError};
use serde::{Deserialize, Serialize};

/// Collateral of the positions redeemed before (or alongside) the monitored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionExposure {
    /// Summed collateral in wei.
    pub collateral: u128,
    /// Number of list entries that contributed.
    pub positions_ahead: usize,
}

impl RedemptionExposure {
    /// Exposure in whole collateral-asset units (ETH).
    pub fn in_asset_units(&self) -> Result<Decimal, ScaleError> {
        Decimal::from_scaled(self.collateral, COLLATERAL_DECIMALS)
    }
}

/// Walk `positions` (ascending by ratio) and sum collateral while each
/// entry's ratio is `<= monitored`.
///
/// Stops at the first entry whose ratio is strictly greater. Entries with zero
/// debt have no finite ratio and also end the scan. The monitored position is
/// not special-cased: if it appears in the list it is counted like any other.
pub fn redemption_exposure(
    monitored: CollateralRatio,
    positions: &[Position],
    price: &PriceReading,
) -> Result<RedemptionExposure, RatioError> {
    let mut exposure = RedemptionExposure {
        collateral: 0,
        positions_ahead: 0,
    };

    for position in positions {
        let ratio = match collateral_ratio(position.debt, position.collateral, price) {
            Ok(ratio) => ratio,
            Err(RatioError::DivisionUndefined) => break,
            Err(e) => return Err(e),
        };
        if ratio > monitored {
            break;
        }
        exposure.collateral = exposure.collateral.saturating_add(position.collateral);
        exposure.positions_ahead += 1;
    }

    Ok(exposure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Address;

    const E18: u128 = 1_000_000_000_000_000_000;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    // At 1200 USD/ETH these debts give ratios 1.0, 1.2 and 1.5.
    fn price() -> PriceReading {
        PriceReading::new(1200 * 100_000_000, 8)
    }

    fn pos(n: u8, debt: u128, coll: u128) -> Position {
        Position::new(Address::from_bytes([n; 20]), debt * E18, coll * E18)
    }

    fn scenario_list() -> Vec<Position> {
        vec![
            pos(1, 12_000, 10),
            pos(2, 5_000, 5),
            pos(3, 16_000, 20),
        ]
    }

    fn ratio(s: &str) -> CollateralRatio {
        CollateralRatio::new(d(s))
    }

    #[test]
    fn test_empty_list_has_no_exposure() {
        let exposure = redemption_exposure(ratio("1.5"), &[], &price()).unwrap();
        assert_eq!(exposure.collateral, 0);
        assert_eq!(exposure.positions_ahead, 0);
    }

    #[test]
    fn test_scenario_includes_equal_ratio_and_stops_before_higher() {
        let exposure = redemption_exposure(ratio("1.2"), &scenario_list(), &price()).unwrap();
        assert_eq!(exposure.in_asset_units().unwrap(), d("15"));
        assert_eq!(exposure.positions_ahead, 2);
    }

    #[test]
    fn test_all_above_monitored_ratio() {
        let exposure = redemption_exposure(ratio("0.9"), &scenario_list(), &price()).unwrap();
        assert_eq!(exposure.collateral, 0);
    }

    #[test]
    fn test_all_at_or_below_monitored_ratio() {
        let exposure = redemption_exposure(ratio("1.5"), &scenario_list(), &price()).unwrap();
        assert_eq!(exposure.in_asset_units().unwrap(), d("35"));
        assert_eq!(exposure.positions_ahead, 3);
    }

    #[test]
    fn test_scan_stops_at_first_higher_even_if_later_entries_are_lower() {
        let list = vec![pos(1, 12_000, 10), pos(3, 16_000, 20), pos(2, 5_000, 5)];
        let exposure = redemption_exposure(ratio("1.2"), &list, &price()).unwrap();
        assert_eq!(exposure.in_asset_units().unwrap(), d("10"));
    }

    #[test]
    fn test_monitored_position_in_list_counts_toward_exposure() {
        let me = pos(2, 5_000, 5);
        let monitored = collateral_ratio(me.debt, me.collateral, &price()).unwrap();
        let list = vec![pos(1, 12_000, 10), me, pos(3, 16_000, 20)];
        let exposure = redemption_exposure(monitored, &list, &price()).unwrap();
        assert_eq!(exposure.in_asset_units().unwrap(), d("15"));
    }

    #[test]
    fn test_zero_debt_entry_ends_scan() {
        let list = vec![pos(1, 12_000, 10), pos(4, 0, 3), pos(2, 5_000, 5)];
        let exposure = redemption_exposure(ratio("2"), &list, &price()).unwrap();
        assert_eq!(exposure.in_asset_units().unwrap(), d("10"));
    }
}

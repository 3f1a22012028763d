//! Positions (troves) as read from the protocol.

use super::primitives::Address;
use serde::{Deserialize, Serialize};

/// A trove: owner address plus debt and collateral in base units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub address: Address,
    /// Debt in debt-token base units (18 decimals).
    pub debt: u128,
    /// Collateral in wei.
    pub collateral: u128,
}

impl Position {
    pub fn new(address: Address, debt: u128, collateral: u128) -> Self {
        Self {
            address,
            debt,
            collateral,
        }
    }
}

/// Positions ordered ascending by collateral ratio, lowest (first to be
/// redeemed) first. Fetched fresh each run.
pub type PositionList = Vec<Position>;

/// Find the monitored position in a list.
pub fn find_position<'a>(list: &'a [Position], address: &Address) -> Option<&'a Position> {
    list.iter().find(|p| &p.address == address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_position_matches_any_case() {
        let a = Address::parse("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd").unwrap();
        let list = vec![
            Position::new(Address::from_bytes([2u8; 20]), 1, 1),
            Position::new(a.clone(), 5, 6),
        ];
        let upper = Address::parse("0xABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD").unwrap();
        assert_eq!(find_position(&list, &upper).map(|p| p.debt), Some(5));
        assert!(find_position(&list, &Address::from_bytes([9u8; 20])).is_none());
    }
}

//! Oracle trust gate: the price is only used when the feed is healthy and
//! reports with the expected exponent.

use crate::datasource::ChainError;
use crate::domain::OracleStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("price feed status is {0}, expected chainlinkWorking")]
    WrongStatus(OracleStatus),
    #[error("price aggregator reports {actual} decimals, expected {expected}")]
    WrongDecimals { actual: u32, expected: u32 },
    #[error("price oracle could not be queried: {0}")]
    Unreachable(#[source] ChainError),
}

/// Decide whether a price from this feed may be used.
///
/// The status is checked first: a non-normal feed is untrusted whatever its
/// exponent.
pub fn validate_oracle(
    status: OracleStatus,
    decimals: u32,
    expected_decimals: u32,
) -> Result<(), OracleError> {
    if !status.is_normal() {
        return Err(OracleError::WrongStatus(status));
    }
    if decimals != expected_decimals {
        return Err(OracleError::WrongDecimals {
            actual: decimals,
            expected: expected_decimals,
        });
    }
    Ok(())
}

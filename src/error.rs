use crate::datasource::ChainError;
use crate::db::StoreError;
use crate::engine::{OracleError, RatioError};
use crate::notify::NotifyError;
use thiserror::Error;

/// Failures of a monitoring run, one variant per failure kind.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("oracle untrusted: {0}")]
    OracleUntrusted(#[from] OracleError),
    #[error("price unavailable: {0}")]
    PriceUnavailable(#[source] ChainError),
    #[error("{0}")]
    RatioUndefined(#[from] RatioError),
    #[error("position data unavailable: {0}")]
    PositionDataUnavailable(#[source] ChainError),
    #[error("persistence failure: {0}")]
    PersistenceFailure(#[from] StoreError),
    #[error("notification failure: {0}")]
    NotificationFailure(#[from] NotifyError),
}

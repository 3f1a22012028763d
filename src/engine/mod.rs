//! Pure risk evaluation engine.
//!
//! Oracle gate, ratio calculation, redemption scan, change tracking and the
//! alert policy. Only the state tracker touches storage, through the
//! `SnapshotStore` trait.

pub mod oracle;
pub mod policy;
pub mod ratio;
pub mod redemption;
pub mod state_tracker;

pub use oracle::{validate_oracle, OracleError};
pub use policy::Thresholds;
pub use ratio::{collateral_ratio, CollateralRatio, RatioError};
pub use redemption::{redemption_exposure, RedemptionExposure};
pub use state_tracker::{ChangeResult, StateTracker, Tracked};

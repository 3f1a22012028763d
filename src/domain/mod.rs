//! Domain types for trove health monitoring.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: TimeMs, Address
//! - Position, price reading and snapshot records read from or written for the chain
//! - Alert events and severity levels

pub mod alert;
pub mod decimal;
pub mod position;
pub mod price;
pub mod primitives;
pub mod snapshot;
pub mod units;

pub use alert::{AlertEvent, AlertKind, Severity};
pub use decimal::{Decimal, ScaleError};
pub use position::{Position, PositionList};
pub use price::{OracleStatus, PriceReading};
pub use primitives::{Address, AddressParseError, TimeMs};
pub use snapshot::{PositionSnapshot, SNAPSHOT_FORMAT_VERSION};

//! Fixed decimal exponents used by the protocol's on-chain integers.

/// Decimals of the debt token (LUSD).
pub const DEBT_DECIMALS: u32 = 18;

/// Decimals of the collateral asset (ETH).
pub const COLLATERAL_DECIMALS: u32 = 18;

/// Decimal exponent the price aggregator is expected to report.
pub const EXPECTED_PRICE_DECIMALS: u32 = 8;

//! Minimal Solidity ABI encoding for the handful of view calls the monitor
//! makes. Only static 32-byte words and one dynamic array of static tuples
//! are supported.

use crate::domain::{Address, Position};
use sha3::{Digest, Keccak256};
use thiserror::Error;

pub type Word = [u8; 32];

/// Words per `MultiTroveGetter.CombinedTroveData` element:
/// owner, debt, coll, stake, snapshotETH, snapshotLUSDDebt.
pub const COMBINED_TROVE_WORDS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("invalid hex: {0}")]
    Hex(String),
    #[error("return data too short: need {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },
    #[error("value at word {0} does not fit in 128 bits")]
    Overflow(usize),
    #[error("word {0} is not an address")]
    NotAnAddress(usize),
    #[error("invalid dynamic data offset {0}")]
    BadOffset(usize),
}

/// First four bytes of keccak256 of the canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = Keccak256::digest(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// `0x`-prefixed calldata for `signature` with static arguments.
pub fn encode_call(signature: &str, args: &[Word]) -> String {
    let mut data = Vec::with_capacity(4 + 32 * args.len());
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(arg);
    }
    format!("0x{}", hex::encode(data))
}

pub fn word_u128(value: u128) -> Word {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Two's complement `int256`.
pub fn word_i128(value: i128) -> Word {
    let fill = if value < 0 { 0xff } else { 0x00 };
    let mut word = [fill; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

pub fn word_address(address: &Address) -> Word {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&address.to_bytes());
    word
}

/// Decode `0x`-prefixed return data.
pub fn decode_hex(data: &str) -> Result<Vec<u8>, AbiError> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    hex::decode(digits).map_err(|e| AbiError::Hex(e.to_string()))
}

fn word_at(data: &[u8], index: usize) -> Result<&[u8], AbiError> {
    let start = index.checked_mul(32).ok_or(AbiError::Overflow(index))?;
    let end = start.checked_add(32).ok_or(AbiError::Overflow(index))?;
    if data.len() < end {
        return Err(AbiError::Truncated {
            needed: end,
            got: data.len(),
        });
    }
    Ok(&data[start..end])
}

/// `uint256` at word `index`, rejecting values wider than 128 bits.
pub fn decode_u128(data: &[u8], index: usize) -> Result<u128, AbiError> {
    let word = word_at(data, index)?;
    if word[..16].iter().any(|b| *b != 0) {
        return Err(AbiError::Overflow(index));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(low))
}

pub fn decode_address(data: &[u8], index: usize) -> Result<Address, AbiError> {
    let word = word_at(data, index)?;
    if word[..12].iter().any(|b| *b != 0) {
        return Err(AbiError::NotAnAddress(index));
    }
    let mut raw = [0u8; 20];
    raw.copy_from_slice(&word[12..]);
    Ok(Address::from_bytes(raw))
}

fn word_index(data: &[u8], index: usize) -> Result<usize, AbiError> {
    let value = decode_u128(data, index)?;
    usize::try_from(value).map_err(|_| AbiError::Overflow(index))
}

/// Decode the `CombinedTroveData[]` returned by
/// `getMultipleSortedTroves(int256,uint256)`.
pub fn decode_sorted_troves(data: &[u8]) -> Result<Vec<Position>, AbiError> {
    let offset = word_index(data, 0)?;
    if offset % 32 != 0 {
        return Err(AbiError::BadOffset(offset));
    }
    let base = offset / 32;
    let len = word_index(data, base)?;

    // Bounds-check the whole array before allocating for it.
    let last = len
        .checked_mul(COMBINED_TROVE_WORDS)
        .and_then(|words| words.checked_add(base))
        .ok_or(AbiError::Overflow(base))?;
    word_at(data, last)?;

    let mut positions = Vec::with_capacity(len);
    for i in 0..len {
        let first = base + 1 + i * COMBINED_TROVE_WORDS;
        positions.push(Position::new(
            decode_address(data, first)?,
            decode_u128(data, first + 1)?,
            decode_u128(data, first + 2)?,
        ));
    }
    Ok(positions)
}

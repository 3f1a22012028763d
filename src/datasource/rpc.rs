//! Ethereum JSON-RPC client reading the Liquity and Chainlink contracts.

use super::abi::{self, word_address, word_i128, word_u128};
use super::{ChainError, PositionListSource, PositionRegistry, PriceOracle};
use crate::domain::{Address, OracleStatus, PositionList};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Contract addresses the monitor reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractAddresses {
    /// Chainlink ETH/USD aggregator.
    pub chainlink: Address,
    /// Liquity PriceFeed (reports which oracle it trusts).
    pub price_feed: Address,
    pub trove_manager: Address,
    pub multi_trove_getter: Address,
}

impl ContractAddresses {
    pub const MAINNET_CHAINLINK: &'static str = "0x5f4eC3Df9cbd43714FE2740f5E3616155c5b8419";
    pub const MAINNET_PRICE_FEED: &'static str = "0x4c517D4e2C851CA76d7eC94B805269Df0f2201De";
    pub const MAINNET_TROVE_MANAGER: &'static str = "0xA39739EF8b0231DbFA0DcdA07d7e29faAbCf4bb2";
    pub const MAINNET_MULTI_TROVE_GETTER: &'static str =
        "0xFc92d0E9Fa35df17E3A6d9F40716ca2cE749922B";
}

/// JSON-RPC backed implementation of all chain collaborators.
#[derive(Debug, Clone)]
pub struct RpcChain {
    client: Client,
    rpc_url: String,
    contracts: ContractAddresses,
    max_retry_elapsed: Duration,
}

impl RpcChain {
    pub fn new(rpc_url: String, contracts: ContractAddresses) -> Self {
        Self {
            client: Client::new(),
            rpc_url,
            contracts,
            max_retry_elapsed: Duration::from_secs(30),
        }
    }

    /// Upper bound on time spent retrying one call.
    pub fn with_max_retry_elapsed(mut self, max: Duration) -> Self {
        self.max_retry_elapsed = max;
        self
    }

    async fn post_rpc(&self, payload: serde_json::Value) -> Result<serde_json::Value, ChainError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_retry_elapsed),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .post(&self.rpc_url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(ChainError::NetworkError(e.to_string())))?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(ChainError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(ChainError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(ChainError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(ChainError::ParseError(e.to_string())))
        })
        .await
    }

    /// `eth_call` against the latest block, returning raw return data.
    async fn eth_call(&self, to: &Address, data: String) -> Result<Vec<u8>, ChainError> {
        debug!(to = %to, data = %data, "eth_call");
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [{ "to": to.as_str(), "data": data }, "latest"]
        });
        let response = self.post_rpc(payload).await?;
        let result = parse_rpc_result(&response)?;
        Ok(abi::decode_hex(&result)?)
    }
}

/// Extract the `result` string of a JSON-RPC response, surfacing `error`.
fn parse_rpc_result(response: &serde_json::Value) -> Result<String, ChainError> {
    if let Some(error) = response.get("error") {
        return Err(ChainError::RpcError {
            code: error.get("code").and_then(|c| c.as_i64()).unwrap_or(0),
            message: error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string(),
        });
    }
    response
        .get("result")
        .and_then(|r| r.as_str())
        .map(str::to_string)
        .ok_or_else(|| ChainError::ParseError("Missing result field".to_string()))
}

#[async_trait]
impl PriceOracle for RpcChain {
    async fn status(&self) -> Result<OracleStatus, ChainError> {
        let data = self
            .eth_call(&self.contracts.price_feed, abi::encode_call("status()", &[]))
            .await?;
        let code = abi::decode_u128(&data, 0)?;
        let code = u64::try_from(code)
            .map_err(|_| ChainError::ParseError(format!("status code {} out of range", code)))?;
        Ok(OracleStatus::from_code(code))
    }

    async fn decimals(&self) -> Result<u32, ChainError> {
        let data = self
            .eth_call(&self.contracts.chainlink, abi::encode_call("decimals()", &[]))
            .await?;
        let decimals = abi::decode_u128(&data, 0)?;
        u32::try_from(decimals)
            .map_err(|_| ChainError::ParseError(format!("decimals {} out of range", decimals)))
    }

    async fn latest_price(&self) -> Result<u128, ChainError> {
        let data = self
            .eth_call(&self.contracts.chainlink, abi::encode_call("latestAnswer()", &[]))
            .await?;
        // A negative int256 answer has its high bytes set and is rejected here.
        abi::decode_u128(&data, 0)
            .map_err(|e| ChainError::ParseError(format!("unusable price answer: {}", e)))
    }
}

#[async_trait]
impl PositionRegistry for RpcChain {
    async fn position(&self, address: &Address) -> Result<(u128, u128), ChainError> {
        let data = self
            .eth_call(
                &self.contracts.trove_manager,
                abi::encode_call("getEntireDebtAndColl(address)", &[word_address(address)]),
            )
            .await?;
        Ok((abi::decode_u128(&data, 0)?, abi::decode_u128(&data, 1)?))
    }

    async fn current_ratio(&self, address: &Address, price: u128) -> Result<u128, ChainError> {
        let data = self
            .eth_call(
                &self.contracts.trove_manager,
                abi::encode_call(
                    "getCurrentICR(address,uint256)",
                    &[word_address(address), word_u128(price)],
                ),
            )
            .await?;
        Ok(abi::decode_u128(&data, 0)?)
    }

    async fn position_count(&self) -> Result<u64, ChainError> {
        let data = self
            .eth_call(
                &self.contracts.trove_manager,
                abi::encode_call("getTroveOwnersCount()", &[]),
            )
            .await?;
        let count = abi::decode_u128(&data, 0)?;
        u64::try_from(count)
            .map_err(|_| ChainError::ParseError(format!("trove count {} out of range", count)))
    }
}

#[async_trait]
impl PositionListSource for RpcChain {
    async fn sorted_positions(&self, count: u64) -> Result<PositionList, ChainError> {
        // A negative start index walks from the tail: lowest ratio first.
        let data = self
            .eth_call(
                &self.contracts.multi_trove_getter,
                abi::encode_call(
                    "getMultipleSortedTroves(int256,uint256)",
                    &[word_i128(-1), word_u128(u128::from(count))],
                ),
            )
            .await?;
        Ok(abi::decode_sorted_troves(&data)?)
    }
}

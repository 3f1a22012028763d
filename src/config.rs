use crate::datasource::ContractAddresses;
use crate::domain::units::EXPECTED_PRICE_DECIMALS;
use crate::domain::{Address, Decimal};
use crate::engine::Thresholds;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Clone)]
pub struct Config {
    pub rpc_url: String,
    /// Owner address of the monitored trove.
    pub position: Address,
    pub min_collateral_ratio: Decimal,
    pub max_collateral_ratio: Decimal,
    /// ETH that should sit ahead of the trove in redemption order.
    pub eth_redemption_buffer: Decimal,
    pub pushover_user: String,
    pub pushover_token: String,
    pub database_path: String,
    pub expected_oracle_decimals: u32,
    pub contracts: ContractAddresses,
    /// Run periodically instead of once when set.
    pub watch_interval: Option<Duration>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("position", &self.position)
            .field("min_collateral_ratio", &self.min_collateral_ratio)
            .field("max_collateral_ratio", &self.max_collateral_ratio)
            .field("eth_redemption_buffer", &self.eth_redemption_buffer)
            .field("database_path", &self.database_path)
            .field("expected_oracle_decimals", &self.expected_oracle_decimals)
            .field("contracts", &self.contracts)
            .field("watch_interval", &self.watch_interval)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let rpc_url = match (env_map.get("RPC_URL"), env_map.get("INFURA_ID")) {
            (Some(url), _) => url.clone(),
            (None, Some(id)) => format!("https://mainnet.infura.io/v3/{}", id),
            (None, None) => return Err(ConfigError::MissingEnv("RPC_URL".to_string())),
        };

        let position = parse_address(&env_map, "ETH_ADDRESS", None)?;

        let min_collateral_ratio = parse_decimal(&env_map, "MIN_COLLATERAL_RATIO")?;
        let max_collateral_ratio = parse_decimal(&env_map, "MAX_COLLATERAL_RATIO")?;
        if min_collateral_ratio >= max_collateral_ratio {
            return Err(ConfigError::InvalidValue(
                "MIN_COLLATERAL_RATIO".to_string(),
                format!(
                    "must be below MAX_COLLATERAL_RATIO ({} >= {})",
                    min_collateral_ratio, max_collateral_ratio
                ),
            ));
        }

        let eth_redemption_buffer = parse_decimal(&env_map, "ETH_REDEMPTION_BUFFER")?;
        if eth_redemption_buffer.is_negative() {
            return Err(ConfigError::InvalidValue(
                "ETH_REDEMPTION_BUFFER".to_string(),
                "must not be negative".to_string(),
            ));
        }

        let pushover_user = required(&env_map, "PUSHOVER_USER")?;
        let pushover_token = required(&env_map, "PUSHOVER_TOKEN")?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .unwrap_or_else(|| ".trove.db".to_string());

        let expected_oracle_decimals = match env_map.get("EXPECTED_ORACLE_DECIMALS") {
            Some(s) => s.parse::<u32>().map_err(|_| {
                ConfigError::InvalidValue(
                    "EXPECTED_ORACLE_DECIMALS".to_string(),
                    "must be a valid u32".to_string(),
                )
            })?,
            None => EXPECTED_PRICE_DECIMALS,
        };

        let contracts = ContractAddresses {
            chainlink: parse_address(
                &env_map,
                "CHAINLINK_ADDRESS",
                Some(ContractAddresses::MAINNET_CHAINLINK),
            )?,
            price_feed: parse_address(
                &env_map,
                "PRICE_FEED_ADDRESS",
                Some(ContractAddresses::MAINNET_PRICE_FEED),
            )?,
            trove_manager: parse_address(
                &env_map,
                "TROVE_MANAGER_ADDRESS",
                Some(ContractAddresses::MAINNET_TROVE_MANAGER),
            )?,
            multi_trove_getter: parse_address(
                &env_map,
                "MULTI_TROVE_GETTER_ADDRESS",
                Some(ContractAddresses::MAINNET_MULTI_TROVE_GETTER),
            )?,
        };

        let watch_interval = match env_map.get("WATCH_INTERVAL_SECS") {
            Some(s) => {
                let secs = s.parse::<u64>().ok().filter(|n| *n > 0).ok_or_else(|| {
                    ConfigError::InvalidValue(
                        "WATCH_INTERVAL_SECS".to_string(),
                        "must be a positive integer".to_string(),
                    )
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Config {
            rpc_url,
            position,
            min_collateral_ratio,
            max_collateral_ratio,
            eth_redemption_buffer,
            pushover_user,
            pushover_token,
            database_path,
            expected_oracle_decimals,
            contracts,
            watch_interval,
        })
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_ratio: self.min_collateral_ratio,
            max_ratio: self.max_collateral_ratio,
            redemption_buffer: self.eth_redemption_buffer,
        }
    }
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    env_map
        .get(key)
        .filter(|s| !s.trim().is_empty())
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}

fn parse_decimal(env_map: &HashMap<String, String>, key: &str) -> Result<Decimal, ConfigError> {
    let raw = required(env_map, key)?;
    Decimal::from_str_canonical(raw.trim()).map_err(|_| {
        ConfigError::InvalidValue(key.to_string(), format!("not a decimal number: {}", raw))
    })
}

fn parse_address(
    env_map: &HashMap<String, String>,
    key: &str,
    default: Option<&str>,
) -> Result<Address, ConfigError> {
    let raw = match (env_map.get(key), default) {
        (Some(v), _) => v.as_str(),
        (None, Some(d)) => d,
        (None, None) => return Err(ConfigError::MissingEnv(key.to_string())),
    };
    Address::parse(raw).map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("INFURA_ID".to_string(), "abc123".to_string());
        map.insert(
            "ETH_ADDRESS".to_string(),
            "0x1111111111111111111111111111111111111111".to_string(),
        );
        map.insert("MIN_COLLATERAL_RATIO".to_string(), "1.10".to_string());
        map.insert("MAX_COLLATERAL_RATIO".to_string(), "3.0".to_string());
        map.insert("ETH_REDEMPTION_BUFFER".to_string(), "5".to_string());
        map.insert("PUSHOVER_USER".to_string(), "user".to_string());
        map.insert("PUSHOVER_TOKEN".to_string(), "token".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.rpc_url, "https://mainnet.infura.io/v3/abc123");
        assert_eq!(config.database_path, ".trove.db");
        assert_eq!(config.expected_oracle_decimals, 8);
        assert_eq!(config.watch_interval, None);
        assert_eq!(
            config.contracts.trove_manager,
            Address::parse(ContractAddresses::MAINNET_TROVE_MANAGER).unwrap()
        );

        let t = config.thresholds();
        assert_eq!(t.min_ratio, Decimal::from_str_canonical("1.1").unwrap());
        assert_eq!(t.max_ratio, Decimal::from_str_canonical("3").unwrap());
        assert_eq!(t.redemption_buffer, Decimal::from_str_canonical("5").unwrap());
    }

    #[test]
    fn test_rpc_url_takes_precedence() {
        let mut env_map = setup_required_env();
        env_map.insert("RPC_URL".to_string(), "http://localhost:8545".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.rpc_url, "http://localhost:8545");
    }

    #[test]
    fn test_missing_rpc() {
        let mut env_map = setup_required_env();
        env_map.remove("INFURA_ID");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "RPC_URL"),
            other => panic!("Expected MissingEnv error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_values() {
        for key in [
            "ETH_ADDRESS",
            "MIN_COLLATERAL_RATIO",
            "MAX_COLLATERAL_RATIO",
            "ETH_REDEMPTION_BUFFER",
            "PUSHOVER_USER",
            "PUSHOVER_TOKEN",
        ] {
            let mut env_map = setup_required_env();
            env_map.remove(key);
            match Config::from_env_map(env_map) {
                Err(ConfigError::MissingEnv(s)) => assert_eq!(s, key),
                other => panic!("Expected MissingEnv for {}, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn test_invalid_address() {
        let mut env_map = setup_required_env();
        env_map.insert("ETH_ADDRESS".to_string(), "0x1234".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "ETH_ADDRESS"),
            other => panic!("Expected InvalidValue error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_ratio() {
        let mut env_map = setup_required_env();
        env_map.insert("MIN_COLLATERAL_RATIO".to_string(), "one".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "MIN_COLLATERAL_RATIO"),
            other => panic!("Expected InvalidValue error, got {:?}", other),
        }
    }

    #[test]
    fn test_min_must_be_below_max() {
        let mut env_map = setup_required_env();
        env_map.insert("MIN_COLLATERAL_RATIO".to_string(), "3.0".to_string());
        assert!(matches!(
            Config::from_env_map(env_map),
            Err(ConfigError::InvalidValue(k, _)) if k == "MIN_COLLATERAL_RATIO"
        ));
    }

    #[test]
    fn test_negative_buffer_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("ETH_REDEMPTION_BUFFER".to_string(), "-1".to_string());
        assert!(matches!(
            Config::from_env_map(env_map),
            Err(ConfigError::InvalidValue(k, _)) if k == "ETH_REDEMPTION_BUFFER"
        ));
    }

    #[test]
    fn test_watch_interval() {
        let mut env_map = setup_required_env();
        env_map.insert("WATCH_INTERVAL_SECS".to_string(), "300".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.watch_interval, Some(Duration::from_secs(300)));

        let mut env_map = setup_required_env();
        env_map.insert("WATCH_INTERVAL_SECS".to_string(), "0".to_string());
        assert!(matches!(
            Config::from_env_map(env_map),
            Err(ConfigError::InvalidValue(k, _)) if k == "WATCH_INTERVAL_SECS"
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("token"));
        assert!(!printed.contains("abc123"));
    }
}

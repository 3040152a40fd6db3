use alloy::network::Ethereum;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use chrono_tz::Tz;
use std::str::FromStr;

use crate::error::FinderError;

pub const DEFAULT_EXPLORER_URL: &str = "https://api.etherscan.io";
pub const DEFAULT_BLOCK_TIME_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct FinderConfig {
    pub explorer_url: String,
    pub explorer_api_key: String,
    pub ethereum_rpc: String,
    pub block_time_secs: u64,
    pub timezone: Tz,
}

impl FinderConfig {
    pub fn from_env() -> Result<Self, FinderError> {
        dotenv::dotenv().ok();
        let explorer_api_key = std::env::var("ETHERSCAN_API_KEY")
            .map_err(|_| FinderError::Config("ETHERSCAN_API_KEY must be set".to_string()))?;
        let ethereum_rpc = std::env::var("ETHEREUM_RPC_URL")
            .or_else(|_| std::env::var("MAINNET_RPC_URL"))
            .map_err(|_| {
                FinderError::Config("ETHEREUM_RPC_URL or MAINNET_RPC_URL must be set".to_string())
            })?;
        let explorer_url = std::env::var("ETHERSCAN_API_URL")
            .unwrap_or_else(|_| DEFAULT_EXPLORER_URL.to_string());
        let block_time_secs = match std::env::var("BLOCK_TIME_SECS") {
            Ok(raw) => raw.parse::<u64>().ok().filter(|secs| *secs > 0).ok_or_else(|| {
                FinderError::Config(format!(
                    "BLOCK_TIME_SECS must be a positive integer, got {}",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_BLOCK_TIME_SECS,
        };
        let timezone = match std::env::var("DEFAULT_TIMEZONE") {
            Ok(name) => Tz::from_str(&name)
                .map_err(|_| FinderError::Config(format!("unrecognized timezone: {}", name)))?,
            Err(_) => Tz::UTC,
        };
        Ok(Self {
            explorer_url,
            explorer_api_key,
            ethereum_rpc,
            block_time_secs,
            timezone,
        })
    }
}

pub fn setup_provider(rpc_url: &str) -> Result<DynProvider<Ethereum>, FinderError> {
    let url = rpc_url
        .parse()
        .map_err(|e| FinderError::Config(format!("invalid RPC url {}: {}", rpc_url, e)))?;
    Ok(ProviderBuilder::new().connect_http(url).erased())
}

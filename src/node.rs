use alloy::network::Ethereum;
use alloy::providers::{DynProvider, Provider};
use alloy::transports::RpcError;
use serde::Deserialize;

use crate::error::FinderError;
use crate::explorer::parse_hex_quantity;

/// The slice of `eth_getBlockByNumber` the finder reads. Everything else in
/// the block object is ignored.
#[derive(Debug, Deserialize)]
struct RpcBlock {
    timestamp: String,
}

pub async fn block_timestamp(
    provider: &DynProvider<Ethereum>,
    number: u64,
) -> Result<u64, FinderError> {
    let tag = format!("0x{:x}", number);
    let block: Option<RpcBlock> = provider
        .raw_request("eth_getBlockByNumber".into(), (tag, false))
        .await
        .map_err(|e| match e {
            RpcError::DeserError { err, .. } => FinderError::Parse(err.to_string()),
            other => FinderError::Transport(other.to_string()),
        })?;
    match block {
        Some(block) => parse_hex_quantity(&block.timestamp),
        None => Err(FinderError::BlockNotFound(number)),
    }
}

pub async fn latest_block_number(provider: &DynProvider<Ethereum>) -> Result<u64, FinderError> {
    provider
        .get_block_number()
        .await
        .map_err(|e| FinderError::Transport(e.to_string()))
}

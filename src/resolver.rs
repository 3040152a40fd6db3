use alloy::network::Ethereum;
use alloy::providers::DynProvider;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::FinderError;
use crate::explorer::ExplorerClient;
use crate::node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub block_number: u64,
    pub is_estimate: bool,
}

pub struct BlockResolver {
    explorer: ExplorerClient,
    block_time_secs: u64,
}

impl BlockResolver {
    pub fn new(explorer: ExplorerClient, block_time_secs: u64) -> Self {
        Self {
            explorer,
            block_time_secs,
        }
    }

    /// Resolve a target instant to a block number. Past and present instants
    /// go through the explorer's exact lookup; strictly future instants are
    /// estimated from the current tip and the average block time.
    pub async fn resolve(&self, target: DateTime<Utc>) -> Result<Resolution, FinderError> {
        let target_ts = target.timestamp();
        if target_ts > Utc::now().timestamp() {
            let block_number = self.estimate_future(target_ts).await?;
            return Ok(Resolution {
                block_number,
                is_estimate: true,
            });
        }
        // Pre-1970 inputs clamp to the epoch; the explorer answers with the
        // genesis block for anything before the chain started.
        let block_number = self
            .explorer
            .block_by_timestamp(target_ts.max(0) as u64)
            .await?;
        Ok(Resolution {
            block_number,
            is_estimate: false,
        })
    }

    async fn estimate_future(&self, target_ts: i64) -> Result<u64, FinderError> {
        let tip = self.explorer.tip_block_number().await?;
        // Second wall-clock read; may lag the comparison read in resolve()
        // by a moment. The skew is accepted.
        let now_ts = Utc::now().timestamp();
        let estimated = estimate_from(tip, now_ts, target_ts, self.block_time_secs);
        debug!(tip, estimated, "estimated future block number");
        Ok(estimated)
    }
}

/// Linear extrapolation from the current tip: one block per
/// `block_time_secs`, rounded to the nearest whole block.
pub fn estimate_from(tip: u64, now_ts: i64, target_ts: i64, block_time_secs: u64) -> u64 {
    let seconds_difference = target_ts - now_ts;
    let estimated_blocks = (seconds_difference as f64 / block_time_secs as f64).round() as i64;
    tip.saturating_add_signed(estimated_blocks)
}

/// Reverse path: block number to the instant the chain recorded for it.
pub async fn resolve_timestamp(
    provider: &DynProvider<Ethereum>,
    block_number: u64,
) -> Result<DateTime<Utc>, FinderError> {
    let timestamp = node::block_timestamp(provider, block_number).await?;
    DateTime::from_timestamp(timestamp as i64, 0).ok_or_else(|| {
        FinderError::Parse(format!(
            "block {} carries an out-of-range timestamp: {}",
            block_number, timestamp
        ))
    })
}

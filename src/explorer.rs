use serde::Deserialize;
use tracing::debug;

use crate::error::FinderError;

/// Etherscan-style explorer client. Covers the two endpoints the finder
/// needs: block-by-timestamp lookup and the proxied chain tip.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ExplorerEnvelope {
    status: String,
    #[serde(default)]
    message: String,
    result: String,
}

#[derive(Debug, Deserialize)]
struct ProxyEnvelope {
    result: String,
}

impl ExplorerClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Closest block at or before the given Unix timestamp.
    pub async fn block_by_timestamp(&self, timestamp: u64) -> Result<u64, FinderError> {
        let url = format!(
            "{}/api?module=block&action=getblocknobytime&timestamp={}&closest=before&apikey={}",
            self.base_url, timestamp, self.api_key
        );
        debug!(timestamp, "requesting block number by timestamp");
        let body = self.get(&url).await?;
        let envelope: ExplorerEnvelope =
            serde_json::from_str(&body).map_err(|e| FinderError::Parse(e.to_string()))?;
        if envelope.status != "1" {
            return Err(FinderError::Upstream(envelope.message));
        }
        envelope.result.parse::<u64>().map_err(|_| {
            FinderError::Parse(format!(
                "explorer returned a non-numeric block number: {}",
                envelope.result
            ))
        })
    }

    /// Current tip block number via the explorer's node proxy. The proxy
    /// answers with a hex quantity.
    pub async fn tip_block_number(&self) -> Result<u64, FinderError> {
        let url = format!(
            "{}/api?module=proxy&action=eth_blockNumber&apikey={}",
            self.base_url, self.api_key
        );
        debug!("requesting current tip block number");
        let body = self.get(&url).await?;
        let envelope: ProxyEnvelope =
            serde_json::from_str(&body).map_err(|e| FinderError::Parse(e.to_string()))?;
        parse_hex_quantity(&envelope.result)
    }

    async fn get(&self, url: &str) -> Result<String, FinderError> {
        self.http
            .get(url)
            .send()
            .await
            .map_err(|e| FinderError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| FinderError::Transport(e.to_string()))?
            .text()
            .await
            .map_err(|e| FinderError::Transport(e.to_string()))
    }
}

pub(crate) fn parse_hex_quantity(raw: &str) -> Result<u64, FinderError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    u64::from_str_radix(digits, 16)
        .map_err(|_| FinderError::Parse(format!("malformed hex quantity: {}", raw)))
}

use alloy::network::Ethereum;
use alloy::providers::DynProvider;

use crate::error::FinderError;
use crate::explorer::ExplorerClient;
use crate::node;

pub async fn check_endpoints(
    explorer: &ExplorerClient,
    provider: &DynProvider<Ethereum>,
) -> Result<(), FinderError> {
    println!("Checking endpoint health...");

    let tip = explorer.tip_block_number().await?;
    println!("✓ Explorer reachable (tip: {})", tip);

    let rpc_tip = node::latest_block_number(provider).await?;
    println!("✓ RPC reachable (block: {})", rpc_tip);

    Ok(())
}

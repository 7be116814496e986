//! Cosmos-family (Tendermint/CometBFT RPC) probe queries.
//!
//! Methods: `status` → `sync_info.latest_block_height` (decimal string) and
//! `sync_info.catching_up`; `net_info` → `n_peers` (decimal string).

use std::time::Instant;

use serde_json::{json, Value};

use crate::probe::prober::{rpc_call, rpc_result, ChainSample};
use crate::probe::result::ProbeError;

pub(crate) async fn query(client: &reqwest::Client, url: &str) -> Result<ChainSample, ProbeError> {
    let started = Instant::now();
    let status = rpc_result(rpc_call(client, url, "status", json!([])).await?, "status")?;
    let height_rtt = started.elapsed();

    let sync_info = status
        .get("sync_info")
        .ok_or_else(|| ProbeError::Protocol("status: missing sync_info".into()))?;
    let height = parse_decimal_string(
        sync_info.get("latest_block_height"),
        "status.sync_info.latest_block_height",
    )?;
    let catching_up = sync_info
        .get("catching_up")
        .and_then(Value::as_bool)
        .ok_or_else(|| ProbeError::Protocol("status: missing catching_up".into()))?;

    let net_info = rpc_result(
        rpc_call(client, url, "net_info", json!([])).await?,
        "net_info",
    )?;
    let peers = parse_decimal_string(net_info.get("n_peers"), "net_info.n_peers")?;

    Ok(ChainSample {
        height: Some(height),
        syncing: Some(catching_up),
        peer_count: Some(peers),
        height_rtt,
    })
}

/// Tendermint encodes integers as decimal strings.
pub(crate) fn parse_decimal_string(value: Option<&Value>, field: &str) -> Result<u64, ProbeError> {
    let value = value.ok_or_else(|| ProbeError::Protocol(format!("missing field {field}")))?;
    let raw = value
        .as_str()
        .ok_or_else(|| ProbeError::Protocol(format!("{field}: expected string, got {value}")))?;
    raw.parse::<u64>()
        .map_err(|e| ProbeError::Protocol(format!("{field}: bad integer '{raw}': {e}")))
}

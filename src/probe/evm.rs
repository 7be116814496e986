//! EVM-family probe queries.
//!
//! Methods: `eth_blockNumber` (hex quantity), `eth_syncing` (false or a
//! progress object), `net_peerCount` (hex quantity).

use std::time::Instant;

use serde_json::{json, Value};

use crate::probe::prober::{rpc_call, rpc_result, ChainSample};
use crate::probe::result::ProbeError;

pub(crate) async fn query(client: &reqwest::Client, url: &str) -> Result<ChainSample, ProbeError> {
    let started = Instant::now();
    let height = rpc_result(
        rpc_call(client, url, "eth_blockNumber", json!([])).await?,
        "eth_blockNumber",
    )?;
    let height_rtt = started.elapsed();
    let height = parse_hex_quantity(&height, "eth_blockNumber")?;

    let syncing = rpc_result(
        rpc_call(client, url, "eth_syncing", json!([])).await?,
        "eth_syncing",
    )?;
    // false means fully synced; any object means a sync is in progress.
    let syncing = match syncing {
        Value::Bool(b) => b,
        Value::Object(_) => true,
        other => {
            return Err(ProbeError::Protocol(format!(
                "eth_syncing: unexpected value {other}"
            )))
        }
    };

    let peers = rpc_result(
        rpc_call(client, url, "net_peerCount", json!([])).await?,
        "net_peerCount",
    )?;
    let peers = parse_hex_quantity(&peers, "net_peerCount")?;

    Ok(ChainSample {
        height: Some(height),
        syncing: Some(syncing),
        peer_count: Some(peers),
        height_rtt,
    })
}

/// Parse an Ethereum hex quantity ("0x4b7") into a u64.
pub(crate) fn parse_hex_quantity(value: &Value, method: &str) -> Result<u64, ProbeError> {
    let raw = value
        .as_str()
        .ok_or_else(|| ProbeError::Protocol(format!("{method}: expected hex string, got {value}")))?;
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| ProbeError::Protocol(format!("{method}: missing 0x prefix in '{raw}'")))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| ProbeError::Protocol(format!("{method}: bad hex quantity '{raw}': {e}")))
}

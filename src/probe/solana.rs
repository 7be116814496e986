//! Solana-family probe queries.
//!
//! Methods: `getSlot` (number) and `getHealth`, which answers "ok" when the
//! node is within the cluster's slot distance and a JSON-RPC error when it
//! is behind; that error is sync-status data, not a failed probe. Solana
//! exposes no peer count, so that term is reported as unavailable.

use std::time::Instant;

use serde_json::json;

use crate::probe::prober::{rpc_call, rpc_result, ChainSample};
use crate::probe::result::ProbeError;

pub(crate) async fn query(client: &reqwest::Client, url: &str) -> Result<ChainSample, ProbeError> {
    let started = Instant::now();
    let slot = rpc_result(rpc_call(client, url, "getSlot", json!([])).await?, "getSlot")?;
    let height_rtt = started.elapsed();
    let slot = slot
        .as_u64()
        .ok_or_else(|| ProbeError::Protocol(format!("getSlot: expected number, got {slot}")))?;

    let health = rpc_call(client, url, "getHealth", json!([])).await?;
    let behind = match health.get("error") {
        Some(e) if !e.is_null() => true,
        _ => {
            let result = health
                .get("result")
                .ok_or_else(|| ProbeError::Protocol("getHealth: missing result".into()))?;
            if result != "ok" {
                return Err(ProbeError::Protocol(format!(
                    "getHealth: unexpected result {result}"
                )));
            }
            false
        }
    };

    Ok(ChainSample {
        height: Some(slot),
        syncing: Some(behind),
        peer_count: None,
        height_rtt,
    })
}

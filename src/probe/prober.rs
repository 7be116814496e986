//! Probe execution: one bounded JSON-RPC exchange per call.

use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::{json, Value};

use crate::config::{ChainFamily, UpstreamSpec};
use crate::probe::result::{ProbeError, ProbeResult};
use crate::probe::{cosmos, evm, solana};

/// What one chain-family query round yields.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChainSample {
    pub height: Option<u64>,
    pub syncing: Option<bool>,
    pub peer_count: Option<u64>,
    /// Round-trip of the block-height query specifically.
    pub height_rtt: Duration,
}

/// Stateless prober sharing one HTTP client across all upstreams.
///
/// Safe to call concurrently; each probe is an independent exchange and no
/// mutable state is shared between calls.
#[derive(Debug, Clone)]
pub struct Prober {
    client: reqwest::Client,
}

impl Prober {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Issue the chain-family-specific health queries against one upstream.
    ///
    /// Never blocks past `timeout` and never returns an error: probing
    /// failure is ordinary data, classified inside the result.
    pub async fn probe(&self, spec: &UpstreamSpec, seq: u64, timeout: Duration) -> ProbeResult {
        let started = Instant::now();
        let query = self.query(spec);

        match tokio::time::timeout(timeout, query).await {
            Ok(Ok(sample)) => ProbeResult {
                seq,
                timestamp: Utc::now(),
                latency: sample.height_rtt,
                height: sample.height,
                syncing: sample.syncing,
                peer_count: sample.peer_count,
                error: None,
            },
            Ok(Err(error)) => {
                tracing::debug!(address = %spec.address, error = %error, "probe failed");
                ProbeResult::failure(seq, error, started.elapsed())
            }
            Err(_) => {
                tracing::debug!(address = %spec.address, timeout_ms = timeout.as_millis() as u64, "probe timed out");
                ProbeResult::failure(
                    seq,
                    ProbeError::Timeout(timeout.as_millis() as u64),
                    started.elapsed(),
                )
            }
        }
    }

    async fn query(&self, spec: &UpstreamSpec) -> Result<ChainSample, ProbeError> {
        match spec.chain_family {
            ChainFamily::Evm => evm::query(&self.client, &spec.address).await,
            ChainFamily::Cosmos => cosmos::query(&self.client, &spec.address).await,
            ChainFamily::Solana => solana::query(&self.client, &spec.address).await,
        }
    }
}

impl Default for Prober {
    fn default() -> Self {
        Self::new()
    }
}

/// Send one JSON-RPC call and return the full response document.
pub(crate) async fn rpc_call(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: Value,
) -> Result<Value, ProbeError> {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    });

    let response = client
        .post(url)
        .json(&body)
        .send()
        .await
        .map_err(|e| ProbeError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProbeError::Protocol(format!(
            "{method}: unexpected status {status}"
        )));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ProbeError::Protocol(format!("{method}: invalid JSON: {e}")))
}

/// Extract the `result` field, mapping a JSON-RPC error object to a protocol
/// failure.
pub(crate) fn rpc_result(response: Value, method: &str) -> Result<Value, ProbeError> {
    if let Some(error) = response.get("error") {
        if !error.is_null() {
            return Err(ProbeError::Protocol(format!("{method}: node error: {error}")));
        }
    }
    response
        .get("result")
        .cloned()
        .ok_or_else(|| ProbeError::Protocol(format!("{method}: missing result")))
}

//! Shared utilities for integration testing: a programmable mock EVM node
//! speaking just enough JSON-RPC over raw TCP for the prober.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Initialize test logging; honors RUST_LOG, safe to call repeatedly.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Handle to a running mock node. Mutating the atomics changes what
/// subsequent probes observe.
pub struct MockEvmNode {
    pub addr: SocketAddr,
    pub height: Arc<AtomicU64>,
    pub syncing: Arc<AtomicBool>,
    pub peers: Arc<AtomicU64>,
    pub response_delay_ms: Arc<AtomicU64>,
}

impl MockEvmNode {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Start a mock EVM node answering `eth_blockNumber`, `eth_syncing` and
/// `net_peerCount` with the current atomics.
pub async fn start_mock_evm_node(initial_height: u64) -> MockEvmNode {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let height = Arc::new(AtomicU64::new(initial_height));
    let syncing = Arc::new(AtomicBool::new(false));
    let peers = Arc::new(AtomicU64::new(10));
    let response_delay_ms = Arc::new(AtomicU64::new(0));

    let node = MockEvmNode {
        addr,
        height: height.clone(),
        syncing: syncing.clone(),
        peers: peers.clone(),
        response_delay_ms: response_delay_ms.clone(),
    };

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let height = height.clone();
                    let syncing = syncing.clone();
                    let peers = peers.clone();
                    let delay = response_delay_ms.clone();
                    tokio::spawn(async move {
                        handle_connection(socket, height, syncing, peers, delay).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    node
}

async fn handle_connection(
    mut socket: TcpStream,
    height: Arc<AtomicU64>,
    syncing: Arc<AtomicBool>,
    peers: Arc<AtomicU64>,
    delay: Arc<AtomicU64>,
) {
    let Some(body) = read_request_body(&mut socket).await else {
        return;
    };
    let method = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("method").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_default();

    let delay_ms = delay.load(Ordering::Relaxed);
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    let result = match method.as_str() {
        "eth_blockNumber" => format!("\"0x{:x}\"", height.load(Ordering::Relaxed)),
        "eth_syncing" => {
            if syncing.load(Ordering::Relaxed) {
                "{\"startingBlock\":\"0x0\",\"currentBlock\":\"0x1\"}".to_string()
            } else {
                "false".to_string()
            }
        }
        "net_peerCount" => format!("\"0x{:x}\"", peers.load(Ordering::Relaxed)),
        _ => "null".to_string(),
    };

    let body = format!("{{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}}", result);
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Read one HTTP request and return its body.
async fn read_request_body(socket: &mut TcpStream) -> Option<String> {
    let mut buf: Vec<u8> = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        if let Some(header_end) = find_subsequence(&buf, b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let body_start = header_end + 4;
            while buf.len() < body_start + content_length {
                let n = socket.read(&mut chunk).await.ok()?;
                if n == 0 {
                    return None;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let body = &buf[body_start..body_start + content_length];
            return Some(String::from_utf8_lossy(body).into_owned());
        }

        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

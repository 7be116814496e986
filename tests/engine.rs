//! End-to-end tests: probe loops against mock nodes, through classification
//! and selection.

use std::time::Duration;

use rpc_steer::health::HealthState;
use rpc_steer::{
    ChainFamily, Engine, HealthChange, PoolConfig, RequestContext, SelectError, SelectionPolicy,
    UpstreamProvider, UpstreamSpec,
};

mod common;

fn fast_config() -> PoolConfig {
    PoolConfig {
        probe_interval_ms: 100,
        probe_timeout_ms: 100,
        promote_after_n_successes: 2,
        demote_after_n_failures: 2,
        max_block_lag: 5,
        max_latency_ms: 2_000,
        min_peer_count: 1,
        selection_policy: SelectionPolicy::HighestBlock,
        fail_open: false,
    }
}

/// Poll until `predicate` holds on the status snapshot, up to ~5s.
async fn wait_for(engine: &Engine, predicate: impl Fn(&rpc_steer::PoolSnapshot) -> bool) -> bool {
    for _ in 0..100 {
        if predicate(&engine.status()) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_converges_and_selects_highest_block() {
    common::init_tracing();
    let tall = common::start_mock_evm_node(100).await;
    let short = common::start_mock_evm_node(95).await;

    let engine = Engine::new(
        fast_config(),
        vec![
            UpstreamSpec::new(tall.url(), ChainFamily::Evm),
            UpstreamSpec::new(short.url(), ChainFamily::Evm),
        ],
    )
    .unwrap();
    let mut events = engine.subscribe_events();
    engine.start();

    let converged = wait_for(&engine, |s| {
        s.upstreams.len() == 2 && s.upstreams.iter().all(|u| u.state == HealthState::Healthy)
    })
    .await;
    assert!(converged, "both upstreams should classify Healthy");

    // Highest block wins; height 95 is within max_block_lag so it stays
    // Healthy but loses selection.
    let picked = engine.select().unwrap();
    assert_eq!(picked.address, tall.url());
    assert_eq!(picked.height, Some(100));

    // The provider surface lists the loser as failover.
    let candidates = engine.get_upstreams(&RequestContext::empty()).unwrap();
    assert_eq!(candidates[0], tall.url());
    assert!(candidates.contains(&short.url()));

    // Unknown → Healthy transition was announced.
    let change: HealthChange = events.recv().await.unwrap();
    assert_eq!(change.new_state, HealthState::Healthy);

    engine.stop().await;
}

#[tokio::test]
async fn test_syncing_node_loses_selection() {
    let synced = common::start_mock_evm_node(100).await;
    let lagging = common::start_mock_evm_node(100).await;
    lagging
        .syncing
        .store(true, std::sync::atomic::Ordering::Relaxed);

    let engine = Engine::new(
        fast_config(),
        vec![
            UpstreamSpec::new(synced.url(), ChainFamily::Evm),
            UpstreamSpec::new(lagging.url(), ChainFamily::Evm),
        ],
    )
    .unwrap();
    engine.start();

    let settled = wait_for(&engine, |s| {
        s.get(&synced.url()).map(|u| u.state) == Some(HealthState::Healthy)
            && s.get(&lagging.url()).map(|u| u.state)
                == Some(HealthState::Unhealthy)
    })
    .await;
    assert!(settled, "syncing node should classify Unhealthy");

    assert_eq!(engine.select().unwrap().address, synced.url());
    engine.stop().await;
}

#[tokio::test]
async fn test_fleet_outage_fails_closed() {
    // Port 1 refuses connections.
    let engine = Engine::new(
        fast_config(),
        vec![UpstreamSpec::new("http://127.0.0.1:1", ChainFamily::Evm)],
    )
    .unwrap();
    engine.start();

    let down = wait_for(&engine, |s| {
        s.upstreams[0].state == HealthState::Unhealthy
    })
    .await;
    assert!(down);

    assert_eq!(engine.select(), Err(SelectError::NoHealthyUpstream));
    assert_eq!(
        engine.get_upstreams(&RequestContext::empty()),
        Err(SelectError::NoHealthyUpstream)
    );
    engine.stop().await;
}

#[tokio::test]
async fn test_fail_open_serves_unhealthy_as_last_resort() {
    let config = PoolConfig {
        fail_open: true,
        ..fast_config()
    };
    let engine = Engine::new(
        config,
        vec![UpstreamSpec::new("http://127.0.0.1:1", ChainFamily::Evm)],
    )
    .unwrap();
    engine.start();

    wait_for(&engine, |s| {
        s.upstreams[0].state == HealthState::Unhealthy
    })
    .await;

    // Availability over correctness: the unhealthy node is still offered.
    assert_eq!(engine.select().unwrap().address, "http://127.0.0.1:1");
    engine.stop().await;
}

#[tokio::test]
async fn test_deregister_discards_in_flight_probe() {
    common::init_tracing();
    let node = common::start_mock_evm_node(100).await;
    // Slow responses keep a probe in flight while we deregister.
    node.response_delay_ms
        .store(300, std::sync::atomic::Ordering::Relaxed);

    let config = PoolConfig {
        probe_interval_ms: 500,
        probe_timeout_ms: 500,
        ..fast_config()
    };
    let engine = Engine::new(
        config,
        vec![UpstreamSpec::new(node.url(), ChainFamily::Evm)],
    )
    .unwrap();
    engine.start();

    // First probe is issued immediately and is now waiting on the node.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(engine.deregister(&node.url()));
    assert!(engine.status().get(&node.url()).is_none());

    // Give the late result every chance to land; it must stay discarded.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(engine.status().get(&node.url()).is_none());
    assert_eq!(engine.status().len(), 0);

    engine.stop().await;
}

#[tokio::test]
async fn test_dynamic_registration_starts_probing() {
    let engine = Engine::new(fast_config(), vec![]).unwrap();
    engine.start();
    assert_eq!(engine.select(), Err(SelectError::NoHealthyUpstream));

    let node = common::start_mock_evm_node(42).await;
    assert!(engine.register(UpstreamSpec::new(node.url(), ChainFamily::Evm)));

    let healthy = wait_for(&engine, |s| {
        s.get(&node.url()).map(|u| u.state) == Some(HealthState::Healthy)
    })
    .await;
    assert!(healthy, "newly registered upstream should be probed immediately");
    assert_eq!(engine.select().unwrap().height, Some(42));

    engine.stop().await;
}

//! Latency-based selection strategies.

use std::time::Duration;

use crate::pool::UpstreamView;
use crate::selector::highest_block::stable_hash;

/// Deterministic variant: lowest observed latency, ties broken by stable
/// address hash.
pub(crate) fn pick_min<'a>(candidates: &[&'a UpstreamView]) -> Option<&'a UpstreamView> {
    candidates.iter().copied().min_by(|a, b| {
        a.latency
            .unwrap_or(Duration::MAX)
            .cmp(&b.latency.unwrap_or(Duration::MAX))
            .then_with(|| stable_hash(&a.address).cmp(&stable_hash(&b.address)))
    })
}

/// Probabilistic variant: weight inversely proportional to latency. The only
/// intentionally random pick in the crate; opted into by configuration.
pub(crate) fn pick_weighted<'a>(candidates: &[&'a UpstreamView]) -> Option<&'a UpstreamView> {
    if candidates.is_empty() {
        return None;
    }
    let weights: Vec<f64> = candidates.iter().map(|u| weight(u)).collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return candidates.first().copied();
    }

    let mut remaining = fastrand::f64() * total;
    for (candidate, weight) in candidates.iter().copied().zip(&weights) {
        remaining -= weight;
        if remaining <= 0.0 {
            return Some(candidate);
        }
    }
    candidates.last().copied()
}

fn weight(view: &UpstreamView) -> f64 {
    let millis = view
        .latency
        .unwrap_or(Duration::from_secs(60))
        .as_millis()
        .max(1) as f64;
    1.0 / millis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainFamily;
    use crate::health::HealthState;

    fn view(address: &str, latency_ms: u64) -> UpstreamView {
        UpstreamView {
            address: address.to_string(),
            chain_family: ChainFamily::Evm,
            state: HealthState::Healthy,
            score: 90.0,
            height: Some(100),
            latency: Some(Duration::from_millis(latency_ms)),
            last_probe_at: None,
        }
    }

    #[test]
    fn test_min_latency_wins() {
        let a = view("http://a:8545", 80);
        let b = view("http://b:8545", 10);
        let c = view("http://c:8545", 40);
        assert_eq!(pick_min(&[&a, &b, &c]).unwrap().address, "http://b:8545");
    }

    #[test]
    fn test_missing_latency_ranks_last() {
        let mut a = view("http://a:8545", 0);
        a.latency = None;
        let b = view("http://b:8545", 500);
        assert_eq!(pick_min(&[&a, &b]).unwrap().address, "http://b:8545");
    }

    #[test]
    fn test_weighted_pick_returns_candidate() {
        let a = view("http://a:8545", 10);
        let b = view("http://b:8545", 1000);
        for _ in 0..50 {
            let picked = pick_weighted(&[&a, &b]).unwrap();
            assert!(picked.address == a.address || picked.address == b.address);
        }
    }
}

//! Highest-block selection strategy.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use crate::pool::UpstreamView;

/// Pick the candidate with the greatest observed block height. Ties break by
/// lowest latency, then by a stable hash of the address so the choice is
/// deterministic without biasing toward lexicographic order.
pub(crate) fn pick<'a>(candidates: &[&'a UpstreamView]) -> Option<&'a UpstreamView> {
    candidates.iter().copied().max_by(|a, b| {
        a.height
            .unwrap_or(0)
            .cmp(&b.height.unwrap_or(0))
            .then_with(|| {
                let a_latency = a.latency.unwrap_or(Duration::MAX);
                let b_latency = b.latency.unwrap_or(Duration::MAX);
                b_latency.cmp(&a_latency) // lower latency wins
            })
            .then_with(|| stable_hash(&a.address).cmp(&stable_hash(&b.address)))
    })
}

/// Process-stable address hash (fixed-key SipHash).
pub(crate) fn stable_hash(address: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    address.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainFamily;
    use crate::health::HealthState;

    fn view(address: &str, height: u64, latency_ms: u64) -> UpstreamView {
        UpstreamView {
            address: address.to_string(),
            chain_family: ChainFamily::Evm,
            state: HealthState::Healthy,
            score: 90.0,
            height: Some(height),
            latency: Some(Duration::from_millis(latency_ms)),
            last_probe_at: None,
        }
    }

    #[test]
    fn test_greatest_height_wins() {
        let a = view("http://a:8545", 100, 80);
        let b = view("http://b:8545", 95, 10);
        let picked = pick(&[&a, &b]).unwrap();
        assert_eq!(picked.address, "http://a:8545");
    }

    #[test]
    fn test_height_tie_breaks_on_latency() {
        let a = view("http://a:8545", 100, 80);
        let b = view("http://b:8545", 100, 10);
        let picked = pick(&[&a, &b]).unwrap();
        assert_eq!(picked.address, "http://b:8545");
    }

    #[test]
    fn test_full_tie_is_deterministic() {
        let a = view("http://a:8545", 100, 10);
        let b = view("http://b:8545", 100, 10);
        let first = pick(&[&a, &b]).unwrap().address.clone();
        for _ in 0..10 {
            assert_eq!(pick(&[&a, &b]).unwrap().address, first);
            assert_eq!(pick(&[&b, &a]).unwrap().address, first);
        }
    }
}

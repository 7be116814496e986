//! Probe pacing: interval, jitter and failure backoff.

use std::time::Duration;

/// Backoff stops growing at base × 2^3.
const MAX_BACKOFF_SHIFT: u32 = 3;

/// Delay until the next probe of one upstream.
///
/// Doubles per consecutive failed probe up to eight times the base interval,
/// bounding pressure on a node that is down without starving it of the
/// chance to recover; the caller resets `failed_probes` on the first
/// success. Jitter is uniform in [0, base/10) so probe loops spread out.
pub fn probe_delay(base: Duration, failed_probes: u32) -> Duration {
    let multiplier = 1u32 << failed_probes.min(MAX_BACKOFF_SHIFT);
    let delay = base.saturating_mul(multiplier);

    let jitter_range = base.as_millis() as u64 / 10;
    let jitter = if jitter_range > 0 {
        Duration::from_millis(fastrand::u64(0..jitter_range))
    } else {
        Duration::ZERO
    };

    delay + jitter
}

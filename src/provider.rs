//! Upstream-provider contract consumed by the host proxy.

use crate::selector::SelectError;

/// Request-scoped hints the host proxy may pass through. All fields are
/// optional; current policies select on pool state alone.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// JSON-RPC method of the proxied request, when known.
    pub method: Option<String>,
    /// Client identity, for hosts that log or rate-limit per caller.
    pub client: Option<String>,
}

impl RequestContext {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// The extension point a reverse proxy calls on its hot path.
///
/// Returns candidate addresses in preference order: the policy's pick first,
/// then the remaining selectable upstreams as failover targets. Errors with
/// [`SelectError::NoHealthyUpstream`] when the pool has nothing servable;
/// the host decides how to answer the client (typically 503).
pub trait UpstreamProvider: Send + Sync {
    fn get_upstreams(&self, ctx: &RequestContext) -> Result<Vec<String>, SelectError>;
}

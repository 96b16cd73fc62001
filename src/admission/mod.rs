//! Admission controller — per-caller sliding-window rate limiting.
//!
//! Every synthesis attempt passes through `admit` before any validation or
//! generation work. Store failures fail closed.

pub mod store;

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use tracing::{debug, warn};

use crate::error::ConfigError;

pub use store::{CounterStore, InMemoryCounterStore, spawn_sweep_task};

/// Who is making a request, as far as the network tells us.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CallerIdentity {
    Address(IpAddr),
    /// A named local caller, e.g. the CLI.
    Named(String),
    Unknown,
}

impl CallerIdentity {
    /// Derive identity from the socket peer, or from forwarding headers when
    /// the service sits behind a trusted proxy.
    ///
    /// With `trust_forwarded`, `X-Forwarded-For` is read first-hop and
    /// `X-Real-IP` is the next choice. Without it both are ignored.
    pub fn from_request(
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
        trust_forwarded: bool,
    ) -> Self {
        let peer = peer.map(|p| p.ip());
        if !trust_forwarded {
            return peer.map_or(Self::Unknown, Self::Address);
        }

        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());
        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<IpAddr>().ok())
        };

        forwarded
            .or_else(real_ip)
            .or(peer)
            .map_or(Self::Unknown, Self::Address)
    }

    /// Counter-store key. Prefixed per variant so a name never collides with
    /// an address or with the unknown bucket.
    pub fn bucket_key(&self) -> String {
        match self {
            Self::Address(ip) => format!("ip:{ip}"),
            Self::Named(name) => format!("name:{name}"),
            Self::Unknown => "unknown".to_string(),
        }
    }
}

impl std::fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Address(ip) => write!(f, "{ip}"),
            Self::Named(name) => write!(f, "{name}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

/// What to do with callers whose origin is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// All unknown callers share one bucket.
    #[default]
    SharedBucket,
    /// Unknown callers are always throttled.
    Deny,
}

impl FromStr for FallbackPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(Self::SharedBucket),
            "deny" => Ok(Self::Deny),
            other => Err(ConfigError::InvalidValue {
                key: "JIUM_UNKNOWN_CALLER".to_string(),
                message: format!("unknown policy '{other}' (expected shared or deny)"),
            }),
        }
    }
}

/// Admission limits.
#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    /// Attempts allowed per identity per window.
    pub max_requests: u32,
    pub window: Duration,
    pub fallback: FallbackPolicy,
    /// Read caller addresses from `X-Forwarded-For` / `X-Real-IP`. Only safe
    /// behind a proxy that overwrites those headers.
    pub trust_forwarded: bool,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
            fallback: FallbackPolicy::SharedBucket,
            trust_forwarded: false,
        }
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Throttled,
}

/// Gates synthesis attempts per caller.
pub struct AdmissionController {
    store: Arc<dyn CounterStore>,
    config: AdmissionConfig,
}

impl AdmissionController {
    pub fn new(store: Arc<dyn CounterStore>, config: AdmissionConfig) -> Self {
        Self { store, config }
    }

    /// Whether callers are identified by forwarding headers.
    pub fn trusts_forwarded(&self) -> bool {
        self.config.trust_forwarded
    }

    /// Count one attempt for `caller` and decide whether it may proceed.
    pub async fn admit(&self, caller: &CallerIdentity) -> Admission {
        if *caller == CallerIdentity::Unknown && self.config.fallback == FallbackPolicy::Deny {
            debug!("Unknown caller denied by fallback policy");
            return Admission::Throttled;
        }

        let key = caller.bucket_key();
        match self
            .store
            .check_and_increment(&key, self.config.max_requests, self.config.window)
            .await
        {
            Ok(true) => Admission::Allowed,
            Ok(false) => {
                debug!(caller = %key, limit = self.config.max_requests, "Caller throttled");
                Admission::Throttled
            }
            Err(e) => {
                warn!(caller = %key, error = %e, "Admission store failed, throttling");
                Admission::Throttled
            }
        }
    }
}

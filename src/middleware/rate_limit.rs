use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::{
    net::SocketAddr,
    num::NonZeroU32,
    sync::{Arc, Weak},
    time::Duration,
};
use tracing::{debug, warn};

use schoolhouse_config::RateLimitConfig;
use schoolhouse_core::AppError;

const UPKEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Token bucket per client IP.
pub struct AuthRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    trust_proxy: bool,
}

impl AuthRateLimiter {
    /// Returns `None` when limiting is disabled.
    pub fn from_config(config: &RateLimitConfig) -> Option<Arc<Self>> {
        if !config.enabled {
            return None;
        }

        let per_second = NonZeroU32::new(config.auth_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(config.auth_burst_size).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::per_second(per_second).allow_burst(burst);

        Some(Arc::new(Self {
            limiter: RateLimiter::keyed(quota),
            trust_proxy: config.trust_proxy,
        }))
    }

    pub fn check(&self, key: &str) -> bool {
        self.limiter.check_key(&key.to_string()).is_ok()
    }

    /// Number of client keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }

    /// Drops keys whose bucket has fully refilled.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Prunes stale keys every minute until the limiter is dropped.
    /// Does nothing outside a Tokio runtime.
    pub fn spawn_upkeep(self: &Arc<Self>) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let weak: Weak<Self> = Arc::downgrade(self);

        handle.spawn(async move {
            let mut interval = tokio::time::interval(UPKEEP_INTERVAL);
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(limiter) = weak.upgrade() else {
                    break;
                };
                limiter.prune();
                debug!(keys = limiter.tracked_keys(), "Pruned auth rate limiter");
            }
        });
    }

    fn key_for(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        if self.trust_proxy {
            client_key(headers, peer)
        } else {
            peer_key(peer)
        }
    }
}

fn peer_key(peer: Option<SocketAddr>) -> String {
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// First `X-Forwarded-For` entry, then `X-Real-IP`, then the peer address.
/// Only meaningful behind a proxy that sets these headers itself.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .map(str::to_string)
        .unwrap_or_else(|| peer_key(peer))
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<AuthRateLimiter>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = limiter.key_for(req.headers(), peer);

    if !limiter.check(&key) {
        warn!(client = %key, path = %req.uri().path(), "Rate limit exceeded");
        return Err(AppError::rate_limited());
    }

    Ok(next.run(req).await)
}

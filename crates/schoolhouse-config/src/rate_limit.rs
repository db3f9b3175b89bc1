use crate::{env_flag, env_or};

/// Throttling applied to `/api/auth/*`, keyed by client IP.
///
/// The key is the peer address unless `trust_proxy` is set, in which case
/// `X-Forwarded-For` / `X-Real-IP` win. Only enable that behind a proxy
/// that overwrites those headers.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub trust_proxy: bool,
    /// Tokens replenished per second
    pub auth_per_second: u32,
    /// Requests allowed in a burst before throttling starts
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trust_proxy: false,
            auth_per_second: 10,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: env_flag("RATE_LIMIT_ENABLED", defaults.enabled),
            trust_proxy: env_flag("RATE_LIMIT_TRUST_PROXY", defaults.trust_proxy),
            auth_per_second: env_or("RATE_LIMIT_AUTH_PER_SECOND", defaults.auth_per_second),
            auth_burst_size: env_or("RATE_LIMIT_AUTH_BURST_SIZE", defaults.auth_burst_size),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

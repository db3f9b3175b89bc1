//! # Schoolhouse Config
//!
//! Configuration loaded from environment variables (a `.env` file is read by
//! the binaries before any of these are constructed).
//!
//! - [`cors`]: allowed browser origins
//! - [`database`]: connection string and pool size
//! - [`jwt`]: token signing secret and lifetime
//! - [`rate_limit`]: throttling of the authentication endpoints
//! - [`server`]: bind address and startup behaviour

pub mod cors;
pub mod database;
pub mod jwt;
pub mod rate_limit;
pub mod server;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;

use std::str::FromStr;

/// Reads `key` and parses it, falling back to `default` when the variable is
/// unset or unparsable.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Interprets common truthy/falsy spellings; anything else yields `default`.
pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_when_unset() {
        let value: u32 = env_or("SCHOOLHOUSE_TEST_SURELY_UNSET_VAR", 42);
        assert_eq!(value, 42);
    }

    #[test]
    fn test_env_flag_falls_back_when_unset() {
        assert!(env_flag("SCHOOLHOUSE_TEST_SURELY_UNSET_FLAG", true));
        assert!(!env_flag("SCHOOLHOUSE_TEST_SURELY_UNSET_FLAG", false));
    }
}

use std::env;

use crate::{env_flag, env_or};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Apply pending migrations before serving
    pub run_migrations: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            run_migrations: true,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("APP_HOST").unwrap_or(defaults.host),
            port: env_or("APP_PORT", defaults.port),
            run_migrations: env_flag("RUN_MIGRATIONS", defaults.run_migrations),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

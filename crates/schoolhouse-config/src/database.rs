use anyhow::Context;
use std::env;

use crate::env_or;

/// PostgreSQL connection settings.
///
/// `DATABASE_URL` is required; `DATABASE_MAX_CONNECTIONS` defaults to 10.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        Ok(Self {
            url,
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
        })
    }
}

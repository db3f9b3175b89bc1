use sqlx::PgPool;

use schoolhouse_config::{
    CorsConfig, DatabaseConfig, JwtConfig, RateLimitConfig, ServerConfig,
};
use schoolhouse_db::init_db_pool;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
}

/// Builds the state from the environment and connects the pool.
pub async fn init_app_state() -> anyhow::Result<AppState> {
    let database_config = DatabaseConfig::from_env()?;
    let server_config = ServerConfig::from_env();

    let db = init_db_pool(&database_config).await?;
    if server_config.run_migrations {
        schoolhouse_db::run_migrations(&db).await?;
    }

    Ok(AppState {
        db,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        rate_limit_config: RateLimitConfig::from_env(),
    })
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower_cookies::Key;

use crate::{auth::provider::ProviderRegistry, cache::ResponseCache, config::AppConfig, middleware::RateLimiter};

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub http: reqwest::Client,
    pub cookie_key: Key,
    pub providers: Arc<ProviderRegistry>,
    pub question_cache: Arc<ResponseCache>,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        Ok(Self::from_parts(db, config)?)
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()
            .context("build http client")?;

        let cookie_key = Key::derive_from(config.session_secret.as_bytes());
        let providers = Arc::new(ProviderRegistry::from_config(&config));
        let question_cache = Arc::new(ResponseCache::new(Duration::from_secs(
            config.cache_ttl_secs,
        )));
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit_max,
            Duration::from_secs(config.rate_limit_window_secs),
        ));

        Ok(Self {
            db,
            config,
            http,
            cookie_key,
            providers,
            question_cache,
            limiter,
        })
    }

    /// State backed by a lazy pool that never connects; for handler tests
    /// that must not reach the database.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(crate::config::test_config());
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool ok");
        Self::from_parts(db, config).expect("fake state")
    }
}

use bb8_redis::{RedisConnectionManager, bb8};
use girder_core::GirderError;
use girder_core::settings::RedisConfig;
use std::time::Duration;
use tracing::debug;

/// bb8-backed Redis pool.
#[derive(Clone)]
pub struct RedisStore {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl RedisStore {
    /// Build a pool from config; connections are opened on first checkout.
    pub async fn connect(config: &RedisConfig) -> Result<Self, GirderError> {
        let manager = RedisConnectionManager::new(config.url())
            .map_err(|e| GirderError::Store(format!("invalid redis url: {e}")))?;
        let pool = bb8::Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build(manager)
            .await
            .map_err(|e| GirderError::Store(format!("could not build redis pool: {e}")))?;

        debug!(host = %config.host, port = config.port, db = config.db, "Redis pool created");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &bb8::Pool<RedisConnectionManager> {
        &self.pool
    }

    /// PING the server; suitable as a readiness check.
    pub async fn ping(&self) -> Result<(), String> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| format!("could not reach redis: {e}"))?;
        let _pong: String = bb8_redis::redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| format!("could not reach redis: {e}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_does_not_require_a_live_server() {
        let config = RedisConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            connect_timeout_secs: 1,
            ..RedisConfig::default()
        };
        assert!(RedisStore::connect(&config).await.is_ok());
    }

    #[tokio::test]
    async fn ping_against_dead_host_reports_failure() {
        let config = RedisConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            connect_timeout_secs: 1,
            ..RedisConfig::default()
        };
        let store = RedisStore::connect(&config).await.unwrap();
        let err = store.ping().await.unwrap_err();
        assert!(err.contains("could not reach redis"));
    }
}

use girder_core::GirderError;
use girder_core::settings::PostgresConfig;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Lazily-connected Postgres pool.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Build a pool from config without dialing the database.
    pub fn connect(config: &PostgresConfig) -> Result<Self, GirderError> {
        let ssl_mode = PgSslMode::from_str(&config.sslmode)
            .map_err(|e| GirderError::Store(format!("invalid sslmode {:?}: {e}", config.sslmode)))?;

        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .database(&config.dbname)
            .ssl_mode(ssl_mode);
        if !config.password.is_empty() {
            options = options.password(&config.password);
        }
        if !config.fallback_application_name.is_empty() {
            options = options.application_name(&config.fallback_application_name);
        }
        if !config.sslrootcert.is_empty() {
            options = options.ssl_root_cert(&config.sslrootcert);
        }
        if !config.sslcert.is_empty() {
            options = options.ssl_client_cert(&config.sslcert);
        }
        if !config.sslkey.is_empty() {
            options = options.ssl_client_key(&config.sslkey);
        }

        let mut builder = PgPoolOptions::new();
        if config.connect_timeout_secs > 0 {
            builder = builder.acquire_timeout(Duration::from_secs(config.connect_timeout_secs));
        }
        let pool = builder.connect_lazy_with(options);

        debug!(host = %config.host, port = config.port, dbname = %config.dbname, "Postgres pool created");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial query; suitable as a readiness check.
    pub async fn ping(&self) -> Result<(), String> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| format!("could not reach postgres: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_is_lazy_and_does_not_dial() {
        // Nothing listens on this port; construction must still succeed.
        let config = PostgresConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..PostgresConfig::default()
        };
        assert!(PostgresStore::connect(&config).is_ok());
    }

    #[test]
    fn invalid_sslmode_is_rejected() {
        let config = PostgresConfig {
            sslmode: "sideways".to_string(),
            ..PostgresConfig::default()
        };
        let err = PostgresStore::connect(&config).unwrap_err();
        assert!(err.to_string().contains("sslmode"));
    }

    #[tokio::test]
    async fn ping_against_dead_host_reports_failure() {
        let config = PostgresConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            connect_timeout_secs: 1,
            ..PostgresConfig::default()
        };
        let store = PostgresStore::connect(&config).unwrap();
        let err = store.ping().await.unwrap_err();
        assert!(err.contains("could not reach postgres"));
    }
}

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level service settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub queue: QueueConfig,
}

/// Application identity attached to every log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_app_version")]
    pub version: String,
    #[serde(default = "default_environment")]
    pub environment: String,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    #[serde(default = "default_header_timeout")]
    pub read_header_timeout_secs: u64,
    #[serde(default = "default_header_timeout")]
    pub write_timeout_secs: u64,
    #[serde(default = "default_read_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_header_bytes")]
    pub max_header_bytes: usize,
}

/// Logger mode plus the request-log header exclusion list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// "production" (JSON), "development" (pretty) or "nop".
    #[serde(default = "default_logger_mode")]
    pub mode: String,
    /// Request headers never written to the request log (exact name match).
    #[serde(default)]
    pub excluded_headers: Vec<String>,
}

/// Prometheus settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// When false, no counters are registered or updated.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// Postgres connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    #[serde(default = "default_postgres_db")]
    pub dbname: String,
    #[serde(default = "default_postgres_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_localhost")]
    pub host: String,
    #[serde(default = "default_postgres_port")]
    pub port: u16,
    #[serde(default = "default_sslmode")]
    pub sslmode: String,
    /// application_name for postgres to fall back to if one is not provided.
    #[serde(default)]
    pub fallback_application_name: String,
    /// Maximum wait for connection in seconds, 0 means wait indefinitely.
    #[serde(default)]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub sslcert: String,
    #[serde(default)]
    pub sslkey: String,
    #[serde(default)]
    pub sslrootcert: String,
}

/// Redis connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_localhost")]
    pub host: String,
    #[serde(default = "default_redis_port")]
    pub port: u16,
    #[serde(default)]
    pub db: i64,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_redis_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Queue consumer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Name of the queue to read from.
    #[serde(default)]
    pub name: String,
    /// Number of messages fetched per receive call.
    #[serde(default = "default_queue_max_messages")]
    pub max_messages: usize,
    /// How long a receive call may wait for messages.
    #[serde(default = "default_queue_poll_timeout")]
    pub poll_timeout_secs: u64,
    /// How long the consumer sleeps when the queue is empty.
    #[serde(default = "default_queue_sleep_interval")]
    pub sleep_interval_ms: u64,
}

// ── Defaults ──────────────────────────────────────────────────

fn default_app_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "girder".into())
}
fn default_app_version() -> String { "dev".into() }
fn default_environment() -> String { "test".into() }
fn default_server_host() -> String { "0.0.0.0".into() }
fn default_server_port() -> u16 { 8080 }
fn default_read_timeout() -> u64 { 10 }
fn default_header_timeout() -> u64 { 20 }
fn default_max_header_bytes() -> usize { 1 << 20 }
fn default_logger_mode() -> String { "development".into() }
fn default_metrics_path() -> String { "/metrics".into() }
fn default_postgres_db() -> String { "postgres".into() }
fn default_postgres_user() -> String { "postgres".into() }
fn default_localhost() -> String { "localhost".into() }
fn default_postgres_port() -> u16 { 5432 }
fn default_sslmode() -> String { "disable".into() }
fn default_redis_port() -> u16 { 6379 }
fn default_redis_pool_size() -> u32 { 10 }
fn default_redis_connect_timeout() -> u64 { 5 }
fn default_queue_max_messages() -> usize { 10 }
fn default_queue_poll_timeout() -> u64 { 2 }
fn default_queue_sleep_interval() -> u64 { 2000 }

// ── Impls ─────────────────────────────────────────────────────

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
            environment: default_environment(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            read_timeout_secs: default_read_timeout(),
            read_header_timeout_secs: default_header_timeout(),
            write_timeout_secs: default_header_timeout(),
            idle_timeout_secs: default_read_timeout(),
            max_header_bytes: default_max_header_bytes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            mode: default_logger_mode(),
            excluded_headers: Vec::new(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_metrics_path(),
        }
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            dbname: default_postgres_db(),
            user: default_postgres_user(),
            password: String::new(),
            host: default_localhost(),
            port: default_postgres_port(),
            sslmode: default_sslmode(),
            fallback_application_name: String::new(),
            connect_timeout_secs: 0,
            sslcert: String::new(),
            sslkey: String::new(),
            sslrootcert: String::new(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_localhost(),
            port: default_redis_port(),
            db: 0,
            password: String::new(),
            pool_size: default_redis_pool_size(),
            connect_timeout_secs: default_redis_connect_timeout(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            max_messages: default_queue_max_messages(),
            poll_timeout_secs: default_queue_poll_timeout(),
            sleep_interval_ms: default_queue_sleep_interval(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file + `GIRDER_`-prefixed env overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings: Settings = Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed("GIRDER_").split("_"))
            .extract()?;
        Ok(settings)
    }
}

impl ServerConfig {
    /// Bind address, `host:port`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl PostgresConfig {
    /// Render the settings as a libpq keyword/value connection string.
    ///
    /// Empty fields and a zero port/timeout are omitted. SSL file locations
    /// are only emitted for the sslmodes that can use them.
    pub fn connection_string(&self) -> String {
        let mut parameters: Vec<String> = Vec::with_capacity(11);
        if !self.dbname.is_empty() {
            parameters.push(format!("dbname={}", self.dbname));
        }
        if !self.user.is_empty() {
            parameters.push(format!("user={}", self.user));
        }
        if !self.password.is_empty() {
            parameters.push(format!("password={}", self.password));
        }
        if !self.host.is_empty() {
            parameters.push(format!("host={}", self.host));
        }
        if self.port != 0 {
            parameters.push(format!("port={}", self.port));
        }
        if !self.fallback_application_name.is_empty() {
            parameters.push(format!(
                "fallback_application_name={}",
                self.fallback_application_name
            ));
        }
        if self.connect_timeout_secs != 0 {
            parameters.push(format!("connect_timeout={}", self.connect_timeout_secs));
        }
        match self.sslmode.as_str() {
            "require" | "verify-ca" | "verify-full" => {
                parameters.extend(self.ssl_string_parts());
            }
            "disable" => parameters.push("sslmode=disable".into()),
            _ => {}
        }
        parameters.join(" ")
    }

    fn ssl_string_parts(&self) -> Vec<String> {
        let mut parameters: Vec<String> = Vec::with_capacity(4);
        parameters.push(format!("sslmode={}", self.sslmode));
        if !self.sslcert.is_empty() {
            parameters.push(format!("sslcert={}", self.sslcert));
        }
        if !self.sslkey.is_empty() {
            parameters.push(format!("sslkey={}", self.sslkey));
        }
        if !self.sslrootcert.is_empty() {
            parameters.push(format!("sslrootcert={}", self.sslrootcert));
        }
        parameters
    }
}

impl RedisConfig {
    /// Connection URL, `redis://[:password@]host:port/db`.
    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}:{}/{}", self.host, self.port, self.db)
        } else {
            format!("redis://:{}@{}:{}/{}", self.password, self.host, self.port, self.db)
        }
    }
}

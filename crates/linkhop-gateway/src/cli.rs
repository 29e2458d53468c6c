use clap::{Parser, ValueEnum};
use linkhop_telemetry::{LogFormat, TelemetryConfig};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "LINKHOP_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "LINKHOP_PUBLIC_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "LINKHOP_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "LINKHOP_MYSQL_DSN";
pub const CACHE_BACKEND_ENV: &str = "LINKHOP_CACHE_BACKEND";
pub const REDIS_URL_ENV: &str = "LINKHOP_REDIS_URL";
pub const CACHE_TTL_SECS_ENV: &str = "LINKHOP_CACHE_TTL_SECS";
pub const CACHE_CAPACITY_ENV: &str = "LINKHOP_CACHE_CAPACITY";
pub const MAX_ATTEMPTS_ENV: &str = "LINKHOP_MAX_ATTEMPTS";
pub const LOG_LEVEL_ENV: &str = "LINKHOP_LOG_LEVEL";
pub const LOG_FORMAT_ENV: &str = "LINKHOP_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "LINKHOP_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5003";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    /// Caching disabled; every resolution reads the store.
    #[value(name = "none")]
    None,
    #[value(name = "moka")]
    Moka,
    #[value(name = "redis")]
    Redis,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::None => write!(f, "none"),
            CacheBackendArg::Moka => write!(f, "moka"),
            CacheBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "pretty")]
    Pretty,
    #[value(name = "json")]
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "linkhop", about = "URL shortener HTTP server")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Prefix of the short URLs handed out. Defaults to
    /// `http://localhost:<listen port>`.
    #[arg(long, env = PUBLIC_BASE_URL_ENV)]
    pub public_base_url: Option<String>,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Moka
    )]
    pub cache: CacheBackendArg,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("cache", "redis"))]
    pub redis_url: Option<String>,

    #[arg(long, env = CACHE_TTL_SECS_ENV, default_value_t = 86_400)]
    pub cache_ttl_secs: u64,

    /// Entry bound of the in-process cache.
    #[arg(long, env = CACHE_CAPACITY_ENV, default_value_t = 100_000)]
    pub cache_capacity: u64,

    #[arg(
        long,
        env = MAX_ATTEMPTS_ENV,
        default_value_t = 5,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_attempts: u32,

    #[arg(long, env = LOG_LEVEL_ENV, default_value = "info")]
    pub log_level: String,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Pretty
    )]
    pub log_format: LogFormatArg,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

impl CLI {
    pub fn public_base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.listen_addr.port()),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn telemetry(&self) -> TelemetryConfig {
        let config = TelemetryConfig::builder()
            .log_level(self.log_level.clone())
            .format(self.log_format.into());
        match &self.otlp_endpoint {
            Some(endpoint) => config.otlp_endpoint(endpoint.clone()).build(),
            None => config.build(),
        }
    }
}

//! Process-wide tracing setup for linkhop binaries.
//!
//! [`init`] installs a `tracing` subscriber made of an [`EnvFilter`], a
//! console formatter (pretty or JSON) and, when an OTLP endpoint is
//! configured, an OpenTelemetry span exporter. Records emitted through the
//! `log` facade by dependencies are forwarded into `tracing`.

use std::fmt::{Display, Formatter};

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};
use typed_builder::TypedBuilder;

pub const DEFAULT_SERVICE_NAME: &str = "linkhop";
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub type Result<T> = std::result::Result<T, TelemetryError>;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build OTLP exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),
    #[error("failed to install log forwarder: {0}")]
    LogTracer(#[from] tracing_log::log::SetLoggerError),
    #[error("failed to install global subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// How console log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable, multi-line events.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct TelemetryConfig {
    #[builder(default = DEFAULT_SERVICE_NAME.to_string(), setter(into))]
    pub service_name: String,
    /// Used when `RUST_LOG` is not set.
    #[builder(default = DEFAULT_LOG_LEVEL.to_string(), setter(into))]
    pub log_level: String,
    #[builder(default)]
    pub format: LogFormat,
    /// gRPC endpoint of an OTLP collector, e.g. `http://localhost:4317`.
    #[builder(default, setter(strip_option, into))]
    pub otlp_endpoint: Option<String>,
}

/// Keeps the span exporter alive. Dropping it flushes pending spans.
#[must_use = "dropping the guard shuts down span export"]
#[derive(Debug)]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to shut down tracer provider: {e}");
            }
        }
    }
}

/// Builds the filter: `RUST_LOG` wins, otherwise `level` applies to
/// linkhop crates and everything else is held at `warn`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,linkhop_core={level},linkhop_storage={level},linkhop_cache={level},\
             linkhop_shortener={level},linkhop_redirector={level},linkhop_gateway={level},\
             linkhop_telemetry={level},tower_http={level}"
        ))
    })
}

/// Installs the global subscriber. Call once, early in `main`.
pub fn init(config: &TelemetryConfig) -> Result<TelemetryGuard> {
    let provider = match &config.otlp_endpoint {
        Some(endpoint) => Some(tracer_provider(&config.service_name, endpoint)?),
        None => None,
    };

    let fmt_layer = match config.format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(true)
            .pretty()
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_target(true)
            .json()
            .flatten_event(true)
            .boxed(),
    };

    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });

    let subscriber = Registry::default()
        .with(env_filter(&config.log_level))
        .with(fmt_layer)
        .with(otel_layer);

    tracing::subscriber::set_global_default(subscriber)?;
    LogTracer::init()?;

    tracing::debug!(
        service_name = %config.service_name,
        format = %config.format,
        otlp = config.otlp_endpoint.is_some(),
        "telemetry initialized"
    );

    Ok(TelemetryGuard { provider })
}

fn tracer_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = TelemetryConfig::builder().build();

        assert_eq!(config.service_name, "linkhop");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn config_overrides() {
        let config = TelemetryConfig::builder()
            .log_level("debug")
            .format(LogFormat::Json)
            .otlp_endpoint("http://collector:4317")
            .build();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.format.to_string(), "json");
        assert_eq!(
            config.otlp_endpoint.as_deref(),
            Some("http://collector:4317")
        );
    }

    #[test]
    fn filter_mentions_every_crate() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let filter = env_filter("debug").to_string();

        assert!(filter.contains("linkhop_shortener=debug"));
        assert!(filter.contains("linkhop_redirector=debug"));
        assert!(filter.contains("linkhop_telemetry=debug"));
        assert!(filter.split(',').any(|directive| directive == "warn"));
    }

    #[test]
    fn init_installs_once() {
        let config = TelemetryConfig::builder().build();

        let guard = init(&config).unwrap();
        tracing::info!("hello from the test subscriber");
        tracing_log::log::info!("forwarded from the log facade");

        // The subscriber is installed first, so a repeat call stops there
        // without touching the log bridge.
        assert!(matches!(init(&config), Err(TelemetryError::Subscriber(_))));

        drop(guard);
    }
}

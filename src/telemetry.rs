use anyhow::{Context, Result};
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace, Resource};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::Config;

static OTLP_EXPORTER_INSTALLED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: String,
    pub environment: String,
    pub otlp_endpoint: Option<String>,
    pub export_timeout: Duration,
}

impl TelemetryConfig {
    /// Service identity from the application config; the exporter endpoint
    /// comes from `OTEL_EXPORTER_OTLP_ENDPOINT`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            service_name: env!("CARGO_PKG_NAME").to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: config.app.environment.as_str().to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                .ok()
                .filter(|endpoint| !endpoint.trim().is_empty()),
            export_timeout: Duration::from_secs(10),
        }
    }
}

/// Held by `main` until shutdown so buffered spans get flushed.
pub struct TelemetryHandles {
    exporting: bool,
}

impl TelemetryHandles {
    pub async fn shutdown(self) -> Result<()> {
        if self.exporting {
            info!("Flushing trace exporter");
            // The batch processor blocks while flushing.
            tokio::task::spawn_blocking(global::shutdown_tracer_provider)
                .await
                .context("Trace exporter shutdown panicked")?;
            OTLP_EXPORTER_INSTALLED.store(false, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Installs the log subscriber and, when an endpoint is configured, the OTLP trace pipeline.
pub async fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryHandles> {
    setup_tracing_subscriber()?;

    info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = %config.environment,
        "Initializing telemetry"
    );

    let exporting = match &config.otlp_endpoint {
        Some(endpoint) => {
            init_tracing(&config, endpoint)?;
            true
        }
        None => {
            info!("No OTLP endpoint configured, traces stay local");
            false
        }
    };

    Ok(TelemetryHandles { exporting })
}

fn create_resource(config: &TelemetryConfig) -> Resource {
    Resource::new(vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", config.service_version.clone()),
        KeyValue::new("deployment.environment", config.environment.clone()),
    ])
}

fn init_tracing(config: &TelemetryConfig, endpoint: &str) -> Result<()> {
    let provider = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint)
                .with_timeout(config.export_timeout),
        )
        .with_trace_config(
            trace::Config::default()
                .with_resource(create_resource(config))
                .with_sampler(trace::Sampler::AlwaysOn),
        )
        .install_batch(runtime::Tokio)
        .context("Failed to initialize OTLP tracer")?;

    global::set_tracer_provider(provider);
    OTLP_EXPORTER_INSTALLED.store(true, Ordering::SeqCst);

    info!(endpoint, "Distributed tracing initialized with OTLP exporter");
    Ok(())
}

fn setup_tracing_subscriber() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{}=debug,tower_http=info", env!("CARGO_CRATE_NAME")).into());

    Registry::default()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}

/// Reported by `/health`.
pub fn telemetry_health_check() -> HashMap<String, bool> {
    let mut health = HashMap::new();
    health.insert(
        "otlp_exporter".to_string(),
        OTLP_EXPORTER_INSTALLED.load(Ordering::SeqCst),
    );
    health
}

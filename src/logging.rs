use anyhow::Context;
use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use opentelemetry::{KeyValue, global, trace::TraceError};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    propagation::TraceContextPropagator,
    runtime,
    trace::{Config, RandomIdGenerator, Sampler, Tracer},
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use std::{env, time::Instant};
use tracing::{Instrument, Level, error, info, info_span, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_DIR: &str = "storage/logs";
const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Runs the request inside a span carrying its id and route, then records
/// one completion event whose level follows the response status.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let span = info_span!(
        "request",
        request_id = %uuid::Uuid::new_v4(),
        method = %req.method(),
        route = %route,
    );

    async move {
        let start = Instant::now();
        let response = next.run(req).await;
        let status = response.status().as_u16();
        let latency_ms = start.elapsed().as_millis() as u64;

        match completion_level(response.status()) {
            Level::ERROR => error!(status, latency_ms, "request failed"),
            Level::WARN => warn!(status, latency_ms, "request rejected"),
            _ => info!(status, latency_ms, "request completed"),
        }
        response
    }
    .instrument(span)
    .await
}

fn completion_level(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}

fn service_resource() -> Resource {
    let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_owned());
    Resource::new([
        KeyValue::new(SERVICE_NAME, env!("CARGO_PKG_NAME")),
        KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
        KeyValue::new("environment", environment),
    ])
}

fn otlp_tracer(endpoint: &str) -> Result<Tracer, TraceError> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let trace_config = Config::default()
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(service_resource());

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .with_trace_config(trace_config)
        .install_batch(runtime::Tokio)
}

/// Console output, a daily error log and a daily JSON log. Spans are also
/// exported over OTLP when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
pub fn init_tracing() -> anyhow::Result<()> {
    std::fs::create_dir_all(LOG_DIR).context("Failed to create logs directory")?;

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{}=info,tower_http=warn", env!("CARGO_CRATE_NAME")))
    });
    let console = fmt::layer()
        .compact()
        .with_target(false)
        .with_line_number(true)
        .with_filter(console_filter);

    let errors = fmt::layer()
        .with_writer(RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "reservo.log"))
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    let json = fmt::layer()
        .json()
        .with_writer(RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "reservo.json"))
        .with_current_span(true)
        .with_filter(EnvFilter::new("info"));

    let endpoint = env::var(OTLP_ENDPOINT_VAR).ok();
    let (tracer, export_error) = match endpoint.as_deref().map(otlp_tracer).transpose() {
        Ok(tracer) => (tracer, None),
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(errors)
        .with(json)
        .with(tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer)))
        .init();

    match (endpoint, export_error) {
        (Some(endpoint), None) => info!(%endpoint, "tracing initialized with OTLP export"),
        (Some(_), Some(e)) => warn!(error = %e, "OTLP export unavailable, logging locally"),
        (None, _) => info!("tracing initialized"),
    }
    Ok(())
}

pub async fn shutdown_tracer() {
    global::shutdown_tracer_provider();
    info!("OpenTelemetry tracer shut down");
}

use crate::app_env;
use anyhow::Context;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use opentelemetry::trace::TracerProvider;
use opentelemetry::{KeyValue, global};
use opentelemetry_http::HeaderExtractor;
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::Tracer;
use opentelemetry_sdk::{Resource, runtime};
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing::{Span, debug, debug_span, field};
use tracing_opentelemetry::{MetricsLayer, OpenTelemetryLayer, OpenTelemetrySpanExt};
use tracing_subscriber::{EnvFilter, prelude::*, registry};

/// The name of the service as it should appear in OpenTelemetry collectors
const SERVICE_NAME: &str = "todo-items";

/// OpenTelemetry primitives which export spans and metrics to a collector
pub struct OtelExporters {
    pub tracer: Tracer,
    pub meter: SdkMeterProvider,
}

/// Wraps every route of [router] in a "request" span carrying the method, path, and eventual
/// response status. Trace context sent by callers becomes the parent of the span.
pub fn attach_tracing_http<T>(router: Router<T>) -> Router<T>
where
    T: Clone + Send + Sync + 'static,
{
    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|request: &Request<Body>| {
                let req_span = debug_span!(
                    "request",
                    method = &request.method().as_str(),
                    path = request.uri().path(),
                    response_status = field::Empty,
                );

                req_span.set_parent(global::get_text_map_propagator(|propagator| {
                    propagator.extract(&HeaderExtractor(request.headers()))
                }));

                req_span
            })
            .on_response(
                |response: &Response<Body>, latency: Duration, span: &Span| {
                    span.record("response_status", field::display(response.status()));
                    debug!(latency_ms = latency.as_millis() as u64, "request processing complete");
                },
            ),
    )
}

/// Instantiates OpenTelemetry exporters which run in the background and ship spans and metrics
/// to OTLP gRPC endpoints (typically http://localhost:4317 with a collector sidecar)
pub fn init_exporters(
    otlp_traces_endpoint: &str,
    otlp_metrics_endpoint: &str,
) -> Result<OtelExporters, anyhow::Error> {
    let span_export = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_traces_endpoint)
        .build()
        .context("building the span exporter")?;
    let meter_export = MetricExporter::builder()
        .with_tonic()
        .with_endpoint(otlp_metrics_endpoint)
        .build()
        .context("building the metric exporter")?;

    let metrics_reader = PeriodicReader::builder(meter_export, runtime::Tokio).build();

    let tracer = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(span_export, runtime::Tokio)
        .with_resource(Resource::new([KeyValue::new("service.name", SERVICE_NAME)]))
        .build()
        .tracer(SERVICE_NAME);
    let meter = SdkMeterProvider::builder()
        .with_reader(metrics_reader)
        .with_resource(Resource::new([KeyValue::new("service.name", SERVICE_NAME)]))
        .build();

    Ok(OtelExporters { tracer, meter })
}

/// Constructs a filter which uses [app_env::LOG_LEVEL] to configure per-module logging. Filters
/// to the "info" level by default.
pub fn init_env_filter() -> Result<EnvFilter, anyhow::Error> {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(app_env::LOG_LEVEL)
        .from_env()
        .with_context(|| format!("parsing the {} directives", app_env::LOG_LEVEL))
}

/// Sets up the global logging and tracing sinks. [env_filter] only applies to the JSON logger
/// on stdout; when [otel_exporters] are provided, everything at "debug" and above is exported.
/// Libraries still logging through the "log" crate are bridged into the same pipeline.
///
/// Hands back the meter provider so it can be flushed at shutdown.
pub fn setup_logging_and_tracing(
    env_filter: EnvFilter,
    otel_exporters: Option<OtelExporters>,
) -> Option<SdkMeterProvider> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    match otel_exporters {
        Some(exporters) => {
            registry()
                .with(LevelFilter::DEBUG)
                .with(OpenTelemetryLayer::new(exporters.tracer))
                .with(MetricsLayer::new(exporters.meter.clone()))
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_filter(env_filter),
                )
                .init();

            Some(exporters.meter)
        }
        None => {
            registry()
                .with(LevelFilter::DEBUG)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_filter(env_filter),
                )
                .init();

            None
        }
    }
}

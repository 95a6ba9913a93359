/// URL for accessing the PostgreSQL database (should contain the database name in the path)
pub const DB_URL: &str = "DATABASE_URL";
/// Log level configuration for the application. Uses the [EnvFilter](tracing_subscriber::EnvFilter)
/// directive syntax, e.g. `info,todo_items=debug`
pub const LOG_LEVEL: &str = "LOG_LEVEL";
/// Port the HTTP server listens on. Defaults to [DEFAULT_PORT] when unset.
pub const PORT: &str = "PORT";
pub const DEFAULT_PORT: u16 = 8080;

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

/// URL for accessing the PostgreSQL server during integration tests (should not contain a database name in the path)
pub const TEST_DB_URL: &str = "TEST_DB_URL";

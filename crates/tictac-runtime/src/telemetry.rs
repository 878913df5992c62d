//! Tracing pipeline initialisation for the playground.
//!
//! Call [`init_tracing`] once at process startup.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTLP collector base URL (e.g. `http://localhost:4318`). When set the OTLP HTTP exporter is activated. |
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `TICTAC_LOG_FORMAT=json` | Emit newline-delimited JSON on the console. |
//!
//! A log file, when given, always receives JSON lines so that game records
//! can be post-processed.
//!
//! # Example
//!
//! ```rust,no_run
//! // Hold the guard for the entire lifetime of the process.
//! let _guard = tictac_runtime::telemetry::init_tracing("tictac", None)
//!     .expect("tracing must initialise");
//! ```

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tictac_types::PlaygroundError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Install the global `tracing` subscriber.
///
/// Layers: an [`EnvFilter`], the console formatter (compact, or JSON with
/// `TICTAC_LOG_FORMAT=json`), a JSON file writer when `log_file` is given,
/// and an OTLP span exporter when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
///
/// The returned [`TracerProviderGuard`] **must** be held for the lifetime of
/// the process; dropping it flushes pending spans.
///
/// # Errors
///
/// Returns [`PlaygroundError::Config`] when the log file cannot be opened
/// or a global subscriber is already installed.
pub fn init_tracing(
    service_name: &str,
    log_file: Option<&Path>,
) -> Result<TracerProviderGuard, PlaygroundError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = std::env::var("TICTAC_LOG_FORMAT").as_deref() == Ok("json");

    let file = log_file.map(open_log_file).transpose()?;
    let provider = build_provider(service_name);

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("tictac")));
    let json_console = use_json.then(|| tracing_subscriber::fmt::layer().json());
    let compact_console = (!use_json).then(|| tracing_subscriber::fmt::layer().compact());
    let file_layer = file.map(|f| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(Mutex::new(f))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer)
        .with(json_console)
        .with(compact_console)
        .with(file_layer)
        .try_init()
        .map_err(|e| PlaygroundError::Config(format!("tracing already initialised: {e}")))?;

    Ok(TracerProviderGuard(provider))
}

// ─────────────────────────────────────────────────────────────────────────────
// RAII guard
// ─────────────────────────────────────────────────────────────────────────────

/// RAII guard that shuts down the OTel [`SdkTracerProvider`] on drop.
pub struct TracerProviderGuard(Option<SdkTracerProvider>);

impl Drop for TracerProviderGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.0.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("[tictac] OpenTelemetry provider shutdown error: {e}");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ─────────────────────────────────────────────────────────────────────────────

fn open_log_file(path: &Path) -> Result<File, PlaygroundError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| PlaygroundError::Config(format!("cannot open log file {}: {e}", path.display())))
}

/// Build an [`SdkTracerProvider`] when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
///
/// Returns `None` when the env-var is absent or the exporter cannot be
/// initialised (the error is printed to stderr).
fn build_provider(service_name: &str) -> Option<SdkTracerProvider> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| eprintln!("[tictac] OTLP exporter init failed: {e}"))
        .ok()?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    Some(
        SdkTracerProvider::builder()
            .with_resource(resource)
            // The game loop is fully synchronous; no async runtime exists to
            // drive a batch exporter.
            .with_simple_exporter(exporter)
            .build(),
    )
}

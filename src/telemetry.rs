use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize tracing with human-readable or JSON output.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_telemetry(observability: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&observability.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if observability.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    tracing::debug!("Powder dispenser telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for one dispensing session
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span carrying the session attributes
pub fn create_session_span(session_id: &str, seed: Option<u64>) -> tracing::Span {
    tracing::info_span!(
        "dispensing_session",
        session.id = session_id,
        rng.seed = seed,
    )
}

/// Shutdown telemetry gracefully
pub fn shutdown_telemetry() {
    // Plain fmt layers flush on write; nothing to tear down
    tracing::debug!("Powder dispenser telemetry shutdown complete");
}

// jarvis-relay/crates/jarvis-relay/src/telemetry.rs

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber. `RUST_LOG` overrides the default `info` filter.
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init_tracing() {
    let env_filter = filter_directive(std::env::var("RUST_LOG").ok());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn filter_directive(rust_log: Option<String>) -> String {
    match rust_log {
        Some(directive) if !directive.trim().is_empty() => directive,
        _ => DEFAULT_FILTER.to_string(),
    }
}

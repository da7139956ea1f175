use axum::http::StatusCode;
use axum::response::IntoResponse;
use lazy_static::lazy_static;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Registry, TextEncoder};
use std::sync::OnceLock;
use tracing::{error, warn};

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
}

static REQ_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();
static FALLBACK_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();
static ACTIVE_SESSIONS: OnceLock<IntGauge> = OnceLock::new();
static GATEWAY_LATENCY: OnceLock<Histogram> = OnceLock::new();

/// Registers the relay metrics. Safe to call more than once.
pub fn init_metrics() {
    register_once(&REQ_COUNTER, || {
        IntCounterVec::new(
            prometheus::opts!("relay_requests_total", "Total requests per route"),
            &["route", "status"],
        )
    });
    register_once(&FALLBACK_COUNTER, || {
        IntCounterVec::new(
            prometheus::opts!("chat_fallbacks_total", "Chat turns answered with the fallback reply"),
            &["reason"],
        )
    });
    register_once(&ACTIVE_SESSIONS, || {
        IntGauge::new("active_sessions", "Sessions currently held in memory")
    });
    register_once(&GATEWAY_LATENCY, || {
        Histogram::with_opts(HistogramOpts::new(
            "gateway_latency_seconds",
            "Time spent waiting on the completion provider",
        ))
    });
}

fn register_once<M, F>(cell: &OnceLock<M>, build: F)
where
    M: prometheus::core::Collector + Clone + 'static,
    F: FnOnce() -> prometheus::Result<M>,
{
    if cell.get().is_some() {
        return;
    }
    match build() {
        Ok(metric) => {
            if cell.set(metric.clone()).is_ok() {
                if let Err(e) = REGISTRY.register(Box::new(metric)) {
                    warn!("Failed to register metric: {}", e);
                }
            }
        }
        Err(e) => error!("Failed to build metric: {}", e),
    }
}

pub fn inc_request(route: &str, status: &str) {
    if let Some(counter) = REQ_COUNTER.get() {
        counter.with_label_values(&[route, status]).inc();
    }
}

pub fn inc_fallback(reason: &str) {
    if let Some(counter) = FALLBACK_COUNTER.get() {
        counter.with_label_values(&[reason]).inc();
    }
}

pub fn set_active_sessions(count: usize) {
    if let Some(gauge) = ACTIVE_SESSIONS.get() {
        gauge.set(count as i64);
    }
}

pub fn observe_gateway_latency(seconds: f64) {
    if let Some(histogram) = GATEWAY_LATENCY.get() {
        histogram.observe(seconds);
    }
}

/// GET /metrics
pub async fn get_metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            b"failed to encode metrics".to_vec(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        buffer,
    )
}

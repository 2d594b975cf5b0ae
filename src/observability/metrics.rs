//! # Metrics
//!
//! Prometheus metrics for monitoring identifier resolution and Connect traffic.
//!
//! ## Metrics Exposed
//!
//! - `onepassword_operator_title_lookups_total` - Title lookups issued, by identifier kind
//! - `onepassword_operator_ambiguous_titles_total` - Title lookups that matched more than one candidate
//! - `onepassword_operator_connect_request_duration_seconds` - Duration of Connect API requests
//! - `onepassword_operator_connect_errors_total` - Failed Connect API requests

use anyhow::Result;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static TITLE_LOOKUPS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "onepassword_operator_title_lookups_total",
            "Total number of title lookups by identifier kind",
        ),
        &["kind"],
    )
    .expect("Failed to create TITLE_LOOKUPS_TOTAL metric - this should never happen")
});

static AMBIGUOUS_TITLES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "onepassword_operator_ambiguous_titles_total",
            "Total number of title lookups resolved by picking the oldest of several matches",
        ),
        &["kind"],
    )
    .expect("Failed to create AMBIGUOUS_TITLES_TOTAL metric - this should never happen")
});

static CONNECT_REQUEST_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "onepassword_operator_connect_request_duration_seconds",
            "Duration of 1Password Connect requests in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["operation"],
    )
    .expect("Failed to create CONNECT_REQUEST_DURATION metric - this should never happen")
});

static CONNECT_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "onepassword_operator_connect_errors_total",
            "Total number of failed 1Password Connect requests",
        ),
        &["operation"],
    )
    .expect("Failed to create CONNECT_ERRORS_TOTAL metric - this should never happen")
});

pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(TITLE_LOOKUPS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(AMBIGUOUS_TITLES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CONNECT_REQUEST_DURATION.clone()))?;
    REGISTRY.register(Box::new(CONNECT_ERRORS_TOTAL.clone()))?;

    Ok(())
}

/// Render every registered metric in the Prometheus text format
pub fn gather_metrics() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

pub fn increment_title_lookups(kind: &str) {
    TITLE_LOOKUPS_TOTAL.with_label_values(&[kind]).inc();
}

pub fn increment_ambiguous_titles(kind: &str) {
    AMBIGUOUS_TITLES_TOTAL.with_label_values(&[kind]).inc();
}

/// Current value of the ambiguous-title counter for `kind`
pub fn ambiguous_titles_count(kind: &str) -> u64 {
    AMBIGUOUS_TITLES_TOTAL.with_label_values(&[kind]).get()
}

pub fn observe_connect_request(operation: &str, duration: f64) {
    CONNECT_REQUEST_DURATION
        .with_label_values(&[operation])
        .observe(duration);
}

pub fn increment_connect_errors(operation: &str) {
    CONNECT_ERRORS_TOTAL.with_label_values(&[operation]).inc();
}

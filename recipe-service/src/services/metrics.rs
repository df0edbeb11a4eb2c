//! Prometheus metrics for recipe-service.
//!
//! Provides HTTP and generation-specific metrics for observability.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

static METRICS: OnceLock<Metrics> = OnceLock::new();

struct Metrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    recipe_generations_total: IntCounterVec,
    provider_latency_seconds: HistogramVec,
    provider_errors_total: IntCounterVec,
    tokens_total: IntCounterVec,
}

impl Metrics {
    fn new() -> Self {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )
        .expect("Failed to create http_requests_total metric");

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["method", "path"],
        )
        .expect("Failed to create http_request_duration_seconds metric");

        // outcome: success, invalid_prompt, provider_error, output_contract_error
        let recipe_generations_total = IntCounterVec::new(
            Opts::new("recipe_generations_total", "Recipe generation requests by outcome"),
            &["outcome"],
        )
        .expect("Failed to create recipe_generations_total metric");

        let provider_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "recipe_provider_latency_seconds",
                "Model provider API latency in seconds",
            )
            .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["provider", "model"],
        )
        .expect("Failed to create recipe_provider_latency_seconds metric");

        let provider_errors_total = IntCounterVec::new(
            Opts::new("recipe_provider_errors_total", "Total model provider errors"),
            &["provider", "error_type"],
        )
        .expect("Failed to create recipe_provider_errors_total metric");

        let tokens_total = IntCounterVec::new(
            Opts::new("recipe_tokens_total", "Total tokens processed"),
            &["model", "type"], // type: input, output
        )
        .expect("Failed to create recipe_tokens_total metric");

        registry
            .register(Box::new(http_requests_total.clone()))
            .expect("Failed to register http_requests_total");
        registry
            .register(Box::new(http_request_duration_seconds.clone()))
            .expect("Failed to register http_request_duration_seconds");
        registry
            .register(Box::new(recipe_generations_total.clone()))
            .expect("Failed to register recipe_generations_total");
        registry
            .register(Box::new(provider_latency_seconds.clone()))
            .expect("Failed to register recipe_provider_latency_seconds");
        registry
            .register(Box::new(provider_errors_total.clone()))
            .expect("Failed to register recipe_provider_errors_total");
        registry
            .register(Box::new(tokens_total.clone()))
            .expect("Failed to register recipe_tokens_total");

        Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            recipe_generations_total,
            provider_latency_seconds,
            provider_errors_total,
            tokens_total,
        }
    }
}

/// Initialize all metrics. Safe to call more than once.
pub fn init_metrics() {
    if METRICS.get().is_none() {
        METRICS.get_or_init(Metrics::new);
        tracing::info!("Prometheus metrics initialized");
    }
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let metrics = match METRICS.get() {
        Some(m) => m,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = metrics.registry.gather();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

// Helper functions for recording metrics. All are no-ops before init.

/// Record a completed HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    if let Some(m) = METRICS.get() {
        m.http_requests_total
            .with_label_values(&[method, path, &status.to_string()])
            .inc();
        m.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }
}

/// Record how a generate-recipe request ended.
pub fn record_generation(outcome: &str) {
    if let Some(m) = METRICS.get() {
        m.recipe_generations_total.with_label_values(&[outcome]).inc();
    }
}

/// Record provider latency.
pub fn record_provider_latency(provider: &str, model: &str, duration_secs: f64) {
    if let Some(m) = METRICS.get() {
        m.provider_latency_seconds
            .with_label_values(&[provider, model])
            .observe(duration_secs);
    }
}

/// Record a provider error.
pub fn record_provider_error(provider: &str, error_type: &str) {
    if let Some(m) = METRICS.get() {
        m.provider_errors_total
            .with_label_values(&[provider, error_type])
            .inc();
    }
}

/// Record token usage reported by the provider.
pub fn record_tokens(model: &str, input_tokens: u32, output_tokens: u32) {
    if let Some(m) = METRICS.get() {
        m.tokens_total
            .with_label_values(&[model, "input"])
            .inc_by(u64::from(input_tokens));
        m.tokens_total
            .with_label_values(&[model, "output"])
            .inc_by(u64::from(output_tokens));
    }
}

//! Prometheus metrics: HTTP traffic plus storefront counters, exposed at `/metrics`.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder, core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const LATENCY_BUCKETS: [f64; 11] = [
    0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

#[derive(Debug)]
struct StoreMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    orders_placed_total: IntCounterVec,
    order_revenue_minor_total: IntCounter,
    coupon_attempts_total: IntCounterVec,
}

static METRICS: OnceLock<Option<StoreMetrics>> = OnceLock::new();

fn metrics() -> Option<&'static StoreMetrics> {
    METRICS.get_or_init(build_metrics).as_ref()
}

/// Keeps the in-flight gauge raised for the lifetime of a request.
#[derive(Debug)]
pub(super) struct InFlightRequestGuard(Option<&'static IntGauge>);

impl InFlightRequestGuard {
    pub(super) fn track() -> Self {
        let gauge = metrics().map(|metrics| &metrics.requests_in_flight);

        if let Some(gauge) = gauge {
            gauge.inc();
        }

        Self(gauge)
    }
}

impl Drop for InFlightRequestGuard {
    fn drop(&mut self) {
        if let Some(gauge) = self.0 {
            gauge.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class(status_code), status.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Count a placed order and add its total to the revenue counter.
pub(crate) fn record_order_placed(payment_method: &str, total_minor: u64) {
    if let Some(metrics) = metrics() {
        metrics
            .orders_placed_total
            .with_label_values(&[payment_method])
            .inc();

        metrics.order_revenue_minor_total.inc_by(total_minor);
    }
}

/// Count a coupon apply attempt by outcome (`applied`, `not_found`, `expired`, ...).
pub(crate) fn record_coupon_attempt(outcome: &str) {
    if let Some(metrics) = metrics() {
        metrics
            .coupon_attempts_total
            .with_label_values(&[outcome])
            .inc();
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metrics.registry.gather(), &mut encoded) {
        error!("failed to encode metrics: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    match HeaderValue::from_str(encoder.format_type()) {
        Ok(content_type) => {
            res.headers_mut().insert(CONTENT_TYPE, content_type);
            res.render(String::from_utf8_lossy(&encoded).into_owned());
        }
        Err(source) => {
            error!("invalid metrics content type: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

fn register<C>(registry: &Registry, metric: Result<C, prometheus::Error>) -> Option<C>
where
    C: Collector + Clone + 'static,
{
    let metric = metric
        .inspect_err(|source| error!("failed to create metric: {source}"))
        .ok()?;

    registry
        .register(Box::new(metric.clone()))
        .inspect_err(|source| error!("failed to register metric: {source}"))
        .ok()?;

    Some(metric)
}

fn build_metrics() -> Option<StoreMetrics> {
    let registry = Registry::new_custom(Some("scrubline".to_string()), None)
        .inspect_err(|source| error!("failed to create metrics registry: {source}"))
        .ok()?;

    let requests_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by method, route and status."),
            &["method", "route", "status_class", "status_code"],
        ),
    )?;

    let request_duration_seconds = register(
        &registry,
        HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency by method and route.",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["method", "route"],
        ),
    )?;

    let requests_in_flight = register(
        &registry,
        IntGauge::new("http_requests_in_flight", "HTTP requests being served."),
    )?;

    let orders_placed_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new("orders_placed_total", "Orders placed by payment method."),
            &["payment_method"],
        ),
    )?;

    let order_revenue_minor_total = register(
        &registry,
        IntCounter::new(
            "order_revenue_minor_total",
            "Sum of placed order totals in store currency minor units.",
        ),
    )?;

    let coupon_attempts_total = register(
        &registry,
        IntCounterVec::new(
            Opts::new("coupon_attempts_total", "Coupon apply attempts by outcome."),
            &["outcome"],
        ),
    )?;

    Some(StoreMetrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        orders_placed_total,
        order_revenue_minor_total,
        coupon_attempts_total,
    })
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

//! Per-request span, request id and completion logging.

mod parent_context;
mod request_ids;
mod spans;

use std::time::{Duration, Instant};

use salvo::{
    Request, handler,
    http::StatusCode,
    prelude::{Depot, FlowCtrl, Response},
};
use scrubline_app::domain::owners::Owner;
use tracing::{Instrument as _, error, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use super::{metrics, settings};

/// Paths scraped by infrastructure; served without spans or metrics.
const UNTRACED_PATHS: [&str; 2] = ["/metrics", "/healthcheck"];

#[handler]
pub(crate) async fn request_logging(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    if UNTRACED_PATHS.contains(&req.uri().path()) {
        ctrl.call_next(req, depot, res).await;
        return;
    }

    let started = Instant::now();
    let _in_flight = metrics::InFlightRequestGuard::track();

    let request_id =
        request_ids::resolve_request_id(req.header::<String>(request_ids::REQUEST_ID_HEADER));

    request_ids::set_request_id_header(res, &request_id);

    let method = req.method().to_string();
    let path = req.uri().path().to_owned();
    let route = spans::request_span_name(&method, &path);

    let span = tracing::info_span!(
        parent: None,
        "http.request",
        otel.name = %route.otel_span_name,
        otel.kind = "server",
        request_id = %request_id,
        method = %method,
        path = %path,
        remote_addr = %req.remote_addr(),
        caller = tracing::field::Empty,
        status = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );

    if settings::otel_parent_propagation_enabled()
        && let Some(parent) = parent_context::extract_parent_context(req.headers())
        && let Err(source) = span.set_parent(parent)
    {
        warn!("failed to set parent context on request span: {source}");
    }

    ctrl.call_next(req, depot, res)
        .instrument(span.clone())
        .await;

    let status = request_ids::response_status_or_ok(res.status_code);
    let elapsed = started.elapsed();

    metrics::observe_request(&method, &route.otel_path, status.as_u16(), elapsed.as_secs_f64());

    span.record("caller", caller_kind(depot.obtain::<Owner>().ok()));
    span.record("status", status.as_u16());
    span.record("duration_ms", elapsed.as_millis());

    span.in_scope(|| log_completion(status, elapsed));
}

/// Whether the identity middleware resolved a signed-in customer, an anonymous session or
/// nobody. Session ids themselves stay out of logs.
fn caller_kind(owner: Option<&Owner>) -> &'static str {
    match owner {
        Some(Owner::Customer(_)) => "customer",
        Some(Owner::Session(_)) => "session",
        None => "anonymous",
    }
}

fn log_completion(status: StatusCode, elapsed: Duration) {
    let code = status.as_u16();
    let duration_ms = elapsed.as_millis();

    info!(status = code, duration_ms, "request.completed");

    if status.is_server_error() {
        error!(status = code, "server error response");
    } else if status.is_client_error() {
        warn!(status = code, "client error response");
    }

    let threshold_ms = u128::from(settings::slow_request_threshold_ms());

    if duration_ms > threshold_ms {
        warn!(duration_ms, threshold_ms, "slow request detected");
    }
}

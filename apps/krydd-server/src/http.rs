use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request},
    middleware::{from_fn, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{field::Empty, Span};

use runtime::config::ServerConfig;

const BODY_LIMIT_BYTES: usize = 16 * 1024 * 1024;

pub fn request_id_header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

#[derive(Clone, Default)]
struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = nanoid::nanoid!();
        Some(RequestId::new(id.parse().ok()?))
    }
}

fn request_id_of<B>(req: &Request<B>) -> &str {
    req.headers()
        .get(request_id_header())
        .and_then(|v| v.to_str().ok())
        .unwrap_or("n/a")
}

/// Records the request id on the span opened by the trace layer.
async fn record_request_id(req: Request<Body>, next: Next) -> Response {
    Span::current().record("request_id", tracing::field::display(request_id_of(&req)));
    next.run(req).await
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Wrap the API router with `/health` and the HTTP middleware stack.
///
/// Outermost to innermost: propagate request id → set request id → trace →
/// request id on span → timeout → CORS → body limit.
pub fn build_app(api: Router, server: &ServerConfig) -> Router {
    let mut router = Router::new().route("/health", get(health)).merge(api);

    router = router.layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES));
    if server.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }
    if server.timeout_sec > 0 {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(server.timeout_sec)));
    }
    router = router.layer(from_fn(record_request_id));

    let trace = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %req.method(),
                uri = %req.uri().path(),
                version = ?req.version(),
                request_id = Empty,
                status = Empty,
                latency_ms = Empty,
            )
        })
        .on_response(|res: &Response, latency: Duration, span: &Span| {
            span.record("status", res.status().as_u16());
            span.record("latency_ms", latency.as_millis() as u64);
            tracing::debug!("request finished");
        });
    router = router.layer(trace);

    let header = request_id_header();
    router
        .layer(SetRequestIdLayer::new(header.clone(), MakeReqId))
        .layer(PropagateRequestIdLayer::new(header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        build_app(Router::new(), &ServerConfig::default())
    }

    #[tokio::test]
    async fn health_reports_ok_with_generated_request_id() {
        let res = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let rid = res.headers().get("x-request-id").unwrap().to_str().unwrap();
        assert_eq!(rid.len(), 21);

        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn client_request_id_is_propagated() {
        let res = app()
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let res = app()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}

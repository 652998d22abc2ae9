//! HTTP ingress: the outer router and the middleware stack every request
//! passes through.

mod config;
pub mod request_id;
mod web;

use std::time::Duration;

use axum::{middleware::from_fn, routing::get, Router};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

pub use config::IngressConfig;
pub use request_id::XRequestId;
pub use web::{health_check, problem_for_bare_errors};

/// Merge module routes under the ingress and wrap them in the middleware stack.
///
/// Layer order, outermost first:
/// SetRequestId -> PropagateRequestId -> push_req_id_to_extensions -> Trace
/// -> problem_for_bare_errors -> Timeout -> CORS -> BodyLimit
///
/// The id is set before anything else sees the request, so the response
/// always carries one.
pub fn build_router(api: Router, config: &IngressConfig) -> Router {
    let x_request_id = request_id::header();

    let mut router = Router::new()
        .route("/health", get(health_check))
        .merge(api);

    router = router.layer(RequestBodyLimitLayer::new(config.body_limit_bytes));
    if config.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }
    router = router.layer(TimeoutLayer::new(Duration::from_secs(
        config.request_timeout_sec,
    )));
    router = router.layer(from_fn(problem_for_bare_errors));
    router = router.layer(request_id::create_trace_layer());
    router = router.layer(from_fn(request_id::push_req_id_to_extensions));
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
    router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::problem::APPLICATION_PROBLEM_JSON;
    use axum::{body::Body, http::Request, http::StatusCode, routing::post};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn problem_body(resp: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_responds_with_generated_request_id() {
        let router = build_router(Router::new(), &IngressConfig::default());

        let resp = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let rid = resp.headers().get("x-request-id").unwrap().to_str().unwrap();
        assert!(!rid.is_empty());
    }

    #[tokio::test]
    async fn client_request_id_is_propagated() {
        let router = build_router(Router::new(), &IngressConfig::default());

        let resp = router
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            resp.headers().get("x-request-id").unwrap().to_str().unwrap(),
            "abc-123"
        );
    }

    #[tokio::test]
    async fn oversized_body_gets_problem_with_message() {
        let api = Router::new().route("/echo", post(|body: String| async move { body }));
        let cfg = IngressConfig {
            body_limit_bytes: 4,
            ..IngressConfig::default()
        };
        let router = build_router(api, &cfg);

        let resp = router
            .oneshot(
                Request::post("/echo")
                    .header("content-length", "16")
                    .body(Body::from("0123456789abcdef"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(resp.headers().contains_key("x-request-id"));
        assert_eq!(
            resp.headers().get("content-type").unwrap().to_str().unwrap(),
            APPLICATION_PROBLEM_JSON
        );
        let body = problem_body(resp).await;
        assert_eq!(body["status"], 413);
        assert_eq!(body["message"], "request body exceeds the configured limit");
        assert_eq!(body["instance"], "/echo");
        assert!(body["request_id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn slow_handler_times_out_with_problem() {
        let api = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let cfg = IngressConfig {
            request_timeout_sec: 1,
            ..IngressConfig::default()
        };
        let router = build_router(api, &cfg);

        let resp = router
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
        let body = problem_body(resp).await;
        assert_eq!(body["message"], "request timed out");
    }

    #[tokio::test]
    async fn unknown_route_gets_problem_with_message() {
        let router = build_router(Router::new(), &IngressConfig::default());

        let resp = router
            .oneshot(Request::get("/nowhere").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = problem_body(resp).await;
        assert_eq!(body["message"], "not found");
    }

    #[test]
    fn config_defaults_apply_to_missing_fields() {
        let cfg: IngressConfig = serde_json::from_value(serde_json::json!({ "enable_docs": true }))
            .unwrap();
        assert!(cfg.enable_docs);
        assert!(!cfg.cors_enabled);
        assert_eq!(cfg.body_limit_bytes, 16 * 1024 * 1024);
        assert_eq!(cfg.request_timeout_sec, 30);
    }
}

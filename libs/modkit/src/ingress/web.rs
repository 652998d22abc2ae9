use axum::{
    body::Body,
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::api::problem::{Problem, ProblemResponse, APPLICATION_PROBLEM_JSON};
use crate::ingress::XRequestId;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Replace bodyless failures produced below the handlers (timeouts, body
/// limits, unmatched routes) with a `Problem` body. Responses that already
/// are problems pass through untouched.
pub async fn problem_for_bare_errors(req: Request<Body>, next: Next) -> Response {
    let instance = req.uri().path().to_owned();
    let request_id = req.extensions().get::<XRequestId>().map(|r| r.0.clone());

    let resp = next.run(req).await;
    let status = resp.status();
    if !(status.is_client_error() || status.is_server_error()) || is_problem(&resp) {
        return resp;
    }

    let title = status.canonical_reason().unwrap_or("Error");
    let message = match status {
        StatusCode::REQUEST_TIMEOUT => "request timed out".to_string(),
        StatusCode::PAYLOAD_TOO_LARGE => "request body exceeds the configured limit".to_string(),
        _ => title.to_lowercase(),
    };
    let mut problem = Problem::new(status, title, message).with_instance(instance);
    if let Some(id) = request_id {
        problem = problem.with_request_id(id);
    }

    let (parts, _) = resp.into_parts();
    let mut out = ProblemResponse(problem).into_response();
    for (name, value) in parts.headers.iter() {
        if name != CONTENT_TYPE && name != CONTENT_LENGTH {
            out.headers_mut().append(name.clone(), value.clone());
        }
    }
    out
}

fn is_problem(resp: &Response) -> bool {
    resp.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with(APPLICATION_PROBLEM_JSON))
}

//! Request ID middleware for log correlation.
//!
//! Every request gets an id (taken from `x-request-id` when the caller sends
//! one), echoed back on the response. The same middleware records request
//! metrics.

use axum::{
    extract::{MatchedPath, Request},
    http::{Extensions, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use uuid::Uuid;

use crate::{logging, metrics};

/// Header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generate or extract request ID from headers
fn get_or_generate_request_id(headers: &axum::http::HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Route template used as the metrics `path` label, so that session ids in
/// the URI don't each open a new series.
fn route_label(extensions: &Extensions) -> String {
    extensions
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

/// Middleware to add request ID to all requests and responses
///
/// ```no_run
/// use axum::{Router, routing::get, middleware};
/// use mg_server::api::request_id::request_id_middleware;
///
/// # async fn example() {
/// let app: Router = Router::new()
///     .route("/", get(|| async { "Hello" }))
///     .layer(middleware::from_fn(request_id_middleware));
/// # }
/// ```
pub async fn request_id_middleware(
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let request_id = get_or_generate_request_id(request.headers());
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let route = route_label(request.extensions());
    let started = Instant::now();

    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        parts.headers.insert(REQUEST_ID_HEADER, header_value);
    }

    let elapsed = started.elapsed();
    let status = parts.status.as_u16();
    let span = tracing::info_span!("request", request_id = %request_id);
    span.in_scope(|| {
        logging::log_api_request(&method, &path, status, elapsed.as_millis() as u64);
    });
    metrics::http_requests_total(&method, &route, status);
    metrics::http_request_duration_ms(&method, &route, elapsed.as_secs_f64() * 1000.0);

    Ok(Response::from_parts(parts, body))
}

/// Request ID wrapper for extracting from request extensions
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Axum extractor for request ID
impl<S> axum::extract::FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestId>().cloned().ok_or((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Request ID not found in extensions",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, header::HeaderMap},
        middleware,
        routing::post,
    };
    use tower::ServiceExt;

    const ROUTE_HEADER: &str = "x-route-label";

    async fn label_route(request: Request<Body>, next: Next) -> Response {
        let label = route_label(request.extensions());
        let mut response = next.run(request).await;
        response
            .headers_mut()
            .insert(ROUTE_HEADER, HeaderValue::from_str(&label).unwrap());
        response
    }

    async fn label_for(app: &Router, uri: &str) -> String {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        response.headers()[ROUTE_HEADER].to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_route_label_ignores_session_ids() {
        let v1 = Router::new().route("/games/{session_id}/actions", post(|| async { "ok" }));
        let app = Router::new()
            .nest("/api/v1", v1)
            .layer(middleware::from_fn(label_route));

        let first = label_for(&app, "/api/v1/games/coin_flip_1_2_3_100_aaa/actions").await;
        let second = label_for(&app, "/api/v1/games/tic_tac_toe_9_4_5_200_bbb/actions").await;

        assert_eq!(first, "/api/v1/games/{session_id}/actions");
        assert_eq!(first, second);
        assert_eq!(label_for(&app, "/nowhere/at/all").await, "unmatched");
    }

    #[test]
    fn test_get_or_generate_request_id_with_existing() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("test-id-123"));

        assert_eq!(get_or_generate_request_id(&headers), "test-id-123");
    }

    #[test]
    fn test_get_or_generate_request_id_generates_new() {
        let request_id = get_or_generate_request_id(&HeaderMap::new());
        assert!(Uuid::parse_str(&request_id).is_ok());
    }

    #[test]
    fn test_request_id_as_str() {
        let request_id = RequestId("test-123".to_string());
        assert_eq!(request_id.as_str(), "test-123");
    }
}

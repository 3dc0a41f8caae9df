//! The session precondition shared by every gated route.

use axum::{
    body::Body,
    http::{header, HeaderMap, Request},
    response::IntoResponse,
};

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::pipeline::Flow;
use crate::session::store::SessionLookup;

/// Extract the value of cookie `name` from the request's `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Continue with the session attached to the request, or halt with 401.
pub fn ensure_session(state: &AppState, mut request: Request<Body>) -> Flow {
    let cookie_name = &state.config.session.cookie_name;

    let lookup = cookie_value(request.headers(), cookie_name).map(|id| state.sessions.lookup(id));

    let (reason, message) = match lookup {
        Some(SessionLookup::Active(session)) => {
            tracing::debug!(user = %session.user, path = %request.uri().path(), "Session accepted");
            request.extensions_mut().insert(session);
            return Flow::Continue(request);
        }
        Some(SessionLookup::Expired) => ("expired", "session expired"),
        Some(SessionLookup::Unknown) => ("unknown", "unknown session"),
        None => ("missing", "no session"),
    };

    tracing::warn!(
        method = %request.method(),
        path = %request.uri().path(),
        reason,
        "Rejected request without valid session"
    );
    metrics::record_session_rejected(reason);
    Flow::Halt(ApiError::Unauthorized(message.to_string()).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};
    use crate::config::ServiceConfig;
    use crate::session::Session;

    fn request_with_cookie(cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/api/annotations/workload");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; sid=abc123"));
        headers.append(header::COOKIE, HeaderValue::from_static("other=1"));

        assert_eq!(cookie_value(&headers, "sid"), Some("abc123"));
        assert_eq!(cookie_value(&headers, "other"), Some("1"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_empty_cookie_is_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sid="));
        assert_eq!(cookie_value(&headers, "sid"), None);
    }

    #[test]
    fn test_valid_session_continues_with_extension() {
        let state = AppState::new(ServiceConfig::default());
        let session = state.sessions.create("alice");

        let cookie = format!("sid={}", session.id);
        match ensure_session(&state, request_with_cookie(Some(&cookie))) {
            Flow::Continue(request) => {
                assert_eq!(request.extensions().get::<Session>(), Some(&session));
            }
            Flow::Halt(_) => panic!("valid session was rejected"),
        }
    }

    #[tokio::test]
    async fn test_expired_session_halts_with_message() {
        let mut config = ServiceConfig::default();
        config.session.ttl_secs = 1;
        let state = AppState::new(config);
        let session = state.sessions.create_at("alice", 0);

        let cookie = format!("sid={}", session.id);
        let response = match ensure_session(&state, request_with_cookie(Some(&cookie))) {
            Flow::Halt(response) => response,
            Flow::Continue(_) => panic!("expired session was accepted"),
        };
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "unauthorized");
        assert_eq!(body["message"], "session expired");
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn test_missing_and_unknown_sessions_halt() {
        let state = AppState::new(ServiceConfig::default());

        for cookie in [None, Some("sid=nope")] {
            match ensure_session(&state, request_with_cookie(cookie)) {
                Flow::Halt(response) => assert_eq!(response.status(), StatusCode::UNAUTHORIZED),
                Flow::Continue(_) => panic!("request without a valid session continued"),
            }
        }
    }
}

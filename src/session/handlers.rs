use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::session::store::Session;

#[derive(Debug, Deserialize)]
pub struct CreateSession {
    pub user: String,
}

fn set_cookie(name: &str, value: &str, max_age: u64) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}"
    ))
    .ok()
}

pub async fn create_session(
    State(state): State<AppState>,
    payload: Result<Json<CreateSession>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let user = payload.user.trim();
    if user.is_empty() {
        return Err(ApiError::BadRequest("user must not be empty".into()));
    }

    let session = state.sessions.create(user);
    let mut headers = HeaderMap::new();
    if let Some(cookie) = set_cookie(
        &state.config.session.cookie_name,
        &session.id,
        state.sessions.ttl_secs(),
    ) {
        headers.insert(header::SET_COOKIE, cookie);
    }

    Ok((StatusCode::CREATED, headers, Json(session)).into_response())
}

pub async fn current_session(Extension(session): Extension<Session>) -> Json<Session> {
    Json(session)
}

pub async fn destroy_session(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Response {
    state.sessions.remove(&session.id);
    tracing::info!(user = %session.user, "Session closed");

    let mut headers = HeaderMap::new();
    if let Some(cookie) = set_cookie(&state.config.session.cookie_name, "", 0) {
        headers.insert(header::SET_COOKIE, cookie);
    }
    (StatusCode::NO_CONTENT, headers).into_response()
}

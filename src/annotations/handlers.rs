use std::collections::HashSet;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};

use crate::annotations::store::AnnotationStore;
use crate::annotations::types::{
    Annotation, AnnotationInput, AttributesResponse, OverallStats, PostAnnotations,
    PostAnnotationsResponse, Workload,
};
use crate::config::AnnotationsConfig;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::session::store::{now_secs, Session};

pub async fn get_attributes(State(state): State<AppState>) -> Json<AttributesResponse> {
    Json(AttributesResponse {
        attributes: state.config.annotations.attributes.clone(),
    })
}

pub async fn get_workload(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Json<Workload> {
    Json(state.annotations.workload(&state.config.annotations, &session.user))
}

pub async fn get_overall_stats(State(state): State<AppState>) -> Json<OverallStats> {
    Json(state.annotations.overall_stats(&state.config.annotations))
}

pub async fn post_annotations(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    payload: Result<Json<PostAnnotations>, JsonRejection>,
) -> Result<(StatusCode, Json<PostAnnotationsResponse>), ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let checked = validate_batch(&state.config.annotations, &payload.annotations)
        .and_then(|()| check_not_annotated(&state.annotations, &session.user, &payload.annotations));
    if let Err(e) = checked {
        tracing::warn!(user = %session.user, error = %e, "Rejected annotation batch");
        return Err(e);
    }

    let now = now_secs();
    let annotations = payload
        .annotations
        .into_iter()
        .map(|input| Annotation {
            item_id: input.item_id,
            attribute: input.attribute,
            value: input.value,
            annotator: session.user.clone(),
            created_at: now,
        })
        .collect();

    let stored = state.annotations.insert_batch(annotations);
    tracing::info!(user = %session.user, stored, "Annotations stored");

    Ok((StatusCode::CREATED, Json(PostAnnotationsResponse { stored })))
}

/// Check a whole batch before anything is stored.
pub fn validate_batch(config: &AnnotationsConfig, inputs: &[AnnotationInput]) -> Result<(), ApiError> {
    if inputs.is_empty() {
        return Err(ApiError::BadRequest("annotations must not be empty".into()));
    }

    let items: HashSet<&str> = config.items.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    for (index, input) in inputs.iter().enumerate() {
        if !seen.insert((input.item_id.as_str(), input.attribute.as_str())) {
            return Err(ApiError::Unprocessable(format!(
                "annotations[{index}]: duplicate annotation for '{}' / '{}'",
                input.item_id, input.attribute
            )));
        }

        if !items.contains(input.item_id.as_str()) {
            return Err(ApiError::Unprocessable(format!(
                "annotations[{index}]: unknown item '{}'",
                input.item_id
            )));
        }

        let attribute = config
            .attributes
            .iter()
            .find(|a| a.name == input.attribute)
            .ok_or_else(|| {
                ApiError::Unprocessable(format!(
                    "annotations[{index}]: unknown attribute '{}'",
                    input.attribute
                ))
            })?;

        if !attribute.values.contains(&input.value) {
            return Err(ApiError::Unprocessable(format!(
                "annotations[{index}]: '{}' is not a valid value for '{}'",
                input.value, input.attribute
            )));
        }
    }

    Ok(())
}

/// Each annotator labels an (item, attribute) pair at most once.
pub fn check_not_annotated(
    store: &AnnotationStore,
    annotator: &str,
    inputs: &[AnnotationInput],
) -> Result<(), ApiError> {
    match inputs
        .iter()
        .find(|input| store.has_annotation(&input.item_id, &input.attribute, annotator))
    {
        Some(input) => Err(ApiError::Conflict(format!(
            "'{}' / '{}' is already annotated by {annotator}",
            input.item_id, input.attribute
        ))),
        None => Ok(()),
    }
}

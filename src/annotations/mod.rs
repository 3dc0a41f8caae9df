//! Annotation endpoints under `/api/annotations`.
//!
//! | Method | Path           | Guards  | Controller        |
//! |--------|----------------|---------|-------------------|
//! | GET    | /attributes    | session | get_attributes    |
//! | GET    | /workload      | session | get_workload      |
//! | GET    | /overall-stats | -       | get_overall_stats |
//! | POST   | /              | session | post_annotations  |
//!
//! Overall stats are aggregate and public; everything tied to an annotator
//! needs a session.

pub mod handlers;
pub mod store;
pub mod types;

use axum::http::Method;
use axum::routing::{on, MethodFilter, MethodRouter};

use crate::http::server::AppState;
use crate::routing::{Guard, Route, RouteTable, RouteTableError};

pub use store::AnnotationStore;

pub const BASE_PATH: &str = "/api/annotations";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationsController {
    GetAttributes,
    GetWorkload,
    GetOverallStats,
    PostAnnotations,
}

pub fn route_table() -> Result<RouteTable<AnnotationsController>, RouteTableError> {
    RouteTable::new(
        BASE_PATH,
        vec![
            Route::new(Method::GET, "/attributes", AnnotationsController::GetAttributes)
                .guard(Guard::Session),
            Route::new(Method::GET, "/workload", AnnotationsController::GetWorkload)
                .guard(Guard::Session),
            Route::new(Method::GET, "/overall-stats", AnnotationsController::GetOverallStats),
            Route::new(Method::POST, "/", AnnotationsController::PostAnnotations)
                .guard(Guard::Session),
        ],
    )
}

pub fn endpoint(filter: MethodFilter, controller: AnnotationsController) -> MethodRouter<AppState> {
    match controller {
        AnnotationsController::GetAttributes => on(filter, handlers::get_attributes),
        AnnotationsController::GetWorkload => on(filter, handlers::get_workload),
        AnnotationsController::GetOverallStats => on(filter, handlers::get_overall_stats),
        AnnotationsController::PostAnnotations => on(filter, handlers::post_annotations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::config::ServiceConfig;

    #[test]
    fn test_table_has_exactly_four_entries() {
        let table = route_table().unwrap();
        assert_eq!(table.base_path(), "/api/annotations");

        let entries: Vec<_> = table
            .routes()
            .map(|r| (r.method.clone(), r.path.as_str(), r.guards.clone(), r.controller))
            .collect();
        assert_eq!(
            entries,
            vec![
                (Method::GET, "/attributes", vec![Guard::Session], AnnotationsController::GetAttributes),
                (Method::GET, "/workload", vec![Guard::Session], AnnotationsController::GetWorkload),
                (Method::GET, "/overall-stats", vec![], AnnotationsController::GetOverallStats),
                (Method::POST, "/", vec![Guard::Session], AnnotationsController::PostAnnotations),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_session_never_reaches_gated_controllers() {
        let state = AppState::new(ServiceConfig::default());
        let reached = Arc::new(std::sync::Mutex::new(Vec::new()));
        let hits = Arc::new(AtomicUsize::new(0));

        let (log, counter) = (reached.clone(), hits.clone());
        let app = route_table()
            .unwrap()
            .into_router(&state, move |filter, controller| {
                let (log, counter) = (log.clone(), counter.clone());
                on(filter, move || {
                    let (log, counter) = (log.clone(), counter.clone());
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        log.lock().unwrap().push(controller);
                        StatusCode::OK
                    }
                })
            })
            .with_state(state);

        for (method, uri) in [
            (Method::GET, "/api/annotations/attributes"),
            (Method::GET, "/api/annotations/workload"),
            (Method::POST, "/api/annotations"),
        ] {
            let req = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
            let res = app.clone().oneshot(req).await.unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        let req = Request::builder()
            .uri("/api/annotations/overall-stats")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            *reached.lock().unwrap(),
            vec![AnnotationsController::GetOverallStats]
        );
    }
}

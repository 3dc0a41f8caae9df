//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compose the Axum router from the route tables and the frontend pages
//! - Wire up middleware (request ID, tracing, timeout, body limit, metrics)
//! - Bind server to listener and shut down gracefully

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::annotations::{self, AnnotationStore};
use crate::config::ServiceConfig;
use crate::frontend::pages;
use crate::lifecycle::shutdown::wait_for;
use crate::observability::metrics;
use crate::routing::RouteTableError;
use crate::session::{self, SessionStore};

/// Application state injected into handlers and guards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub sessions: SessionStore,
    pub annotations: AnnotationStore,
}

impl AppState {
    /// State with an empty annotation store that saves to the configured snapshot path.
    pub fn new(config: ServiceConfig) -> Self {
        let snapshot = config.annotations.snapshot_path.as_ref().map(PathBuf::from);
        Self::with_store(config, AnnotationStore::new(snapshot))
    }

    pub fn with_store(config: ServiceConfig, annotations: AnnotationStore) -> Self {
        Self {
            sessions: SessionStore::new(config.session.ttl_secs),
            config: Arc::new(config),
            annotations,
        }
    }
}

/// Build the full application router.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Result<Router, RouteTableError> {
    let config = state.config.clone();

    let api = annotations::route_table()?
        .into_router(&state, annotations::endpoint)
        .merge(session::route_table()?.into_router(&state, session::endpoint));

    Ok(Router::new()
        .route("/", get(pages::home))
        .route("/annotate", get(pages::annotate))
        .route("/health", get(|| async { "ok" }))
        .merge(api)
        .with_state(state)
        .layer(middleware::from_fn(metrics::track_metrics))
        .layer(DefaultBodyLimit::max(config.security.max_body_size))
        .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid)))
}

/// HTTP server for the annotation service.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server. Fails if a route table is invalid.
    pub fn new(state: AppState) -> Result<Self, RouteTableError> {
        let router = build_router(state.clone())?;
        Ok(Self { router, state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run until `shutdown` fires, then save the annotation snapshot even if serving failed.
    pub async fn run_and_snapshot(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let annotations = self.state.annotations.clone();
        let served = self.run(listener, shutdown).await;
        finish_with_snapshot(served, &annotations)
    }
}

/// Save the snapshot, then hand back the serve result unchanged.
pub fn finish_with_snapshot(
    served: Result<(), std::io::Error>,
    annotations: &AnnotationStore,
) -> Result<(), std::io::Error> {
    if let Err(e) = &served {
        tracing::error!(error = %e, "HTTP server failed");
    }
    if let Err(e) = annotations.save_to_file() {
        tracing::error!(error = %e, "Failed to save annotation snapshot");
    }
    served
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    use crate::annotations::types::Annotation;

    fn store_with_one(path: PathBuf) -> AnnotationStore {
        let store = AnnotationStore::new(Some(path));
        store.insert_batch(vec![Annotation {
            item_id: "item-1".to_string(),
            attribute: "sentiment".to_string(),
            value: "neutral".to_string(),
            annotator: "alice".to_string(),
            created_at: 0,
        }]);
        store
    }

    #[test]
    fn test_snapshot_saved_when_serving_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotations.json");
        let store = store_with_one(path.clone());

        let result = finish_with_snapshot(
            Err(std::io::Error::new(ErrorKind::Other, "accept failed")),
            &store,
        );

        assert_eq!(result.unwrap_err().kind(), ErrorKind::Other);
        let loaded = AnnotationStore::load_from_file(&path).unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[tokio::test]
    async fn test_run_and_snapshot_saves_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotations.json");
        let state = AppState::with_store(ServiceConfig::default(), store_with_one(path.clone()));
        let server = HttpServer::new(state).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let shutdown = crate::lifecycle::Shutdown::new();
        let rx = shutdown.subscribe();
        let handle = tokio::spawn(server.run_and_snapshot(listener, rx));

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        assert!(path.exists());
        assert_eq!(AnnotationStore::load_from_file(&path).unwrap().len(), 1);
    }
}

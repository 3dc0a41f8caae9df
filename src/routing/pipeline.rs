//! Ordered guard pipeline run in front of a controller.
//!
//! Each guard either hands the request on (`Flow::Continue`) or answers it
//! itself (`Flow::Halt`). The first halt ends the chain; the controller only
//! runs once every guard has continued.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::server::AppState;
use crate::session::ensure_session;

/// Result of a single pipeline stage.
pub enum Flow {
    Continue(Request<Body>),
    Halt(Response),
}

/// Named precondition attached to routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Guard {
    /// Requires an active annotator session.
    Session,
}

impl Guard {
    pub fn name(&self) -> &'static str {
        match self {
            Guard::Session => "session",
        }
    }

    pub fn check(&self, state: &AppState, request: Request<Body>) -> Flow {
        match self {
            Guard::Session => ensure_session(state, request),
        }
    }
}

/// The guards of one route, bound to the shared application state.
#[derive(Clone)]
pub struct GuardChain {
    guards: Arc<[Guard]>,
    state: AppState,
}

impl GuardChain {
    pub fn new(guards: &[Guard], state: AppState) -> Self {
        Self {
            guards: guards.into(),
            state,
        }
    }

    /// Run every guard in order, stopping at the first halt.
    pub fn run(&self, mut request: Request<Body>) -> Flow {
        for guard in self.guards.iter() {
            match guard.check(&self.state, request) {
                Flow::Continue(next) => request = next,
                Flow::Halt(response) => {
                    tracing::debug!(guard = guard.name(), status = %response.status(), "Pipeline halted");
                    return Flow::Halt(response);
                }
            }
        }
        Flow::Continue(request)
    }
}

/// Middleware adapter: run the chain, then the controller if nothing halted.
pub async fn run_guards(
    State(chain): State<GuardChain>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match chain.run(request) {
        Flow::Continue(request) => next.run(request).await,
        Flow::Halt(response) => response,
    }
}

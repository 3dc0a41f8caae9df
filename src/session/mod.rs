//! Annotator sessions.
//!
//! # Data Flow
//! ```text
//! POST /api/session {user}
//!     → store.rs (new session, uuid id)
//!     → Set-Cookie: <cookie_name>=<id>
//!
//! Gated request with Cookie header
//!     → gate.rs (cookie → store lookup)
//!     → Session attached as request extension, or 401
//! ```

pub mod gate;
pub mod handlers;
pub mod store;

use axum::http::Method;
use axum::routing::{on, MethodFilter, MethodRouter};

use crate::http::server::AppState;
use crate::routing::{Guard, Route, RouteTable, RouteTableError};

pub use gate::ensure_session;
pub use store::{Session, SessionLookup, SessionStore};

pub const BASE_PATH: &str = "/api/session";

/// Handlers reachable through the session route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionController {
    Create,
    Current,
    Destroy,
}

pub fn route_table() -> Result<RouteTable<SessionController>, RouteTableError> {
    RouteTable::new(
        BASE_PATH,
        vec![
            Route::new(Method::POST, "/", SessionController::Create),
            Route::new(Method::GET, "/", SessionController::Current).guard(Guard::Session),
            Route::new(Method::DELETE, "/", SessionController::Destroy).guard(Guard::Session),
        ],
    )
}

pub fn endpoint(filter: MethodFilter, controller: SessionController) -> MethodRouter<AppState> {
    match controller {
        SessionController::Create => on(filter, handlers::create_session),
        SessionController::Current => on(filter, handlers::current_session),
        SessionController::Destroy => on(filter, handlers::destroy_session),
    }
}

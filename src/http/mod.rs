//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request ID, trace, timeout, body limit, metrics)
//!     → route tables (annotations, session) and frontend pages
//!     → guard pipeline → controller
//!     → response.rs (errors as JSON)
//! ```

pub mod response;
pub mod server;

pub use response::ApiError;
pub use server::{build_router, AppState, HttpServer};

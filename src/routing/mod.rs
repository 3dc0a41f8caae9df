//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     Route<H>[] under a base path
//!     → table.rs (validate uniqueness and paths)
//!     → into_router (resolve controllers, attach guard chains)
//!     → Freeze as immutable axum Router
//!
//! Incoming Request
//!     → axum path/method match
//!     → pipeline.rs (guards in declared order, first halt wins)
//!     → controller
//! ```

pub mod pipeline;
pub mod table;

pub use pipeline::{Flow, Guard, GuardChain};
pub use table::{Route, RouteTable, RouteTableError};

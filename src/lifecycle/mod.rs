//! Lifecycle management.
//!
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build route tables → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain requests → Save snapshot → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;

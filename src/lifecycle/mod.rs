//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config -> Validate -> Compile routes/resolver -> Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received -> Stop accepting -> Drain in-flight -> Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

pub mod shutdown;

pub use shutdown::Shutdown;

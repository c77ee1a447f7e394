//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     -> table.rs (ordered first-match lookup)
//!     -> Return: matched Route or None (404, no backend contacted)
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     -> compile rewrite rules, breakers, fallbacks
//!     -> reject duplicate predicates
//!     -> freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in the match path (prefix matching only)
//! - Deterministic: same input always matches same route

pub mod route;
pub mod table;

pub use route::Route;
pub use table::RouteTable;

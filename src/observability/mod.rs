//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     -> logging.rs (structured log events)
//!     -> metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     -> Log aggregation (stdout)
//!     -> Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging; the correlation id flows through all subsystems
//! - Metrics are cheap (facade no-ops without an installed recorder)

pub mod logging;
pub mod metrics;

//! promexp core: the metric/label data model, the filter engine, and the
//! shared error surface.
//!
//! This crate carries no transport or runtime dependencies; the HTTP server,
//! config loader, and cache layer live in `promexp-server` and build on the
//! types defined here.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Every fallible
//! path surfaces as `ExporterError`/`Result` so a bad config value or a bad
//! scrape request never takes the exporter down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod filter;
pub mod labels;
pub mod metric;
pub mod registry;

/// Shared result type.
pub use error::{ErrorCode, ExporterError, Result};
pub use filter::{filter_metrics, filter_with_universe};
pub use labels::{LabelFilter, LabelSet};
pub use metric::{Metric, MetricType, MetricValue, ValueSource};
pub use registry::LabelRegistry;

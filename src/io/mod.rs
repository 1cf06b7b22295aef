//! Input/output helpers.
//!
//! - header → field resolution (`normalize`)
//! - row coercion into a `MetricSeries` (`ingest`)
//! - series exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;
pub mod normalize;

pub use export::*;
pub use ingest::*;
pub use normalize::*;

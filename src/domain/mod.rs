//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the internal column vocabulary (`Field`)
//! - normalized observations (`ObservationRow`, `MetricSeries`)
//! - goals and the latest-record status (`GoalTable`, `StatusSnapshot`)

pub mod types;

pub use types::*;

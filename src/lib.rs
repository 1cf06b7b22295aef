//! `health-series` library crate.
//!
//! The binary (`health`) is a thin wrapper around this library so that:
//!
//! - the ingest pipeline is testable without spawning processes
//! - other front-ends can consume `MetricSeries` and `StatusSnapshot` directly
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod report;

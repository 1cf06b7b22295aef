//! Data sources: fetching raw tables and caching them.
//!
//! - URL / file / inline fetch into `RawTable` (`source`)
//! - per-source TTL cache (`cache`)
//! - embedded demo dataset (`sample`)

pub mod cache;
pub mod sample;
pub mod source;

pub use cache::TtlCache;
pub use sample::{demo_source, DEMO_TABLE};
pub use source::{export_url, fetch_table, parse_table, HttpClient, HttpFetch, RawTable, SourceDescriptor};

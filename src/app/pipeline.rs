//! Shared load pipeline used by every front-end command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! fetch (cached) -> normalize columns -> coerce rows -> latest status
//!
//! The commands can then focus on presentation (cards vs table vs export).

use std::sync::Arc;

use crate::config::Settings;
use crate::data::{fetch_table, HttpClient, HttpFetch, RawTable, SourceDescriptor, TtlCache};
use crate::domain::StatusSnapshot;
use crate::error::{AppError, LoadError};
use crate::io::ingest::{build_series, IngestedSeries};
use crate::io::normalize::{resolve_columns, ColumnMap};
use crate::report::latest_status;

/// All computed outputs of a single load.
#[derive(Debug, Clone)]
pub struct LoadOutput {
    pub columns: ColumnMap,
    pub ingest: IngestedSeries,
    pub status: StatusSnapshot,
    /// Whether the raw table came from the cache.
    pub cached: bool,
}

/// Owns the HTTP client and the per-source table cache.
///
/// One `Loader` lives for the whole process; repeated loads of the same source
/// inside the TTL reuse the cached table.
pub struct Loader<F = HttpClient> {
    settings: Settings,
    http: F,
    cache: TtlCache<SourceDescriptor, RawTable>,
}

impl Loader<HttpClient> {
    pub fn new(settings: Settings) -> Result<Self, AppError> {
        let http = HttpClient::new(settings.fetch_timeout)
            .map_err(|e| AppError::config("http", format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_fetcher(settings, http))
    }
}

impl<F: HttpFetch> Loader<F> {
    pub fn with_fetcher(settings: Settings, http: F) -> Self {
        let cache = TtlCache::new(settings.cache_ttl);
        Self { settings, http, cache }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn fetcher(&self) -> &F {
        &self.http
    }

    /// Fetch the raw table through the cache.
    pub fn fetch(&self, source: &SourceDescriptor) -> Result<(Arc<RawTable>, bool), LoadError> {
        let (table, cached) = self
            .cache
            .get_or_try_load(source, || fetch_table(source, &self.http))
            .map_err(|cause| LoadError::SourceUnavailable {
                source_desc: source.to_string(),
                cause,
            })?;
        if cached {
            tracing::info!(%source, "using cached table");
        }
        Ok((table, cached))
    }

    /// Run one full load: fetch -> normalize -> coerce -> extract.
    pub fn load(&self, source: &SourceDescriptor) -> Result<LoadOutput, LoadError> {
        let (table, cached) = self.fetch(source)?;

        let columns = resolve_columns(&table.headers, &self.settings.aliases)?;
        let ingest = build_series(&table, &columns)?;
        let status = latest_status(&ingest.series, &self.settings.goals);

        tracing::info!(
            %source,
            cached,
            rows_read = ingest.rows_read,
            rows_used = ingest.rows_used(),
            dropped = ingest.dropped.len(),
            "load complete"
        );

        Ok(LoadOutput {
            columns,
            ingest,
            status,
            cached,
        })
    }
}

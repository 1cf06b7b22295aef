//! Source fetcher: spreadsheet URL, local CSV file, or embedded table.
//!
//! Every source ends up as a `RawTable` (header labels + string cells). No
//! cleaning happens here beyond what the CSV reader does.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::SourceError;

const EXPORT_SUFFIX: &str = "/export?format=csv";

/// Where a load reads its table from. Also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceDescriptor {
    /// Spreadsheet share link or direct CSV endpoint.
    Url(String),
    /// Local CSV file.
    File(PathBuf),
    /// Literal CSV text embedded in the binary.
    Inline { name: String, text: String },
}

impl SourceDescriptor {
    pub fn inline(name: impl Into<String>, text: impl Into<String>) -> Self {
        SourceDescriptor::Inline {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceDescriptor::Url(url) => f.write_str(url),
            SourceDescriptor::File(path) => write!(f, "{}", path.display()),
            SourceDescriptor::Inline { name, .. } => write!(f, "inline:{name}"),
        }
    }
}

/// One table as read from a source, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Minimal HTTP seam so the loader can run against a stub in tests.
pub trait HttpFetch {
    /// GET `url` and return the body; non-success statuses are errors.
    fn get_text(&self, url: &str) -> Result<String, SourceError>;
}

/// Blocking `reqwest` client with a bounded per-request timeout.
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    fn classify(&self, err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            SourceError::Transport(err)
        }
    }
}

impl HttpFetch for HttpClient {
    fn get_text(&self, url: &str) -> Result<String, SourceError> {
        let resp = self.client.get(url).send().map_err(|e| self.classify(e))?;
        ensure_success(resp.status())?;
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        ensure_csv_content_type(content_type)?;
        resp.text().map_err(|e| self.classify(e))
    }
}

pub fn ensure_success(status: reqwest::StatusCode) -> Result<(), SourceError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(SourceError::Status {
            status: status.as_u16(),
        })
    }
}

/// Reject markup responses. A sheet that is not shared answers `200` with an
/// HTML sign-in page. A missing or unknown content type is let through.
pub fn ensure_csv_content_type(content_type: Option<&str>) -> Result<(), SourceError> {
    let Some(raw) = content_type else {
        return Ok(());
    };
    let essence = raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    if essence == "text/html" || essence == "application/xhtml+xml" {
        return Err(SourceError::NotCsv { found: essence });
    }
    Ok(())
}

/// Turn a spreadsheet share/edit link into its direct CSV export link.
///
/// `.../d/<id>/edit?usp=sharing` becomes `.../d/<id>/export?format=csv`. A tab
/// id (`gid=<n>`, in the query or the fragment) is carried over. Anything
/// without an `/edit` segment is returned unchanged.
pub fn export_url(url: &str) -> String {
    let url = url.trim();
    let Some(idx) = edit_segment(url) else {
        return url.to_string();
    };
    let (base, tail) = url.split_at(idx);
    let mut out = format!("{base}{EXPORT_SUFFIX}");
    if let Some(gid) = find_gid(tail) {
        out.push_str("&gid=");
        out.push_str(gid);
    }
    out
}

/// Byte offset of the last `/edit` path segment: followed by the end, `?`, `#`
/// or `/`, never a longer name like `/editions`.
fn edit_segment(url: &str) -> Option<usize> {
    url.match_indices("/edit")
        .filter(|(idx, m)| {
            url[idx + m.len()..]
                .chars()
                .next()
                .is_none_or(|c| matches!(c, '?' | '#' | '/'))
        })
        .map(|(idx, _)| idx)
        .last()
}

fn find_gid(tail: &str) -> Option<&str> {
    let start = tail.find("gid=")? + "gid=".len();
    let rest = &tail[start..];
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let gid = &rest[..end];
    if gid.is_empty() { None } else { Some(gid) }
}

/// Read a source into a `RawTable`.
pub fn fetch_table(source: &SourceDescriptor, http: &dyn HttpFetch) -> Result<RawTable, SourceError> {
    match source {
        SourceDescriptor::Url(url) => {
            let target = export_url(url);
            tracing::info!(url = %target, "fetching spreadsheet export");
            let body = http.get_text(&target)?;
            parse_table(&body)
        }
        SourceDescriptor::File(path) => {
            tracing::info!(path = %path.display(), "reading CSV file");
            let text = std::fs::read_to_string(path)?;
            parse_table(&text)
        }
        SourceDescriptor::Inline { text, .. } => parse_table(text),
    }
}

/// Parse CSV text; the first record is the header.
///
/// Rows whose length differs from the header are malformed and fail the
/// whole table. A body that opens with `<` is an HTML/XML document.
pub fn parse_table(text: &str) -> Result<RawTable, SourceError> {
    if text.trim_start_matches('\u{feff}').trim_start().starts_with('<') {
        return Err(SourceError::NotCsv {
            found: "an HTML/XML document".to_string(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(SourceError::MissingHeader);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

//! Error types for scraping and exporting seller listings

use reqwest::StatusCode;
use thiserror::Error;

/// Failures while collecting listing links from a seller profile
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("seller URL is empty")]
    EmptyUrl,

    /// Transport failure while requesting a page
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// The first seller page answered with a non-success status
    #[error("failed to fetch {url}: HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid listing selector: {0}")]
    Selector(String),

    #[error("invalid ad count pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid marketplace origin: {0}")]
    Origin(#[from] url::ParseError),
}

/// Failures while turning collected links into a downloadable file
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// The backend for this format was compiled out
    #[error("{format} export is unavailable: rebuild with the `{feature}` feature enabled")]
    MissingDependency {
        format: &'static str,
        feature: &'static str,
    },

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write spreadsheet: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// The document backend failed while packing the file
    #[error("failed to write document: {0}")]
    Document(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

//! # Listing Export
//!
//! Turns a list of listing URLs into a downloadable file. Four formats are
//! supported, selected by their file extension:
//!
//! - **txt**: one URL per line
//! - **csv**: a single `Listing URL` column with a header row
//! - **xlsx**: a one-sheet workbook with the same column
//! - **docx**: a heading followed by one paragraph per URL
//!
//! The document backend sits behind the `docx` cargo feature. When it is
//! compiled out, document exports fail up front with
//! [`ExportError::MissingDependency`] while the other formats keep working.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::ExportError;

#[cfg(feature = "docx")]
mod docx;
mod xlsx;

/// Column header used by the tabular formats
pub const LISTING_COLUMN: &str = "Listing URL";

pub const TEXT_MIME: &str = "text/plain";
pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

type DocumentWriter = fn(&[String]) -> Result<Vec<u8>, ExportError>;

/// File formats a link list can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Text,
    Csv,
    Spreadsheet,
    Document,
}

impl ExportFormat {
    pub const ALL: [Self; 4] = [Self::Text, Self::Csv, Self::Spreadsheet, Self::Document];

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Csv => "csv",
            Self::Spreadsheet => "xlsx",
            Self::Document => "docx",
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Text => TEXT_MIME,
            Self::Csv => CSV_MIME,
            Self::Spreadsheet => XLSX_MIME,
            Self::Document => DOCX_MIME,
        }
    }

    /// Fails when the backend for this format is not compiled in
    pub fn ensure_available(self) -> Result<(), ExportError> {
        self.check_backend(document_backend())
    }

    /// Encode `links` in this format
    pub fn encode(self, links: &[String]) -> Result<ExportFile, ExportError> {
        self.encode_with(links, document_backend())
    }

    fn check_backend(self, document: Option<DocumentWriter>) -> Result<(), ExportError> {
        if self == Self::Document {
            require(document)?;
        }
        Ok(())
    }

    fn encode_with(
        self,
        links: &[String],
        document: Option<DocumentWriter>,
    ) -> Result<ExportFile, ExportError> {
        let bytes = match self {
            Self::Text => links.join("\n").into_bytes(),
            Self::Csv => csv_bytes(links)?,
            Self::Spreadsheet => xlsx::write_workbook(links)?,
            Self::Document => {
                let write_document = require(document)?;
                write_document(links)?
            }
        };

        debug!("Encoded {} links as {} ({} bytes)", links.len(), self, bytes.len());

        Ok(ExportFile {
            content_type: self.content_type(),
            extension: self.extension(),
            bytes,
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ExportError::UnsupportedFormat(s.to_string()))
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// An encoded export ready to be written or downloaded
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub content_type: &'static str,
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Build a downloadable file of `links` in the format named by `file_type`
///
/// # Returns
/// * `Result<ExportFile, ExportError>` - The content type and payload, or
///   `UnsupportedFormat` for an unknown `file_type`
pub fn create_download_file(links: &[String], file_type: &str) -> Result<ExportFile, ExportError> {
    file_type.parse::<ExportFormat>()?.encode(links)
}

fn csv_bytes(links: &[String]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record([LISTING_COLUMN])?;
    for link in links {
        writer.write_record([link])?;
    }

    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// The document writer, when the `docx` feature is compiled in
#[cfg(feature = "docx")]
fn document_backend() -> Option<DocumentWriter> {
    Some(docx::write_document as DocumentWriter)
}

#[cfg(not(feature = "docx"))]
fn document_backend() -> Option<DocumentWriter> {
    None
}

fn require(document: Option<DocumentWriter>) -> Result<DocumentWriter, ExportError> {
    document.ok_or(ExportError::MissingDependency {
        format: "docx",
        feature: "docx",
    })
}

//! Result models handed back to the caller of a seller export

use crate::export::ExportFile;

/// Outcome of a successful seller export
///
/// A seller without listings is not an error, but callers must report it
/// differently from an export that produced a file.
#[derive(Debug, Clone)]
pub enum ExportOutcome {
    /// The seller profile yielded no listing links
    Empty,
    /// Links were found and encoded into `file`
    Exported { link_count: usize, file: ExportFile },
}

impl ExportOutcome {
    pub fn link_count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Exported { link_count, .. } => *link_count,
        }
    }
}

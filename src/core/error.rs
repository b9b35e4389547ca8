// domain and internal error taxonomy
use std::path::PathBuf;

use thiserror::Error;

use crate::core::diagnostics::DiagnosticReport;
use crate::core::types::HeaderKind;

pub type CapgenResult<T> = Result<T, CapgenError>;

/// Every way a generation run can fail.
///
/// All variants except `Internal` are domain failures: bad or inconsistent
/// input that a user can fix. `Internal` signals a defect in the loader or
/// extractor itself and is never caught or retried. There is no partial
/// mode anywhere; the first failure aborts the whole run.
#[derive(Debug, Error)]
pub enum CapgenError {
    /// Incompatible header kinds between a paired metadata/source header.
    /// Raised immediately, never accumulated with field-level diagnostics.
    #[error("metadata table type mismatch for {title}, {meta_kind} != {source_kind}{context}")]
    StructuralMismatch {
        title: String,
        meta_kind: HeaderKind,
        source_kind: HeaderKind,
        context: String,
    },

    /// All field/order/dimension mismatches found across one file's full
    /// validation, raised once with the complete report.
    #[error("{report}\n{num_errors} error(s) found comparing {meta_file} to {source_file}")]
    Consistency {
        report: DiagnosticReport,
        num_errors: usize,
        meta_file: String,
        source_file: String,
    },

    /// Title collision during aggregation.
    #[error("duplicate {kind}, {title}, found in {file}{}", original_note(.original_file))]
    DuplicateHeader {
        kind: HeaderKind,
        title: String,
        file: String,
        original_file: Option<String>,
    },

    /// A metadata header's title has no matching source header.
    #[error("no matching Fortran routine found for {title} in {source_file}")]
    UnresolvedHeader { title: String, source_file: String },

    /// Source headers with real declarations remained unpaired after all
    /// metadata headers were matched.
    #[error("no matching metadata header found for {} in {meta_file}", .titles.join(", "))]
    UnmatchedSourceHeaders { titles: Vec<String>, meta_file: String },

    /// A metadata variable's type is neither an intrinsic nor a known DDT.
    #[error("unknown type, {type_name}, for {local_name} in {title}{context}")]
    UnknownType {
        type_name: String,
        local_name: String,
        title: String,
        context: String,
    },

    /// A metadata header violates table rules (e.g. a scheme variable with
    /// no intent).
    #[error("invalid metadata header {title}: {message}{context}")]
    InvalidHeader {
        title: String,
        message: String,
        context: String,
    },

    /// No source signature file could be found for a metadata file.
    #[error("cannot find source signature file associated with {}", .meta_file.display())]
    MissingSourceFile { meta_file: PathBuf },

    /// An input file named on the command line (or in a list file) does
    /// not exist.
    #[error("{category} file not found: {}", .path.display())]
    MissingInputFile { category: String, path: PathBuf },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Loader/extractor invariant violation; always fatal, distinguished
    /// from domain errors at the process boundary.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CapgenError {
    pub fn is_internal(&self) -> bool {
        matches!(self, CapgenError::Internal(_))
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CapgenError::Io { path: path.into(), source }
    }
}

fn original_note(original_file: &Option<String>) -> String {
    match original_file {
        Some(file) => format!(", original found in {file}"),
        None => String::new(),
    }
}

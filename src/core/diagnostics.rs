// structured diagnostic records accumulated during header comparison
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::Provenance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    //fails the run
    Error,
    //tolerated, reported for visibility only
    Warning,
}

/// What went wrong, as a closed taxonomy so tests can assert on the kind
/// instead of parsing prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    //variable count mismatch between the two sides of a pair
    MissingVariables,
    //metadata names a variable the source never declares
    MissingSourceVariable,
    //scheme argument found at the wrong position
    OutOfOrderArgument,
    //local_name/type/kind/intent value mismatch
    PropertyMismatch,
    //dimension list lengths differ
    RankMismatch,
    //one dimension expression differs
    DimensionMismatch,
    //module/host/ddt source side has trailing local-only declarations
    ExtraSourceVariables,
}

/// One finding from comparing a metadata header against its source header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    //title of the header pair the finding belongs to
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub context: Option<Provenance>,
}

impl Diagnostic {
    pub fn error(
        kind: DiagnosticKind,
        title: impl Into<String>,
        message: impl Into<String>,
        context: Option<Provenance>,
    ) -> Self {
        Diagnostic {
            kind,
            severity: Severity::Error,
            title: title.into(),
            message: message.into(),
            context,
        }
    }

    pub fn warning(
        kind: DiagnosticKind,
        title: impl Into<String>,
        message: impl Into<String>,
        context: Option<Provenance>,
    ) -> Self {
        Diagnostic {
            kind,
            severity: Severity::Warning,
            title: title.into(),
            message: message.into(),
            context,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "{}", ctx.context_string())?;
        }
        Ok(())
    }
}

/// Ordered accumulation of diagnostics for one file's validation.
///
/// All mismatches across all header pairs of a file are collected here
/// before anything is raised, so one run reports every problem at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticReport {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, other: DiagnosticReport) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Count of discrete error lines; warnings never fail a run.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

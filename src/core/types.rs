// shared data model: metadata/source headers and their variables
use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of interface a header describes.
///
/// Metadata tables may be any of the four kinds; source headers only ever
/// come back from the extractor as module, scheme, or ddt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderKind {
    Module,
    Host,
    Ddt,
    Scheme,
}

impl HeaderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HeaderKind::Module => "module",
            HeaderKind::Host => "host",
            HeaderKind::Ddt => "ddt",
            HeaderKind::Scheme => "scheme",
        }
    }

    //module/host/ddt tables may carry extra trailing Fortran declarations
    //(local-only variables with no metadata counterpart)
    pub fn allows_extra_source_variables(self) -> bool {
        matches!(self, HeaderKind::Module | HeaderKind::Host | HeaderKind::Ddt)
    }

    //argument order is significant only for scheme tables
    pub fn is_ordered(self) -> bool {
        matches!(self, HeaderKind::Scheme)
    }
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared data-flow direction of a scheme argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    In,
    Out,
    InOut,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::In => "in",
            Intent::Out => "out",
            Intent::InOut => "inout",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a header came from, for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub file: String,
    #[serde(default)]
    pub line: Option<u32>,
}

impl Provenance {
    pub fn new(file: impl Into<String>) -> Self {
        Provenance { file: file.into(), line: None }
    }

    /// Render as a diagnostic suffix, e.g. ", at foo.meta.json:12".
    pub fn context_string(&self) -> String {
        match self.line {
            Some(line) => format!(", at {}:{}", self.file, line),
            None => format!(", in {}", self.file),
        }
    }
}

/// One variable row of a metadata table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataVariable {
    pub local_name: String,
    pub standard_name: String,
    #[serde(rename = "type")]
    pub var_type: String,
    #[serde(default)]
    pub kind: String,
    //meaningful only inside scheme tables
    #[serde(default)]
    pub intent: Option<Intent>,
    //each entry is a standard name or a "lo:hi" range
    #[serde(default)]
    pub dimensions: Vec<String>,
}

impl MetadataVariable {
    /// True iff the local name is an array-subscript expression rather than
    /// a plain identifier. Such rows reference an already-declared array and
    /// have no source-side declaration of their own.
    pub fn is_array_reference(&self) -> bool {
        self.local_name.contains('(')
    }
}

/// One validated metadata table header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataHeader {
    pub title: String,
    pub header_type: HeaderKind,
    #[serde(default)]
    pub variables: Vec<MetadataVariable>,
    #[serde(default)]
    pub context: Option<Provenance>,
}

impl MetadataHeader {
    /// Number of variables that correspond to real source declarations,
    /// i.e. excluding array-subscript references.
    pub fn declared_variable_count(&self) -> usize {
        self.variables
            .iter()
            .filter(|v| !v.is_array_reference())
            .count()
    }

    pub fn context_string(&self) -> String {
        self.context
            .as_ref()
            .map(Provenance::context_string)
            .unwrap_or_default()
    }
}

/// One variable declaration extracted from the source file.
///
/// Dimensions arrive already converted to standard-name vocabulary by the
/// extractor; they are trusted here, never re-normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceVariable {
    pub local_name: String,
    #[serde(rename = "type")]
    pub var_type: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub intent: Option<Intent>,
    #[serde(default)]
    pub dimensions: Vec<String>,
}

/// One routine/module header extracted from the source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceHeader {
    pub title: String,
    pub header_type: HeaderKind,
    #[serde(default)]
    pub variables: Vec<SourceVariable>,
    //an interface-only routine reports false and may stay unpaired
    #[serde(default)]
    pub has_variables: bool,
}

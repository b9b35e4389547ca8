// metadata-to-source consistency validation
//does this metadata table describe exactly what the source file declares?
/*

pair_headers:  title-keyed matching, at most one source header per
               metadata header, leftovers with real declarations are fatal

compare_headers: one header pair, every field-level mismatch collected
                 into a report (kind mismatch alone is structural/fatal)

validate_batch: whole file, every pair's report folded into a single
                Consistency error so one run surfaces every problem

*/
use tracing::debug;

use crate::core::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticReport};
use crate::core::error::{CapgenError, CapgenResult};
use crate::core::types::{HeaderKind, Intent, MetadataHeader, SourceHeader, SourceVariable};

/// A metadata header associated with its validated source header.
///
/// Downstream generation reads interface facts from the metadata side
/// only; the source side is retained for intent/dimension resolution.
#[derive(Debug, Clone)]
pub struct HeaderAssociation {
    pub metadata: MetadataHeader,
    pub source: SourceHeader,
}

/// Pair every metadata header with the source header sharing its title.
///
/// Titles are unique, so this is a direct keyed lookup; each matched
/// source header is removed from the candidate pool. A metadata header
/// with no source match is fatal, as is any leftover source header that
/// declares real variables.
pub fn pair_headers(
    meta_headers: Vec<MetadataHeader>,
    mut source_headers: Vec<SourceHeader>,
    meta_file: &str,
    source_file: &str,
) -> CapgenResult<Vec<HeaderAssociation>> {
    let mut associations = Vec::with_capacity(meta_headers.len());
    for metadata in meta_headers {
        let found = source_headers
            .iter()
            .position(|s| s.title == metadata.title);
        match found {
            Some(index) => {
                let source = source_headers.remove(index);
                associations.push(HeaderAssociation { metadata, source });
            }
            None => {
                let remaining: Vec<&str> =
                    source_headers.iter().map(|s| s.title.as_str()).collect();
                debug!("routines in {}: {}", source_file, remaining.join(", "));
                return Err(CapgenError::UnresolvedHeader {
                    title: metadata.title,
                    source_file: source_file.to_string(),
                });
            }
        }
    }
    //interface-only leftovers (no declarations) are fine; anything with
    //real variables was supposed to carry a metadata table
    let unmatched: Vec<String> = source_headers
        .iter()
        .filter(|s| s.has_variables)
        .map(|s| s.title.clone())
        .collect();
    if !unmatched.is_empty() {
        return Err(CapgenError::UnmatchedSourceHeaders {
            titles: unmatched,
            meta_file: meta_file.to_string(),
        });
    }
    Ok(associations)
}

/// Compare one metadata header against its paired source header.
///
/// Returns the accumulated field-level findings (empty report means the
/// pair is consistent). A header-kind mismatch is gross misclassification
/// and comes back as a `StructuralMismatch` error instead.
pub fn compare_headers(
    metadata: &MetadataHeader,
    source: &SourceHeader,
) -> CapgenResult<DiagnosticReport> {
    let mut report = DiagnosticReport::new();
    let meta_kind = metadata.header_type;
    let source_kind = source.header_type;
    if meta_kind != source_kind {
        //host state can legitimately be declared inside a module or a
        //scheme; such pairs carry no comparable variable lists
        if meta_kind == HeaderKind::Host
            && matches!(source_kind, HeaderKind::Module | HeaderKind::Scheme)
        {
            return Ok(report);
        }
        return Err(CapgenError::StructuralMismatch {
            title: metadata.title.clone(),
            meta_kind,
            source_kind,
            context: metadata.context_string(),
        });
    }

    compare_arity(metadata, source, &mut report);

    for (meta_index, mvar) in metadata.variables.iter().enumerate() {
        //array-subscript rows reference an already-declared array; there
        //is no source declaration to check them against
        if mvar.is_array_reference() {
            continue;
        }
        let found = source
            .variables
            .iter()
            .position(|s| s.local_name.eq_ignore_ascii_case(&mvar.local_name));
        let Some(source_index) = found else {
            report.push(Diagnostic::error(
                DiagnosticKind::MissingSourceVariable,
                metadata.title.as_str(),
                format!(
                    "no Fortran variable for {} in {}",
                    mvar.local_name, metadata.title
                ),
                metadata.context.clone(),
            ));
            //do not stop, collect all missing variables
            continue;
        };
        let svar = &source.variables[source_index];
        if meta_kind.is_ordered() && source_index != meta_index {
            report.push(Diagnostic::error(
                DiagnosticKind::OutOfOrderArgument,
                metadata.title.as_str(),
                format!(
                    "out of order argument, {} in {}",
                    mvar.local_name, metadata.title
                ),
                metadata.context.clone(),
            ));
            continue;
        }
        compare_property(metadata, "type", &mvar.var_type, &svar.var_type, &mut report);
        compare_property(metadata, "kind", &mvar.kind, &svar.kind, &mut report);
        if meta_kind == HeaderKind::Scheme {
            compare_property(
                metadata,
                "intent",
                intent_label(mvar.intent),
                intent_label(svar.intent),
                &mut report,
            );
        }
        compare_dimensions(
            metadata,
            mvar.standard_name.as_str(),
            &mvar.dimensions,
            svar,
            &mut report,
        );
    }
    Ok(report)
}

/// Pair and compare a whole file's headers, folding every pair's findings
/// into one report. Any error-severity finding fails the file as a single
/// `Consistency` error carrying the full text and the error count.
pub fn validate_batch(
    meta_headers: Vec<MetadataHeader>,
    source_headers: Vec<SourceHeader>,
    meta_file: &str,
    source_file: &str,
) -> CapgenResult<Vec<HeaderAssociation>> {
    let associations = pair_headers(meta_headers, source_headers, meta_file, source_file)?;
    let mut report = DiagnosticReport::new();
    for association in &associations {
        report.extend(compare_headers(&association.metadata, &association.source)?);
    }
    if !report.is_clean() {
        return Err(CapgenError::Consistency {
            num_errors: report.error_count(),
            report,
            meta_file: meta_file.to_string(),
            source_file: source_file.to_string(),
        });
    }
    Ok(associations)
}

//variable count reconciliation: exact for schemes, extra trailing source
//declarations tolerated for module/host/ddt tables
fn compare_arity(metadata: &MetadataHeader, source: &SourceHeader, report: &mut DiagnosticReport) {
    let meta_count = metadata.declared_variable_count();
    let source_count = source.variables.len();
    if meta_count == source_count {
        return;
    }
    let kind = source.header_type;
    if kind.allows_extra_source_variables() && source_count > meta_count {
        //trailing local-only declarations are fine for these table kinds
        report.push(Diagnostic::warning(
            DiagnosticKind::ExtraSourceVariables,
            metadata.title.as_str(),
            format!(
                "{} extra Fortran variable(s) in {}",
                source_count - meta_count,
                metadata.title
            ),
            metadata.context.clone(),
        ));
        return;
    }
    let deficient = if source_count > meta_count {
        "metadata header".to_string()
    } else {
        format!("Fortran {kind}")
    };
    report.push(Diagnostic::error(
        DiagnosticKind::MissingVariables,
        metadata.title.as_str(),
        format!(
            "variable mismatch in {}, variables missing from {}",
            metadata.title, deficient
        ),
        metadata.context.clone(),
    ));
}

fn compare_property(
    metadata: &MetadataHeader,
    property: &str,
    meta_value: &str,
    source_value: &str,
    report: &mut DiagnosticReport,
) {
    if !meta_value.eq_ignore_ascii_case(source_value) {
        report.push(Diagnostic::error(
            DiagnosticKind::PropertyMismatch,
            metadata.title.as_str(),
            format!(
                "{} mismatch ({} != {}) in {}",
                property,
                meta_value.to_ascii_lowercase(),
                source_value.to_ascii_lowercase(),
                metadata.title
            ),
            metadata.context.clone(),
        ));
    }
}

fn compare_dimensions(
    metadata: &MetadataHeader,
    standard_name: &str,
    meta_dims: &[String],
    svar: &SourceVariable,
    report: &mut DiagnosticReport,
) {
    let source_dims = &svar.dimensions;
    if meta_dims.len() != source_dims.len() {
        report.push(Diagnostic::error(
            DiagnosticKind::RankMismatch,
            metadata.title.as_str(),
            format!(
                "rank mismatch in {}/{} ({} != {})",
                metadata.title,
                standard_name,
                meta_dims.len(),
                source_dims.len()
            ),
            metadata.context.clone(),
        ));
        return;
    }
    for (index, (mdim, sdim)) in meta_dims.iter().zip(source_dims).enumerate() {
        if !dims_match(mdim, sdim) {
            report.push(Diagnostic::error(
                DiagnosticKind::DimensionMismatch,
                metadata.title.as_str(),
                format!(
                    "dim {} mismatch ({} != {}) in {}/{}",
                    index + 1,
                    mdim.trim(),
                    sdim.trim(),
                    metadata.title,
                    standard_name
                ),
                metadata.context.clone(),
            ));
        }
    }
}

//split any lo:hi range, trim and lowercase every bound, then compare;
//a naked colon on the source side matches any assumed-shape dimension
fn dims_match(meta_dim: &str, source_dim: &str) -> bool {
    let source = normalize_dimension(source_dim);
    if source == ":" {
        return true;
    }
    normalize_dimension(meta_dim) == source
}

fn normalize_dimension(dim: &str) -> String {
    dim.split(':')
        .map(|bound| bound.trim().to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(":")
}

fn intent_label(intent: Option<Intent>) -> &'static str {
    match intent {
        Some(intent) => intent.as_str(),
        None => "none",
    }
}

// loading metadata and source-signature records
use std::path::Path;

use crate::core::aggregate::KnownDdts;
use crate::core::error::{CapgenError, CapgenResult};
use crate::core::types::{HeaderKind, MetadataHeader, Provenance, SourceHeader};

//types a metadata variable may carry without a DDT declaration
const INTRINSIC_TYPES: &[&str] = &["real", "integer", "logical", "character", "complex"];

/// Load the ordered metadata headers of one file.
///
/// Each header gets the file recorded as provenance, and its variables
/// are checked against the types visible at this point of the run: the
/// Fortran intrinsics, the DDTs registered by earlier files, and DDT
/// headers earlier in this file. Types declared later are not visible
/// (strictly forward).
pub fn load_metadata_file(
    path: &Path,
    known_ddts: &KnownDdts,
) -> CapgenResult<Vec<MetadataHeader>> {
    let text = std::fs::read_to_string(path).map_err(|e| CapgenError::io(path, e))?;
    let mut headers: Vec<MetadataHeader> = serde_json::from_str(&text)
        .map_err(|e| CapgenError::Parse { path: path.to_path_buf(), source: e })?;
    let mut visible = known_ddts.clone();
    for header in &mut headers {
        if header.context.is_none() {
            header.context = Some(Provenance::new(path.display().to_string()));
        }
        check_header(header, &visible)?;
        if header.header_type == HeaderKind::Ddt {
            visible.push(header.title.clone());
        }
    }
    Ok(headers)
}

/// Load the ordered source headers extracted from one source file.
///
/// The extractor has already normalized dimensions to standard-name
/// vocabulary; its records are trusted as-is.
pub fn load_source_file(path: &Path) -> CapgenResult<Vec<SourceHeader>> {
    let text = std::fs::read_to_string(path).map_err(|e| CapgenError::io(path, e))?;
    let headers: Vec<SourceHeader> = serde_json::from_str(&text)
        .map_err(|e| CapgenError::Parse { path: path.to_path_buf(), source: e })?;
    for header in &headers {
        //the extractor never produces host headers; that is a defect in
        //the extractor, not in the user's input
        if header.header_type == HeaderKind::Host {
            return Err(CapgenError::Internal(format!(
                "extractor produced a host header, {}, in {}",
                header.title,
                path.display()
            )));
        }
    }
    Ok(headers)
}

fn check_header(header: &MetadataHeader, known_ddts: &KnownDdts) -> CapgenResult<()> {
    let context = header.context_string();
    for variable in &header.variables {
        if variable.is_array_reference() {
            //references an already-declared array, no type of its own
            continue;
        }
        let type_name = variable.var_type.trim();
        let intrinsic = INTRINSIC_TYPES
            .iter()
            .any(|t| t.eq_ignore_ascii_case(type_name));
        if !intrinsic && !known_ddts.contains(type_name) {
            return Err(CapgenError::UnknownType {
                type_name: variable.var_type.clone(),
                local_name: variable.local_name.clone(),
                title: header.title.clone(),
                context,
            });
        }
        if header.header_type == HeaderKind::Scheme && variable.intent.is_none() {
            return Err(CapgenError::InvalidHeader {
                title: header.title.clone(),
                message: format!("no intent for {}", variable.local_name),
                context,
            });
        }
        //intent on module/host/ddt variables is meaningless and ignored
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_file(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn metadata_headers_load_in_order_with_provenance() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "rain.meta.json",
            r#"[
                {"title": "rain_init", "header_type": "scheme", "variables": []},
                {"title": "rain_run", "header_type": "scheme", "variables": [
                    {"local_name": "im", "standard_name": "horizontal_loop_extent",
                     "type": "integer", "intent": "in"}
                ]}
            ]"#,
        );
        let headers = load_metadata_file(&path, &KnownDdts::new()).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].title, "rain_init");
        assert_eq!(headers[1].title, "rain_run");
        let ctx = headers[1].context.as_ref().unwrap();
        assert!(ctx.file.ends_with("rain.meta.json"));
    }

    //the declaring file must come first: a type is only known once a
    //ddt header from an earlier file registered it
    #[test]
    fn ddt_types_are_only_visible_when_already_registered() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "scheme.meta.json",
            r#"[
                {"title": "cloud_run", "header_type": "scheme", "variables": [
                    {"local_name": "state", "standard_name": "physics_state",
                     "type": "state_type", "intent": "inout"}
                ]}
            ]"#,
        );

        //not yet declared anywhere: unresolved type
        let err = load_metadata_file(&path, &KnownDdts::new()).unwrap_err();
        match err {
            CapgenError::UnknownType { type_name, local_name, title, .. } => {
                assert_eq!(type_name, "state_type");
                assert_eq!(local_name, "state");
                assert_eq!(title, "cloud_run");
            }
            other => panic!("unexpected error: {other}"),
        }

        //declared by an earlier file: loads fine
        let mut ddts = KnownDdts::new();
        ddts.push("state_type");
        let headers = load_metadata_file(&path, &ddts).unwrap();
        assert_eq!(headers.len(), 1);
    }

    //a ddt declared earlier in the same file is visible to the headers
    //after it, but never to the ones before it
    #[test]
    fn ddt_visibility_is_forward_within_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let forward = write_file(
            &dir,
            "host.meta.json",
            r#"[
                {"title": "state_type", "header_type": "ddt", "variables": [
                    {"local_name": "temp", "standard_name": "air_temperature",
                     "type": "real", "kind": "kind_phys"}
                ]},
                {"title": "host_vars", "header_type": "host", "variables": [
                    {"local_name": "state", "standard_name": "physics_state",
                     "type": "state_type"}
                ]}
            ]"#,
        );
        let headers = load_metadata_file(&forward, &KnownDdts::new()).unwrap();
        assert_eq!(headers.len(), 2);

        let backward = write_file(
            &dir,
            "host2.meta.json",
            r#"[
                {"title": "host_vars2", "header_type": "host", "variables": [
                    {"local_name": "state", "standard_name": "physics_state",
                     "type": "flux_type"}
                ]},
                {"title": "flux_type", "header_type": "ddt", "variables": []}
            ]"#,
        );
        let err = load_metadata_file(&backward, &KnownDdts::new()).unwrap_err();
        assert!(matches!(err, CapgenError::UnknownType { .. }));
    }

    #[test]
    fn scheme_variables_must_carry_intent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "rain.meta.json",
            r#"[
                {"title": "rain_run", "header_type": "scheme", "variables": [
                    {"local_name": "im", "standard_name": "horizontal_loop_extent",
                     "type": "integer"}
                ]}
            ]"#,
        );
        let err = load_metadata_file(&path, &KnownDdts::new()).unwrap_err();
        match err {
            CapgenError::InvalidHeader { title, message, .. } => {
                assert_eq!(title, "rain_run");
                assert_eq!(message, "no intent for im");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_records_are_parse_errors_not_panics() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "bad.meta.json", "{ not json ]");
        let err = load_metadata_file(&path, &KnownDdts::new()).unwrap_err();
        assert!(matches!(err, CapgenError::Parse { .. }));
    }

    #[test]
    fn extractor_host_headers_are_internal_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "rain.sig.json",
            r#"[{"title": "host_vars", "header_type": "host", "variables": [],
                "has_variables": false}]"#,
        );
        let err = load_source_file(&path).unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn source_headers_load_with_variables() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "rain.sig.json",
            r#"[
                {"title": "rain_run", "header_type": "scheme", "has_variables": true,
                 "variables": [
                    {"local_name": "im", "type": "integer", "intent": "in"}
                ]}
            ]"#,
        );
        let headers = load_source_file(&path).unwrap();
        assert_eq!(headers.len(), 1);
        assert!(headers[0].has_variables);
        assert_eq!(headers[0].variables[0].local_name, "im");
    }
}

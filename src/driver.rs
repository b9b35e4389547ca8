// per-run orchestration: hosts first, then schemes, then generation
//
// Everything here is strictly sequential. DDT visibility depends on the
// caller-supplied file order, so each file is fully parsed, validated,
// and folded into the running state before the next one starts.
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::codegen::datatable::{Datatable, write_datatable};
use crate::codegen::kinds::write_kinds_file;
use crate::core::aggregate::{HostModel, KnownDdts, SchemeLibrary};
use crate::core::compare::{HeaderAssociation, validate_batch};
use crate::core::error::{CapgenError, CapgenResult};
use crate::input::files::{create_file_list, find_associated_source_file};
use crate::input::loader::{load_metadata_file, load_source_file};

/// Everything one generation run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub host_files: String,
    pub scheme_files: String,
    pub suites: String,
    pub datatable: PathBuf,
    pub output_root: PathBuf,
    pub host_name: Option<String>,
    pub kind_phys: String,
}

//load one metadata/signature pair and reconcile them; on success hand
//back the validated metadata headers in declaration order
fn validate_file(
    meta_path: &Path,
    known_ddts: &KnownDdts,
) -> CapgenResult<Vec<HeaderAssociation>> {
    let meta_headers = load_metadata_file(meta_path, known_ddts)?;
    let source_path = find_associated_source_file(meta_path)?;
    let source_headers = load_source_file(&source_path)?;
    validate_batch(
        meta_headers,
        source_headers,
        &meta_path.display().to_string(),
        &source_path.display().to_string(),
    )
}

/// Gather host-side information (DDTs, host state) from the host files
/// and fold it into a host model.
pub fn parse_host_model_files(
    host_files: &[PathBuf],
    host_name: Option<&str>,
    known_ddts: &mut KnownDdts,
) -> CapgenResult<HostModel> {
    let mut model = HostModel::new(host_name.map(str::to_string));
    for file in host_files {
        info!("reading host model data from {}", file.display());
        let associations = validate_file(file, known_ddts)?;
        for association in associations {
            //the per-file source headers are done; only the metadata
            //side is folded forward
            model.register_header(
                association.metadata,
                &file.display().to_string(),
                known_ddts,
            )?;
        }
    }
    Ok(model)
}

/// Gather scheme entry points (init/run/finalize headers) from the
/// scheme files, after all host files have been folded.
pub fn parse_scheme_files(
    scheme_files: &[PathBuf],
    host_model: &HostModel,
    known_ddts: &mut KnownDdts,
) -> CapgenResult<SchemeLibrary> {
    let mut schemes = SchemeLibrary::new();
    for file in scheme_files {
        info!("reading schemes from {}", file.display());
        let associations = validate_file(file, known_ddts)?;
        for association in associations {
            schemes.register_header(
                association.metadata,
                &file.display().to_string(),
                host_model,
                known_ddts,
            )?;
        }
    }
    Ok(schemes)
}

/// Run a full generation pass: validate and aggregate every input file,
/// then write the kinds module and the datatable manifest.
pub fn run_capgen(config: &RunConfig) -> CapgenResult<()> {
    let host_files = create_file_list(&config.host_files, "host")?;
    let scheme_files = create_file_list(&config.scheme_files, "scheme")?;
    let suite_files = create_file_list(&config.suites, "suite")?;
    if !config.output_root.exists() {
        std::fs::create_dir_all(&config.output_root)
            .map_err(|e| CapgenError::io(&config.output_root, e))?;
    }

    let mut known_ddts = KnownDdts::new();
    let host_model =
        parse_host_model_files(&host_files, config.host_name.as_deref(), &mut known_ddts)?;
    let schemes = parse_scheme_files(&scheme_files, &host_model, &mut known_ddts)?;

    if !known_ddts.is_empty() {
        debug!("ddt definitions = {:?}", known_ddts.titles());
    }
    debug!("host variables = {:?}", host_model.local_name_list());
    debug!("schemes = {:?}", schemes.titles());

    let kinds_path = write_kinds_file(&config.kind_phys, &config.output_root)?;
    let table = Datatable {
        host_name: host_model.name().map(str::to_string),
        host_variables: host_model.local_name_list(),
        scheme_titles: schemes.titles().to_vec(),
        suite_files: suite_files
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        generated_files: vec![kinds_path.display().to_string()],
    };
    write_datatable(&config.datatable, &table)?;
    Ok(())
}

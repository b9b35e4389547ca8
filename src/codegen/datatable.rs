// datatable manifest: what a run generated, for consumers and clean mode
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::{CapgenError, CapgenResult};

/// Build-metadata record written after a successful run.
///
/// Downstream consumers (suite assembler, host-cap writer) read the model
/// summary from here; clean mode reads `generated_files` to know what to
/// remove.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datatable {
    #[serde(default)]
    pub host_name: Option<String>,
    #[serde(default)]
    pub host_variables: Vec<String>,
    #[serde(default)]
    pub scheme_titles: Vec<String>,
    #[serde(default)]
    pub suite_files: Vec<String>,
    #[serde(default)]
    pub generated_files: Vec<String>,
}

pub fn write_datatable(path: &Path, table: &Datatable) -> CapgenResult<()> {
    info!("writing datatable to {}", path.display());
    let text = serde_json::to_string_pretty(table)
        .map_err(|e| CapgenError::Internal(format!("datatable serialization failed: {e}")))?;
    std::fs::write(path, text).map_err(|e| CapgenError::io(path, e))
}

pub fn read_datatable(path: &Path) -> CapgenResult<Datatable> {
    let text = std::fs::read_to_string(path).map_err(|e| CapgenError::io(path, e))?;
    serde_json::from_str(&text)
        .map_err(|e| CapgenError::Parse { path: path.to_path_buf(), source: e })
}

/// Remove every file recorded in the datatable, then the datatable
/// itself. Individual removal failures are logged and skipped so a
/// half-cleaned tree can still be re-cleaned.
pub fn clean_generated_files(datatable_path: &Path) -> CapgenResult<()> {
    if !datatable_path.exists() {
        warn!("unable to run clean, {} not found", datatable_path.display());
        return Ok(());
    }
    info!("cleaning generated files from {}", datatable_path.display());
    let table = read_datatable(datatable_path)?;
    let root = datatable_path.parent().unwrap_or_else(|| Path::new("."));
    for entry in &table.generated_files {
        let path = PathBuf::from(entry);
        let path = if path.is_absolute() { path } else { root.join(path) };
        info!("clean: removing {}", path.display());
        if let Err(e) = std::fs::remove_file(&path) {
            warn!("unable to remove {}: {}", path.display(), e);
        }
    }
    info!("clean: removing {}", datatable_path.display());
    if let Err(e) = std::fs::remove_file(datatable_path) {
        warn!("unable to remove {}: {}", datatable_path.display(), e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datatable_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datatable.json");
        let table = Datatable {
            host_name: Some("atmos".to_string()),
            host_variables: vec!["temp".to_string()],
            scheme_titles: vec!["rain_run".to_string()],
            suite_files: vec!["suite.xml".to_string()],
            generated_files: vec!["ccpp_kinds.F90".to_string()],
        };
        write_datatable(&path, &table).unwrap();
        assert_eq!(read_datatable(&path).unwrap(), table);
    }

    #[test]
    fn clean_removes_exactly_the_recorded_files() {
        let dir = tempfile::tempdir().unwrap();
        let kinds = dir.path().join("ccpp_kinds.F90");
        let untouched = dir.path().join("keep_me.F90");
        std::fs::write(&kinds, "module ccpp_kinds\nend module\n").unwrap();
        std::fs::write(&untouched, "module keep_me\nend module\n").unwrap();

        let path = dir.path().join("datatable.json");
        let table = Datatable {
            generated_files: vec!["ccpp_kinds.F90".to_string()],
            ..Datatable::default()
        };
        write_datatable(&path, &table).unwrap();

        clean_generated_files(&path).unwrap();
        assert!(!kinds.exists());
        assert!(!path.exists());
        assert!(untouched.exists());
    }

    #[test]
    fn clean_without_a_datatable_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        clean_generated_files(&dir.path().join("datatable.json")).unwrap();
    }
}

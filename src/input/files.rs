// input file list expansion and paired-source discovery
use std::path::{Path, PathBuf};

use crate::core::error::{CapgenError, CapgenResult};

//probed in order when looking for the signature file paired with a
//metadata file
const SIGNATURE_EXTENSIONS: &[&str] = &["sig.json", "sig"];

const METADATA_SUFFIX: &str = ".meta.json";

/// Expand a comma-separated file specification into concrete paths.
///
/// An entry ending in `.txt` is a list file: one path per line, blank
/// lines and lines starting with `#` or `!` skipped, relative paths
/// resolved against the list file's directory. Every resulting path must
/// exist.
pub fn create_file_list(spec: &str, category: &str) -> CapgenResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in spec.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        if entry.ends_with(".txt") {
            files.extend(read_list_file(Path::new(entry))?);
        } else {
            files.push(PathBuf::from(entry));
        }
    }
    for file in &files {
        if !file.exists() {
            return Err(CapgenError::MissingInputFile {
                category: category.to_string(),
                path: file.clone(),
            });
        }
    }
    Ok(files)
}

fn read_list_file(list_path: &Path) -> CapgenResult<Vec<PathBuf>> {
    let text = std::fs::read_to_string(list_path)
        .map_err(|e| CapgenError::io(list_path, e))?;
    let root = list_path.parent().unwrap_or_else(|| Path::new("."));
    let mut files = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let path = PathBuf::from(line);
        if path.is_absolute() {
            files.push(path);
        } else {
            files.push(root.join(path));
        }
    }
    Ok(files)
}

/// Find the source signature file paired with a metadata file.
///
/// `X.meta.json` pairs with `X.sig.json` (then `X.sig`) in the same
/// directory. A metadata file without a signature file is unrecoverable
/// for the run.
pub fn find_associated_source_file(meta_path: &Path) -> CapgenResult<PathBuf> {
    let name = meta_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            CapgenError::Internal(format!(
                "metadata path has no usable file name: {}",
                meta_path.display()
            ))
        })?;
    let base = name
        .strip_suffix(METADATA_SUFFIX)
        .or_else(|| name.rsplit_once('.').map(|(stem, _)| stem))
        .unwrap_or(name);
    for extension in SIGNATURE_EXTENSIONS {
        let candidate = meta_path.with_file_name(format!("{base}.{extension}"));
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(CapgenError::MissingSourceFile { meta_file: meta_path.to_path_buf() })
}

// kinds-module writer
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::error::{CapgenError, CapgenResult};

pub const KINDS_MODULE: &str = "ccpp_kinds";
pub const KINDS_FILENAME: &str = "ccpp_kinds.F90";

/// Write the kinds module used by schemes and suites, aliasing
/// `kind_phys` to the selected ISO_FORTRAN_ENV kind (e.g. REAL64).
pub fn write_kinds_file(kind_phys: &str, output_dir: &Path) -> CapgenResult<PathBuf> {
    let path = output_dir.join(KINDS_FILENAME);
    info!("writing {} to {}", KINDS_FILENAME, output_dir.display());
    let mut text = String::new();
    let _ = writeln!(text, "!>");
    let _ = writeln!(text, "!! @brief Auto-generated kinds for CCPP");
    let _ = writeln!(text, "!!");
    let _ = writeln!(text, "module {KINDS_MODULE}");
    let _ = writeln!(text);
    let _ = writeln!(text, "   use ISO_FORTRAN_ENV, only: kind_phys => {kind_phys}");
    let _ = writeln!(text);
    let _ = writeln!(text, "   implicit none");
    let _ = writeln!(text, "   private");
    let _ = writeln!(text);
    let _ = writeln!(text, "   public kind_phys");
    let _ = writeln!(text);
    let _ = writeln!(text, "end module {KINDS_MODULE}");
    std::fs::write(&path, text).map_err(|e| CapgenError::io(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_file_aliases_the_selected_kind() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_kinds_file("REAL32", dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), KINDS_FILENAME);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("module ccpp_kinds"));
        assert!(text.contains("kind_phys => REAL32"));
        assert!(text.contains("end module ccpp_kinds"));
    }
}

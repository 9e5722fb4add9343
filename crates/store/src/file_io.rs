//! File I/O operations
//!
//! Saves go to a temporary file next to the destination which is then moved
//! into place. If the move fails the temporary file is copied instead.

use crate::error::{IoContext, Result};
use crate::xml::{decode_design, encode_design};
use menu_model::MenuDesign;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Save a design as XML and mark it clean
pub fn save_design(design: &mut MenuDesign, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let xml = encode_design(design);
    write_atomic(path, xml.as_bytes())?;
    design.mark_clean();
    debug!(path = %path.display(), "saved design");
    Ok(())
}

/// Load a design from an XML file
pub fn load_design(path: impl AsRef<Path>) -> Result<MenuDesign> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path)
        .io_context(|| format!("reading {}", path.display()))?;
    decode_design(&xml)
}

/// Write `bytes` to `path` through a temporary file in the same directory
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = parent_dir(path);
    let mut tmp = NamedTempFile::new_in(dir)
        .io_context(|| format!("creating temporary file in {}", dir.display()))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .io_context(|| format!("writing temporary file for {}", path.display()))?;
    persist_or_copy(tmp, path)
}

/// Move a finished temporary file to `dest`, copying when the move fails
pub(crate) fn persist_or_copy(tmp: NamedTempFile, dest: &Path) -> Result<()> {
    match tmp.persist(dest) {
        Ok(_) => Ok(()),
        Err(err) => {
            warn!(
                dest = %dest.display(),
                error = %err.error,
                "could not move temporary file into place, copying instead"
            );
            std::fs::copy(err.file.path(), dest)
                .io_context(|| format!("copying to {}", dest.display()))?;
            Ok(())
        }
    }
}

pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.xml");

        let mut design = MenuDesign::new("App").unwrap();
        let root = design.root_id();
        design.add_regular_menu(root, "Stats").unwrap();
        assert!(design.is_dirty());

        save_design(&mut design, &path).unwrap();
        assert!(!design.is_dirty());

        let loaded = load_design(&path).unwrap();
        assert_eq!(loaded.name(), "App");
        assert!(loaded.look_up(loaded.root_id(), "Stats").is_ok());
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "old").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_design(dir.path().join("missing.xml")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn test_parent_dir_of_bare_name() {
        assert_eq!(parent_dir(Path::new("design.xml")), Path::new("."));
    }
}

//! File system utilities.
//!
//! Renames and copies here never overwrite: a missing source or an existing
//! target is an error.

use crate::Result;
use std::path::Path;
use walkdir::WalkDir;

/// Check if a path exists and is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(crate::Error::NotADirectory(path.display().to_string()));
    }
    Ok(())
}

/// Create a directory and all parent directories.
pub fn create_dir_all(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Names of the regular files directly inside `dir`, sorted.
pub fn list_file_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            crate::Error::other(format!("Cannot list {}: {}", dir.display(), e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => names.push(name.to_string()),
            None => tracing::warn!("Skipping non UTF-8 file name: {:?}", entry.path()),
        }
    }

    names.sort();
    Ok(names)
}

fn check_source_and_target(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(crate::Error::FileNotFound(from.display().to_string()));
    }
    if to.exists() {
        return Err(crate::Error::FileAlreadyExists(to.display().to_string()));
    }
    Ok(())
}

/// Rename a file, refusing to overwrite.
pub fn rename_file(from: &Path, to: &Path) -> Result<()> {
    check_source_and_target(from, to)?;
    std::fs::rename(from, to)?;
    tracing::debug!("Renamed: {:?} -> {:?}", from, to);
    Ok(())
}

/// Copy a file, refusing to overwrite.
pub fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    check_source_and_target(from, to)?;
    let bytes = std::fs::copy(from, to)?;
    tracing::debug!("Copied {} bytes: {:?} -> {:?}", bytes, from, to);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rename_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.mp4");
        let b = dir.path().join("b.mp4");
        std::fs::write(&a, "a").unwrap();
        std::fs::write(&b, "b").unwrap();

        assert!(matches!(
            rename_file(&a, &b),
            Err(crate::Error::FileAlreadyExists(_))
        ));
        assert_eq!(std::fs::read_to_string(&b).unwrap(), "b");
    }

    #[test]
    fn test_rename_missing_source() {
        let dir = TempDir::new().unwrap();
        let result = rename_file(&dir.path().join("nope.mp4"), &dir.path().join("x.mp4"));
        assert!(matches!(result, Err(crate::Error::FileNotFound(_))));
    }

    #[test]
    fn test_list_file_names_is_flat() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.mp4"), "").unwrap();
        std::fs::write(dir.path().join("a.mp4"), "").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("c.mp4"), "").unwrap();

        let names = list_file_names(dir.path()).unwrap();
        assert_eq!(names, vec!["a.mp4".to_string(), "b.mp4".to_string()]);
    }
}

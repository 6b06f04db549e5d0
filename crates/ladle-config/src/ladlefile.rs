//! Ladlefile discovery.

use std::path::{Path, PathBuf};

use crate::config::ConfigError;

/// File names recognised as a ladlefile, in lookup order.
pub const LADLEFILE_NAMES: [&str; 3] = ["ladlefile", "Ladlefile", ".ladlefile"];

/// Walk up from `start` looking for a ladlefile.
///
/// Within one directory the names are tried in [`LADLEFILE_NAMES`] order.
/// Returns `None` when the filesystem root is reached without a match.
pub fn find_ladlefile(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().ok()?;

    let mut current = start.as_path();
    loop {
        for name in LADLEFILE_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        match current.parent() {
            Some(parent) if parent != current => current = parent,
            _ => return None,
        }
    }
}

/// Like [`find_ladlefile`], with a descriptive error when nothing is found.
pub fn find_ladlefile_or_error(start: &Path) -> Result<PathBuf, ConfigError> {
    find_ladlefile(start).ok_or_else(|| ConfigError::LadlefileNotFound {
        start: start.to_path_buf(),
        names: LADLEFILE_NAMES.join(", "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_file_in_start_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ladlefile"), "").unwrap();
        let found = find_ladlefile(dir.path()).unwrap();
        assert_eq!(found, dir.path().canonicalize().unwrap().join("ladlefile"));
    }

    #[test]
    fn finds_file_in_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".ladlefile"), "").unwrap();
        let child = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&child).unwrap();

        let found = find_ladlefile(&child).unwrap();
        assert_eq!(found, dir.path().canonicalize().unwrap().join(".ladlefile"));
    }

    #[test]
    fn nearest_directory_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ladlefile"), "").unwrap();
        let child = dir.path().join("sub");
        std::fs::create_dir(&child).unwrap();
        std::fs::write(child.join("Ladlefile"), "").unwrap();

        let found = find_ladlefile(&child).unwrap();
        assert_eq!(found.parent().unwrap(), child.canonicalize().unwrap());
    }

    #[test]
    fn directory_named_ladlefile_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("ladlefile")).unwrap();
        std::fs::write(dir.path().join(".ladlefile"), "").unwrap();
        let found = find_ladlefile(dir.path()).unwrap();
        assert!(found.ends_with(".ladlefile"));
    }

    #[test]
    fn missing_start_directory_errors() {
        let err = find_ladlefile_or_error(Path::new("/definitely/not/here")).unwrap_err();
        assert!(err.to_string().contains("no ladlefile found"));
    }
}

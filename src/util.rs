use anyhow::{anyhow, Result};
use std::fs::File;
use std::io;
use std::path::Path;

/// Opens `path`, naming the kind of file in the error so a missing theme is
/// distinguishable from a missing project file.
pub fn open(path: &Path, kind: &str) -> Result<File> {
    File::open(path)
        .map_err(|e| anyhow!("Opening {} file `{}`: {}", kind, path.display(), e))
}

/// Removes `dir` and its contents. A directory that doesn't exist is already
/// clean.
pub fn rmdir(dir: &Path) -> io::Result<()> {
    match std::fs::remove_dir_all(dir) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        result => result,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rmdir_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        assert!(rmdir(&dir.path().join("nope")).is_ok());
    }

    #[test]
    fn test_open_names_the_kind() {
        let dir = TempDir::new().unwrap();
        let err = open(&dir.path().join("theme.yaml"), "theme").unwrap_err();
        assert!(err.to_string().starts_with("Opening theme file"));
    }
}

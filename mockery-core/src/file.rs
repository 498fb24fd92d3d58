use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// How to handle an output file that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    /// Always overwrite (`force-file-write: true`)
    Always,
    /// Refuse to touch an existing file
    Never,
}

impl Overwrite {
    pub fn from_force(force: bool) -> Self {
        if force {
            Overwrite::Always
        } else {
            Overwrite::Never
        }
    }
}

/// Result of a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// File did not exist and was created
    Created,
    /// File existed and was replaced
    Replaced,
}

/// A generated file waiting to be written
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    path: PathBuf,
    content: Vec<u8>,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Write the file, creating parent directories as needed.
    ///
    /// With [`Overwrite::Never`] an existing file is an [`Error::OutputExists`].
    pub fn write(&self, overwrite: Overwrite) -> Result<WriteResult> {
        let existed = self.path.exists();
        if existed && overwrite == Overwrite::Never {
            return Err(Error::OutputExists {
                path: self.path.clone(),
            });
        }

        write_file(&self.path, &self.content)?;
        Ok(if existed {
            WriteResult::Replaced
        } else {
            WriteResult::Created
        })
    }
}

fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| Error::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a").join("b").join("mocks_test.go");

        let result = GeneratedFile::new(&path, "package b\n")
            .write(Overwrite::Never)
            .unwrap();

        assert_eq!(result, WriteResult::Created);
        assert_eq!(fs::read_to_string(&path).unwrap(), "package b\n");
    }

    #[test]
    fn test_write_always_replaces_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mocks_test.go");
        fs::write(&path, "original").unwrap();

        let result = GeneratedFile::new(&path, "updated")
            .write(Overwrite::Always)
            .unwrap();

        assert_eq!(result, WriteResult::Replaced);
        assert_eq!(fs::read_to_string(&path).unwrap(), "updated");
    }

    #[test]
    fn test_write_never_refuses_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mocks_test.go");
        fs::write(&path, "original").unwrap();

        let err = GeneratedFile::new(&path, "updated")
            .write(Overwrite::Never)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::OutputExists);
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn test_overwrite_from_force() {
        assert_eq!(Overwrite::from_force(true), Overwrite::Always);
        assert_eq!(Overwrite::from_force(false), Overwrite::Never);
    }
}

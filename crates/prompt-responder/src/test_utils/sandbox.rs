//! Temporary working directories for scaffolding tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{ResponderError, Result};

/// A temporary directory a session can generate files into.
///
/// Removed when dropped.
#[derive(Debug)]
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    /// Create an empty sandbox.
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("prompt-responder-")
            .tempdir()?;
        Ok(Self { dir })
    }

    /// The sandbox root.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Resolve a path relative to the sandbox root.
    #[must_use]
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Check if a path exists inside the sandbox.
    #[must_use]
    pub fn exists(&self, relative: impl AsRef<Path>) -> bool {
        self.resolve(relative).exists()
    }

    /// Write a file, creating parent directories.
    pub fn write(&self, relative: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> io::Result<()> {
        let path = self.resolve(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }

    /// Read a file as text.
    pub fn read_to_string(&self, relative: impl AsRef<Path>) -> io::Result<String> {
        fs::read_to_string(self.resolve(relative))
    }

    /// Read and parse a JSON file.
    pub fn read_json(&self, relative: impl AsRef<Path>) -> Result<serde_json::Value> {
        let path = self.resolve(relative);
        let content = fs::read_to_string(&path)
            .map_err(|e| ResponderError::io_context(format!("reading {}", path.display()), e))?;
        serde_json::from_str(&content).map_err(|e| {
            ResponderError::config(format!("invalid JSON in {}: {e}", path.display()))
        })
    }

    /// Remove everything in the sandbox, keeping the root.
    pub fn reset(&self) -> io::Result<()> {
        for entry in fs::read_dir(self.dir.path())? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(path)?;
            } else {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_and_reset() {
        let sandbox = Sandbox::new().unwrap();
        sandbox
            .write("common/models/a-model.json", r#"{"name": "a-model"}"#)
            .unwrap();

        assert!(sandbox.exists("common/models/a-model.json"));
        let model = sandbox.read_json("common/models/a-model.json").unwrap();
        assert_eq!(model["name"], "a-model");

        sandbox.reset().unwrap();
        assert!(!sandbox.exists("common"));
        assert!(sandbox.path().is_dir());
    }

    #[test]
    fn read_json_reports_bad_content() {
        let sandbox = Sandbox::new().unwrap();
        sandbox.write("broken.json", "{").unwrap();
        let err = sandbox.read_json("broken.json").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
        assert!(sandbox.read_json("missing.json").is_err());
    }
}

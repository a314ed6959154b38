//! Local filesystem fetcher.

use std::path::{Path, PathBuf};

use crate::error::FetchError;

pub trait FileReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FetchError>;
}

/// Reads from the real filesystem, optionally confined to a sandbox root. Path
/// components are never percent-decoded; by the time a path reaches here it is already OS-native.
pub struct OsFileReader {
    pub sandbox: Option<PathBuf>,
}

impl OsFileReader {
    pub fn new() -> Self {
        Self { sandbox: None }
    }

    pub fn with_sandbox(sandbox: impl Into<PathBuf>) -> Self {
        Self {
            sandbox: Some(sandbox.into()),
        }
    }
}

impl Default for OsFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FileReader for OsFileReader {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FetchError> {
        if let Some(sandbox) = &self.sandbox {
            let sandbox = sandbox.canonicalize().unwrap_or_else(|_| sandbox.clone());
            // `path` may not exist yet relative to cwd weirdness, but its parent always
            // should if the file itself is readable; canonicalize the parent and rejoin
            // the file name so a symlink trick in a sibling directory can't escape.
            let candidate = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
                Some(parent) => parent
                    .canonicalize()
                    .map(|p| p.join(path.file_name().unwrap_or_default()))
                    .unwrap_or_else(|_| path.to_path_buf()),
                None => path.to_path_buf(),
            };
            if !candidate.starts_with(&sandbox) {
                return Err(FetchError::SandboxEscape);
            }
        }
        std::fs::read(path).map_err(FetchError::from)
    }
}

/// A fixed in-memory filesystem, for hermetic resolver tests.
#[derive(Default)]
pub struct FakeFileReader(std::collections::HashMap<PathBuf, Vec<u8>>);

impl FakeFileReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.0.insert(path.into(), contents.into());
        self
    }
}

impl FileReader for FakeFileReader {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FetchError> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::Io(std::io::Error::from(std::io::ErrorKind::NotFound)))
    }
}

/// Test utilities for the file backend
///
/// RAII-based cleanup: the temporary data directory disappears when the
/// helper is dropped, even if a test panics.
use anyhow::Result;
use tempfile::TempDir;

use super::backend::FileBackend;

/// A file backend over a temporary directory that cleans itself up
pub struct TestHelper {
    pub backend: FileBackend,
    /// Base directory path for manual inspection if needed
    pub base_path: std::path::PathBuf,
    _temp_dir: TempDir, // Keep alive to prevent cleanup
}

impl TestHelper {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let backend = FileBackend::open(temp_dir.path())?;
        Ok(Self {
            backend,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }

    /// Open a second backend over the same directory, as a process restart
    /// would
    pub fn reopen(&self) -> Result<FileBackend> {
        Ok(FileBackend::open(&self.base_path)?)
    }
}

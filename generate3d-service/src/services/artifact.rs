//! Temporary artifact files.

use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A uniquely named artifact path inside the scratch directory.
///
/// The file is removed when the guard is dropped, so every early return
/// (generator failure, upload failure, panic) cleans up after itself. The
/// success path calls [`TempArtifact::remove`] to surface deletion errors.
#[derive(Debug)]
pub struct TempArtifact {
    file_name: String,
    path: PathBuf,
    armed: bool,
}

impl TempArtifact {
    /// Reserves `model_<uuid>.<extension>` under `dir`. Nothing is created on disk.
    pub fn allocate(dir: &Path, extension: &str) -> Self {
        let file_name = format!("model_{}.{}", Uuid::new_v4(), extension);
        let path = dir.join(&file_name);
        Self {
            file_name,
            path,
            armed: true,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Points the guard at the file the generator actually produced.
    ///
    /// The object key stays the allocated file name.
    pub fn retarget(&mut self, path: PathBuf) {
        self.path = path;
    }

    /// Deletes the file and disarms the guard.
    pub async fn remove(mut self) -> io::Result<()> {
        self.armed = false;
        tokio::fs::remove_file(&self.path).await
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // Blocking unlink; `Drop` cannot await.
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Removed temporary artifact");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove temporary artifact"
                );
            }
        }
    }
}

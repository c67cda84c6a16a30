//! Scratch files: process-local transient storage for in-flight media bytes.

use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A transient local file owned by exactly one in-flight request.
///
/// Created by the fetcher, replaced in place by the transcoder, deleted only
/// after a confirmed successful upload. There is deliberately no `Drop`
/// cleanup: when a stage fails, the file stays behind for inspection.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Reserve a unique path under `dir`. The source filename is kept as a
    /// suffix so the transcoder and codecs can see the real extension.
    pub fn allocate(dir: &Path, filename: &str) -> Self {
        let unique = format!("{}-{}", Uuid::new_v4(), filename);
        ScratchFile {
            path: dir.join(unique),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file, consuming the handle.
    pub async fn remove(self) -> std::io::Result<()> {
        tokio::fs::remove_file(&self.path).await
    }
}

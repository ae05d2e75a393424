use std::path::{Path, PathBuf};

/// Tagged audio file plus its cover, ready for delivery.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub audio_path: PathBuf,
    pub thumbnail_path: PathBuf,
    pub artist: String,
    pub title: String,
    /// Known from metadata; 0 is sent when absent
    pub duration_secs: Option<u32>,
    /// Per-request directory owning both files, removed by [`cleanup`](Self::cleanup)
    pub work_dir: Option<PathBuf>,
}

impl AudioArtifact {
    /// Size of the audio file on disk
    pub async fn audio_size(&self) -> std::io::Result<u64> {
        Ok(tokio::fs::metadata(&self.audio_path).await?.len())
    }

    /// Removes both files and the work directory. Missing files are not an error.
    pub async fn cleanup(&self) {
        remove_quietly(&self.audio_path).await;
        remove_quietly(&self.thumbnail_path).await;
        if let Some(dir) = &self.work_dir {
            remove_dir_quietly(dir).await;
        }
    }
}

/// Deletes `path`, logging anything other than "not found".
pub(crate) async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => log::debug!("Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
    }
}

/// Deletes `dir` with everything in it, yt-dlp `.part` leftovers included.
pub(crate) async fn remove_dir_quietly(dir: &Path) {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => log::debug!("Removed {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove {}: {}", dir.display(), e),
    }
}

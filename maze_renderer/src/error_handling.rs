// error_handling.rs - Error type for rendering and batch output

use std::path::{Path, PathBuf};

use maze_generator::MazeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Maze generation failed: {0}")]
    Maze(#[from] MazeError),

    #[error("Image processing failed: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid task list: {reason}")]
    InvalidTasks { reason: String },
}

pub type Result<T> = std::result::Result<T, RenderError>;

impl RenderError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        RenderError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Create the parent directory of `path` if it has one.
pub async fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RenderError::io(parent, e)),
        _ => Ok(()),
    }
}

/// Write `bytes` to `path`, creating parent directories first.
pub async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent_dir(path).await?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| RenderError::io(path, e))?;
    log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

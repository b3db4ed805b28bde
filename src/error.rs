use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no data directory available on this platform")]
    NoDataDir,
    #[error("failed to create data directory {}", .0.display())]
    DataDir(PathBuf, #[source] std::io::Error),
}

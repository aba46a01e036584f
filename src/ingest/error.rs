use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Setup failures that abort a run before or while it is wired up.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("root directory {} is not accessible: {source}", path.display())]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("failed to traverse {}: {source}", root.display())]
    Traversal {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("ingestion task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("concurrency pool closed unexpectedly")]
    PoolClosed,
}

/// A single file could not be read.
#[derive(Debug, Error)]
#[error("failed to read {}: {source}", path.display())]
pub struct ExtractError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl ExtractError {
    pub fn new(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Why a worker task produced no record for the collector.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("collector stopped before {} could be delivered", .0.display())]
    CollectorClosed(PathBuf),
}

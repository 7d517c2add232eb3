use std::path::PathBuf;

use thiserror::Error;

use crate::shape::Shape;

#[derive(Error, Debug)]
pub enum TensorError {
    #[error("failed to open file: {}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to get file size: {}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("memory mapping failed: {}", path.display())]
    Map {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} holds {len} elements, more than a u32 index can address", path.display())]
    TooLarge { path: PathBuf, len: usize },
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: Shape, got: Shape },
}

pub type Result<T> = std::result::Result<T, TensorError>;

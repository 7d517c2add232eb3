use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("tensor error: {0}")]
    TensorError(#[from] gpt_tensor::TensorError),
    #[error("{} holds {got} elements, expected at least {expected}", path.display())]
    WeightSize {
        path: PathBuf,
        expected: u64,
        got: u32,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("sequence of {len} tokens exceeds block size {max}")]
    SequenceTooLong { len: u32, max: u32 },
}

pub type Result<T> = std::result::Result<T, ModelError>;

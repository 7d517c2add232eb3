//! `gpt-model` - GPT-2 weight loading and tensor operators.
//!
//! This crate provides:
//! - `EmbeddingOp` and `AddOp` over `gpt-tensor` tensors
//! - `Gpt2Config` with the GPT-2 small hyperparameters and weight naming
//! - `TokenPositionEmbedding`, the token + position input stage

pub mod config;
pub mod error;
pub mod gpt2;
pub mod ops;

pub use config::Gpt2Config;
pub use error::{ModelError, Result};
pub use gpt2::{Gpt2Embeddings, TokenPositionEmbedding};
pub use ops::{AddOp, EmbeddingOp};

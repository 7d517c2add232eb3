//! `gpt-tensor` - Shaped tensor views over pluggable storage for GPT weight files.
//!
//! This crate provides:
//! - Axis lengths fixed at compile time (`Const<N>`) or at runtime (`DynDim`)
//! - A `Storage` trait with owned, windowed and memory-mapped backends
//! - A rank 1..4 `Tensor` view with truncated diagnostic dumps
//! - Element type definitions (f32, f16, integer token ids)

pub mod dim;
pub mod dtype;
pub mod error;
pub mod mmap;
pub mod shape;
pub mod storage;
pub mod tensor;

// Re-export primary types at the crate root for convenience.
pub use dim::{Const, Dim, Dims, DynDim, StaticDim};
pub use dtype::{DType, Element};
pub use error::{Result, TensorError};
pub use mmap::MmapStorage;
pub use shape::Shape;
pub use storage::{Slice, Storage, StorageMut, VecStorage};
pub use tensor::{Dump, Tensor, Tensor1, Tensor2, Tensor3, Tensor4};

//! Operators producing freshly allocated tensors.
//!
//! Operators address rows through the packed row views of
//! [`gpt_tensor::Tensor`], which match the row-major layout of the raw
//! weight files.

pub mod add;
pub mod embedding;

pub use add::AddOp;
pub use embedding::EmbeddingOp;

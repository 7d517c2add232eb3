use std::fmt;
use std::ops::Add;

use bytemuck::Pod;
use half::f16;

/// Element types a storage backend may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit floating point. The format of every GPT-2 weight file.
    F32,
    /// 16-bit floating point (IEEE 754 half-precision, via the `half` crate).
    F16,
    /// 64-bit floating point.
    F64,
    /// 32-bit signed integer.
    I32,
    /// 32-bit unsigned integer. Token ids use this.
    U32,
    /// 16-bit unsigned integer.
    U16,
    /// 8-bit unsigned integer.
    U8,
}

impl DType {
    /// Returns the size in bytes of a single element.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DType::F64 => 8,
            DType::F32 | DType::I32 | DType::U32 => 4,
            DType::F16 | DType::U16 => 2,
            DType::U8 => 1,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::F32 => write!(f, "f32"),
            DType::F16 => write!(f, "f16"),
            DType::F64 => write!(f, "f64"),
            DType::I32 => write!(f, "i32"),
            DType::U32 => write!(f, "u32"),
            DType::U16 => write!(f, "u16"),
            DType::U8 => write!(f, "u8"),
        }
    }
}

/// A Rust type that can live in tensor storage.
///
/// `Pod` lets mapped file bytes be reinterpreted as elements and lets owned
/// buffers start zero-filled. `Display` drives the tensor dump.
pub trait Element:
    Copy + fmt::Debug + fmt::Display + PartialEq + Add<Output = Self> + Pod + 'static
{
    /// The corresponding `DType` for this Rust type.
    const DTYPE: DType;
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;
}

impl Element for f16 {
    const DTYPE: DType = DType::F16;
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;
}

impl Element for i32 {
    const DTYPE: DType = DType::I32;
}

impl Element for u32 {
    const DTYPE: DType = DType::U32;
}

impl Element for u16 {
    const DTYPE: DType = DType::U16;
}

impl Element for u8 {
    const DTYPE: DType = DType::U8;
}

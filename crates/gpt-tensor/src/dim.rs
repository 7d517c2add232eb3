//! Axis lengths, either fixed at compile time or carried at runtime.
//!
//! Both kinds implement [`Dim`], so a tensor type can mix them freely:
//! `Tensor2<S, DynDim, Const<768>>` has a runtime row count and a fixed
//! embedding width.

use std::fmt::Debug;

use crate::shape::Shape;

/// Reports the length of one tensor axis.
pub trait Dim: Copy + Debug {
    fn dim(&self) -> u32;
}

/// An axis whose length is known without an instance.
pub trait StaticDim: Dim + Default {
    fn static_dim() -> u32;
}

/// Axis of compile-time length `N`.
///
/// `N == 0` is rejected when the type is used:
///
/// ```compile_fail
/// use gpt_tensor::Const;
/// let _empty = Const::<0>::new();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Const<const N: u32> {
    _private: (),
}

impl<const N: u32> Const<N> {
    pub const fn new() -> Self {
        const {
            assert!(N != 0, "dim must be greater than 0");
        }
        Const { _private: () }
    }
}

impl<const N: u32> Default for Const<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: u32> Dim for Const<N> {
    #[inline]
    fn dim(&self) -> u32 {
        N
    }
}

impl<const N: u32> StaticDim for Const<N> {
    #[inline]
    fn static_dim() -> u32 {
        const {
            assert!(N != 0, "dim must be greater than 0");
        }
        N
    }
}

/// Axis whose length is only known at runtime. Zero is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DynDim(pub u32);

impl DynDim {
    pub fn new(dim: u32) -> Self {
        DynDim(dim)
    }
}

impl Dim for DynDim {
    #[inline]
    fn dim(&self) -> u32 {
        self.0
    }
}

/// The full set of axes of a tensor, outermost first.
///
/// Implemented for tuples of one to four [`Dim`] values.
pub trait Dims: Copy + Debug {
    const RANK: usize;

    /// Product of all axis lengths.
    fn total_size(&self) -> u32;

    fn shape(&self) -> Shape;
}

impl<A: Dim> Dims for (A,) {
    const RANK: usize = 1;

    fn total_size(&self) -> u32 {
        self.0.dim()
    }

    fn shape(&self) -> Shape {
        Shape::new(vec![self.0.dim()])
    }
}

impl<A: Dim, B: Dim> Dims for (A, B) {
    const RANK: usize = 2;

    fn total_size(&self) -> u32 {
        self.0.dim() * self.1.dim()
    }

    fn shape(&self) -> Shape {
        Shape::new(vec![self.0.dim(), self.1.dim()])
    }
}

impl<A: Dim, B: Dim, C: Dim> Dims for (A, B, C) {
    const RANK: usize = 3;

    fn total_size(&self) -> u32 {
        self.0.dim() * self.1.dim() * self.2.dim()
    }

    fn shape(&self) -> Shape {
        Shape::new(vec![self.0.dim(), self.1.dim(), self.2.dim()])
    }
}

impl<A: Dim, B: Dim, C: Dim, D: Dim> Dims for (A, B, C, D) {
    const RANK: usize = 4;

    fn total_size(&self) -> u32 {
        self.0.dim() * self.1.dim() * self.2.dim() * self.3.dim()
    }

    fn shape(&self) -> Shape {
        Shape::new(vec![self.0.dim(), self.1.dim(), self.2.dim(), self.3.dim()])
    }
}

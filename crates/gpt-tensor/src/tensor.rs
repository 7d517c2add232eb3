use std::io::{self, Write};
use std::rc::Rc;

use crate::dim::{Dim, Dims};
use crate::shape::Shape;
use crate::storage::{Slice, Storage, StorageMut};

/// Leading and trailing entries kept visible on each axis by [`Dump`].
const EDGE_ITEMS: u32 = 3;

/// A shaped view over shared storage.
///
/// `D` is a tuple of one to four [`Dim`] values, outermost axis first. The
/// tensor never owns its elements: cloning it, or taking a sub-view, only
/// bumps the storage's reference count.
///
/// Construction does not check that the storage is large enough for the
/// dimensions, and element access does not bounds check the indices. Both are
/// caller contracts (debug builds assert inside the storage).
///
/// # Addressing
///
/// `get`/`set` scale each index by the length of the axis *before* it:
/// `offset(i, j) = i * d0 + j`, `offset(i, j, k) = (i * d0 + j) * d1 + k`.
/// This only matches packed row-major order when the axes involved have equal
/// length. Operators and [`Dump`] use the packed sub-views ([`Tensor::row`],
/// [`Tensor::outer`]) instead, which start row `i` at `i * d1`.
#[derive(Debug)]
pub struct Tensor<S: Storage, D: Dims> {
    storage: Rc<S>,
    dims: D,
}

pub type Tensor1<S, A> = Tensor<S, (A,)>;
pub type Tensor2<S, A, B> = Tensor<S, (A, B)>;
pub type Tensor3<S, A, B, C> = Tensor<S, (A, B, C)>;
pub type Tensor4<S, A, B, C, D> = Tensor<S, (A, B, C, D)>;

impl<S: Storage, D: Dims> Clone for Tensor<S, D> {
    fn clone(&self) -> Self {
        Tensor {
            storage: Rc::clone(&self.storage),
            dims: self.dims,
        }
    }
}

impl<S: Storage, D: Dims> Tensor<S, D> {
    pub fn new(storage: Rc<S>, dims: D) -> Self {
        Tensor { storage, dims }
    }

    pub fn storage(&self) -> &Rc<S> {
        &self.storage
    }

    pub fn dims(&self) -> D {
        self.dims
    }

    /// Product of all dimension lengths.
    pub fn total_size(&self) -> u32 {
        self.dims.total_size()
    }

    /// Alias of [`Tensor::total_size`].
    pub fn get_total_size(&self) -> u32 {
        self.total_size()
    }

    pub fn shape(&self) -> Shape {
        self.dims.shape()
    }
}

impl<S: Storage, A: Dim> Tensor<S, (A,)> {
    pub fn n0(&self) -> A {
        self.dims.0
    }

    #[inline]
    pub fn offset(&self, i0: u32) -> u32 {
        i0
    }

    #[inline]
    pub fn get(&self, i0: u32) -> S::Elem {
        self.storage.at(self.offset(i0))
    }
}

impl<S: StorageMut, A: Dim> Tensor<S, (A,)> {
    #[inline]
    pub fn set(&self, i0: u32, value: S::Elem) {
        self.storage.set(self.offset(i0), value);
    }
}

impl<S: Storage, A: Dim, B: Dim> Tensor<S, (A, B)> {
    pub fn n0(&self) -> A {
        self.dims.0
    }

    pub fn n1(&self) -> B {
        self.dims.1
    }

    #[inline]
    pub fn offset(&self, i0: u32, i1: u32) -> u32 {
        i0 * self.dims.0.dim() + i1
    }

    #[inline]
    pub fn get(&self, i0: u32, i1: u32) -> S::Elem {
        self.storage.at(self.offset(i0, i1))
    }

    /// Packed row `i`: the `d1` elements starting at `i * d1`.
    pub fn row(&self, i: u32) -> Tensor<Slice<S>, (B,)> {
        let width = self.dims.1.dim();
        let slice = Slice::create(Rc::clone(&self.storage), i * width, width);
        Tensor::new(slice, (self.dims.1,))
    }
}

impl<S: StorageMut, A: Dim, B: Dim> Tensor<S, (A, B)> {
    #[inline]
    pub fn set(&self, i0: u32, i1: u32, value: S::Elem) {
        self.storage.set(self.offset(i0, i1), value);
    }
}

impl<S: Storage, A: Dim, B: Dim, C: Dim> Tensor<S, (A, B, C)> {
    pub fn n0(&self) -> A {
        self.dims.0
    }

    pub fn n1(&self) -> B {
        self.dims.1
    }

    pub fn n2(&self) -> C {
        self.dims.2
    }

    #[inline]
    pub fn offset(&self, i0: u32, i1: u32, i2: u32) -> u32 {
        (i0 * self.dims.0.dim() + i1) * self.dims.1.dim() + i2
    }

    #[inline]
    pub fn get(&self, i0: u32, i1: u32, i2: u32) -> S::Elem {
        self.storage.at(self.offset(i0, i1, i2))
    }

    /// Packed block `i` of the outer axis, as a `(d1, d2)` tensor.
    pub fn outer(&self, i: u32) -> Tensor<Slice<S>, (B, C)> {
        let inner = (self.dims.1, self.dims.2);
        let size = inner.total_size();
        Tensor::new(Slice::create(Rc::clone(&self.storage), i * size, size), inner)
    }
}

impl<S: StorageMut, A: Dim, B: Dim, C: Dim> Tensor<S, (A, B, C)> {
    #[inline]
    pub fn set(&self, i0: u32, i1: u32, i2: u32, value: S::Elem) {
        self.storage.set(self.offset(i0, i1, i2), value);
    }
}

impl<S: Storage, A: Dim, B: Dim, C: Dim, D: Dim> Tensor<S, (A, B, C, D)> {
    pub fn n0(&self) -> A {
        self.dims.0
    }

    pub fn n1(&self) -> B {
        self.dims.1
    }

    pub fn n2(&self) -> C {
        self.dims.2
    }

    pub fn n3(&self) -> D {
        self.dims.3
    }

    #[inline]
    pub fn offset(&self, i0: u32, i1: u32, i2: u32, i3: u32) -> u32 {
        ((i0 * self.dims.0.dim() + i1) * self.dims.1.dim() + i2) * self.dims.2.dim() + i3
    }

    #[inline]
    pub fn get(&self, i0: u32, i1: u32, i2: u32, i3: u32) -> S::Elem {
        self.storage.at(self.offset(i0, i1, i2, i3))
    }

    /// Packed block `i` of the outer axis, as a `(d1, d2, d3)` tensor.
    pub fn outer(&self, i: u32) -> Tensor<Slice<S>, (B, C, D)> {
        let inner = (self.dims.1, self.dims.2, self.dims.3);
        let size = inner.total_size();
        Tensor::new(Slice::create(Rc::clone(&self.storage), i * size, size), inner)
    }
}

impl<S: StorageMut, A: Dim, B: Dim, C: Dim, D: Dim> Tensor<S, (A, B, C, D)> {
    #[inline]
    pub fn set(&self, i0: u32, i1: u32, i2: u32, i3: u32, value: S::Elem) {
        self.storage.set(self.offset(i0, i1, i2, i3), value);
    }
}

/// Human-readable printing with long axes truncated.
///
/// On every axis only the first and last three entries are printed; the ones
/// in between collapse into a single `...`.
pub trait Dump {
    /// Writes the values without the shape header.
    fn dump_value<W: Write>(&self, out: &mut W) -> io::Result<()>;

    fn dump_shape(&self) -> Shape;

    /// Writes `size: (d0,..)` followed by the values.
    fn dump_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "size: {}", self.dump_shape())?;
        self.dump_value(out)
    }

    /// [`Dump::dump_to`] on standard output.
    fn dump(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.dump_to(&mut out)?;
        out.flush()
    }
}

/// Calls `item` for the visible indices of an axis of length `len`, writing
/// `ellipsis` once in place of the hidden ones.
fn write_truncated<W: Write>(
    out: &mut W,
    len: u32,
    ellipsis: &str,
    mut item: impl FnMut(&mut W, u32) -> io::Result<()>,
) -> io::Result<()> {
    let head = len.min(EDGE_ITEMS);
    let tail = len.saturating_sub(EDGE_ITEMS).max(head);
    for i in 0..head {
        item(out, i)?;
    }
    if tail > head {
        out.write_all(ellipsis.as_bytes())?;
    }
    for i in tail..len {
        item(out, i)?;
    }
    Ok(())
}

impl<S: Storage, A: Dim> Dump for Tensor<S, (A,)> {
    fn dump_value<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write_truncated(out, self.dims.0.dim(), "... ", |out, i| {
            write!(out, "{} ", self.get(i))
        })?;
        writeln!(out)
    }

    fn dump_shape(&self) -> Shape {
        self.shape()
    }
}

impl<S: Storage, A: Dim, B: Dim> Dump for Tensor<S, (A, B)> {
    fn dump_value<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write_truncated(out, self.dims.0.dim(), "...\n", |out, i| {
            self.row(i).dump_value(out)
        })
    }

    fn dump_shape(&self) -> Shape {
        self.shape()
    }
}

impl<S: Storage, A: Dim, B: Dim, C: Dim> Dump for Tensor<S, (A, B, C)> {
    fn dump_value<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write_truncated(out, self.dims.0.dim(), "...\n\n", |out, i| {
            self.outer(i).dump_value(out)?;
            writeln!(out)
        })
    }

    fn dump_shape(&self) -> Shape {
        self.shape()
    }
}

impl<S: Storage, A: Dim, B: Dim, C: Dim, D: Dim> Dump for Tensor<S, (A, B, C, D)> {
    fn dump_value<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write_truncated(out, self.dims.0.dim(), "...\n\n", |out, i| {
            self.outer(i).dump_value(out)?;
            writeln!(out)
        })
    }

    fn dump_shape(&self) -> Shape {
        self.shape()
    }
}

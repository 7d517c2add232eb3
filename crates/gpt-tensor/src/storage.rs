//! Flat element buffers that tensors index into.
//!
//! Storage is shared between tensors and slices through `Rc`, so every
//! accessor takes `&self`. Writable backends keep each element in a `Cell`;
//! the mapped-file backend in [`crate::mmap`] is read-only and simply does
//! not implement [`StorageMut`].
//!
//! Indices are a caller contract: `0 <= index < len()`. Debug builds assert
//! it with a message naming the window; release builds fall back to the
//! ordinary slice bounds check of the backing buffer.

use std::cell::Cell;
use std::rc::Rc;

use crate::dtype::Element;

/// Random read access over a flat sequence of elements.
pub trait Storage {
    type Elem: Element;

    /// Number of addressable elements.
    fn len(&self) -> u32;

    /// Reads the element at `index`.
    fn at(&self, index: u32) -> Self::Elem;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies every addressable element out, in index order.
    fn to_vec(&self) -> Vec<Self::Elem> {
        (0..self.len()).map(|i| self.at(i)).collect()
    }
}

/// Storage whose elements can be overwritten in place.
pub trait StorageMut: Storage {
    fn set(&self, index: u32, value: Self::Elem);
}

/// Owned, zero-initialised buffer.
#[derive(Debug, Clone)]
pub struct VecStorage<T: Element> {
    data: Vec<Cell<T>>,
}

impl<T: Element> VecStorage<T> {
    /// Allocates `n` zero-valued elements.
    pub fn new(n: u32) -> Self {
        VecStorage {
            data: vec![Cell::new(T::zeroed()); n as usize],
        }
    }

    /// Convenience for `Rc::new(VecStorage::new(n))`.
    pub fn create(n: u32) -> Rc<Self> {
        Rc::new(Self::new(n))
    }

    /// Takes ownership of existing values.
    pub fn from_vec(data: Vec<T>) -> Self {
        VecStorage {
            data: data.into_iter().map(Cell::new).collect(),
        }
    }

    /// Grows or shrinks the buffer; new elements are zero.
    pub fn resize(&mut self, n: u32) {
        self.data.resize(n as usize, Cell::new(T::zeroed()));
    }
}

impl<T: Element> Storage for VecStorage<T> {
    type Elem = T;

    fn len(&self) -> u32 {
        self.data.len() as u32
    }

    #[inline]
    fn at(&self, index: u32) -> T {
        debug_assert!(
            (index as usize) < self.data.len(),
            "index {} out of range for buffer of {}",
            index,
            self.data.len()
        );
        self.data[index as usize].get()
    }
}

impl<T: Element> StorageMut for VecStorage<T> {
    #[inline]
    fn set(&self, index: u32, value: T) {
        debug_assert!(
            (index as usize) < self.data.len(),
            "index {} out of range for buffer of {}",
            index,
            self.data.len()
        );
        self.data[index as usize].set(value);
    }
}

/// A `[begin, begin + len)` window onto a parent storage.
///
/// The window shares the parent's elements: writes through either side are
/// visible through the other. Holding the `Rc` keeps the parent alive for as
/// long as the slice exists.
#[derive(Debug)]
pub struct Slice<P: Storage> {
    parent: Rc<P>,
    begin: u32,
    len: u32,
}

impl<P: Storage> Slice<P> {
    pub fn new(parent: Rc<P>, begin: u32, len: u32) -> Self {
        Slice { parent, begin, len }
    }

    /// Convenience for `Rc::new(Slice::new(..))`.
    pub fn create(parent: Rc<P>, begin: u32, len: u32) -> Rc<Self> {
        Rc::new(Self::new(parent, begin, len))
    }

    pub fn parent(&self) -> &Rc<P> {
        &self.parent
    }

    pub fn begin(&self) -> u32 {
        self.begin
    }
}

impl<P: Storage> Clone for Slice<P> {
    fn clone(&self) -> Self {
        Slice {
            parent: Rc::clone(&self.parent),
            begin: self.begin,
            len: self.len,
        }
    }
}

impl<P: Storage> Storage for Slice<P> {
    type Elem = P::Elem;

    fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    fn at(&self, index: u32) -> P::Elem {
        debug_assert!(
            index < self.len,
            "index {} out of range for slice [{}, {})",
            index,
            self.begin,
            self.begin + self.len
        );
        self.parent.at(self.begin + index)
    }
}

impl<P: StorageMut> StorageMut for Slice<P> {
    #[inline]
    fn set(&self, index: u32, value: P::Elem) {
        debug_assert!(
            index < self.len,
            "index {} out of range for slice [{}, {})",
            index,
            self.begin,
            self.begin + self.len
        );
        self.parent.set(self.begin + index, value);
    }
}

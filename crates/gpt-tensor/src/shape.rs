use std::fmt;

/// Axis lengths of a tensor, outermost first.
///
/// A `Shape` is a snapshot of a tensor's dimensions used for diagnostics and
/// shape checks. Element addressing never goes through it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<u32>,
}

impl Shape {
    /// Create a new shape from a vector of dimensions.
    pub fn new(dims: Vec<u32>) -> Self {
        Shape { dims }
    }

    /// Number of dimensions (rank).
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements (product of all dimension sizes).
    pub fn numel(&self) -> u32 {
        self.dims.iter().product()
    }

    /// Returns the size of dimension `i`.
    ///
    /// # Panics
    /// Panics if `i >= ndim()`.
    pub fn dim(&self, i: usize) -> u32 {
        self.dims[i]
    }

    /// Returns a reference to the underlying dimension sizes.
    pub fn dims(&self) -> &[u32] {
        &self.dims
    }
}

/// Renders as `(d1,d2,...)`, the form used in tensor dump headers.
impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, ")")
    }
}

impl From<Vec<u32>> for Shape {
    fn from(dims: Vec<u32>) -> Self {
        Shape::new(dims)
    }
}

impl From<&[u32]> for Shape {
    fn from(dims: &[u32]) -> Self {
        Shape::new(dims.to_vec())
    }
}

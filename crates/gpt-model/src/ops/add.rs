use gpt_tensor::{Dim, Storage, Tensor, Tensor2, TensorError, VecStorage};

/// Elementwise addition of two rank-2 tensors.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddOp;

impl AddOp {
    /// Returns a new owned tensor with `out[i][j] = a[i][j] + b[i][j]`.
    ///
    /// # Errors
    /// Returns `TensorError::ShapeMismatch` if the two shapes differ.
    pub fn execute<S1, S2, A, B>(
        a: &Tensor2<S1, A, B>,
        b: &Tensor2<S2, A, B>,
    ) -> gpt_tensor::Result<Tensor2<VecStorage<S1::Elem>, A, B>>
    where
        S1: Storage,
        S2: Storage<Elem = S1::Elem>,
        A: Dim,
        B: Dim,
    {
        if a.shape() != b.shape() {
            return Err(TensorError::ShapeMismatch {
                expected: a.shape(),
                got: b.shape(),
            });
        }

        let output = Tensor::new(VecStorage::create(a.total_size()), a.dims());
        for i in 0..a.n0().dim() {
            let (ra, rb, ro) = (a.row(i), b.row(i), output.row(i));
            for j in 0..a.n1().dim() {
                ro.set(j, ra.get(j) + rb.get(j));
            }
        }
        Ok(output)
    }
}

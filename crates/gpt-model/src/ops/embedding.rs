use std::path::{Path, PathBuf};

use gpt_tensor::{Dim, MmapStorage, StaticDim, Storage, Tensor, Tensor1, Tensor2, VecStorage};

use crate::error::{ModelError, Result};

/// Embedding table lookup.
///
/// Holds a `(N, E)` weight table and gathers rows of it by token index.
pub struct EmbeddingOp<S: Storage, N: StaticDim, E: StaticDim> {
    weight: Tensor2<S, N, E>,
}

impl<N: StaticDim, E: StaticDim> EmbeddingOp<MmapStorage<f32>, N, E> {
    /// Map `<prefix>.weight` as an f32 table of `N` rows by `E` columns.
    ///
    /// Fails if the file cannot be mapped or holds fewer than `N * E`
    /// elements.
    pub fn load(prefix: impl AsRef<Path>) -> Result<Self> {
        let mut path = prefix.as_ref().as_os_str().to_owned();
        path.push(".weight");
        let path = PathBuf::from(path);

        let storage = MmapStorage::<f32>::open(&path)?;
        let expected = u64::from(N::static_dim()) * u64::from(E::static_dim());
        if u64::from(storage.len()) < expected {
            return Err(ModelError::WeightSize {
                path,
                expected,
                got: storage.len(),
            });
        }

        Ok(Self::from_weight(Tensor::new(
            storage,
            (N::default(), E::default()),
        )))
    }
}

impl<S: Storage, N: StaticDim, E: StaticDim> EmbeddingOp<S, N, E> {
    pub fn from_weight(weight: Tensor2<S, N, E>) -> Self {
        EmbeddingOp { weight }
    }

    pub fn weight(&self) -> &Tensor2<S, N, E> {
        &self.weight
    }

    /// Gathers one weight row per input index.
    ///
    /// Output row `i` is a copy of weight row `input[i]`. Every index must be
    /// below `N`; that is only asserted in debug builds.
    pub fn execute<I, L>(&self, input: &Tensor1<I, L>) -> Tensor2<VecStorage<S::Elem>, L, E>
    where
        I: Storage,
        I::Elem: Into<u32>,
        L: Dim,
    {
        let len = input.total_size();
        let width = E::static_dim();
        let output = Tensor::new(VecStorage::create(len * width), (input.n0(), E::default()));

        for i in 0..len {
            let index: u32 = input.get(i).into();
            debug_assert!(
                index < N::static_dim(),
                "embedding index {} out of range for table of {} rows",
                index,
                N::static_dim()
            );
            let src = self.weight.row(index);
            let dst = output.row(i);
            for j in 0..width {
                dst.set(j, src.get(j));
            }
        }

        log::debug!("embedding lookup: {} rows of {}", len, width);
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::test_util::write_weight;
    use gpt_tensor::{Const, DynDim, TensorError};
    use std::rc::Rc;

    fn tokens(ids: &[u32]) -> Tensor1<VecStorage<u32>, DynDim> {
        let storage = Rc::new(VecStorage::from_vec(ids.to_vec()));
        Tensor::new(storage, (DynDim(ids.len() as u32),))
    }

    #[test]
    fn test_lookup_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("transformer.wte");
        write_weight(&prefix, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let op = EmbeddingOp::<MmapStorage<f32>, Const<3>, Const<2>>::load(&prefix).unwrap();
        let out = op.execute(&tokens(&[2, 0]));

        assert_eq!(out.shape().dims(), &[2, 2]);
        assert_eq!(out.get(0, 0), 5.0);
        assert_eq!(out.get(0, 1), 6.0);
        assert_eq!(out.get(1, 0), 1.0);
        assert_eq!(out.get(1, 1), 2.0);
    }

    #[test]
    fn test_output_rows_copy_weight_rows() {
        let table: Vec<f32> = (0..5 * 4).map(|v| v as f32 * 0.5).collect();
        let weight = Tensor::new(
            Rc::new(VecStorage::from_vec(table)),
            (Const::<5>::new(), Const::<4>::new()),
        );
        let op = EmbeddingOp::from_weight(weight);

        let ids = [4, 4, 0, 3, 1, 2, 0];
        let out = op.execute(&tokens(&ids));

        assert_eq!(out.shape().dims(), &[7, 4]);
        for (k, &t) in ids.iter().enumerate() {
            assert_eq!(
                out.row(k as u32).storage().to_vec(),
                op.weight().row(t).storage().to_vec()
            );
        }
    }

    #[test]
    fn test_output_is_independent_of_weight() {
        let weight = Tensor::new(
            Rc::new(VecStorage::from_vec(vec![1u32, 2, 3, 4])),
            (Const::<2>::new(), Const::<2>::new()),
        );
        let op = EmbeddingOp::from_weight(weight);
        let out = op.execute(&tokens(&[1]));
        out.set(0, 0, 99);
        assert_eq!(op.weight().get(1, 0), 3);
    }

    #[test]
    fn test_narrow_index_types() {
        let weight = Tensor::new(
            Rc::new(VecStorage::from_vec(vec![10i32, 20, 30])),
            (Const::<3>::new(), Const::<1>::new()),
        );
        let op = EmbeddingOp::from_weight(weight);
        let input = Tensor::new(Rc::new(VecStorage::from_vec(vec![2u8, 1])), (Const::<2>::new(),));
        let out = op.execute(&input);
        assert_eq!(out.storage().to_vec(), vec![30, 20]);
    }

    #[test]
    fn test_empty_input() {
        let weight = Tensor::new(
            Rc::new(VecStorage::from_vec(vec![1.0f32, 2.0])),
            (Const::<1>::new(), Const::<2>::new()),
        );
        let op = EmbeddingOp::from_weight(weight);
        let out = op.execute(&tokens(&[]));
        assert_eq!(out.total_size(), 0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("transformer.wpe");
        let result = EmbeddingOp::<MmapStorage<f32>, Const<3>, Const<2>>::load(prefix);
        assert!(matches!(
            result,
            Err(ModelError::TensorError(TensorError::FileOpen { .. }))
        ));
    }

    #[test]
    fn test_load_short_file() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("short");
        let path = write_weight(&prefix, &[1.0, 2.0, 3.0]);

        match EmbeddingOp::<MmapStorage<f32>, Const<3>, Const<2>>::load(&prefix) {
            Err(ModelError::WeightSize {
                path: p,
                expected,
                got,
            }) => {
                assert_eq!(p, path);
                assert_eq!(expected, 6);
                assert_eq!(got, 3);
            }
            Err(other) => panic!("expected WeightSize, got {other:?}"),
            Ok(_) => panic!("expected WeightSize, got a loaded table"),
        }
    }
}

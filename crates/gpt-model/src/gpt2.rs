use std::rc::Rc;

use gpt_tensor::{Dim, MmapStorage, StaticDim, Storage, Tensor, Tensor1, Tensor2, VecStorage};

use crate::config::{BlockSize, Gpt2Config, NEmbd, VocabSize};
use crate::error::{ModelError, Result};
use crate::ops::{AddOp, EmbeddingOp};

/// Input stage of a GPT-2 model: token embedding plus learned position
/// embedding.
///
/// - `V`: vocabulary size (rows of `wte`)
/// - `P`: context window (rows of `wpe`)
/// - `E`: embedding width shared by both tables
pub struct TokenPositionEmbedding<V, P, E, S = MmapStorage<f32>>
where
    V: StaticDim,
    P: StaticDim,
    E: StaticDim,
    S: Storage,
{
    wte: EmbeddingOp<S, V, E>,
    wpe: EmbeddingOp<S, P, E>,
}

/// GPT-2 small: 50257 tokens, 1024 positions, 768 wide.
pub type Gpt2Embeddings = TokenPositionEmbedding<VocabSize, BlockSize, NEmbd>;

impl<V: StaticDim, P: StaticDim, E: StaticDim> TokenPositionEmbedding<V, P, E> {
    /// Map `transformer.wte.weight` and `transformer.wpe.weight` from the
    /// config's model directory.
    ///
    /// The config sizes must agree with the static table dimensions.
    pub fn load(config: &Gpt2Config) -> Result<Self> {
        config.validate()?;
        let expected = [
            ("vocab_size", config.vocab_size, V::static_dim()),
            ("block_size", config.block_size, P::static_dim()),
            ("n_embd", config.n_embd, E::static_dim()),
        ];
        for (name, got, want) in expected {
            if got != want {
                return Err(ModelError::InvalidConfig(format!(
                    "{}={} but the embedding tables are built for {}",
                    name, got, want
                )));
            }
        }

        let wte = EmbeddingOp::load(config.weight_prefix("wte"))?;
        let wpe = EmbeddingOp::load(config.weight_prefix("wpe"))?;
        Ok(TokenPositionEmbedding { wte, wpe })
    }
}

impl<V, P, E, S> TokenPositionEmbedding<V, P, E, S>
where
    V: StaticDim,
    P: StaticDim,
    E: StaticDim,
    S: Storage,
{
    pub fn new(wte: EmbeddingOp<S, V, E>, wpe: EmbeddingOp<S, P, E>) -> Self {
        TokenPositionEmbedding { wte, wpe }
    }

    pub fn wte(&self) -> &EmbeddingOp<S, V, E> {
        &self.wte
    }

    pub fn wpe(&self) -> &EmbeddingOp<S, P, E> {
        &self.wpe
    }

    /// Embeds a sequence of token ids: `wte[tokens[t]] + wpe[t]`.
    ///
    /// # Errors
    /// Returns `ModelError::SequenceTooLong` if there are more tokens than
    /// position embeddings.
    pub fn forward<I, L>(
        &self,
        tokens: &Tensor1<I, L>,
    ) -> Result<Tensor2<VecStorage<S::Elem>, L, E>>
    where
        I: Storage,
        I::Elem: Into<u32>,
        L: Dim,
    {
        let len = tokens.total_size();
        if len > P::static_dim() {
            return Err(ModelError::SequenceTooLong {
                len,
                max: P::static_dim(),
            });
        }

        let positions = Tensor::new(
            Rc::new(VecStorage::from_vec((0..len).collect::<Vec<u32>>())),
            (tokens.n0(),),
        );
        let tok_emb = self.wte.execute(tokens);
        let pos_emb = self.wpe.execute(&positions);
        Ok(AddOp::execute(&tok_emb, &pos_emb)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::test_util::write_weight;
    use gpt_tensor::{Const, DynDim, TensorError};

    type Tiny = TokenPositionEmbedding<Const<4>, Const<3>, Const<2>>;

    fn tiny_config(dir: &std::path::Path) -> Gpt2Config {
        Gpt2Config {
            n_embd: 2,
            n_head: 1,
            n_layer: 1,
            vocab_size: 4,
            block_size: 3,
            model_dir: dir.to_path_buf(),
        }
    }

    fn write_tiny_model(config: &Gpt2Config) {
        // wte row t = [t, 10t]
        write_weight(
            &config.weight_prefix("wte"),
            &[0.0, 0.0, 1.0, 10.0, 2.0, 20.0, 3.0, 30.0],
        );
        // wpe row p = [100p, 1000p]
        write_weight(
            &config.weight_prefix("wpe"),
            &[0.0, 0.0, 100.0, 1000.0, 200.0, 2000.0],
        );
    }

    fn tokens(ids: &[u32]) -> Tensor1<VecStorage<u32>, DynDim> {
        Tensor::new(
            Rc::new(VecStorage::from_vec(ids.to_vec())),
            (DynDim(ids.len() as u32),),
        )
    }

    #[test]
    fn test_forward_adds_token_and_position() {
        let dir = tempfile::tempdir().unwrap();
        let config = tiny_config(dir.path());
        write_tiny_model(&config);

        let model = Tiny::load(&config).unwrap();
        let x = model.forward(&tokens(&[3, 1, 2])).unwrap();

        assert_eq!(x.shape().dims(), &[3, 2]);
        assert_eq!(x.row(0).storage().to_vec(), vec![3.0, 30.0]);
        assert_eq!(x.row(1).storage().to_vec(), vec![101.0, 1010.0]);
        assert_eq!(x.row(2).storage().to_vec(), vec![202.0, 2020.0]);
    }

    #[test]
    fn test_forward_rejects_long_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let config = tiny_config(dir.path());
        write_tiny_model(&config);

        let model = Tiny::load(&config).unwrap();
        let err = model.forward(&tokens(&[0, 1, 2, 3])).err();
        assert!(matches!(
            err,
            Some(ModelError::SequenceTooLong { len: 4, max: 3 })
        ));
    }

    #[test]
    fn test_load_rejects_mismatched_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Gpt2Config {
            vocab_size: 5,
            ..tiny_config(dir.path())
        };
        let err = Tiny::load(&config).err();
        assert!(matches!(err, Some(ModelError::InvalidConfig(_))));
    }

    #[test]
    fn test_load_missing_weights() {
        let dir = tempfile::tempdir().unwrap();
        let err = Tiny::load(&tiny_config(dir.path())).err();
        assert!(matches!(
            err,
            Some(ModelError::TensorError(TensorError::FileOpen { .. }))
        ));
    }

    #[test]
    fn test_in_memory_tables() {
        let wte = Tensor::new(
            Rc::new(VecStorage::from_vec(vec![1u32, 2, 3, 4])),
            (Const::<2>::new(), Const::<2>::new()),
        );
        let wpe = Tensor::new(
            Rc::new(VecStorage::from_vec(vec![10u32, 10])),
            (Const::<1>::new(), Const::<2>::new()),
        );
        let model = TokenPositionEmbedding::new(
            EmbeddingOp::from_weight(wte),
            EmbeddingOp::from_weight(wpe),
        );
        let x = model.forward(&tokens(&[1])).unwrap();
        assert_eq!(x.storage().to_vec(), vec![13, 14]);
    }
}

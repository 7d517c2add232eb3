use std::path::PathBuf;

use gpt_tensor::Const;

use crate::error::{ModelError, Result};

/// Embedding dimension of GPT-2 small.
pub const N_EMBD: u32 = 768;
/// Number of attention heads.
pub const N_HEAD: u32 = 12;
/// Number of transformer layers.
pub const N_LAYER: u32 = 12;
/// 50,000 BPE merges + 256 byte tokens + `<|endoftext|>`.
pub const VOCAB_SIZE: u32 = 50257;
/// Maximum sequence length.
pub const BLOCK_SIZE: u32 = 1024;

pub type NEmbd = Const<N_EMBD>;
pub type VocabSize = Const<VOCAB_SIZE>;
pub type BlockSize = Const<BLOCK_SIZE>;

/// Hyperparameters and weight location for a GPT-2 model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gpt2Config {
    /// Embedding dimension / hidden size.
    pub n_embd: u32,
    /// Number of attention heads.
    pub n_head: u32,
    /// Number of transformer layers.
    pub n_layer: u32,
    /// Number of token embeddings.
    pub vocab_size: u32,
    /// Number of position embeddings (context window).
    pub block_size: u32,
    /// Directory holding one raw `.weight` file per parameter.
    pub model_dir: PathBuf,
}

impl Default for Gpt2Config {
    fn default() -> Self {
        Gpt2Config {
            n_embd: N_EMBD,
            n_head: N_HEAD,
            n_layer: N_LAYER,
            vocab_size: VOCAB_SIZE,
            block_size: BLOCK_SIZE,
            model_dir: PathBuf::from("models"),
        }
    }
}

impl Gpt2Config {
    /// Checks that every size is non-zero and that the heads evenly split
    /// the embedding.
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("n_embd", self.n_embd),
            ("n_head", self.n_head),
            ("n_layer", self.n_layer),
            ("vocab_size", self.vocab_size),
            ("block_size", self.block_size),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(ModelError::InvalidConfig(format!("{} must be > 0", name)));
        }
        if self.n_embd % self.n_head != 0 {
            return Err(ModelError::InvalidConfig(format!(
                "n_embd={} is not divisible by n_head={}",
                self.n_embd, self.n_head
            )));
        }
        Ok(())
    }

    /// Dimension of each attention head (n_embd / n_head).
    pub fn head_dim(&self) -> u32 {
        self.n_embd / self.n_head
    }

    /// Prefix of a transformer parameter file, e.g. `models/transformer.wte`.
    ///
    /// Operators append `.weight` (or `.bias`) themselves.
    pub fn weight_prefix(&self, name: &str) -> PathBuf {
        self.model_dir.join(format!("transformer.{}", name))
    }
}

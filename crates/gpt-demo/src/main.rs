use std::process::ExitCode;
use std::rc::Rc;

use gpt_model::{Gpt2Config, Gpt2Embeddings, Result};
use gpt_tensor::{Dump, DynDim, Tensor, VecStorage};

/// "Hello, I'm a language model," in GPT-2 BPE ids.
const PROMPT: [u32; 8] = [15496, 11, 314, 1101, 257, 3303, 2746, 11];

fn run() -> Result<()> {
    let config = Gpt2Config::default();
    config.validate()?;
    log::info!(
        "gpt2: n_embd={} n_head={} (head_dim={}) n_layer={} vocab_size={} block_size={}",
        config.n_embd,
        config.n_head,
        config.head_dim(),
        config.n_layer,
        config.vocab_size,
        config.block_size
    );

    let embeddings = Gpt2Embeddings::load(&config)?;
    let tokens = Tensor::new(
        Rc::new(VecStorage::from_vec(PROMPT.to_vec())),
        (DynDim(PROMPT.len() as u32),),
    );

    let x = embeddings.forward(&tokens)?;
    x.dump()?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

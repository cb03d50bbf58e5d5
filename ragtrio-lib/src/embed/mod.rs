//! Text embedding
//!
//! The pipelines embed through a hosted OpenAI-compatible `/embeddings`
//! endpoint ([`OpenAiEmbedder`]). With the `local` feature an E5 model can be
//! run in-process instead ([`LocalEmbedder`]).
//!
//! ```ignore
//! use ragtrio_lib::embed::{Embedder, OpenAiEmbedder, OpenAiEmbedderConfig};
//!
//! let mut embedder = OpenAiEmbedder::new(OpenAiEmbedderConfig::new(api_key))?;
//! let passages = embedder.embed_documents(&["Parte I: A Terra", "Parte II: O Homem"])?;
//! let query = embedder.embed_query("How is the sertão described?")?;
//! ```

use crate::Result;

pub type Embedding = Vec<f32>;

/// Turns text into vectors. Documents and queries go through separate
/// methods because some models embed them differently.
pub trait Embedder: Send + Sync {
    /// One embedding per input, in input order.
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>>;

    fn embed_query(&mut self, text: &str) -> Result<Embedding>;

    /// Vector length, if known before the first call
    fn dimension(&self) -> Option<usize>;

    /// Also part of the snapshot file name, so indexes from different
    /// models never mix.
    fn model_name(&self) -> &str;
}

impl<T: Embedder + ?Sized> Embedder for Box<T> {
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        (**self).embed_documents(texts)
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        (**self).embed_query(text)
    }

    fn dimension(&self) -> Option<usize> {
        (**self).dimension()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

mod openai;
pub use openai::*;

#[cfg(feature = "local")]
mod local;
#[cfg(feature = "local")]
pub use local::*;

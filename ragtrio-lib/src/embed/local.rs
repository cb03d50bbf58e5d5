use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

/// Local multilingual embedder using intfloat/multilingual-e5-large.
///
/// Uses fastembed for ONNX-based inference. This model produces
/// 1024-dimensional embeddings and handles the Portuguese source text.
pub struct LocalEmbedder {
    model: TextEmbedding,
}

impl LocalEmbedder {
    /// Create a new local embedder.
    ///
    /// Downloads the model on first use (~2.2GB).
    pub fn new() -> Result<Self> {
        let opts = InitOptions::new(EmbeddingModel::MultilingualE5Large)
            .with_show_download_progress(true);

        TextEmbedding::try_new(opts)
            .map(|model| Self { model })
            .map_err(|e| Error::Embedding(e.to_string()))
    }
}

impl Embedder for LocalEmbedder {
    fn model_name(&self) -> &str {
        "intfloat/multilingual-e5-large"
    }

    fn dimension(&self) -> Option<usize> {
        Some(1024)
    }

    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        // E5 models are trained with role prefixes on both sides
        let passages: Vec<String> = texts.iter().map(|t| format!("passage: {t}")).collect();

        self.model
            .embed(passages, None)
            .map_err(|e| Error::Embedding(e.to_string()))
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        let query_text = format!("query: {text}");

        self.model
            .embed(vec![query_text], None)
            .map_err(|e| Error::Embedding(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("model returned no embeddings".to_string()))
    }
}

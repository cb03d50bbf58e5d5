//! End-to-end question answering
//!
//! A [`Pipeline`] ties one retriever to the shared prompt template and a
//! generator. Control flow per question is strictly sequential:
//! retrieve -> render prompt -> generate.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::embed::Embedder;
use crate::generate::{GenerationRequest, Generator};
use crate::load::Page;
use crate::prompt::PromptTemplate;
use crate::rerank::Reranker;
use crate::retrieve::{
    document_key, IndexStats, NaiveConfig, NaiveRetriever, ParentConfig, ParentDocumentRetriever, RerankConfig,
    RerankRetriever, Retriever,
};
use crate::store::SearchResult;
use crate::{Error, Result};

/// The three retrieval strategies being compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    Naive,
    Parent,
    Rerank,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 3] = [PipelineKind::Naive, PipelineKind::Parent, PipelineKind::Rerank];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineKind::Naive => "naive",
            PipelineKind::Parent => "parent",
            PipelineKind::Rerank => "rerank",
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "naive" => Ok(PipelineKind::Naive),
            "parent" | "parent-document" => Ok(PipelineKind::Parent),
            "rerank" => Ok(PipelineKind::Rerank),
            other => Err(Error::InvalidInput(format!(
                "unknown pipeline '{other}'; use naive, parent or rerank"
            ))),
        }
    }
}

/// Generation settings for a pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Output bound passed to the chat model
    pub max_tokens: usize,
    /// `None` keeps the provider's default temperature
    pub temperature: Option<f32>,
}

impl PipelineConfig {
    pub fn for_kind(kind: PipelineKind) -> Self {
        let max_tokens = match kind {
            PipelineKind::Naive | PipelineKind::Parent => 200,
            PipelineKind::Rerank => 500,
        };
        Self {
            max_tokens,
            temperature: None,
        }
    }
}

/// A generated answer together with what it was generated from
#[derive(Debug, Clone)]
pub struct Answer {
    pub kind: PipelineKind,
    pub question: String,
    /// Retrieved context, in the order it appears in the prompt
    pub context: Vec<SearchResult>,
    pub prompt: String,
    pub text: String,
}

/// Build the retriever for `kind` with its default parameters.
///
/// The rerank strategy needs a reranker; the others ignore it.
pub fn build_retriever(
    kind: PipelineKind,
    embedder: Box<dyn Embedder>,
    reranker: Option<Box<dyn Reranker>>,
) -> Result<Box<dyn Retriever>> {
    Ok(match kind {
        PipelineKind::Naive => Box::new(NaiveRetriever::new(embedder, NaiveConfig::default())?),
        PipelineKind::Parent => Box::new(ParentDocumentRetriever::new(
            embedder,
            ParentConfig::default(),
        )?),
        PipelineKind::Rerank => {
            let reranker = reranker.ok_or_else(|| {
                Error::Config("the rerank pipeline needs a reranker".to_string())
            })?;
            Box::new(RerankRetriever::new(embedder, reranker, RerankConfig::default())?)
        }
    })
}

/// Restore `retriever` from a snapshot of these `pages` in `dir`, or index
/// them and write one.
pub fn index_cached(retriever: &mut dyn Retriever, pages: &[Page], dir: &Path) -> Result<IndexStats> {
    let document = document_key(pages);
    if let Some(stats) = retriever.restore(dir, &document)? {
        tracing::info!(
            retriever = retriever.name(),
            document = %document,
            embedded = stats.embedded,
            "restored index snapshot"
        );
        return Ok(stats);
    }

    let stats = retriever.index(pages)?;
    std::fs::create_dir_all(dir)
        .map_err(|e| Error::Store(format!("failed to create {}: {e}", dir.display())))?;
    retriever.save(dir, &document)?;
    tracing::info!(
        retriever = retriever.name(),
        dir = %dir.display(),
        document = %document,
        "saved index snapshot"
    );
    Ok(stats)
}

/// Retriever + prompt template + generator
pub struct Pipeline {
    kind: PipelineKind,
    retriever: Box<dyn Retriever>,
    generator: Box<dyn Generator>,
    template: PromptTemplate,
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline with the default template and the kind's output bound.
    pub fn new(kind: PipelineKind, retriever: Box<dyn Retriever>, generator: Box<dyn Generator>) -> Self {
        Self {
            kind,
            retriever,
            generator,
            template: PromptTemplate::default(),
            config: PipelineConfig::for_kind(kind),
        }
    }

    #[must_use]
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn retriever(&self) -> &dyn Retriever {
        self.retriever.as_ref()
    }

    /// Build the index from the document pages.
    pub fn index(&mut self, pages: &[Page]) -> Result<IndexStats> {
        let stats = self.retriever.index(pages)?;
        tracing::info!(
            pipeline = %self.kind,
            embedded = stats.embedded,
            stored = stats.stored,
            "pipeline indexed"
        );
        Ok(stats)
    }

    /// Reuse a saved index under `dir` if one matches, otherwise build and save it.
    pub fn index_cached(&mut self, pages: &[Page], dir: &Path) -> Result<IndexStats> {
        index_cached(self.retriever.as_mut(), pages, dir)
    }

    /// Context chunks for a question, without calling the generator.
    pub fn retrieve(&mut self, question: &str) -> Result<Vec<SearchResult>> {
        if question.trim().is_empty() {
            return Err(Error::InvalidInput("question is empty".to_string()));
        }
        let context = self.retriever.retrieve(question)?;
        if context.is_empty() {
            tracing::warn!(pipeline = %self.kind, "no context retrieved; is the index empty?");
        }
        Ok(context)
    }

    /// Retrieve context, render the prompt and generate an answer.
    pub fn answer(&mut self, question: &str) -> Result<Answer> {
        let context = self.retrieve(question)?;
        let chunks: Vec<_> = context.iter().map(|r| r.chunk.clone()).collect();
        let prompt = self.template.render(question, &chunks);

        let request = GenerationRequest {
            prompt: &prompt,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };
        let text = self.generator.generate(&request)?;
        tracing::debug!(pipeline = %self.kind, chars = text.len(), "generated answer");

        Ok(Answer {
            kind: self.kind,
            question: question.to_string(),
            context,
            prompt,
            text: text.trim().to_string(),
        })
    }
}

//! ragtrio - three RAG retrieval strategies over a single document
//!
//! # Architecture
//!
//! ```text
//! PDF -> Loader -> Chunker -> Embedder -> Store
//!                                           |
//! Question -> Retriever (naive | parent | rerank)
//!                 |
//!              Prompt -> Generator -> Answer
//! ```
//!
//! Embeddings, reranking and generation are hosted services reached over
//! blocking HTTP. Everything runs sequentially: the index is built once,
//! then questions are answered one at a time.
//!
//! # Example
//!
//! ```ignore
//! use ragtrio_lib::{
//!     embed::{OpenAiEmbedder, OpenAiEmbedderConfig},
//!     generate::{OpenAiGenerator, OpenAiGeneratorConfig},
//!     load::load_document,
//!     pipeline::{build_retriever, Pipeline, PipelineKind},
//! };
//!
//! let pages = load_document("os_sertoes.pdf")?;
//! let embedder = OpenAiEmbedder::new(OpenAiEmbedderConfig::new(key.clone()))?;
//! let generator = OpenAiGenerator::new(OpenAiGeneratorConfig::new(key))?;
//!
//! let retriever = build_retriever(PipelineKind::Naive, Box::new(embedder), None)?;
//! let mut pipeline = Pipeline::new(PipelineKind::Naive, retriever, Box::new(generator));
//! pipeline.index(&pages)?;
//! let answer = pipeline.answer("How is the caatinga described?")?;
//! println!("{}", answer.text);
//! ```

pub mod chunk;
pub mod embed;
pub mod error;
pub mod generate;
mod http;
pub mod load;
pub mod pipeline;
pub mod prompt;
pub mod questions;
pub mod rerank;
pub mod retrieve;
pub mod search;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};

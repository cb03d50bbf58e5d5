//! Answer generation through a hosted chat model

use std::sync::Arc;

use crate::Result;

/// Request envelope passed to a [`Generator`].
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub prompt: &'a str,
    /// Upper bound on generated tokens
    pub max_tokens: usize,
    /// Sampling temperature; `None` leaves the provider default
    pub temperature: Option<f32>,
}

/// Trait implemented by chat-completion backends.
pub trait Generator: Send + Sync {
    /// Produce plain text for the prompt. Failures are not retried.
    fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

impl<T: Generator + ?Sized> Generator for Box<T> {
    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        (**self).generate(request)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

impl<T: Generator + ?Sized> Generator for Arc<T> {
    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        (**self).generate(request)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

mod openai;
pub use openai::*;

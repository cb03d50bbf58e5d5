//! Prompt assembly
//!
//! Every pipeline feeds its context through the same template, so answers
//! differ only by what was retrieved.

use crate::chunk::Chunk;
use crate::{Error, Result};

const QUESTION: &str = "{question}";
const CONTEXT: &str = "{context}";

/// Instruction template shared by all pipelines.
pub const LITERARY_ANALYSIS_TEMPLATE: &str = "\
You are an expert in literary analysis of Brazilian literature. \
Answer the question using only the context below, taken from the book. \
If the context is not enough to answer, say so instead of guessing.

Question: {question}

Context:
{context}

Answer:";

/// A template with `{question}` and `{context}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for placeholder in [QUESTION, CONTEXT] {
            if !template.contains(placeholder) {
                return Err(Error::Config(format!(
                    "prompt template is missing the {placeholder} placeholder"
                )));
            }
        }
        Ok(Self { template })
    }

    /// Fill the template with the question and the retrieved chunks.
    ///
    /// Chunk texts are joined with a blank line, in the order given.
    pub fn render(&self, question: &str, context: &[Chunk]) -> String {
        // context goes in last so chunk text containing "{question}" is left alone
        self.template
            .replace(QUESTION, question.trim())
            .replace(CONTEXT, &render_context(context))
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: LITERARY_ANALYSIS_TEMPLATE.to_string(),
        }
    }
}

/// Concatenate chunk texts, separated by a blank line.
pub fn render_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.content.trim())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkMetadata;

    fn make_chunk(content: &str) -> Chunk {
        Chunk {
            id: content.to_string(),
            content: content.to_string(),
            metadata: ChunkMetadata::default(),
        }
    }

    #[test]
    fn test_render_interpolates_in_order() {
        let template = PromptTemplate::default();
        let prompt = template.render(
            "  What is the sertão?  ",
            &[make_chunk("first passage"), make_chunk("second passage\n")],
        );

        assert!(prompt.starts_with("You are an expert in literary analysis"));
        assert!(prompt.contains("Question: What is the sertão?\n"));
        assert!(prompt.contains("Context:\nfirst passage\n\nsecond passage\n\nAnswer:"));
        assert!(!prompt.contains(QUESTION));
        assert!(!prompt.contains(CONTEXT));
    }

    #[test]
    fn test_context_text_is_not_reinterpolated() {
        let template = PromptTemplate::new("Q={question} C={context}").unwrap();
        let prompt = template.render("why?", &[make_chunk("literal {question}")]);
        assert_eq!(prompt, "Q=why? C=literal {question}");
    }

    #[test]
    fn test_template_requires_placeholders() {
        assert!(matches!(
            PromptTemplate::new("only {question}"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            PromptTemplate::new("only {context}"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_render_context_empty() {
        assert_eq!(render_context(&[]), "");
    }
}

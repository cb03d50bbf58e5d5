//! Document loading
//!
//! Loaders turn a file on disk into an ordered list of [`Page`]s. PDFs are
//! split along their real page boundaries; plain text files become a single
//! page.
//!
//! # Usage
//!
//! ```ignore
//! use ragtrio_lib::load::load_document;
//!
//! let pages = load_document("os_sertoes.pdf")?;
//! println!("{} pages", pages.len());
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A unit of extracted text from a document
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Page {
    /// Zero-based page index within the document
    pub index: usize,
    /// Path of the document this page came from
    pub source: String,
    /// Extracted text
    pub content: String,
}

/// Trait for document loaders
pub trait DocumentLoader {
    /// Read the document at `path` into pages, in document order
    fn load(&self, path: &Path) -> Result<Vec<Page>>;

    /// Returns the name of this loader
    fn name(&self) -> &str;
}

/// Load a document, picking the loader from the file extension.
///
/// `.pdf` files go through [`PdfLoader`], everything else is read as UTF-8
/// text with [`TextLoader`].
pub fn load_document(path: impl AsRef<Path>) -> Result<Vec<Page>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::Loading(format!(
            "source document {} does not exist",
            path.display()
        )));
    }

    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    let pages = if is_pdf {
        PdfLoader.load(path)?
    } else {
        TextLoader.load(path)?
    };

    tracing::info!(path = %path.display(), pages = pages.len(), "loaded document");
    Ok(pages)
}

mod pdf;
mod text;

pub use pdf::*;
pub use text::*;

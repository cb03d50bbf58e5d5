use std::path::Path;

use crate::load::{DocumentLoader, Page};
use crate::{Error, Result};

/// PDF loader - one [`Page`] per PDF page, in page-number order.
///
/// Text extraction is done by `lopdf`. Pages without extractable text are
/// kept with empty content so page indices line up with the document.
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn name(&self) -> &str {
        "pdf"
    }

    fn load(&self, path: &Path) -> Result<Vec<Page>> {
        let document = lopdf::Document::load(path)
            .map_err(|e| Error::Loading(format!("{}: {e}", path.display())))?;
        let source = path.display().to_string();

        // get_pages is keyed by 1-based page number, already sorted
        let mut pages = Vec::new();
        for (index, page_number) in document.get_pages().into_keys().enumerate() {
            let content = document.extract_text(&[page_number]).map_err(|e| {
                Error::Loading(format!("{source}: page {page_number}: {e}"))
            })?;

            pages.push(Page {
                index,
                source: source.clone(),
                content,
            });
        }

        if pages.is_empty() {
            return Err(Error::Loading(format!("{source}: document has no pages")));
        }
        Ok(pages)
    }
}

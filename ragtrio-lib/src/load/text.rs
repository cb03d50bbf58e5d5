use std::fs;
use std::path::Path;

use crate::load::{DocumentLoader, Page};
use crate::{Error, Result};

/// Plain text loader - the whole file becomes a single page.
pub struct TextLoader;

impl DocumentLoader for TextLoader {
    fn name(&self) -> &str {
        "text"
    }

    fn load(&self, path: &Path) -> Result<Vec<Page>> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Loading(format!("{}: {e}", path.display())))?;

        Ok(vec![Page {
            index: 0,
            source: path.display().to_string(),
            content,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page_with_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, "line one\nline two").unwrap();

        let pages = TextLoader.load(&path).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].index, 0);
        assert_eq!(pages[0].source, path.display().to_string());
        assert_eq!(pages[0].content, "line one\nline two");
    }
}

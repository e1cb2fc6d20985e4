//! PDF text extraction module.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text outcome of a single page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageText {
    /// The page yielded text.
    Text(String),
    /// The page yielded nothing (no text layer, or the page could not be read).
    Empty,
}

impl PageText {
    /// Build from raw extractor output, treating blank output as empty.
    pub fn from_raw(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            PageText::Empty
        } else {
            PageText::Text(text)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PageText::Text(text) => text,
            PageText::Empty => "",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, PageText::Empty)
    }
}

/// Concatenate page texts in page order, each followed by a newline.
///
/// Empty pages contribute only their newline.
pub fn join_pages(pages: &[PageText]) -> String {
    let capacity = pages.iter().map(|p| p.as_str().len() + 1).sum();
    let mut text = String::with_capacity(capacity);
    for page in pages {
        text.push_str(page.as_str());
        text.push('\n');
    }
    text
}

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract the text of every page, in page order.
    fn extract_pages(&self) -> Result<Vec<PageText>>;

    /// Extract the whole document as one newline-joined text stream.
    fn extract_text(&self) -> Result<String> {
        Ok(join_pages(&self.extract_pages()?))
    }
}

//! PDF page text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::{PageText, PdfProcessor, Result};
use crate::error::PdfError;

/// PDF text extractor using lopdf for structure and pdf-extract for text.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a PDF from bytes in one step.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut extractor = Self::new();
        extractor.load(data)?;
        Ok(extractor)
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))
    }

    /// Page-by-page extraction through lopdf's own text layer.
    ///
    /// Pages lopdf cannot decode become [`PageText::Empty`].
    fn extract_pages_lopdf(&self, doc: &Document) -> Vec<PageText> {
        doc.get_pages()
            .keys()
            .map(|&page_num| match doc.extract_text(&[page_num]) {
                Ok(text) => PageText::from_raw(text),
                Err(e) => {
                    warn!("Failed to extract text from page {}: {}", page_num, e);
                    PageText::Empty
                }
            })
            .collect()
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf_extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_pages(&self) -> Result<Vec<PageText>> {
        let doc = self.document()?;
        let expected = doc.get_pages().len();

        let pages = match pdf_extract::extract_text_from_mem_by_pages(&self.raw_data) {
            Ok(texts) if texts.len() == expected => {
                texts.into_iter().map(PageText::from_raw).collect()
            }
            Ok(texts) => {
                warn!(
                    "pdf-extract returned {} pages, document has {}; using lopdf text layer",
                    texts.len(),
                    expected
                );
                self.extract_pages_lopdf(doc)
            }
            Err(e) => {
                warn!("pdf-extract failed ({}); using lopdf text layer", e);
                self.extract_pages_lopdf(doc)
            }
        };

        for (idx, page) in pages.iter().enumerate() {
            trace!("Page {}: {} chars", idx + 1, page.as_str().len());
        }
        let empty = pages.iter().filter(|p| p.is_empty()).count();
        debug!("Extracted text from {} pages ({} empty)", pages.len(), empty);

        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
    }

    #[test]
    fn test_extract_without_document_fails() {
        let extractor = PdfExtractor::new();
        assert!(matches!(extractor.extract_pages(), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_load_garbage_is_parse_error() {
        let result = PdfExtractor::from_bytes(b"definitely not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }
}

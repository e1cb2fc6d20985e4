//! Pallet code extraction with an inferred pattern.

use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use super::inference::InferredPattern;
use super::{ExtractionMatch, FieldExtractor, Result};

/// Codes pulled from a document, ready for lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedCodes {
    /// Normalized codes, ascending, duplicates kept.
    pub codes: Vec<u64>,
    /// Number of capture occurrences seen.
    pub captures: usize,
    /// Captures dropped because they were not purely numeric.
    pub malformed: usize,
}

impl ExtractedCodes {
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Strip spaces and newlines from a capture and parse it.
///
/// Returns `None` for anything that is not a non-empty run of ASCII digits
/// fitting in a `u64`.
pub fn normalize_capture(raw: &str) -> Option<u64> {
    let cleaned: String = raw.chars().filter(|&c| c != ' ' && c != '\n').collect();
    if cleaned.is_empty() || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

/// Applies an inferred pattern to document text.
#[derive(Debug, Clone)]
pub struct CodeExtractor {
    regex: Regex,
}

impl CodeExtractor {
    pub fn new(pattern: &InferredPattern) -> Result<Self> {
        Ok(Self {
            regex: pattern.regex()?,
        })
    }

    /// Every capture normalized and sorted ascending.
    pub fn normalize(&self, text: &str) -> ExtractedCodes {
        let mut result = ExtractedCodes::default();

        for caps in self.regex.captures_iter(text) {
            result.captures += 1;
            let raw = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            match normalize_capture(raw) {
                Some(code) => result.codes.push(code),
                None => {
                    trace!("Dropping malformed capture {:?}", raw);
                    result.malformed += 1;
                }
            }
        }

        result.codes.sort_unstable();

        debug!(
            "Extracted {} codes from {} captures ({} malformed)",
            result.codes.len(),
            result.captures,
            result.malformed
        );
        result
    }
}

impl FieldExtractor for CodeExtractor {
    type Output = ExtractionMatch<u64>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// Valid codes in document order, with capture positions.
    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| {
                let capture = caps.get(1)?;
                let code = normalize_capture(capture.as_str())?;
                Some(
                    ExtractionMatch::new(code, capture.as_str())
                        .with_position(capture.start(), capture.end()),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extractor(prefix: &str, suffix: &str) -> CodeExtractor {
        CodeExtractor::new(&InferredPattern::new(prefix, suffix)).unwrap()
    }

    #[test]
    fn test_normalize_capture() {
        assert_eq!(normalize_capture("0012 34"), Some(1234));
        assert_eq!(normalize_capture("12\n34"), Some(1234));
        assert_eq!(normalize_capture("12\t34"), None);
        assert_eq!(normalize_capture(" \n "), None);
        assert_eq!(normalize_capture(""), None);
        assert_eq!(normalize_capture("99999999999999999999999"), None);
    }

    #[test]
    fn test_codes_sorted_with_duplicates() {
        let text = "0101 000300 80\n0101000100 80 x 010100030080";
        let codes = extractor("0101", "80").normalize(text);
        assert_eq!(codes.codes, vec![100, 300, 300]);
        assert_eq!(codes.captures, 3);
        assert_eq!(codes.malformed, 0);
    }

    #[test]
    fn test_capture_spans_line_break() {
        let text = "Folio 0101000\n12345 80";
        let codes = extractor("0101", "80").normalize(text);
        assert_eq!(codes.codes, vec![12345]);
    }

    #[test]
    fn test_malformed_capture_counted() {
        let text = "0101\t\t80 0101555580";
        let codes = extractor("0101", "80").normalize(text);
        assert_eq!(codes.codes, vec![5555]);
        assert_eq!(codes.captures, 2);
        assert_eq!(codes.malformed, 1);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let codes = extractor("0101", "80").normalize("nothing to see");
        assert!(codes.is_empty());
        assert_eq!(codes.captures, 0);
    }

    #[test]
    fn test_extract_all_keeps_document_order() {
        let text = "0101900080 0101100080";
        let found = extractor("0101", "80").extract_all(text);
        let values: Vec<u64> = found.iter().map(|m| m.value).collect();
        assert_eq!(values, vec![9000, 1000]);
        assert_eq!(found[0].position, Some((4, 8)));
    }
}

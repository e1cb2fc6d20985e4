//! Statistical inference of the pallet code pattern.
//!
//! Pallet codes are printed differently by every template, so the extraction
//! regex is learned per document. Every standalone run of 10-14 digits
//! (after removing dates) votes on a 4-digit prefix and a 2-digit suffix;
//! the winners bracket a non-greedy capture of the folio between them.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Result;
use super::patterns::{CANDIDATE_CODE, DATE_DMY, PREFIX_LEN, SUFFIX_LEN};
use crate::error::ExtractionError;

/// Prefix/suffix bracket learned from a document's digit runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredPattern {
    prefix: String,
    suffix: String,
}

impl InferredPattern {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Majority vote over candidate codes.
    ///
    /// Returns `None` when there are no candidates. Ties go to the value
    /// seen first.
    pub fn from_candidates<S: AsRef<str>>(candidates: &[S]) -> Option<Self> {
        let prefix = most_frequent(candidates.iter().filter_map(|c| head(c.as_ref(), PREFIX_LEN)))?;
        let suffix = most_frequent(candidates.iter().filter_map(|c| tail(c.as_ref(), SUFFIX_LEN)))?;
        Some(Self::new(prefix, suffix))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Regex source: `prefix([\d\s]+?)suffix`.
    pub fn regex_source(&self) -> String {
        format!(
            r"{}([\d\s]+?){}",
            regex::escape(&self.prefix),
            regex::escape(&self.suffix)
        )
    }

    /// Compile the capture regex.
    pub fn regex(&self) -> Result<Regex> {
        let source = self.regex_source();
        Regex::new(&source).map_err(|e| ExtractionError::InvalidPattern {
            pattern: source.clone(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for InferredPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.regex_source())
    }
}

/// Outcome of pattern inference over one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inference {
    /// Number of candidate codes that voted.
    pub candidates: usize,
    /// Inferred pattern, `None` when no candidate exists.
    pub pattern: Option<InferredPattern>,
}

/// Blank out day/month/year dates so they never count as codes.
///
/// Each date becomes as many spaces as it had bytes, so offsets into the
/// result are offsets into `text`.
pub fn strip_dates(text: &str) -> Cow<'_, str> {
    DATE_DMY.replace_all(text, |caps: &Captures<'_>| " ".repeat(caps[0].len()))
}

/// All candidate codes in document order, dates excluded.
///
/// A candidate must also be a whole digit run of the original text, so
/// removing a date never shortens a longer number into a candidate.
pub fn find_candidates(text: &str) -> Vec<String> {
    let cleaned = strip_dates(text);
    CANDIDATE_CODE
        .find_iter(&cleaned)
        .filter(|m| is_whole_run(text.as_bytes(), m.start(), m.end()))
        .map(|m| m.as_str().to_string())
        .collect()
}

fn is_whole_run(bytes: &[u8], start: usize, end: usize) -> bool {
    let digit_before = start > 0 && bytes[start - 1].is_ascii_digit();
    let digit_after = bytes.get(end).is_some_and(u8::is_ascii_digit);
    !digit_before && !digit_after
}

/// Infer the pallet code pattern of a document.
pub fn infer_pattern(text: &str) -> Inference {
    let candidates = find_candidates(text);
    let pattern = InferredPattern::from_candidates(&candidates);

    match &pattern {
        Some(p) => debug!(
            "Inferred pattern {} from {} candidates (prefix {}, suffix {})",
            p,
            candidates.len(),
            p.prefix(),
            p.suffix()
        ),
        None => debug!("No candidate codes found; pattern undefined"),
    }

    Inference {
        candidates: candidates.len(),
        pattern,
    }
}

fn head(s: &str, n: usize) -> Option<&str> {
    s.get(..n)
}

fn tail(s: &str, n: usize) -> Option<&str> {
    s.len().checked_sub(n).and_then(|start| s.get(start..))
}

/// Most common key, first-seen order breaking ties.
fn most_frequent<'a>(keys: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut order: Vec<(&'a str, usize)> = Vec::new();
    let mut slots: HashMap<&'a str, usize> = HashMap::new();

    for key in keys {
        match slots.get(key) {
            Some(&slot) => order[slot].1 += 1,
            None => {
                slots.insert(key, order.len());
                order.push((key, 1));
            }
        }
    }

    let mut best: Option<(&'a str, usize)> = None;
    for (key, count) in order {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((key, count));
        }
    }
    best.map(|(key, _)| key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Maximal digit runs of a text.
    fn digit_runs(text: &str) -> Vec<&str> {
        text.split(|c: char| !c.is_ascii_digit())
            .filter(|run| !run.is_empty())
            .collect()
    }

    #[test]
    fn test_majority_vote() {
        let candidates = ["12345678901", "12345678999", "12349999901"];
        let pattern = InferredPattern::from_candidates(&candidates).unwrap();
        assert_eq!(pattern.prefix(), "1234");
        assert_eq!(pattern.suffix(), "01");
        assert_eq!(pattern.regex_source(), r"1234([\d\s]+?)01");
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let candidates = ["5555000000011", "7777000000022"];
        let pattern = InferredPattern::from_candidates(&candidates).unwrap();
        assert_eq!(pattern.prefix(), "5555");
        assert_eq!(pattern.suffix(), "11");
    }

    #[test]
    fn test_outlier_does_not_move_vote() {
        let text = "0101123456780 0101223456780 0101323456780 9999000000055";
        let inference = infer_pattern(text);
        assert_eq!(inference.candidates, 4);
        assert_eq!(inference.pattern, Some(InferredPattern::new("0101", "80")));
    }

    #[test]
    fn test_empty_text_is_undefined() {
        let inference = infer_pattern("");
        assert_eq!(inference.candidates, 0);
        assert!(inference.pattern.is_none());

        assert!(infer_pattern("\n\n").pattern.is_none());
        assert!(InferredPattern::from_candidates::<&str>(&[]).is_none());
    }

    #[test]
    fn test_dates_never_vote() {
        let text = "Fecha 12/10/2024 Lote 1/2/24\nPallet 7001123456789";
        assert_eq!(find_candidates(text), vec!["7001123456789".to_string()]);
    }

    #[test]
    fn test_date_glued_to_digits_is_removed() {
        assert!(find_candidates("5/5/2024123456 x").is_empty());
        assert!(find_candidates("01/02/20241234567890").is_empty());
        assert_eq!(
            find_candidates("Lote 7/1/24 0101000123480"),
            vec!["0101000123480".to_string()]
        );
    }

    #[test]
    fn test_strip_dates_keeps_offsets() {
        let text = "a 12/10/2024 b";
        let stripped = strip_dates(text);
        assert_eq!(stripped, "a            b");
        assert_eq!(stripped.len(), text.len());
    }

    #[test]
    fn test_only_maximal_runs_are_candidates() {
        let text = "123456789 1234567890 123456789012345 ABC12345678901";
        assert_eq!(find_candidates(text), vec!["1234567890".to_string()]);
    }

    #[test]
    fn test_date_removal_is_subtractive() {
        let samples = [
            "1234567891/1/2467890123",
            "12345678901234/1/24",
            "9/9/99 123456 78/12/2023 4567",
            "1234567 01/02/2024 890",
            "ab12/12/12cd 3333333333",
            "01/02/20241234567890",
        ];

        for sample in samples {
            let runs = digit_runs(sample);
            let stripped = strip_dates(sample);
            for candidate in CANDIDATE_CODE.find_iter(&stripped) {
                assert!(
                    runs.contains(&candidate.as_str()),
                    "{:?} produced new run {:?}",
                    sample,
                    candidate.as_str()
                );
            }
        }
    }

    #[test]
    fn test_inferred_pattern_recovers_every_candidate() {
        let text = "Pallets:\n0101000123480 0101000124580\n0101000125680 2024000000080";
        let candidates = find_candidates(text);
        let pattern = InferredPattern::from_candidates(&candidates).unwrap();
        let regex = pattern.regex().unwrap();

        for candidate in candidates
            .iter()
            .filter(|c| c.starts_with(pattern.prefix()) && c.ends_with(pattern.suffix()))
        {
            let caps = regex.captures(candidate).expect("pattern matches its own candidate");
            assert!(caps[1].bytes().all(|b| b.is_ascii_digit()), "{}", candidate);
            assert!(!caps[1].is_empty());
        }
    }
}

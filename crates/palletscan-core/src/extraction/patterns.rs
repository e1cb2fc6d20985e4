//! Fixed regex patterns used by the extraction engine.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Container number: owner code (4 letters), serial, optional check digit
    pub static ref SHIPMENT_ID: Regex = Regex::new(
        r"[A-Z]{4}[0-9]{6,7}(?:-[0-9])?"
    ).unwrap();

    // Day/month/year dates, wherever they appear
    pub static ref DATE_DMY: Regex = Regex::new(
        r"[0-9]{1,2}/[0-9]{1,2}/[0-9]{2,4}"
    ).unwrap();

    // Standalone digit runs eligible as pallet codes
    pub static ref CANDIDATE_CODE: Regex = Regex::new(
        r"\b[0-9]{10,14}\b"
    ).unwrap();
}

/// Length of the prefix voted on during pattern inference.
pub const PREFIX_LEN: usize = 4;

/// Length of the suffix voted on during pattern inference.
pub const SUFFIX_LEN: usize = 2;

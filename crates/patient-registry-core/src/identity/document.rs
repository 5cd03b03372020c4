//! Identity document shape matching and checksum.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Reference alphabet indexed by `number % 23`.
///
/// Only indices 0..=22 are ever reached; the trailing `T` is never selected.
pub const CHECK_LETTERS: &str = "TRWAGMYFPDXBNJZSQVHLCKET";

const CHECK_MODULUS: u32 = 23;

static NATIONAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{8}[A-Z]$").expect("valid national document regex"));
static FOREIGN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[XYZ][0-9]{7}[A-Z]$").expect("valid foreign document regex"));

/// Which of the two accepted shapes a document has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// `12345678Z`
    National,
    /// `X1234567L`
    ForeignResident,
}

/// A document that passed shape and checksum validation.
///
/// Holds the canonical form used for the checksum. The raw string the caller
/// supplied stays the persisted key; this value is for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidatedDocument {
    pub kind: DocumentKind,
    /// Effective 8-digit number, with the X/Y/Z prefix mapped to 0/1/2.
    pub number: u32,
    pub check_letter: char,
}

impl ValidatedDocument {
    /// Zero-padded 8-digit number, e.g. `01234567` for `X1234567L`.
    pub fn canonical_digits(&self) -> String {
        format!("{:08}", self.number)
    }

    /// Canonical digits followed by the check letter.
    pub fn canonical(&self) -> String {
        format!("{:08}{}", self.number, self.check_letter)
    }
}

/// Compute the check letter for an 8-digit document number.
pub fn check_letter(number: u32) -> char {
    let index = (number % CHECK_MODULUS) as usize;
    CHECK_LETTERS.as_bytes()[index] as char
}

/// Parse and checksum-validate a raw identity document.
///
/// Matching is case-sensitive: lowercase letters never match either shape.
/// Returns `None` for anything that is not a valid document.
pub fn parse_document(raw: &str) -> Option<ValidatedDocument> {
    let (kind, digits) = if NATIONAL_RE.is_match(raw) {
        (DocumentKind::National, raw[..8].to_string())
    } else if FOREIGN_RE.is_match(raw) {
        let prefix = match raw.as_bytes()[0] {
            b'X' => '0',
            b'Y' => '1',
            b'Z' => '2',
            _ => return None,
        };
        (DocumentKind::ForeignResident, format!("{prefix}{}", &raw[1..8]))
    } else {
        return None;
    };

    let number: u32 = digits.parse().ok()?;
    let letter = raw.as_bytes()[8] as char;

    (letter == check_letter(number)).then_some(ValidatedDocument {
        kind,
        number,
        check_letter: letter,
    })
}

/// Whether `raw` is a valid national or foreign-resident document.
pub fn is_valid_document(raw: &str) -> bool {
    parse_document(raw).is_some()
}

/// Mask all but the last five characters, for log output.
pub fn mask_document(raw: &str) -> String {
    let total = raw.chars().count();
    let visible = total.min(5);
    let mut masked = "*".repeat(total - visible);
    masked.extend(raw.chars().skip(total - visible));
    masked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_national_document() {
        let doc = parse_document("12345678Z").unwrap();
        assert_eq!(doc.kind, DocumentKind::National);
        assert_eq!(doc.number, 12_345_678);
        assert_eq!(doc.check_letter, 'Z');

        assert!(!is_valid_document("12345678A"));
    }

    #[test]
    fn test_foreign_resident_prefixes() {
        let x = parse_document("X1234567L").unwrap();
        assert_eq!(x.kind, DocumentKind::ForeignResident);
        assert_eq!(x.canonical_digits(), "01234567");
        assert_eq!(x.canonical(), "01234567L");

        assert!(is_valid_document("Y1234567X"));
        assert!(is_valid_document("Z1234567R"));

        // Same digits, wrong letter for the mapped prefix
        assert!(!is_valid_document("Y1234567L"));
    }

    #[test]
    fn test_check_letter_boundaries() {
        assert_eq!(check_letter(0), 'T');
        assert_eq!(check_letter(22), 'E');
        assert_eq!(check_letter(23), 'T');
        assert_eq!(check_letter(99_999_999), 'R');
    }

    #[test]
    fn test_malformed_inputs() {
        let inputs = [
            "",
            "1234567Z",
            "123456789Z",
            "12345678",
            "12345678z",
            "x1234567L",
            "A1234567L",
            "X12345678L",
            " 12345678Z",
            "1234S678Z",
            "１2345678Z",
        ];
        for input in inputs {
            assert!(!is_valid_document(input), "{input:?} should be rejected");
        }
    }

    #[test]
    fn test_mask_document() {
        assert_eq!(mask_document("12345678Z"), "****5678Z");
        assert_eq!(mask_document("Z1"), "Z1");
    }
}

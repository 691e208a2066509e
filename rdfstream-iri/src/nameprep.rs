//! Nameprep (RFC 3491) string preparation for internationalized labels.
//!
//! Mapping (table B.1 map-to-nothing, table B.2 case folding), NFKC
//! normalization, then prohibited-output checks (tables C.1.2 through C.9).
//! Unassigned code points are allowed, as for stored strings in queries.
//! The bidi rule of RFC 3454 section 6 is not enforced.

use crate::error::IdnaError;
use unicode_normalization::UnicodeNormalization;

/// Table B.1: characters commonly mapped to nothing
fn maps_to_nothing(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{034F}'
            | '\u{1806}'
            | '\u{180B}'..='\u{180D}'
            | '\u{200B}'..='\u{200D}'
            | '\u{2060}'
            | '\u{FE00}'..='\u{FE0F}'
            | '\u{FEFF}'
    )
}

/// Table B.2 case folding, approximated by full lowercase mapping plus the
/// folds that lowercasing does not cover.
fn case_fold(c: char, out: &mut String) {
    match c {
        'ß' => out.push_str("ss"),
        'ς' => out.push('σ'),
        '\u{0130}' => out.push_str("i\u{0307}"),
        _ => out.extend(c.to_lowercase()),
    }
}

fn is_prohibited(c: char) -> bool {
    let cp = c as u32;
    matches!(cp,
        // C.1.2 non-ASCII space
        0x00A0 | 0x1680 | 0x2000..=0x200B | 0x202F | 0x205F | 0x3000
        // C.2.1 ASCII control
        | 0x0000..=0x001F | 0x007F
        // C.2.2 non-ASCII control
        | 0x0080..=0x009F | 0x06DD | 0x070F | 0x180E | 0x200C | 0x200D
        | 0x2028 | 0x2029 | 0x2060..=0x2063 | 0x206A..=0x206F | 0xFEFF
        | 0xFFF9..=0xFFFC | 0x1D173..=0x1D17A
        // C.3 private use
        | 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD
        // C.4 non-character code points
        | 0xFDD0..=0xFDEF
        // C.6 inappropriate for plain text, C.7 ideographic description
        | 0xFFFD | 0x2FF0..=0x2FFB
        // C.8 change display properties
        | 0x0340 | 0x0341 | 0x200E | 0x200F | 0x202A..=0x202E
        // C.9 tagging characters
        | 0xE0001 | 0xE0020..=0xE007F
    ) || (cp & 0xFFFE) == 0xFFFE
}

/// Prepare a label: map, normalize with NFKC and check prohibited output.
pub fn prepare(input: &str) -> Result<String, IdnaError> {
    let mut mapped = String::with_capacity(input.len());
    for c in input.chars().filter(|c| !maps_to_nothing(*c)) {
        case_fold(c, &mut mapped);
    }
    let normalized: String = mapped.nfkc().collect();
    if let Some(bad) = normalized.chars().find(|c| is_prohibited(*c)) {
        return Err(IdnaError::Prohibited(bad as u32));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_case_folding() {
        assert_eq!(prepare("ExAmPle").unwrap(), "example");
        assert_eq!(prepare("Straße").unwrap(), "strasse");
    }

    #[test]
    fn test_map_to_nothing() {
        assert_eq!(prepare("ab\u{00AD}c").unwrap(), "abc");
    }

    #[test]
    fn test_nfkc() {
        // FULLWIDTH LATIN SMALL LETTER A
        assert_eq!(prepare("\u{FF41}bc").unwrap(), "abc");
    }

    #[test]
    fn test_prohibited() {
        assert_eq!(
            prepare("a\u{0085}b").unwrap_err(),
            IdnaError::Prohibited(0x85)
        );
        assert!(prepare("a\u{E000}").is_err());
    }
}

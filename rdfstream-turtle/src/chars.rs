//! Turtle character class predicates.
//!
//! Based on the Turtle grammar character productions:
//! - PN_CHARS_BASE, PN_CHARS_U, PN_CHARS
//! - Used for prefixed names, local names and blank node labels

/// Check if a character is in PN_CHARS_BASE.
///
/// ```text
/// PN_CHARS_BASE ::= [A-Z] | [a-z] | [#x00C0-#x00D6] | [#x00D8-#x00F6]
///                 | [#x00F8-#x02FF] | [#x0370-#x037D] | [#x037F-#x1FFF]
///                 | [#x200C-#x200D] | [#x2070-#x218F] | [#x2C00-#x2FEF]
///                 | [#x3001-#xD7FF] | [#xF900-#xFDCF] | [#xFDF0-#xFFFD]
///                 | [#x10000-#xEFFFF]
/// ```
pub fn is_pn_chars_base(c: char) -> bool {
    matches!(c,
        'A'..='Z' |
        'a'..='z' |
        '\u{00C0}'..='\u{00D6}' |
        '\u{00D8}'..='\u{00F6}' |
        '\u{00F8}'..='\u{02FF}' |
        '\u{0370}'..='\u{037D}' |
        '\u{037F}'..='\u{1FFF}' |
        '\u{200C}'..='\u{200D}' |
        '\u{2070}'..='\u{218F}' |
        '\u{2C00}'..='\u{2FEF}' |
        '\u{3001}'..='\u{D7FF}' |
        '\u{F900}'..='\u{FDCF}' |
        '\u{FDF0}'..='\u{FFFD}' |
        '\u{10000}'..='\u{EFFFF}'
    )
}

/// PN_CHARS_U ::= PN_CHARS_BASE | '_'
pub fn is_pn_chars_u(c: char) -> bool {
    is_pn_chars_base(c) || c == '_'
}

/// PN_CHARS ::= PN_CHARS_U | '-' | [0-9] | #x00B7 | [#x0300-#x036F] | [#x203F-#x2040]
pub fn is_pn_chars(c: char) -> bool {
    is_pn_chars_u(c)
        || c == '-'
        || c.is_ascii_digit()
        || c == '\u{00B7}'
        || matches!(c, '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

/// First character of a local name (without the `%` / `\` escapes).
pub fn is_pn_local_start(c: char) -> bool {
    is_pn_chars_u(c) || c == ':' || c.is_ascii_digit()
}

/// Characters that may follow `\` in a local name.
pub fn is_pn_local_escape(c: char) -> bool {
    matches!(
        c,
        '_' | '~' | '.' | '-' | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '='
            | '/' | '?' | '#' | '@' | '%'
    )
}

/// Check if a character is Turtle whitespace.
pub fn is_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Whether `local` can be written after `prefix:` without escaping.
///
/// Stricter than the grammar: no escapes, no `%`, no `.` and no `:`.
pub fn is_simple_local_name(local: &str) -> bool {
    let mut chars = local.chars();
    match chars.next() {
        None => true,
        Some(first) => {
            (is_pn_chars_u(first) || first.is_ascii_digit()) && chars.all(is_pn_chars)
        }
    }
}

/// Whether `prefix` is a valid PN_PREFIX (or empty).
pub fn is_prefix_name(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    match chars.next() {
        None => true,
        Some(first) => {
            is_pn_chars_base(first) && !prefix.ends_with('.') && chars.all(|c| is_pn_chars(c) || c == '.')
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_local_name() {
        assert!(is_simple_local_name("name"));
        assert!(is_simple_local_name("123"));
        assert!(is_simple_local_name(""));
        assert!(!is_simple_local_name("a.b"));
        assert!(!is_simple_local_name("a/b"));
        assert!(!is_simple_local_name("-a"));
    }

    #[test]
    fn test_prefix_name() {
        assert!(is_prefix_name("ex"));
        assert!(is_prefix_name("ex.v2"));
        assert!(!is_prefix_name("ex."));
        assert!(!is_prefix_name("1ex"));
    }
}

//! RFC 3987 character class profiles and percent coding.
//!
//! Each [`Profile`] names the set of characters allowed to appear
//! unescaped in one IRI component. Profiles serve two purposes:
//! - validation while parsing (`verify`)
//! - re-encoding while normalizing or rendering (`encode`)
//!
//! The ASCII projections use the `percent-encoding` sets at the bottom of
//! this module, which additionally escape every non-ASCII byte.

use crate::error::{Component, IriError, Result};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::borrow::Cow;

/// Character class profile for one IRI component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
    Scheme,
    /// `iunreserved / pct-encoded / sub-delims / ":"`
    IUserInfo,
    /// `IP-literal / iunreserved / pct-encoded / sub-delims`
    IHost,
    /// `ipchar / "/"`
    IPath,
    /// A single path segment after decoding: `iunreserved / sub-delims / ":" / "@"`
    IPathNoDelimsSegment,
    /// `ipchar / iprivate / "/" / "?"`
    IQuery,
    /// `ipchar / "/" / "?"`
    IFragment,
    /// Anything legal somewhere in an IRI, used when rendering the whole value
    SchemeSpecificPart,
}

/// `unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"`
pub fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

/// `sub-delims = "!" / "$" / "&" / "'" / "(" / ")" / "*" / "+" / "," / ";" / "="`
pub fn is_sub_delim(c: char) -> bool {
    matches!(
        c,
        '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '='
    )
}

/// `gen-delims = ":" / "/" / "?" / "#" / "[" / "]" / "@"`
pub fn is_gen_delim(c: char) -> bool {
    matches!(c, ':' | '/' | '?' | '#' | '[' | ']' | '@')
}

/// Check if a character is in `ucschar`.
///
/// ```text
/// ucschar ::= %xA0-D7FF / %xF900-FDCF / %xFDF0-FFEF
///           / %x10000-1FFFD / %x20000-2FFFD / ... / %xE1000-EFFFD
/// ```
pub fn is_ucschar(c: char) -> bool {
    let cp = c as u32;
    match cp {
        0xA0..=0xD7FF | 0xF900..=0xFDCF | 0xFDF0..=0xFFEF => true,
        0x10000..=0xEFFFD => (cp & 0xFFFF) <= 0xFFFD,
        _ => false,
    }
}

/// `iprivate = %xE000-F8FF / %xF0000-FFFFD / %x100000-10FFFD`
pub fn is_iprivate(c: char) -> bool {
    matches!(c as u32, 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD)
}

/// `iunreserved = unreserved / ucschar`
pub fn is_iunreserved(c: char) -> bool {
    is_unreserved(c) || is_ucschar(c)
}

/// `ipchar` without the `pct-encoded` alternative
pub fn is_ipchar(c: char) -> bool {
    is_iunreserved(c) || is_sub_delim(c) || matches!(c, ':' | '@')
}

/// Bidirectional formatting characters stripped before parsing.
pub fn is_bidi(c: char) -> bool {
    matches!(c, '\u{200E}' | '\u{200F}' | '\u{202A}'..='\u{202E}')
}

/// Remove bidirectional formatting characters.
pub fn strip_bidi(s: &str) -> Cow<'_, str> {
    if s.chars().any(is_bidi) {
        Cow::Owned(s.chars().filter(|c| !is_bidi(*c)).collect())
    } else {
        Cow::Borrowed(s)
    }
}

impl Profile {
    /// Whether `c` may appear unescaped under this profile.
    pub fn allows(self, c: char) -> bool {
        match self {
            Profile::Scheme => c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'),
            Profile::IUserInfo => {
                is_iunreserved(c) || is_sub_delim(c) || matches!(c, ':' | '%')
            }
            Profile::IHost => is_iunreserved(c) || is_sub_delim(c) || c == '%',
            Profile::IPath => is_ipchar(c) || matches!(c, '/' | '%'),
            Profile::IPathNoDelimsSegment => {
                is_iunreserved(c) || is_sub_delim(c) || matches!(c, ':' | '@')
            }
            Profile::IQuery => is_ipchar(c) || is_iprivate(c) || matches!(c, '/' | '?' | '%'),
            Profile::IFragment => is_ipchar(c) || matches!(c, '/' | '?' | '%'),
            Profile::SchemeSpecificPart => {
                is_ipchar(c) || is_iprivate(c) || is_gen_delim(c) || c == '%'
            }
        }
    }

    fn component(self) -> Component {
        match self {
            Profile::Scheme => Component::Scheme,
            Profile::IUserInfo => Component::UserInfo,
            Profile::IHost => Component::Host,
            Profile::IPath | Profile::IPathNoDelimsSegment | Profile::SchemeSpecificPart => {
                Component::Path
            }
            Profile::IQuery => Component::Query,
            Profile::IFragment => Component::Fragment,
        }
    }
}

/// Verify every character of `value` against `profile`.
///
/// `None` always verifies. Bracketed IP literals are accepted for hosts.
pub fn verify(value: Option<&str>, profile: Profile) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if profile == Profile::IHost && value.starts_with('[') {
        return verify_ip_literal(value);
    }
    if profile == Profile::Scheme {
        if let Some(first) = value.chars().next() {
            if !first.is_ascii_alphabetic() {
                return Err(IriError::syntax(Component::Scheme, value, first, 0));
            }
        }
    }
    for (position, c) in value.char_indices() {
        if !profile.allows(c) {
            return Err(IriError::syntax(profile.component(), value, c, position));
        }
    }
    Ok(())
}

/// `IP-literal = "[" ( IPv6address / IPvFuture ) "]"`, checked by character only.
fn verify_ip_literal(value: &str) -> Result<()> {
    let inner_end = value.len().saturating_sub(1);
    if !value.ends_with(']') || inner_end == 0 {
        let c = value.chars().last().unwrap_or('[');
        return Err(IriError::syntax(Component::Host, value, c, inner_end));
    }
    for (i, c) in value[1..inner_end].char_indices() {
        let ok = c.is_ascii_hexdigit()
            || matches!(c, ':' | '.' | 'v' | 'V')
            || is_unreserved(c)
            || is_sub_delim(c);
        if !ok {
            return Err(IriError::syntax(Component::Host, value, c, i + 1));
        }
    }
    Ok(())
}

/// Percent-encode every character of `s` not allowed by `profile`.
///
/// Existing `%XX` escapes are left alone when the profile allows `%`.
pub fn encode(s: &str, profile: Profile) -> Cow<'_, str> {
    if s.chars().all(|c| profile.allows(c)) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    let mut buf = [0u8; 4];
    for c in s.chars() {
        if profile.allows(c) {
            out.push(c);
        } else {
            for b in c.encode_utf8(&mut buf).bytes() {
                push_pct(&mut out, b);
            }
        }
    }
    Cow::Owned(out)
}

fn push_pct(out: &mut String, b: u8) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    out.push('%');
    out.push(HEX[(b >> 4) as usize] as char);
    out.push(HEX[(b & 0x0F) as usize] as char);
}

/// Decode `%XX` escapes.
///
/// Input whose escapes do not decode to UTF-8 is returned unchanged.
pub fn decode(s: &str) -> Cow<'_, str> {
    if !s.contains('%') {
        return Cow::Borrowed(s);
    }
    match percent_decode_str(s).decode_utf8() {
        Ok(decoded) => decoded,
        Err(_) => Cow::Borrowed(s),
    }
}

/// Decode then re-encode `s` against `profile`.
///
/// Escapes that do not decode to UTF-8 leave `s` as it was.
pub fn recode(s: &str, profile: Profile) -> String {
    if !s.contains('%') {
        return encode(s, profile).into_owned();
    }
    match percent_decode_str(s).decode_utf8() {
        Ok(decoded) => encode(&decoded, profile).into_owned(),
        Err(_) => s.to_string(),
    }
}

// ASCII (URI) projections. `%` is never escaped so existing escapes survive.

const URI_BASE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Path: a `?` or `#` would start the next component.
pub const ASCII_PATH: &AsciiSet = &URI_BASE.add(b'?').add(b'#').add(b'[').add(b']');

/// Query
pub const ASCII_QUERY: &AsciiSet = &URI_BASE.add(b'#').add(b'[').add(b']');

/// Fragment
pub const ASCII_FRAGMENT: &AsciiSet = &URI_BASE.add(b'#').add(b'[').add(b']');

/// Userinfo
pub const ASCII_USERINFO: &AsciiSet = &URI_BASE
    .add(b'/')
    .add(b'?')
    .add(b'#')
    .add(b'[')
    .add(b']')
    .add(b'@');

/// Authority taken as a whole (non-HTTP-style authorities)
pub const ASCII_AUTHORITY: &AsciiSet = &URI_BASE.add(b'/').add(b'?').add(b'#');

/// Opaque scheme-specific part
pub const ASCII_OPAQUE: &AsciiSet = &URI_BASE.add(b'#');

/// Percent-encode non-ASCII characters and the members of `set`.
pub fn encode_ascii(s: &str, set: &'static AsciiSet) -> String {
    utf8_percent_encode(s, set).to_string()
}

//! Internationalized domain names (RFC 3490 ToASCII / ToUnicode).
//!
//! Both conversions are total: any label that cannot be converted makes the
//! whole operation return its input unchanged.

use crate::error::IdnaError;
use crate::{nameprep, punycode};

const ACE_PREFIX: &str = "xn--";
const MAX_LABEL_LEN: usize = 63;

/// Convert a host name to its ASCII-compatible encoding.
///
/// Returns `host` unchanged when any label violates the ToASCII rules.
pub fn to_ascii(host: &str) -> String {
    match try_to_ascii(host) {
        Ok(ascii) => ascii,
        Err(err) => {
            tracing::debug!(host, error = %err, "IDNA ToASCII failed, keeping host as-is");
            host.to_string()
        }
    }
}

/// Convert an ASCII-compatible host name back to Unicode.
///
/// The result is only accepted when converting it back with [`to_ascii`]
/// reproduces `host` (ignoring ASCII case); otherwise `host` is returned.
pub fn to_unicode(host: &str) -> String {
    let decoded = match try_to_unicode(host) {
        Ok(decoded) => decoded,
        Err(err) => {
            tracing::debug!(host, error = %err, "IDNA ToUnicode failed, keeping host as-is");
            return host.to_string();
        }
    };
    if to_ascii(&decoded).eq_ignore_ascii_case(host) {
        decoded
    } else {
        tracing::debug!(host, decoded = %decoded, "IDNA round trip mismatch");
        host.to_string()
    }
}

/// Compare two host names by their Unicode form.
pub fn equivalent(a: &str, b: &str) -> bool {
    to_unicode(a) == to_unicode(b)
}

fn labels(host: &str) -> (Vec<&str>, bool) {
    let trailing_dot = host.len() > 1 && host.ends_with('.');
    let body = if trailing_dot {
        &host[..host.len() - 1]
    } else {
        host
    };
    (body.split('.').collect(), trailing_dot)
}

fn try_to_ascii(host: &str) -> Result<String, IdnaError> {
    if host.is_empty() {
        return Ok(String::new());
    }
    let (labels, trailing_dot) = labels(host);
    let mut out = String::with_capacity(host.len());
    for label in labels {
        if !out.is_empty() {
            out.push('.');
        }
        out.push_str(&label_to_ascii(label)?);
    }
    if trailing_dot {
        out.push('.');
    }
    Ok(out)
}

fn label_to_ascii(label: &str) -> Result<String, IdnaError> {
    let prepared = nameprep::prepare(label)?;
    if prepared.is_empty() {
        return Err(IdnaError::InvalidLabel(label.to_string()));
    }
    check_std3(&prepared)?;
    if prepared.starts_with('-') || prepared.ends_with('-') {
        return Err(IdnaError::InvalidLabel(prepared));
    }
    let ascii = if prepared.is_ascii() {
        prepared
    } else {
        if prepared.starts_with(ACE_PREFIX) {
            // already encoded once
            return Err(IdnaError::InvalidLabel(prepared));
        }
        format!("{ACE_PREFIX}{}", punycode::encode(&prepared)?)
    };
    if ascii.len() > MAX_LABEL_LEN {
        return Err(IdnaError::InvalidLabel(ascii));
    }
    Ok(ascii)
}

/// STD3 ASCII rules: ASCII code points must be letters, digits or hyphen.
fn check_std3(label: &str) -> Result<(), IdnaError> {
    let bad = label
        .chars()
        .any(|c| c.is_ascii() && !(c.is_ascii_alphanumeric() || c == '-'));
    if bad {
        Err(IdnaError::InvalidLabel(label.to_string()))
    } else {
        Ok(())
    }
}

fn try_to_unicode(host: &str) -> Result<String, IdnaError> {
    if host.is_empty() {
        return Ok(String::new());
    }
    let (labels, trailing_dot) = labels(host);
    let mut out = String::with_capacity(host.len());
    for (i, label) in labels.into_iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        let label = if label.is_ascii() {
            label.to_string()
        } else {
            nameprep::prepare(label)?
        };
        let is_ace = label.len() >= ACE_PREFIX.len()
            && label[..ACE_PREFIX.len()].eq_ignore_ascii_case(ACE_PREFIX);
        if is_ace {
            out.push_str(&punycode::decode(&label[ACE_PREFIX.len()..])?);
        } else {
            out.push_str(&label);
        }
    }
    if trailing_dot {
        out.push('.');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_ascii() {
        assert_eq!(to_ascii("bücher.example"), "xn--bcher-kva.example");
        assert_eq!(to_ascii("www.Example.COM"), "www.example.com");
        assert_eq!(to_ascii("münchen.de."), "xn--mnchen-3ya.de.");
    }

    #[test]
    fn test_to_ascii_falls_back() {
        // leading hyphen
        assert_eq!(to_ascii("-bad.example"), "-bad.example");
        // underscore violates STD3
        assert_eq!(to_ascii("a_b.example"), "a_b.example");
        // empty label
        assert_eq!(to_ascii("a..b"), "a..b");
        // label too long once encoded
        let long = "ü".repeat(70);
        assert_eq!(to_ascii(&long), long);
    }

    #[test]
    fn test_to_unicode() {
        assert_eq!(to_unicode("xn--bcher-kva.example"), "bücher.example");
        assert_eq!(to_unicode("XN--bcher-kva.example"), "bücher.example");
        assert_eq!(to_unicode("plain.example"), "plain.example");
    }

    #[test]
    fn test_to_unicode_rejects_bad_punycode() {
        assert_eq!(to_unicode("xn--ab!c.example"), "xn--ab!c.example");
    }

    #[test]
    fn test_round_trip() {
        for host in [
            "example.org",
            "xn--bcher-kva.example",
            "xn--mnchen-3ya.de",
            "sub.xn--3B-ww4c5e180e575a65lsy2b.jp",
        ] {
            assert_eq!(to_ascii(&to_unicode(host)), to_ascii(host), "{host}");
        }
    }

    #[test]
    fn test_equivalent() {
        assert!(equivalent("xn--bcher-kva.example", "bücher.example"));
        assert!(!equivalent("a.example", "b.example"));
    }
}

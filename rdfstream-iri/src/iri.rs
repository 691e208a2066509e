//! The [`Iri`] value type.
//!
//! An IRI is either hierarchical (`scheme:[//authority]path[?query][#fragment]`)
//! or opaque (`scheme:scheme-specific-part[#fragment]`, created through
//! [`Iri::opaque`]). Components are kept exactly as given; normalization and
//! the ASCII projections produce new values or cached strings and never
//! mutate the stored components.

use crate::chars::{self, Profile};
use crate::error::{IriError, Result};
use crate::idna;
use crate::scheme::SchemeRegistry;
use once_cell::sync::OnceCell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// An RFC 3987 internationalized resource identifier.
#[derive(Clone)]
pub struct Iri {
    scheme: Option<String>,
    /// Hierarchical: `//authority` + path + `?query`. Opaque: as given.
    scheme_specific_part: String,
    authority: Option<String>,
    user_info: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    /// `None` only for opaque IRIs
    path: Option<String>,
    query: Option<String>,
    fragment: Option<String>,
    rendered: OnceCell<String>,
    ascii: OnceCell<AsciiParts>,
}

#[derive(Clone, Debug)]
struct AsciiParts {
    user_info: Option<String>,
    host: Option<String>,
    authority: Option<String>,
    path: Option<String>,
    query: Option<String>,
    fragment: Option<String>,
    string: String,
}

/// Generic-syntax split of an IRI reference, before validation.
struct RawParts<'a> {
    scheme: Option<&'a str>,
    authority: Option<&'a str>,
    path: &'a str,
    query: Option<&'a str>,
    fragment: Option<&'a str>,
}

fn split_reference(s: &str) -> RawParts<'_> {
    let mut rest = s;
    let mut scheme = None;
    if let Some(pos) = rest.find([':', '/', '?', '#']) {
        if pos > 0 && rest.as_bytes()[pos] == b':' {
            scheme = Some(&rest[..pos]);
            rest = &rest[pos + 1..];
        }
    }

    let mut authority = None;
    if let Some(after) = rest.strip_prefix("//") {
        let end = after.find(['/', '?', '#']).unwrap_or(after.len());
        authority = Some(&after[..end]);
        rest = &after[end..];
    }

    let (before_fragment, fragment) = match rest.find('#') {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
        None => (rest, None),
    };
    let (path, query) = match before_fragment.find('?') {
        Some(pos) => (&before_fragment[..pos], Some(&before_fragment[pos + 1..])),
        None => (before_fragment, None),
    };

    RawParts {
        scheme,
        authority,
        path,
        query,
        fragment,
    }
}

/// Split an authority into `(userinfo, host, port)`.
///
/// The userinfo ends at the last `@`; a host starting with `[` runs to the
/// last `]`, any other host to the first `:`.
pub(crate) fn split_authority(authority: &str) -> Result<(Option<&str>, &str, Option<u16>)> {
    let (user_info, host_port) = match authority.rfind('@') {
        Some(pos) => (Some(&authority[..pos]), &authority[pos + 1..]),
        None => (None, authority),
    };
    let (host, port_part) = if host_port.starts_with('[') {
        match host_port.rfind(']') {
            Some(pos) => host_port.split_at(pos + 1),
            None => (host_port, ""),
        }
    } else {
        match host_port.find(':') {
            Some(pos) => host_port.split_at(pos),
            None => (host_port, ""),
        }
    };

    let port = match port_part.strip_prefix(':') {
        None if port_part.is_empty() => None,
        None => return Err(IriError::InvalidAuthority(authority.to_string())),
        Some("") => None,
        Some(digits) => {
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(IriError::InvalidPort(digits.to_string()));
            }
            Some(
                digits
                    .parse::<u16>()
                    .map_err(|_| IriError::InvalidPort(digits.to_string()))?,
            )
        }
    };
    Ok((user_info, host, port))
}

fn build_authority(user_info: Option<&str>, host: Option<&str>, port: Option<u16>) -> String {
    let mut buf = String::new();
    if let Some(ui) = user_info.filter(|s| !s.is_empty()) {
        buf.push_str(ui);
        buf.push('@');
    }
    if let Some(h) = host {
        buf.push_str(h);
    }
    if let Some(p) = port {
        buf.push(':');
        buf.push_str(&p.to_string());
    }
    buf
}

fn build_scheme_specific_part(
    authority: Option<&str>,
    path: Option<&str>,
    query: Option<&str>,
) -> String {
    let mut buf = String::new();
    if let Some(a) = authority {
        buf.push_str("//");
        buf.push_str(a);
    }
    if let Some(p) = path {
        buf.push_str(p);
    }
    if let Some(q) = query {
        buf.push('?');
        buf.push_str(q);
    }
    buf
}

/// Remove `.` and `..` segments and re-encode every remaining segment.
///
/// A `..` removes itself and the nearest preceding segment still present.
/// A trailing `/`, `/.` or `/..` leaves a trailing slash. An empty path
/// normalizes to `/`. Paths that do not start with `/` stay relative.
pub fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    let absolute = path.starts_with('/');
    let body = if absolute { &path[1..] } else { path };
    let mut segments: Vec<Option<&str>> = body.split('/').map(Some).collect();
    while segments.len() > 1 && segments.last() == Some(&Some("")) {
        segments.pop();
    }

    for n in 0..segments.len() {
        match segments[n] {
            Some(".") => segments[n] = None,
            Some("..") => {
                segments[n] = None;
                if let Some(prev) = segments[..n].iter().rposition(Option::is_some) {
                    segments[prev] = None;
                }
            }
            _ => {}
        }
    }

    let mut buf = String::with_capacity(path.len());
    if absolute {
        buf.push('/');
    }
    for (i, segment) in segments.into_iter().flatten().enumerate() {
        if i > 0 {
            buf.push('/');
        }
        buf.push_str(&chars::recode(segment, Profile::IPathNoDelimsSegment));
    }
    let trailing = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    if trailing && !buf.ends_with('/') {
        buf.push('/');
    }
    buf
}

/// Merge a relative path onto a base path: keep the base up to and
/// including its last `/`, append the reference, then normalize.
fn merge_paths(base: Option<&str>, reference: &str) -> String {
    let mut buf = String::new();
    if let Some(base) = base {
        if let Some(n) = base.rfind('/') {
            buf.push_str(&base[..=n]);
        }
    }
    buf.push_str(reference);
    if !buf.starts_with('/') {
        buf.insert(0, '/');
    }
    normalize_path(&buf)
}

impl Iri {
    /// Parse an IRI reference.
    ///
    /// Bidirectional formatting characters are removed first. Every
    /// component is checked against its character profile.
    pub fn parse(input: &str) -> Result<Iri> {
        let input = chars::strip_bidi(input);
        let raw = split_reference(&input);

        let (user_info, host, port) = match raw.authority {
            Some(a) => {
                let (ui, h, p) = split_authority(a)?;
                (ui, Some(h), p)
            }
            None => (None, None, None),
        };

        chars::verify(raw.scheme, Profile::Scheme)?;
        chars::verify(user_info, Profile::IUserInfo)?;
        chars::verify(host, Profile::IHost)?;
        chars::verify(Some(raw.path), Profile::IPath)?;
        chars::verify(raw.query, Profile::IQuery)?;
        chars::verify(raw.fragment, Profile::IFragment)?;

        Ok(Iri::from_components(
            raw.scheme,
            raw.authority,
            user_info,
            host,
            port,
            Some(raw.path),
            raw.query,
            raw.fragment,
        ))
    }

    /// Create an opaque IRI such as `urn:isbn:0451450523` or `mailto:a@b`.
    pub fn opaque(scheme: &str, scheme_specific_part: &str, fragment: Option<&str>) -> Result<Iri> {
        if scheme.is_empty() {
            return Err(IriError::MissingScheme(scheme_specific_part.to_string()));
        }
        chars::verify(Some(scheme), Profile::Scheme)?;
        chars::verify(fragment, Profile::IFragment)?;
        Ok(Iri {
            scheme: Some(scheme.to_ascii_lowercase()),
            scheme_specific_part: scheme_specific_part.to_string(),
            authority: None,
            user_info: None,
            host: None,
            port: None,
            path: None,
            query: None,
            fragment: fragment.map(str::to_string),
            rendered: OnceCell::new(),
            ascii: OnceCell::new(),
        })
    }

    /// Start a [`crate::IriBuilder`].
    pub fn builder() -> crate::IriBuilder {
        crate::IriBuilder::default()
    }

    /// Assemble a hierarchical IRI from components without validating them.
    ///
    /// When `authority` is `None` it is synthesized from userinfo, host
    /// and port.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_components(
        scheme: Option<&str>,
        authority: Option<&str>,
        user_info: Option<&str>,
        host: Option<&str>,
        port: Option<u16>,
        path: Option<&str>,
        query: Option<&str>,
        fragment: Option<&str>,
    ) -> Iri {
        let authority = match authority {
            Some(a) => Some(a.to_string()),
            None if user_info.is_some() || host.is_some() || port.is_some() => {
                let built = build_authority(user_info, host, port);
                (!built.is_empty()).then_some(built)
            }
            None => None,
        };
        let path = path.unwrap_or("");
        let scheme_specific_part = build_scheme_specific_part(authority.as_deref(), Some(path), query);
        Iri {
            scheme: scheme.map(str::to_ascii_lowercase),
            scheme_specific_part,
            authority,
            user_info: user_info.map(str::to_string),
            host: host.map(str::to_string),
            port,
            path: Some(path.to_string()),
            query: query.map(str::to_string),
            fragment: fragment.map(str::to_string),
            rendered: OnceCell::new(),
            ascii: OnceCell::new(),
        }
    }

    /// Lower-cased scheme, if any
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Authority, `None` when absent or empty
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref().filter(|s| !s.is_empty())
    }

    /// Authority exactly as parsed, including an empty one (`file:///x`)
    pub(crate) fn raw_authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    pub fn user_info(&self) -> Option<&str> {
        self.user_info.as_deref()
    }

    /// Host, `None` when absent or empty
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref().filter(|s| !s.is_empty())
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Path; always `Some` for hierarchical IRIs, possibly empty
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Everything between `scheme:` and `#fragment`
    pub fn scheme_specific_part(&self) -> &str {
        &self.scheme_specific_part
    }

    pub fn is_absolute(&self) -> bool {
        self.scheme.is_some()
    }

    pub fn is_opaque(&self) -> bool {
        self.path.is_none()
    }

    pub fn is_path_absolute(&self) -> bool {
        self.path.as_deref().is_some_and(|p| p.starts_with('/'))
    }

    /// No scheme, authority or query, and an empty or `.` path.
    pub fn is_same_document_reference(&self) -> bool {
        self.scheme.is_none()
            && self.authority.is_none()
            && matches!(self.path.as_deref(), None | Some("") | Some("."))
            && self.query.is_none()
    }

    /// References that resolve to the base itself: ``, `#`, `.`, `./`
    fn is_trivial_reference(&self) -> bool {
        self.scheme.is_none()
            && self.authority.is_none()
            && self.query.is_none()
            && matches!(self.path.as_deref(), Some("") | Some(".") | Some("./"))
            && match self.fragment.as_deref() {
                None => true,
                Some("") => self.path.as_deref() == Some(""),
                Some(_) => false,
            }
    }

    /// Resolve `reference` against this IRI (RFC 3986 section 5.2).
    pub fn resolve(&self, reference: &Iri) -> Iri {
        let base = self;
        let r = reference;
        if r.is_trivial_reference() {
            return base.clone();
        }
        if r.is_opaque() || base.is_opaque() {
            return r.clone();
        }
        if r.is_same_document_reference() {
            if r.fragment == base.fragment {
                return base.clone();
            }
            return Iri::from_components(
                base.scheme(),
                base.raw_authority(),
                base.user_info(),
                base.host.as_deref(),
                base.port,
                Some(&normalize_path(base.path().unwrap_or(""))),
                base.query(),
                r.fragment(),
            );
        }
        if r.is_absolute() {
            return r.clone();
        }

        let r_path = r.path().unwrap_or("");
        if r.authority.is_some() {
            let path = if r_path.is_empty() {
                String::new()
            } else {
                normalize_path(r_path)
            };
            return Iri::from_components(
                base.scheme(),
                r.raw_authority(),
                r.user_info(),
                r.host.as_deref(),
                r.port,
                Some(&path),
                r.query(),
                r.fragment(),
            );
        }

        let (path, query) = if r_path.is_empty() {
            (
                base.path().unwrap_or("").to_string(),
                r.query().or(base.query()),
            )
        } else if r.is_path_absolute() {
            (normalize_path(r_path), r.query())
        } else {
            (merge_paths(base.path(), r_path), r.query())
        };
        Iri::from_components(
            base.scheme(),
            base.raw_authority(),
            base.user_info(),
            base.host.as_deref(),
            base.port,
            Some(&path),
            query,
            r.fragment(),
        )
    }

    /// Parse `reference` and resolve it against this IRI.
    pub fn resolve_str(&self, reference: &str) -> Result<Iri> {
        Ok(self.resolve(&Iri::parse(reference)?))
    }

    /// Express `target` relative to this IRI.
    ///
    /// Only succeeds when both share scheme and authority and the target
    /// path lies below this IRI's directory; otherwise `target` is returned.
    pub fn relativize(&self, target: &Iri) -> Iri {
        if self.is_opaque() || target.is_opaque() {
            return target.clone();
        }
        if self.scheme != target.scheme || !authority_eq(self, target) {
            return target.clone();
        }
        let mut base_path = normalize_path(self.path().unwrap_or(""));
        let target_path = normalize_path(target.path().unwrap_or(""));
        if base_path != target_path {
            if !base_path.ends_with('/') {
                base_path.push('/');
            }
            if !target_path.starts_with(&base_path) {
                return target.clone();
            }
        }
        let rest = &target_path[base_path.len().min(target_path.len())..];
        let path = if rest.is_empty() {
            String::new()
        } else {
            normalize_path(rest)
        };
        Iri::from_components(
            None,
            None,
            None,
            None,
            None,
            Some(&path),
            target.query(),
            target.fragment(),
        )
    }

    /// Normalize according to the scheme's registered policy.
    pub fn normalize(&self, registry: &SchemeRegistry) -> Iri {
        registry.lookup(self.scheme()).normalize(self)
    }

    /// Copy with a `/` appended to the path unless it already ends in one.
    pub fn with_trailing_slash(&self) -> Iri {
        match self.path() {
            Some(p) if !p.ends_with('/') => self.with_path(&format!("{p}/")),
            _ => self.clone(),
        }
    }

    /// Copy without the fragment.
    pub fn without_fragment(&self) -> Iri {
        if self.fragment.is_none() {
            return self.clone();
        }
        let mut iri = self.clone();
        iri.fragment = None;
        iri.rendered = OnceCell::new();
        iri.ascii = OnceCell::new();
        iri
    }

    fn with_path(&self, path: &str) -> Iri {
        Iri::from_components(
            self.scheme(),
            self.raw_authority(),
            self.user_info(),
            self.host.as_deref(),
            self.port,
            Some(path),
            self.query(),
            self.fragment(),
        )
    }

    /// The IRI-legal textual form (same as `Display`).
    pub fn as_str(&self) -> &str {
        self.rendered.get_or_init(|| {
            let mut buf = String::with_capacity(self.scheme_specific_part.len() + 16);
            if let Some(s) = &self.scheme {
                buf.push_str(s);
                buf.push(':');
            }
            buf.push_str(&self.scheme_specific_part);
            if let Some(f) = &self.fragment {
                buf.push('#');
                buf.push_str(f);
            }
            chars::encode(&buf, Profile::SchemeSpecificPart).into_owned()
        })
    }

    fn ascii(&self) -> &AsciiParts {
        self.ascii.get_or_init(|| {
            let user_info = self
                .user_info
                .as_deref()
                .map(|s| chars::encode_ascii(s, chars::ASCII_USERINFO));
            let host = self.host.as_deref().map(|h| {
                if h.starts_with('[') {
                    h.to_string()
                } else {
                    idna::to_ascii(h)
                }
            });
            let authority = self.authority.as_deref().map(|a| {
                if self.host.is_some() {
                    build_authority(user_info.as_deref(), host.as_deref(), self.port)
                } else {
                    chars::encode_ascii(a, chars::ASCII_AUTHORITY)
                }
            });
            let path = self
                .path
                .as_deref()
                .map(|p| chars::encode_ascii(p, chars::ASCII_PATH));
            let query = self
                .query
                .as_deref()
                .map(|q| chars::encode_ascii(q, chars::ASCII_QUERY));
            let fragment = self
                .fragment
                .as_deref()
                .map(|f| chars::encode_ascii(f, chars::ASCII_FRAGMENT));

            let mut string = String::new();
            if let Some(s) = &self.scheme {
                string.push_str(s);
                string.push(':');
            }
            if self.is_opaque() {
                string.push_str(&chars::encode_ascii(
                    &self.scheme_specific_part,
                    chars::ASCII_OPAQUE,
                ));
            } else {
                string.push_str(&build_scheme_specific_part(
                    authority.as_deref(),
                    path.as_deref(),
                    query.as_deref(),
                ));
            }
            if let Some(f) = &fragment {
                string.push('#');
                string.push_str(f);
            }
            AsciiParts {
                user_info,
                host,
                authority,
                path,
                query,
                fragment,
                string,
            }
        })
    }

    /// Host in ASCII-compatible encoding; bracketed IP literals as-is
    pub fn ascii_host(&self) -> Option<&str> {
        self.ascii().host.as_deref().filter(|s| !s.is_empty())
    }

    pub fn ascii_user_info(&self) -> Option<&str> {
        self.ascii().user_info.as_deref()
    }

    pub fn ascii_authority(&self) -> Option<&str> {
        self.ascii().authority.as_deref().filter(|s| !s.is_empty())
    }

    pub fn ascii_path(&self) -> Option<&str> {
        self.ascii().path.as_deref()
    }

    pub fn ascii_query(&self) -> Option<&str> {
        self.ascii().query.as_deref()
    }

    pub fn ascii_fragment(&self) -> Option<&str> {
        self.ascii().fragment.as_deref()
    }

    /// Fully percent- and punycode-encoded, URI-legal form
    pub fn to_ascii_string(&self) -> &str {
        &self.ascii().string
    }
}

fn authority_eq(a: &Iri, b: &Iri) -> bool {
    match (a.host(), b.host()) {
        (Some(ha), Some(hb)) => {
            ha.eq_ignore_ascii_case(hb) && a.user_info == b.user_info && a.port == b.port
        }
        _ => a.authority() == b.authority(),
    }
}

fn cmp_ignore_ascii_case(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a
            .chars()
            .map(|c| c.to_ascii_lowercase())
            .cmp(b.chars().map(|c| c.to_ascii_lowercase())),
        (a, b) => a.cmp(&b),
    }
}

impl Ord for Iri {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_ignore_ascii_case(self.scheme(), other.scheme())
            .then_with(|| match (self.is_opaque(), other.is_opaque()) {
                (true, true) => self
                    .scheme_specific_part
                    .cmp(&other.scheme_specific_part)
                    .then_with(|| self.fragment.cmp(&other.fragment)),
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let authority = if self.host.is_some() && other.host.is_some() {
                        self.user_info
                            .cmp(&other.user_info)
                            .then_with(|| {
                                cmp_ignore_ascii_case(self.host.as_deref(), other.host.as_deref())
                            })
                            .then_with(|| self.port.cmp(&other.port))
                    } else {
                        self.authority.cmp(&other.authority)
                    };
                    authority
                        .then_with(|| self.path.cmp(&other.path))
                        .then_with(|| self.query.cmp(&other.query))
                        .then_with(|| self.fragment.cmp(&other.fragment))
                }
            })
            // keep Ord consistent with the exact-component Eq
            .then_with(|| self.host.cmp(&other.host))
            .then_with(|| self.authority.cmp(&other.authority))
    }
}

impl PartialOrd for Iri {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Iri {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.scheme_specific_part == other.scheme_specific_part
            && self.authority == other.authority
            && self.user_info == other.user_info
            && self.host == other.host
            && self.port == other.port
            && self.path == other.path
            && self.query == other.query
            && self.fragment == other.fragment
    }
}

impl Eq for Iri {}

impl Hash for Iri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.scheme.hash(state);
        self.scheme_specific_part.hash(state);
        self.fragment.hash(state);
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iri").field(&self.as_str()).finish()
    }
}

impl FromStr for Iri {
    type Err = IriError;

    fn from_str(s: &str) -> Result<Self> {
        Iri::parse(s)
    }
}

impl TryFrom<&str> for Iri {
    type Error = IriError;

    fn try_from(s: &str) -> Result<Self> {
        Iri::parse(s)
    }
}

impl TryFrom<String> for Iri {
    type Error = IriError;

    fn try_from(s: String) -> Result<Self> {
        Iri::parse(&s)
    }
}

impl serde::Serialize for Iri {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Iri {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Iri::parse(&s).map_err(serde::de::Error::custom)
    }
}

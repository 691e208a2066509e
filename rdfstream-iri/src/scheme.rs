//! Per-scheme normalization policies and the registry that maps scheme
//! names to them.
//!
//! The registry is an ordinary value. Build it once at startup, register
//! any extra schemes, then share it (typically behind an `Arc`) with every
//! reader that normalizes IRIs.
//!
//! ```
//! use rdfstream_iri::{Iri, Scheme, SchemeKind, SchemeRegistry};
//!
//! let mut registry = SchemeRegistry::default();
//! registry.register(Scheme::new("gopher", Some(70), SchemeKind::Default));
//!
//! let iri = Iri::parse("HTTP://Example.COM:80/a/./b").unwrap();
//! assert_eq!(iri.normalize(&registry).to_string(), "http://example.com/a/b");
//! ```

use crate::chars::{self, Profile};
use crate::iri::{normalize_path, Iri};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Normalization policy of a scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeKind {
    Http,
    Https,
    Ftp,
    /// Generic syntax normalization only
    Default,
}

/// A registered scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheme {
    name: String,
    default_port: Option<u16>,
    kind: SchemeKind,
}

impl Scheme {
    /// Create a scheme. The name is stored lower-cased.
    pub fn new(name: impl Into<String>, default_port: Option<u16>, kind: SchemeKind) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            default_port,
            kind,
        }
    }

    /// `http`, port 80
    pub fn http() -> Self {
        Self::new("http", Some(80), SchemeKind::Http)
    }

    /// `https`, port 443
    pub fn https() -> Self {
        Self::new("https", Some(443), SchemeKind::Https)
    }

    /// `ftp`, port 21
    pub fn ftp() -> Self {
        Self::new("ftp", Some(21), SchemeKind::Ftp)
    }

    /// Lower-cased scheme name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Port implied when an IRI of this scheme omits one
    pub fn default_port(&self) -> Option<u16> {
        self.default_port
    }

    pub fn kind(&self) -> SchemeKind {
        self.kind
    }

    /// Normalize an IRI according to this scheme's policy.
    ///
    /// Opaque IRIs are returned unchanged.
    pub fn normalize(&self, iri: &Iri) -> Iri {
        if iri.is_opaque() {
            return iri.clone();
        }
        match self.kind {
            SchemeKind::Http | SchemeKind::Https | SchemeKind::Ftp => self.normalize_server(iri),
            SchemeKind::Default => generic_normalize(iri),
        }
    }

    /// Server-based normalization: lower-case host, drop the default port,
    /// an empty path becomes `/`, then the generic steps.
    fn normalize_server(&self, iri: &Iri) -> Iri {
        let host = iri.host().map(str::to_lowercase);
        let port = iri.port().filter(|p| Some(*p) != self.default_port);
        Iri::from_components(
            iri.scheme(),
            None,
            iri.user_info(),
            host.as_deref(),
            port,
            Some(&normalize_path(iri.path().unwrap_or(""))),
            iri.query().map(|q| chars::recode(q, Profile::IQuery)).as_deref(),
            iri.fragment()
                .map(|f| chars::recode(f, Profile::IFragment))
                .as_deref(),
        )
    }
}

/// Path dot-segment removal plus query and fragment re-encoding.
pub(crate) fn generic_normalize(iri: &Iri) -> Iri {
    if iri.is_opaque() {
        return iri.clone();
    }
    Iri::from_components(
        iri.scheme(),
        iri.raw_authority(),
        iri.user_info(),
        iri.host(),
        iri.port(),
        Some(&normalize_path(iri.path().unwrap_or(""))),
        iri.query().map(|q| chars::recode(q, Profile::IQuery)).as_deref(),
        iri.fragment()
            .map(|f| chars::recode(f, Profile::IFragment))
            .as_deref(),
    )
}

/// Scheme name to policy table.
///
/// Unregistered names resolve to a shared `Default` scheme.
#[derive(Debug, Clone)]
pub struct SchemeRegistry {
    schemes: FxHashMap<String, Scheme>,
    fallback: Scheme,
}

impl SchemeRegistry {
    /// An empty registry: every scheme gets generic normalization.
    pub fn empty() -> Self {
        Self {
            schemes: FxHashMap::default(),
            fallback: Scheme::new("", None, SchemeKind::Default),
        }
    }

    /// Register a scheme, replacing any previous entry of the same name.
    pub fn register(&mut self, scheme: Scheme) -> &mut Self {
        tracing::debug!(scheme = scheme.name(), kind = ?scheme.kind(), "registering scheme");
        self.schemes.insert(scheme.name.clone(), scheme);
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.register(scheme);
        self
    }

    /// Look up a scheme by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&Scheme> {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.schemes.get(&name.to_ascii_lowercase())
        } else {
            self.schemes.get(name)
        }
    }

    /// Like [`get`](Self::get) but falls back to the default scheme.
    pub fn lookup(&self, name: Option<&str>) -> &Scheme {
        name.and_then(|n| self.get(n)).unwrap_or(&self.fallback)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

impl Default for SchemeRegistry {
    /// `http`, `https` and `ftp`
    fn default() -> Self {
        Self::empty()
            .with_scheme(Scheme::http())
            .with_scheme(Scheme::https())
            .with_scheme(Scheme::ftp())
    }
}

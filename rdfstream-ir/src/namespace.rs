//! Prefix table shared by readers (directive state) and writers (compaction)

use indexmap::IndexMap;
use rdfstream_vocab::namespaces;
use serde::{Deserialize, Serialize};

/// Ordered prefix → namespace table.
///
/// Insertion order is the order writers declare prefixes in. Serializes as a
/// plain JSON object, so a table can be loaded from configuration:
///
/// ```
/// use rdfstream_ir::NamespaceContext;
///
/// let ctx: NamespaceContext =
///     serde_json::from_str(r#"{"ex": "http://example.org/"}"#).unwrap();
/// assert_eq!(ctx.compact("http://example.org/thing"), Some(("ex", "thing")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceContext {
    prefixes: IndexMap<String, String>,
}

impl NamespaceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// `rdf`, `rdfs`, `xsd`, `owl`, `dc`, `dcterms` and `foaf`
    pub fn common() -> Self {
        let mut ctx = Self::new();
        for (prefix, ns) in namespaces::WELL_KNOWN {
            ctx.insert(*prefix, *ns);
        }
        ctx
    }

    /// Bind a prefix, returning the namespace it replaced.
    pub fn insert(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Option<String> {
        self.prefixes.insert(prefix.into(), namespace.into())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_prefix(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.insert(prefix, namespace);
        self
    }

    pub fn remove(&mut self, prefix: &str) -> Option<String> {
        self.prefixes.shift_remove(prefix)
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// First prefix bound to exactly `namespace`
    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(_, ns)| ns.as_str() == namespace)
            .map(|(p, _)| p.as_str())
    }

    /// Expand `prefix:local`; `None` when the prefix is unbound.
    pub fn expand(&self, prefix: &str, local: &str) -> Option<String> {
        self.namespace(prefix).map(|ns| format!("{ns}{local}"))
    }

    /// Split `iri` into `(prefix, local)` using the longest matching namespace.
    ///
    /// The local part may be empty. No check is made that it is a legal
    /// local name in any particular syntax.
    pub fn compact<'a>(&'a self, iri: &'a str) -> Option<(&'a str, &'a str)> {
        self.prefixes
            .iter()
            .filter(|(_, ns)| !ns.is_empty() && iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len())
            .map(|(prefix, ns)| (prefix.as_str(), &iri[ns.len()..]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

impl<P: Into<String>, N: Into<String>> FromIterator<(P, N)> for NamespaceContext {
    fn from_iter<T: IntoIterator<Item = (P, N)>>(iter: T) -> Self {
        let mut ctx = Self::new();
        for (p, n) in iter {
            ctx.insert(p, n);
        }
        ctx
    }
}

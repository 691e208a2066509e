//! RDF term types: IRI, blank node and literal
//!
//! - [`Subject`]: the identifier positions (IRI or blank node)
//! - [`Term`]: the object position (IRI, blank node or literal)

use rdfstream_iri::Iri;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Blank node identifier
///
/// Identity is only meaningful within one parse; the label carries no
/// `_:` prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlankNode(Arc<str>);

impl BlankNode {
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    /// Label without the `_:` prefix
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

/// A literal: lexical form plus optional language tag or datatype.
///
/// Language and datatype are mutually exclusive in well-formed RDF but
/// nothing here enforces it; writers check [`Literal::is_well_formed`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    lexical: String,
    language: Option<String>,
    datatype: Option<Iri>,
}

impl Literal {
    /// Untyped literal without language
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            language: None,
            datatype: None,
        }
    }

    /// Language-tagged literal
    pub fn lang(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            language: Some(language.into()),
            datatype: None,
        }
    }

    /// Typed literal
    pub fn typed(lexical: impl Into<String>, datatype: Iri) -> Self {
        Self {
            lexical: lexical.into(),
            language: None,
            datatype: Some(datatype),
        }
    }

    /// Literal with any combination of language and datatype
    pub fn new(lexical: impl Into<String>, language: Option<String>, datatype: Option<Iri>) -> Self {
        Self {
            lexical: lexical.into(),
            language,
            datatype,
        }
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn datatype(&self) -> Option<&Iri> {
        self.datatype.as_ref()
    }

    /// Whether the datatype IRI renders as `iri`
    pub fn has_datatype(&self, iri: &str) -> bool {
        self.datatype.as_ref().is_some_and(|d| d.as_str() == iri)
    }

    pub fn is_well_formed(&self) -> bool {
        !(self.language.is_some() && self.datatype.is_some())
    }
}

/// Escape a lexical form for a double-quoted N-Triples/Turtle string.
pub fn escape_string(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = String::with_capacity(self.lexical.len() + 2);
        buf.push('"');
        escape_string(&self.lexical, &mut buf);
        buf.push('"');
        f.write_str(&buf)?;
        if let Some(lang) = &self.language {
            write!(f, "@{lang}")?;
        }
        if let Some(dt) = &self.datatype {
            write!(f, "^^<{dt}>")?;
        }
        Ok(())
    }
}

/// Subject position: IRI or blank node
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subject {
    Iri(Iri),
    Blank(BlankNode),
}

impl Subject {
    pub fn is_blank(&self) -> bool {
        matches!(self, Subject::Blank(_))
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Subject::Iri(iri) => Some(iri),
            Subject::Blank(_) => None,
        }
    }

    pub fn as_blank(&self) -> Option<&BlankNode> {
        match self {
            Subject::Blank(b) => Some(b),
            Subject::Iri(_) => None,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Iri(iri) => write!(f, "<{iri}>"),
            Subject::Blank(b) => b.fmt(f),
        }
    }
}

/// Object position: IRI, blank node or literal
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Iri(Iri),
    Blank(BlankNode),
    Literal(Literal),
}

impl Term {
    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }

    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_blank(&self) -> Option<&BlankNode> {
        match self {
            Term::Blank(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// The subject form of an IRI or blank node term
    pub fn to_subject(&self) -> Option<Subject> {
        match self {
            Term::Iri(iri) => Some(Subject::Iri(iri.clone())),
            Term::Blank(b) => Some(Subject::Blank(b.clone())),
            Term::Literal(_) => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Blank(b) => b.fmt(f),
            Term::Literal(l) => l.fmt(f),
        }
    }
}

impl From<Subject> for Term {
    fn from(subject: Subject) -> Self {
        match subject {
            Subject::Iri(iri) => Term::Iri(iri),
            Subject::Blank(b) => Term::Blank(b),
        }
    }
}

impl From<Iri> for Subject {
    fn from(iri: Iri) -> Self {
        Subject::Iri(iri)
    }
}

impl From<BlankNode> for Subject {
    fn from(b: BlankNode) -> Self {
        Subject::Blank(b)
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<BlankNode> for Term {
    fn from(b: BlankNode) -> Self {
        Term::Blank(b)
    }
}

impl From<Literal> for Term {
    fn from(l: Literal) -> Self {
        Term::Literal(l)
    }
}

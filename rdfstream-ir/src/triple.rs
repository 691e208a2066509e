//! The RDF triple

use crate::term::{Subject, Term};
use rdfstream_iri::Iri;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A subject-predicate-object statement
///
/// The predicate is always an IRI; blank-node predicates cannot be expressed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Subject,
    pub predicate: Iri,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<Subject>, predicate: Iri, object: impl Into<Term>) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }

    /// Whether subject or object is a blank node
    pub fn has_blank(&self) -> bool {
        self.subject.is_blank() || self.object.is_blank()
    }
}

/// N-Triples rendering, without the trailing newline
impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}

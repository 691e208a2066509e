//! TripleSink trait: the callback readers push triples into
//!
//! Readers never build a graph. They call the sink as statements complete:
//! - `new_identifier()` when a new top-level IRI subject begins
//! - `triple()` for every triple, in emission order
//! - `start_prefix_mapping()` / `end_prefix_mapping()` for namespace events
//!
//! Writers implement the same trait, so a reader can feed a writer directly.

use crate::graph::Graph;
use crate::triple::Triple;
use rdfstream_iri::Iri;

/// Event-driven consumer of parsed triples
///
/// Only [`triple`](TripleSink::triple) is required; the other events default
/// to no-ops.
///
/// # Example
///
/// ```
/// use rdfstream_ir::{Literal, TripleCollector, TripleSink, Triple};
/// use rdfstream_iri::Iri;
///
/// let mut sink = TripleCollector::new();
/// let alice = Iri::parse("http://example.org/alice").unwrap();
/// sink.new_identifier(&alice);
/// sink.triple(Triple::new(
///     alice,
///     Iri::parse("http://xmlns.com/foaf/0.1/name").unwrap(),
///     Literal::plain("Alice"),
/// ));
///
/// assert_eq!(sink.identifiers().count(), 1);
/// assert_eq!(sink.into_graph().len(), 1);
/// ```
pub trait TripleSink {
    /// A new top-level subject begins
    fn new_identifier(&mut self, identifier: &Iri) {
        let _ = identifier;
    }

    /// A completed triple
    fn triple(&mut self, triple: Triple);

    /// A prefix comes into scope
    ///
    /// In Turtle: `@prefix ex: <http://example.org/> .`
    /// In RDF/XML: `xmlns:ex="http://example.org/"`
    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) {
        let _ = (prefix, uri);
    }

    /// A prefix goes out of scope (RDF/XML only)
    fn end_prefix_mapping(&mut self, prefix: &str) {
        let _ = prefix;
    }
}

impl<S: TripleSink + ?Sized> TripleSink for &mut S {
    fn new_identifier(&mut self, identifier: &Iri) {
        (**self).new_identifier(identifier)
    }

    fn triple(&mut self, triple: Triple) {
        (**self).triple(triple)
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) {
        (**self).start_prefix_mapping(prefix, uri)
    }

    fn end_prefix_mapping(&mut self, prefix: &str) {
        (**self).end_prefix_mapping(prefix)
    }
}

impl TripleSink for Graph {
    fn triple(&mut self, triple: Triple) {
        self.add(triple);
    }
}

/// Adapts a closure over triples into a sink.
pub struct FnSink<F>(F);

/// Sink that hands every triple to `f` and ignores the other events.
pub fn from_fn<F: FnMut(Triple)>(f: F) -> FnSink<F> {
    FnSink(f)
}

impl<F: FnMut(Triple)> TripleSink for FnSink<F> {
    fn triple(&mut self, triple: Triple) {
        (self.0)(triple)
    }
}

/// One recorded sink callback
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkEvent {
    NewIdentifier(Iri),
    Triple(Triple),
    StartPrefixMapping { prefix: String, uri: String },
    EndPrefixMapping(String),
}

/// Sink that records every event in order
#[derive(Debug, Default)]
pub struct TripleCollector {
    events: Vec<SinkEvent>,
}

impl TripleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events, in arrival order
    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.events.iter().filter_map(|e| match e {
            SinkEvent::Triple(t) => Some(t),
            _ => None,
        })
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &Iri> {
        self.events.iter().filter_map(|e| match e {
            SinkEvent::NewIdentifier(iri) => Some(iri),
            _ => None,
        })
    }

    /// Consume the collector, keeping only the triples
    pub fn into_graph(self) -> Graph {
        self.events
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Triple(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

impl TripleSink for TripleCollector {
    fn new_identifier(&mut self, identifier: &Iri) {
        self.events.push(SinkEvent::NewIdentifier(identifier.clone()));
    }

    fn triple(&mut self, triple: Triple) {
        self.events.push(SinkEvent::Triple(triple));
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) {
        self.events.push(SinkEvent::StartPrefixMapping {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
        });
    }

    fn end_prefix_mapping(&mut self, prefix: &str) {
        self.events.push(SinkEvent::EndPrefixMapping(prefix.to_string()));
    }
}

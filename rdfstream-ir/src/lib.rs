//! Triple data model shared by the RDF readers and writers
//!
//! # Key Design Principles
//!
//! 1. **Streaming** - Readers push [`Triple`]s into a [`TripleSink`] as
//!    statements complete. Nothing is retained unless the sink keeps it.
//!
//! 2. **Resolved IRIs only** - Every IRI in a triple is absolute and parsed.
//!    Prefix compaction is a writer concern ([`NamespaceContext`]).
//!
//! 3. **Optional datatypes** - A [`Literal`] carries an optional language
//!    and an optional datatype; a plain literal has neither.
//!
//! 4. **Parse-scoped blank nodes** - [`BlankNodeScope`] hands out labels
//!    for one document. Compare graphs across parses with
//!    [`Graph::isomorphic`].
//!
//! # Example
//!
//! ```
//! use rdfstream_ir::{BlankNodeScope, Graph, Literal, Triple, TripleSink};
//! use rdfstream_iri::Iri;
//!
//! let mut scope = BlankNodeScope::new();
//! let mut graph = Graph::new();
//!
//! let node = scope.fresh();
//! graph.triple(Triple::new(
//!     node,
//!     Iri::parse("http://xmlns.com/foaf/0.1/name").unwrap(),
//!     Literal::plain("Alice"),
//! ));
//! assert_eq!(graph.len(), 1);
//! ```

mod blank;
mod graph;
mod namespace;
mod sink;
mod term;
mod triple;

pub use blank::BlankNodeScope;
pub use graph::Graph;
pub use namespace::NamespaceContext;
pub use sink::{from_fn, FnSink, SinkEvent, TripleCollector, TripleSink};
pub use term::{escape_string, BlankNode, Literal, Subject, Term};
pub use triple::Triple;

pub use rdfstream_iri::Iri;

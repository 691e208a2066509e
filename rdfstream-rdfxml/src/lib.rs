//! Streaming RDF/XML reader and RDF/XML writer.
//!
//! [`RdfXmlReader`] tokenizes with quick-xml and drives an
//! [`RdfXmlHandler`], which turns element events into triples for any
//! [`rdfstream_ir::TripleSink`]. [`RdfXmlWriter`] is a sink that renders what
//! it receives as flat `rdf:Description` blocks.
//!
//! Supported syntax: typed node elements, `rdf:about` / `rdf:ID` /
//! `rdf:nodeID`, property attributes, `rdf:li`, `rdf:parseType` `Resource`,
//! `Collection` and `Literal`, `rdf:datatype`, reification through `rdf:ID`
//! on property elements, and inherited `xml:lang` and `xml:base`.
//!
//! # Example
//!
//! ```
//! use rdfstream_ir::Graph;
//! use rdfstream_rdfxml::{parse, RdfXmlWriter};
//!
//! let doc = r#"<?xml version="1.0"?>
//! <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
//!          xmlns:foaf="http://xmlns.com/foaf/0.1/">
//!   <foaf:Person rdf:about="http://example.org/alice" foaf:name="Alice">
//!     <foaf:knows rdf:resource="http://example.org/bob"/>
//!   </foaf:Person>
//! </rdf:RDF>"#;
//!
//! let mut graph = Graph::new();
//! parse(doc, &mut graph).unwrap();
//! assert_eq!(graph.len(), 3);
//!
//! let mut writer = RdfXmlWriter::default();
//! parse(doc, &mut writer).unwrap();
//! let xml = writer.into_string().unwrap();
//! assert!(xml.contains(r#"<foaf:name>Alice</foaf:name>"#));
//! ```

pub mod error;
pub mod handler;
pub mod reader;
pub mod writer;

pub use error::{RdfXmlError, Result};
pub use handler::{RdfXmlHandler, XmlAttribute, XmlElement};
pub use reader::{parse, RdfXmlReader, RdfXmlReaderOptions};
pub use writer::{RdfXmlWriter, RdfXmlWriterOptions};

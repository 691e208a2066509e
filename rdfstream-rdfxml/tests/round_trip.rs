//! Write then re-read, across both syntaxes: graphs must survive modulo
//! blank node labels.

use rdfstream_ir::{Graph, NamespaceContext};
use rdfstream_rdfxml::{RdfXmlReader, RdfXmlWriter, RdfXmlWriterOptions};
use rdfstream_turtle::{TurtleWriter, TurtleWriterOptions};

const TURTLE: &str = r#"
@prefix ex: <http://example.org/> .
@prefix foaf: <http://xmlns.com/foaf/0.1/> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

ex:alice a foaf:Person ;
    foaf:name "Alice", "Alicia"@es ;
    foaf:age 30 ;
    ex:bio """Line one
line <two> & "three" """ ;
    ex:born "1990-01-01"^^xsd:date ;
    foaf:knows [ foaf:name "Bob" ; foaf:knows [ foaf:name "Carol" ] ] ;
    ex:list ( 1 "two" ex:three ) .

_:shared ex:p "shared" .
ex:x ex:ref _:shared .
ex:y ex:ref _:shared .

_:loop ex:self _:loop .
"#;

const RDFXML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:ex="http://example.org/"
         xml:base="http://example.org/">
  <ex:Book rdf:about="book1" ex:title="Rust" xml:lang="en">
    <ex:note rdf:parseType="Literal"><em xmlns="http://www.w3.org/1999/xhtml">new</em> edition</ex:note>
    <ex:author rdf:parseType="Resource">
      <ex:name xml:lang="">Ferris</ex:name>
    </ex:author>
    <ex:chapters rdf:parseType="Collection">
      <rdf:Description rdf:about="ch1"/>
      <rdf:Description rdf:about="ch2"/>
    </ex:chapters>
    <ex:pages rdf:datatype="http://www.w3.org/2001/XMLSchema#integer">300</ex:pages>
    <ex:review rdf:ID="r1">good</ex:review>
  </ex:Book>
</rdf:RDF>"#;

fn turtle_graph(doc: &str) -> Graph {
    let mut graph = Graph::new();
    rdfstream_turtle::parse(doc, &mut graph).unwrap_or_else(|e| panic!("{e}\n{doc}"));
    graph
}

fn rdfxml_graph(doc: &str) -> Graph {
    let mut graph = Graph::new();
    rdfstream_rdfxml::parse(doc, &mut graph).unwrap_or_else(|e| panic!("{e}\n{doc}"));
    graph
}

#[test]
fn turtle_to_rdfxml_and_back() {
    let original = turtle_graph(TURTLE);

    let mut writer = RdfXmlWriter::default();
    rdfstream_turtle::parse(TURTLE, &mut writer).unwrap();
    let xml = writer.into_string().unwrap();
    assert!(xml.contains("xmlns:foaf=\"http://xmlns.com/foaf/0.1/\""), "{xml}");

    let reread = rdfxml_graph(&xml);
    assert_eq!(original.len(), reread.len(), "{xml}");
    assert!(original.isomorphic(&reread), "{xml}");
}

#[test]
fn rdfxml_round_trip() {
    let original = rdfxml_graph(RDFXML);
    // Book type, title, note, author + name, chapters + 4 list triples,
    // pages, review + 4 reification triples
    assert_eq!(original.len(), 16);

    let mut writer = RdfXmlWriter::new(
        RdfXmlWriterOptions::new()
            .with_context(NamespaceContext::common())
            .with_indent(4),
    );
    rdfstream_rdfxml::parse(RDFXML, &mut writer).unwrap();
    let xml = writer.into_string().unwrap();

    let reread = rdfxml_graph(&xml);
    assert!(original.isomorphic(&reread), "{xml}");
}

#[test]
fn rdfxml_to_turtle_and_back() {
    let original = rdfxml_graph(RDFXML);

    let mut writer = TurtleWriter::new(TurtleWriterOptions::default());
    rdfstream_rdfxml::parse(RDFXML, &mut writer).unwrap();
    let text = writer.into_string();
    assert!(text.contains("@prefix ex: <http://example.org/> ."), "{text}");

    let reread = turtle_graph(&text);
    assert!(original.isomorphic(&reread), "{text}");
}

#[test]
fn rdfxml_through_a_file() {
    let original = turtle_graph(TURTLE);

    let mut writer = RdfXmlWriter::default();
    rdfstream_turtle::parse(TURTLE, &mut writer).unwrap();
    let file = tempfile::NamedTempFile::new().unwrap();
    writer.finish(file.reopen().unwrap()).unwrap();

    let mut reread = Graph::new();
    let mut reader = RdfXmlReader::default();
    reader.parse(file.reopen().unwrap(), &mut reread).unwrap();
    assert_eq!(reader.triple_count() as usize, original.len());
    assert!(original.isomorphic(&reread));
}

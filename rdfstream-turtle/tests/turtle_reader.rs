//! Reader behavior through the public API: emission order, collections,
//! blank node identity and strict/lenient recovery.

use pretty_assertions::assert_eq;
use rdfstream_ir::{BlankNode, Graph, Literal, SinkEvent, Subject, Term, Triple, TripleCollector};
use rdfstream_iri::Iri;
use rdfstream_turtle::{parse, TurtleError, TurtleReader, TurtleReaderOptions};
use rdfstream_vocab::{rdf, xsd};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn iri(s: &str) -> Iri {
    Iri::parse(s).unwrap()
}

fn ex(local: &str) -> Iri {
    iri(&format!("http://example.org/{local}"))
}

fn blank_object(t: &Triple) -> BlankNode {
    t.object.as_blank().cloned().unwrap()
}

#[test]
fn single_prefixed_triple() {
    let mut graph = Graph::new();
    parse("@prefix ex: <http://example.org/> .\nex:s ex:p \"v\" .", &mut graph).unwrap();
    assert_eq!(
        graph.triples(),
        &[Triple::new(ex("s"), ex("p"), Literal::plain("v"))]
    );
}

#[test]
fn collection_builds_first_rest_chain() {
    let mut graph = Graph::new();
    parse(
        "@prefix ex: <http://example.org/> .\nex:s ex:p (1 2 3) .",
        &mut graph,
    )
    .unwrap();
    assert_eq!(graph.len(), 7);

    let head = graph
        .iter()
        .find(|t| t.subject == Subject::Iri(ex("s")))
        .map(blank_object)
        .unwrap();

    let mut items = Vec::new();
    let mut node = Term::Blank(head);
    while let Term::Blank(current) = node {
        let subject = Subject::Blank(current);
        let first = graph
            .iter()
            .find(|t| t.subject == subject && t.predicate.as_str() == rdf::FIRST)
            .unwrap();
        items.push(first.object.as_literal().unwrap().lexical().to_string());
        node = graph
            .iter()
            .find(|t| t.subject == subject && t.predicate.as_str() == rdf::REST)
            .map(|t| t.object.clone())
            .unwrap();
    }
    assert_eq!(items, vec!["1", "2", "3"]);
    assert_eq!(node, Term::Iri(iri(rdf::NIL)));
}

#[test]
fn empty_collection_is_nil() {
    let mut graph = Graph::new();
    parse("<http://e/s> <http://e/p> () .", &mut graph).unwrap();
    assert_eq!(graph.triples()[0].object, Term::Iri(iri(rdf::NIL)));
}

#[test]
fn labeled_blank_node_is_one_node() {
    let mut graph = Graph::new();
    parse(
        "@prefix ex: <http://example.org/> .\n_:b1 ex:p _:b1 .",
        &mut graph,
    )
    .unwrap();
    assert_eq!(graph.len(), 1);
    let t = &graph.triples()[0];
    assert_eq!(t.subject.as_blank(), t.object.as_blank());
}

#[test]
fn generated_labels_do_not_capture_document_labels() {
    let mut graph = Graph::new();
    parse(
        "@prefix ex: <http://example.org/> .\nex:s ex:p [ ex:q 1 ], _:b1 .",
        &mut graph,
    )
    .unwrap();
    let objects: Vec<&Term> = graph
        .iter()
        .filter(|t| t.subject == Subject::Iri(ex("s")))
        .map(|t| &t.object)
        .collect();
    assert_eq!(objects.len(), 2);
    assert_ne!(objects[0], objects[1]);
}

#[test]
fn nested_blank_triples_follow_their_parent() {
    let mut sink = TripleCollector::new();
    parse(
        r#"@prefix ex: <http://example.org/> .
           ex:a ex:p [ ex:q "x" ] ;
                ex:r "y" .
           ex:b ex:p "z" ."#,
        &mut sink,
    )
    .unwrap();

    let b1 = sink.triples().next().map(blank_object).unwrap();
    let expected = vec![
        SinkEvent::StartPrefixMapping {
            prefix: "ex".into(),
            uri: "http://example.org/".into(),
        },
        SinkEvent::NewIdentifier(ex("a")),
        SinkEvent::Triple(Triple::new(ex("a"), ex("p"), b1.clone())),
        SinkEvent::Triple(Triple::new(b1, ex("q"), Literal::plain("x"))),
        SinkEvent::Triple(Triple::new(ex("a"), ex("r"), Literal::plain("y"))),
        SinkEvent::NewIdentifier(ex("b")),
        SinkEvent::Triple(Triple::new(ex("b"), ex("p"), Literal::plain("z"))),
    ];
    assert_eq!(sink.events(), expected.as_slice());
}

#[test]
fn blank_subject_statements_wait_for_next_identifier() {
    let mut sink = TripleCollector::new();
    parse(
        r#"@prefix ex: <http://example.org/> .
           _:x ex:p "1" .
           ex:c ex:p "2" .
           _:y ex:p "3" ."#,
        &mut sink,
    )
    .unwrap();

    let order: Vec<String> = sink
        .triples()
        .map(|t| t.object.as_literal().unwrap().lexical().to_string())
        .collect();
    // "3" has no following IRI subject and is released at end of input
    assert_eq!(order, vec!["2", "1", "3"]);
    assert_eq!(sink.identifiers().collect::<Vec<_>>(), vec![&ex("c")]);
}

#[test]
fn new_identifier_fires_once_per_subject_run() {
    let mut sink = TripleCollector::new();
    parse(
        r#"@prefix ex: <http://example.org/> .
           ex:a ex:p 1 .
           ex:a ex:q 2 .
           ex:b ex:p 3 .
           ex:a ex:p 4 ."#,
        &mut sink,
    )
    .unwrap();
    let ids: Vec<&Iri> = sink.identifiers().collect();
    assert_eq!(ids, vec![&ex("a"), &ex("b"), &ex("a")]);
}

#[test]
fn lenient_mode_recovers_from_missing_delimiters() {
    init_tracing();
    let doc = r#"@prefix ex: <http://example.org/> .
                 ex:a ex:p [ ex:q 1 .
                 ex:b ex:p 2 ."#;

    let mut graph = Graph::new();
    parse(doc, &mut graph).unwrap();
    assert_eq!(graph.len(), 3);

    let mut reader = TurtleReader::new(TurtleReaderOptions::new().with_strict(true));
    let err = reader.parse_str(doc, &mut Graph::new()).unwrap_err();
    assert!(matches!(err, TurtleError::Parse { line: 2, .. }), "{err}");
}

#[test]
fn strict_mode_rejects_line_break_in_short_string() {
    let doc = "<http://e/s> <http://e/p> \"a\nb\" .";
    let mut graph = Graph::new();
    parse(doc, &mut graph).unwrap();
    assert_eq!(graph.triples()[0].object, Term::Literal(Literal::plain("a\nb")));

    let mut reader = TurtleReader::new(TurtleReaderOptions::new().with_strict(true));
    assert!(reader.parse_str(doc, &mut Graph::new()).is_err());
}

#[test]
fn reads_from_any_reader() {
    let first: &[u8] = "@prefix ex: <http://example.org/> .\nex:s ex:p \"cafe\u{301}".as_bytes();
    let second: &[u8] = "\" .\n".as_bytes();
    let input = std::io::Read::chain(first, second);

    let mut graph = Graph::new();
    let mut reader = TurtleReader::default();
    reader.parse(input, &mut graph).unwrap();
    assert_eq!(reader.triple_count(), 1);
    assert_eq!(
        graph.triples()[0].object.as_literal().map(Literal::lexical),
        Some("cafe\u{301}")
    );
}

#[test]
fn typed_literals_keep_lexical_form() {
    let mut graph = Graph::new();
    parse(
        r#"@prefix ex: <http://example.org/> .
           @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
           ex:s ex:int 007 ; ex:dec -0.50 ; ex:dbl 4.2E+1 ; ex:str "x"^^xsd:string ."#,
        &mut graph,
    )
    .unwrap();
    let lits: Vec<(String, Option<String>)> = graph
        .iter()
        .filter_map(|t| t.object.as_literal())
        .map(|l| {
            (
                l.lexical().to_string(),
                l.datatype().map(|d| d.as_str().to_string()),
            )
        })
        .collect();
    assert_eq!(
        lits,
        vec![
            ("007".to_string(), Some(xsd::INTEGER.to_string())),
            ("-0.50".to_string(), Some(xsd::DECIMAL.to_string())),
            ("4.2E+1".to_string(), Some(xsd::DOUBLE.to_string())),
            ("x".to_string(), Some(xsd::STRING.to_string())),
        ]
    );
}

#[test]
fn bracketed_subject_statement() {
    let mut graph = Graph::new();
    parse(
        "@prefix ex: <http://example.org/> .\n[ ex:p 1 ] .\n[ ex:q 2 ] ex:r 3 .",
        &mut graph,
    )
    .unwrap();
    assert_eq!(graph.len(), 3);
    assert!(graph.iter().all(|t| t.subject.is_blank()));
}

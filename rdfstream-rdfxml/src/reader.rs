//! Streaming RDF/XML reader.
//!
//! Tokenizes with quick-xml, resolves element and attribute prefixes against
//! a stack of namespace scopes and feeds the result to an [`RdfXmlHandler`].

use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rdfstream_ir::TripleSink;
use rdfstream_iri::{Iri, SchemeRegistry};
use rdfstream_vocab::{namespaces, xml};
use rustc_hash::FxHashMap;

use crate::error::{RdfXmlError, Result};
use crate::handler::{RdfXmlHandler, XmlAttribute, XmlElement};

/// Configuration for [`RdfXmlReader`]
#[derive(Debug, Clone)]
pub struct RdfXmlReaderOptions {
    /// Base IRI used until an `xml:base` overrides it
    pub base: Option<Iri>,
    /// Fail on stray text instead of logging it
    pub strict: bool,
    /// Run every resolved IRI through its scheme's normalization
    pub normalize_iris: bool,
    /// Scheme policies used when `normalize_iris` is set
    pub registry: Arc<SchemeRegistry>,
}

impl Default for RdfXmlReaderOptions {
    fn default() -> Self {
        Self {
            base: None,
            strict: false,
            normalize_iris: false,
            registry: Arc::new(SchemeRegistry::default()),
        }
    }
}

impl RdfXmlReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, base: Iri) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_normalize_iris(mut self, normalize: bool) -> Self {
        self.normalize_iris = normalize;
        self
    }

    pub fn with_registry(mut self, registry: Arc<SchemeRegistry>) -> Self {
        self.registry = registry;
        self
    }
}

/// RDF/XML reader.
///
/// Triples are delivered as soon as they are known: a literal property when
/// its end tag is read, a node link when the nested node element opens.
/// `new_identifier` fires for every `rdf:about` subject.
///
/// ```
/// use rdfstream_ir::Graph;
/// use rdfstream_rdfxml::RdfXmlReader;
///
/// let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
///                       xmlns:ex="http://example.org/">
///   <rdf:Description rdf:about="http://example.org/s">
///     <ex:p>v</ex:p>
///   </rdf:Description>
/// </rdf:RDF>"#;
///
/// let mut graph = Graph::new();
/// let mut reader = RdfXmlReader::default();
/// reader.parse_str(doc, &mut graph).unwrap();
/// assert_eq!(reader.triple_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RdfXmlReader {
    options: RdfXmlReaderOptions,
    triple_count: u64,
}

impl RdfXmlReader {
    pub fn new(options: RdfXmlReaderOptions) -> Self {
        Self {
            options,
            triple_count: 0,
        }
    }

    pub fn options(&self) -> &RdfXmlReaderOptions {
        &self.options
    }

    /// Triples delivered by the last parse
    pub fn triple_count(&self) -> u64 {
        self.triple_count
    }

    /// Parse an RDF/XML document from `input`.
    pub fn parse<R: Read, S: TripleSink + ?Sized>(&mut self, input: R, sink: &mut S) -> Result<()> {
        self.parse_buffered(BufReader::new(input), sink)
    }

    /// Parse an RDF/XML document held in memory.
    pub fn parse_str<S: TripleSink + ?Sized>(&mut self, input: &str, sink: &mut S) -> Result<()> {
        self.parse_buffered(input.as_bytes(), sink)
    }

    fn parse_buffered<R: BufRead, S: TripleSink + ?Sized>(&mut self, input: R, sink: &mut S) -> Result<()> {
        let mut handler = RdfXmlHandler::new(sink, &self.options)?;
        let result = drive(input, &mut handler);
        self.triple_count = handler.triple_count();
        match &result {
            Ok(()) => tracing::debug!(triples = self.triple_count, "rdf/xml document parsed"),
            Err(err) => tracing::debug!(triples = self.triple_count, error = %err, "rdf/xml parse failed"),
        }
        result
    }
}

/// Parse an in-memory RDF/XML document with default options.
pub fn parse<S: TripleSink + ?Sized>(input: &str, sink: &mut S) -> Result<()> {
    RdfXmlReader::default().parse_str(input, sink)
}

fn drive<R: BufRead, S: TripleSink>(input: R, handler: &mut RdfXmlHandler<S>) -> Result<()> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().expand_empty_elements = true;

    let mut scopes = NamespaceScopes::default();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                let element = scopes.open(&start, handler)?;
                handler.start_element(&element)?;
            }
            Event::End(end) => {
                handler.end_element(std::str::from_utf8(end.name().as_ref())?)?;
                scopes.close(handler);
            }
            Event::Text(text) => handler.characters(&text.unescape()?)?,
            Event::CData(data) => handler.characters(std::str::from_utf8(&data)?)?,
            Event::PI(pi) => {
                let content = std::str::from_utf8(&pi)?;
                let (target, data) = content
                    .split_once(char::is_whitespace)
                    .map_or((content, ""), |(target, data)| (target, data.trim_start()));
                handler.processing_instruction(target, data);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    handler.finish()
}

/// In-scope namespace bindings with one undo list per open element
#[derive(Default)]
struct NamespaceScopes {
    bindings: FxHashMap<String, String>,
    /// Prefixes declared by each open element and the binding each replaced
    frames: Vec<Vec<(String, Option<String>)>>,
}

impl NamespaceScopes {
    /// Apply the declarations on `start` and resolve its names.
    fn open<S: TripleSink>(&mut self, start: &BytesStart<'_>, handler: &mut RdfXmlHandler<S>) -> Result<XmlElement> {
        let mut declared = Vec::new();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value()?.into_owned();
            let prefix = if key == xml::XMLNS {
                Some("")
            } else {
                key.strip_prefix("xmlns:")
            };
            match prefix {
                Some(prefix) => {
                    handler.start_prefix_mapping(prefix, &value);
                    let previous = self.bindings.insert(prefix.to_string(), value);
                    declared.push((prefix.to_string(), previous));
                }
                None => attributes.push((key, value)),
            }
        }
        self.frames.push(declared);

        let qname = std::str::from_utf8(start.name().into_inner())?;
        let (namespace, local) = match qname.split_once(':') {
            Some((prefix, local)) => (self.lookup(prefix)?, local),
            None => (self.bindings.get("").cloned().unwrap_or_default(), qname),
        };
        let mut element = XmlElement::new(namespace, local, qname);
        for (key, value) in attributes {
            // unprefixed attributes have no namespace
            let (namespace, local) = match key.split_once(':') {
                Some((prefix, local)) => (self.lookup(prefix)?, local.to_string()),
                None => (String::new(), key.clone()),
            };
            element.attributes.push(XmlAttribute::new(namespace, local, key, value));
        }
        Ok(element)
    }

    fn close<S: TripleSink>(&mut self, handler: &mut RdfXmlHandler<S>) {
        let Some(declared) = self.frames.pop() else {
            return;
        };
        for (prefix, previous) in declared.into_iter().rev() {
            handler.end_prefix_mapping(&prefix);
            match previous {
                Some(namespace) => {
                    self.bindings.insert(prefix, namespace);
                }
                None => {
                    self.bindings.remove(&prefix);
                }
            }
        }
    }

    fn lookup(&self, prefix: &str) -> Result<String> {
        if prefix == xml::PREFIX {
            return Ok(namespaces::XML.to_string());
        }
        self.bindings
            .get(prefix)
            .cloned()
            .ok_or_else(|| RdfXmlError::UndeclaredPrefix(prefix.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rdfstream_ir::{Graph, SinkEvent, TripleCollector};

    #[test]
    fn test_undeclared_prefix() {
        let err = parse("<foo:bar/>", &mut Graph::new()).unwrap_err();
        assert!(matches!(err, RdfXmlError::UndeclaredPrefix(ref p) if p == "foo"), "{err}");
    }

    #[test]
    fn test_mismatched_end_tag_is_xml_error() {
        let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"></rdf:Description>"#;
        let err = parse(doc, &mut Graph::new()).unwrap_err();
        assert!(matches!(err, RdfXmlError::Xml(_)), "{err}");
    }

    #[test]
    fn test_prefix_mappings_are_scoped() {
        let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
            <rdf:Description xmlns:ex="http://example.org/" rdf:about="http://example.org/s">
                <ex:p>v</ex:p>
            </rdf:Description>
        </rdf:RDF>"#;
        let mut sink = TripleCollector::new();
        parse(doc, &mut sink).unwrap();

        let prefix_events: Vec<&SinkEvent> = sink
            .events()
            .iter()
            .filter(|e| matches!(e, SinkEvent::StartPrefixMapping { .. } | SinkEvent::EndPrefixMapping(_)))
            .collect();
        assert_eq!(
            prefix_events,
            vec![
                &SinkEvent::StartPrefixMapping {
                    prefix: "rdf".into(),
                    uri: namespaces::RDF.into(),
                },
                &SinkEvent::StartPrefixMapping {
                    prefix: "ex".into(),
                    uri: "http://example.org/".into(),
                },
                &SinkEvent::EndPrefixMapping("ex".into()),
                &SinkEvent::EndPrefixMapping("rdf".into()),
            ]
        );
    }

    #[test]
    fn test_default_namespace_applies_to_elements_only() {
        let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns="http://example.org/">
            <Thing rdf:about="http://example.org/t"><name>n</name></Thing>
        </rdf:RDF>"#;
        let mut graph = Graph::new();
        parse(doc, &mut graph).unwrap();
        let predicates: Vec<&str> = graph.iter().map(|t| t.predicate.as_str()).collect();
        assert_eq!(
            predicates,
            vec!["http://www.w3.org/1999/02/22-rdf-syntax-ns#type", "http://example.org/name"]
        );
    }

    #[test]
    fn test_triple_count_recorded() {
        let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:ex="http://example.org/">
            <rdf:Description rdf:about="http://example.org/s" ex:a="1" ex:b="2"/>
        </rdf:RDF>"#;
        let mut reader = RdfXmlReader::default();
        reader.parse_str(doc, &mut Graph::new()).unwrap();
        assert_eq!(reader.triple_count(), 2);
    }
}

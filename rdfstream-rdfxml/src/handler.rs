//! Event-driven RDF/XML triplifier.
//!
//! [`RdfXmlHandler`] receives namespace-resolved element, text and
//! processing-instruction events and keeps a stack of frames, one per open
//! element. Whether the next element is a node or a property element follows
//! from the frame on top of the stack; `xml:lang` and `xml:base` are looked
//! up by walking the stack.

use std::sync::Arc;

use indexmap::IndexMap;
use quick_xml::escape::{escape, partial_escape};
use rdfstream_ir::{BlankNode, BlankNodeScope, Literal, Subject, Term, Triple, TripleSink};
use rdfstream_iri::{Iri, SchemeRegistry};
use rdfstream_vocab::rdf::{self, syntax};
use rdfstream_vocab::{namespaces, xml};

use crate::error::{RdfXmlError, Result};
use crate::reader::RdfXmlReaderOptions;

/// An attribute with its namespace resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Namespace IRI; empty for unqualified attributes
    pub namespace: String,
    pub local_name: String,
    /// Name as written, e.g. `rdf:about`
    pub qname: String,
    /// Unescaped value
    pub value: String,
}

impl XmlAttribute {
    pub fn new(
        namespace: impl Into<String>,
        local_name: impl Into<String>,
        qname: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
            qname: qname.into(),
            value: value.into(),
        }
    }

    /// Namespace and local name concatenated
    pub fn iri(&self) -> String {
        format!("{}{}", self.namespace, self.local_name)
    }
}

/// A start tag with its namespace resolved.
///
/// Namespace declarations are not attributes; they reach the handler
/// through [`RdfXmlHandler::start_prefix_mapping`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Namespace IRI; empty when the name is unqualified
    pub namespace: String,
    pub local_name: String,
    /// Name as written, e.g. `rdf:Description`
    pub qname: String,
    pub attributes: Vec<XmlAttribute>,
}

impl XmlElement {
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>, qname: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
            qname: qname.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: XmlAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Namespace and local name concatenated
    pub fn iri(&self) -> String {
        format!("{}{}", self.namespace, self.local_name)
    }

    /// Whether this is `rdf:<local>`
    pub fn is_rdf(&self, local: &str) -> bool {
        self.namespace == namespaces::RDF && self.local_name == local
    }

    pub fn attribute(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace == namespace && a.local_name == local)
            .map(|a| a.value.as_str())
    }

    /// An RDF syntax attribute. Unqualified `about`, `resource` etc. are
    /// accepted as well.
    pub fn rdf_attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local_name == local && (a.namespace == namespaces::RDF || a.namespace.is_empty()))
            .map(|a| a.value.as_str())
    }

    /// Attributes that stand for property triples: namespaced, not `xml:`,
    /// and not RDF syntax other than `rdf:type`.
    fn property_attributes(&self) -> impl Iterator<Item = &XmlAttribute> {
        self.attributes.iter().filter(|a| {
            !a.namespace.is_empty()
                && a.namespace != namespaces::XML
                && (a.namespace != namespaces::RDF || a.local_name == syntax::TYPE)
        })
    }
}

/// One open element
struct Frame {
    /// `xml:lang` on this element; an empty tag clears the inherited one
    lang: Option<String>,
    /// `xml:base` on this element, resolved
    base: Option<Iri>,
    kind: FrameKind,
}

enum FrameKind {
    /// `rdf:RDF`
    Root,
    /// A node element; children are property elements
    Node { subject: Subject, li: u32 },
    Property(Property),
}

struct Property {
    subject: Subject,
    predicate: Iri,
    /// From `rdf:ID`
    reification: Option<Iri>,
    /// From `rdf:datatype`
    datatype: Option<Iri>,
    content: Content,
}

enum Content {
    /// No object yet; character data accumulates
    Text(String),
    /// Object given by attributes; the element must be empty
    Empty,
    /// Object is the nested node element
    Node,
    /// `rdf:parseType="Resource"`: children describe `node`
    Resource { node: BlankNode, li: u32 },
    /// `rdf:parseType="Collection"`
    Collection { head: BlankNode, items: Vec<Subject> },
    /// `rdf:parseType="Literal"`
    Literal(String),
}

impl Content {
    fn accepts_node(&self) -> bool {
        matches!(self, Content::Text(text) if text.trim().is_empty())
    }
}

/// IRIs the handler produces on its own
struct Vocab {
    rdf_type: Iri,
    rdf_first: Iri,
    rdf_rest: Iri,
    rdf_nil: Iri,
    rdf_statement: Iri,
    rdf_subject: Iri,
    rdf_predicate: Iri,
    rdf_object: Iri,
    xml_literal: Iri,
}

impl Vocab {
    fn new() -> Result<Self> {
        Ok(Self {
            rdf_type: parse_iri(rdf::TYPE)?,
            rdf_first: parse_iri(rdf::FIRST)?,
            rdf_rest: parse_iri(rdf::REST)?,
            rdf_nil: parse_iri(rdf::NIL)?,
            rdf_statement: parse_iri(rdf::STATEMENT)?,
            rdf_subject: parse_iri(rdf::SUBJECT)?,
            rdf_predicate: parse_iri(rdf::PREDICATE)?,
            rdf_object: parse_iri(rdf::OBJECT)?,
            xml_literal: parse_iri(rdf::XML_LITERAL)?,
        })
    }
}

fn parse_iri(text: &str) -> Result<Iri> {
    Iri::parse(text).map_err(|source| RdfXmlError::Iri {
        value: text.to_string(),
        source,
    })
}

/// Characters percent-escaped when an IRI fails to parse as written
const REPAIRS: &[(char, &str)] = &[
    (' ', "%20"),
    ('"', "%22"),
    ('[', "%5B"),
    (']', "%5D"),
    ('<', "%3C"),
    ('>', "%3E"),
    ('|', "%7C"),
    ('`', "%60"),
];

fn repair_iri(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match REPAIRS.iter().find(|(bad, _)| *bad == c) {
            Some((_, escaped)) => out.push_str(escaped),
            None => out.push(c),
        }
    }
    out
}

/// RDF/XML event handler.
///
/// Feed it the events of one document in order, then call
/// [`finish`](Self::finish). [`RdfXmlReader`](crate::RdfXmlReader) does this
/// from a quick-xml tokenizer; other tokenizers can drive it directly.
///
/// ```
/// use rdfstream_ir::Graph;
/// use rdfstream_rdfxml::{RdfXmlHandler, RdfXmlReaderOptions, XmlAttribute, XmlElement};
/// use rdfstream_vocab::namespaces::RDF;
///
/// let mut graph = Graph::new();
/// let mut handler = RdfXmlHandler::new(&mut graph, &RdfXmlReaderOptions::default()).unwrap();
///
/// let node = XmlElement::new(RDF, "Description", "rdf:Description")
///     .with_attribute(XmlAttribute::new(RDF, "about", "rdf:about", "http://example.org/s"));
/// handler.start_element(&node).unwrap();
/// handler.start_element(&XmlElement::new("http://example.org/", "p", "ex:p")).unwrap();
/// handler.characters("v").unwrap();
/// handler.end_element("ex:p").unwrap();
/// handler.end_element("rdf:Description").unwrap();
/// handler.finish().unwrap();
///
/// assert_eq!(graph.len(), 1);
/// ```
pub struct RdfXmlHandler<S> {
    sink: S,
    strict: bool,
    normalize: bool,
    registry: Arc<SchemeRegistry>,
    base: Option<Iri>,
    stack: Vec<Frame>,
    /// Element depth inside a `parseType="Literal"` property, counting
    /// the property element itself
    literal_depth: usize,
    blanks: BlankNodeScope,
    vocab: Vocab,
    emitted: u64,
}

impl<S: TripleSink> RdfXmlHandler<S> {
    pub fn new(sink: S, options: &RdfXmlReaderOptions) -> Result<Self> {
        Ok(Self {
            sink,
            strict: options.strict,
            normalize: options.normalize_iris,
            registry: Arc::clone(&options.registry),
            base: options.base.clone(),
            stack: Vec::new(),
            literal_depth: 0,
            blanks: BlankNodeScope::new(),
            vocab: Vocab::new()?,
            emitted: 0,
        })
    }

    /// Triples delivered so far
    pub fn triple_count(&self) -> u64 {
        self.emitted
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) {
        self.sink.start_prefix_mapping(prefix, uri);
    }

    pub fn end_prefix_mapping(&mut self, prefix: &str) {
        self.sink.end_prefix_mapping(prefix);
    }

    pub fn start_element(&mut self, element: &XmlElement) -> Result<()> {
        if self.literal_depth > 0 {
            self.literal_depth += 1;
            if let Some(buf) = self.literal_buffer() {
                write_literal_start_tag(buf, element);
            }
            return Ok(());
        }

        let lang = element.attribute(namespaces::XML, xml::LANG).map(str::to_string);
        let base = match element.attribute(namespaces::XML, xml::BASE) {
            Some(text) => Some(self.resolve(text, self.current_base())?),
            None => None,
        };
        // this element's own xml:lang / xml:base already apply to it
        let scope_base = base.clone().or_else(|| self.current_base().cloned());
        let scope_lang = match &lang {
            Some(tag) if tag.is_empty() => None,
            Some(tag) => Some(tag.clone()),
            None => self.language(),
        };
        let scope = Scope {
            base: scope_base.as_ref(),
            lang: scope_lang.as_deref(),
        };

        let kind = if self.expects_node() {
            self.start_node(element, scope)?
        } else {
            self.start_property(element, scope)?
        };
        self.stack.push(Frame { lang, base, kind });
        Ok(())
    }

    pub fn end_element(&mut self, qname: &str) -> Result<()> {
        if self.literal_depth > 1 {
            self.literal_depth -= 1;
            if let Some(buf) = self.literal_buffer() {
                buf.push_str("</");
                buf.push_str(qname);
                buf.push('>');
            }
            return Ok(());
        }
        self.literal_depth = 0;

        let lang = self.language();
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| RdfXmlError::structure(format!("end tag </{qname}> without an open element")))?;
        if let FrameKind::Property(property) = frame.kind {
            self.end_property(property, lang);
        }
        Ok(())
    }

    pub fn characters(&mut self, text: &str) -> Result<()> {
        if self.literal_depth > 0 {
            if let Some(buf) = self.literal_buffer() {
                buf.push_str(&partial_escape(text));
            }
            return Ok(());
        }
        if let Some(Frame {
            kind:
                FrameKind::Property(Property {
                    content: Content::Text(buf),
                    ..
                }),
            ..
        }) = self.stack.last_mut()
        {
            buf.push_str(text);
            return Ok(());
        }
        if text.trim().is_empty() {
            return Ok(());
        }
        if self.strict {
            return Err(RdfXmlError::structure(format!("unexpected text {:?}", text.trim())));
        }
        tracing::warn!(text = text.trim(), "ignoring text outside a property value");
        Ok(())
    }

    /// Only meaningful inside `parseType="Literal"`; ignored elsewhere.
    pub fn processing_instruction(&mut self, target: &str, data: &str) {
        if self.literal_depth == 0 {
            return;
        }
        if let Some(buf) = self.literal_buffer() {
            buf.push_str("<?");
            buf.push_str(target);
            if !data.is_empty() {
                buf.push(' ');
                buf.push_str(data);
            }
            buf.push_str("?>");
        }
    }

    /// Check that every element was closed.
    pub fn finish(&mut self) -> Result<()> {
        if self.stack.is_empty() {
            Ok(())
        } else {
            Err(RdfXmlError::structure(format!(
                "document ended with {} unclosed element(s)",
                self.stack.len()
            )))
        }
    }

    // =========================================================================
    // Node elements
    // =========================================================================

    fn start_node(&mut self, element: &XmlElement, scope: Scope<'_>) -> Result<FrameKind> {
        if element.is_rdf(syntax::RDF) {
            return Ok(FrameKind::Root);
        }
        let subject = self.node_subject(element, scope.base)?;

        if !element.is_rdf(syntax::DESCRIPTION) {
            let class = parse_iri(&element.iri())?;
            self.emit(Triple::new(subject.clone(), self.vocab.rdf_type.clone(), class), None);
        }
        self.emit_attribute_properties(&subject, element, scope)?;

        // link to the enclosing property, if any
        let link = match self.stack.last_mut() {
            Some(Frame {
                kind: FrameKind::Property(property),
                ..
            }) => {
                if let Content::Collection { items, .. } = &mut property.content {
                    items.push(subject.clone());
                    None
                } else if property.content.accepts_node() {
                    property.content = Content::Node;
                    Some((
                        Triple::new(property.subject.clone(), property.predicate.clone(), subject.clone()),
                        property.reification.clone(),
                    ))
                } else {
                    return Err(RdfXmlError::structure(format!(
                        "node element <{}> inside property <{}> that already has a value",
                        element.qname, property.predicate
                    )));
                }
            }
            _ => None,
        };
        if let Some((triple, reification)) = link {
            self.emit(triple, reification.as_ref());
        }

        Ok(FrameKind::Node { subject, li: 1 })
    }

    /// At most one of `rdf:about`, `rdf:nodeID`, `rdf:ID`; a fresh blank
    /// node when none is given.
    fn node_subject(&mut self, element: &XmlElement, base: Option<&Iri>) -> Result<Subject> {
        let about = element.rdf_attribute(syntax::ABOUT);
        let node_id = element.rdf_attribute(syntax::NODE_ID);
        let id = element.rdf_attribute(syntax::ID);

        let given: Vec<&'static str> = [
            ("rdf:about", about.is_some()),
            ("rdf:nodeID", node_id.is_some()),
            ("rdf:ID", id.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect();
        if let [first, second, ..] = given.as_slice() {
            return Err(RdfXmlError::AmbiguousSubject {
                element: element.qname.clone(),
                first: *first,
                second: *second,
            });
        }

        if let Some(about) = about {
            let iri = self.resolve(about, base)?;
            self.sink.new_identifier(&iri);
            return Ok(Subject::Iri(iri));
        }
        if let Some(label) = node_id {
            return Ok(Subject::Blank(self.blanks.labeled(label)));
        }
        if let Some(id) = id {
            return Ok(Subject::Iri(self.local_id(id, base)?));
        }
        Ok(Subject::Blank(self.blanks.fresh()))
    }

    /// Attribute shorthand: `rdf:type` gives a type triple, anything else a
    /// literal in the language in scope.
    fn emit_attribute_properties(&mut self, subject: &Subject, element: &XmlElement, scope: Scope<'_>) -> Result<()> {
        for attr in element.property_attributes() {
            let triple = if attr.namespace == namespaces::RDF {
                let class = self.resolve(&attr.value, scope.base)?;
                Triple::new(subject.clone(), self.vocab.rdf_type.clone(), class)
            } else {
                let literal = match scope.lang {
                    Some(lang) => Literal::lang(attr.value.as_str(), lang),
                    None => Literal::plain(attr.value.as_str()),
                };
                Triple::new(subject.clone(), parse_iri(&attr.iri())?, literal)
            };
            self.emit(triple, None);
        }
        Ok(())
    }

    // =========================================================================
    // Property elements
    // =========================================================================

    fn start_property(&mut self, element: &XmlElement, scope: Scope<'_>) -> Result<FrameKind> {
        let subject = self.current_subject().ok_or_else(|| {
            RdfXmlError::structure(format!("property element <{}> outside a node element", element.qname))
        })?;
        let predicate = if element.is_rdf(syntax::LI) {
            let n = self.next_li();
            parse_iri(&rdf::member(n))?
        } else {
            parse_iri(&element.iri())?
        };
        let reification = match element.rdf_attribute(syntax::ID) {
            Some(id) => Some(self.local_id(id, scope.base)?),
            None => None,
        };
        let datatype = match element.rdf_attribute(syntax::DATATYPE) {
            Some(dt) => Some(self.resolve(dt, scope.base)?),
            None => None,
        };

        let object: Option<Term> = match (
            element.rdf_attribute(syntax::RESOURCE),
            element.rdf_attribute(syntax::NODE_ID),
        ) {
            (Some(_), Some(_)) => {
                return Err(RdfXmlError::AmbiguousObject {
                    element: element.qname.clone(),
                })
            }
            (Some(resource), None) => Some(Term::Iri(self.resolve(resource, scope.base)?)),
            (None, Some(label)) => Some(Term::Blank(self.blanks.labeled(label))),
            (None, None) => None,
        };

        let parse_type = element.rdf_attribute(syntax::PARSE_TYPE);
        let structured = matches!(
            parse_type,
            Some(syntax::PARSE_TYPE_RESOURCE | syntax::PARSE_TYPE_COLLECTION | syntax::PARSE_TYPE_LITERAL)
        );
        if structured && object.is_some() {
            return Err(RdfXmlError::structure(format!(
                "<{}> combines rdf:parseType with an explicit object",
                element.qname
            )));
        }

        let content = match parse_type {
            Some(syntax::PARSE_TYPE_RESOURCE) => {
                let node = self.blanks.fresh();
                self.emit(
                    Triple::new(subject.clone(), predicate.clone(), node.clone()),
                    reification.as_ref(),
                );
                Content::Resource { node, li: 1 }
            }
            Some(syntax::PARSE_TYPE_COLLECTION) => Content::Collection {
                head: self.blanks.fresh(),
                items: Vec::new(),
            },
            Some(syntax::PARSE_TYPE_LITERAL) => {
                self.literal_depth = 1;
                Content::Literal(String::new())
            }
            other => {
                if let Some(unknown) = other {
                    tracing::debug!(parse_type = unknown, element = %element.qname, "unknown rdf:parseType");
                }
                let has_attribute_properties = element.property_attributes().next().is_some();
                match object {
                    Some(object) => {
                        self.emit(
                            Triple::new(subject.clone(), predicate.clone(), object.clone()),
                            reification.as_ref(),
                        );
                        if let Some(target) = object.to_subject() {
                            self.emit_attribute_properties(&target, element, scope)?;
                        }
                        Content::Empty
                    }
                    None if has_attribute_properties => {
                        let node = self.blanks.fresh();
                        self.emit(
                            Triple::new(subject.clone(), predicate.clone(), node.clone()),
                            reification.as_ref(),
                        );
                        self.emit_attribute_properties(&Subject::Blank(node), element, scope)?;
                        Content::Empty
                    }
                    None => Content::Text(String::new()),
                }
            }
        };

        Ok(FrameKind::Property(Property {
            subject,
            predicate,
            reification,
            datatype,
            content,
        }))
    }

    fn end_property(&mut self, property: Property, lang: Option<String>) {
        let Property {
            subject,
            predicate,
            reification,
            datatype,
            content,
        } = property;

        match content {
            Content::Text(text) => {
                let literal = match (datatype, lang) {
                    (Some(datatype), _) => Literal::typed(text, datatype),
                    (None, Some(lang)) => Literal::lang(text, lang),
                    (None, None) => Literal::plain(text),
                };
                self.emit(Triple::new(subject, predicate, literal), reification.as_ref());
            }
            Content::Literal(xml) => {
                let literal = Literal::typed(xml, self.vocab.xml_literal.clone());
                self.emit(Triple::new(subject, predicate, literal), reification.as_ref());
            }
            Content::Collection { head, items } => {
                if items.is_empty() {
                    let nil = self.vocab.rdf_nil.clone();
                    self.emit(Triple::new(subject, predicate, nil), reification.as_ref());
                    return;
                }
                self.emit(
                    Triple::new(subject, predicate, head.clone()),
                    reification.as_ref(),
                );
                let mut node = head;
                let count = items.len();
                for (i, item) in items.into_iter().enumerate() {
                    self.emit(Triple::new(node.clone(), self.vocab.rdf_first.clone(), item), None);
                    let rest = self.vocab.rdf_rest.clone();
                    if i + 1 == count {
                        let nil = self.vocab.rdf_nil.clone();
                        self.emit(Triple::new(node.clone(), rest, nil), None);
                    } else {
                        let next = self.blanks.fresh();
                        self.emit(Triple::new(node, rest, next.clone()), None);
                        node = next;
                    }
                }
            }
            Content::Empty | Content::Node | Content::Resource { .. } => {}
        }
    }

    // =========================================================================
    // Emission
    // =========================================================================

    /// Deliver `triple`, plus its four reification triples when `reification`
    /// is set.
    fn emit(&mut self, triple: Triple, reification: Option<&Iri>) {
        let Some(statement) = reification else {
            self.deliver(triple);
            return;
        };
        let Triple {
            subject,
            predicate,
            object,
        } = triple.clone();
        self.deliver(triple);
        let v = &self.vocab;
        let extra = [
            Triple::new(statement.clone(), v.rdf_type.clone(), v.rdf_statement.clone()),
            Triple::new(statement.clone(), v.rdf_subject.clone(), Term::from(subject)),
            Triple::new(statement.clone(), v.rdf_predicate.clone(), predicate),
            Triple::new(statement.clone(), v.rdf_object.clone(), object),
        ];
        for t in extra {
            self.deliver(t);
        }
    }

    fn deliver(&mut self, triple: Triple) {
        self.sink.triple(triple);
        self.emitted += 1;
    }

    // =========================================================================
    // Stack queries
    // =========================================================================

    fn expects_node(&self) -> bool {
        match self.stack.last().map(|f| &f.kind) {
            None | Some(FrameKind::Root) => true,
            Some(FrameKind::Node { .. }) => false,
            Some(FrameKind::Property(property)) => !matches!(property.content, Content::Resource { .. }),
        }
    }

    /// Subject for a property element opening now
    fn current_subject(&self) -> Option<Subject> {
        match self.stack.last().map(|f| &f.kind) {
            Some(FrameKind::Node { subject, .. }) => Some(subject.clone()),
            Some(FrameKind::Property(Property {
                content: Content::Resource { node, .. },
                ..
            })) => Some(Subject::Blank(node.clone())),
            _ => None,
        }
    }

    /// Next `rdf:_n` index of the subject on top of the stack
    fn next_li(&mut self) -> u32 {
        let counter = match self.stack.last_mut().map(|f| &mut f.kind) {
            Some(FrameKind::Node { li, .. }) => li,
            Some(FrameKind::Property(Property {
                content: Content::Resource { li, .. },
                ..
            })) => li,
            _ => return 1,
        };
        let n = *counter;
        *counter += 1;
        n
    }

    fn current_base(&self) -> Option<&Iri> {
        self.stack
            .iter()
            .rev()
            .find_map(|f| f.base.as_ref())
            .or(self.base.as_ref())
    }

    /// Nearest `xml:lang`; an empty tag means none
    fn language(&self) -> Option<String> {
        self.stack
            .iter()
            .rev()
            .find_map(|f| f.lang.as_deref())
            .filter(|lang| !lang.is_empty())
            .map(str::to_string)
    }

    fn literal_buffer(&mut self) -> Option<&mut String> {
        match self.stack.last_mut() {
            Some(Frame {
                kind:
                    FrameKind::Property(Property {
                        content: Content::Literal(buf),
                        ..
                    }),
                ..
            }) => Some(buf),
            _ => None,
        }
    }

    // =========================================================================
    // IRIs
    // =========================================================================

    /// Resolve `text` against `base`. Text that does not parse is retried
    /// with the usual offenders percent-escaped. Without a base a relative
    /// reference is kept as is.
    fn resolve(&self, text: &str, base: Option<&Iri>) -> Result<Iri> {
        let reference = match Iri::parse(text) {
            Ok(iri) => iri,
            Err(err) => {
                let repaired = repair_iri(text);
                tracing::debug!(value = text, repaired = %repaired, error = %err, "repairing IRI");
                Iri::parse(&repaired).map_err(|source| RdfXmlError::Iri {
                    value: text.to_string(),
                    source,
                })?
            }
        };
        let iri = match base {
            Some(base) if !reference.is_absolute() => base.resolve(&reference),
            _ => reference,
        };
        Ok(if self.normalize {
            iri.normalize(&self.registry)
        } else {
            iri
        })
    }

    /// `rdf:ID` value as `base#id`
    fn local_id(&self, id: &str, base: Option<&Iri>) -> Result<Iri> {
        self.resolve(&format!("#{id}"), base)
    }
}

/// Base and language in effect for the element being opened
#[derive(Clone, Copy)]
struct Scope<'a> {
    base: Option<&'a Iri>,
    lang: Option<&'a str>,
}

/// Re-serialize a start tag inside an XML literal, declaring the namespaces
/// it uses.
fn write_literal_start_tag(buf: &mut String, element: &XmlElement) {
    let mut declared: IndexMap<&str, &str> = IndexMap::new();
    if !element.namespace.is_empty() {
        declared.insert(qname_prefix(&element.qname), &element.namespace);
    }
    for attr in &element.attributes {
        if !attr.namespace.is_empty() && attr.namespace != namespaces::XML {
            declared.insert(qname_prefix(&attr.qname), &attr.namespace);
        }
    }

    buf.push('<');
    buf.push_str(&element.qname);
    for (prefix, namespace) in declared {
        if prefix.is_empty() {
            buf.push_str(" xmlns=\"");
        } else {
            buf.push_str(" xmlns:");
            buf.push_str(prefix);
            buf.push_str("=\"");
        }
        buf.push_str(&escape(namespace));
        buf.push('"');
    }
    for attr in &element.attributes {
        buf.push(' ');
        buf.push_str(&attr.qname);
        buf.push_str("=\"");
        buf.push_str(&escape(attr.value.as_str()));
        buf.push('"');
    }
    buf.push('>');
}

fn qname_prefix(qname: &str) -> &str {
    qname.split_once(':').map_or("", |(prefix, _)| prefix)
}

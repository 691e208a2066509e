//! RDF/XML serialization of a buffered triple sequence.

use std::io::Write;

use indexmap::IndexMap;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rdfstream_ir::{BlankNode, Literal, NamespaceContext, Subject, Term, Triple, TripleSink};
use rdfstream_vocab::{namespaces, rdf};
use rustc_hash::FxHashMap;

use crate::error::{RdfXmlError, Result};

/// Configuration for [`RdfXmlWriter`]
#[derive(Debug, Clone)]
pub struct RdfXmlWriterOptions {
    /// Preferred prefixes for predicate namespaces
    pub context: NamespaceContext,
    /// Start with `<?xml version="1.0" encoding="UTF-8"?>`
    pub xml_declaration: bool,
    /// Spaces per nesting level
    pub indent: usize,
}

impl Default for RdfXmlWriterOptions {
    fn default() -> Self {
        Self {
            context: NamespaceContext::new(),
            xml_declaration: true,
            indent: 2,
        }
    }
}

impl RdfXmlWriterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, context: NamespaceContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_xml_declaration(mut self, xml_declaration: bool) -> Self {
        self.xml_declaration = xml_declaration;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

/// Collects triples and writes them as RDF/XML.
///
/// Each run of consecutive triples with the same subject becomes one
/// `rdf:Description`. Blank nodes are written with `rdf:nodeID`, relabeled
/// `b1`, `b2`, ... in order of appearance. Namespaces without a prefix in the
/// context get `ns1`, `ns2`, ...
///
/// ```
/// use rdfstream_ir::{Literal, Triple, TripleSink};
/// use rdfstream_iri::Iri;
/// use rdfstream_rdfxml::RdfXmlWriter;
///
/// let mut writer = RdfXmlWriter::default();
/// writer.triple(Triple::new(
///     Iri::parse("http://example.org/s").unwrap(),
///     Iri::parse("http://example.org/p").unwrap(),
///     Literal::lang("chat", "fr"),
/// ));
/// let xml = writer.into_string().unwrap();
/// assert!(xml.contains(r#"<ns1:p xml:lang="fr">chat</ns1:p>"#));
/// ```
#[derive(Debug, Default)]
pub struct RdfXmlWriter {
    options: RdfXmlWriterOptions,
    triples: Vec<Triple>,
}

impl RdfXmlWriter {
    pub fn new(options: RdfXmlWriterOptions) -> Self {
        Self {
            options,
            triples: Vec::new(),
        }
    }

    pub fn options(&self) -> &RdfXmlWriterOptions {
        &self.options
    }

    /// Number of buffered triples
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Write the document to `out`.
    pub fn finish<W: Write>(self, mut out: W) -> Result<()> {
        out.write_all(self.into_string()?.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Render the document. Fails when a predicate has no valid XML
    /// element name.
    pub fn into_string(self) -> Result<String> {
        let prefixes = assign_prefixes(&self.options.context, &self.triples)?;
        let mut renderer = Renderer {
            options: &self.options,
            prefixes: &prefixes,
            labels: FxHashMap::default(),
        };
        let out = renderer.render(&self.triples)?;
        tracing::debug!(
            triples = self.triples.len(),
            namespaces = prefixes.len(),
            "rdf/xml document written"
        );
        Ok(out)
    }
}

impl TripleSink for RdfXmlWriter {
    fn triple(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) {
        if self.options.context.namespace(prefix).is_none() {
            self.options.context.insert(prefix, uri);
        }
    }
}

/// Namespace to prefix, `rdf` first, then in order of first use.
fn assign_prefixes(context: &NamespaceContext, triples: &[Triple]) -> Result<IndexMap<String, String>> {
    let mut prefixes: IndexMap<String, String> = IndexMap::new();
    prefixes.insert(namespaces::RDF.to_string(), "rdf".to_string());
    let mut generated = 0usize;

    for triple in triples {
        let (namespace, _) = split_predicate(triple.predicate.as_str())?;
        if prefixes.contains_key(namespace) {
            continue;
        }
        let preferred = context.prefix_for(namespace).filter(|prefix| {
            is_ncname(prefix)
                && !prefix.to_ascii_lowercase().starts_with("xml")
                && !prefixes.values().any(|taken| taken.as_str() == *prefix)
        });
        let prefix = match preferred {
            Some(prefix) => prefix.to_string(),
            None => loop {
                generated += 1;
                let candidate = format!("ns{generated}");
                if !prefixes.values().any(|taken| *taken == candidate) {
                    break candidate;
                }
            },
        };
        prefixes.insert(namespace.to_string(), prefix);
    }
    Ok(prefixes)
}

/// Split a predicate IRI into namespace and an XML local name: the longest
/// suffix of name characters that starts with a name start character.
fn split_predicate(iri: &str) -> Result<(&str, &str)> {
    let mut start = iri.len();
    for (i, c) in iri.char_indices().rev() {
        if !is_name_char(c) {
            break;
        }
        if is_name_start_char(c) {
            start = i;
        }
    }
    if start == iri.len() {
        return Err(RdfXmlError::InvalidPredicate(iri.to_string()));
    }
    Ok(iri.split_at(start))
}

fn is_name_start_char(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || c.is_ascii_digit() || matches!(c, '-' | '.' | '\u{B7}') || c.is_numeric()
}

fn is_ncname(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char)
}

struct Renderer<'w> {
    options: &'w RdfXmlWriterOptions,
    prefixes: &'w IndexMap<String, String>,
    labels: FxHashMap<&'w BlankNode, usize>,
}

impl<'w> Renderer<'w> {
    fn render(&mut self, triples: &'w [Triple]) -> Result<String> {
        let mut out = String::new();
        if self.options.xml_declaration {
            out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        }
        out.push_str("<rdf:RDF");
        for (i, (namespace, prefix)) in self.prefixes.iter().enumerate() {
            if i == 0 {
                out.push(' ');
            } else {
                out.push('\n');
                self.indent(&mut out, 2);
            }
            out.push_str(&format!("xmlns:{prefix}=\"{}\"", escape(namespace.as_str())));
        }
        out.push_str(">\n");

        let mut current: Option<&Subject> = None;
        for triple in triples {
            if current != Some(&triple.subject) {
                if current.is_some() {
                    self.indent(&mut out, 1);
                    out.push_str("</rdf:Description>\n");
                }
                self.indent(&mut out, 1);
                out.push_str("<rdf:Description ");
                match &triple.subject {
                    Subject::Iri(iri) => push_attribute(&mut out, "rdf:about", iri.as_str()),
                    Subject::Blank(node) => {
                        let label = self.label(node);
                        push_attribute(&mut out, "rdf:nodeID", &label);
                    }
                }
                out.push_str(">\n");
                current = Some(&triple.subject);
            }
            self.write_property(&mut out, triple)?;
        }
        if current.is_some() {
            self.indent(&mut out, 1);
            out.push_str("</rdf:Description>\n");
        }
        out.push_str("</rdf:RDF>\n");
        Ok(out)
    }

    fn write_property(&mut self, out: &mut String, triple: &'w Triple) -> Result<()> {
        let (namespace, local) = split_predicate(triple.predicate.as_str())?;
        let prefix = self
            .prefixes
            .get(namespace)
            .ok_or_else(|| RdfXmlError::InvalidPredicate(triple.predicate.to_string()))?;
        let name = format!("{prefix}:{local}");

        self.indent(out, 2);
        out.push('<');
        out.push_str(&name);
        match &triple.object {
            Term::Iri(iri) => {
                out.push(' ');
                push_attribute(out, "rdf:resource", iri.as_str());
                out.push_str("/>\n");
            }
            Term::Blank(node) => {
                let label = self.label(node);
                out.push(' ');
                push_attribute(out, "rdf:nodeID", &label);
                out.push_str("/>\n");
            }
            Term::Literal(literal) => {
                let lexical = literal.lexical();
                if !lexical.chars().all(is_xml_char) {
                    return Err(RdfXmlError::InvalidLiteral(lexical.to_string()));
                }
                // a malformed XML literal is kept as an escaped typed literal
                let embed = literal.has_datatype(rdf::XML_LITERAL) && is_well_formed_fragment(lexical);
                write_literal_attributes(out, literal, embed);
                if embed {
                    out.push_str(lexical);
                } else {
                    escape_text(out, lexical);
                }
                out.push_str("</");
                out.push_str(&name);
                out.push_str(">\n");
            }
        }
        Ok(())
    }

    fn label(&mut self, node: &'w BlankNode) -> String {
        let next = self.labels.len() + 1;
        let n = *self.labels.entry(node).or_insert(next);
        format!("b{n}")
    }

    fn indent(&self, out: &mut String, level: usize) {
        out.extend(std::iter::repeat(' ').take(level * self.options.indent));
    }
}

/// Attributes and the closing `>` of a literal-valued property element
fn write_literal_attributes(out: &mut String, literal: &Literal, embed: bool) {
    if let Some(language) = literal.language() {
        out.push(' ');
        push_attribute(out, "xml:lang", language);
    } else if embed {
        out.push_str(" rdf:parseType=\"Literal\"");
    } else if let Some(datatype) = literal.datatype() {
        out.push(' ');
        push_attribute(out, "rdf:datatype", datatype.as_str());
    }
    out.push('>');
}

/// XML 1.0 `Char`: the characters a document may carry at all
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
}

/// Element content; `\r` becomes a character reference so that line-end
/// normalization on reading leaves it intact.
fn escape_text(out: &mut String, text: &str) {
    let escaped = escape(text);
    if escaped.contains('\r') {
        out.push_str(&escaped.replace('\r', "&#13;"));
    } else {
        out.push_str(&escaped);
    }
}

/// Whether `text` can be embedded as element content under
/// `rdf:parseType="Literal"`: balanced tags, valid attributes and entity
/// references, and nothing that only belongs in a prolog.
fn is_well_formed_fragment(text: &str) -> bool {
    let wrapped = format!("<fragment>{text}</fragment>");
    let mut reader = Reader::from_str(&wrapped);
    let mut depth = 0usize;
    let mut closed = false;
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => return closed,
            Ok(_) if closed => return false,
            Ok(Event::Start(start)) => {
                if !attributes_valid(&start) {
                    return false;
                }
                depth += 1;
            }
            Ok(Event::Empty(start)) => {
                if !attributes_valid(&start) {
                    return false;
                }
            }
            Ok(Event::End(_)) => {
                depth = depth.saturating_sub(1);
                closed = depth == 0;
            }
            Ok(Event::Text(t)) => {
                if t.unescape().is_err() {
                    return false;
                }
            }
            Ok(Event::Decl(_)) | Ok(Event::DocType(_)) => return false,
            Ok(_) => {}
            Err(_) => return false,
        }
    }
}

fn attributes_valid(start: &BytesStart<'_>) -> bool {
    start
        .attributes()
        .all(|attr| attr.is_ok_and(|attr| attr.unescape_value().is_ok()))
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rdfstream_iri::Iri;
    use rdfstream_vocab::xsd;

    fn iri(s: &str) -> Iri {
        Iri::parse(s).unwrap()
    }

    fn ex(local: &str) -> Iri {
        iri(&format!("http://example.org/{local}"))
    }

    #[test]
    fn test_split_predicate() {
        assert_eq!(
            split_predicate("http://example.org/name").unwrap(),
            ("http://example.org/", "name")
        );
        assert_eq!(
            split_predicate("http://example.org/ns#p-1").unwrap(),
            ("http://example.org/ns#", "p-1")
        );
        // a local name cannot start with a digit
        assert_eq!(
            split_predicate("http://example.org/1a").unwrap(),
            ("http://example.org/1", "a")
        );
        assert!(matches!(
            split_predicate("http://example.org/123"),
            Err(RdfXmlError::InvalidPredicate(_))
        ));
    }

    #[test]
    fn test_document_layout() {
        let mut w = RdfXmlWriter::new(
            RdfXmlWriterOptions::new().with_context(NamespaceContext::new().with_prefix("ex", "http://example.org/")),
        );
        let b = BlankNode::new("x");
        w.triple(Triple::new(ex("s"), ex("p"), ex("o")));
        w.triple(Triple::new(ex("s"), ex("q"), b.clone()));
        w.triple(Triple::new(b, ex("n"), Literal::typed("5", iri(xsd::INTEGER))));
        assert_eq!(
            w.into_string().unwrap(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\"\n    \
             xmlns:ex=\"http://example.org/\">\n  \
             <rdf:Description rdf:about=\"http://example.org/s\">\n    \
             <ex:p rdf:resource=\"http://example.org/o\"/>\n    \
             <ex:q rdf:nodeID=\"b1\"/>\n  \
             </rdf:Description>\n  \
             <rdf:Description rdf:nodeID=\"b1\">\n    \
             <ex:n rdf:datatype=\"http://www.w3.org/2001/XMLSchema#integer\">5</ex:n>\n  \
             </rdf:Description>\n\
             </rdf:RDF>\n"
        );
    }

    #[test]
    fn test_escaping_and_xml_literal() {
        let mut w = RdfXmlWriter::new(RdfXmlWriterOptions::new().with_xml_declaration(false));
        w.triple(Triple::new(ex("s"), ex("p"), Literal::plain("a < b & c")));
        w.triple(Triple::new(ex("s"), ex("x"), Literal::typed("<b>bold</b>", iri(rdf::XML_LITERAL))));
        let text = w.into_string().unwrap();
        assert!(text.starts_with("<rdf:RDF"), "{text}");
        assert!(text.contains("<ns1:p>a &lt; b &amp; c</ns1:p>"), "{text}");
        assert!(text.contains("<ns1:x rdf:parseType=\"Literal\"><b>bold</b></ns1:x>"), "{text}");
    }

    #[test]
    fn test_malformed_xml_literal_is_escaped() {
        let mut w = RdfXmlWriter::new(RdfXmlWriterOptions::new().with_xml_declaration(false));
        w.triple(Triple::new(ex("s"), ex("x"), Literal::typed("<b>open", iri(rdf::XML_LITERAL))));
        w.triple(Triple::new(ex("s"), ex("y"), Literal::typed("a</fragment><c/>", iri(rdf::XML_LITERAL))));
        let text = w.into_string().unwrap();
        assert!(
            text.contains(
                "<ns1:x rdf:datatype=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral\">&lt;b&gt;open</ns1:x>"
            ),
            "{text}"
        );
        assert!(!text.contains("parseType"), "{text}");
    }

    #[test]
    fn test_well_formed_fragment() {
        assert!(is_well_formed_fragment("plain text"));
        assert!(is_well_formed_fragment("<a href=\"x\">t</a> and <br/>"));
        assert!(is_well_formed_fragment(""));
        assert!(!is_well_formed_fragment("<a>"));
        assert!(!is_well_formed_fragment("<a></b>"));
        assert!(!is_well_formed_fragment("&undefined;"));
        assert!(!is_well_formed_fragment("</fragment><fragment>"));
    }

    #[test]
    fn test_control_character_in_literal_fails() {
        let mut w = RdfXmlWriter::default();
        w.triple(Triple::new(ex("s"), ex("p"), Literal::plain("bell\u{7}")));
        assert!(matches!(w.into_string(), Err(RdfXmlError::InvalidLiteral(value)) if value == "bell\u{7}"));
    }

    #[test]
    fn test_carriage_return_is_a_reference() {
        let mut w = RdfXmlWriter::new(RdfXmlWriterOptions::new().with_xml_declaration(false));
        w.triple(Triple::new(ex("s"), ex("p"), Literal::plain("a\r\nb\tc")));
        let text = w.into_string().unwrap();
        assert!(text.contains("<ns1:p>a&#13;\nb\tc</ns1:p>"), "{text}");
    }

    #[test]
    fn test_generated_prefix_skips_taken_names() {
        let context = NamespaceContext::new().with_prefix("ns1", "http://other.org/");
        let triples = vec![
            Triple::new(ex("s"), iri("http://other.org/p"), ex("o")),
            Triple::new(ex("s"), ex("p"), ex("o")),
        ];
        let prefixes = assign_prefixes(&context, &triples).unwrap();
        assert_eq!(prefixes.get("http://other.org/").map(String::as_str), Some("ns1"));
        assert_eq!(prefixes.get("http://example.org/").map(String::as_str), Some("ns2"));
    }

    #[test]
    fn test_invalid_predicate_fails() {
        let mut w = RdfXmlWriter::default();
        w.triple(Triple::new(ex("s"), iri("http://example.org/42"), ex("o")));
        assert!(matches!(w.into_string(), Err(RdfXmlError::InvalidPredicate(_))));
    }
}

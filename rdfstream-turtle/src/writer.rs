//! Turtle serialization of a buffered triple sequence.

use std::io::{self, Write};

use indexmap::IndexSet;
use rdfstream_ir::{escape_string, BlankNode, Literal, NamespaceContext, Subject, Term, Triple, TripleSink};
use rdfstream_iri::Iri;
use rdfstream_vocab::{rdf, xsd};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::chars::{is_prefix_name, is_simple_local_name};

/// Configuration for [`TurtleWriter`]
#[derive(Debug, Clone)]
pub struct TurtleWriterOptions {
    /// Prefixes available for compaction
    pub context: NamespaceContext,
    /// Emit `@prefix` lines for the prefixes actually used. When off, every
    /// IRI is written in full.
    pub write_prefixes: bool,
    /// Spaces per nesting level
    pub indent: usize,
    /// Use `"""` for values containing line breaks
    pub long_strings: bool,
}

impl Default for TurtleWriterOptions {
    fn default() -> Self {
        Self {
            context: NamespaceContext::new(),
            write_prefixes: true,
            indent: 4,
            long_strings: true,
        }
    }
}

impl TurtleWriterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context(mut self, context: NamespaceContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_write_prefixes(mut self, write_prefixes: bool) -> Self {
        self.write_prefixes = write_prefixes;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_long_strings(mut self, long_strings: bool) -> Self {
        self.long_strings = long_strings;
        self
    }
}

/// Collects triples and writes them as Turtle.
///
/// Triples are written in the order received. Consecutive triples with the
/// same subject share a statement, so a subject that reappears later starts
/// a new one. A blank node that is the object of exactly one triple and whose
/// own triples are contiguous is written inline as `[ ... ]`; any other blank
/// node keeps a `_:label`. Prefix mappings reported through
/// [`TripleSink::start_prefix_mapping`] are added to the compaction table
/// unless the prefix is already bound.
///
/// ```
/// use rdfstream_ir::TripleSink;
/// use rdfstream_turtle::{TurtleReader, TurtleWriter};
///
/// let mut writer = TurtleWriter::default();
/// TurtleReader::default()
///     .parse_str("@prefix ex: <http://example.org/> . ex:s ex:p [ ex:q 1 ] .", &mut writer)
///     .unwrap();
/// let text = writer.into_string();
/// assert!(text.starts_with("@prefix ex: <http://example.org/> ."));
/// assert!(text.contains("ex:q 1"));
/// ```
#[derive(Debug, Default)]
pub struct TurtleWriter {
    options: TurtleWriterOptions,
    triples: Vec<Triple>,
}

impl TurtleWriter {
    pub fn new(options: TurtleWriterOptions) -> Self {
        Self {
            options,
            triples: Vec::new(),
        }
    }

    pub fn options(&self) -> &TurtleWriterOptions {
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
    pub fn finish<W: Write>(self, mut out: W) -> io::Result<()> {
        out.write_all(self.into_string().as_bytes())?;
        out.flush()
    }

    /// Render the document.
    pub fn into_string(self) -> String {
        let mut renderer = Renderer::new(&self.options, &self.triples);
        let body = renderer.render();

        let mut out = String::with_capacity(body.len() + 64);
        if self.options.write_prefixes && !renderer.used_prefixes.is_empty() {
            for (prefix, namespace) in self.options.context.iter() {
                if renderer.used_prefixes.contains(prefix) {
                    out.push_str(&format!("@prefix {prefix}: <{namespace}> .\n"));
                }
            }
            out.push('\n');
        }
        out.push_str(&body);
        tracing::debug!(
            triples = self.triples.len(),
            statements = renderer.runs.len(),
            "turtle document written"
        );
        out
    }
}

impl TripleSink for TurtleWriter {
    fn triple(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) {
        if self.options.context.namespace(prefix).is_none() {
            self.options.context.insert(prefix, uri);
        }
    }
}

/// Where a blank node's outgoing triples sit in the input.
#[derive(Clone, Copy, PartialEq, Eq)]
enum BlankRuns {
    One(usize),
    Many,
}

/// A maximal stretch of consecutive triples sharing a subject.
struct Run<'t> {
    subject: &'t Subject,
    triples: &'t [Triple],
}

struct Renderer<'t> {
    options: &'t TurtleWriterOptions,
    runs: Vec<Run<'t>>,
    blank_runs: FxHashMap<&'t BlankNode, BlankRuns>,
    object_refs: FxHashMap<&'t BlankNode, usize>,
    /// Runs that have been written or are being written
    written: FxHashSet<usize>,
    used_prefixes: IndexSet<String>,
}

impl<'t> Renderer<'t> {
    fn new(options: &'t TurtleWriterOptions, triples: &'t [Triple]) -> Self {
        let mut runs: Vec<Run<'t>> = Vec::new();
        let mut start = 0;
        for i in 1..=triples.len() {
            if i == triples.len() || triples[i].subject != triples[start].subject {
                runs.push(Run {
                    subject: &triples[start].subject,
                    triples: &triples[start..i],
                });
                start = i;
            }
        }

        let mut blank_runs: FxHashMap<&BlankNode, BlankRuns> = FxHashMap::default();
        for (index, run) in runs.iter().enumerate() {
            if let Subject::Blank(node) = run.subject {
                blank_runs
                    .entry(node)
                    .and_modify(|runs| *runs = BlankRuns::Many)
                    .or_insert(BlankRuns::One(index));
            }
        }

        let mut object_refs: FxHashMap<&BlankNode, usize> = FxHashMap::default();
        for triple in triples {
            if let Term::Blank(node) = &triple.object {
                *object_refs.entry(node).or_default() += 1;
            }
        }

        Self {
            options,
            runs,
            blank_runs,
            object_refs,
            written: FxHashSet::default(),
            used_prefixes: IndexSet::new(),
        }
    }

    fn inlinable(&self, node: &BlankNode) -> bool {
        self.object_refs.get(node) == Some(&1)
    }

    /// The single run to write as `[ ... ]` in place of `node`, if any.
    fn inline_run(&self, node: &BlankNode) -> Option<usize> {
        match self.blank_runs.get(node) {
            Some(BlankRuns::One(index)) if self.inlinable(node) => Some(*index),
            _ => None,
        }
    }

    fn render(&mut self) -> String {
        let mut out = String::new();

        for index in 0..self.runs.len() {
            let deferred = matches!(
                self.runs[index].subject,
                Subject::Blank(node) if self.inline_run(node) == Some(index)
            );
            if !deferred && !self.written.contains(&index) {
                self.write_statement(&mut out, index);
            }
        }
        // inlinable nodes never reached from a written subject form cycles
        for index in 0..self.runs.len() {
            if !self.written.contains(&index) {
                self.write_statement(&mut out, index);
            }
        }
        out
    }

    fn write_statement(&mut self, out: &mut String, index: usize) {
        if !out.is_empty() {
            out.push('\n');
        }
        self.written.insert(index);
        let subject = self.runs[index].subject;
        match subject {
            Subject::Iri(iri) => self.write_iri(out, iri),
            Subject::Blank(node) => write_blank_label(out, node),
        }
        out.push(' ');
        self.write_predicate_list(out, index, 1, true);
        out.push_str(" .\n");
    }

    /// Writes a run in input order: `,` repeats the predicate, `;` changes it.
    fn write_predicate_list(&mut self, out: &mut String, index: usize, level: usize, first_inline: bool) {
        let triples = self.runs[index].triples;
        let mut previous: Option<&Iri> = None;

        for triple in triples {
            match previous {
                Some(predicate) if *predicate == triple.predicate => {
                    out.push_str(", ");
                    self.write_object(out, &triple.object, level);
                    continue;
                }
                Some(_) => {
                    out.push_str(" ;\n");
                    self.indent(out, level);
                }
                None if !first_inline => self.indent(out, level),
                None => {}
            }
            if triple.predicate.as_str() == rdf::TYPE {
                out.push('a');
            } else {
                self.write_iri(out, &triple.predicate);
            }
            out.push(' ');
            self.write_object(out, &triple.object, level);
            previous = Some(&triple.predicate);
        }
    }

    fn write_object(&mut self, out: &mut String, object: &'t Term, level: usize) {
        match object {
            Term::Iri(iri) => self.write_iri(out, iri),
            Term::Literal(literal) => self.write_literal(out, literal),
            Term::Blank(node) => match self.inline_run(node) {
                Some(index) if !self.written.contains(&index) => {
                    self.written.insert(index);
                    out.push_str("[\n");
                    self.write_predicate_list(out, index, level + 1, false);
                    out.push('\n');
                    self.indent(out, level);
                    out.push(']');
                }
                None if self.inlinable(node) && !self.blank_runs.contains_key(node) => out.push_str("[]"),
                _ => write_blank_label(out, node),
            },
        }
    }

    fn write_iri(&mut self, out: &mut String, iri: &Iri) {
        let text = iri.as_str();
        // without a header prefixed names could not be read back
        let compacted = if self.options.write_prefixes {
            self.options.context.compact(text)
        } else {
            None
        };
        if let Some((prefix, local)) = compacted {
            if is_prefix_name(prefix) && is_simple_local_name(local) {
                if !self.used_prefixes.contains(prefix) {
                    self.used_prefixes.insert(prefix.to_string());
                }
                out.push_str(prefix);
                out.push(':');
                out.push_str(local);
                return;
            }
        }
        out.push('<');
        out.push_str(text);
        out.push('>');
    }

    fn write_literal(&mut self, out: &mut String, literal: &Literal) {
        let lexical = literal.lexical();
        if let Some(datatype) = literal.datatype() {
            let bare = match datatype.as_str() {
                xsd::INTEGER => is_integer(lexical),
                xsd::BOOLEAN => lexical == "true" || lexical == "false",
                _ => false,
            };
            if bare {
                out.push_str(lexical);
                return;
            }
        }

        let long = self.options.long_strings && lexical.contains(['\n', '\r']);
        if long {
            out.push_str("\"\"\"");
            for c in lexical.chars() {
                match c {
                    '\\' => out.push_str("\\\\"),
                    '"' => out.push_str("\\\""),
                    _ => out.push(c),
                }
            }
            out.push_str("\"\"\"");
        } else {
            out.push('"');
            escape_string(lexical, out);
            out.push('"');
        }

        if let Some(language) = literal.language() {
            out.push('@');
            out.push_str(language);
        } else if let Some(datatype) = literal.datatype() {
            out.push_str("^^");
            self.write_iri(out, datatype);
        }
    }

    fn indent(&self, out: &mut String, level: usize) {
        out.extend(std::iter::repeat(' ').take(level * self.options.indent));
    }
}

fn write_blank_label(out: &mut String, node: &BlankNode) {
    out.push_str("_:");
    out.push_str(node.as_str());
}

fn is_integer(lexical: &str) -> bool {
    let digits = lexical.strip_prefix(['+', '-']).unwrap_or(lexical);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn iri(s: &str) -> Iri {
        Iri::parse(s).unwrap()
    }

    fn ex(local: &str) -> Iri {
        iri(&format!("http://example.org/{local}"))
    }

    fn writer() -> TurtleWriter {
        TurtleWriter::new(
            TurtleWriterOptions::new()
                .with_context(NamespaceContext::new().with_prefix("ex", "http://example.org/")),
        )
    }

    #[test]
    fn test_subject_grouping() {
        let mut w = writer();
        w.triple(Triple::new(ex("s"), iri(rdf::TYPE), ex("T")));
        w.triple(Triple::new(ex("s"), ex("p"), Literal::plain("a")));
        w.triple(Triple::new(ex("s"), ex("p"), Literal::plain("b")));
        w.triple(Triple::new(ex("t"), ex("p"), Literal::typed("7", iri(xsd::INTEGER))));
        assert_eq!(
            w.into_string(),
            "@prefix ex: <http://example.org/> .\n\n\
             ex:s a ex:T ;\n    ex:p \"a\", \"b\" .\n\n\
             ex:t ex:p 7 .\n"
        );
    }

    #[test]
    fn test_reappearing_subject_starts_new_statement() {
        let mut w = writer();
        w.triple(Triple::new(ex("s1"), ex("p"), ex("o1")));
        w.triple(Triple::new(ex("s2"), ex("p"), ex("o2")));
        w.triple(Triple::new(ex("s1"), ex("p"), ex("o3")));
        assert_eq!(
            w.into_string(),
            "@prefix ex: <http://example.org/> .\n\n\
             ex:s1 ex:p ex:o1 .\n\n\
             ex:s2 ex:p ex:o2 .\n\n\
             ex:s1 ex:p ex:o3 .\n"
        );
    }

    #[test]
    fn test_predicate_order_is_kept() {
        let mut w = writer();
        w.triple(Triple::new(ex("s"), ex("p1"), ex("a")));
        w.triple(Triple::new(ex("s"), ex("p2"), ex("b")));
        w.triple(Triple::new(ex("s"), ex("p1"), ex("c")));
        w.triple(Triple::new(ex("s"), ex("p1"), ex("d")));
        assert_eq!(
            w.into_string(),
            "@prefix ex: <http://example.org/> .\n\n\
             ex:s ex:p1 ex:a ;\n    ex:p2 ex:b ;\n    ex:p1 ex:c, ex:d .\n"
        );
    }

    #[test]
    fn test_split_blank_subject_keeps_label() {
        let mut w = writer();
        let b = BlankNode::new("b");
        w.triple(Triple::new(ex("s"), ex("p"), b.clone()));
        w.triple(Triple::new(b.clone(), ex("q"), ex("x")));
        w.triple(Triple::new(ex("t"), ex("p"), ex("y")));
        w.triple(Triple::new(b, ex("r"), ex("z")));
        assert_eq!(
            w.into_string(),
            "@prefix ex: <http://example.org/> .\n\n\
             ex:s ex:p _:b .\n\n\
             _:b ex:q ex:x .\n\n\
             ex:t ex:p ex:y .\n\n\
             _:b ex:r ex:z .\n"
        );
    }

    #[test]
    fn test_inline_blank_node() {
        let mut w = writer();
        let b = BlankNode::new("b1");
        w.triple(Triple::new(ex("s"), ex("p"), b.clone()));
        w.triple(Triple::new(b, ex("q"), Literal::lang("x", "en")));
        assert_eq!(
            w.into_string(),
            "@prefix ex: <http://example.org/> .\n\n\
             ex:s ex:p [\n        ex:q \"x\"@en\n    ] .\n"
        );
    }

    #[test]
    fn test_shared_blank_keeps_label() {
        let mut w = writer();
        let b = BlankNode::new("b1");
        w.triple(Triple::new(ex("s"), ex("p"), b.clone()));
        w.triple(Triple::new(ex("t"), ex("p"), b.clone()));
        w.triple(Triple::new(b, ex("q"), ex("o")));
        let text = w.into_string();
        assert!(text.contains("ex:s ex:p _:b1 ."));
        assert!(text.contains("_:b1 ex:q ex:o ."));
    }

    #[test]
    fn test_self_reference_falls_back_to_label() {
        let mut w = writer();
        let b = BlankNode::new("b1");
        w.triple(Triple::new(b.clone(), ex("p"), b));
        assert_eq!(w.into_string(), "@prefix ex: <http://example.org/> .\n\n_:b1 ex:p _:b1 .\n");
    }

    #[test]
    fn test_long_and_escaped_strings() {
        let mut w = writer();
        w.triple(Triple::new(ex("s"), ex("p"), Literal::plain("two\nlines \"q\"")));
        w.triple(Triple::new(ex("s"), ex("q"), Literal::plain("tab\there")));
        let text = w.into_string();
        assert!(text.contains("ex:p \"\"\"two\nlines \\\"q\\\"\"\"\""));
        assert!(text.contains("ex:q \"tab\\there\""));
    }

    #[test]
    fn test_iri_without_prefix() {
        let mut w = TurtleWriter::default();
        w.triple(Triple::new(ex("a/b"), ex("p"), Literal::typed("1.5", iri(xsd::DECIMAL))));
        assert_eq!(
            w.into_string(),
            "<http://example.org/a/b> <http://example.org/p> \"1.5\"^^<http://www.w3.org/2001/XMLSchema#decimal> .\n"
        );
    }

    #[test]
    fn test_prefix_mapping_from_reader_events() {
        let mut w = TurtleWriter::default();
        w.start_prefix_mapping("ex", "http://example.org/");
        w.triple(Triple::new(ex("s"), ex("p"), Literal::typed("true", iri(xsd::BOOLEAN))));
        assert_eq!(
            w.into_string(),
            "@prefix ex: <http://example.org/> .\n\nex:s ex:p true .\n"
        );
    }

    #[test]
    fn test_is_integer() {
        assert!(is_integer("42"));
        assert!(is_integer("-7"));
        assert!(!is_integer("+"));
        assert!(!is_integer("1.0"));
    }
}

//! Streaming Turtle reader that emits to a TripleSink.
//!
//! A recursive-descent parser over a character cursor with pushback. Triples
//! are delivered as statements complete; nothing is retained except the
//! blank-node-subject buffer described on [`TurtleReader`].

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::sync::Arc;

use rdfstream_ir::{BlankNode, BlankNodeScope, Literal, NamespaceContext, Subject, Term, Triple, TripleSink};
use rdfstream_iri::{Iri, SchemeRegistry};
use rdfstream_vocab::{rdf, xsd};

use crate::chars::*;
use crate::cursor::CharCursor;
use crate::error::{Result, TurtleError};

/// Configuration for [`TurtleReader`]
#[derive(Debug, Clone)]
pub struct TurtleReaderOptions {
    /// Fail on delimiter mismatches and bad escapes instead of logging them
    pub strict: bool,
    /// Base IRI for relative references until `@base` replaces it
    pub base: Option<Iri>,
    /// Prefixes in scope before the first `@prefix`
    pub context: NamespaceContext,
    /// Run every resolved IRI through its scheme's normalization
    pub normalize_iris: bool,
    /// Scheme policies used when `normalize_iris` is set
    pub registry: Arc<SchemeRegistry>,
}

impl Default for TurtleReaderOptions {
    fn default() -> Self {
        Self {
            strict: false,
            base: None,
            context: NamespaceContext::new(),
            normalize_iris: false,
            registry: Arc::new(SchemeRegistry::default()),
        }
    }
}

impl TurtleReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_base(mut self, base: Iri) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_context(mut self, context: NamespaceContext) -> Self {
        self.context = context;
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

/// Turtle reader.
///
/// # Emission order
///
/// Triples whose subject is a blank node are held back until the next
/// triple with an IRI subject has been delivered, then released in the order
/// they were completed. The properties of a `[ ... ]` or collection node
/// therefore follow the statement that introduced it. Anything still held at
/// the end of the document is released then.
///
/// `new_identifier` fires before the first triple of each run of triples
/// sharing an IRI subject.
///
/// ```
/// use rdfstream_ir::TripleCollector;
/// use rdfstream_turtle::{TurtleReader, TurtleReaderOptions};
///
/// let mut sink = TripleCollector::new();
/// let mut reader = TurtleReader::new(TurtleReaderOptions::new());
/// reader
///     .parse_str("@prefix ex: <http://example.org/> .\nex:s ex:p \"v\" .", &mut sink)
///     .unwrap();
/// assert_eq!(reader.triple_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TurtleReader {
    options: TurtleReaderOptions,
    triple_count: u64,
}

impl TurtleReader {
    pub fn new(options: TurtleReaderOptions) -> Self {
        Self {
            options,
            triple_count: 0,
        }
    }

    pub fn options(&self) -> &TurtleReaderOptions {
        &self.options
    }

    /// Triples delivered by the last parse
    pub fn triple_count(&self) -> u64 {
        self.triple_count
    }

    /// Parse a UTF-8 Turtle document from `input`.
    pub fn parse<R: Read, S: TripleSink + ?Sized>(&mut self, input: R, sink: &mut S) -> Result<()> {
        self.parse_buffered(BufReader::new(input), sink)
    }

    /// Parse a Turtle document held in memory.
    pub fn parse_str<S: TripleSink + ?Sized>(&mut self, input: &str, sink: &mut S) -> Result<()> {
        self.parse_buffered(input.as_bytes(), sink)
    }

    fn parse_buffered<R: BufRead, S: TripleSink + ?Sized>(&mut self, input: R, sink: &mut S) -> Result<()> {
        let mut parser = Parser::new(CharCursor::new(input), sink, &self.options)?;
        let result = parser.parse_document();
        self.triple_count = parser.emitted;
        match &result {
            Ok(()) => tracing::debug!(triples = self.triple_count, "turtle document parsed"),
            Err(err) => tracing::debug!(triples = self.triple_count, error = %err, "turtle parse failed"),
        }
        result
    }
}

/// IRIs the parser produces on its own
struct Vocab {
    rdf_type: Iri,
    rdf_first: Iri,
    rdf_rest: Iri,
    rdf_nil: Iri,
    xsd_integer: Iri,
    xsd_decimal: Iri,
    xsd_double: Iri,
    xsd_boolean: Iri,
}

impl Vocab {
    fn new() -> rdfstream_iri::Result<Self> {
        Ok(Self {
            rdf_type: Iri::parse(rdf::TYPE)?,
            rdf_first: Iri::parse(rdf::FIRST)?,
            rdf_rest: Iri::parse(rdf::REST)?,
            rdf_nil: Iri::parse(rdf::NIL)?,
            xsd_integer: Iri::parse(xsd::INTEGER)?,
            xsd_decimal: Iri::parse(xsd::DECIMAL)?,
            xsd_double: Iri::parse(xsd::DOUBLE)?,
            xsd_boolean: Iri::parse(xsd::BOOLEAN)?,
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum NumberKind {
    Integer,
    Decimal,
    Double,
}

/// Turtle parser state for one document.
struct Parser<'a, R, S: ?Sized> {
    input: CharCursor<R>,
    sink: &'a mut S,
    strict: bool,
    normalize: bool,
    registry: Arc<SchemeRegistry>,
    base: Option<Iri>,
    context: NamespaceContext,
    blanks: BlankNodeScope,
    vocab: Vocab,
    /// Blank-node-subject triples awaiting release
    pending: VecDeque<Triple>,
    last_subject: Option<Iri>,
    emitted: u64,
}

impl<'a, R: BufRead, S: TripleSink + ?Sized> Parser<'a, R, S> {
    fn new(input: CharCursor<R>, sink: &'a mut S, options: &TurtleReaderOptions) -> Result<Self> {
        let vocab = Vocab::new().map_err(|source| TurtleError::Iri {
            line: 1,
            column: 1,
            source,
        })?;
        Ok(Self {
            input,
            sink,
            strict: options.strict,
            normalize: options.normalize_iris,
            registry: Arc::clone(&options.registry),
            base: options.base.clone(),
            context: options.context.clone(),
            blanks: BlankNodeScope::new(),
            vocab,
            pending: VecDeque::new(),
            last_subject: None,
            emitted: 0,
        })
    }

    /// Parse the entire document.
    fn parse_document(&mut self) -> Result<()> {
        if self.input.peek()? == Some('\u{FEFF}') {
            self.input.next_char()?;
        }
        while let Some(c) = self.skip_ws()? {
            if c == '@' {
                self.parse_directive()?;
            } else {
                self.parse_statement()?;
            }
        }
        self.flush_pending();
        Ok(())
    }

    // =========================================================================
    // Emission
    // =========================================================================

    fn emit(&mut self, triple: Triple) {
        if triple.subject.is_blank() {
            self.pending.push_back(triple);
            return;
        }
        if let Subject::Iri(iri) = &triple.subject {
            if self.last_subject.as_ref() != Some(iri) {
                self.sink.new_identifier(iri);
                self.last_subject = Some(iri.clone());
            }
        }
        self.deliver(triple);
        self.flush_pending();
    }

    fn deliver(&mut self, triple: Triple) {
        self.sink.triple(triple);
        self.emitted += 1;
    }

    fn flush_pending(&mut self) {
        while let Some(triple) = self.pending.pop_front() {
            self.deliver(triple);
        }
    }

    // =========================================================================
    // Grammar
    // =========================================================================

    /// Parse `@prefix` or `@base`, including the trailing dot.
    fn parse_directive(&mut self) -> Result<()> {
        self.read()?; // '@'
        let mut name = String::new();
        while let Some(c) = self.input.peek()? {
            if !c.is_ascii_alphabetic() {
                break;
            }
            name.push(c);
            self.input.next_char()?;
        }

        if name.eq_ignore_ascii_case("prefix") {
            self.skip_ws()?;
            let prefix = self.parse_prefix_label()?;
            self.skip_ws()?;
            let namespace = self.parse_iri_ref()?;
            tracing::trace!(prefix = %prefix, namespace = %namespace, "prefix declared");
            self.sink.start_prefix_mapping(&prefix, namespace.as_str());
            self.context.insert(prefix, namespace.as_str());
        } else if name.eq_ignore_ascii_case("base") {
            self.skip_ws()?;
            let base = self.parse_iri_ref()?;
            self.base = Some(base);
        } else {
            return Err(TurtleError::UnknownDirective(name));
        }

        self.skip_ws()?;
        self.expect('.')
    }

    /// Parse the `ex:` of a prefix directive, consuming the colon.
    fn parse_prefix_label(&mut self) -> Result<String> {
        let (line, column) = self.input.position();
        let mut prefix = String::new();
        if let Some(c) = self.input.peek()? {
            if is_pn_chars_base(c) {
                prefix.push(c);
                self.input.next_char()?;
                self.read_name_chars(&mut prefix)?;
            }
        }
        match self.input.next_char()? {
            Some(':') => Ok(prefix),
            Some(c) => Err(TurtleError::parse(
                line,
                column,
                format!("expected prefix name followed by ':', found '{c}'"),
            )),
            None => Err(self.eof()),
        }
    }

    /// Parse one `subject predicateObjectList .` statement.
    fn parse_statement(&mut self) -> Result<()> {
        let bracketed = self.input.peek()? == Some('[');
        let subject = self.parse_subject()?;
        let next = self.skip_ws()?;
        // `[ ex:p ex:o ] .` needs no predicate list
        if !(bracketed && next == Some('.')) {
            self.parse_predicate_object_list(&subject)?;
            self.skip_ws()?;
        }
        self.expect('.')
    }

    fn parse_subject(&mut self) -> Result<Subject> {
        let (line, column) = self.input.position();
        let term = self.parse_value()?;
        match term.to_subject() {
            Some(subject) => Ok(subject),
            None => Err(TurtleError::IllegalSubject {
                found: term.to_string(),
                line,
                column,
            }),
        }
    }

    /// `predicate objectList (';' predicate objectList)*`
    fn parse_predicate_object_list(&mut self, subject: &Subject) -> Result<()> {
        loop {
            let predicate = self.parse_predicate()?;
            self.skip_ws()?;
            self.parse_object_list(subject, &predicate)?;

            if self.skip_ws()? != Some(';') {
                return Ok(());
            }
            while self.skip_ws()? == Some(';') {
                self.input.next_char()?;
            }
            // a trailing ';' may close the list
            if matches!(self.skip_ws()?, Some('.') | Some(']') | None) {
                return Ok(());
            }
        }
    }

    fn parse_predicate(&mut self) -> Result<Iri> {
        let (line, column) = self.input.position();
        if self.input.peek()? == Some('a') {
            self.input.next_char()?;
            // `a` is the keyword unless it starts a prefixed name
            match self.input.peek()? {
                Some(c) if is_pn_chars(c) || c == ':' || c == '.' => self.input.unread('a'),
                _ => return Ok(self.vocab.rdf_type.clone()),
            }
        }
        match self.parse_value()? {
            Term::Iri(iri) => Ok(iri),
            other => Err(TurtleError::IllegalPredicate {
                found: other.to_string(),
                line,
                column,
            }),
        }
    }

    /// `object (',' object)*`, emitting one triple per object.
    fn parse_object_list(&mut self, subject: &Subject, predicate: &Iri) -> Result<()> {
        loop {
            let object = self.parse_value()?;
            self.emit(Triple::new(subject.clone(), predicate.clone(), object));
            if self.skip_ws()? != Some(',') {
                return Ok(());
            }
            self.input.next_char()?;
            self.skip_ws()?;
        }
    }

    /// Parse any term, dispatching on the next character.
    fn parse_value(&mut self) -> Result<Term> {
        match self.input.peek()? {
            None => Err(self.eof()),
            Some('<') => Ok(Term::Iri(self.parse_iri_ref()?)),
            Some('_') => Ok(Term::Blank(self.parse_blank_label()?)),
            Some('[') => self.parse_blank_node_property_list(),
            Some('(') => self.parse_collection(),
            Some(q @ ('"' | '\'')) => Ok(Term::Literal(self.parse_quoted_literal(q)?)),
            Some(c) if c.is_ascii_digit() || matches!(c, '.' | '+' | '-') => {
                Ok(Term::Literal(self.parse_number()?))
            }
            Some(c) if c == ':' || is_pn_chars_base(c) => self.parse_prefixed_name_or_boolean(),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
        }
    }

    /// `<iri>`, resolved against the current base.
    fn parse_iri_ref(&mut self) -> Result<Iri> {
        let (line, column) = self.input.position();
        if self.read()? != '<' {
            return Err(TurtleError::parse(line, column, "expected '<'"));
        }
        let mut text = String::new();
        loop {
            match self.read()? {
                '>' => break,
                '\\' => self.parse_escape(&mut text, false)?,
                c => text.push(c),
            }
        }
        self.resolve(&text, line, column)
    }

    fn resolve(&self, text: &str, line: usize, column: usize) -> Result<Iri> {
        let reference = Iri::parse(text).map_err(|source| TurtleError::Iri { line, column, source })?;
        let iri = match &self.base {
            Some(base) => base.resolve(&reference),
            None if reference.is_absolute() => reference,
            None => return Err(TurtleError::RelativeIri(text.to_string())),
        };
        Ok(if self.normalize {
            iri.normalize(&self.registry)
        } else {
            iri
        })
    }

    /// `prefix:local`, or the bare keywords `true` / `false`.
    fn parse_prefixed_name_or_boolean(&mut self) -> Result<Term> {
        let (line, column) = self.input.position();
        let mut prefix = String::new();
        if self.input.peek()? != Some(':') {
            prefix.push(self.read()?);
            self.read_name_chars(&mut prefix)?;
        }

        if self.input.peek()? != Some(':') {
            if prefix == "true" || prefix == "false" {
                return Ok(Term::Literal(Literal::typed(prefix, self.vocab.xsd_boolean.clone())));
            }
            return Err(TurtleError::parse(
                line,
                column,
                format!("expected ':' after '{prefix}'"),
            ));
        }
        self.input.next_char()?;

        let local = self.parse_local_name()?;
        let expanded = match self.context.expand(&prefix, &local) {
            Some(iri) => iri,
            None => return Err(TurtleError::UndefinedPrefix { prefix, line, column }),
        };
        Ok(Term::Iri(self.resolve(&expanded, line, column)?))
    }

    /// PN_LOCAL, with `%XX` kept verbatim and `\` escapes decoded.
    fn parse_local_name(&mut self) -> Result<String> {
        let mut local = String::new();
        loop {
            let (line, column) = self.input.position();
            let first = local.is_empty();
            match self.input.peek()? {
                Some('%') => {
                    self.input.next_char()?;
                    let hi = self.read()?;
                    let lo = self.read()?;
                    if !(hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit()) {
                        return Err(TurtleError::parse(
                            line,
                            column,
                            format!("invalid percent escape '%{hi}{lo}'"),
                        ));
                    }
                    local.push('%');
                    local.push(hi);
                    local.push(lo);
                }
                Some('\\') => {
                    self.input.next_char()?;
                    let c = self.read()?;
                    if is_pn_local_escape(c) {
                        local.push(c);
                    } else {
                        self.invalid_escape(&mut local, format!("\\{c}"), line, column)?;
                    }
                }
                Some(c) if first && is_pn_local_start(c) => {
                    local.push(c);
                    self.input.next_char()?;
                }
                Some(c) if !first && (is_pn_chars(c) || c == ':') => {
                    local.push(c);
                    self.input.next_char()?;
                }
                Some('.') if !first => {
                    self.input.next_char()?;
                    match self.input.peek()? {
                        Some(n) if is_pn_chars(n) || matches!(n, ':' | '%' | '\\') => local.push('.'),
                        _ => {
                            self.input.unread('.');
                            return Ok(local);
                        }
                    }
                }
                _ => return Ok(local),
            }
        }
    }

    /// `_:label`
    fn parse_blank_label(&mut self) -> Result<BlankNode> {
        let (line, column) = self.input.position();
        self.read()?; // '_'
        if self.read()? != ':' {
            return Err(TurtleError::parse(line, column, "expected ':' after '_'"));
        }
        let mut label = String::new();
        match self.input.peek()? {
            Some(c) if is_pn_chars_u(c) || c.is_ascii_digit() => {
                label.push(c);
                self.input.next_char()?;
            }
            _ => return Err(TurtleError::parse(line, column, "empty blank node label")),
        }
        self.read_name_chars(&mut label)?;
        Ok(self.blanks.labeled(&label))
    }

    /// Read PN_CHARS, plus dots followed by another name character.
    fn read_name_chars(&mut self, out: &mut String) -> Result<()> {
        loop {
            match self.input.peek()? {
                Some(c) if is_pn_chars(c) => {
                    out.push(c);
                    self.input.next_char()?;
                }
                Some('.') => {
                    self.input.next_char()?;
                    match self.input.peek()? {
                        Some(n) if is_pn_chars(n) => out.push('.'),
                        _ => {
                            self.input.unread('.');
                            return Ok(());
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// `[ predicateObjectList ]` or `[]`: a fresh node as the nested subject.
    fn parse_blank_node_property_list(&mut self) -> Result<Term> {
        self.read()?; // '['
        let node = self.blanks.fresh();
        if self.skip_ws()? == Some(']') {
            self.input.next_char()?;
            return Ok(Term::Blank(node));
        }
        let subject = Subject::Blank(node.clone());
        self.parse_predicate_object_list(&subject)?;
        self.skip_ws()?;
        self.expect(']')?;
        Ok(Term::Blank(node))
    }

    /// `( item* )`: `rdf:nil` when empty, else the head of a fresh
    /// `rdf:first` / `rdf:rest` chain.
    fn parse_collection(&mut self) -> Result<Term> {
        self.read()?; // '('
        if self.skip_ws()? == Some(')') {
            self.input.next_char()?;
            return Ok(Term::Iri(self.vocab.rdf_nil.clone()));
        }

        let head = self.blanks.fresh();
        let mut current = head.clone();
        loop {
            let item = self.parse_value()?;
            self.emit(Triple::new(current.clone(), self.vocab.rdf_first.clone(), item));
            match self.skip_ws()? {
                Some(')') => {
                    self.input.next_char()?;
                    break;
                }
                None => return Err(self.eof()),
                Some(_) => {}
            }
            let next = self.blanks.fresh();
            self.emit(Triple::new(current, self.vocab.rdf_rest.clone(), next.clone()));
            current = next;
        }
        self.emit(Triple::new(
            current,
            self.vocab.rdf_rest.clone(),
            self.vocab.rdf_nil.clone(),
        ));
        Ok(Term::Blank(head))
    }

    /// A quoted string with an optional `@lang` or `^^datatype`.
    fn parse_quoted_literal(&mut self, quote: char) -> Result<Literal> {
        let lexical = self.parse_quoted_string(quote)?;
        match self.input.peek()? {
            Some('@') => {
                self.input.next_char()?;
                let language = self.parse_language_tag()?;
                Ok(Literal::lang(lexical, language))
            }
            Some('^') => {
                self.input.next_char()?;
                self.expect('^')?;
                let (line, column) = self.input.position();
                match self.parse_value()? {
                    Term::Iri(datatype) => Ok(Literal::typed(lexical, datatype)),
                    other => Err(TurtleError::parse(
                        line,
                        column,
                        format!("datatype must be an IRI, found {other}"),
                    )),
                }
            }
            _ => Ok(Literal::plain(lexical)),
        }
    }

    fn parse_language_tag(&mut self) -> Result<String> {
        let (line, column) = self.input.position();
        let mut tag = String::new();
        while let Some(c) = self.input.peek()? {
            let allowed = c.is_ascii_alphabetic() || (!tag.is_empty() && (c == '-' || c.is_ascii_digit()));
            if !allowed {
                break;
            }
            tag.push(c);
            self.input.next_char()?;
        }
        if tag.is_empty() || tag.ends_with('-') {
            return Err(TurtleError::parse(
                line,
                column,
                format!("invalid language tag '{tag}'"),
            ));
        }
        Ok(tag)
    }

    /// Short `"..."` or long `"""..."""` string, escapes decoded.
    fn parse_quoted_string(&mut self, quote: char) -> Result<String> {
        self.read()?; // opening quote
        if self.input.peek()? == Some(quote) {
            self.input.next_char()?;
            if self.input.peek()? == Some(quote) {
                self.input.next_char()?;
                return self.parse_long_string(quote);
            }
            return Ok(String::new());
        }

        let mut value = String::new();
        loop {
            let (line, column) = self.input.position();
            match self.read()? {
                c if c == quote => return Ok(value),
                '\\' => self.parse_escape(&mut value, true)?,
                c @ ('\n' | '\r') => {
                    if self.strict {
                        return Err(TurtleError::parse(line, column, "line break in short string"));
                    }
                    tracing::warn!(line, column, "line break in short string");
                    value.push(c);
                }
                c => value.push(c),
            }
        }
    }

    /// Content after the opening `"""`. Quotes directly before the closing
    /// three belong to the value.
    fn parse_long_string(&mut self, quote: char) -> Result<String> {
        let mut value = String::new();
        loop {
            match self.read()? {
                '\\' => self.parse_escape(&mut value, true)?,
                c if c == quote => {
                    let mut run = 1;
                    while self.input.peek()? == Some(quote) {
                        self.input.next_char()?;
                        run += 1;
                    }
                    if run >= 3 {
                        value.extend(std::iter::repeat(quote).take(run - 3));
                        return Ok(value);
                    }
                    value.extend(std::iter::repeat(quote).take(run));
                }
                c => value.push(c),
            }
        }
    }

    /// Decode the escape following a backslash into `out`.
    ///
    /// IRIs only accept `\u` and `\U`.
    fn parse_escape(&mut self, out: &mut String, in_string: bool) -> Result<()> {
        let (line, column) = self.input.position();
        let c = self.read()?;
        let decoded = match c {
            'u' => return self.parse_unicode_escape(out, 'u', line, column),
            'U' => return self.parse_unicode_escape(out, 'U', line, column),
            _ if !in_string => None,
            't' => Some('\t'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            'b' => Some('\u{8}'),
            'f' => Some('\u{c}'),
            '"' => Some('"'),
            '\'' => Some('\''),
            '>' => Some('>'),
            '\\' => Some('\\'),
            _ => None,
        };
        match decoded {
            Some(d) => {
                out.push(d);
                Ok(())
            }
            None => self.invalid_escape(out, format!("\\{c}"), line, column),
        }
    }

    /// `\uXXXX` or `\UXXXXXXXX`. Digits are only consumed while they are hex.
    fn parse_unicode_escape(&mut self, out: &mut String, marker: char, line: usize, column: usize) -> Result<()> {
        let width = if marker == 'u' { 4 } else { 8 };
        let mut digits = String::with_capacity(width);
        while digits.len() < width {
            match self.input.peek()? {
                Some(c) if c.is_ascii_hexdigit() => {
                    digits.push(c);
                    self.input.next_char()?;
                }
                _ => break,
            }
        }
        let decoded = if digits.len() == width {
            u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
        } else {
            None
        };
        match decoded {
            Some(c) => {
                out.push(c);
                Ok(())
            }
            None => self.invalid_escape(out, format!("\\{marker}{digits}"), line, column),
        }
    }

    /// Strict: error. Lenient: log and keep the sequence verbatim.
    fn invalid_escape(&self, out: &mut String, sequence: String, line: usize, column: usize) -> Result<()> {
        if self.strict {
            return Err(TurtleError::InvalidEscape { sequence, line, column });
        }
        tracing::warn!(line, column, sequence = %sequence, "invalid escape sequence kept verbatim");
        out.push_str(&sequence);
        Ok(())
    }

    /// Integer, decimal or double; the datatype follows the lexical shape.
    fn parse_number(&mut self) -> Result<Literal> {
        let (line, column) = self.input.position();
        let mut text = String::new();
        if let Some(sign @ ('+' | '-')) = self.input.peek()? {
            text.push(sign);
            self.input.next_char()?;
        }
        let int_digits = self.read_digits(&mut text)?;
        let mut frac_digits = 0;
        let mut kind = NumberKind::Integer;

        if self.input.peek()? == Some('.') {
            self.input.next_char()?;
            match self.input.peek()? {
                Some(c) if c.is_ascii_digit() => {
                    text.push('.');
                    frac_digits = self.read_digits(&mut text)?;
                    kind = NumberKind::Decimal;
                }
                Some('e' | 'E') if int_digits > 0 => {
                    text.push('.');
                    kind = NumberKind::Decimal;
                }
                // statement terminator
                _ => self.input.unread('.'),
            }
        }

        if int_digits + frac_digits == 0 {
            return Err(TurtleError::parse(line, column, format!("invalid number '{text}'")));
        }

        if let Some(e @ ('e' | 'E')) = self.input.peek()? {
            text.push(e);
            self.input.next_char()?;
            if let Some(sign @ ('+' | '-')) = self.input.peek()? {
                text.push(sign);
                self.input.next_char()?;
            }
            if self.read_digits(&mut text)? == 0 {
                return Err(TurtleError::parse(
                    line,
                    column,
                    format!("exponent value missing in '{text}'"),
                ));
            }
            kind = NumberKind::Double;
        }

        let datatype = match kind {
            NumberKind::Integer => &self.vocab.xsd_integer,
            NumberKind::Decimal => &self.vocab.xsd_decimal,
            NumberKind::Double => &self.vocab.xsd_double,
        };
        Ok(Literal::typed(text, datatype.clone()))
    }

    fn read_digits(&mut self, out: &mut String) -> Result<usize> {
        let mut count = 0;
        while let Some(c) = self.input.peek()? {
            if !c.is_ascii_digit() {
                break;
            }
            out.push(c);
            self.input.next_char()?;
            count += 1;
        }
        Ok(count)
    }

    // =========================================================================
    // Cursor helpers
    // =========================================================================

    /// Skip whitespace and `#` comments; returns the next character.
    fn skip_ws(&mut self) -> Result<Option<char>> {
        loop {
            match self.input.peek()? {
                Some(c) if is_ws(c) => {
                    self.input.next_char()?;
                }
                Some('#') => {
                    while let Some(c) = self.input.next_char()? {
                        if c == '\n' || c == '\r' {
                            break;
                        }
                    }
                }
                other => return Ok(other),
            }
        }
    }

    fn read(&mut self) -> Result<char> {
        match self.input.next_char()? {
            Some(c) => Ok(c),
            None => Err(self.eof()),
        }
    }

    /// Consume `expected`. A mismatch fails in strict mode; otherwise it is
    /// logged and the offending character is left for the next production.
    fn expect(&mut self, expected: char) -> Result<()> {
        let found = self.input.peek()?;
        if found == Some(expected) {
            self.input.next_char()?;
            return Ok(());
        }
        let (line, column) = self.input.position();
        if self.strict {
            return Err(match found {
                Some(c) => TurtleError::parse(line, column, format!("expected '{expected}', found '{c}'")),
                None => TurtleError::UnexpectedEof { line, column },
            });
        }
        tracing::warn!(line, column, expected = %expected, found = ?found, "unexpected character");
        Ok(())
    }

    fn eof(&self) -> TurtleError {
        let (line, column) = self.input.position();
        TurtleError::UnexpectedEof { line, column }
    }

    fn error(&self, message: impl Into<String>) -> TurtleError {
        let (line, column) = self.input.position();
        TurtleError::parse(line, column, message)
    }
}

/// Parse a Turtle document with default options.
pub fn parse<S: TripleSink + ?Sized>(input: &str, sink: &mut S) -> Result<()> {
    TurtleReader::default().parse_str(input, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rdfstream_ir::{Graph, SinkEvent, TripleCollector};

    fn parse_to_graph(input: &str) -> Result<Graph> {
        let mut graph = Graph::new();
        parse(input, &mut graph)?;
        Ok(graph)
    }

    fn object(graph: &Graph) -> &Term {
        &graph.triples()[0].object
    }

    #[test]
    fn test_simple_triple() {
        let graph =
            parse_to_graph(r#"<http://example.org/alice> <http://xmlns.com/foaf/0.1/name> "Alice" ."#).unwrap();
        assert_eq!(
            graph.to_ntriples(),
            "<http://example.org/alice> <http://xmlns.com/foaf/0.1/name> \"Alice\" .\n"
        );
    }

    #[test]
    fn test_a_keyword() {
        let graph = parse_to_graph(
            "@prefix ex: <http://example.org/> .\nex:alice a ex:Person .",
        )
        .unwrap();
        assert_eq!(graph.triples()[0].predicate.as_str(), rdf::TYPE);
    }

    #[test]
    fn test_a_keyword_before_delimiters() {
        let graph = parse_to_graph(
            "@prefix ex: <http://example.org/> .\n\
             ex:s a<http://example.org/C> .\n\
             ex:t a[ ex:p 1 ] .\n\
             ex:u a\"lit\" .\n\
             ex:v a(ex:x) .",
        )
        .unwrap();
        let types = graph
            .iter()
            .filter(|t| t.predicate.as_str() == rdf::TYPE)
            .count();
        assert_eq!(types, 4);
        assert_eq!(graph.triples()[0].object, Term::Iri(Iri::parse("http://example.org/C").unwrap()));
    }

    #[test]
    fn test_prefix_named_a() {
        let graph = parse_to_graph(
            "@prefix a: <http://example.org/a#> .\na:s a:p a:o .",
        )
        .unwrap();
        assert_eq!(graph.triples()[0].predicate.as_str(), "http://example.org/a#p");
    }

    #[test]
    fn test_semicolon_and_comma() {
        let graph = parse_to_graph(
            r#"@prefix ex: <http://example.org/> .
               ex:alice ex:knows ex:bob, ex:carol ;
                        ex:age 30 ; ."#,
        )
        .unwrap();
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_numbers() {
        let cases = [
            ("30", "30", xsd::INTEGER),
            ("-5", "-5", xsd::INTEGER),
            ("+1.5", "+1.5", xsd::DECIMAL),
            (".5", ".5", xsd::DECIMAL),
            ("1e10", "1e10", xsd::DOUBLE),
            ("1.5E-3", "1.5E-3", xsd::DOUBLE),
        ];
        for (input, lexical, datatype) in cases {
            let doc = format!("<http://e/s> <http://e/p> {input} .");
            let graph = parse_to_graph(&doc).unwrap();
            let lit = object(&graph).as_literal().unwrap();
            assert_eq!(lit.lexical(), lexical, "{input}");
            assert!(lit.has_datatype(datatype), "{input}");
        }
    }

    #[test]
    fn test_integer_before_terminator() {
        let graph = parse_to_graph("<http://e/s> <http://e/p> 42.").unwrap();
        let lit = object(&graph).as_literal().unwrap();
        assert_eq!(lit.lexical(), "42");
        assert!(lit.has_datatype(xsd::INTEGER));
    }

    #[test]
    fn test_booleans() {
        let graph = parse_to_graph("<http://e/s> <http://e/p> true, false .").unwrap();
        for t in graph.iter() {
            assert!(t.object.as_literal().unwrap().has_datatype(xsd::BOOLEAN));
        }
    }

    #[test]
    fn test_language_and_datatype() {
        let graph = parse_to_graph(
            r#"@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
               <http://e/s> <http://e/p> "chat"@fr, "2000-01-01"^^xsd:date, "x"^^<http://e/dt> ."#,
        )
        .unwrap();
        let lits: Vec<&Literal> = graph.iter().filter_map(|t| t.object.as_literal()).collect();
        assert_eq!(lits[0].language(), Some("fr"));
        assert!(lits[1].has_datatype("http://www.w3.org/2001/XMLSchema#date"));
        assert!(lits[2].has_datatype("http://e/dt"));
    }

    #[test]
    fn test_escapes() {
        let graph = parse_to_graph(r#"<http://e/s> <http://e/p> "a\tb\n\"q\" é\U0001F600" ."#).unwrap();
        assert_eq!(object(&graph).as_literal().unwrap().lexical(), "a\tb\n\"q\" é😀");
    }

    #[test]
    fn test_long_string() {
        let graph = parse_to_graph("<http://e/s> <http://e/p> \"\"\"line one\nsays \"hi\"\"\"\" .").unwrap();
        assert_eq!(
            object(&graph).as_literal().unwrap().lexical(),
            "line one\nsays \"hi\""
        );
    }

    #[test]
    fn test_empty_string() {
        let graph = parse_to_graph(r#"<http://e/s> <http://e/p> "" ."#).unwrap();
        assert_eq!(object(&graph).as_literal().unwrap().lexical(), "");
    }

    #[test]
    fn test_bad_escape_lenient_keeps_backslash() {
        let graph = parse_to_graph(r#"<http://e/s> <http://e/p> "a\qb" ."#).unwrap();
        assert_eq!(object(&graph).as_literal().unwrap().lexical(), "a\\qb");
    }

    #[test]
    fn test_bad_escape_strict_fails() {
        let mut reader = TurtleReader::new(TurtleReaderOptions::new().with_strict(true));
        let err = reader
            .parse_str(r#"<http://e/s> <http://e/p> "a\qb" ."#, &mut Graph::new())
            .unwrap_err();
        assert!(matches!(err, TurtleError::InvalidEscape { ref sequence, .. } if sequence == "\\q"));
    }

    #[test]
    fn test_bad_unicode_escape() {
        let graph = parse_to_graph(r#"<http://e/s> <http://e/p> "\u00zz" ."#).unwrap();
        assert_eq!(object(&graph).as_literal().unwrap().lexical(), "\\u00zz");

        let mut reader = TurtleReader::new(TurtleReaderOptions::new().with_strict(true));
        assert!(reader
            .parse_str(r#"<http://e/s> <http://e/p> "\u00zz" ."#, &mut Graph::new())
            .is_err());
    }

    #[test]
    fn test_missing_dot_lenient() {
        let graph = parse_to_graph("<http://e/s> <http://e/p> <http://e/o>\n<http://e/s> <http://e/q> 1 .").unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_missing_dot_strict() {
        let mut reader = TurtleReader::new(TurtleReaderOptions::new().with_strict(true));
        let err = reader
            .parse_str("<http://e/s> <http://e/p> <http://e/o>\n<http://e/s> <http://e/q> 1 .", &mut Graph::new())
            .unwrap_err();
        assert_eq!(err.position(), Some((2, 1)));
    }

    #[test]
    fn test_base_resolution() {
        let graph = parse_to_graph(
            r#"@base <http://example.org/path/> .
               <alice> <name> "Alice" .
               <../bob> <name> "Bob" .
               @base <sub/> .
               <carol> <name> "Carol" ."#,
        )
        .unwrap();
        let subjects: Vec<String> = graph.iter().map(|t| t.subject.to_string()).collect();
        assert_eq!(
            subjects,
            vec![
                "<http://example.org/path/alice>",
                "<http://example.org/bob>",
                "<http://example.org/path/sub/carol>",
            ]
        );
    }

    #[test]
    fn test_relative_without_base() {
        let err = parse_to_graph("<a> <b> <c> .").unwrap_err();
        assert!(matches!(err, TurtleError::RelativeIri(ref s) if s == "a"));
    }

    #[test]
    fn test_base_from_options() {
        let base = Iri::parse("http://example.org/doc").unwrap();
        let mut reader = TurtleReader::new(TurtleReaderOptions::new().with_base(base));
        let mut graph = Graph::new();
        reader.parse_str("<> <#p> <other> .", &mut graph).unwrap();
        assert_eq!(
            graph.to_ntriples(),
            "<http://example.org/doc> <http://example.org/doc#p> <http://example.org/other> .\n"
        );
    }

    #[test]
    fn test_context_from_options() {
        let context = NamespaceContext::common();
        let mut reader = TurtleReader::new(TurtleReaderOptions::new().with_context(context));
        let mut graph = Graph::new();
        reader
            .parse_str("<http://e/s> rdfs:label \"x\" .", &mut graph)
            .unwrap();
        assert_eq!(graph.triples()[0].predicate.as_str(), rdfstream_vocab::rdfs::LABEL);
    }

    #[test]
    fn test_normalize_iris() {
        let mut reader = TurtleReader::new(TurtleReaderOptions::new().with_normalize_iris(true));
        let mut graph = Graph::new();
        reader
            .parse_str("<HTTP://Example.ORG:80/a/./b> <http://e/p> <http://e/o> .", &mut graph)
            .unwrap();
        assert_eq!(graph.triples()[0].subject.to_string(), "<http://example.org/a/b>");
    }

    #[test]
    fn test_local_name_forms() {
        let graph = parse_to_graph(
            r#"@prefix ex: <http://example.org/> .
               ex:a.b ex:p%41 ex:c\~d .
               : ex:p ex:1x ."#,
        );
        // the empty prefix is not declared
        assert!(matches!(graph, Err(TurtleError::UndefinedPrefix { ref prefix, .. }) if prefix.is_empty()));

        let graph = parse_to_graph(
            r#"@prefix ex: <http://example.org/> .
               ex:a.b ex:p%41 ex:c\~d."#,
        )
        .unwrap();
        assert_eq!(
            graph.to_ntriples(),
            "<http://example.org/a.b> <http://example.org/p%41> <http://example.org/c~d> .\n"
        );
    }

    #[test]
    fn test_undefined_prefix() {
        let err = parse_to_graph("ex:s ex:p ex:o .").unwrap_err();
        assert!(matches!(err, TurtleError::UndefinedPrefix { ref prefix, line: 1, column: 1 } if prefix == "ex"));
    }

    #[test]
    fn test_literal_subject_is_illegal() {
        let err = parse_to_graph(r#""s" <http://e/p> <http://e/o> ."#).unwrap_err();
        assert!(matches!(err, TurtleError::IllegalSubject { .. }));
    }

    #[test]
    fn test_blank_predicate_is_illegal() {
        let err = parse_to_graph("<http://e/s> _:p <http://e/o> .").unwrap_err();
        assert!(matches!(err, TurtleError::IllegalPredicate { .. }));
    }

    #[test]
    fn test_unknown_directive() {
        let err = parse_to_graph("@foo <http://e/> .").unwrap_err();
        assert!(matches!(err, TurtleError::UnknownDirective(ref d) if d == "foo"));
    }

    #[test]
    fn test_unexpected_eof() {
        let err = parse_to_graph("<http://e/s> <http://e/p> ").unwrap_err();
        assert!(matches!(err, TurtleError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_comments() {
        let graph = parse_to_graph(
            "# leading\n<http://e/s> <http://e/p> <http://e/o#frag> . # trailing\n# end",
        )
        .unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(object(&graph).as_iri().unwrap().fragment(), Some("frag"));
    }

    #[test]
    fn test_prefix_events() {
        let mut sink = TripleCollector::new();
        parse("@prefix ex: <http://example.org/> .\n@PREFIX : <http://d/> .", &mut sink).unwrap();
        assert_eq!(
            sink.events(),
            &[
                SinkEvent::StartPrefixMapping {
                    prefix: "ex".into(),
                    uri: "http://example.org/".into()
                },
                SinkEvent::StartPrefixMapping {
                    prefix: "".into(),
                    uri: "http://d/".into()
                },
            ]
        );
    }

    #[test]
    fn test_bom_is_skipped() {
        let graph = parse_to_graph("\u{FEFF}<http://e/s> <http://e/p> 1 .").unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_triple_count() {
        let mut reader = TurtleReader::default();
        reader
            .parse_str("<http://e/s> <http://e/p> (1 2) .", &mut Graph::new())
            .unwrap();
        // head link plus two first/rest pairs
        assert_eq!(reader.triple_count(), 5);
    }
}

//! Error types for RDF/XML reading and writing

use rdfstream_iri::IriError;

/// Error type for RDF/XML operations
#[derive(Debug, thiserror::Error)]
pub enum RdfXmlError {
    /// Underlying stream failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tokenizer error (malformed XML, mismatched end tag, bad attribute)
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Element or attribute name that is not UTF-8
    #[error("Invalid UTF-8 in XML name: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// More than one of `rdf:about`, `rdf:nodeID`, `rdf:ID` on a node element
    #[error("Ambiguous subject on <{element}>: both {first} and {second} given")]
    AmbiguousSubject {
        element: String,
        first: &'static str,
        second: &'static str,
    },

    /// Both `rdf:resource` and `rdf:nodeID` on a property element
    #[error("Ambiguous object on <{element}>: both rdf:resource and rdf:nodeID given")]
    AmbiguousObject { element: String },

    /// Node where a property is expected, or the reverse
    #[error("Invalid RDF/XML structure: {0}")]
    Structure(String),

    /// Prefix used in an element or attribute name without a declaration
    #[error("Undeclared namespace prefix '{0}'")]
    UndeclaredPrefix(String),

    /// IRI text that could not be parsed even after repair
    #[error("Invalid IRI '{value}': {source}")]
    Iri {
        value: String,
        #[source]
        source: IriError,
    },

    /// Predicate IRI that cannot be split into namespace and XML local name
    #[error("Predicate <{0}> cannot be written as an XML element name")]
    InvalidPredicate(String),

    /// Literal containing a character XML 1.0 cannot represent
    #[error("Literal {0:?} contains a character not allowed in XML")]
    InvalidLiteral(String),
}

/// Result type for RDF/XML operations
pub type Result<T> = std::result::Result<T, RdfXmlError>;

impl RdfXmlError {
    /// Create a structure error
    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure(message.into())
    }
}

//! Error types for Turtle reading

use rdfstream_iri::IriError;

/// Error type for Turtle parsing operations
#[derive(Debug, thiserror::Error)]
pub enum TurtleError {
    /// Underlying stream failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected character or malformed construct
    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// Input ended inside a statement
    #[error("Unexpected end of input at line {line}, column {column}")]
    UnexpectedEof { line: usize, column: usize },

    /// Prefix not declared
    #[error("Undefined prefix '{prefix}' at line {line}, column {column}")]
    UndefinedPrefix {
        prefix: String,
        line: usize,
        column: usize,
    },

    /// Invalid escape sequence in a string, IRI or local name
    #[error("Invalid escape sequence '{sequence}' at line {line}, column {column}")]
    InvalidEscape {
        sequence: String,
        line: usize,
        column: usize,
    },

    /// IRI text rejected by the IRI parser
    #[error("Invalid IRI at line {line}, column {column}: {source}")]
    Iri {
        line: usize,
        column: usize,
        #[source]
        source: IriError,
    },

    /// Relative IRI with no base in scope
    #[error("Relative IRI <{0}> without a base IRI")]
    RelativeIri(String),

    /// A literal in subject position
    #[error("Illegal subject at line {line}, column {column}: {found}")]
    IllegalSubject {
        found: String,
        line: usize,
        column: usize,
    },

    /// A literal or blank node in predicate position
    #[error("Illegal predicate at line {line}, column {column}: {found}")]
    IllegalPredicate {
        found: String,
        line: usize,
        column: usize,
    },

    /// `@` followed by something other than `prefix` or `base`
    #[error("Unknown directive '@{0}'")]
    UnknownDirective(String),
}

/// Result type for Turtle operations
pub type Result<T> = std::result::Result<T, TurtleError>;

impl TurtleError {
    /// Create a parse error
    pub fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    /// Line and column the error refers to, when known
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            Self::Parse { line, column, .. }
            | Self::UnexpectedEof { line, column }
            | Self::UndefinedPrefix { line, column, .. }
            | Self::InvalidEscape { line, column, .. }
            | Self::Iri { line, column, .. }
            | Self::IllegalSubject { line, column, .. }
            | Self::IllegalPredicate { line, column, .. } => Some((*line, *column)),
            Self::Io(_) | Self::RelativeIri(_) | Self::UnknownDirective(_) => None,
        }
    }
}

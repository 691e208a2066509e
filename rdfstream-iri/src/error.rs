//! Error types for IRI parsing and construction

/// The IRI component a syntax error was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Scheme,
    UserInfo,
    Host,
    Port,
    Path,
    Query,
    Fragment,
}

impl std::fmt::Display for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Component::Scheme => "scheme",
            Component::UserInfo => "userinfo",
            Component::Host => "host",
            Component::Port => "port",
            Component::Path => "path",
            Component::Query => "query",
            Component::Fragment => "fragment",
        };
        f.write_str(name)
    }
}

/// Error type for IRI operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IriError {
    /// A character outside the component's allowed profile
    #[error("invalid character {character:?} at offset {position} in {component} of '{value}'")]
    Syntax {
        component: Component,
        value: String,
        character: char,
        position: usize,
    },

    /// Port is not a number in 0..=65535
    #[error("invalid port '{0}'")]
    InvalidPort(String),

    /// Authority could not be split into userinfo, host and port
    #[error("invalid authority '{0}'")]
    InvalidAuthority(String),

    /// An operation that needs a scheme was given a relative reference
    #[error("IRI '{0}' has no scheme")]
    MissingScheme(String),
}

/// Error type for punycode and nameprep
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdnaError {
    /// Arithmetic overflow while encoding or decoding
    #[error("punycode overflow")]
    Overflow,

    /// Input is not valid punycode
    #[error("bad punycode input: {0}")]
    BadInput(String),

    /// Nameprep output contains a prohibited code point
    #[error("prohibited code point U+{0:04X}")]
    Prohibited(u32),

    /// Label violates the STD3 ASCII or length rules
    #[error("invalid label '{0}'")]
    InvalidLabel(String),
}

/// Result type for IRI operations
pub type Result<T> = std::result::Result<T, IriError>;

impl IriError {
    /// Create a syntax error for a component
    pub fn syntax(component: Component, value: &str, character: char, position: usize) -> Self {
        Self::Syntax {
            component,
            value: value.to_string(),
            character,
            position,
        }
    }
}

//! Unified error type shared by the parsers, the DOM builder, and the XPath engine.

use std::fmt;

/// A single taxonomy for every failure the runtime can produce.
///
/// No layer recovers internally: an error propagates to the nearest caller,
/// and any DOM construction in progress for the current call is abandoned.
#[derive(Debug, Clone, PartialEq)]
pub enum HvmlError {
    /// The underlying stream returned a failure (only relevant to `load_from_stream`).
    Io(String),
    /// A byte was rejected in the current parser state.
    Syntax(SyntaxError),
    /// A structural rule failed (mismatched end tag, attribute outside a tag, etc.).
    Structure(String),
    /// Allocation failure.
    Resource(String),
    /// A malformed XPath query string.
    XPathParse(String),
    /// An XPath evaluation hit an unsupported axis/function or an impossible coercion.
    XPathEval(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub line: usize,
    pub col: usize,
    pub state: &'static str,
    pub trail: String,
    pub found: Option<char>,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.found {
            Some(c) => write!(
                f,
                "syntax error at {}:{} in state {}: unexpected '{}' (trail: {:?})",
                self.line, self.col, self.state, c, self.trail
            ),
            None => write!(
                f,
                "syntax error at {}:{} in state {}: unexpected end of input (trail: {:?})",
                self.line, self.col, self.state, self.trail
            ),
        }
    }
}

impl fmt::Display for HvmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HvmlError::Io(msg) => write!(f, "I/O error: {}", msg),
            HvmlError::Syntax(e) => write!(f, "{}", e),
            HvmlError::Structure(msg) => write!(f, "structure error: {}", msg),
            HvmlError::Resource(msg) => write!(f, "resource error: {}", msg),
            HvmlError::XPathParse(msg) => write!(f, "xpath parse error: {}", msg),
            HvmlError::XPathEval(msg) => write!(f, "xpath evaluation error: {}", msg),
        }
    }
}

impl std::error::Error for HvmlError {}

impl From<std::io::Error> for HvmlError {
    fn from(e: std::io::Error) -> Self {
        HvmlError::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HvmlError>;

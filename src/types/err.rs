/*!
Error types used in the library.

- Some of these are internally expected --- e.g. a [LimitError] is used to end a search early, and is not a failure of the search.
- Failed unification, failed matching, and Mace propagation contradictions are *not* errors; they are ordinary return values of the operations concerned.
- A [FatalError] marks a broken invariant --- e.g. a justification referencing a parent id missing from its proof --- and carries a message locating the problem.
*/

/// A union of the varied error kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorKind {
    /// An error related to parsing.
    Parse(ParseError),

    /// An error from the symbol table.
    Symbol(SymbolError),

    /// An unknown flag or parameter name in an option command.
    UnrecognizedOption(String),

    /// A soft limit was reached; the search ended early.
    Limit(LimitError),

    /// A broken invariant.
    Fatal(FatalError),
}

/// Errors during parsing.
///
/// Each variant carries the byte offset at which the problem was noticed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// An unexpected token, with a note on what was expected instead.
    Unexpected { at: usize, expected: &'static str },

    /// The input ended where more was required.
    EarlyEnd { at: usize },

    /// A quoted symbol with no closing quote.
    UnclosedQuote { at: usize },

    /// An operator was used in a way its declared fixity does not allow.
    BadFixity { at: usize },

    /// A list was tagged with an unknown name (not sos, usable, goals, …).
    UnknownList { at: usize },
}

impl From<ParseError> for ErrorKind {
    fn from(e: ParseError) -> Self {
        ErrorKind::Parse(e)
    }
}

/// Errors from the symbol table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SymbolError {
    /// A symbol was used with two incompatible arities in a setting which requires one.
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

impl From<SymbolError> for ErrorKind {
    fn from(e: SymbolError) -> Self {
        ErrorKind::Symbol(e)
    }
}

/// A soft limit was reached.
///
/// Searches return this to distinguish "gave up" from "exhausted", and the limit hit decides the process exit code.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LimitError {
    /// The cpu-seconds budget was used up.
    MaxSeconds,

    /// The memory budget was used up.
    MaxMegs,

    /// The requested number of proofs was found.
    MaxProofs,

    /// The requested number of models was found.
    MaxModels,

    /// Cancellation was requested through the termination callback.
    Interrupted,
}

impl From<LimitError> for ErrorKind {
    fn from(e: LimitError) -> Self {
        ErrorKind::Limit(e)
    }
}

/// A broken invariant, with a message locating the problem.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FatalError {
    pub message: String,
}

impl FatalError {
    pub fn new(message: impl Into<String>) -> Self {
        FatalError {
            message: message.into(),
        }
    }
}

impl From<FatalError> for ErrorKind {
    fn from(e: FatalError) -> Self {
        ErrorKind::Fatal(e)
    }
}

impl std::fmt::Display for FatalError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Fatal error: {}", self.message)
    }
}

/// Shorthand for building a fatal [ErrorKind] at a named location.
pub fn fatal(message: impl Into<String>) -> ErrorKind {
    ErrorKind::Fatal(FatalError::new(message))
}

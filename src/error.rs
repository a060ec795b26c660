//! Error types for the Jung interpreter.
//!
//! This module defines all error types used throughout the crate,
//! providing rich error information including source locations.
//!
//! # Error Categories
//!
//! - [`LexError`]: errors during tokenization (fatal)
//! - [`ParseError`]: errors during parsing (fatal, no recovery)
//! - [`RuntimeError`]: errors during evaluation; catchable when they
//!   occur inside a `try` block
//!
//! # Example
//!
//! ```rust
//! use jung::error::ParseError;
//! use jung::ast::Span;
//!
//! let error = ParseError::UnexpectedToken {
//!     expected: "expression".to_string(),
//!     found: "'}'".to_string(),
//!     span: Span::new(10, 11, 1, 11),
//! };
//!
//! assert!(error.to_string().contains("expected expression"));
//! ```

use crate::ast::Span;
use thiserror::Error;

/// Errors that can occur during lexical analysis.
///
/// These errors are produced by the [`Lexer`](crate::lexer::Lexer) when
/// it encounters invalid or unexpected input. Lex errors are fatal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    /// An unexpected character was encountered.
    #[error("unexpected character '{ch}' at line {}, column {}", span.line, span.column)]
    UnexpectedChar {
        /// The unexpected character
        ch: char,
        /// Location in the source
        span: Span,
    },

    /// A string literal was not properly terminated.
    #[error("unterminated string literal starting at line {}, column {}", span.line, span.column)]
    UnterminatedString {
        /// Location of the opening quote
        span: Span,
    },

    /// A `${` interpolation region was not closed before the string ended.
    #[error("unterminated interpolation starting at line {}, column {}", span.line, span.column)]
    UnterminatedInterpolation {
        /// Location of the `${` opener
        span: Span,
    },
}

impl LexError {
    /// Returns the source span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::UnterminatedInterpolation { span } => *span,
        }
    }
}

/// Errors that can occur during parsing.
///
/// These errors are produced by the [`Parser`](crate::parser::Parser)
/// when the token stream does not match the grammar. There is no error
/// recovery; the first parse error aborts the run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// An unexpected token was encountered.
    #[error("expected {expected}, found {found} at line {}, column {}", span.line, span.column)]
    UnexpectedToken {
        /// Description of what was expected
        expected: String,
        /// Description of what was found
        found: String,
        /// Location of the unexpected token
        span: Span,
    },

    /// Unexpected end of file.
    #[error("unexpected end of file at line {}, column {}: {context}", span.line, span.column)]
    UnexpectedEof {
        /// Context about what was being parsed
        context: String,
        /// Location at end of file
        span: Span,
    },

    /// An expression was required but none could be parsed.
    #[error("expected expression, found {found} at line {}, column {}", span.line, span.column)]
    ExpectedExpression {
        /// Description of what was found instead
        found: String,
        /// Location of the offending token
        span: Span,
    },

    /// A lexer error occurred during parsing.
    #[error("lexer error: {0}")]
    LexerError(#[from] LexError),
}

impl ParseError {
    /// Returns the source span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedEof { span, .. } => *span,
            ParseError::ExpectedExpression { span, .. } => *span,
            ParseError::LexerError(lex_err) => lex_err.span(),
        }
    }
}

/// Errors that can occur during evaluation.
///
/// Inside a `try` block, a runtime error converts to a catchable
/// exception string prefixed with its source line; outside, it aborts
/// the run with a non-zero exit status.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// A name was referenced that no scope, global, or registry defines.
    #[error("undefined variable '{name}'")]
    UndefinedVariable {
        /// The unresolved name
        name: String,
        /// Location of the reference
        span: Span,
    },

    /// A call named a function that does not exist.
    #[error("undefined function '{name}'")]
    UndefinedFunction {
        /// The unresolved name
        name: String,
        /// Location of the call
        span: Span,
    },

    /// A constructor named a class that does not exist.
    #[error("undefined class '{name}'")]
    UndefinedClass {
        /// The unresolved name
        name: String,
        /// Location of the constructor
        span: Span,
    },

    /// An operator or builtin received operands of the wrong kind.
    #[error("type error: {message}")]
    TypeError {
        /// What went wrong
        message: String,
        /// Location of the operation
        span: Span,
    },

    /// Division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero {
        /// Location of the operation
        span: Span,
    },

    /// The call-depth bound was exceeded.
    #[error("stack overflow: call depth exceeded {depth}")]
    StackOverflow {
        /// The configured depth bound
        depth: usize,
        /// Location of the call that overflowed
        span: Span,
    },

    /// A builtin was called with the wrong number of arguments.
    #[error("{name} expects {expected} argument(s), got {got}")]
    ArityMismatch {
        /// The builtin or function name
        name: String,
        /// Description of the expected count
        expected: String,
        /// The actual count
        got: usize,
        /// Location of the call
        span: Span,
    },

    /// A method was dispatched on a receiver kind that does not have it.
    #[error("no method '{method}' on {kind}")]
    NoSuchMethod {
        /// The method name
        method: String,
        /// The receiver's type name
        kind: &'static str,
        /// Location of the call
        span: Span,
    },

    /// A file could not be read or written.
    #[error("io error: {message}")]
    Io {
        /// The host error text
        message: String,
        /// Location of the operation
        span: Span,
    },

    /// The distinct-import bound was exceeded.
    #[error("too many imports (limit {limit})")]
    TooManyImports {
        /// The configured import bound
        limit: usize,
        /// Location of the import statement
        span: Span,
    },

    /// An imported file failed to load or parse.
    #[error("import '{path}' failed: {message}")]
    ImportFailed {
        /// The imported path
        path: String,
        /// Why the import failed
        message: String,
        /// Location of the import statement
        span: Span,
    },

    /// `break` or `continue` outside a loop, or `return` outside a function.
    #[error("{keyword} outside {context}")]
    StrayControlFlow {
        /// The misplaced keyword
        keyword: &'static str,
        /// Where the keyword would have been legal
        context: &'static str,
        /// Location of the statement
        span: Span,
    },
}

/// A top-level failure of a whole run.
///
/// This is what the embedding entry points ([`crate::run_source`] and
/// friends) return: either phase error, or an exception that no `try`
/// in the program caught.
#[derive(Error, Debug)]
pub enum JungError {
    /// The source failed to lex or parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Evaluation failed outside any `try` block.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// A thrown value reached the top level uncaught.
    #[error("Uncaught exception: {0}")]
    Uncaught(String),
}

impl RuntimeError {
    /// Returns the source span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            RuntimeError::UndefinedVariable { span, .. }
            | RuntimeError::UndefinedFunction { span, .. }
            | RuntimeError::UndefinedClass { span, .. }
            | RuntimeError::TypeError { span, .. }
            | RuntimeError::DivisionByZero { span }
            | RuntimeError::StackOverflow { span, .. }
            | RuntimeError::ArityMismatch { span, .. }
            | RuntimeError::NoSuchMethod { span, .. }
            | RuntimeError::Io { span, .. }
            | RuntimeError::TooManyImports { span, .. }
            | RuntimeError::ImportFailed { span, .. }
            | RuntimeError::StrayControlFlow { span, .. } => *span,
        }
    }

    /// Renders this error as a catchable exception message.
    ///
    /// The message is prefixed with the source line so a catch handler
    /// can tell where the failure originated.
    pub fn to_exception_message(&self) -> String {
        format!("line {}: {}", self.span().line, self)
    }
}

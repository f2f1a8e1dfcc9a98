//! Regex to DFA compiler built from textbook parts.
//!
//! The pipeline runs strictly forward:
//!
//! 1. [`postfix`] makes concatenation explicit and converts the infix pattern
//!    to postfix with a shunting-yard pass.
//! 2. [`compiler`] interprets the postfix stream as a stack machine over
//!    Thompson fragments and produces an [`Nfa`].
//! 3. [`determinize`] runs subset construction over an [`Alphabet`] and
//!    produces a [`Dfa`].
//! 4. [`matcher`] walks the DFA over an input and reports whether the whole
//!    input is accepted.
//!
//! Every stage owns its own state arena, so independent compilations never
//! share identities and may run on different threads.

#[macro_use]
mod macros;

pub mod compiler;
pub mod determinize;
pub mod dfa;
pub mod matcher;
pub mod nfa;
pub mod postfix;
pub mod state_set;

use std::fmt;

pub use compiler::{build, Compiler};
pub use determinize::{determinize, epsilon_closure, move_on, Alphabet, Determinizer};
pub use dfa::{Dfa, DfaState, DfaStateId};
pub use matcher::{accepts, Matcher};
pub use nfa::{Fragment, Nfa, State, StateId, Transition};
pub use postfix::{insert_concatenation, to_postfix, tokenize, Parser, Postfix, Token, TokenKind};
pub use state_set::StateSet;

/// The result of any stage of the pipeline.
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that can occur during compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The pattern or postfix text is malformed
    Syntax(SyntaxError),
    /// An automaton was about to be built in a broken shape
    InvariantViolation(String),
    /// Determinization discovered more DFA states than the configured limit
    TooComplex { limit: usize },
}

impl CompileError {
    pub(crate) fn syntax(kind: SyntaxErrorKind, position: usize) -> Self {
        CompileError::Syntax(SyntaxError { kind, position })
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        CompileError::InvariantViolation(msg.into())
    }

    /// Returns the syntax error, if this is one.
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            CompileError::Syntax(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Syntax(err) => write!(f, "syntax error: {}", err),
            CompileError::InvariantViolation(msg) => write!(f, "invariant violation: {}", msg),
            CompileError::TooComplex { limit } => {
                write!(f, "automaton exceeds the limit of {} DFA states", limit)
            }
        }
    }
}

impl std::error::Error for CompileError {}

impl From<SyntaxError> for CompileError {
    fn from(err: SyntaxError) -> Self {
        CompileError::Syntax(err)
    }
}

/// A malformed pattern, with the character offset where it went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    /// Zero-based character offset into the text that was being parsed.
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A backslash with nothing after it
    DanglingEscape,
    /// A `(` that is never closed
    UnmatchedOpenParen,
    /// A `)` with no `(` before it
    UnmatchedCloseParen,
    /// `()` with nothing inside
    EmptyGroup,
    /// A token that is not an operator of the postfix language
    UnknownOperator(char),
    /// An operator found fewer fragments on the stack than it needs
    MissingOperand(char),
    /// The postfix program left more than one fragment on the stack
    DanglingOperands(usize),
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SyntaxErrorKind::DanglingEscape => write!(f, "dangling escape")?,
            SyntaxErrorKind::UnmatchedOpenParen => write!(f, "unmatched '('")?,
            SyntaxErrorKind::UnmatchedCloseParen => write!(f, "unmatched ')'")?,
            SyntaxErrorKind::EmptyGroup => write!(f, "empty group")?,
            SyntaxErrorKind::UnknownOperator(op) => write!(f, "unknown operator '{}'", op)?,
            SyntaxErrorKind::MissingOperand(op) => write!(f, "operator '{}' is missing an operand", op)?,
            SyntaxErrorKind::DanglingOperands(n) => {
                write!(f, "{} fragments left over, expected exactly one", n)?
            }
        }
        write!(f, " at position {}", self.position)
    }
}

impl std::error::Error for SyntaxError {}

/// Runs the whole pipeline with default settings.
///
/// The alphabet is the sorted set of symbols that label NFA edges.
pub fn compile(pattern: &str) -> CompileResult<Dfa> {
    let postfix = Parser::new().parse(pattern)?;
    let nfa = Compiler::new().compile(&postfix)?;
    determinize(&nfa, &Alphabet::of(&nfa))
}

/// Compiles `pattern` and checks whether it matches all of `input`.
pub fn is_match(pattern: &str, input: &str) -> CompileResult<bool> {
    let dfa = compile(pattern)?;
    Ok(accepts(&dfa, input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CompileError::syntax(SyntaxErrorKind::UnmatchedCloseParen, 1);
        assert_eq!(err.to_string(), "syntax error: unmatched ')' at position 1");

        let err = CompileError::TooComplex { limit: 8 };
        assert_eq!(err.to_string(), "automaton exceeds the limit of 8 DFA states");
    }

    #[test]
    fn test_compile_and_match() {
        assert_eq!(is_match("ab*", "abbb"), Ok(true));
        assert_eq!(is_match("ab*", "ba"), Ok(false));

        let err = compile("(a").unwrap_err();
        let syntax = err.as_syntax().unwrap();
        assert_eq!(syntax.kind, SyntaxErrorKind::UnmatchedOpenParen);
        assert_eq!(syntax.position, 0);
    }
}

#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Error taxonomy for the whole pipeline.
//!
//! Malformed input and engine failures are fatal and surface here as `Err`.
//! Theory conflicts are not errors at all; they stay internal to the
//! refinement loop. Running out of rounds is its own variant so callers can
//! tell resource exhaustion apart from a real verdict.

use crate::sat::solver::EngineError;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, SolverError>;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("unknown symbol `{0}`")]
    UnknownSymbol(String),

    #[error("symbol `{0}` is declared twice")]
    DuplicateSymbol(String),

    #[error("`{name}` expects {expected} arguments, got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("term #{0} is not interned in this arena")]
    UnboundTerm(u32),

    #[error("`{term}` used where a {expected} term was required")]
    SortMismatch { term: String, expected: &'static str },

    #[error("`{0}` needs at least one operand")]
    EmptyConnective(&'static str),

    #[error("unsupported construct `{0}`")]
    Unsupported(String),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("propositional engine failed: {0}")]
    Engine(#[from] EngineError),

    #[error("gave up after {0} refinement rounds")]
    RoundLimit(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SolverError {
    /// Shorthand for parse failures, which always carry a line.
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

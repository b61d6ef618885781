#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Lazy decision procedure for quantifier-free equality with uninterpreted
//! functions: Boolean abstraction in front, congruence closure behind, and
//! a refinement loop in between.

pub mod abstraction;
pub mod congruence;
pub mod driver;
pub mod error;
pub mod formula;
pub mod term;

pub use driver::{DEFAULT_MAX_ROUNDS, Driver, Outcome, solve};
pub use error::{Result, SolverError};

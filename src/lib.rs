#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A lazy SMT solver for the quantifier-free theory of equality with
//! uninterpreted functions (`QF_UF`).
//!
//! The crate is split along the classic CDCL(T) seams: `smtlib` parses
//! scripts into terms and formulas, `euf` owns the theory side (term arena,
//! Boolean abstraction, congruence closure and the refinement driver), and
//! `sat` provides the propositional engines the driver calls into.

/// The `euf` module implements the theory side: terms, Boolean abstraction,
/// congruence closure and the lazy refinement driver.
pub mod euf;

/// The `sat` module implements the propositional engines, CDCL and DPLL,
/// behind a common engine trait.
pub mod sat;

/// The `smtlib` module implements the SMT-LIB 2 front end for the `QF_UF`
/// fragment.
pub mod smtlib;

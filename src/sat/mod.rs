#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Propositional side: literals, clauses, growable CNF instances and the
//! two engines that decide them.

pub mod assignment;
pub mod cdcl;
pub mod clause;
pub mod cnf;
pub mod dpll;
pub mod literal;
pub mod solver;

#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! SMT-LIB 2 frontend, restricted to the QF_UF fragment the solver speaks.

pub mod lexer;
pub mod parser;

pub use parser::{Script, parse_file, parse_script};

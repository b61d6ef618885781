#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Binary-side plumbing: argument parsing, dispatch and reporting.

pub(crate) mod cli;

#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! # euf-solver
//!
//! `euf-solver` is a command-line SMT solver for the quantifier-free theory
//! of equality with uninterpreted functions (`QF_UF`). It reads SMT-LIB 2
//! scripts, abstracts the asserted formulas into propositional clauses, and
//! alternates between a SAT engine and congruence closure until the two
//! agree: each theory conflict is turned into a blocking clause that refines
//! the propositional abstraction for the next round.
//!
//! ## Features
//!
//! - **SMT-LIB 2 input**: `.smt2` files, plain-text scripts, or whole
//!   directories of benchmarks.
//! - **Configurable engine**: choose between CDCL and DPLL for the
//!   propositional core.
//! - **Statistics**: parse/solve times, refinement rounds, theory
//!   conflicts, engine counters and memory usage via `tikv-jemallocator`.
//! - **Shell completions**: generated on demand with `clap_complete`.
//!
//! ## Usage
//!
//! ```sh
//! euf-solver <path_to_smt2_file_or_directory>
//! euf-solver file --path problem.smt2 --engine dpll
//! euf-solver text --input "(declare-sort U 0) ... (check-sat)"
//! euf-solver completions bash
//! ```
//!
//! The verdict (`sat` or `unsat`) is printed last on stdout; statistics
//! tables precede it unless `--stats false` is given. Logging goes to
//! stderr and scales with repeated `-v` flags. Exhausting the round limit
//! is reported as an error, not as a verdict.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod command_line;

/// Global allocator using `tikv-jemallocator`, which also backs the memory
/// usage figures in the statistics table.
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> std::process::ExitCode {
    let cli = command_line::cli::Cli::parse();
    init_logging(cli.common.verbose);

    match command_line::cli::run(cli) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::ExitCode::FAILURE
        }
    }
}

/// Installs the stderr logger, scaling detail with repeated `-v` flags.
/// `RUST_LOG` overrides the flag-derived level when set.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

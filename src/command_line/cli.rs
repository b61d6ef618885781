#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Command-line front end.
//!
//! Argument definitions live here together with the plumbing that turns a
//! parsed script into a verdict: engine selection, the refinement driver,
//! and the statistics tables printed after solving. Stdout carries nothing
//! but the `sat`/`unsat` lines, one per input; progress notes and the
//! statistics tables go to stderr.

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use core::fmt;
use euf_solver::euf::driver::{DEFAULT_MAX_ROUNDS, Driver, DriverStats, Outcome};
use euf_solver::euf::error::Result;
use euf_solver::euf::formula::Formula;
use euf_solver::euf::term::TermArena;
use euf_solver::sat::cdcl::Cdcl;
use euf_solver::sat::dpll::Dpll;
use euf_solver::sat::solver::{EngineStats, SatEngine};
use euf_solver::smtlib::{Script, parse_file, parse_script};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tikv_jemalloc_ctl::{epoch, stats};
use walkdir::WalkDir;

/// Defines the command-line interface for the solver.
///
/// Uses `clap` for parsing arguments.
#[derive(Parser, Debug)]
#[command(name = "euf-solver", version, about = "A lazy SMT solver for QF_UF")]
pub(crate) struct Cli {
    /// An optional global path argument. If provided without a subcommand,
    /// it's treated as an SMT-LIB file to solve, or as a directory to sweep
    /// for `.smt2` files.
    #[arg(global = true, value_hint = clap::ValueHint::AnyPath)]
    pub(crate) path: Option<PathBuf>,

    /// Specifies the subcommand to execute (e.g. `file`, `text`).
    #[clap(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Common options applicable to all commands.
    #[command(flatten)]
    pub(crate) common: CommonOptions,
}

/// Enumerates the available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Solve an SMT-LIB 2 script from a file.
    File {
        /// Path to the `.smt2` file.
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        path: PathBuf,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Solve an SMT-LIB 2 script provided as plain text.
    Text {
        /// Script source, e.g. `(declare-sort U 0) ... (check-sat)`.
        #[arg(short, long)]
        input: String,

        /// Common options for this subcommand.
        #[command(flatten)]
        common: CommonOptions,
    },

    /// Generate shell completion scripts.
    Completions {
        /// The shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Defines common command-line options shared across different subcommands.
#[derive(Args, Debug, Clone)]
pub(crate) struct CommonOptions {
    /// The propositional engine driving the refinement loop.
    #[arg(short, long, value_enum, default_value_t = EngineChoice::Cdcl)]
    pub(crate) engine: EngineChoice,

    /// Give up with an error after this many refinement rounds.
    #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
    pub(crate) max_rounds: usize,

    /// Enable printing of performance and problem statistics after solving.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, value_name = "BOOL")]
    pub(crate) stats: bool,

    /// Increase log detail on stderr (`-v` info, `-vv` debug, `-vvv` trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub(crate) verbose: u8,
}

impl Default for CommonOptions {
    fn default() -> Self {
        Self {
            engine: EngineChoice::Cdcl,
            max_rounds: DEFAULT_MAX_ROUNDS,
            stats: true,
            verbose: 0,
        }
    }
}

/// Propositional engines selectable with `--engine`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum EngineChoice {
    /// Conflict-driven clause learning.
    #[default]
    Cdcl,
    /// Recursive DPLL, mostly useful for cross-checking.
    Dpll,
}

impl fmt::Display for EngineChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cdcl => f.write_str("cdcl"),
            Self::Dpll => f.write_str("dpll"),
        }
    }
}

/// Runs the parsed command line to completion.
///
/// # Errors
///
/// Returns any parse or engine failure, and [`RoundLimit`] when refinement
/// gives up before reaching a verdict.
///
/// [`RoundLimit`]: euf_solver::euf::error::SolverError::RoundLimit
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::File { path, common }) => solve_file(&path, &common),
        Some(Commands::Text { input, common }) => solve_text(&input, &common),
        Some(Commands::Completions { shell }) => {
            let mut command = Cli::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
            Ok(())
        }
        None => match cli.path {
            Some(path) if path.is_dir() => solve_dir(&path, &cli.common),
            Some(path) => solve_file(&path, &cli.common),
            None => {
                eprintln!("No input provided. Use --help for more information.");
                std::process::exit(1);
            }
        },
    }
}

/// Parses and solves a single `.smt2` file.
fn solve_file(path: &Path, common: &CommonOptions) -> Result<()> {
    let parse_start = Instant::now();
    let script = parse_file(path)?;
    let parse_time = parse_start.elapsed();

    report(&script, common, Some(path), parse_time)
}

/// Parses and solves a script given as a string.
fn solve_text(input: &str, common: &CommonOptions) -> Result<()> {
    let parse_start = Instant::now();
    let script = parse_script(input)?;
    let parse_time = parse_start.elapsed();

    report(&script, common, None, parse_time)
}

/// Solves every `.smt2` file under `path`, stopping at the first failure.
fn solve_dir(path: &Path, common: &CommonOptions) -> Result<()> {
    for entry in WalkDir::new(path).into_iter().filter_map(std::result::Result::ok) {
        let file = entry.path();
        if !file.is_file() {
            continue;
        }

        if file.extension().is_none_or(|ext| ext != "smt2") {
            eprintln!("Skipping non-SMT-LIB file: {}", file.display());
            continue;
        }

        solve_file(file, common)?;
    }

    Ok(())
}

/// What one solve produced, gathered for reporting.
struct Summary {
    outcome: Outcome,
    driver: DriverStats,
    engine: EngineStats,
    variables: usize,
    clauses: usize,
    atoms: usize,
}

/// Abstracts `formula`, runs the refinement loop and collects the numbers
/// the statistics table wants.
fn run_engine<E: SatEngine>(
    arena: &TermArena,
    formula: &Formula,
    engine: E,
    max_rounds: usize,
) -> Result<Summary> {
    let mut driver = Driver::new(arena, formula, engine)?.with_max_rounds(max_rounds);
    let outcome = driver.solve()?;

    Ok(Summary {
        outcome,
        driver: driver.stats(),
        engine: driver.engine_stats(),
        variables: driver.cnf().num_vars,
        clauses: driver.cnf().len(),
        atoms: driver.atom_count(),
    })
}

/// Solves a parsed script and prints the verdict, with optional statistics.
fn report(
    script: &Script,
    common: &CommonOptions,
    label: Option<&Path>,
    parse_time: Duration,
) -> Result<()> {
    if let Some(path) = label {
        eprintln!("Solving: {}", path.display());
    }

    // No assertions, trivially satisfiable.
    let Some(formula) = script.conjunction() else {
        println!("sat");
        return Ok(());
    };

    let solve_start = Instant::now();
    let summary = match common.engine {
        EngineChoice::Cdcl => {
            run_engine(&script.arena, &formula, Cdcl::default(), common.max_rounds)?
        }
        EngineChoice::Dpll => run_engine(&script.arena, &formula, Dpll::new(), common.max_rounds)?,
    };
    let solve_time = solve_start.elapsed();

    if common.stats {
        print_stats(script, &summary, parse_time, solve_time);
    }

    println!("{}", summary.outcome);
    Ok(())
}

/// Current jemalloc counters in MiB, when the allocator exposes them.
fn memory_mib() -> Option<(f64, f64)> {
    epoch::advance().ok()?;
    let allocated = stats::allocated::mib().ok()?.read().ok()?;
    let resident = stats::resident::mib().ok()?.read().ok()?;
    Some((bytes_to_mib(allocated), bytes_to_mib(resident)))
}

#[allow(clippy::cast_precision_loss)]
fn bytes_to_mib(bytes: usize) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Helper function to print a single statistic line in a formatted table row.
fn stat_line(label: &str, value: impl fmt::Display) {
    eprintln!("|  {label:<28} {value:>18}  |");
}

/// Helper function to print a statistic line that includes a rate
/// (value/second).
#[allow(clippy::cast_precision_loss)]
fn stat_line_with_rate(label: &str, value: usize, elapsed: f64) {
    let rate = if elapsed > 0.0 { value as f64 / elapsed } else { 0.0 };
    eprintln!("|  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

/// Prints a summary of problem and search statistics to stderr.
fn print_stats(script: &Script, summary: &Summary, parse_time: Duration, solve_time: Duration) {
    let elapsed_secs = solve_time.as_secs_f64();

    eprintln!("\n=======================[ Problem Statistics ]=========================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    if let Some(logic) = script.logic.as_deref() {
        stat_line("Logic", logic);
    }
    stat_line("Declared terms", script.arena.len());
    stat_line("Assertions", script.assertions.len());
    stat_line("Theory atoms", summary.atoms);
    stat_line("Boolean variables", summary.variables);

    eprintln!("========================[ Search Statistics ]========================");
    stat_line("Refinement rounds", summary.driver.rounds);
    stat_line("Theory conflicts", summary.driver.theory_conflicts);
    stat_line("Blocking literals", summary.driver.blocking_literals);
    stat_line("Clauses (incl. blocking)", summary.clauses);
    stat_line("Learnt clauses", summary.engine.learnt_clauses);
    stat_line_with_rate("Conflicts", summary.engine.conflicts, elapsed_secs);
    stat_line_with_rate("Decisions", summary.engine.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", summary.engine.propagations, elapsed_secs);
    stat_line_with_rate("Restarts", summary.engine.restarts, elapsed_secs);
    if let Some((allocated, resident)) = memory_mib() {
        stat_line("Memory usage (MiB)", format!("{allocated:.2}"));
        stat_line("Resident memory (MiB)", format!("{resident:.2}"));
    }
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    eprintln!("=====================================================================");
}

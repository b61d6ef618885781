#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The refinement loop tying the propositional engine to the theory.
//!
//! Each round asks the engine for a model of the current CNF, reads the
//! atom variables back as theory literals, and runs them through a fresh
//! congruence closure. A consistent round is the final answer. An
//! inconsistent one contributes a blocking clause, namely the negated
//! justification of the conflict, and the loop goes again over the grown
//! instance. The candidate model falsifies its own blocking clause, so
//! every round retires at least one model and the loop cannot revisit.
//!
//! The CNF only ever grows and the atom table never renumbers, which is
//! what makes clauses from old rounds stay meaningful in new ones.

use crate::euf::abstraction::{Abstraction, AtomTable, TheoryAtom, abstract_formula};
use crate::euf::congruence::{Atom, Congruence, TheoryConflict, TheoryVerdict};
use crate::euf::error::{Result, SolverError};
use crate::euf::formula::Formula;
use crate::euf::term::TermArena;
use crate::sat::cdcl::Cdcl;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Variable;
use crate::sat::solver::{EngineStats, Model, SatEngine, Verdict};
use core::fmt;

/// Cap on refinement rounds before giving up with
/// [`SolverError::RoundLimit`].
pub const DEFAULT_MAX_ROUNDS: usize = 10_000;

/// Final answer for a formula, as opposed to one round's propositional
/// verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sat,
    Unsat,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sat => f.write_str("sat"),
            Self::Unsat => f.write_str("unsat"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverStats {
    /// Rounds actually run, counting the final one.
    pub rounds: usize,
    pub theory_conflicts: usize,
    /// Total literals across all blocking clauses.
    pub blocking_literals: usize,
}

pub struct Driver<'a, E: SatEngine> {
    arena: &'a TermArena,
    atoms: AtomTable,
    cnf: Cnf,
    engine: E,
    max_rounds: usize,
    stats: DriverStats,
}

impl<'a, E: SatEngine> Driver<'a, E> {
    /// Abstracts `formula` and prepares a loop around `engine`.
    ///
    /// # Errors
    ///
    /// Fails when the formula is malformed; see [`abstract_formula`].
    pub fn new(arena: &'a TermArena, formula: &Formula, engine: E) -> Result<Self> {
        let Abstraction { cnf, atoms } = abstract_formula(arena, formula)?;
        Ok(Self {
            arena,
            atoms,
            cnf,
            engine,
            max_rounds: DEFAULT_MAX_ROUNDS,
            stats: DriverStats::default(),
        })
    }

    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    #[must_use]
    pub const fn stats(&self) -> DriverStats {
        self.stats
    }

    #[must_use]
    pub fn engine_stats(&self) -> EngineStats {
        self.engine.stats()
    }

    #[must_use]
    pub const fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    #[must_use]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Runs rounds until a verdict lands or the round cap trips.
    ///
    /// # Errors
    ///
    /// Propagates engine failures and reports [`SolverError::RoundLimit`]
    /// when the cap is exhausted without a verdict.
    pub fn solve(&mut self) -> Result<Outcome> {
        for round in 1..=self.max_rounds {
            self.stats.rounds = round;
            let model = match self.engine.solve(&self.cnf)? {
                Verdict::Unsatisfiable => {
                    tracing::debug!(round, "abstraction closed, no candidate models left");
                    return Ok(Outcome::Unsat);
                }
                Verdict::Satisfiable(model) => model,
            };
            let (vars, literals) = self.ground(&model);
            let mut theory = Congruence::new(self.arena);
            match theory.check_literals(&literals) {
                TheoryVerdict::Consistent => {
                    tracing::debug!(round, "theory accepted the candidate model");
                    return Ok(Outcome::Sat);
                }
                TheoryVerdict::Conflict(conflict) => {
                    let clause = Self::blocking_clause(&vars, &conflict);
                    tracing::debug!(
                        round,
                        literals = clause.len(),
                        clauses = self.cnf.len() + 1,
                        "blocking refuted model"
                    );
                    self.stats.theory_conflicts += 1;
                    self.stats.blocking_literals += clause.len();
                    self.cnf.add_clause(clause);
                }
            }
        }
        Err(SolverError::RoundLimit(self.max_rounds))
    }

    /// Reads every atom variable out of the model, producing parallel
    /// vectors: the variable and the theory literal its truth value means.
    fn ground(&self, model: &Model) -> (Vec<Variable>, Vec<Atom>) {
        let mut vars = Vec::with_capacity(self.atoms.len());
        let mut literals = Vec::with_capacity(self.atoms.len());
        for (var, atom) in self.atoms.iter() {
            let value = model.value(var).unwrap_or(false);
            vars.push(var);
            literals.push(match atom {
                TheoryAtom::Equality(a, b) if value => Atom::Equality(a, b),
                TheoryAtom::Equality(a, b) => Atom::Disequality(a, b),
                TheoryAtom::Predicate(_) => Atom::Other,
            });
        }
        (vars, literals)
    }

    /// The negated justification: each asserted equality flipped to its
    /// negative literal, plus the violated disequality asserted positively.
    #[allow(clippy::cast_possible_wrap)]
    fn blocking_clause(vars: &[Variable], conflict: &TheoryConflict) -> Clause {
        let mut literals: Vec<i32> = conflict
            .equalities
            .iter()
            .map(|&index| -(vars[index] as i32))
            .collect();
        literals.push(vars[conflict.disequality] as i32);
        let mut clause = Clause::from(literals);
        clause.learnt = true;
        clause
    }
}

/// One-shot entry point with the clause-learning engine and default cap.
///
/// # Errors
///
/// Same failure modes as [`Driver::solve`].
pub fn solve(arena: &TermArena, formula: &Formula) -> Result<Outcome> {
    Driver::new(arena, formula, Cdcl::default())?.solve()
}

#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A classical DPLL engine, kept as the simple reference implementation.
//!
//! Unit propagation runs to fixpoint, then the search branches on the first
//! unassigned variable, trying true before false. Backtracking is implicit
//! in the recursion: each branch carries its own clone of the assignment and
//! abandons it on conflict. No clause learning, no restarts. Orders of
//! magnitude slower than [`Cdcl`](crate::sat::cdcl::Cdcl) on anything
//! non-trivial, but the control flow fits on one screen, which makes it the
//! engine of choice for cross-checking refinement behaviour.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use crate::sat::solver::{EngineError, EngineStats, Model, SatEngine, Verdict, validate_instance};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dpll {
    stats: EngineStats,
}

impl Dpll {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Propagates units, then branches. `None` means this branch conflicts.
    fn search(&mut self, clauses: &[Clause], mut assignment: Assignment) -> Option<Model> {
        loop {
            let mut progressed = false;
            for clause in clauses {
                let mut satisfied = false;
                let mut unassigned = None;
                let mut unassigned_count = 0usize;
                for &lit in clause {
                    match assignment.literal_value(lit) {
                        Some(true) => {
                            satisfied = true;
                            break;
                        }
                        Some(false) => {}
                        None => {
                            unassigned_count += 1;
                            unassigned = Some(lit);
                        }
                    }
                }
                if satisfied {
                    continue;
                }
                match (unassigned_count, unassigned) {
                    (0, _) => {
                        self.stats.conflicts += 1;
                        return None;
                    }
                    (1, Some(lit)) => {
                        assignment.assign(lit);
                        self.stats.propagations += 1;
                        progressed = true;
                    }
                    _ => {}
                }
            }
            if !progressed {
                break;
            }
        }

        match assignment.first_unassigned() {
            None => Some(assignment.to_model()),
            Some(var) => {
                self.stats.decisions += 1;
                let mut true_branch = assignment.clone();
                true_branch.assign(Literal::new(var, true));
                if let Some(model) = self.search(clauses, true_branch) {
                    return Some(model);
                }
                assignment.assign(Literal::new(var, false));
                self.search(clauses, assignment)
            }
        }
    }
}

impl SatEngine for Dpll {
    fn solve(&mut self, cnf: &Cnf) -> Result<Verdict, EngineError> {
        validate_instance(cnf)?;

        let mut clauses = Vec::with_capacity(cnf.len());
        for clause in cnf.iter() {
            let mut literals = clause.literals.clone();
            literals.sort_unstable();
            literals.dedup();
            if literals
                .windows(2)
                .any(|pair| pair[0].variable() == pair[1].variable())
            {
                continue;
            }
            if literals.is_empty() {
                return Ok(Verdict::Unsatisfiable);
            }
            clauses.push(Clause::from_literals(literals, clause.learnt));
        }

        let assignment = Assignment::new(cnf.num_vars);
        Ok(match self.search(&clauses, assignment) {
            Some(model) => Verdict::Satisfiable(model),
            None => Verdict::Unsatisfiable,
        })
    }

    fn stats(&self) -> EngineStats {
        self.stats
    }
}

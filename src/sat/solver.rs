#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The engine seam: anything that decides propositional satisfiability and,
//! on success, hands back a total model.
//!
//! The refinement driver is generic over this trait, so the clause-learning
//! engine and the brute-force oracle are interchangeable.

use crate::sat::cnf::Cnf;
use crate::sat::literal::Variable;
use core::fmt;
use thiserror::Error;

/// Search statistics accumulated across `solve` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStats {
    pub decisions: usize,
    pub propagations: usize,
    pub conflicts: usize,
    pub restarts: usize,
    pub learnt_clauses: usize,
}

impl EngineStats {
    pub fn merge(&mut self, other: &Self) {
        self.decisions += other.decisions;
        self.propagations += other.propagations;
        self.conflicts += other.conflicts;
        self.restarts += other.restarts;
        self.learnt_clauses += other.learnt_clauses;
    }
}

/// A malformed instance. These are caller errors, not search outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("clause {clause} mentions variable 0, which never names a variable")]
    ZeroVariable { clause: usize },
    #[error("clause {clause} mentions variable {variable} beyond the declared range {num_vars}")]
    VariableOutOfRange {
        clause: usize,
        variable: Variable,
        num_vars: usize,
    },
}

/// A total assignment: entry `i` is the signed value of variable `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Model(Vec<i32>);

impl Model {
    #[must_use]
    pub fn value(&self, variable: Variable) -> Option<bool> {
        let index = (variable as usize).checked_sub(1)?;
        self.0.get(index).map(|signed| signed.is_positive())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<i32>> for Model {
    fn from(values: Vec<i32>) -> Self {
        Self(values)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in &self.0 {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{value}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Satisfiable(Model),
    Unsatisfiable,
}

impl Verdict {
    #[must_use]
    pub const fn is_sat(&self) -> bool {
        matches!(self, Self::Satisfiable(_))
    }

    #[must_use]
    pub const fn model(&self) -> Option<&Model> {
        match self {
            Self::Satisfiable(model) => Some(model),
            Self::Unsatisfiable => None,
        }
    }
}

pub trait SatEngine {
    /// Decides `cnf`. Implementations must return a total model on the
    /// satisfiable side, covering every variable up to `cnf.num_vars`.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the instance itself is malformed.
    fn solve(&mut self, cnf: &Cnf) -> Result<Verdict, EngineError>;

    fn stats(&self) -> EngineStats;
}

/// Rejects instances whose literals fall outside the declared range.
pub(crate) fn validate_instance(cnf: &Cnf) -> Result<(), EngineError> {
    for (index, clause) in cnf.iter().enumerate() {
        for lit in clause {
            let variable = lit.variable();
            if variable == 0 {
                return Err(EngineError::ZeroVariable { clause: index });
            }
            if variable as usize > cnf.num_vars {
                return Err(EngineError::VariableOutOfRange {
                    clause: index,
                    variable,
                    num_vars: cnf.num_vars,
                });
            }
        }
    }
    Ok(())
}

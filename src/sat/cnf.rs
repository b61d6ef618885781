#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Conjunctive normal form instances.
//!
//! A `Cnf` owns its clauses and tracks the highest variable mentioned so far.
//! Refinement appends clauses over time; `num_vars` only ever grows, which
//! keeps variable meanings stable across successive solver calls.

use crate::sat::clause::Clause;
use crate::sat::solver::Model;
use core::fmt;
use core::ops::Index;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    pub clauses: Vec<Clause>,
    pub num_vars: usize,
}

impl Cnf {
    #[must_use]
    pub fn new(clauses: Vec<Vec<i32>>) -> Self {
        let mut cnf = Self::default();
        for literals in clauses {
            cnf.add_clause(Clause::from(literals));
        }
        cnf
    }

    /// Appends a clause, widening the variable range if the clause mentions
    /// a variable beyond the current maximum.
    pub fn add_clause(&mut self, clause: Clause) {
        self.num_vars = self.num_vars.max(clause.max_variable() as usize);
        self.clauses.push(clause);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    #[must_use]
    pub fn literal_count(&self) -> usize {
        self.clauses.iter().map(Clause::len).sum()
    }

    /// Checks that `model` satisfies every clause.
    #[must_use]
    pub fn verify(&self, model: &Model) -> bool {
        self.clauses.iter().all(|clause| {
            clause
                .iter()
                .any(|lit| model.value(lit.variable()) == Some(lit.polarity()))
        })
    }
}

impl Index<usize> for Cnf {
    type Output = Clause;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

impl From<Vec<Vec<i32>>> for Cnf {
    fn from(clauses: Vec<Vec<i32>>) -> Self {
        Self::new(clauses)
    }
}

impl fmt::Display for Cnf {
    /// DIMACS serialisation, mostly useful for debugging refinement rounds.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.len())?;
        for clause in &self.clauses {
            writeln!(f, "{clause}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracks_num_vars() {
        let cnf = Cnf::new(vec![vec![1, -2], vec![3]]);
        assert_eq!(cnf.len(), 2);
        assert_eq!(cnf.num_vars, 3);
    }

    #[test]
    fn test_add_clause_widens() {
        let mut cnf = Cnf::new(vec![vec![1, 2]]);
        cnf.add_clause(Clause::from([-5]));
        assert_eq!(cnf.num_vars, 5);
        cnf.add_clause(Clause::from([2, -1]));
        assert_eq!(cnf.num_vars, 5);
        assert_eq!(cnf.len(), 3);
    }

    #[test]
    fn test_verify() {
        let cnf = Cnf::new(vec![vec![1, 2], vec![-1, 3]]);
        assert!(cnf.verify(&Model::from(vec![1, -2, 3])));
        assert!(cnf.verify(&Model::from(vec![-1, 2, -3])));
        assert!(!cnf.verify(&Model::from(vec![1, -2, -3])));
    }

    #[test]
    fn test_display() {
        let cnf = Cnf::new(vec![vec![1, -2]]);
        assert_eq!(cnf.to_string(), "p cnf 2 1\n1 -2 0\n");
    }
}

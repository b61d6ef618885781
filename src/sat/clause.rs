#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Clause representation shared by both engines.
//!
//! The first two positions are the watched literals; engines maintain that
//! invariant by swapping, never by reordering the tail.

use crate::sat::literal::Literal;
use core::fmt;
use core::ops::{Index, IndexMut};
use smallvec::SmallVec;

/// A disjunction of literals. `learnt` marks clauses added during search or
/// by theory refinement rather than by the original instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Clause {
    pub literals: SmallVec<[Literal; 8]>,
    pub learnt: bool,
}

impl Clause {
    #[must_use]
    pub fn new(literals: &[i32]) -> Self {
        Self {
            literals: literals.iter().copied().map(Literal::from_dimacs).collect(),
            learnt: false,
        }
    }

    #[must_use]
    pub const fn from_literals(literals: SmallVec<[Literal; 8]>, learnt: bool) -> Self {
        Self { literals, learnt }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        self.literals.swap(a, b);
    }

    #[must_use]
    pub fn contains(&self, literal: Literal) -> bool {
        self.literals.contains(&literal)
    }

    #[must_use]
    pub fn max_variable(&self) -> u32 {
        self.iter().map(|lit| lit.variable()).max().unwrap_or(0)
    }
}

impl From<Vec<i32>> for Clause {
    fn from(literals: Vec<i32>) -> Self {
        Self::new(&literals)
    }
}

impl From<&[i32]> for Clause {
    fn from(literals: &[i32]) -> Self {
        Self::new(literals)
    }
}

impl<const N: usize> From<[i32; N]> for Clause {
    fn from(literals: [i32; N]) -> Self {
        Self::new(&literals)
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl IndexMut<usize> for Clause {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.literals[index]
    }
}

impl<'a> IntoIterator for &'a Clause {
    type Item = &'a Literal;
    type IntoIter = core::slice::Iter<'a, Literal>;

    fn into_iter(self) -> Self::IntoIter {
        self.literals.iter()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lit in &self.literals {
            write!(f, "{lit} ")?;
        }
        write!(f, "0")
    }
}

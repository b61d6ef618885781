#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Propositional skeletons over theory atoms.

use crate::euf::term::TermId;

/// Input formulas: arbitrary and/or/not structure whose leaves are
/// equalities between terms or Boolean-valued terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    And(Vec<Formula>),
    Or(Vec<Formula>),
    Not(Box<Formula>),
    Equality(TermId, TermId),
    Predicate(TermId),
}

impl Formula {
    #[must_use]
    pub fn not(child: Self) -> Self {
        Self::Not(Box::new(child))
    }

    #[must_use]
    pub const fn equality(left: TermId, right: TermId) -> Self {
        Self::Equality(left, right)
    }

    #[must_use]
    pub fn disequality(left: TermId, right: TermId) -> Self {
        Self::not(Self::Equality(left, right))
    }

    /// Number of atom occurrences, counting repeats.
    #[must_use]
    pub fn atom_occurrences(&self) -> usize {
        match self {
            Self::And(children) | Self::Or(children) => {
                children.iter().map(Self::atom_occurrences).sum()
            }
            Self::Not(child) => child.atom_occurrences(),
            Self::Equality(..) | Self::Predicate(_) => 1,
        }
    }
}

#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Propositional literals in a packed single-word layout.
//!
//! The variable lives in the upper bits and the negation flag in the lowest
//! bit, so a literal and its negation differ by one and `code` can index
//! watch lists directly. The signed-integer convention at the crate boundary
//! (positive = asserted variable, negative = negated) follows DIMACS.

use core::fmt;
use core::ops::Not;

/// Propositional variables are positive integers; zero never names a variable.
pub type Variable = u32;

/// A literal packed as `variable << 1 | negated`. Even codes are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Literal(u32);

impl Literal {
    #[must_use]
    pub fn new(variable: Variable, polarity: bool) -> Self {
        Self(variable << 1 | u32::from(!polarity))
    }

    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0 >> 1
    }

    /// `true` for the positive literal of the variable.
    #[must_use]
    pub const fn polarity(self) -> bool {
        self.0 & 1 == 0
    }

    #[must_use]
    pub const fn is_negated(self) -> bool {
        !self.polarity()
    }

    #[must_use]
    pub const fn negated(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// Dense index usable for watch lists and polarity-aware tables.
    #[must_use]
    pub const fn code(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub fn from_dimacs(value: i32) -> Self {
        debug_assert!(value != 0, "zero terminates a clause, it is not a literal");
        Self::new(value.unsigned_abs(), value.is_positive())
    }

    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn to_dimacs(self) -> i32 {
        let var = self.variable() as i32;
        if self.polarity() { var } else { -var }
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Self::from_dimacs(value)
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl Not for &Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let lit = Literal::new(3, true);
        assert_eq!(lit.variable(), 3);
        assert!(lit.polarity());
        assert_eq!(lit.code(), 6);
        assert_eq!(lit.negated().code(), 7);
    }

    #[test]
    fn test_negation() {
        assert_eq!(Literal::new(1, false).negated(), Literal::new(1, true));
        assert_eq!(Literal::new(1, true).negated(), Literal::new(1, false));
        assert_eq!(!Literal::new(7, true), Literal::new(7, false));
    }

    #[test]
    fn test_dimacs_round_trip() {
        for value in [1, -1, 42, -97] {
            assert_eq!(Literal::from_dimacs(value).to_dimacs(), value);
        }
        assert_eq!(Literal::from(-5).variable(), 5);
        assert!(Literal::from(-5).is_negated());
    }
}

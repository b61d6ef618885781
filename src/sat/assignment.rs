#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Partial truth assignments over a fixed variable range.

use crate::sat::literal::{Literal, Variable};
use crate::sat::solver::Model;
use core::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum VarState {
    #[default]
    Unassigned,
    Assigned(bool),
}

impl VarState {
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    #[must_use]
    pub const fn value(self) -> Option<bool> {
        match self {
            Self::Assigned(value) => Some(value),
            Self::Unassigned => None,
        }
    }
}

/// Slot 0 is unused so variables index directly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment {
    states: Vec<VarState>,
}

impl Assignment {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            states: vec![VarState::Unassigned; num_vars + 1],
        }
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    /// Makes `literal` true.
    pub fn assign(&mut self, literal: Literal) {
        self.states[literal.variable() as usize] = VarState::Assigned(literal.polarity());
    }

    pub fn unassign(&mut self, variable: Variable) {
        self.states[variable as usize] = VarState::Unassigned;
    }

    #[must_use]
    pub fn value(&self, variable: Variable) -> Option<bool> {
        self.states.get(variable as usize).and_then(|s| s.value())
    }

    #[must_use]
    pub fn literal_value(&self, literal: Literal) -> Option<bool> {
        self.value(literal.variable())
            .map(|value| value == literal.polarity())
    }

    #[must_use]
    pub fn is_assigned(&self, variable: Variable) -> bool {
        self.value(variable).is_some()
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn first_unassigned(&self) -> Option<Variable> {
        self.states
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, state)| !state.is_assigned())
            .map(|(var, _)| var as Variable)
    }

    /// Extracts a total model, defaulting any unassigned variable to false.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn to_model(&self) -> Model {
        Model::from(
            (1..=self.num_vars())
                .map(|var| match self.states[var] {
                    VarState::Assigned(true) => var as i32,
                    _ => -(var as i32),
                })
                .collect::<Vec<i32>>(),
        )
    }
}

impl Index<Variable> for Assignment {
    type Output = VarState;

    fn index(&self, variable: Variable) -> &Self::Output {
        &self.states[variable as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_and_query() {
        let mut assignment = Assignment::new(3);
        assert_eq!(assignment.value(2), None);
        assignment.assign(Literal::new(2, false));
        assert_eq!(assignment.value(2), Some(false));
        assert_eq!(assignment.literal_value(Literal::new(2, false)), Some(true));
        assert_eq!(assignment.literal_value(Literal::new(2, true)), Some(false));
        assert_eq!(assignment.literal_value(Literal::new(1, true)), None);
    }

    #[test]
    fn test_unassign() {
        let mut assignment = Assignment::new(2);
        assignment.assign(Literal::new(1, true));
        assignment.unassign(1);
        assert!(!assignment.is_assigned(1));
    }

    #[test]
    fn test_first_unassigned() {
        let mut assignment = Assignment::new(3);
        assignment.assign(Literal::new(1, true));
        assert_eq!(assignment.first_unassigned(), Some(2));
        assignment.assign(Literal::new(2, false));
        assignment.assign(Literal::new(3, true));
        assert_eq!(assignment.first_unassigned(), None);
    }

    #[test]
    fn test_to_model_defaults_false() {
        let mut assignment = Assignment::new(3);
        assignment.assign(Literal::new(2, true));
        let model = assignment.to_model();
        assert_eq!(model.value(1), Some(false));
        assert_eq!(model.value(2), Some(true));
        assert_eq!(model.value(3), Some(false));
    }
}

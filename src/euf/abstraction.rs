#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Boolean abstraction: atoms become propositional variables, structure
//! becomes CNF through the usual gate encoding.
//!
//! Atom variables are dense and come first: a formula with k distinct atoms
//! uses variables 1 through k for them, in first-occurrence order, and
//! gate variables from k + 1 up. The table is append-only, so a variable
//! keeps meaning the same atom for the lifetime of the solve. Atoms are
//! ordered pairs: `a = b` and `b = a` intern separately, matching the
//! syntax rather than the theory.

use crate::euf::error::{Result, SolverError};
use crate::euf::formula::Formula;
use crate::euf::term::{TermArena, TermId};
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Variable;
use rustc_hash::FxHashMap;

/// A theory atom as the propositional layer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TheoryAtom {
    Equality(TermId, TermId),
    Predicate(TermId),
}

/// Bijection between atoms and the variables 1..=len, append-only.
#[derive(Debug, Clone, Default)]
pub struct AtomTable {
    atoms: Vec<TheoryAtom>,
    index: FxHashMap<TheoryAtom, Variable>,
}

impl AtomTable {
    /// Variable for `atom`, allocating the next one on first sight.
    #[allow(clippy::cast_possible_truncation)]
    pub fn var_for(&mut self, atom: TheoryAtom) -> Variable {
        if let Some(&var) = self.index.get(&atom) {
            return var;
        }
        let var = (self.atoms.len() + 1) as Variable;
        self.atoms.push(atom);
        self.index.insert(atom, var);
        var
    }

    /// The atom behind `var`, or `None` for gate variables.
    #[must_use]
    pub fn atom(&self, var: Variable) -> Option<TheoryAtom> {
        let index = (var as usize).checked_sub(1)?;
        self.atoms.get(index).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (Variable, TheoryAtom)> + '_ {
        self.atoms
            .iter()
            .enumerate()
            .map(|(i, &atom)| ((i + 1) as Variable, atom))
    }
}

/// The CNF image of one formula together with its atom table.
#[derive(Debug, Clone)]
pub struct Abstraction {
    pub cnf: Cnf,
    pub atoms: AtomTable,
}

/// Abstracts `formula` over `arena`.
///
/// # Errors
///
/// Rejects empty connectives, ids foreign to `arena`, Boolean terms inside
/// equalities and value terms used as atoms.
pub fn abstract_formula(arena: &TermArena, formula: &Formula) -> Result<Abstraction> {
    let mut atoms = AtomTable::default();
    collect_atoms(arena, formula, &mut atoms)?;
    let mut encoder = Tseitin::new(atoms);
    let root = encoder.encode(formula, false);
    encoder.cnf.add_clause(Clause::from(vec![root]));
    Ok(Abstraction {
        cnf: encoder.cnf,
        atoms: encoder.atoms,
    })
}

/// First pass: number the atoms in occurrence order and validate sorts.
fn collect_atoms(arena: &TermArena, formula: &Formula, atoms: &mut AtomTable) -> Result<()> {
    match formula {
        Formula::And(children) => {
            if children.is_empty() {
                return Err(SolverError::EmptyConnective("and"));
            }
            children
                .iter()
                .try_for_each(|child| collect_atoms(arena, child, atoms))
        }
        Formula::Or(children) => {
            if children.is_empty() {
                return Err(SolverError::EmptyConnective("or"));
            }
            children
                .iter()
                .try_for_each(|child| collect_atoms(arena, child, atoms))
        }
        Formula::Not(child) => collect_atoms(arena, child, atoms),
        Formula::Equality(left, right) => {
            for side in [*left, *right] {
                check_value_term(arena, side)?;
            }
            atoms.var_for(TheoryAtom::Equality(*left, *right));
            Ok(())
        }
        Formula::Predicate(term) => {
            if arena.get(*term).is_none() {
                return Err(SolverError::UnboundTerm(term.raw()));
            }
            if !arena.is_boolean(*term) {
                return Err(SolverError::SortMismatch {
                    term: arena.display(*term),
                    expected: "Boolean",
                });
            }
            atoms.var_for(TheoryAtom::Predicate(*term));
            Ok(())
        }
    }
}

fn check_value_term(arena: &TermArena, term: TermId) -> Result<()> {
    if arena.get(term).is_none() {
        return Err(SolverError::UnboundTerm(term.raw()));
    }
    if arena.is_boolean(term) {
        return Err(SolverError::SortMismatch {
            term: arena.display(term),
            expected: "value",
        });
    }
    Ok(())
}

/// Second pass: gate encoding. Negation folds into literal polarity, a
/// single-child connective collapses onto its child, everything else gets a
/// fresh gate variable constrained in both directions.
struct Tseitin {
    atoms: AtomTable,
    cnf: Cnf,
    next_gate: Variable,
}

impl Tseitin {
    #[allow(clippy::cast_possible_truncation)]
    fn new(atoms: AtomTable) -> Self {
        let next_gate = (atoms.len() + 1) as Variable;
        Self {
            atoms,
            cnf: Cnf::default(),
            next_gate,
        }
    }

    fn fresh_gate(&mut self) -> Variable {
        let gate = self.next_gate;
        self.next_gate += 1;
        gate
    }

    #[allow(clippy::cast_possible_wrap)]
    fn encode(&mut self, formula: &Formula, negated: bool) -> i32 {
        let signed = |var: Variable, negated: bool| {
            if negated { -(var as i32) } else { var as i32 }
        };
        match formula {
            Formula::Not(child) => self.encode(child, !negated),
            Formula::Equality(left, right) => {
                let var = self.atoms.var_for(TheoryAtom::Equality(*left, *right));
                signed(var, negated)
            }
            Formula::Predicate(term) => {
                let var = self.atoms.var_for(TheoryAtom::Predicate(*term));
                signed(var, negated)
            }
            Formula::And(children) => {
                if let [child] = children.as_slice() {
                    return self.encode(child, negated);
                }
                let literals: Vec<i32> = children
                    .iter()
                    .map(|child| self.encode(child, false))
                    .collect();
                let gate = self.fresh_gate();
                let gate_lit = gate as i32;
                for &lit in &literals {
                    self.cnf.add_clause(Clause::from(vec![-gate_lit, lit]));
                }
                let mut reverse = vec![gate_lit];
                reverse.extend(literals.iter().map(|lit| -lit));
                self.cnf.add_clause(Clause::from(reverse));
                signed(gate, negated)
            }
            Formula::Or(children) => {
                if let [child] = children.as_slice() {
                    return self.encode(child, negated);
                }
                let literals: Vec<i32> = children
                    .iter()
                    .map(|child| self.encode(child, false))
                    .collect();
                let gate = self.fresh_gate();
                let gate_lit = gate as i32;
                let mut forward = vec![-gate_lit];
                forward.extend(&literals);
                self.cnf.add_clause(Clause::from(forward));
                for &lit in &literals {
                    self.cnf.add_clause(Clause::from(vec![gate_lit, -lit]));
                }
                signed(gate, negated)
            }
        }
    }
}

#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Hash-consed terms and the function signature table.
//!
//! Every term is interned exactly once, so syntactic equality is id
//! equality and the congruence engine can treat ids as dense indices. The
//! arena also owns the declarations: each function symbol carries its arity
//! and whether it returns a Boolean, and every application is checked
//! against that table when it is built.

use crate::euf::error::{Result, SolverError};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Index of an interned term. Ids are dense, starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(u32);

impl TermId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn raw(self) -> u32 {
        self.0
    }

    pub(crate) const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

/// Index of a declared function symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunId(u32);

impl FunId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Either a nullary constant or a function application. Empty argument
/// lists normalise to `Constant`, so the two spellings of a nullary symbol
/// intern to the same term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Constant(FunId),
    Apply {
        fun: FunId,
        args: SmallVec<[TermId; 2]>,
    },
}

impl Term {
    #[must_use]
    pub const fn fun(&self) -> FunId {
        match self {
            Self::Constant(fun) | Self::Apply { fun, .. } => *fun,
        }
    }

    #[must_use]
    pub fn args(&self) -> &[TermId] {
        match self {
            Self::Constant(_) => &[],
            Self::Apply { args, .. } => args,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: String,
    pub arity: usize,
    /// Predicates return Booleans and may only appear as atoms, never as
    /// arguments or equality sides.
    pub boolean: bool,
}

/// Term interner plus the name-to-declaration table.
#[derive(Debug, Clone, Default)]
pub struct TermArena {
    functions: Vec<FunctionInfo>,
    names: FxHashMap<String, FunId>,
    terms: Vec<Term>,
    index: FxHashMap<Term, TermId>,
}

impl TermArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a function symbol with value sort.
    ///
    /// # Errors
    ///
    /// Fails when `name` is already declared.
    pub fn declare_fun(&mut self, name: &str, arity: usize) -> Result<FunId> {
        self.declare(name, arity, false)
    }

    /// Declares a Boolean-valued symbol.
    ///
    /// # Errors
    ///
    /// Fails when `name` is already declared.
    pub fn declare_predicate(&mut self, name: &str, arity: usize) -> Result<FunId> {
        self.declare(name, arity, true)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn declare(&mut self, name: &str, arity: usize, boolean: bool) -> Result<FunId> {
        if self.names.contains_key(name) {
            return Err(SolverError::DuplicateSymbol(name.to_owned()));
        }
        let id = FunId(self.functions.len() as u32);
        self.functions.push(FunctionInfo {
            name: name.to_owned(),
            arity,
            boolean,
        });
        self.names.insert(name.to_owned(), id);
        Ok(id)
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<FunId> {
        self.names.get(name).copied()
    }

    #[must_use]
    pub fn function(&self, fun: FunId) -> &FunctionInfo {
        &self.functions[fun.index()]
    }

    /// Interns the nullary term for `fun`.
    ///
    /// # Errors
    ///
    /// Fails when `fun` takes arguments.
    pub fn constant(&mut self, fun: FunId) -> Result<TermId> {
        self.apply(fun, &[])
    }

    /// Interns an application after checking it against the declaration.
    ///
    /// # Errors
    ///
    /// Fails on an arity mismatch or when an argument id does not belong to
    /// this arena.
    pub fn apply(&mut self, fun: FunId, args: &[TermId]) -> Result<TermId> {
        let info = &self.functions[fun.index()];
        if info.arity != args.len() {
            return Err(SolverError::ArityMismatch {
                name: info.name.clone(),
                expected: info.arity,
                found: args.len(),
            });
        }
        for &arg in args {
            if arg.index() >= self.terms.len() {
                return Err(SolverError::UnboundTerm(arg.raw()));
            }
        }
        let term = if args.is_empty() {
            Term::Constant(fun)
        } else {
            Term::Apply {
                fun,
                args: SmallVec::from_slice(args),
            }
        };
        Ok(self.intern(term))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn intern(&mut self, term: Term) -> TermId {
        if let Some(&id) = self.index.get(&term) {
            return id;
        }
        let id = TermId(self.terms.len() as u32);
        self.terms.push(term.clone());
        self.index.insert(term, id);
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[must_use]
    pub fn term(&self, id: TermId) -> &Term {
        &self.terms[id.index()]
    }

    #[must_use]
    pub fn get(&self, id: TermId) -> Option<&Term> {
        self.terms.get(id.index())
    }

    #[must_use]
    pub fn is_boolean(&self, id: TermId) -> bool {
        self.function(self.term(id).fun()).boolean
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn term_ids(&self) -> impl Iterator<Item = TermId> + '_ {
        (0..self.terms.len() as u32).map(TermId)
    }

    /// Renders a term in s-expression style for diagnostics.
    #[must_use]
    pub fn display(&self, id: TermId) -> String {
        let mut out = String::new();
        self.write_term(&mut out, id);
        out
    }

    fn write_term(&self, out: &mut String, id: TermId) {
        match self.term(id) {
            Term::Constant(fun) => out.push_str(&self.function(*fun).name),
            Term::Apply { fun, args } => {
                out.push('(');
                out.push_str(&self.function(*fun).name);
                for &arg in args {
                    out.push(' ');
                    self.write_term(out, arg);
                }
                out.push(')');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_lookup() {
        let mut arena = TermArena::new();
        let f = arena.declare_fun("f", 1).unwrap();
        assert_eq!(arena.lookup("f"), Some(f));
        assert_eq!(arena.lookup("g"), None);
        assert_eq!(arena.function(f).arity, 1);
        assert!(!arena.function(f).boolean);
    }

    #[test]
    fn test_duplicate_declaration_rejected() {
        let mut arena = TermArena::new();
        arena.declare_fun("a", 0).unwrap();
        assert!(matches!(
            arena.declare_fun("a", 2),
            Err(SolverError::DuplicateSymbol(name)) if name == "a"
        ));
    }

    #[test]
    fn test_interning_is_stable() {
        let mut arena = TermArena::new();
        let a = arena.declare_fun("a", 0).unwrap();
        let f = arena.declare_fun("f", 1).unwrap();
        let ta = arena.constant(a).unwrap();
        let fa = arena.apply(f, &[ta]).unwrap();
        assert_eq!(arena.constant(a).unwrap(), ta);
        assert_eq!(arena.apply(f, &[ta]).unwrap(), fa);
        assert_ne!(ta, fa);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_arity_checked() {
        let mut arena = TermArena::new();
        let f = arena.declare_fun("f", 2).unwrap();
        let a = arena.declare_fun("a", 0).unwrap();
        let ta = arena.constant(a).unwrap();
        assert!(matches!(
            arena.apply(f, &[ta]),
            Err(SolverError::ArityMismatch {
                expected: 2,
                found: 1,
                ..
            })
        ));
        assert!(matches!(
            arena.constant(f),
            Err(SolverError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn test_foreign_id_rejected() {
        let mut arena = TermArena::new();
        let f = arena.declare_fun("f", 1).unwrap();
        assert!(matches!(
            arena.apply(f, &[TermId(7)]),
            Err(SolverError::UnboundTerm(7))
        ));
    }

    #[test]
    fn test_boolean_flag() {
        let mut arena = TermArena::new();
        let p = arena.declare_predicate("p", 0).unwrap();
        let a = arena.declare_fun("a", 0).unwrap();
        let tp = arena.constant(p).unwrap();
        let ta = arena.constant(a).unwrap();
        assert!(arena.is_boolean(tp));
        assert!(!arena.is_boolean(ta));
    }

    #[test]
    fn test_display() {
        let mut arena = TermArena::new();
        let a = arena.declare_fun("a", 0).unwrap();
        let b = arena.declare_fun("b", 0).unwrap();
        let g = arena.declare_fun("g", 2).unwrap();
        let ta = arena.constant(a).unwrap();
        let tb = arena.constant(b).unwrap();
        let gab = arena.apply(g, &[ta, tb]).unwrap();
        assert_eq!(arena.display(gab), "(g a b)");
        assert_eq!(arena.display(ta), "a");
    }
}

#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Congruence closure over an arena snapshot.
//!
//! Union-find with path compression and union by size, a use list per
//! class root, and a signature table keyed on the function symbol plus the
//! canonical class of each argument. Merges queue in `pending` and drain
//! breadth-first. When two classes join, every application listed under the
//! absorbed root gets its signature recomputed against the new roots; a
//! collision in the table means two applications became congruent, and the
//! pair joins the queue.
//!
//! Entries keyed on absorbed roots stay in the table as stale keys. That is
//! deliberate: an absorbed root never canonicalises an argument again, so
//! no later lookup can reach them.
//!
//! An engine is built against the terms interned in the arena at
//! construction time and is meant to be short-lived: the refinement driver
//! builds a fresh one for every candidate model.

use crate::euf::term::{FunId, Term, TermArena, TermId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::collections::hash_map::Entry;

/// A theory literal in the shape the closure consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Atom {
    Equality(TermId, TermId),
    Disequality(TermId, TermId),
    /// Anything the theory has no opinion on.
    Other,
}

/// Positions into the literal slice that justify a conflict: the asserted
/// equalities plus the one disequality they violate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TheoryConflict {
    pub equalities: Vec<usize>,
    pub disequality: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TheoryVerdict {
    Consistent,
    Conflict(TheoryConflict),
}

/// Plain union-find, indices are raw term ids.
#[derive(Debug, Clone)]
struct UnionFind {
    parent: Vec<u32>,
    size: Vec<u32>,
}

impl UnionFind {
    #[allow(clippy::cast_possible_truncation)]
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len as u32).collect(),
            size: vec![1; len],
        }
    }

    fn find(&mut self, mut x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        while self.parent[x as usize] != root {
            let next = self.parent[x as usize];
            self.parent[x as usize] = root;
            x = next;
        }
        root
    }

    /// Joins the classes of `a` and `b`. Returns `(kept, absorbed)` roots,
    /// or `None` when they were already one class.
    fn union(&mut self, a: u32, b: u32) -> Option<(u32, u32)> {
        let a = self.find(a);
        let b = self.find(b);
        if a == b {
            return None;
        }
        let (kept, absorbed) = if self.size[a as usize] >= self.size[b as usize] {
            (a, b)
        } else {
            (b, a)
        };
        self.parent[absorbed as usize] = kept;
        self.size[kept as usize] += self.size[absorbed as usize];
        Some((kept, absorbed))
    }
}

/// An application under the current canonicalisation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AppSignature {
    fun: FunId,
    args: SmallVec<[u32; 2]>,
}

pub struct Congruence<'a> {
    arena: &'a TermArena,
    uf: UnionFind,
    /// Applications that mention a term of this class among their arguments.
    use_lists: Vec<Vec<TermId>>,
    signatures: FxHashMap<AppSignature, TermId>,
    pending: VecDeque<(TermId, TermId)>,
    merges: usize,
}

impl<'a> Congruence<'a> {
    #[must_use]
    pub fn new(arena: &'a TermArena) -> Self {
        let len = arena.len();
        let mut closure = Self {
            arena,
            uf: UnionFind::new(len),
            use_lists: vec![Vec::new(); len],
            signatures: FxHashMap::default(),
            pending: VecDeque::new(),
            merges: 0,
        };
        for id in arena.term_ids() {
            closure.enroll(id);
        }
        closure.process();
        closure
    }

    /// Registers an application in the use lists and the signature table.
    /// A signature collision queues the congruent pair.
    fn enroll(&mut self, id: TermId) {
        let arena = self.arena;
        let Term::Apply { fun, args } = arena.term(id) else {
            return;
        };
        let signature = self.signature(*fun, args);
        for &arg in args {
            let root = self.uf.find(arg.raw());
            self.use_lists[root as usize].push(id);
        }
        match self.signatures.entry(signature) {
            Entry::Occupied(entry) => self.pending.push_back((id, *entry.get())),
            Entry::Vacant(entry) => {
                entry.insert(id);
            }
        }
    }

    fn signature(&mut self, fun: FunId, args: &[TermId]) -> AppSignature {
        AppSignature {
            fun,
            args: args.iter().map(|arg| self.uf.find(arg.raw())).collect(),
        }
    }

    /// Asserts `a = b` and derives every consequence before returning.
    pub fn merge(&mut self, a: TermId, b: TermId) {
        self.pending.push_back((a, b));
        self.process();
    }

    fn process(&mut self) {
        while let Some((a, b)) = self.pending.pop_front() {
            let Some((kept, absorbed)) = self.uf.union(a.raw(), b.raw()) else {
                continue;
            };
            self.merges += 1;
            let moved = core::mem::take(&mut self.use_lists[absorbed as usize]);
            for &app in &moved {
                let arena = self.arena;
                let Term::Apply { fun, args } = arena.term(app) else {
                    continue;
                };
                let signature = self.signature(*fun, args);
                match self.signatures.entry(signature) {
                    Entry::Occupied(entry) => {
                        let twin = *entry.get();
                        if twin != app {
                            self.pending.push_back((app, twin));
                        }
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(app);
                    }
                }
                self.use_lists[kept as usize].push(app);
            }
        }
    }

    /// Whether `a` and `b` are currently provably equal.
    pub fn same_class(&mut self, a: TermId, b: TermId) -> bool {
        self.uf.find(a.raw()) == self.uf.find(b.raw())
    }

    pub fn representative(&mut self, id: TermId) -> TermId {
        TermId::from_raw(self.uf.find(id.raw()))
    }

    /// Successful unions so far, counting derived congruences.
    #[must_use]
    pub const fn merge_count(&self) -> usize {
        self.merges
    }

    /// Closes over the asserted equalities, then looks for a violated
    /// disequality. The first one found wins; its justification cites every
    /// equality of the round, which is sufficient if not minimal.
    pub fn check_literals(&mut self, literals: &[Atom]) -> TheoryVerdict {
        let mut equalities = Vec::new();
        for (index, atom) in literals.iter().enumerate() {
            if let Atom::Equality(a, b) = atom {
                equalities.push(index);
                self.merge(*a, *b);
            }
        }
        for (index, atom) in literals.iter().enumerate() {
            if let Atom::Disequality(a, b) = atom {
                if self.same_class(*a, *b) {
                    return TheoryVerdict::Conflict(TheoryConflict {
                        equalities,
                        disequality: index,
                    });
                }
            }
        }
        TheoryVerdict::Consistent
    }
}

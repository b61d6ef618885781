#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Conflict-driven clause learning with two watched literals.
//!
//! The search state lives in a private [`Search`] built fresh for every
//! `solve` call, so repeated calls over a growing instance never see stale
//! watches or learnt clauses from an earlier round. Within one call the
//! usual machinery applies: first-UIP conflict analysis, non-chronological
//! backjumping, activity-driven decisions with saved phases, and restarts on
//! the Luby schedule.
//!
//! Invariants the code below leans on:
//! - positions 0 and 1 of every clause of length two or more are the
//!   watched literals,
//! - position 0 of a reason clause is the literal it implied,
//! - the propagation queue is the trail suffix starting at `queue_head`.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, Variable};
use crate::sat::solver::{EngineError, EngineStats, SatEngine, Verdict, validate_instance};
use bit_vec::BitVec;
use smallvec::SmallVec;

const RESTART_BASE: usize = 50;
const VSIDS_DECAY: f64 = 0.95;
const PHASE_NOISE: f64 = 0.02;
const RESCALE_LIMIT: f64 = 1e100;
const RESCALE_FACTOR: f64 = 1e-100;

/// Per-variable activity scores, bumped on conflict involvement and decayed
/// geometrically by growing the increment instead of rescanning every score.
#[derive(Debug, Clone, PartialEq, Default)]
struct Activity {
    score: Vec<f64>,
    inc: f64,
}

impl Activity {
    fn new(num_vars: usize) -> Self {
        Self {
            score: vec![0.0; num_vars + 1],
            inc: 1.0,
        }
    }

    fn bump(&mut self, variable: Variable) {
        self.score[variable as usize] += self.inc;
        if self.score[variable as usize] > RESCALE_LIMIT {
            for score in &mut self.score {
                *score *= RESCALE_FACTOR;
            }
            self.inc *= RESCALE_FACTOR;
        }
    }

    fn decay(&mut self) {
        self.inc /= VSIDS_DECAY;
    }

    /// Highest-activity unassigned variable, if any remain. Variables never
    /// bumped sit at 0.0 and still get picked, which keeps models total.
    #[allow(clippy::cast_possible_truncation)]
    fn pick(&self, assignment: &Assignment) -> Option<Variable> {
        let mut best: Option<(Variable, f64)> = None;
        for (var, &score) in self.score.iter().enumerate().skip(1) {
            let var = var as Variable;
            if assignment.is_assigned(var) {
                continue;
            }
            match best {
                Some((_, best_score)) if best_score >= score => {}
                _ => best = Some((var, score)),
            }
        }
        best.map(|(var, _)| var)
    }
}

/// Last polarity each variable held, consulted at decision time with a small
/// chance of flipping.
#[derive(Debug, Clone, PartialEq)]
struct SavedPhases {
    phases: BitVec,
}

impl SavedPhases {
    fn new(num_vars: usize) -> Self {
        Self {
            phases: BitVec::from_elem(num_vars + 1, false),
        }
    }

    fn save(&mut self, variable: Variable, value: bool) {
        self.phases.set(variable as usize, value);
    }

    fn next(&self, variable: Variable) -> bool {
        let saved = self.phases.get(variable as usize).unwrap_or(false);
        if fastrand::f64() < PHASE_NOISE {
            !saved
        } else {
            saved
        }
    }
}

/// Luby restart schedule: the i-th restart fires after `base * luby(i)`
/// conflicts, giving the 1, 1, 2, 1, 1, 2, 4, ... cadence.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Restarter {
    base: usize,
    position: usize,
    conflicts: usize,
    threshold: usize,
}

impl Restarter {
    const fn new(base: usize) -> Self {
        Self {
            base,
            position: 0,
            conflicts: 0,
            threshold: base,
        }
    }

    fn luby(position: usize) -> usize {
        let mut size = 1;
        let mut seq = 0usize;
        while size < position + 1 {
            seq += 1;
            size = 2 * size + 1;
        }
        let mut position = position;
        while size - 1 != position {
            size = (size - 1) / 2;
            seq -= 1;
            position %= size;
        }
        1 << seq
    }

    fn should_restart(&mut self) -> bool {
        self.conflicts += 1;
        if self.conflicts < self.threshold {
            return false;
        }
        self.conflicts = 0;
        self.position += 1;
        self.threshold = self.base * Self::luby(self.position);
        true
    }
}

struct Search {
    clauses: Vec<Clause>,
    /// Clause indices watching each literal, addressed by literal code.
    watches: Vec<SmallVec<[usize; 6]>>,
    assignment: Assignment,
    level: Vec<usize>,
    reason: Vec<Option<usize>>,
    trail: Vec<Literal>,
    trail_lim: Vec<usize>,
    queue_head: usize,
    activity: Activity,
    phases: SavedPhases,
    restarter: Restarter,
    num_vars: usize,
    stats: EngineStats,
    unsat: bool,
}

impl Search {
    fn new(cnf: &Cnf, restart_base: usize) -> Self {
        let num_vars = cnf.num_vars;
        let mut search = Self {
            clauses: Vec::with_capacity(cnf.len()),
            watches: vec![SmallVec::new(); 2 * (num_vars + 1)],
            assignment: Assignment::new(num_vars),
            level: vec![0; num_vars + 1],
            reason: vec![None; num_vars + 1],
            trail: Vec::with_capacity(num_vars),
            trail_lim: Vec::new(),
            queue_head: 0,
            activity: Activity::new(num_vars),
            phases: SavedPhases::new(num_vars),
            restarter: Restarter::new(restart_base),
            num_vars,
            stats: EngineStats::default(),
            unsat: false,
        };
        for clause in cnf.iter() {
            search.attach(clause.clone());
            if search.unsat {
                break;
            }
        }
        search
    }

    /// Normalises and installs one input clause: duplicates dropped,
    /// tautologies skipped, units enqueued at level zero.
    fn attach(&mut self, clause: Clause) {
        let mut literals = clause.literals;
        literals.sort_unstable();
        literals.dedup();
        if literals
            .windows(2)
            .any(|pair| pair[0].variable() == pair[1].variable())
        {
            return;
        }
        match literals.len() {
            0 => self.unsat = true,
            1 => {
                if !self.enqueue(literals[0], None) {
                    self.unsat = true;
                }
            }
            _ => {
                let index = self.clauses.len();
                self.watches[literals[0].code()].push(index);
                self.watches[literals[1].code()].push(index);
                self.clauses
                    .push(Clause::from_literals(literals, clause.learnt));
            }
        }
    }

    const fn current_level(&self) -> usize {
        self.trail_lim.len()
    }

    /// Makes `literal` true, recording level and reason. Returns the current
    /// value if the variable was already assigned.
    fn enqueue(&mut self, literal: Literal, reason: Option<usize>) -> bool {
        match self.assignment.literal_value(literal) {
            Some(value) => value,
            None => {
                self.assignment.assign(literal);
                let var = literal.variable() as usize;
                self.level[var] = self.current_level();
                self.reason[var] = reason;
                self.trail.push(literal);
                if reason.is_some() {
                    self.stats.propagations += 1;
                }
                true
            }
        }
    }

    /// Runs unit propagation to fixpoint. Returns the index of a clause that
    /// went fully false, if any.
    fn propagate(&mut self) -> Option<usize> {
        while self.queue_head < self.trail.len() {
            let literal = self.trail[self.queue_head];
            self.queue_head += 1;
            let false_lit = !literal;

            let mut watch = core::mem::take(&mut self.watches[false_lit.code()]);
            let mut i = 0;
            while i < watch.len() {
                let c = watch[i];
                // keep the falsified watch at position 1
                if self.clauses[c][0] == false_lit {
                    self.clauses[c].swap(0, 1);
                }
                let first = self.clauses[c][0];
                if self.assignment.literal_value(first) == Some(true) {
                    i += 1;
                    continue;
                }
                if let Some(k) = self.find_replacement(c) {
                    self.clauses[c].swap(1, k);
                    let new_watch = self.clauses[c][1];
                    self.watches[new_watch.code()].push(c);
                    watch.swap_remove(i);
                    continue;
                }
                // no replacement watch: the clause is unit or conflicting
                if self.enqueue(first, Some(c)) {
                    i += 1;
                } else {
                    self.watches[false_lit.code()] = watch;
                    self.queue_head = self.trail.len();
                    return Some(c);
                }
            }
            self.watches[false_lit.code()] = watch;
        }
        None
    }

    fn find_replacement(&self, c: usize) -> Option<usize> {
        self.clauses[c]
            .iter()
            .skip(2)
            .position(|&lit| self.assignment.literal_value(lit) != Some(false))
            .map(|offset| offset + 2)
    }

    /// First-UIP conflict analysis. Returns the learnt clause with the
    /// asserting literal at position 0 and the deepest remaining literal at
    /// position 1, plus the backjump level.
    fn analyse(&mut self, conflict: usize) -> (SmallVec<[Literal; 8]>, usize) {
        let mut learnt: SmallVec<[Literal; 8]> = SmallVec::new();
        learnt.push(Literal::default());
        let mut seen = vec![false; self.num_vars + 1];
        let mut open_paths = 0usize;
        let mut clause = conflict;
        let mut index = self.trail.len();
        let mut skip_implied = false;
        let level_now = self.current_level();

        let uip = loop {
            for &lit in self.clauses[clause].iter().skip(usize::from(skip_implied)) {
                let var = lit.variable() as usize;
                if seen[var] || self.level[var] == 0 {
                    continue;
                }
                seen[var] = true;
                self.activity.bump(lit.variable());
                if self.level[var] == level_now {
                    open_paths += 1;
                } else {
                    learnt.push(lit);
                }
            }
            let lit = loop {
                index -= 1;
                let candidate = self.trail[index];
                if seen[candidate.variable() as usize] {
                    break candidate;
                }
            };
            seen[lit.variable() as usize] = false;
            open_paths -= 1;
            if open_paths == 0 {
                break lit;
            }
            // only implied literals get resolved; the decision closes the path
            let Some(next) = self.reason[lit.variable() as usize] else {
                break lit;
            };
            clause = next;
            skip_implied = true;
        };

        learnt[0] = !uip;
        let mut backjump_level = 0;
        if learnt.len() > 1 {
            let mut deepest = 1;
            for i in 2..learnt.len() {
                if self.level[learnt[i].variable() as usize]
                    > self.level[learnt[deepest].variable() as usize]
                {
                    deepest = i;
                }
            }
            learnt.swap(1, deepest);
            backjump_level = self.level[learnt[1].variable() as usize];
        }
        (learnt, backjump_level)
    }

    /// Undoes all assignments above `target_level`, saving phases.
    fn backjump(&mut self, target_level: usize) {
        if self.current_level() <= target_level {
            return;
        }
        let target = self.trail_lim[target_level];
        for i in (target..self.trail.len()).rev() {
            let lit = self.trail[i];
            let var = lit.variable();
            self.phases.save(var, lit.polarity());
            self.assignment.unassign(var);
            self.reason[var as usize] = None;
            self.level[var as usize] = 0;
        }
        self.trail.truncate(target);
        self.trail_lim.truncate(target_level);
        self.queue_head = self.trail.len();
    }

    /// Installs a learnt clause and enqueues its asserting literal. The
    /// caller has already backjumped, so position 0 is unassigned here.
    fn learn(&mut self, learnt: SmallVec<[Literal; 8]>) {
        self.stats.learnt_clauses += 1;
        let asserting = learnt[0];
        if learnt.len() == 1 {
            let enqueued = self.enqueue(asserting, None);
            debug_assert!(enqueued);
        } else {
            let index = self.clauses.len();
            self.watches[learnt[0].code()].push(index);
            self.watches[learnt[1].code()].push(index);
            self.clauses.push(Clause::from_literals(learnt, true));
            let enqueued = self.enqueue(asserting, Some(index));
            debug_assert!(enqueued);
        }
    }

    fn decide(&mut self) {
        let Some(var) = self.activity.pick(&self.assignment) else {
            return;
        };
        self.stats.decisions += 1;
        self.trail_lim.push(self.trail.len());
        let polarity = self.phases.next(var);
        let enqueued = self.enqueue(Literal::new(var, polarity), None);
        debug_assert!(enqueued);
    }

    fn run(&mut self) -> Verdict {
        if self.unsat {
            return Verdict::Unsatisfiable;
        }
        loop {
            if let Some(conflict) = self.propagate() {
                self.stats.conflicts += 1;
                if self.current_level() == 0 {
                    return Verdict::Unsatisfiable;
                }
                let (learnt, backjump_level) = self.analyse(conflict);
                self.backjump(backjump_level);
                self.learn(learnt);
                self.activity.decay();
                if self.restarter.should_restart() {
                    self.stats.restarts += 1;
                    self.backjump(0);
                }
            } else if self.trail.len() == self.num_vars {
                return Verdict::Satisfiable(self.assignment.to_model());
            } else {
                self.decide();
            }
        }
    }
}

/// The clause-learning engine. Stateless between calls apart from the
/// accumulated statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cdcl {
    restart_base: usize,
    stats: EngineStats,
}

impl Cdcl {
    #[must_use]
    pub fn new(restart_base: usize) -> Self {
        Self {
            restart_base,
            stats: EngineStats::default(),
        }
    }
}

impl Default for Cdcl {
    fn default() -> Self {
        Self::new(RESTART_BASE)
    }
}

impl SatEngine for Cdcl {
    fn solve(&mut self, cnf: &Cnf) -> Result<Verdict, EngineError> {
        validate_instance(cnf)?;
        let mut search = Search::new(cnf, self.restart_base);
        let verdict = search.run();
        self.stats.merge(&search.stats);
        Ok(verdict)
    }

    fn stats(&self) -> EngineStats {
        self.stats
    }
}

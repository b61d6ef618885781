//! Property-based tests for the congruence closure and the refinement
//! loop, checked against brute-force oracles on small random universes.

use euf_solver::euf::congruence::Congruence;
use euf_solver::euf::driver::Driver;
use euf_solver::euf::formula::Formula;
use euf_solver::euf::term::{Term, TermArena, TermId};
use euf_solver::sat::cdcl::Cdcl;
use euf_solver::sat::dpll::Dpll;
use proptest::prelude::*;

/// Builds `constants` fresh constants and, over each, a chain of `depth`
/// applications of a shared unary function.
fn build_universe(constants: usize, depth: usize) -> (TermArena, Vec<TermId>) {
    let mut arena = TermArena::new();
    let f = arena.declare_fun("f", 1).unwrap();

    let mut terms = Vec::new();
    for i in 0..constants {
        let fun = arena.declare_fun(&format!("c{i}"), 0).unwrap();
        let mut term = arena.constant(fun).unwrap();
        terms.push(term);
        for _ in 0..depth {
            term = arena.apply(f, &[term]).unwrap();
            terms.push(term);
        }
    }

    (arena, terms)
}

/// Saturates the relation by hand: reflexivity and the asserted pairs to
/// start, then transitivity and congruence to a fixpoint. Quadratic in the
/// universe and only fit for the small instances the strategies produce.
fn naive_closure(
    arena: &TermArena,
    terms: &[TermId],
    merges: &[(TermId, TermId)],
) -> Vec<Vec<bool>> {
    let n = arena.len();
    let mut related = vec![vec![false; n]; n];
    for &term in terms {
        related[term.index()][term.index()] = true;
    }
    for &(a, b) in merges {
        related[a.index()][b.index()] = true;
        related[b.index()][a.index()] = true;
    }

    loop {
        let mut changed = false;

        for i in 0..n {
            for j in 0..n {
                if !related[i][j] {
                    continue;
                }
                for k in 0..n {
                    if related[j][k] && !related[i][k] {
                        related[i][k] = true;
                        related[k][i] = true;
                        changed = true;
                    }
                }
            }
        }

        for &left in terms {
            for &right in terms {
                if related[left.index()][right.index()] {
                    continue;
                }
                let (
                    Term::Apply {
                        fun: left_fun,
                        args: left_args,
                    },
                    Term::Apply {
                        fun: right_fun,
                        args: right_args,
                    },
                ) = (arena.term(left), arena.term(right))
                else {
                    continue;
                };
                if left_fun == right_fun
                    && left_args.len() == right_args.len()
                    && left_args
                        .iter()
                        .zip(right_args.iter())
                        .all(|(x, y)| related[x.index()][y.index()])
                {
                    related[left.index()][right.index()] = true;
                    related[right.index()][left.index()] = true;
                    changed = true;
                }
            }
        }

        if !changed {
            return related;
        }
    }
}

/// A small universe plus a list of merges given as indices into it.
fn arb_universe() -> impl Strategy<Value = (usize, usize, Vec<(usize, usize)>)> {
    (2..5usize, 0..3usize).prop_flat_map(|(constants, depth)| {
        let total = constants * (depth + 1);
        (
            Just(constants),
            Just(depth),
            proptest::collection::vec((0..total, 0..total), 0..12),
        )
    })
}

/// The same merges twice, the second copy in a random order.
fn arb_universe_with_shuffle()
-> impl Strategy<Value = (usize, usize, Vec<(usize, usize)>, Vec<(usize, usize)>)> {
    arb_universe().prop_flat_map(|(constants, depth, pairs)| {
        let shuffled = Just(pairs.clone()).prop_shuffle();
        (Just(constants), Just(depth), Just(pairs), shuffled)
    })
}

proptest! {
    /// The closure relates exactly the pairs the brute-force fixpoint does.
    #[test]
    fn test_closure_matches_brute_force((constants, depth, pairs) in arb_universe()) {
        let (arena, terms) = build_universe(constants, depth);
        let merges: Vec<(TermId, TermId)> =
            pairs.iter().map(|&(i, j)| (terms[i], terms[j])).collect();

        let mut closure = Congruence::new(&arena);
        for &(a, b) in &merges {
            closure.merge(a, b);
        }

        let oracle = naive_closure(&arena, &terms, &merges);
        for &left in &terms {
            for &right in &terms {
                prop_assert_eq!(
                    closure.same_class(left, right),
                    oracle[left.index()][right.index()],
                    "closure and oracle disagree on ({}, {})",
                    arena.display(left),
                    arena.display(right)
                );
            }
        }
    }

    /// Re-merging pairs that are already in one class changes nothing.
    #[test]
    fn test_merge_is_idempotent((constants, depth, pairs) in arb_universe()) {
        let (arena, terms) = build_universe(constants, depth);

        let mut closure = Congruence::new(&arena);
        for &(i, j) in &pairs {
            closure.merge(terms[i], terms[j]);
        }

        let count = closure.merge_count();
        let mut related = Vec::new();
        for &left in &terms {
            for &right in &terms {
                if closure.same_class(left, right) {
                    related.push((left, right));
                }
            }
        }

        for &(a, b) in &related {
            closure.merge(a, b);
        }

        prop_assert_eq!(closure.merge_count(), count);
        for &(a, b) in &related {
            prop_assert!(closure.same_class(a, b));
        }
    }

    /// The final partition does not depend on the order merges arrive in.
    #[test]
    fn test_closure_ignores_merge_order(
        (constants, depth, pairs, shuffled) in arb_universe_with_shuffle()
    ) {
        let (arena, terms) = build_universe(constants, depth);

        let mut forward = Congruence::new(&arena);
        for &(i, j) in &pairs {
            forward.merge(terms[i], terms[j]);
        }

        let mut reordered = Congruence::new(&arena);
        for &(i, j) in &shuffled {
            // Swapping the sides must not matter either.
            reordered.merge(terms[j], terms[i]);
        }

        for &left in &terms {
            for &right in &terms {
                prop_assert_eq!(
                    forward.same_class(left, right),
                    reordered.same_class(left, right),
                    "order-dependent result for ({}, {})",
                    arena.display(left),
                    arena.display(right)
                );
            }
        }
    }

    /// One merge at the base of two application chains relates every level.
    #[test]
    fn test_congruence_propagates_up_chains(depth in 1..6usize) {
        let mut arena = TermArena::new();
        let f = arena.declare_fun("f", 1).unwrap();
        let a_fun = arena.declare_fun("a", 0).unwrap();
        let b_fun = arena.declare_fun("b", 0).unwrap();

        let mut left = arena.constant(a_fun).unwrap();
        let mut right = arena.constant(b_fun).unwrap();
        let mut levels = vec![(left, right)];
        for _ in 0..depth {
            left = arena.apply(f, &[left]).unwrap();
            right = arena.apply(f, &[right]).unwrap();
            levels.push((left, right));
        }

        let mut closure = Congruence::new(&arena);
        let (base_left, base_right) = levels[0];
        closure.merge(base_left, base_right);

        for &(l, r) in &levels {
            prop_assert!(closure.same_class(l, r));
        }
    }
}

/// What one random assertion looks like before terms exist.
#[derive(Debug, Clone)]
enum AssertDesc {
    Equal(usize, usize),
    Distinct(usize, usize),
    Either((usize, usize), (usize, usize)),
}

/// Up to five assertions over a handful of constants. Small enough that
/// the model space bounds the refinement rounds well under the default cap.
fn arb_assertions() -> impl Strategy<Value = (usize, Vec<AssertDesc>)> {
    (3..5usize).prop_flat_map(|constants| {
        let pair = (0..constants, 0..constants);
        let desc = prop_oneof![
            pair.clone().prop_map(|(a, b)| AssertDesc::Equal(a, b)),
            pair.clone().prop_map(|(a, b)| AssertDesc::Distinct(a, b)),
            (pair.clone(), pair).prop_map(|(first, second)| AssertDesc::Either(first, second)),
        ];
        (Just(constants), proptest::collection::vec(desc, 1..6))
    })
}

fn build_formula(terms: &[TermId], asserts: &[AssertDesc]) -> Formula {
    let parts = asserts
        .iter()
        .map(|desc| match *desc {
            AssertDesc::Equal(a, b) => Formula::equality(terms[a], terms[b]),
            AssertDesc::Distinct(a, b) => Formula::disequality(terms[a], terms[b]),
            AssertDesc::Either((a, b), (c, d)) => Formula::Or(vec![
                Formula::equality(terms[a], terms[b]),
                Formula::equality(terms[c], terms[d]),
            ]),
        })
        .collect();
    Formula::And(parts)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Both engines drive the loop to the same verdict, within the round cap.
    #[test]
    fn test_engines_agree_on_random_assertions((constants, asserts) in arb_assertions()) {
        let (arena, terms) = build_universe(constants, 0);
        let formula = build_formula(&terms, &asserts);

        let mut cdcl = Driver::new(&arena, &formula, Cdcl::default()).unwrap();
        let mut dpll = Driver::new(&arena, &formula, Dpll::new()).unwrap();

        let left = cdcl.solve().unwrap();
        let right = dpll.solve().unwrap();

        prop_assert_eq!(left, right);
        prop_assert!(cdcl.stats().rounds >= 1);
    }

    /// Without disequalities there is nothing for the theory to refute.
    #[test]
    fn test_equalities_alone_are_satisfiable(
        (constants, pairs) in (3..6usize).prop_flat_map(|constants| {
            (
                Just(constants),
                proptest::collection::vec((0..constants, 0..constants), 1..8),
            )
        })
    ) {
        let (arena, terms) = build_universe(constants, 0);
        let parts = pairs
            .iter()
            .map(|&(a, b)| Formula::equality(terms[a], terms[b]))
            .collect();
        let formula = Formula::And(parts);

        let mut driver = Driver::new(&arena, &formula, Cdcl::default()).unwrap();
        let outcome = driver.solve().unwrap();

        prop_assert_eq!(outcome, euf_solver::euf::Outcome::Sat);
        prop_assert_eq!(driver.stats().rounds, 1);
        prop_assert_eq!(driver.stats().theory_conflicts, 0);
    }
}

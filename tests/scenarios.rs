//! End-to-end runs over SMT-LIB scripts: parse, abstract, refine, verdict.
//! Every satisfiability scenario is checked with both engines.

use euf_solver::euf::{Driver, Outcome, SolverError};
use euf_solver::sat::cdcl::Cdcl;
use euf_solver::sat::dpll::Dpll;
use euf_solver::smtlib::parse_script;

fn solve_both(source: &str) -> Outcome {
    let script = parse_script(source).expect("script should parse");
    let formula = script
        .conjunction()
        .expect("script should have assertions");

    let mut cdcl = Driver::new(&script.arena, &formula, Cdcl::default())
        .expect("abstraction should succeed");
    let with_cdcl = cdcl.solve().expect("cdcl refinement should finish");

    let mut dpll = Driver::new(&script.arena, &formula, Dpll::new())
        .expect("abstraction should succeed");
    let with_dpll = dpll.solve().expect("dpll refinement should finish");

    assert_eq!(with_cdcl, with_dpll, "engines disagree on {source}");
    with_cdcl
}

#[test]
fn test_plain_equalities_report_sat() {
    let outcome = solve_both(
        "(set-logic QF_UF)
         (declare-sort U 0)
         (declare-fun a () U)
         (declare-fun b () U)
         (declare-fun c () U)
         (assert (= a b))
         (assert (= b c))
         (check-sat)",
    );
    assert_eq!(outcome, Outcome::Sat);
}

#[test]
fn test_independent_chains_accept_the_first_model() {
    // Two equality chains over disjoint constants cannot conflict, so the
    // first propositional model already passes the theory check.
    let script = parse_script(
        "(set-logic QF_UF)
         (declare-sort U 0)
         (declare-fun a () U)
         (declare-fun b () U)
         (declare-fun c () U)
         (declare-fun x () U)
         (declare-fun y () U)
         (declare-fun z () U)
         (assert (= a b))
         (assert (= b c))
         (assert (= x y))
         (assert (= y z))
         (check-sat)",
    )
    .unwrap();
    let formula = script.conjunction().unwrap();

    let mut driver = Driver::new(&script.arena, &formula, Cdcl::default()).unwrap();
    let outcome = driver.solve().unwrap();

    assert_eq!(outcome, Outcome::Sat);
    assert_eq!(driver.stats().rounds, 1);
    assert_eq!(driver.stats().theory_conflicts, 0);
}

#[test]
fn test_transitive_congruence_chain_is_unsat() {
    let outcome = solve_both(
        "(set-logic QF_UF)
         (declare-sort U 0)
         (declare-fun a () U)
         (declare-fun b () U)
         (declare-fun c () U)
         (declare-fun f (U) U)
         (assert (= a b))
         (assert (= b c))
         (assert (not (= (f a) (f c))))
         (check-sat)",
    );
    assert_eq!(outcome, Outcome::Unsat);
}

#[test]
fn test_binary_function_congruence_is_unsat() {
    let outcome = solve_both(
        "(set-logic QF_UF)
         (declare-sort U 0)
         (declare-fun a () U)
         (declare-fun b () U)
         (declare-fun c () U)
         (declare-fun d () U)
         (declare-fun g (U U) U)
         (assert (= a b))
         (assert (= c d))
         (assert (not (= (g a c) (g b d))))
         (check-sat)",
    );
    assert_eq!(outcome, Outcome::Unsat);
}

#[test]
fn test_disjunction_lets_a_model_escape() {
    let outcome = solve_both(
        "(set-logic QF_UF)
         (declare-sort U 0)
         (declare-fun a () U)
         (declare-fun b () U)
         (declare-fun c () U)
         (assert (or (= a b) (= a c)))
         (assert (not (= a b)))
         (check-sat)",
    );
    assert_eq!(outcome, Outcome::Sat);
}

#[test]
fn test_predicates_stay_propositional() {
    // Uninterpreted predicates are carried as opaque atoms, so p(a) and
    // (not (p b)) can coexist with a = b.
    let outcome = solve_both(
        "(set-logic QF_UF)
         (declare-sort U 0)
         (declare-fun a () U)
         (declare-fun b () U)
         (declare-fun p (U) Bool)
         (assert (p a))
         (assert (not (p b)))
         (assert (= a b))
         (check-sat)",
    );
    assert_eq!(outcome, Outcome::Sat);
}

#[test]
fn test_distinct_folds_to_pairwise_disequalities() {
    let outcome = solve_both(
        "(set-logic QF_UF)
         (declare-sort U 0)
         (declare-fun a () U)
         (declare-fun b () U)
         (declare-fun c () U)
         (assert (distinct a b c))
         (assert (= a c))
         (check-sat)",
    );
    assert_eq!(outcome, Outcome::Unsat);
}

#[test]
fn test_distinct_triple_is_satisfiable_alone() {
    let outcome = solve_both(
        "(set-logic QF_UF)
         (declare-sort U 0)
         (declare-fun a () U)
         (declare-fun b () U)
         (declare-fun c () U)
         (assert (distinct a b c))
         (check-sat)",
    );
    assert_eq!(outcome, Outcome::Sat);
}

#[test]
fn test_chained_equality_reads_as_conjunction() {
    let outcome = solve_both(
        "(set-logic QF_UF)
         (declare-sort U 0)
         (declare-fun a () U)
         (declare-fun b () U)
         (declare-fun c () U)
         (assert (= a b c))
         (assert (not (= a c)))
         (check-sat)",
    );
    assert_eq!(outcome, Outcome::Unsat);
}

#[test]
fn test_iterated_application_collapses() {
    // From f(f(a)) = a and f(f(f(a))) = a the closure derives f(a) = a.
    let outcome = solve_both(
        "(set-logic QF_UF)
         (declare-sort U 0)
         (declare-fun a () U)
         (declare-fun f (U) U)
         (assert (= (f (f a)) a))
         (assert (= (f (f (f a))) a))
         (assert (not (= (f a) a)))
         (check-sat)",
    );
    assert_eq!(outcome, Outcome::Unsat);
}

#[test]
fn test_unrelated_applications_stay_apart() {
    let outcome = solve_both(
        "(set-logic QF_UF)
         (declare-sort U 0)
         (declare-fun a () U)
         (declare-fun b () U)
         (declare-fun f (U) U)
         (assert (= (f a) b))
         (assert (not (= (f b) a)))
         (check-sat)",
    );
    assert_eq!(outcome, Outcome::Sat);
}

#[test]
fn test_two_rounds_learn_a_blocking_clause() {
    let script = parse_script(
        "(set-logic QF_UF)
         (declare-sort U 0)
         (declare-fun a () U)
         (declare-fun b () U)
         (declare-fun f (U) U)
         (assert (= a b))
         (assert (not (= (f a) (f b))))
         (check-sat)",
    )
    .unwrap();
    let formula = script.conjunction().unwrap();

    let mut driver = Driver::new(&script.arena, &formula, Cdcl::default()).unwrap();
    let outcome = driver.solve().unwrap();

    assert_eq!(outcome, Outcome::Unsat);
    assert_eq!(driver.stats().rounds, 2);
    assert_eq!(driver.stats().theory_conflicts, 1);

    let blocking = driver.cnf().iter().filter(|clause| clause.learnt).count();
    assert_eq!(blocking, 1);
}

#[test]
fn test_round_limit_reports_resource_exhaustion() {
    let script = parse_script(
        "(set-logic QF_UF)
         (declare-sort U 0)
         (declare-fun a () U)
         (declare-fun b () U)
         (declare-fun f (U) U)
         (assert (= a b))
         (assert (not (= (f a) (f b))))
         (check-sat)",
    )
    .unwrap();
    let formula = script.conjunction().unwrap();

    let mut driver = Driver::new(&script.arena, &formula, Cdcl::default())
        .unwrap()
        .with_max_rounds(1);
    let error = driver.solve().unwrap_err();

    assert!(matches!(error, SolverError::RoundLimit(1)));
}

#[test]
fn test_unknown_symbol_is_rejected() {
    let error = parse_script(
        "(set-logic QF_UF)
         (declare-sort U 0)
         (assert (= a b))
         (check-sat)",
    )
    .unwrap_err();

    assert!(matches!(error, SolverError::UnknownSymbol(name) if name == "a"));
}

#[test]
fn test_arity_mismatch_is_rejected() {
    let error = parse_script(
        "(set-logic QF_UF)
         (declare-sort U 0)
         (declare-fun a () U)
         (declare-fun f (U) U)
         (assert (= (f a a) a))
         (check-sat)",
    )
    .unwrap_err();

    assert!(matches!(
        error,
        SolverError::ArityMismatch {
            expected: 1,
            found: 2,
            ..
        }
    ));
}

#[test]
fn test_unrecognised_logic_still_solves() {
    // The declared logic carries no semantics here; a QF_UFLIA header over
    // equality-only assertions solves like any other script.
    let outcome = solve_both(
        "(set-logic QF_UFLIA)
         (declare-sort U 0)
         (declare-fun a () U)
         (declare-fun b () U)
         (declare-fun c () U)
         (assert (= a b))
         (assert (= b c))
         (assert (not (= a c)))
         (check-sat)",
    );
    assert_eq!(outcome, Outcome::Unsat);
}

#[test]
fn test_empty_script_is_trivially_satisfiable() {
    let script = parse_script("(set-logic QF_UF)(check-sat)").unwrap();

    assert!(script.check_sat);
    assert_eq!(script.logic.as_deref(), Some("QF_UF"));
    assert!(script.conjunction().is_none());
}

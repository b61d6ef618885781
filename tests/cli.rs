//! Runs the compiled binary and checks its stream discipline: stdout
//! carries nothing but verdict lines, statistics and progress go to stderr.

use std::fs;
use std::process::{Command, Output};

fn run_solver(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_euf-solver"))
        .args(args)
        .output()
        .expect("the solver binary should run")
}

#[test]
fn test_stdout_carries_only_the_verdict() {
    let output = run_solver(&[
        "text",
        "--input",
        "(set-logic QF_UF)(declare-sort U 0)\
         (declare-fun a () U)(declare-fun b () U)(declare-fun f (U) U)\
         (assert (= a b))(assert (not (= (f a) (f b))))(check-sat)",
    ]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "unsat\n");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Problem Statistics"));
    assert!(stderr.contains("Search Statistics"));
}

#[test]
fn test_stats_can_be_silenced() {
    let output = run_solver(&[
        "text",
        "--input",
        "(set-logic QF_UF)(declare-sort U 0)\
         (declare-fun a () U)(assert (= a a))(check-sat)",
        "--stats",
        "false",
    ]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "sat\n");
    assert!(!String::from_utf8_lossy(&output.stderr).contains("Statistics"));
}

#[test]
fn test_directory_sweep_keeps_stdout_machine_readable() {
    let dir = std::env::temp_dir().join(format!("euf-solver-sweep-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("equal.smt2"),
        "(set-logic QF_UF)(declare-sort U 0)\
         (declare-fun a () U)(declare-fun b () U)\
         (assert (= a b))(check-sat)",
    )
    .unwrap();
    fs::write(
        dir.join("contradiction.smt2"),
        "(set-logic QF_UF)(declare-sort U 0)\
         (declare-fun a () U)(declare-fun b () U)\
         (assert (= a b))(assert (not (= a b)))(check-sat)",
    )
    .unwrap();
    fs::write(dir.join("notes.txt"), "not a script").unwrap();

    let output = run_solver(&[dir.to_str().unwrap()]);
    fs::remove_dir_all(&dir).unwrap();

    assert!(output.status.success());

    // Traversal order is unspecified, so compare the sorted verdicts.
    let mut verdicts: Vec<_> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_owned)
        .collect();
    verdicts.sort_unstable();
    assert_eq!(verdicts, ["sat", "unsat"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Solving:"), "progress lines belong on stderr");
    assert!(stderr.contains("Skipping"), "skip notes belong on stderr");
}

//! Exercises §8 scenario 6: a failed REPL input must leave the persisted
//! `(TypeEnv, RuntimeEnv, Store)` exactly as they were before the attempt.
use bramble::evaluator::Value;
use bramble::runner::{PipelineResult, Runner};
use test_utils::CapturingIo;

#[test]
fn a_failed_input_does_not_disturb_earlier_bindings() {
    let mut runner = Runner::new();
    let mut io = CapturingIo::default();

    match runner.run_repl_input("val a = 10", &mut io) {
        PipelineResult::Success(value) => assert!(matches!(value, Value::Unit)),
        PipelineResult::Failure(message) => panic!("expected success, got {message}"),
    }

    match runner.run_repl_input("a + 5", &mut io) {
        PipelineResult::Success(value) => assert!(matches!(value, Value::Int(15))),
        PipelineResult::Failure(message) => panic!("expected success, got {message}"),
    }

    match runner.run_repl_input("a = \"hi\"", &mut io) {
        PipelineResult::Success(value) => panic!("expected a type error, got {value:?}"),
        PipelineResult::Failure(message) => assert!(message.contains("TypeError")),
    }

    io.stdout.clear();
    match runner.run_repl_input("print(a)", &mut io) {
        PipelineResult::Success(_) => assert_eq!(io.stdout, "10\n"),
        PipelineResult::Failure(message) => panic!("expected success, got {message}"),
    }
}

#[test]
fn a_failed_input_does_not_leak_a_half_bound_name() {
    let mut runner = Runner::new();
    let mut io = CapturingIo::default();

    // `y`'s declared type (String) conflicts with its initializer (Int):
    // the type-check fails, so `y` must not become callable/referenceable
    // in a later input.
    match runner.run_repl_input("val y: String = 1", &mut io) {
        PipelineResult::Success(value) => panic!("expected a type error, got {value:?}"),
        PipelineResult::Failure(message) => assert!(message.contains("TypeError")),
    }

    match runner.run_repl_input("y", &mut io) {
        PipelineResult::Success(value) => panic!("expected undefined-name error, got {value:?}"),
        PipelineResult::Failure(message) => assert!(message.contains("undefined")),
    }
}

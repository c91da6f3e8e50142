use bramble::runner::{PipelineResult, Runner};
use test_utils::CapturingIo;

#[test]
fn input_reads_a_line_and_echoes_the_prompt() {
    let mut runner = Runner::new();
    let mut io = CapturingIo::with_input(["Ada"]);

    match runner.run_source(r#"val name = input("name? ")
print("hello " + name)"#, &mut io) {
        PipelineResult::Success(_) => {
            assert_eq!(io.stdout, "name? hello Ada\n");
        }
        PipelineResult::Failure(message) => panic!("expected success, got {message}"),
    }
}

#[test]
fn input_defaults_to_an_empty_prompt() {
    let mut runner = Runner::new();
    let mut io = CapturingIo::with_input(["line one", "line two"]);

    match runner.run_source("print(input())\nprint(input())", &mut io) {
        PipelineResult::Success(_) => {
            assert_eq!(io.stdout, "line one\nline two\n");
        }
        PipelineResult::Failure(message) => panic!("expected success, got {message}"),
    }
}

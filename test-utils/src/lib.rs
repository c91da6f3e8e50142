//! Shared helpers for bramble's integration tests.
//!
//! Drives the pipeline in-process through [`Runner::run_source`] with an
//! in-memory [`Io`] that captures `print`/`input` traffic instead of
//! touching the real terminal, and asserts the captured stdout against an
//! expected string.
use std::error::Error;
use std::fmt;

use bramble::evaluator::Io;
use bramble::runner::{PipelineResult, Runner};

/// Captures everything `print` writes; `input` always sees end-of-input
/// unless pre-seeded, since the integration tests don't exercise it.
#[derive(Default)]
pub struct CapturingIo {
    pub stdout: String,
    pub input_lines: Vec<String>,
}

impl CapturingIo {
    pub fn with_input(lines: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            stdout: String::new(),
            input_lines: lines.into_iter().map(str::to_owned).collect(),
        }
    }
}

impl Io for CapturingIo {
    fn print(&mut self, text: &str) {
        self.stdout.push_str(text);
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.stdout.push_str(prompt);
        if self.input_lines.is_empty() {
            None
        } else {
            Some(self.input_lines.remove(0))
        }
    }
}

#[derive(Debug)]
struct PipelineFailed(String);

impl fmt::Display for PipelineFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipeline failed: {}", self.0)
    }
}

impl Error for PipelineFailed {}

#[derive(Debug)]
struct PipelineUnexpectedlySucceeded;

impl fmt::Display for PipelineUnexpectedlySucceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected the pipeline to fail, but it succeeded")
    }
}

impl Error for PipelineUnexpectedlySucceeded {}

pub struct Expected<'a> {
    pub stdout: &'a str,
}

/// Run `source` through a fresh [`Runner`] and assert its captured stdout
/// matches `expected.stdout`. Fails the test if the pipeline itself fails.
pub fn run_and_check(source: &str, expected: Expected) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new();
    let mut io = CapturingIo::default();

    match runner.run_source(source, &mut io) {
        PipelineResult::Success(_) => {
            pretty_assertions::assert_eq!(io.stdout, expected.stdout);
            Ok(())
        }
        PipelineResult::Failure(message) => Err(Box::new(PipelineFailed(message))),
    }
}

/// Run `source` and assert the pipeline fails at some stage (lex, parse,
/// type-check, or eval). Returns the failure message for further asserts.
pub fn expect_failure(source: &str) -> Result<String, Box<dyn Error>> {
    let mut runner = Runner::new();
    let mut io = CapturingIo::default();

    match runner.run_source(source, &mut io) {
        PipelineResult::Failure(message) => Ok(message),
        PipelineResult::Success(_) => Err(Box::new(PipelineUnexpectedlySucceeded)),
    }
}

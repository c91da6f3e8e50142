//! Pipeline orchestration: wires lexer -> parser -> desugarer -> typechecker
//! -> evaluator together and converts whatever a stage raises into a single
//! user-facing [`PipelineResult`].
mod repl;

use std::fs;
use std::path::Path;

use log::debug;

use crate::ast::core::CoreBlock;
use crate::desugar::desugar_program;
use crate::evaluator::{Evaluator, Io, RuntimeEnv, StdIo, Store, Value};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::typechecker::{Checker, TypeEnv};

/// The sole externally visible outcome of any stage the runner drives.
#[derive(Debug, Clone)]
pub enum PipelineResult<T> {
    Success(T),
    Failure(String),
}

/// Owns the three structures that persist across REPL inputs: the type
/// environment (plus the checker's substitution state, which must persist
/// alongside it so type variables don't collide across inputs), the
/// runtime environment, and the store.
pub struct Runner {
    checker: Checker,
    type_env: TypeEnv,
    runtime_env: RuntimeEnv,
    store: Store,
}

impl Runner {
    pub fn new() -> Self {
        let mut checker = Checker::new();
        let mut type_env = TypeEnv::new();
        checker.seed_builtins(&mut type_env);

        let mut runtime_env = RuntimeEnv::new();
        let mut store = Store::new();
        Evaluator::seed_builtins(&mut runtime_env, &mut store);

        Self {
            checker,
            type_env,
            runtime_env,
            store,
        }
    }

    /// `runFile(path)`: run a whole file through the pipeline once, with
    /// its own fresh state. Returns the process exit code.
    pub fn run_file(path: &Path) -> i32 {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("error: could not read {}: {err}", path.display());
                return 2;
            }
        };

        let mut runner = Runner::new();
        let mut io = StdIo;

        match runner.run_source(&source, &mut io) {
            PipelineResult::Success(_) => 0,
            PipelineResult::Failure(message) => {
                eprintln!("{message}");
                1
            }
        }
    }

    /// `runRepl()`: the interactive front end. See [`repl`] for the
    /// multi-line reader and prompt logic.
    pub fn run_repl() -> i32 {
        repl::run(Runner::new())
    }

    fn lex_parse_desugar(source: &str) -> Result<CoreBlock, String> {
        let tokens = Lexer::lex(source).map_err(|err| format!("LexError: {err}"))?;
        let program = Parser::parse_program(tokens).map_err(|err| format!("ParseError: {err}"))?;
        Ok(desugar_program(program))
    }

    /// `runTypecheck` + `runEval` in one pass, mutating this runner's state
    /// directly — used for a one-shot file run where there is no need to
    /// roll anything back on failure.
    pub fn run_source(&mut self, source: &str, io: &mut dyn Io) -> PipelineResult<Value> {
        let block = match Self::lex_parse_desugar(source) {
            Ok(block) => block,
            Err(message) => return PipelineResult::Failure(message),
        };

        if let Err(err) = self.checker.check_program(&mut self.type_env, &block) {
            return PipelineResult::Failure(format!("TypeError: {err}"));
        }
        debug!("type-check succeeded");

        let mut evaluator = Evaluator::new(io);
        match evaluator.eval_program(&mut self.runtime_env, &mut self.store, &block) {
            Ok(value) => PipelineResult::Success(value),
            Err(err) => PipelineResult::Failure(format!("RuntimeError: {err}")),
        }
    }

    /// `runEvalIncremental`: the REPL path. Computes candidate next-states
    /// for every persisted structure and swaps them in only once both
    /// type-check and eval succeed — a failure at either stage leaves
    /// `(TypeEnv, RuntimeEnv, Store)` pointwise identical to their pre-run
    /// values.
    pub fn run_repl_input(&mut self, source: &str, io: &mut dyn Io) -> PipelineResult<Value> {
        let block = match Self::lex_parse_desugar(source) {
            Ok(block) => block,
            Err(message) => return PipelineResult::Failure(message),
        };

        let mut candidate_checker = self.checker.clone();
        let mut candidate_type_env = self.type_env.clone();

        if let Err(err) = candidate_checker.check_program(&mut candidate_type_env, &block) {
            return PipelineResult::Failure(format!("TypeError: {err}"));
        }

        let mut candidate_runtime_env = self.runtime_env.clone();
        let mut candidate_store = self.store.clone();

        let mut evaluator = Evaluator::new(io);
        match evaluator.eval_program(&mut candidate_runtime_env, &mut candidate_store, &block) {
            Ok(value) => {
                self.checker = candidate_checker;
                self.type_env = candidate_type_env;
                self.runtime_env = candidate_runtime_env;
                self.store = candidate_store;
                PipelineResult::Success(value)
            }
            Err(err) => PipelineResult::Failure(format!("RuntimeError: {err}")),
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

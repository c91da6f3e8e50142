//! Command-line argument parsing for the `bramble` binary.
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// A single optional positional file: given, run it; omitted, start the
/// REPL. Clap handles `--help` (exit 0) and malformed arguments (exit 2)
/// on its own.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a source file to run. If omitted, starts the REPL.
    #[arg(index = 1)]
    pub file: Option<PathBuf>,

    /// Specify the log level of the interpreter.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

/// Enum for specifying the log level of the interpreter.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// Also log warnings.
    #[value(alias("1"))]
    Warn,

    /// Also log information about the general progress of a run.
    #[value(alias("2"))]
    Info,

    /// Log everything which happens internally in the pipeline.
    #[value(alias("3"))]
    Debug,

    /// Log extra information, including per-stage internals.
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

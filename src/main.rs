use std::process::ExitCode;

use bramble::cli::Cli;
use bramble::runner::Runner;

fn main() -> ExitCode {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into()).expect("logger installs exactly once");

    let code = match args.file {
        Some(path) => Runner::run_file(&path),
        None => Runner::run_repl(),
    };

    ExitCode::from(code as u8)
}

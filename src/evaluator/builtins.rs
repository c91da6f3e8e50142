use crate::position::Position;

use super::error::{RuntimeError, RuntimeResult};
use super::value::{Builtin, Value};

/// The evaluator's two external collaborators, named directly in the
/// pipeline's concurrency model: the logging/print sink and the terminal
/// line reader `input` blocks on.
pub trait Io {
    fn print(&mut self, text: &str);
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// `Io` for file mode and any other non-interactive run: writes straight to
/// stdout, reads a line from stdin.
pub struct StdIo;

impl Io for StdIo {
    fn print(&mut self, text: &str) {
        use std::io::Write;
        print!("{text}");
        let _ = std::io::stdout().flush();
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        use std::io::Write;
        print!("{prompt}");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_owned()),
            Err(_) => None,
        }
    }
}

pub const BUILTIN_NAMES: [&str; 5] = ["print", "input", "str", "min", "max"];

pub fn lookup(name: &str) -> Option<Builtin> {
    let (name, func) = match name {
        "print" => ("print", builtin_print as super::value::BuiltinFn),
        "input" => ("input", builtin_input),
        "str" => ("str", builtin_str),
        "min" => ("min", builtin_min),
        "max" => ("max", builtin_max),
        _ => return None,
    };

    Some(Builtin { name, func })
}

fn builtin_print(args: &[Value], _position: Position, io: &mut dyn Io) -> RuntimeResult<Value> {
    let rendered = args
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    io.print(&rendered);
    io.print("\n");
    Ok(Value::Unit)
}

fn builtin_input(args: &[Value], position: Position, io: &mut dyn Io) -> RuntimeResult<Value> {
    let prompt = match args.first() {
        Some(Value::Str(s)) => s.clone(),
        Some(_) => {
            return Err(RuntimeError::new(
                position,
                "input's prompt argument must be a string",
            ))
        }
        None => String::new(),
    };

    let line = io.read_line(&prompt).unwrap_or_default();
    Ok(Value::Str(line))
}

fn builtin_str(args: &[Value], _position: Position, _io: &mut dyn Io) -> RuntimeResult<Value> {
    Ok(Value::Str(args[0].to_string()))
}

fn as_int(value: &Value) -> i64 {
    match value {
        Value::Int(n) => *n,
        other => unreachable!("type checker guarantees an Int here, found {other:?}"),
    }
}

fn builtin_min(args: &[Value], _position: Position, _io: &mut dyn Io) -> RuntimeResult<Value> {
    Ok(Value::Int(args.iter().map(as_int).min().expect("arity checked")))
}

fn builtin_max(args: &[Value], _position: Position, _io: &mut dyn Io) -> RuntimeResult<Value> {
    Ok(Value::Int(args.iter().map(as_int).max().expect("arity checked")))
}

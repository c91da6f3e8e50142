//! The interactive front end. Reads one logical input at a time — which
//! may span several physical lines when braces or parens are left open —
//! and feeds it through [`Runner::run_repl_input`].
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::evaluator::StdIo;

use super::{PipelineResult, Runner};

const PRIMARY_PROMPT: &str = "> ";
const CONTINUATION_PROMPT: &str = "... ";

pub fn run(mut runner: Runner) -> i32 {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("error: could not start line editor: {err}");
            return 2;
        }
    };

    let mut io = StdIo;

    loop {
        let mut buffer = String::new();
        let mut prompt = PRIMARY_PROMPT;

        let interrupted = loop {
            match editor.readline(prompt) {
                Ok(line) => {
                    if !buffer.is_empty() {
                        buffer.push('\n');
                    }
                    buffer.push_str(&line);

                    if buffer.trim().is_empty() {
                        // Nothing but blank lines so far: stay at the
                        // primary prompt rather than submitting an empty
                        // input.
                        buffer.clear();
                        prompt = PRIMARY_PROMPT;
                        continue;
                    }

                    if compute_balance(&buffer) > 0 {
                        prompt = CONTINUATION_PROMPT;
                        continue;
                    }

                    break false;
                }
                Err(ReadlineError::Interrupted) => break true,
                Err(ReadlineError::Eof) => return 0,
                Err(err) => {
                    eprintln!("error: {err}");
                    return 1;
                }
            }
        };

        if interrupted || buffer.trim().is_empty() {
            continue;
        }

        let _ = editor.add_history_entry(buffer.as_str());

        match runner.run_repl_input(&buffer, &mut io) {
            PipelineResult::Success(value) => {
                if !matches!(value, crate::evaluator::Value::Unit) {
                    println!("{value}");
                }
            }
            PipelineResult::Failure(message) => println!("{message}"),
        }
    }
}

/// Counts unmatched `{`/`(` versus `}`/`)` in `text`, skipping over string
/// literal contents (honoring `\"` escapes) and `//` line comments, so a
/// brace or paren mentioned inside either doesn't force a continuation
/// prompt.
fn compute_balance(text: &str) -> i64 {
    let mut balance: i64 = 0;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next == '\\' {
                        chars.next();
                    } else if next == '"' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '{' | '(' => balance += 1,
            '}' | ')' => balance -= 1,
            _ => {}
        }
    }

    balance
}

#[cfg(test)]
mod tests {
    use super::compute_balance;

    #[test]
    fn balanced_input_is_zero() {
        assert_eq!(compute_balance("print(1 + 2)"), 0);
    }

    #[test]
    fn open_brace_is_positive() {
        assert_eq!(compute_balance("def f() {"), 1);
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        assert_eq!(compute_balance(r#"print("{")"#), 0);
    }

    #[test]
    fn braces_after_line_comment_are_ignored() {
        assert_eq!(compute_balance("val x = 1 // }"), 0);
    }
}

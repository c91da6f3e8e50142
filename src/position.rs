//! Source positions shared by every stage of the pipeline.

use std::fmt::Display;

/// A `(line, column)` pair, both 1-indexed.
///
/// Every token and AST node carries one so that a later stage can report a
/// useful location without re-scanning the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The position a fresh lexer starts at.
    pub const fn start() -> Self {
        Self::new(1, 1)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

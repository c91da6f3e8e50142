use std::fmt::Display;

use crate::position::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub position: Position,
    pub message: String,
}

impl RuntimeError {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.message, self.position)
    }
}

impl std::error::Error for RuntimeError {}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

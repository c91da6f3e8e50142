use std::fmt::Display;

use crate::position::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct TypeError {
    pub position: Position,
    pub message: String,
}

impl TypeError {
    pub fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

impl Display for TypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.message, self.position)
    }
}

impl std::error::Error for TypeError {}

pub type TypeResult<T> = Result<T, TypeError>;

use crate::position::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct IntLiteral {
    pub value: i64,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrLiteral {
    pub value: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoolLiteral {
    pub value: bool,
    pub position: Position,
}

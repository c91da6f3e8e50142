use super::{Block, Ident, Param, TypeName};
use crate::position::Position;

/// `def name(p1, p2: T = expr, ...) -> T { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FnDef {
    pub ident: Ident,
    pub params: Vec<Param>,
    pub return_type: Option<TypeName>,
    pub body: Block,
    pub position: Position,
}

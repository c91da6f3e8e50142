use super::{Block, Expr, Param};
use crate::position::Position;

/// Either `fn(params) { body }` or the compact `(params) => expr` form.
#[derive(Debug, Clone, PartialEq)]
pub enum LambdaBody {
    Block(Block),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub params: Vec<Param>,
    pub body: LambdaBody,
    pub position: Position,
}

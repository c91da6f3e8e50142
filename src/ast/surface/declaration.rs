use super::{Expr, Ident, TypeName};
use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Val,
    Var,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub mutability: Mutability,
    pub ident: Ident,
    pub type_annotation: Option<TypeName>,
    pub value: Expr,
    pub position: Position,
}

use super::{Expr, Ident, TypeName};
use crate::position::Position;

/// A function or lambda parameter, with its optional type annotation and
/// optional default-value expression.
///
/// Invariant enforced by the parser: parameters with a default must follow
/// every parameter without one.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ident: Ident,
    pub type_annotation: Option<TypeName>,
    pub default: Option<Expr>,
    pub position: Position,
}

use std::collections::HashMap;

use crate::position::Position;

use super::error::TypeError;
use super::types::Type;

/// A persistent-union-find-style mapping from type-variable id to the type
/// it was unified with. `resolve` walks chains of bound variables to a
/// fixpoint; there's no separate path-compression pass since sessions are
/// short-lived and chains stay shallow in practice.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    bindings: HashMap<usize, Type>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fully resolve a type: replace every bound `TVar` it mentions,
    /// recursively, leaving unbound `TVar`s as-is.
    pub fn resolve(&self, ty: &Type) -> Type {
        match ty {
            Type::TVar(id) => match self.bindings.get(id) {
                Some(bound) => self.resolve(bound),
                None => Type::TVar(*id),
            },
            Type::Fun {
                params,
                variadic_tail,
                default_count,
                result,
            } => Type::Fun {
                params: params.iter().map(|p| self.resolve(p)).collect(),
                variadic_tail: variadic_tail.as_ref().map(|t| Box::new(self.resolve(t))),
                default_count: *default_count,
                result: Box::new(self.resolve(result)),
            },
            other => other.clone(),
        }
    }

    fn bind(&mut self, var: usize, ty: Type, position: Position) -> Result<(), TypeError> {
        if self.occurs(var, &ty) {
            return Err(TypeError::new(
                position,
                format!("infinite type while unifying ?{var} with {ty}"),
            ));
        }
        self.bindings.insert(var, ty);
        Ok(())
    }

    fn occurs(&self, var: usize, ty: &Type) -> bool {
        match self.resolve(ty) {
            Type::TVar(id) => id == var,
            Type::Fun {
                params,
                variadic_tail,
                result,
                ..
            } => {
                params.iter().any(|p| self.occurs(var, p))
                    || variadic_tail
                        .as_ref()
                        .is_some_and(|t| self.occurs(var, t))
                    || self.occurs(var, &result)
            }
            _ => false,
        }
    }

    /// Unify two types, recording bindings as needed. Both types are
    /// resolved through the current substitution before comparison, so
    /// unification sees the most concrete form known so far.
    pub fn unify(&mut self, a: &Type, b: &Type, position: Position) -> Result<(), TypeError> {
        let a = self.resolve(a);
        let b = self.resolve(b);

        match (&a, &b) {
            (Type::TVar(x), Type::TVar(y)) if x == y => Ok(()),
            (Type::TVar(x), _) => self.bind(*x, b, position),
            (_, Type::TVar(y)) => self.bind(*y, a, position),
            (Type::Int, Type::Int)
            | (Type::Bool, Type::Bool)
            | (Type::String, Type::String)
            | (Type::Unit, Type::Unit) => Ok(()),
            (
                Type::Fun {
                    params: p1,
                    variadic_tail: v1,
                    result: r1,
                    ..
                },
                Type::Fun {
                    params: p2,
                    variadic_tail: v2,
                    result: r2,
                    ..
                },
            ) => {
                if p1.len() != p2.len() {
                    return Err(mismatch(&a, &b, position));
                }
                for (x, y) in p1.iter().zip(p2.iter()) {
                    self.unify(x, y, position)?;
                }
                match (v1, v2) {
                    (Some(x), Some(y)) => self.unify(x, y, position)?,
                    (None, None) => {}
                    _ => return Err(mismatch(&a, &b, position)),
                }
                self.unify(r1, r2, position)
            }
            _ => Err(mismatch(&a, &b, position)),
        }
    }
}

fn mismatch(expected: &Type, found: &Type, position: Position) -> TypeError {
    TypeError::new(position, format!("expected {expected}, got {found}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::start()
    }

    #[test]
    fn unifies_a_tvar_with_a_concrete_type() {
        let mut sub = Substitution::new();
        sub.unify(&Type::TVar(0), &Type::Int, pos()).unwrap();
        assert_eq!(sub.resolve(&Type::TVar(0)), Type::Int);
    }

    #[test]
    fn mismatched_constructors_fail() {
        let mut sub = Substitution::new();
        assert!(sub.unify(&Type::Int, &Type::Bool, pos()).is_err());
    }

    #[test]
    fn occurs_check_rejects_infinite_types() {
        let mut sub = Substitution::new();
        let fun = Type::fun(vec![Type::TVar(0)], Type::Int);
        assert!(sub.unify(&Type::TVar(0), &fun, pos()).is_err());
    }

    #[test]
    fn unifies_function_types_parameter_wise() {
        let mut sub = Substitution::new();
        let f1 = Type::fun(vec![Type::TVar(0)], Type::TVar(1));
        let f2 = Type::fun(vec![Type::Int], Type::Bool);
        sub.unify(&f1, &f2, pos()).unwrap();
        assert_eq!(sub.resolve(&Type::TVar(0)), Type::Int);
        assert_eq!(sub.resolve(&Type::TVar(1)), Type::Bool);
    }
}

use std::fmt::Display;

/// A type in the monomorphic Hindley-Milner-ish system. `TVar` is the only
/// variant that isn't already fully resolved; everything else is a ground
/// constructor.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Bool,
    String,
    Unit,
    TVar(usize),
    Fun {
        params: Vec<Type>,
        /// `Some(T)` when the function accepts arbitrarily many trailing
        /// arguments of type `T` after `params`, as `print`/`min`/`max` do.
        variadic_tail: Option<Box<Type>>,
        /// How many trailing entries of `params` have a default expression,
        /// so a call site can omit them regardless of how the callee
        /// expression is spelled (a named `def`, an immediately-invoked
        /// lambda, a closure returned from another call, ...). Lives on the
        /// type itself rather than a side table keyed by binding name.
        default_count: usize,
        result: Box<Type>,
    },
}

impl Type {
    pub fn fun(params: Vec<Type>, result: Type) -> Self {
        Type::Fun {
            params,
            variadic_tail: None,
            default_count: 0,
            result: Box::new(result),
        }
    }

    pub fn fun_with_defaults(params: Vec<Type>, default_count: usize, result: Type) -> Self {
        Type::Fun {
            params,
            variadic_tail: None,
            default_count,
            result: Box::new(result),
        }
    }

    pub fn variadic_fun(params: Vec<Type>, tail: Type, result: Type) -> Self {
        Type::Fun {
            params,
            variadic_tail: Some(Box::new(tail)),
            default_count: 0,
            result: Box::new(result),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Bool => write!(f, "Bool"),
            Type::String => write!(f, "String"),
            Type::Unit => write!(f, "Unit"),
            Type::TVar(id) => write!(f, "?{id}"),
            Type::Fun {
                params,
                variadic_tail,
                result,
                ..
            } => {
                write!(f, "(")?;
                let mut first = true;
                for param in params {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                    first = false;
                }
                if let Some(tail) = variadic_tail {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{tail}...")?;
                }
                write!(f, ") -> {result}")
            }
        }
    }
}

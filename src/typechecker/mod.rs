//! Bidirectional, monomorphic type inference over the core AST.
//!
//! Each block is checked in two passes: [`Checker::discover`] binds every
//! name introduced at that level to a type (without looking at bodies), then
//! [`Checker::validate`] walks the block again solving constraints against
//! those bindings. This is what lets mutually recursive `def`s call each
//! other regardless of source order.
mod env;
mod error;
mod substitution;
mod types;

pub use env::TypeEnv;
pub use error::{TypeError, TypeResult};
pub use substitution::Substitution;
pub use types::Type;

use std::collections::HashMap;

use crate::ast::core::{CoreBlock, CoreExpr, CoreParam, CoreStmt};
use crate::ast::surface::{BinaryOp, TypeName, UnaryOp};
use crate::position::Position;

const BUILTIN_NAMES: [&str; 5] = ["print", "input", "str", "min", "max"];

/// Holds everything that needs to survive across the two-phase walk of a
/// single pipeline run: the substitution being built up, the loop-depth
/// counter for validating `break`/`continue`, and the stack of expected
/// return types for validating `return`.
#[derive(Clone)]
pub struct Checker {
    substitution: Substitution,
    next_tvar: usize,
    loop_depth: usize,
    return_type_stack: Vec<Type>,
}

impl Checker {
    pub fn new() -> Self {
        Self {
            substitution: Substitution::new(),
            next_tvar: 0,
            loop_depth: 0,
            return_type_stack: vec![],
        }
    }

    fn fresh_tvar(&mut self) -> Type {
        let id = self.next_tvar;
        self.next_tvar += 1;
        Type::TVar(id)
    }

    /// Populate the outermost layer with the built-ins. Their call-site
    /// behavior is special-cased in [`Checker::check_call`]; the types
    /// recorded here only matter if a built-in name is referenced without
    /// being called.
    pub fn seed_builtins(&mut self, env: &mut TypeEnv) {
        env.define(
            "print",
            Type::variadic_fun(vec![], self.fresh_tvar(), Type::Unit),
            false,
        );
        env.define(
            "input",
            Type::fun(vec![Type::String], Type::String),
            false,
        );
        env.define("str", Type::fun(vec![self.fresh_tvar()], Type::String), false);
        env.define(
            "min",
            Type::variadic_fun(vec![Type::Int, Type::Int], Type::Int, Type::Int),
            false,
        );
        env.define(
            "max",
            Type::variadic_fun(vec![Type::Int, Type::Int], Type::Int, Type::Int),
            false,
        );
    }

    fn resolve_type_name(&self, type_name: &TypeName) -> TypeResult<Type> {
        match type_name.name.as_str() {
            "Int" => Ok(Type::Int),
            "Bool" => Ok(Type::Bool),
            "String" => Ok(Type::String),
            "Unit" => Ok(Type::Unit),
            other => Err(TypeError::new(
                type_name.position,
                format!("unknown type '{other}'"),
            )),
        }
    }

    fn unify(&mut self, a: &Type, b: &Type, position: Position) -> TypeResult<()> {
        self.substitution.unify(a, b, position)
    }

    fn resolve(&self, ty: &Type) -> Type {
        self.substitution.resolve(ty)
    }

    /// Check an entire top-level program (treated as one implicit block)
    /// against a persisted environment, returning the program's value type.
    /// Used both for file mode (fresh env) and REPL mode (env carried
    /// across inputs). Unlike [`Checker::check_block`], this does not push
    /// a fresh layer that gets popped before returning — bindings land in
    /// whatever layer is currently outermost in `env`, so a REPL input's
    /// top-level `val`/`var`/`def`s remain visible to the next one.
    pub fn check_program(&mut self, env: &mut TypeEnv, block: &CoreBlock) -> TypeResult<Type> {
        self.check_block_body(env, block)
    }

    /// Returns a lambda's parameter types, its default-argument count (how
    /// many trailing parameters have a default expression), and its result
    /// type — computed from syntax alone, without looking at the body, so
    /// discovery can bind a name to its full call signature before any
    /// sibling's initializer runs.
    fn signature_of_lambda(
        &mut self,
        params: &[CoreParam],
        return_type: &Option<TypeName>,
    ) -> TypeResult<(Vec<Type>, usize, Type)> {
        let param_types = params
            .iter()
            .map(|p| match &p.type_annotation {
                Some(tn) => self.resolve_type_name(tn),
                None => Ok(self.fresh_tvar()),
            })
            .collect::<TypeResult<Vec<_>>>()?;
        let default_count = params
            .iter()
            .rev()
            .take_while(|p| p.default.is_some())
            .count();
        let result_ty = match return_type {
            Some(tn) => self.resolve_type_name(tn)?,
            None => self.fresh_tvar(),
        };
        Ok((param_types, default_count, result_ty))
    }

    fn check_block(&mut self, env: &mut TypeEnv, block: &CoreBlock) -> TypeResult<Type> {
        env.push_layer();
        let result = self.check_block_body(env, block);
        env.pop_layer();
        result
    }

    /// Phase 1 (discovery) and phase 2 (validation) for one already-opened
    /// scope layer. Split out so the REPL and function-body checking can
    /// both reuse it without double-pushing a layer.
    fn check_block_body(&mut self, env: &mut TypeEnv, block: &CoreBlock) -> TypeResult<Type> {
        let mut signatures: HashMap<String, (Vec<Type>, usize, Type)> = HashMap::new();

        // Phase 1: discovery. Bind every name this block introduces before
        // looking at any initializer or body.
        for stmt in &block.statements {
            match stmt {
                CoreStmt::Let { name, .. } | CoreStmt::LetMut { name, .. } => {
                    let mutable = matches!(stmt, CoreStmt::LetMut { .. });
                    let declared = self.declare_binding(stmt, &mut signatures)?;
                    env.define(name.clone(), declared, mutable);
                }
                _ => {}
            }
        }

        // Phase 2: validation.
        let mut result_ty = Type::Unit;
        let last_index = block.statements.len().checked_sub(1);

        for (index, stmt) in block.statements.iter().enumerate() {
            let stmt_ty = self.check_stmt(env, stmt, &signatures)?;
            if Some(index) == last_index {
                result_ty = if matches!(stmt, CoreStmt::Expr(_)) {
                    stmt_ty
                } else {
                    Type::Unit
                };
            }
        }

        Ok(result_ty)
    }

    fn declare_binding(
        &mut self,
        stmt: &CoreStmt,
        signatures: &mut HashMap<String, (Vec<Type>, usize, Type)>,
    ) -> TypeResult<Type> {
        let (name, type_annotation, init) = match stmt {
            CoreStmt::Let {
                name,
                type_annotation,
                init,
                ..
            }
            | CoreStmt::LetMut {
                name,
                type_annotation,
                init,
                ..
            } => (name, type_annotation, init),
            _ => unreachable!("caller only calls this for Let/LetMut"),
        };

        if let Some(tn) = type_annotation {
            return self.resolve_type_name(tn);
        }

        if let CoreExpr::Lambda {
            params,
            return_type,
            ..
        } = init
        {
            let (param_types, default_count, result_ty) =
                self.signature_of_lambda(params, return_type)?;
            let signature = (param_types.clone(), default_count, result_ty.clone());
            signatures.insert(name.clone(), signature);
            return Ok(Type::fun_with_defaults(param_types, default_count, result_ty));
        }

        Ok(self.fresh_tvar())
    }

    fn check_stmt(
        &mut self,
        env: &mut TypeEnv,
        stmt: &CoreStmt,
        signatures: &HashMap<String, (Vec<Type>, usize, Type)>,
    ) -> TypeResult<Type> {
        match stmt {
            CoreStmt::Let {
                name,
                init,
                position,
                ..
            }
            | CoreStmt::LetMut {
                name,
                init,
                position,
                ..
            } => {
                let declared = env
                    .lookup(name)
                    .expect("discovery phase bound this name")
                    .ty
                    .clone();

                let init_ty = if let CoreExpr::Lambda {
                    params,
                    body,
                    ..
                } = init
                {
                    let known = signatures.get(name).cloned();
                    self.check_lambda(env, params, body, known)?
                } else {
                    self.infer(env, init)?
                };

                self.unify(&declared, &init_ty, *position)?;
                Ok(Type::Unit)
            }

            CoreStmt::Expr(expr) => self.infer(env, expr),
        }
    }

    fn check_lambda(
        &mut self,
        env: &mut TypeEnv,
        params: &[CoreParam],
        body: &CoreBlock,
        known: Option<(Vec<Type>, usize, Type)>,
    ) -> TypeResult<Type> {
        let (param_types, default_count, result_ty) = match known {
            Some(sig) => sig,
            None => self.signature_of_lambda(params, &None)?,
        };

        env.push_layer();

        for (param, ty) in params.iter().zip(param_types.iter()) {
            env.define(param.name.clone(), ty.clone(), false);
        }
        for (param, ty) in params.iter().zip(param_types.iter()) {
            if let Some(default_expr) = &param.default {
                let default_ty = self.infer(env, default_expr)?;
                self.unify(ty, &default_ty, default_expr.position())?;
            }
        }

        self.return_type_stack.push(result_ty.clone());
        let body_result = self.check_block_body(env, body);
        self.return_type_stack.pop();
        let body_ty = body_result?;

        env.pop_layer();

        self.unify(&result_ty, &body_ty, body.position)?;

        Ok(Type::fun_with_defaults(param_types, default_count, result_ty))
    }

    fn infer(&mut self, env: &mut TypeEnv, expr: &CoreExpr) -> TypeResult<Type> {
        match expr {
            CoreExpr::Int(_, _) => Ok(Type::Int),
            CoreExpr::Str(_, _) => Ok(Type::String),
            CoreExpr::Bool(_, _) => Ok(Type::Bool),

            CoreExpr::Var(name, position) => env
                .lookup(name)
                .map(|binding| binding.ty.clone())
                .ok_or_else(|| TypeError::new(*position, format!("undefined: {name}"))),

            CoreExpr::Unary {
                op,
                operand,
                position,
            } => {
                let operand_ty = self.infer(env, operand)?;
                match op {
                    UnaryOp::Neg => {
                        self.unify(&operand_ty, &Type::Int, *position)?;
                        Ok(Type::Int)
                    }
                    UnaryOp::Not => {
                        self.unify(&operand_ty, &Type::Bool, *position)?;
                        Ok(Type::Bool)
                    }
                }
            }

            CoreExpr::Binary {
                op,
                lhs,
                rhs,
                position,
            } => self.check_binary(env, *op, lhs, rhs, *position),

            CoreExpr::Call {
                callee,
                args,
                position,
            } => self.check_call(env, callee, args, *position),

            CoreExpr::Lambda { params, body, .. } => {
                self.check_lambda(env, params, body, None)
            }

            CoreExpr::Block(block) => self.check_block(env, block),

            CoreExpr::If {
                condition,
                then_branch,
                else_branch,
                position,
            } => {
                let cond_ty = self.infer(env, condition)?;
                self.unify(&cond_ty, &Type::Bool, *position)?;

                let then_ty = self.check_block(env, then_branch)?;

                match else_branch {
                    Some(else_block) => {
                        let else_ty = self.check_block(env, else_block)?;
                        self.unify(&then_ty, &else_ty, *position)?;
                        Ok(then_ty)
                    }
                    None => {
                        self.unify(&then_ty, &Type::Unit, *position)?;
                        Ok(Type::Unit)
                    }
                }
            }

            CoreExpr::While {
                condition,
                body,
                position,
            } => {
                let cond_ty = self.infer(env, condition)?;
                self.unify(&cond_ty, &Type::Bool, *position)?;

                self.loop_depth += 1;
                let body_result = self.check_block(env, body);
                self.loop_depth -= 1;
                let body_ty = body_result?;

                self.unify(&body_ty, &Type::Unit, *position)?;
                Ok(Type::Unit)
            }

            CoreExpr::Break(position) => {
                self.check_in_loop(*position, "break")?;
                Ok(Type::Unit)
            }
            CoreExpr::Continue(position) => {
                self.check_in_loop(*position, "continue")?;
                Ok(Type::Unit)
            }

            CoreExpr::Assign {
                name,
                value,
                position,
            } => {
                let binding = env
                    .lookup(name)
                    .ok_or_else(|| TypeError::new(*position, format!("undefined: {name}")))?
                    .clone();

                if !binding.mutable {
                    return Err(TypeError::new(
                        *position,
                        format!("cannot assign to immutable binding '{name}'"),
                    ));
                }

                let value_ty = self.infer(env, value)?;
                self.unify(&binding.ty, &value_ty, *position)?;
                Ok(Type::Unit)
            }

            CoreExpr::Return(value, position) => {
                let expected = self.return_type_stack.last().cloned().ok_or_else(|| {
                    TypeError::new(*position, "'return' outside of a function")
                })?;

                let actual = match value {
                    Some(expr) => self.infer(env, expr)?,
                    None => Type::Unit,
                };

                self.unify(&expected, &actual, *position)?;
                Ok(Type::Unit)
            }
        }
    }

    fn check_in_loop(&self, position: Position, keyword: &str) -> TypeResult<()> {
        if self.loop_depth == 0 {
            Err(TypeError::new(
                position,
                format!("'{keyword}' outside of a while loop"),
            ))
        } else {
            Ok(())
        }
    }

    fn check_binary(
        &mut self,
        env: &mut TypeEnv,
        op: BinaryOp,
        lhs: &CoreExpr,
        rhs: &CoreExpr,
        position: Position,
    ) -> TypeResult<Type> {
        let lhs_ty = self.infer(env, lhs)?;
        let rhs_ty = self.infer(env, rhs)?;

        match op {
            BinaryOp::Add => {
                let lhs_resolved = self.resolve(&lhs_ty);
                let rhs_resolved = self.resolve(&rhs_ty);
                if lhs_resolved == Type::String || rhs_resolved == Type::String {
                    self.unify(&lhs_ty, &Type::String, position)?;
                    self.unify(&rhs_ty, &Type::String, position)?;
                    Ok(Type::String)
                } else {
                    self.unify(&lhs_ty, &Type::Int, position)?;
                    self.unify(&rhs_ty, &Type::Int, position)?;
                    Ok(Type::Int)
                }
            }
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                self.unify(&lhs_ty, &Type::Int, position)?;
                self.unify(&rhs_ty, &Type::Int, position)?;
                Ok(Type::Int)
            }
            BinaryOp::Eq | BinaryOp::NotEq => {
                self.unify(&lhs_ty, &rhs_ty, position)?;
                Ok(Type::Bool)
            }
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
                self.unify(&lhs_ty, &Type::Int, position)?;
                self.unify(&rhs_ty, &Type::Int, position)?;
                Ok(Type::Bool)
            }
            BinaryOp::And | BinaryOp::Or => {
                self.unify(&lhs_ty, &Type::Bool, position)?;
                self.unify(&rhs_ty, &Type::Bool, position)?;
                Ok(Type::Bool)
            }
        }
    }

    fn check_call(
        &mut self,
        env: &mut TypeEnv,
        callee: &CoreExpr,
        args: &[CoreExpr],
        position: Position,
    ) -> TypeResult<Type> {
        if let CoreExpr::Var(name, _) = callee {
            if BUILTIN_NAMES.contains(&name.as_str()) {
                return self.check_builtin_call(env, name, args, position);
            }
        }

        let callee_ty = self.infer(env, callee)?;
        let resolved = self.resolve(&callee_ty);

        match resolved {
            Type::Fun {
                params,
                variadic_tail,
                default_count,
                result,
            } => {
                let min_args = params.len().saturating_sub(default_count);

                let arity_ok = if variadic_tail.is_some() {
                    args.len() >= min_args
                } else {
                    args.len() >= min_args && args.len() <= params.len()
                };

                if !arity_ok {
                    return Err(TypeError::new(
                        position,
                        format!(
                            "wrong number of arguments: expected {min_args}..={}, got {}",
                            params.len(),
                            args.len()
                        ),
                    ));
                }

                for (index, arg) in args.iter().enumerate() {
                    let expected = if index < params.len() {
                        params[index].clone()
                    } else {
                        *variadic_tail.clone().expect("checked by arity_ok")
                    };
                    let arg_ty = self.infer(env, arg)?;
                    self.unify(&expected, &arg_ty, arg.position())?;
                }

                Ok(*result)
            }

            Type::TVar(id) => {
                let arg_types = args
                    .iter()
                    .map(|arg| self.infer(env, arg))
                    .collect::<TypeResult<Vec<_>>>()?;
                let result_tvar = self.fresh_tvar();
                let synthesized = Type::fun(arg_types, result_tvar.clone());
                self.unify(&Type::TVar(id), &synthesized, position)?;
                Ok(result_tvar)
            }

            other => Err(TypeError::new(
                position,
                format!("cannot call a value of type {other}"),
            )),
        }
    }

    fn check_builtin_call(
        &mut self,
        env: &mut TypeEnv,
        name: &str,
        args: &[CoreExpr],
        position: Position,
    ) -> TypeResult<Type> {
        match name {
            "print" => {
                for arg in args {
                    self.infer(env, arg)?;
                }
                Ok(Type::Unit)
            }
            "input" => {
                if args.len() > 1 {
                    return Err(TypeError::new(
                        position,
                        "input takes at most one argument",
                    ));
                }
                if let Some(prompt) = args.first() {
                    let prompt_ty = self.infer(env, prompt)?;
                    self.unify(&prompt_ty, &Type::String, position)?;
                }
                Ok(Type::String)
            }
            "str" => {
                if args.len() != 1 {
                    return Err(TypeError::new(position, "str takes exactly one argument"));
                }
                self.infer(env, &args[0])?;
                Ok(Type::String)
            }
            "min" | "max" => {
                if args.len() < 2 {
                    return Err(TypeError::new(
                        position,
                        format!("{name} requires at least 2 arguments"),
                    ));
                }
                for arg in args {
                    let arg_ty = self.infer(env, arg)?;
                    self.unify(&arg_ty, &Type::Int, position)?;
                }
                Ok(Type::Int)
            }
            other => unreachable!("not a registered builtin: {other}"),
        }
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desugar::desugar_program;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn check(source: &str) -> TypeResult<Type> {
        let tokens = Lexer::lex(source).unwrap();
        let program = Parser::parse_program(tokens).unwrap();
        let block = desugar_program(program);

        let mut checker = Checker::new();
        let mut env = TypeEnv::new();
        checker.seed_builtins(&mut env);
        checker.check_program(&mut env, &block)
    }

    #[test]
    fn infers_int_literal() {
        assert_eq!(check("1").unwrap(), Type::Int);
    }

    #[test]
    fn mutual_recursion_type_checks() {
        let source = r#"
            def isEven(n) { if n == 0 then true else isOdd(n - 1) }
            def isOdd(n)  { if n == 0 then false else isEven(n - 1) }
            isEven(4)
        "#;
        assert_eq!(check(source).unwrap(), Type::Bool);
    }

    #[test]
    fn default_argument_allows_a_shorter_call() {
        let source = "def add(a, b = 42) { a + b } add(8)";
        assert_eq!(check(source).unwrap(), Type::Int);
    }

    #[test]
    fn default_argument_is_honored_for_an_immediately_invoked_lambda() {
        let source = "(fn(a, b = 1) { a + b })(5)";
        assert_eq!(check(source).unwrap(), Type::Int);
    }

    #[test]
    fn default_argument_is_honored_for_a_closure_returned_from_a_call() {
        let source = r#"
            def makeAdder() { fn(a, b = 1) { a + b } }
            makeAdder()(5)
        "#;
        assert_eq!(check(source).unwrap(), Type::Int);
    }

    #[test]
    fn reassigning_a_val_is_a_type_error() {
        let source = "val x = 1\nx = 2";
        assert!(check(source).is_err());
    }

    #[test]
    fn min_with_one_argument_is_a_type_error() {
        assert!(check("min(3)").is_err());
    }

    #[test]
    fn break_outside_loop_is_a_type_error() {
        assert!(check("break").is_err());
    }

    #[test]
    fn string_concatenation_with_plus() {
        assert_eq!(check(r#""a" + "b""#).unwrap(), Type::String);
    }

    #[test]
    fn undefined_variable_is_a_type_error() {
        assert!(check("nope").is_err());
    }
}

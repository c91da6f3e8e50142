//! Tree-walking evaluator over the core AST, with a two-phase allocation
//! strategy per block: every binding a block introduces gets a store
//! address before any initializer runs, so sibling closures (including
//! mutually recursive `def`s, which desugar to `let`s) can capture an
//! environment that already contains each other's addresses.
mod builtins;
mod control;
mod env;
mod error;
mod store;
mod value;

pub use builtins::{Io, StdIo};
pub use control::ControlFlow;
pub use env::RuntimeEnv;
pub use error::{RuntimeError, RuntimeResult};
pub use store::{Address, Store};
pub use value::{Builtin, Closure, Value};

use std::rc::Rc;

use crate::ast::core::{CoreBlock, CoreExpr, CoreStmt};
use crate::ast::surface::{BinaryOp, UnaryOp};
use crate::position::Position;

pub struct Evaluator<'a> {
    io: &'a mut dyn Io,
}

impl<'a> Evaluator<'a> {
    pub fn new(io: &'a mut dyn Io) -> Self {
        Self { io }
    }

    /// Install the built-ins in the outermost runtime layer, each pointing
    /// at its own store slot the way any other binding would.
    pub fn seed_builtins(env: &mut RuntimeEnv, store: &mut Store) {
        for name in builtins::BUILTIN_NAMES {
            let builtin = builtins::lookup(name).expect("name came from BUILTIN_NAMES");
            let address = store.alloc(Value::Builtin(builtin));
            env.set(name, address);
        }
    }

    /// Evaluate a whole program (or one REPL input, also treated as an
    /// implicit block) and return its trailing value. Unlike
    /// [`Evaluator::eval_block`], this does not push a scope layer that
    /// gets popped before returning — bindings land in whatever layer is
    /// currently innermost in `env`, so a REPL input's top-level bindings
    /// stay reachable by name in the next one (their store addresses were
    /// already permanent; this keeps the name -> address mapping alive too).
    pub fn eval_program(
        &mut self,
        env: &mut RuntimeEnv,
        store: &mut Store,
        block: &CoreBlock,
    ) -> RuntimeResult<Value> {
        match self.eval_block_body(env, store, block)? {
            ControlFlow::Normal(value) | ControlFlow::Return(value) => Ok(value),
            ControlFlow::Break | ControlFlow::Continue => {
                unreachable!("type checker rejects break/continue outside a loop")
            }
        }
    }

    fn eval_block(
        &mut self,
        env: &mut RuntimeEnv,
        store: &mut Store,
        block: &CoreBlock,
    ) -> RuntimeResult<ControlFlow> {
        env.push();
        let result = self.eval_block_body(env, store, block);
        env.pop();
        result
    }

    fn eval_block_body(
        &mut self,
        env: &mut RuntimeEnv,
        store: &mut Store,
        block: &CoreBlock,
    ) -> RuntimeResult<ControlFlow> {
        // Phase 1: allocate. Every binding gets an address, written with
        // `Unit` as a placeholder, before any initializer is evaluated.
        for stmt in &block.statements {
            if let CoreStmt::Let { name, .. } | CoreStmt::LetMut { name, .. } = stmt {
                let address = store.alloc(Value::Unit);
                env.set(name.clone(), address);
            }
        }

        // Phase 2: evaluate, in order.
        let mut result = Value::Unit;
        let last_index = block.statements.len().checked_sub(1);

        for (index, stmt) in block.statements.iter().enumerate() {
            match self.eval_stmt(env, store, stmt)? {
                ControlFlow::Normal(value) => {
                    if Some(index) == last_index && matches!(stmt, CoreStmt::Expr(_)) {
                        result = value;
                    }
                }
                signal => return Ok(signal),
            }
        }

        Ok(ControlFlow::Normal(result))
    }

    fn eval_stmt(
        &mut self,
        env: &mut RuntimeEnv,
        store: &mut Store,
        stmt: &CoreStmt,
    ) -> RuntimeResult<ControlFlow> {
        match stmt {
            CoreStmt::Let { name, init, .. } | CoreStmt::LetMut { name, init, .. } => {
                match self.eval_expr(env, store, init)? {
                    ControlFlow::Normal(value) => {
                        let address = env.find(name).expect("allocation phase reserved this");
                        store.set(address, value);
                        Ok(ControlFlow::Normal(Value::Unit))
                    }
                    signal => Ok(signal),
                }
            }

            CoreStmt::Expr(expr) => self.eval_expr(env, store, expr),
        }
    }

    /// Evaluate an expression that can only ever sit in a sub-expression
    /// position (an operand, a call argument, a condition) — one the
    /// grammar never lets `break`/`continue`/`return` appear in directly.
    fn eval_as_value(
        &mut self,
        env: &mut RuntimeEnv,
        store: &mut Store,
        expr: &CoreExpr,
    ) -> RuntimeResult<Value> {
        Ok(self.eval_expr(env, store, expr)?.into_value())
    }

    fn eval_expr(
        &mut self,
        env: &mut RuntimeEnv,
        store: &mut Store,
        expr: &CoreExpr,
    ) -> RuntimeResult<ControlFlow> {
        match expr {
            CoreExpr::Int(value, _) => Ok(ControlFlow::Normal(Value::Int(*value))),
            CoreExpr::Str(value, _) => Ok(ControlFlow::Normal(Value::Str(value.clone()))),
            CoreExpr::Bool(value, _) => Ok(ControlFlow::Normal(Value::Bool(*value))),

            CoreExpr::Var(name, position) => {
                let address = env
                    .find(name)
                    .ok_or_else(|| RuntimeError::new(*position, format!("undefined: {name}")))?;
                Ok(ControlFlow::Normal(store.get(address).clone()))
            }

            CoreExpr::Unary {
                op,
                operand,
                position,
            } => {
                let value = self.eval_as_value(env, store, operand)?;
                let result = match (op, value) {
                    (UnaryOp::Neg, Value::Int(n)) => Value::Int(-n),
                    (UnaryOp::Not, Value::Bool(b)) => Value::Bool(!b),
                    (_, other) => {
                        return Err(RuntimeError::new(
                            *position,
                            format!("invalid operand type for unary {op}: {}", other.type_name()),
                        ))
                    }
                };
                Ok(ControlFlow::Normal(result))
            }

            CoreExpr::Binary {
                op,
                lhs,
                rhs,
                position,
            } => Ok(ControlFlow::Normal(
                self.eval_binary(env, store, *op, lhs, rhs, *position)?,
            )),

            CoreExpr::Call {
                callee,
                args,
                position,
            } => Ok(ControlFlow::Normal(
                self.eval_call(env, store, callee, args, *position)?,
            )),

            CoreExpr::Lambda { params, body, .. } => {
                let closure = Closure {
                    params: Rc::new(params.clone()),
                    body: Rc::new((**body).clone()),
                    captured_env: env.clone(),
                };
                Ok(ControlFlow::Normal(Value::Closure(closure)))
            }

            CoreExpr::Block(block) => self.eval_block(env, store, block),

            CoreExpr::If {
                condition,
                then_branch,
                else_branch,
                position,
            } => {
                let cond = self.eval_as_value(env, store, condition)?;
                let Value::Bool(cond) = cond else {
                    return Err(RuntimeError::new(
                        *position,
                        "'if' condition did not evaluate to a Bool",
                    ));
                };

                if cond {
                    self.eval_block(env, store, then_branch)
                } else if let Some(else_block) = else_branch {
                    self.eval_block(env, store, else_block)
                } else {
                    Ok(ControlFlow::Normal(Value::Unit))
                }
            }

            CoreExpr::While {
                condition,
                body,
                position,
            } => {
                loop {
                    let cond = self.eval_as_value(env, store, condition)?;
                    let Value::Bool(cond) = cond else {
                        return Err(RuntimeError::new(
                            *position,
                            "'while' condition did not evaluate to a Bool",
                        ));
                    };
                    if !cond {
                        break;
                    }

                    match self.eval_block(env, store, body)? {
                        ControlFlow::Normal(_) | ControlFlow::Continue => {}
                        ControlFlow::Break => break,
                        ControlFlow::Return(value) => return Ok(ControlFlow::Return(value)),
                    }
                }
                Ok(ControlFlow::Normal(Value::Unit))
            }

            CoreExpr::Break(_) => Ok(ControlFlow::Break),
            CoreExpr::Continue(_) => Ok(ControlFlow::Continue),

            CoreExpr::Return(value, _) => {
                let value = match value {
                    Some(expr) => self.eval_as_value(env, store, expr)?,
                    None => Value::Unit,
                };
                Ok(ControlFlow::Return(value))
            }

            CoreExpr::Assign {
                name,
                value,
                position,
            } => match self.eval_expr(env, store, value)? {
                ControlFlow::Normal(v) => {
                    let address = env
                        .find(name)
                        .ok_or_else(|| RuntimeError::new(*position, format!("undefined: {name}")))?;
                    store.set(address, v);
                    Ok(ControlFlow::Normal(Value::Unit))
                }
                signal => Ok(signal),
            },
        }
    }

    fn eval_binary(
        &mut self,
        env: &mut RuntimeEnv,
        store: &mut Store,
        op: BinaryOp,
        lhs: &CoreExpr,
        rhs: &CoreExpr,
        position: Position,
    ) -> RuntimeResult<Value> {
        // `&&`/`||` short-circuit: the right operand is only evaluated if
        // the left one didn't already decide the result.
        match op {
            BinaryOp::And => {
                let l = self.eval_as_value(env, store, lhs)?;
                if matches!(l, Value::Bool(false)) {
                    return Ok(Value::Bool(false));
                }
                return self.eval_as_value(env, store, rhs);
            }
            BinaryOp::Or => {
                let l = self.eval_as_value(env, store, lhs)?;
                if matches!(l, Value::Bool(true)) {
                    return Ok(Value::Bool(true));
                }
                return self.eval_as_value(env, store, rhs);
            }
            _ => {}
        }

        let l = self.eval_as_value(env, store, lhs)?;
        let r = self.eval_as_value(env, store, rhs)?;

        match op {
            BinaryOp::Add => match (l, r) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                (a, b) => Err(RuntimeError::new(
                    position,
                    format!("cannot add {} and {}", a.type_name(), b.type_name()),
                )),
            },
            BinaryOp::Sub => Ok(Value::Int(as_int(&l, position)? - as_int(&r, position)?)),
            BinaryOp::Mul => Ok(Value::Int(as_int(&l, position)? * as_int(&r, position)?)),
            BinaryOp::Div => {
                let (a, b) = (as_int(&l, position)?, as_int(&r, position)?);
                if b == 0 {
                    return Err(RuntimeError::new(position, "division by zero"));
                }
                Ok(Value::Int(floor_div(a, b)))
            }
            BinaryOp::Mod => {
                let (a, b) = (as_int(&l, position)?, as_int(&r, position)?);
                if b == 0 {
                    return Err(RuntimeError::new(position, "division by zero"));
                }
                Ok(Value::Int(floor_mod(a, b)))
            }
            BinaryOp::Eq => Ok(Value::Bool(values_equal(&l, &r))),
            BinaryOp::NotEq => Ok(Value::Bool(!values_equal(&l, &r))),
            BinaryOp::Lt => Ok(Value::Bool(as_int(&l, position)? < as_int(&r, position)?)),
            BinaryOp::LtEq => Ok(Value::Bool(as_int(&l, position)? <= as_int(&r, position)?)),
            BinaryOp::Gt => Ok(Value::Bool(as_int(&l, position)? > as_int(&r, position)?)),
            BinaryOp::GtEq => Ok(Value::Bool(as_int(&l, position)? >= as_int(&r, position)?)),
            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }

    fn eval_call(
        &mut self,
        env: &mut RuntimeEnv,
        store: &mut Store,
        callee: &CoreExpr,
        args: &[CoreExpr],
        position: Position,
    ) -> RuntimeResult<Value> {
        let callee_value = self.eval_as_value(env, store, callee)?;

        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.eval_as_value(env, store, arg)?);
        }

        match callee_value {
            Value::Builtin(builtin) => (builtin.func)(&arg_values, position, self.io),
            Value::Closure(closure) => self.call_closure(store, &closure, &arg_values, position),
            other => Err(RuntimeError::new(
                position,
                format!("cannot call a value of type {}", other.type_name()),
            )),
        }
    }

    fn call_closure(
        &mut self,
        store: &mut Store,
        closure: &Closure,
        args: &[Value],
        position: Position,
    ) -> RuntimeResult<Value> {
        let mut call_env = closure.captured_env.clone();
        call_env.push();

        for (index, param) in closure.params.iter().enumerate() {
            let value = if index < args.len() {
                args[index].clone()
            } else if let Some(default_expr) = &param.default {
                self.eval_as_value(&mut call_env, store, default_expr)?
            } else {
                return Err(RuntimeError::new(
                    position,
                    format!("missing argument '{}'", param.name),
                ));
            };

            let address = store.alloc(value);
            call_env.set(param.name.clone(), address);
        }

        match self.eval_block(&mut call_env, store, &closure.body)? {
            ControlFlow::Normal(value) | ControlFlow::Return(value) => Ok(value),
            ControlFlow::Break | ControlFlow::Continue => {
                unreachable!("type checker rejects break/continue outside a loop")
            }
        }
    }
}

fn as_int(value: &Value, position: Position) -> RuntimeResult<i64> {
    match value {
        Value::Int(n) => Ok(*n),
        other => Err(RuntimeError::new(
            position,
            format!("expected Int, found {}", other.type_name()),
        )),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Unit, Value::Unit) => true,
        _ => false,
    }
}

/// Floor division / mathematical modulo, matching the spec's requirement
/// that the remainder takes the divisor's sign rather than the dividend's
/// (Rust's built-in `/`/`%` truncate toward zero instead).
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        r + b
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desugar::desugar_program;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    struct NullIo {
        output: String,
    }

    impl Io for NullIo {
        fn print(&mut self, text: &str) {
            self.output.push_str(text);
        }
        fn read_line(&mut self, _prompt: &str) -> Option<String> {
            None
        }
    }

    fn run(source: &str) -> (Value, String) {
        let tokens = Lexer::lex(source).unwrap();
        let program = Parser::parse_program(tokens).unwrap();
        let block = desugar_program(program);

        let mut env = RuntimeEnv::new();
        let mut store = Store::new();
        Evaluator::seed_builtins(&mut env, &mut store);

        let mut io = NullIo {
            output: String::new(),
        };
        let mut evaluator = Evaluator::new(&mut io);
        let value = evaluator
            .eval_program(&mut env, &mut store, &block)
            .unwrap();
        (value, io.output)
    }

    #[test]
    fn arithmetic() {
        let (value, _) = run("1 + 2 * 3");
        assert!(matches!(value, Value::Int(7)));
    }

    #[test]
    fn mutual_recursion_via_closures() {
        let source = r#"
            def isEven(n) { if n == 0 then true else isOdd(n - 1) }
            def isOdd(n)  { if n == 0 then false else isEven(n - 1) }
            isEven(4)
        "#;
        let (value, _) = run(source);
        assert!(matches!(value, Value::Bool(true)));
    }

    #[test]
    fn default_argument_is_used_when_omitted() {
        let (value, _) = run("def add(a, b = 42) { a + b } add(8)");
        assert!(matches!(value, Value::Int(50)));
    }

    #[test]
    fn mutable_variable_can_be_reassigned() {
        let (value, _) = run("var x = 1\nx = x + 1\nx");
        assert!(matches!(value, Value::Int(2)));
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let tokens = Lexer::lex("1 / 0").unwrap();
        let program = Parser::parse_program(tokens).unwrap();
        let block = desugar_program(program);

        let mut env = RuntimeEnv::new();
        let mut store = Store::new();
        Evaluator::seed_builtins(&mut env, &mut store);
        let mut io = NullIo {
            output: String::new(),
        };
        let mut evaluator = Evaluator::new(&mut io);
        assert!(evaluator
            .eval_program(&mut env, &mut store, &block)
            .is_err());
    }

    #[test]
    fn modulo_follows_the_sign_of_the_divisor() {
        let (value, _) = run("-7 % 3");
        assert!(matches!(value, Value::Int(2)));
    }

    #[test]
    fn print_joins_arguments_with_a_space() {
        let (_, output) = run(r#"print(1, "two", true)"#);
        assert_eq!(output, "1 two true\n");
    }

    #[test]
    fn while_loop_with_break() {
        let (value, _) = run(
            "var i = 0\nwhile i < 10 { i += 1\nif i == 3 { break } }\ni",
        );
        assert!(matches!(value, Value::Int(3)));
    }
}

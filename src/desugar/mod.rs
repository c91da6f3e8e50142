//! Lowers the surface AST to the core AST.
//!
//! Purely syntactic: no name resolution, no types. Three things disappear
//! here and never reappear downstream:
//! - `def name(..) { .. }` becomes `let name = fn(..) { .. }`, so mutual
//!   recursion among sibling `def`s falls out of the same two-phase block
//!   allocation that already handles mutually recursive `let`s.
//! - `+=`/`-=` become a plain assignment to a binary expression.
//! - the expression-form `if c then a else b` and block-form `if c {..}
//!   else {..}` collapse onto the one `CoreExpr::If` node (the parser
//!   already did most of this work by wrapping both arms in `Block`s).
use crate::ast::core::{CoreBlock, CoreExpr, CoreParam, CoreStmt};
use crate::ast::surface::{self, AssignOp, Expr, Mutability, Program, Stmt};

pub fn desugar_program(program: Program) -> CoreBlock {
    desugar_statements(program.statements, crate::position::Position::start())
}

fn desugar_statements(
    statements: Vec<Stmt>,
    position: crate::position::Position,
) -> CoreBlock {
    let statements = statements.into_iter().map(desugar_stmt).collect();
    CoreBlock {
        statements,
        position,
    }
}

fn desugar_block(block: surface::Block) -> CoreBlock {
    desugar_statements(block.statements, block.position)
}

fn desugar_stmt(stmt: Stmt) -> CoreStmt {
    match stmt {
        Stmt::Expr(expr) => CoreStmt::Expr(desugar_expr(expr)),

        Stmt::Declaration(decl) => {
            let init = desugar_expr(decl.value);
            match decl.mutability {
                Mutability::Val => CoreStmt::Let {
                    name: decl.ident.name,
                    type_annotation: decl.type_annotation,
                    init,
                    position: decl.position,
                },
                Mutability::Var => CoreStmt::LetMut {
                    name: decl.ident.name,
                    type_annotation: decl.type_annotation,
                    init,
                    position: decl.position,
                },
            }
        }

        Stmt::FnDef(fn_def) => {
            let position = fn_def.position;
            let params = fn_def.params.into_iter().map(desugar_param).collect();
            let body = Box::new(desugar_block(fn_def.body));

            CoreStmt::Let {
                name: fn_def.ident.name,
                type_annotation: None,
                init: CoreExpr::Lambda {
                    params,
                    return_type: fn_def.return_type,
                    body,
                    position,
                },
                position,
            }
        }

        Stmt::While(while_loop) => {
            let position = while_loop.position;
            CoreStmt::Expr(CoreExpr::While {
                condition: Box::new(desugar_expr(*while_loop.condition)),
                body: Box::new(desugar_block(while_loop.body)),
                position,
            })
        }

        Stmt::Break(position) => CoreStmt::Expr(CoreExpr::Break(position)),
        Stmt::Continue(position) => CoreStmt::Expr(CoreExpr::Continue(position)),
        Stmt::Return(value, position) => CoreStmt::Expr(CoreExpr::Return(
            value.map(|v| Box::new(desugar_expr(v))),
            position,
        )),
    }
}

fn desugar_param(param: surface::Param) -> CoreParam {
    CoreParam {
        name: param.ident.name,
        type_annotation: param.type_annotation,
        default: param.default.map(desugar_expr),
        position: param.position,
    }
}

fn desugar_expr(expr: Expr) -> CoreExpr {
    match expr {
        Expr::Int(lit) => CoreExpr::Int(lit.value, lit.position),
        Expr::Str(lit) => CoreExpr::Str(lit.value, lit.position),
        Expr::Bool(lit) => CoreExpr::Bool(lit.value, lit.position),
        Expr::Ident(ident) => CoreExpr::Var(ident.name, ident.position),

        Expr::Unary(unary) => CoreExpr::Unary {
            op: unary.op,
            operand: Box::new(desugar_expr(*unary.operand)),
            position: unary.position,
        },

        Expr::Binary(binary) => CoreExpr::Binary {
            op: binary.op,
            lhs: Box::new(desugar_expr(*binary.lhs)),
            rhs: Box::new(desugar_expr(*binary.rhs)),
            position: binary.position,
        },

        Expr::Call(call) => CoreExpr::Call {
            callee: Box::new(desugar_expr(*call.callee)),
            args: call.args.into_iter().map(desugar_expr).collect(),
            position: call.position,
        },

        Expr::Lambda(lambda) => {
            let position = lambda.position;
            let params = lambda.params.into_iter().map(desugar_param).collect();
            let body = Box::new(match lambda.body {
                surface::LambdaBody::Block(block) => desugar_block(block),
                surface::LambdaBody::Expr(expr) => CoreBlock {
                    statements: vec![CoreStmt::Expr(desugar_expr(*expr))],
                    position,
                },
            });

            CoreExpr::Lambda {
                params,
                return_type: None,
                body,
                position,
            }
        }

        Expr::Block(block) => CoreExpr::Block(Box::new(desugar_block(block))),

        Expr::If(if_expr) => CoreExpr::If {
            condition: Box::new(desugar_expr(*if_expr.condition)),
            then_branch: Box::new(desugar_block(if_expr.then_branch)),
            else_branch: if_expr.else_branch.map(|b| Box::new(desugar_block(b))),
            position: if_expr.position,
        },

        Expr::Assign(assignment) => {
            let position = assignment.position;
            let name = assignment.target.name;
            let rhs = desugar_expr(*assignment.value);

            let value = match assignment.op {
                AssignOp::Eq => rhs,
                AssignOp::PlusEq => CoreExpr::Binary {
                    op: surface::BinaryOp::Add,
                    lhs: Box::new(CoreExpr::Var(name.clone(), position)),
                    rhs: Box::new(rhs),
                    position,
                },
                AssignOp::MinusEq => CoreExpr::Binary {
                    op: surface::BinaryOp::Sub,
                    lhs: Box::new(CoreExpr::Var(name.clone(), position)),
                    rhs: Box::new(rhs),
                    position,
                },
            };

            CoreExpr::Assign {
                name,
                value: Box::new(value),
                position,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn desugar_source(source: &str) -> CoreBlock {
        let tokens = Lexer::lex(source).unwrap();
        let program = Parser::parse_program(tokens).unwrap();
        desugar_program(program)
    }

    #[test]
    fn def_becomes_a_let_binding_to_a_lambda() {
        let block = desugar_source("def add(a, b) { a + b }");
        assert_eq!(block.statements.len(), 1);
        match &block.statements[0] {
            CoreStmt::Let { name, init, .. } => {
                assert_eq!(name, "add");
                assert!(matches!(init, CoreExpr::Lambda { .. }));
            }
            other => panic!("expected a let binding, got {other:?}"),
        }
    }

    #[test]
    fn compound_assignment_expands_to_a_binary_expression() {
        let block = desugar_source("x += 1");
        match &block.statements[0] {
            CoreStmt::Expr(CoreExpr::Assign { name, value, .. }) => {
                assert_eq!(name, "x");
                assert!(matches!(
                    **value,
                    CoreExpr::Binary {
                        op: surface::BinaryOp::Add,
                        ..
                    }
                ));
            }
            other => panic!("expected an assignment, got {other:?}"),
        }
    }

    #[test]
    fn var_declaration_lowers_to_let_mut() {
        let block = desugar_source("var x = 1");
        assert!(matches!(block.statements[0], CoreStmt::LetMut { .. }));
    }

    #[test]
    fn val_declaration_lowers_to_let() {
        let block = desugar_source("val x = 1");
        assert!(matches!(block.statements[0], CoreStmt::Let { .. }));
    }
}

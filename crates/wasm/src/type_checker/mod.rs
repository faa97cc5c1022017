/*
 * Copyright (c) 2026. Mikhail Kulik.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Constraint-based type checker over the symbolic tree.
//!
//! Constraint generation walks each expression with the type its context
//! expects, emitting `(found, expected)` pairs; unification solves them
//! head-first, substituting type variables through the remaining
//! constraints. The solver runs once per function body (against the
//! declared return type) and once per module initializer (against a fresh
//! unconstrained variable). Mismatches are collected, so one run reports
//! every type error of the program.

use std::collections::HashMap;

use analyzer::symbol::SymbolTable;
use ast::diagnostic::Diagnostic;
use ast::op::{BinOp, UnaryOp};
use ast::symbolic::{Def, Expr, Identifier, Pattern, Program, Type};
use ast::{Literal, Span, Spanned};

/// Either a concrete type or a type variable awaiting unification. Type
/// variables never survive checking: they are internal to one solver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeOrVar {
    Known(Type),
    Var(u32),
}

#[derive(Debug, Clone, Copy)]
struct Constraint {
    found: TypeOrVar,
    expected: TypeOrVar,
    span: Span,
}

/// Environment of the expression under analysis. Pattern binders may be
/// typed by a still-unsolved variable, hence the `TypeOrVar` values.
type Env = HashMap<Identifier, TypeOrVar>;

pub fn check_program(program: &Program, table: &SymbolTable) -> Result<(), Vec<Diagnostic>> {
    let mut checker = TypeChecker {
        table,
        errors: Vec::new(),
        next_var: 0,
    };

    for module in &program.modules {
        for def in &module.node.defs {
            if let Def::Fun(fun) = &def.node {
                checker.check_function(fun);
            }
        }
        if let Some(init) = &module.node.initializer {
            checker.check_initializer(init);
        }
    }

    if checker.errors.is_empty() {
        Ok(())
    } else {
        Err(checker.errors)
    }
}

struct TypeChecker<'a> {
    table: &'a SymbolTable,
    errors: Vec<Diagnostic>,
    next_var: u32,
}

impl TypeChecker<'_> {
    fn fresh(&mut self) -> TypeOrVar {
        let var = TypeOrVar::Var(self.next_var);
        self.next_var += 1;
        var
    }

    fn check_function(&mut self, fun: &ast::symbolic::FunDef) {
        let mut env = Env::new();
        for param in &fun.params {
            env.insert(param.node.name, TypeOrVar::Known(param.node.tpe));
        }
        let mut constraints = Vec::new();
        self.gen_expr(
            &fun.body,
            TypeOrVar::Known(fun.ret_type),
            &env,
            &mut constraints,
        );
        self.solve(constraints);
    }

    /// A module initializer has no surrounding context; its type is free.
    fn check_initializer(&mut self, init: &Spanned<Expr>) {
        let expected = self.fresh();
        let mut constraints = Vec::new();
        self.gen_expr(init, expected, &Env::new(), &mut constraints);
        self.solve(constraints);
    }

    // ─── Constraint generation ───────────────────────────────────────────

    fn gen_expr(
        &mut self,
        expr: &Spanned<Expr>,
        expected: TypeOrVar,
        env: &Env,
        out: &mut Vec<Constraint>,
    ) {
        let span = expr.span;
        match &expr.node {
            Expr::Variable(id) => {
                let found = *env
                    .get(id)
                    .expect("name analysis bound every variable");
                out.push(Constraint {
                    found,
                    expected,
                    span,
                });
            }

            Expr::Lit(lit) => out.push(Constraint {
                found: TypeOrVar::Known(literal_type(lit)),
                expected,
                span,
            }),

            Expr::BinaryOp { op, lhs, rhs } => {
                let (operand, result) = match op {
                    BinOp::Plus | BinOp::Minus | BinOp::Times | BinOp::Div | BinOp::Mod => {
                        (TypeOrVar::Known(Type::Int), Type::Int)
                    }
                    BinOp::LessThan | BinOp::LessEquals => {
                        (TypeOrVar::Known(Type::Int), Type::Boolean)
                    }
                    BinOp::And | BinOp::Or => (TypeOrVar::Known(Type::Boolean), Type::Boolean),
                    BinOp::Concat => (TypeOrVar::Known(Type::String), Type::String),
                    // Both operands of `==` must agree, whatever they are.
                    BinOp::Equals => (self.fresh(), Type::Boolean),
                };
                self.gen_expr(lhs, operand, env, out);
                self.gen_expr(rhs, operand, env, out);
                out.push(Constraint {
                    found: TypeOrVar::Known(result),
                    expected,
                    span,
                });
            }

            Expr::UnaryOp { op, operand } => {
                let tpe = match op {
                    UnaryOp::Neg => Type::Int,
                    UnaryOp::Not => Type::Boolean,
                };
                self.gen_expr(operand, TypeOrVar::Known(tpe), env, out);
                out.push(Constraint {
                    found: TypeOrVar::Known(tpe),
                    expected,
                    span,
                });
            }

            Expr::Call { callee, args } => {
                let (arg_types, ret_type) = self.signature_of(*callee);
                if args.len() != arg_types.len() {
                    self.errors.push(Diagnostic::error(
                        format!(
                            "Wrong number of arguments for '{}': expected {}, found {}",
                            self.table.name_of(*callee),
                            arg_types.len(),
                            args.len()
                        ),
                        span,
                    ));
                    // Still walk the arguments so their own errors surface.
                    for arg in args {
                        let any = self.fresh();
                        self.gen_expr(arg, any, env, out);
                    }
                } else {
                    for (arg, tpe) in args.iter().zip(arg_types) {
                        self.gen_expr(arg, TypeOrVar::Known(tpe), env, out);
                    }
                }
                out.push(Constraint {
                    found: TypeOrVar::Known(ret_type),
                    expected,
                    span,
                });
            }

            Expr::Sequence(first, second) => {
                let any = self.fresh();
                self.gen_expr(first, any, env, out);
                self.gen_expr(second, expected, env, out);
            }

            Expr::Let { param, value, body } => {
                self.gen_expr(value, TypeOrVar::Known(param.tpe), env, out);
                let mut inner = env.clone();
                inner.insert(param.name, TypeOrVar::Known(param.tpe));
                self.gen_expr(body, expected, &inner, out);
            }

            Expr::Ite {
                cond,
                then_branch,
                else_branch,
            } => {
                self.gen_expr(cond, TypeOrVar::Known(Type::Boolean), env, out);
                self.gen_expr(then_branch, expected, env, out);
                self.gen_expr(else_branch, expected, env, out);
            }

            Expr::Match { scrutinee, cases } => {
                let scrutinee_type = self.fresh();
                self.gen_expr(scrutinee, scrutinee_type, env, out);
                for case in cases {
                    let mut inner = env.clone();
                    self.gen_pattern(&case.pattern, scrutinee_type, &mut inner, out);
                    self.gen_expr(&case.expr, expected, &inner, out);
                }
            }

            Expr::Error(message) => {
                self.gen_expr(message, TypeOrVar::Known(Type::String), env, out);
                // `error` never returns, so it satisfies any expectation.
                let any = self.fresh();
                out.push(Constraint {
                    found: any,
                    expected,
                    span,
                });
            }
        }
    }

    fn gen_pattern(
        &mut self,
        pattern: &Spanned<Pattern>,
        expected: TypeOrVar,
        env: &mut Env,
        out: &mut Vec<Constraint>,
    ) {
        let span = pattern.span;
        match &pattern.node {
            Pattern::Wildcard => {}

            Pattern::Id(id) => {
                env.insert(*id, expected);
            }

            Pattern::Lit(lit) => out.push(Constraint {
                found: TypeOrVar::Known(literal_type(lit)),
                expected,
                span,
            }),

            Pattern::CaseClass { constructor, args } => {
                let sig = self
                    .table
                    .constructor(*constructor)
                    .expect("name analysis resolved the constructor")
                    .clone();
                out.push(Constraint {
                    found: TypeOrVar::Known(sig.ret_type()),
                    expected,
                    span,
                });
                if args.len() != sig.arg_types.len() {
                    self.errors.push(Diagnostic::error(
                        format!(
                            "Wrong number of fields for '{}': expected {}, found {}",
                            self.table.name_of(*constructor),
                            sig.arg_types.len(),
                            args.len()
                        ),
                        span,
                    ));
                    return;
                }
                for (arg, tpe) in args.iter().zip(sig.arg_types) {
                    self.gen_pattern(arg, TypeOrVar::Known(tpe), env, out);
                }
            }
        }
    }

    /// Argument and result types of a function or constructor.
    fn signature_of(&self, callee: Identifier) -> (Vec<Type>, Type) {
        if let Some(sig) = self.table.function(callee) {
            (sig.arg_types.clone(), sig.ret_type)
        } else {
            let sig = self
                .table
                .constructor(callee)
                .expect("callee is a function or a constructor");
            (sig.arg_types.clone(), sig.ret_type())
        }
    }

    // ─── Unification ─────────────────────────────────────────────────────

    /// Solve head-first: variables are substituted through the remaining
    /// constraints, equal concrete types are discharged, and anything else
    /// is a type error at the constraint's position. Types are first-order
    /// and non-recursive, so no occurs check is needed.
    fn solve(&mut self, mut constraints: Vec<Constraint>) {
        let mut head = 0;
        while head < constraints.len() {
            let Constraint {
                found,
                expected,
                span,
            } = constraints[head];
            head += 1;

            match (found, expected) {
                (TypeOrVar::Known(found), TypeOrVar::Known(expected)) => {
                    if found != expected {
                        self.errors.push(Diagnostic::error(
                            format!(
                                "Type error: expected {}, found {}",
                                self.table.describe(expected),
                                self.table.describe(found)
                            ),
                            span,
                        ));
                    }
                }
                (TypeOrVar::Var(var), other) | (other, TypeOrVar::Var(var)) => {
                    for constraint in &mut constraints[head..] {
                        if constraint.found == TypeOrVar::Var(var) {
                            constraint.found = other;
                        }
                        if constraint.expected == TypeOrVar::Var(var) {
                            constraint.expected = other;
                        }
                    }
                }
            }
        }
    }
}

fn literal_type(lit: &Literal) -> Type {
    match lit {
        Literal::Int(_) => Type::Int,
        Literal::Bool(_) => Type::Boolean,
        Literal::Str(_) => Type::String,
        Literal::Unit => Type::Unit,
    }
}

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

//! Renders a nominal program back to Amy surface syntax.
//!
//! The output is re-parseable: non-atomic subexpressions are parenthesized
//! wherever the grammar wants a higher-level form, so
//! `parse(print(parse(src)))` equals `parse(src)` up to source positions.
//! Used by the `--target parse` dump and the parser round-trip tests.

use crate::nominal::{Def, Expr, MatchCase, ModuleDef, Pattern, Program};
use crate::Spanned;
use std::fmt::Write;

pub fn print_program(program: &Program) -> String {
    let mut p = Printer::new();
    for module in &program.modules {
        p.module(&module.node);
    }
    p.out
}

pub fn print_expr(expr: &Expr) -> String {
    let mut p = Printer::new();
    p.expr(expr);
    p.out
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn module(&mut self, module: &ModuleDef) {
        self.line(&format!("object {} {{", module.name));
        self.indent += 1;
        for def in &module.defs {
            self.def(&def.node);
        }
        if let Some(init) = &module.initializer {
            let mut text = String::new();
            let mut p = Printer::new();
            p.indent = self.indent;
            p.expr(&init.node);
            text.push_str(&p.out);
            self.line(&text);
        }
        self.indent -= 1;
        self.line("}");
    }

    fn def(&mut self, def: &Def) {
        match def {
            Def::AbstractClass(d) => {
                self.line(&format!("abstract class {}", d.name));
            }
            Def::CaseClass(d) => {
                let fields: Vec<String> = d
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(i, t)| format!("v{}: {}", i, t.node))
                    .collect();
                self.line(&format!(
                    "case class {}({}) extends {}",
                    d.name,
                    fields.join(", "),
                    d.parent
                ));
            }
            Def::Fun(d) => {
                let params: Vec<String> = d
                    .params
                    .iter()
                    .map(|p| format!("{}: {}", p.node.name, p.node.tpe.node))
                    .collect();
                self.line(&format!(
                    "def {}({}): {} = {{",
                    d.name,
                    params.join(", "),
                    d.ret_type.node
                ));
                self.indent += 1;
                let mut p = Printer::new();
                p.indent = self.indent;
                p.expr(&d.body.node);
                let body = p.out;
                self.line(&body);
                self.indent -= 1;
                self.line("}");
            }
        }
    }

    /// Print an expression in a position that accepts the full `Expr`
    /// production (function bodies, branch bodies, call arguments).
    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Let { param, value, body } => {
                write!(
                    self.out,
                    "val {}: {} = ",
                    param.name, param.tpe.node
                )
                .unwrap();
                self.operand(&value.node);
                self.out.push_str(";\n");
                for _ in 0..self.indent {
                    self.out.push_str("  ");
                }
                self.expr(&body.node);
            }
            Expr::Sequence(first, second) => {
                self.operand(&first.node);
                self.out.push_str(";\n");
                for _ in 0..self.indent {
                    self.out.push_str("  ");
                }
                self.expr(&second.node);
            }
            other => self.operand(other),
        }
    }

    /// Print an expression in operand position: anything that is not valid
    /// there by itself gets wrapped in parentheses.
    fn operand(&mut self, expr: &Expr) {
        match expr {
            Expr::Variable(name) => self.out.push_str(name),
            Expr::Lit(lit) => {
                write!(self.out, "{}", lit).unwrap();
            }
            Expr::Call { callee, args } => {
                write!(self.out, "{}(", callee).unwrap();
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(&arg.node);
                }
                self.out.push(')');
            }
            Expr::Error(msg) => {
                self.out.push_str("error(");
                self.expr(&msg.node);
                self.out.push(')');
            }
            Expr::BinaryOp { op, lhs, rhs } => {
                self.atom(&lhs.node);
                write!(self.out, " {} ", op).unwrap();
                self.atom(&rhs.node);
            }
            Expr::UnaryOp { op, operand } => {
                write!(self.out, "{}", op).unwrap();
                self.atom(&operand.node);
            }
            Expr::Ite {
                cond,
                then_branch,
                else_branch,
            } => {
                self.out.push_str("if (");
                self.expr(&cond.node);
                self.out.push_str(") { ");
                self.expr(&then_branch.node);
                self.out.push_str(" } else { ");
                self.expr(&else_branch.node);
                self.out.push_str(" }");
            }
            Expr::Match { scrutinee, cases } => {
                self.atom(&scrutinee.node);
                self.out.push_str(" match {\n");
                self.indent += 1;
                for case in cases {
                    self.case(case);
                }
                self.indent -= 1;
                for _ in 0..self.indent {
                    self.out.push_str("  ");
                }
                self.out.push('}');
            }
            wrapped @ (Expr::Let { .. } | Expr::Sequence(..)) => {
                self.out.push('(');
                self.expr(wrapped);
                self.out.push(')');
            }
        }
    }

    /// Print an expression where the grammar wants a `Simple` form:
    /// operator operands and match scrutinees.
    fn atom(&mut self, expr: &Expr) {
        match expr {
            Expr::Variable(_) | Expr::Lit(_) | Expr::Call { .. } | Expr::Error(_) => {
                self.operand(expr)
            }
            other => {
                self.out.push('(');
                self.expr(other);
                self.out.push(')');
            }
        }
    }

    fn case(&mut self, case: &MatchCase) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str("case ");
        self.pattern(&case.pattern);
        self.out.push_str(" => ");
        self.expr(&case.expr.node);
        self.out.push('\n');
    }

    fn pattern(&mut self, pattern: &Spanned<Pattern>) {
        match &pattern.node {
            Pattern::Wildcard => self.out.push('_'),
            Pattern::Id(name) => self.out.push_str(name),
            Pattern::Lit(lit) => {
                write!(self.out, "{}", lit).unwrap();
            }
            Pattern::CaseClass { constructor, args } => {
                write!(self.out, "{}(", constructor).unwrap();
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.pattern(arg);
                }
                self.out.push(')');
            }
        }
    }
}

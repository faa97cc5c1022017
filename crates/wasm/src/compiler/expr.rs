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

use ast::op::{BinOp, UnaryOp};
use ast::symbolic::Expr;
use ast::{Literal, Spanned};

use super::Compiler;
use crate::instructions::Instruction::*;
use crate::instructions::HEAP_GLOBAL;
use crate::runtime;

impl Compiler<'_> {
    /// Compile an expression, leaving its `i32` value on the operand stack.
    pub(crate) fn compile_expr(&mut self, expr: &Spanned<Expr>) {
        match &expr.node {
            Expr::Lit(Literal::Int(value)) => self.ctx().emit(I32Const(*value)),
            Expr::Lit(Literal::Bool(value)) => self.ctx().emit(I32Const(*value as i32)),
            Expr::Lit(Literal::Unit) => self.ctx().emit(I32Const(0)),
            Expr::Lit(Literal::Str(text)) => self.compile_string_literal(text),

            Expr::Variable(id) => {
                let local = self.ctx().local(*id);
                self.ctx().emit(LocalGet(local));
            }

            Expr::BinaryOp { op, lhs, rhs } => match op {
                // Short-circuit: the right operand only runs if needed.
                BinOp::And => {
                    self.compile_expr(lhs);
                    self.ctx().emit(If { result: true });
                    self.compile_expr(rhs);
                    self.ctx().emit(Else);
                    self.ctx().emit(I32Const(0));
                    self.ctx().emit(End);
                }
                BinOp::Or => {
                    self.compile_expr(lhs);
                    self.ctx().emit(If { result: true });
                    self.ctx().emit(I32Const(1));
                    self.ctx().emit(Else);
                    self.compile_expr(rhs);
                    self.ctx().emit(End);
                }
                BinOp::Concat => {
                    self.compile_expr(lhs);
                    self.compile_expr(rhs);
                    self.ctx().emit(Call(runtime::STRING_CONCAT));
                }
                _ => {
                    self.compile_expr(lhs);
                    self.compile_expr(rhs);
                    let instruction = match op {
                        BinOp::Plus => I32Add,
                        BinOp::Minus => I32Sub,
                        BinOp::Times => I32Mul,
                        // Division and modulo trap on a zero divisor.
                        BinOp::Div => I32DivS,
                        BinOp::Mod => I32RemS,
                        BinOp::LessThan => I32LtS,
                        BinOp::LessEquals => I32LeS,
                        // Pointer equality for heap values coincides with
                        // reference equality; primitives compare by value.
                        BinOp::Equals => I32Eq,
                        BinOp::And | BinOp::Or | BinOp::Concat => unreachable!(),
                    };
                    self.ctx().emit(instruction);
                }
            },

            Expr::UnaryOp { op, operand } => match op {
                UnaryOp::Neg => {
                    self.ctx().emit(I32Const(0));
                    self.compile_expr(operand);
                    self.ctx().emit(I32Sub);
                }
                UnaryOp::Not => {
                    self.compile_expr(operand);
                    self.ctx().emit(I32Const(1));
                    self.ctx().emit(I32Xor);
                }
            },

            Expr::Call { callee, args } => {
                if let Some(sig) = self.table.constructor(*callee) {
                    let tag = sig.index as i32;
                    self.compile_allocation(tag, args);
                } else {
                    for arg in args {
                        self.compile_expr(arg);
                    }
                    let index = *self
                        .fun_indices
                        .get(callee)
                        .expect("every function was assigned an index");
                    self.ctx().emit(Call(index));
                }
            }

            Expr::Sequence(first, second) => {
                self.compile_expr(first);
                self.ctx().emit(Drop);
                self.compile_expr(second);
            }

            Expr::Let { param, value, body } => {
                self.compile_expr(value);
                let local = self.ctx().declare_local(param.name);
                self.ctx().emit(LocalSet(local));
                self.compile_expr(body);
            }

            Expr::Ite {
                cond,
                then_branch,
                else_branch,
            } => {
                self.compile_expr(cond);
                self.ctx().emit(If { result: true });
                self.compile_expr(then_branch);
                self.ctx().emit(Else);
                self.compile_expr(else_branch);
                self.ctx().emit(End);
            }

            Expr::Match { scrutinee, cases } => self.compile_match(scrutinee, cases),

            Expr::Error(message) => {
                self.compile_expr(message);
                self.ctx().emit(Call(runtime::PRINT_STRING));
                self.ctx().emit(Drop);
                self.ctx().emit(Unreachable);
            }
        }
    }

    /// Materialize a string literal at the heap pointer: its bytes, a NUL
    /// terminator and zero padding up to a 4-byte boundary. The value is the
    /// base pointer.
    pub(crate) fn compile_string_literal(&mut self, text: &str) {
        let bytes = text.as_bytes();
        let size = (bytes.len() + 1).next_multiple_of(4);
        for offset in 0..size {
            let byte = bytes.get(offset).copied().unwrap_or(0);
            self.ctx().emit(GlobalGet(HEAP_GLOBAL));
            self.ctx().emit(I32Const(byte as i32));
            self.ctx().emit(I32Store8(offset as u32));
        }
        self.ctx().emit(GlobalGet(HEAP_GLOBAL));
        self.ctx().emit(GlobalGet(HEAP_GLOBAL));
        self.ctx().emit(I32Const(size as i32));
        self.ctx().emit(I32Add);
        self.ctx().emit(GlobalSet(HEAP_GLOBAL));
    }

    /// Allocate a constructor record: word 0 holds the tag, words 1..n the
    /// field values. The record is reserved before the arguments run, so a
    /// nested allocation cannot interleave with the field stores.
    fn compile_allocation(&mut self, tag: i32, args: &[Spanned<Expr>]) {
        let size = 4 * (1 + args.len()) as i32;
        let base = self.ctx().scratch();

        self.ctx().emit(GlobalGet(HEAP_GLOBAL));
        self.ctx().emit(LocalSet(base));
        self.ctx().emit(GlobalGet(HEAP_GLOBAL));
        self.ctx().emit(I32Const(size));
        self.ctx().emit(I32Add);
        self.ctx().emit(GlobalSet(HEAP_GLOBAL));

        self.ctx().emit(LocalGet(base));
        self.ctx().emit(I32Const(tag));
        self.ctx().emit(I32Store(0));

        for (field, arg) in args.iter().enumerate() {
            self.ctx().emit(LocalGet(base));
            self.compile_expr(arg);
            self.ctx().emit(I32Store(4 * (field as u32 + 1)));
        }

        self.ctx().emit(LocalGet(base));
    }
}

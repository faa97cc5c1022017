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

//! Match lowering.
//!
//! A match compiles to a chain of nested `if … else` expressions, one per
//! arm in source order. Each pattern test reads the tested value from a
//! local, leaves a boolean, and stores its bindings as a side effect along
//! the way (a later failing sub-test makes the whole arm fail, so stray
//! stores are harmless). When every arm has failed the chain prints a match
//! error and traps; the trailing `unreachable` is load-bearing and must
//! never be optimized away.

use ast::symbolic::{Expr, MatchCase, Pattern};
use ast::{Literal, Spanned};

use super::Compiler;
use crate::instructions::Instruction::*;
use crate::runtime;

impl Compiler<'_> {
    pub(crate) fn compile_match(&mut self, scrutinee: &Spanned<Expr>, cases: &[MatchCase]) {
        self.compile_expr(scrutinee);
        let scrut = self.ctx().scratch();
        self.ctx().emit(LocalSet(scrut));
        self.compile_cases(cases, scrut);
    }

    fn compile_cases(&mut self, cases: &[MatchCase], scrut: u32) {
        match cases.split_first() {
            None => {
                self.compile_string_literal("Match error!");
                self.ctx().emit(Call(runtime::PRINT_STRING));
                self.ctx().emit(Drop);
                self.ctx().emit(Unreachable);
            }
            Some((case, rest)) => {
                self.compile_pattern_test(&case.pattern, scrut);
                self.ctx().emit(If { result: true });
                self.compile_expr(&case.expr);
                self.ctx().emit(Else);
                self.compile_cases(rest, scrut);
                self.ctx().emit(End);
            }
        }
    }

    /// Emit code testing the value in local `value` against `pattern`,
    /// leaving 1 or 0 on the stack.
    fn compile_pattern_test(&mut self, pattern: &Spanned<Pattern>, value: u32) {
        match &pattern.node {
            Pattern::Wildcard => self.ctx().emit(I32Const(1)),

            Pattern::Id(id) => {
                let local = self.ctx().declare_local(*id);
                self.ctx().emit(LocalGet(value));
                self.ctx().emit(LocalSet(local));
                self.ctx().emit(I32Const(1));
            }

            Pattern::Lit(lit) => {
                self.ctx().emit(LocalGet(value));
                match lit {
                    Literal::Int(n) => self.ctx().emit(I32Const(*n)),
                    Literal::Bool(b) => self.ctx().emit(I32Const(*b as i32)),
                    Literal::Unit => self.ctx().emit(I32Const(0)),
                    // Strings compare by pointer, so a fresh literal never
                    // equals an existing string.
                    Literal::Str(text) => self.compile_string_literal(text),
                }
                self.ctx().emit(I32Eq);
            }

            Pattern::CaseClass { constructor, args } => {
                let tag = self
                    .table
                    .constructor(*constructor)
                    .expect("name analysis resolved the constructor")
                    .index as i32;
                self.ctx().emit(LocalGet(value));
                self.ctx().emit(I32Load(0));
                self.ctx().emit(I32Const(tag));
                self.ctx().emit(I32Eq);
                if !args.is_empty() {
                    // Field loads only run once the tag matched.
                    self.ctx().emit(If { result: true });
                    self.compile_field_tests(args, 0, value);
                    self.ctx().emit(Else);
                    self.ctx().emit(I32Const(0));
                    self.ctx().emit(End);
                }
            }
        }
    }

    /// Test fields `index..` of the record in local `record`, conjoined
    /// with short-circuit.
    fn compile_field_tests(&mut self, args: &[Spanned<Pattern>], index: usize, record: u32) {
        let field = self.ctx().scratch();
        self.ctx().emit(LocalGet(record));
        self.ctx().emit(I32Load(4 * (index as u32 + 1)));
        self.ctx().emit(LocalSet(field));
        self.compile_pattern_test(&args[index], field);

        if index + 1 < args.len() {
            self.ctx().emit(If { result: true });
            self.compile_field_tests(args, index + 1, record);
            self.ctx().emit(Else);
            self.ctx().emit(I32Const(0));
            self.ctx().emit(End);
        }
    }
}

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

use std::collections::HashMap;

use ast::symbolic::Identifier;

use crate::instructions::Instruction;

/// Context for compiling a single function body.
///
/// Buffers the instruction stream and hands out `i32` local slots:
/// parameters occupy indices `0..param_count`, every `val` binding and
/// pattern binder gets a named slot, and scratch slots hold values the
/// lowering needs to read more than once (match scrutinees, allocation base
/// pointers, constructor fields under test).
pub struct FunctionContext {
    /// Amy binder → WASM local index. Binders are unique per function, so
    /// one flat map covers all scopes.
    locals: HashMap<Identifier, u32>,
    param_count: u32,
    next_local: u32,
    body: Vec<Instruction>,
}

impl FunctionContext {
    pub fn new(params: &[Identifier]) -> Self {
        let mut locals = HashMap::new();
        for (index, &param) in params.iter().enumerate() {
            locals.insert(param, index as u32);
        }
        let param_count = params.len() as u32;
        Self {
            locals,
            param_count,
            next_local: param_count,
            body: Vec::new(),
        }
    }

    /// Allocate the local slot for a `val` or pattern binder.
    pub fn declare_local(&mut self, id: Identifier) -> u32 {
        let index = self.next_local;
        self.next_local += 1;
        self.locals.insert(id, index);
        index
    }

    /// Allocate an anonymous scratch slot.
    pub fn scratch(&mut self) -> u32 {
        let index = self.next_local;
        self.next_local += 1;
        index
    }

    pub fn local(&self, id: Identifier) -> u32 {
        *self
            .locals
            .get(&id)
            .expect("every binder was assigned a local before use")
    }

    pub fn emit(&mut self, instruction: Instruction) {
        self.body.push(instruction);
    }

    /// The collected body and the number of extra (non-parameter) locals.
    pub fn finish(self) -> (Vec<Instruction>, usize) {
        let extra = (self.next_local - self.param_count) as usize;
        (self.body, extra)
    }
}

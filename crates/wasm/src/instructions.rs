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

//! The instruction-level model of an emitted module.
//!
//! Every Amy value is a single `i32` (integers, booleans, unit, and pointers
//! into linear memory alike), so the instruction set is the small `i32`
//! fragment of WASM the code generator needs. The same instruction stream
//! feeds the text printer ([`crate::wat`]) and the binary encoder
//! ([`crate::binary`]).

/// Initial size of the imported memory, in 64KiB pages.
pub const MEMORY_PAGES: u64 = 100;

/// Index of the heap-pointer global (the module's only global).
pub const HEAP_GLOBAL: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    I32Const(i32),

    I32Add,
    I32Sub,
    I32Mul,
    I32DivS,
    I32RemS,
    I32Eq,
    I32LtS,
    I32LeS,
    I32Xor,

    LocalGet(u32),
    LocalSet(u32),
    GlobalGet(u32),
    GlobalSet(u32),

    Call(u32),

    /// `result` selects `(result i32)` over an empty block type.
    If { result: bool },
    Else,
    Block { result: bool },
    Loop { result: bool },
    Br(u32),
    BrIf(u32),
    End,

    Drop,
    Unreachable,

    /// Loads and stores carry a static byte offset.
    I32Load(u32),
    I32Store(u32),
    I32Load8U(u32),
    I32Store8(u32),
}

/// A function import. All imported functions take and return `i32`s.
#[derive(Debug, Clone)]
pub struct Import {
    pub module: &'static str,
    pub name: &'static str,
    pub params: usize,
    pub returns: bool,
}

/// One emitted function. Parameters and locals are all `i32`.
#[derive(Debug, Clone)]
pub struct Function {
    /// `Module_name` — the WAT symbol and, when exported, the export name.
    pub name: String,
    pub params: usize,
    /// Locals beyond the parameters.
    pub locals: usize,
    pub returns: bool,
    pub exported: bool,
    pub body: Vec<Instruction>,
}

/// A compiled program: the fixed import surface, the mutable heap-pointer
/// global (implicit, see [`HEAP_GLOBAL`]) and the function bodies.
#[derive(Debug, Clone)]
pub struct WasmModule {
    pub imports: Vec<Import>,
    pub functions: Vec<Function>,
}

impl WasmModule {
    /// Name of the function occupying `index` in the function index space
    /// (imports first, then defined functions).
    pub fn function_name(&self, index: u32) -> &str {
        let index = index as usize;
        if index < self.imports.len() {
            self.imports[index].name
        } else {
            &self.functions[index - self.imports.len()].name
        }
    }
}

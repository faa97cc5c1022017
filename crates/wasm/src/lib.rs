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

pub mod binary;
pub mod compiler;
pub mod functions;
pub mod instructions;
pub mod runtime;
pub mod type_checker;
pub mod wat;

#[cfg(test)]
mod tests;

use analyzer::symbol::SymbolTable;
use ast::diagnostic::Diagnostic;
use ast::symbolic::Program;
use instructions::WasmModule;

/// Compile a resolved program to a WASM module.
///
/// This is the main entry point for the compilation backend:
/// 1. Runs the constraint-based type checker over every function body and
///    module initializer.
/// 2. Lowers the typed AST to the instruction-level module, from which
///    [`wat::print_module`] derives the text format and
///    [`binary::encode_module`] the binary.
///
/// Returns the module on success, or the collected type errors on failure.
pub fn compile(program: &Program, table: &SymbolTable) -> Result<WasmModule, Vec<Diagnostic>> {
    type_checker::check_program(program, table)?;
    Ok(compiler::compile_program(program, table))
}

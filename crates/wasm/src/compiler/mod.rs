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

//! The code generator.
//!
//! Lowers a type-checked program to the instruction-level module. Assumes
//! the type checker has accepted the tree, so every expression produces
//! exactly one `i32` and every call site matches its signature.
//!
//! Pass 1 assigns function indices (imports, then runtime support, then
//! user functions in program order); pass 2 emits the bodies; finally each
//! module with a top-level expression gets an exported `<Module>_main`
//! wrapper that evaluates the expression and drops its value.

mod expr;
mod pattern;

use std::collections::HashMap;

use analyzer::symbol::SymbolTable;
use ast::symbolic::{Def, FunDef, Identifier, Program};
use ast::Spanned;

use crate::functions::FunctionContext;
use crate::instructions::{Function, Instruction, WasmModule};
use crate::runtime;

pub fn compile_program(program: &Program, table: &SymbolTable) -> WasmModule {
    let mut compiler = Compiler::new(table);

    // ── Pass 1: assign user function indices ──
    let mut next = runtime::USER_BASE;
    for module in &program.modules {
        for def in &module.node.defs {
            if let Def::Fun(fun) = &def.node {
                compiler.fun_indices.insert(fun.name, next);
                next += 1;
            }
        }
    }

    // ── Pass 2: compile function bodies ──
    for module in &program.modules {
        let module_name = table.name_of(module.node.name).to_string();
        for def in &module.node.defs {
            if let Def::Fun(fun) = &def.node {
                compiler.compile_function(&module_name, fun);
            }
        }
    }

    // ── Pass 3: one exported main wrapper per module initializer ──
    for module in &program.modules {
        if let Some(init) = &module.node.initializer {
            let module_name = table.name_of(module.node.name).to_string();
            compiler.compile_main(&module_name, init);
        }
    }

    WasmModule {
        imports: runtime::imports(),
        functions: compiler.functions,
    }
}

pub(crate) struct Compiler<'a> {
    pub(crate) table: &'a SymbolTable,
    pub(crate) functions: Vec<Function>,
    /// Function or builtin identifier → index in the function index space.
    pub(crate) fun_indices: HashMap<Identifier, u32>,
    current: Option<FunctionContext>,
}

impl<'a> Compiler<'a> {
    fn new(table: &'a SymbolTable) -> Self {
        let std = table.std;
        let fun_indices = HashMap::from([
            (std.print_int, runtime::PRINT_INT),
            (std.print_string, runtime::PRINT_STRING),
            (std.read_int, runtime::READ_INT),
            (std.read_string, runtime::STD_READ_STRING),
            (std.digit_to_string, runtime::STD_DIGIT_TO_STRING),
            (std.int_to_string, runtime::STD_INT_TO_STRING),
        ]);
        Self {
            table,
            functions: runtime::support_functions(),
            fun_indices,
            current: None,
        }
    }

    pub(crate) fn ctx(&mut self) -> &mut FunctionContext {
        self.current.as_mut().expect("no active function context")
    }

    fn compile_function(&mut self, module_name: &str, fun: &FunDef) {
        let params: Vec<Identifier> = fun.params.iter().map(|p| p.node.name).collect();
        self.current = Some(FunctionContext::new(&params));
        self.compile_expr(&fun.body);
        let (body, locals) = self.current.take().expect("context set above").finish();

        self.functions.push(Function {
            name: format!("{}_{}", module_name, self.table.name_of(fun.name)),
            params: params.len(),
            locals,
            returns: true,
            exported: false,
            body,
        });
    }

    fn compile_main(&mut self, module_name: &str, init: &Spanned<ast::symbolic::Expr>) {
        self.current = Some(FunctionContext::new(&[]));
        self.compile_expr(init);
        self.ctx().emit(Instruction::Drop);
        let (body, locals) = self.current.take().expect("context set above").finish();

        self.functions.push(Function {
            name: format!("{}_main", module_name),
            params: 0,
            locals,
            returns: false,
            exported: true,
            body,
        });
    }
}

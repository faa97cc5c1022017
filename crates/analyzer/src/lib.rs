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

//! Name analysis: resolves every textual name of a nominal program to a
//! unique identifier and builds the symbol table.
//!
//! Three passes over the parsed program:
//! 1. register modules (duplicates are fatal),
//! 2. collect type, constructor and function signatures in source order,
//! 3. rewrite expressions into the symbolic tree, threading a local
//!    environment functionally.
//!
//! Errors within a pass are collected rather than aborting on the first;
//! a later pass only runs once the previous one was clean, so it can rely
//! on the table being fully populated.

pub mod symbol;

mod resolver;

#[cfg(test)]
mod tests;

use ast::diagnostic::Diagnostic;
use ast::nominal as nom;
use ast::symbolic as sym;
use ast::symbolic::{Identifier, Type};
use ast::Spanned;
use symbol::SymbolTable;

/// Resolve a nominal program into its symbolic form plus the symbol table.
pub fn analyze(program: &nom::Program) -> Result<(sym::Program, SymbolTable), Vec<Diagnostic>> {
    let mut table = SymbolTable::new();
    let mut errors = Vec::new();

    // ── Pass 1: module registration ──
    let mut module_ids = Vec::new();
    for module in &program.modules {
        match table.add_module(&module.node.name) {
            Some(id) => module_ids.push(id),
            None => errors.push(Diagnostic::fatal(
                format!("Duplicate module name '{}'", module.node.name),
                module.span,
            )),
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    // ── Pass 2: type, constructor and function signatures, in source order ──
    for (module, &module_id) in program.modules.iter().zip(&module_ids) {
        for def in &module.node.defs {
            register_signature(&mut table, module_id, def, &mut errors);
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    // ── Pass 3: expression rewriting ──
    let symbolic = resolver::resolve_program(program, &module_ids, &mut table)?;
    Ok((symbolic, table))
}

fn register_signature(
    table: &mut SymbolTable,
    module_id: Identifier,
    def: &Spanned<nom::Def>,
    errors: &mut Vec<Diagnostic>,
) {
    match &def.node {
        nom::Def::AbstractClass(d) => {
            if table.add_abstract_class(module_id, &d.name).is_none() {
                errors.push(Diagnostic::error(
                    format!("Duplicate type name '{}'", d.name),
                    def.span,
                ));
            }
        }

        nom::Def::CaseClass(d) => {
            // Parents resolve within the same module and must be abstract
            // classes declared earlier in it.
            let parent = match table.type_in(module_id, &d.parent) {
                Some(parent) if table.is_abstract_class(parent) => Some(parent),
                Some(_) => {
                    errors.push(Diagnostic::error(
                        format!("Class '{}' must extend an abstract class", d.name),
                        def.span,
                    ));
                    None
                }
                None => {
                    errors.push(Diagnostic::error(
                        format!("Unknown parent class '{}'", d.parent),
                        def.span,
                    ));
                    None
                }
            };

            let mut fields = Vec::with_capacity(d.fields.len());
            for field in &d.fields {
                fields.push(resolve_type(table, module_id, field, errors));
            }

            let (Some(parent), Some(fields)) =
                (parent, fields.into_iter().collect::<Option<Vec<_>>>())
            else {
                return;
            };
            if table
                .add_constructor(module_id, &d.name, fields, parent)
                .is_none()
            {
                errors.push(Diagnostic::error(
                    format!("Duplicate definition of '{}'", d.name),
                    def.span,
                ));
            }
        }

        nom::Def::Fun(d) => {
            let mut seen = std::collections::HashSet::new();
            for param in &d.params {
                if !seen.insert(param.node.name.as_str()) {
                    errors.push(Diagnostic::error(
                        format!(
                            "Duplicate parameter '{}' in function '{}'",
                            param.node.name, d.name
                        ),
                        param.span,
                    ));
                }
            }

            let mut arg_types = Vec::with_capacity(d.params.len());
            for param in &d.params {
                arg_types.push(resolve_type(table, module_id, &param.node.tpe, errors));
            }
            let ret_type = resolve_type(table, module_id, &d.ret_type, errors);

            let (Some(arg_types), Some(ret_type)) =
                (arg_types.into_iter().collect::<Option<Vec<_>>>(), ret_type)
            else {
                return;
            };
            if table
                .add_function(module_id, &d.name, arg_types, ret_type)
                .is_none()
            {
                errors.push(Diagnostic::error(
                    format!("Duplicate definition of '{}'", d.name),
                    def.span,
                ));
            }
        }
    }
}

/// Resolve a written type. Class references may be qualified (`M.T`) or
/// unqualified, in which case they name a type of the current module.
fn resolve_type(
    table: &SymbolTable,
    current_module: Identifier,
    tree: &Spanned<nom::TypeTree>,
    errors: &mut Vec<Diagnostic>,
) -> Option<Type> {
    match &tree.node {
        nom::TypeTree::Int => Some(Type::Int),
        nom::TypeTree::Boolean => Some(Type::Boolean),
        nom::TypeTree::String => Some(Type::String),
        nom::TypeTree::Unit => Some(Type::Unit),
        nom::TypeTree::Class(qname) => {
            let module = match &qname.module {
                Some(name) => match table.module(name) {
                    Some(id) => id,
                    None => {
                        errors.push(Diagnostic::error(
                            format!("Unknown module '{}'", name),
                            tree.span,
                        ));
                        return None;
                    }
                },
                None => current_module,
            };
            match table.type_in(module, &qname.name) {
                Some(id) => Some(Type::Class(id)),
                None => {
                    errors.push(Diagnostic::error(
                        format!("Unknown type '{}'", qname),
                        tree.span,
                    ));
                    None
                }
            }
        }
    }
}

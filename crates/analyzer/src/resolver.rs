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

//! Pass 3: rewrites expressions of the nominal tree into the symbolic tree.

use std::collections::HashMap;

use ast::diagnostic::Diagnostic;
use ast::nominal as nom;
use ast::symbolic as sym;
use ast::symbolic::Identifier;
use ast::{Literal, Span, Spanned};

use crate::symbol::SymbolTable;

/// Maps each visible textual name to the identifier of its binder. Scopes
/// are threaded functionally: extending a scope clones the map, so sibling
/// branches never observe each other's bindings.
type Env = HashMap<String, Identifier>;

pub(crate) fn resolve_program(
    program: &nom::Program,
    module_ids: &[Identifier],
    table: &mut SymbolTable,
) -> Result<sym::Program, Vec<Diagnostic>> {
    let mut resolver = Resolver {
        table,
        errors: Vec::new(),
    };

    let mut modules = Vec::new();
    for (module, &module_id) in program.modules.iter().zip(module_ids) {
        let resolved = resolver.resolve_module(&module.node, module_id);
        modules.push(Spanned::new(resolved, module.span));
    }

    if resolver.errors.is_empty() {
        Ok(sym::Program { modules })
    } else {
        Err(resolver.errors)
    }
}

struct Resolver<'a> {
    table: &'a mut SymbolTable,
    errors: Vec<Diagnostic>,
}

impl Resolver<'_> {
    fn error(&mut self, message: String, span: Span) {
        self.errors.push(Diagnostic::error(message, span));
    }

    /// Placeholder for a subtree that failed to resolve; the stage errors
    /// out at its boundary, so the placeholder is never executed.
    fn poisoned() -> sym::Expr {
        sym::Expr::Lit(Literal::Unit)
    }

    fn resolve_module(&mut self, module: &nom::ModuleDef, module_id: Identifier) -> sym::ModuleDef {
        let defs = module
            .defs
            .iter()
            .map(|def| {
                let resolved = self.resolve_def(&def.node, module_id);
                Spanned::new(resolved, def.span)
            })
            .collect();
        let initializer = module
            .initializer
            .as_ref()
            .map(|init| self.resolve_expr(init, module_id, &Env::new()));
        sym::ModuleDef {
            name: module_id,
            defs,
            initializer,
        }
    }

    fn resolve_def(&mut self, def: &nom::Def, module_id: Identifier) -> sym::Def {
        match def {
            nom::Def::AbstractClass(d) => {
                let id = self
                    .table
                    .type_in(module_id, &d.name)
                    .expect("abstract class registered in pass 2");
                sym::Def::AbstractClass(sym::AbstractClassDef { name: id })
            }

            nom::Def::CaseClass(d) => {
                let id = self
                    .table
                    .type_in(module_id, &d.name)
                    .expect("case class registered in pass 2");
                let sig = self
                    .table
                    .constructor(id)
                    .expect("constructor registered in pass 2")
                    .clone();
                sym::Def::CaseClass(sym::CaseClassDef {
                    name: id,
                    fields: sig.arg_types,
                    parent: sig.parent,
                })
            }

            nom::Def::Fun(d) => {
                let id = self
                    .table
                    .callable_in(module_id, &d.name)
                    .expect("function registered in pass 2");
                let sig = self
                    .table
                    .function(id)
                    .expect("function signature registered in pass 2")
                    .clone();

                let mut env = Env::new();
                let mut params = Vec::with_capacity(d.params.len());
                for (param, &tpe) in d.params.iter().zip(&sig.arg_types) {
                    let param_id = self.table.fresh(&param.node.name);
                    env.insert(param.node.name.clone(), param_id);
                    params.push(Spanned::new(
                        sym::ParamDef {
                            name: param_id,
                            tpe,
                        },
                        param.span,
                    ));
                }

                let body = self.resolve_expr(&d.body, module_id, &env);
                sym::Def::Fun(sym::FunDef {
                    name: id,
                    params,
                    ret_type: sig.ret_type,
                    body,
                })
            }
        }
    }

    fn resolve_expr(
        &mut self,
        expr: &Spanned<nom::Expr>,
        module: Identifier,
        env: &Env,
    ) -> Spanned<sym::Expr> {
        let node = match &expr.node {
            nom::Expr::Variable(name) => match env.get(name) {
                Some(&id) => sym::Expr::Variable(id),
                // Not bound locally: a bare name may still be a nullary call
                // of a function or constructor of the current module.
                None => match self.table.callable_in(module, name) {
                    Some(id) => sym::Expr::Call {
                        callee: id,
                        args: Vec::new(),
                    },
                    None => {
                        self.error(format!("Unknown identifier '{}'", name), expr.span);
                        Self::poisoned()
                    }
                },
            },

            nom::Expr::Lit(lit) => sym::Expr::Lit(lit.clone()),

            nom::Expr::BinaryOp { op, lhs, rhs } => sym::Expr::BinaryOp {
                op: *op,
                lhs: Box::new(self.resolve_expr(lhs, module, env)),
                rhs: Box::new(self.resolve_expr(rhs, module, env)),
            },

            nom::Expr::UnaryOp { op, operand } => sym::Expr::UnaryOp {
                op: *op,
                operand: Box::new(self.resolve_expr(operand, module, env)),
            },

            nom::Expr::Call { callee, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.resolve_expr(arg, module, env))
                    .collect();
                match self.resolve_callee(callee, module, expr.span) {
                    Some(id) => sym::Expr::Call { callee: id, args },
                    None => Self::poisoned(),
                }
            }

            nom::Expr::Sequence(first, second) => sym::Expr::Sequence(
                Box::new(self.resolve_expr(first, module, env)),
                Box::new(self.resolve_expr(second, module, env)),
            ),

            nom::Expr::Let { param, value, body } => {
                // The bound value is resolved in the outer scope: a `val`
                // never sees itself.
                let value = self.resolve_expr(value, module, env);
                let tpe = crate::resolve_type(&*self.table, module, &param.tpe, &mut self.errors)
                    .unwrap_or(sym::Type::Unit);
                let param_id = self.table.fresh(&param.name);
                let mut inner = env.clone();
                inner.insert(param.name.clone(), param_id);
                let body = self.resolve_expr(body, module, &inner);
                sym::Expr::Let {
                    param: sym::ParamDef {
                        name: param_id,
                        tpe,
                    },
                    value: Box::new(value),
                    body: Box::new(body),
                }
            }

            nom::Expr::Ite {
                cond,
                then_branch,
                else_branch,
            } => sym::Expr::Ite {
                cond: Box::new(self.resolve_expr(cond, module, env)),
                then_branch: Box::new(self.resolve_expr(then_branch, module, env)),
                else_branch: Box::new(self.resolve_expr(else_branch, module, env)),
            },

            nom::Expr::Match { scrutinee, cases } => {
                let scrutinee = self.resolve_expr(scrutinee, module, env);
                let cases = cases
                    .iter()
                    .map(|case| {
                        let mut binders = Vec::new();
                        let pattern = self.resolve_pattern(&case.pattern, module, &mut binders);
                        // Pattern bindings scope over this branch only.
                        let mut inner = env.clone();
                        for (name, id) in binders {
                            inner.insert(name, id);
                        }
                        let expr = self.resolve_expr(&case.expr, module, &inner);
                        sym::MatchCase { pattern, expr }
                    })
                    .collect();
                sym::Expr::Match {
                    scrutinee: Box::new(scrutinee),
                    cases,
                }
            }

            nom::Expr::Error(message) => {
                sym::Expr::Error(Box::new(self.resolve_expr(message, module, env)))
            }
        };
        Spanned::new(node, expr.span)
    }

    /// Resolve the target of a call: qualified names look into the named
    /// module, unqualified ones into the current module.
    fn resolve_callee(
        &mut self,
        qname: &nom::QualifiedName,
        current: Identifier,
        span: Span,
    ) -> Option<Identifier> {
        let module = match &qname.module {
            Some(name) => match self.table.module(name) {
                Some(id) => id,
                None => {
                    self.error(format!("Unknown module '{}'", name), span);
                    return None;
                }
            },
            None => current,
        };
        match self.table.callable_in(module, &qname.name) {
            Some(id) => Some(id),
            None => {
                self.error(
                    format!("Unknown function or constructor '{}'", qname),
                    span,
                );
                None
            }
        }
    }

    fn resolve_pattern(
        &mut self,
        pattern: &Spanned<nom::Pattern>,
        module: Identifier,
        binders: &mut Vec<(String, Identifier)>,
    ) -> Spanned<sym::Pattern> {
        let node = match &pattern.node {
            nom::Pattern::Wildcard => sym::Pattern::Wildcard,

            nom::Pattern::Lit(lit) => sym::Pattern::Lit(lit.clone()),

            nom::Pattern::Id(name) => {
                if binders.iter().any(|(bound, _)| bound == name) {
                    self.error(
                        format!("Multiple occurrences of '{}' in the same pattern", name),
                        pattern.span,
                    );
                }
                let id = self.table.fresh(name);
                binders.push((name.clone(), id));
                sym::Pattern::Id(id)
            }

            nom::Pattern::CaseClass { constructor, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.resolve_pattern(arg, module, binders))
                    .collect();
                match self.resolve_callee(constructor, module, pattern.span) {
                    Some(id) if self.table.constructor(id).is_some() => {
                        sym::Pattern::CaseClass {
                            constructor: id,
                            args,
                        }
                    }
                    Some(_) => {
                        self.error(
                            format!("'{}' is not a constructor", constructor),
                            pattern.span,
                        );
                        sym::Pattern::Wildcard
                    }
                    None => sym::Pattern::Wildcard,
                }
            }
        };
        Spanned::new(node, pattern.span)
    }
}

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

//! A tree-walking evaluator over the symbolic tree.
//!
//! This is the `--target interpret` pipeline: it runs each module's
//! top-level expression in program order, with the same observable behavior
//! as the compiled module. Equality is by value for primitives and by
//! reference for strings and case-class data, matching the pointer
//! comparison the code generator emits.

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use analyzer::symbol::SymbolTable;
use ast::op::{BinOp, UnaryOp};
use ast::symbolic::{Def, Expr, FunDef, Identifier, MatchCase, Pattern, Program};
use ast::{Literal, Span, Spanned};

/// An error raised by the running program: division by zero, a failed
/// match, invalid `readInt` input, or an explicit `error(...)`.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub message: String,
    pub span: Span,
}

impl RuntimeError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime error: {}", self.message)
    }
}

impl std::error::Error for RuntimeError {}

type RunResult<T> = Result<T, RuntimeError>;

#[derive(Debug, Clone)]
pub enum Value {
    Int(i32),
    Bool(bool),
    Str(Rc<String>),
    Unit,
    Data(Rc<DataValue>),
}

#[derive(Debug)]
pub struct DataValue {
    pub constructor: Identifier,
    pub fields: Vec<Value>,
}

impl Value {
    fn as_int(&self) -> i32 {
        match self {
            Value::Int(v) => *v,
            other => panic!("type checker admitted {:?} where Int was expected", other),
        }
    }

    fn as_bool(&self) -> bool {
        match self {
            Value::Bool(v) => *v,
            other => panic!("type checker admitted {:?} where Boolean was expected", other),
        }
    }

    fn as_str(&self) -> &Rc<String> {
        match self {
            Value::Str(v) => v,
            other => panic!("type checker admitted {:?} where String was expected", other),
        }
    }

    /// Value equality for primitives, reference equality for heap values.
    fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Unit, Value::Unit) => true,
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b),
            (Value::Data(a), Value::Data(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

type Env = HashMap<Identifier, Value>;

/// Run a program against stdio.
pub fn run(program: &Program, table: &SymbolTable) -> Result<(), RuntimeError> {
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    Interpreter::new(program, table, stdin, stdout).run_program()
}

pub struct Interpreter<'a, R, W> {
    table: &'a SymbolTable,
    program: &'a Program,
    /// Function bodies by identifier, for call dispatch.
    functions: HashMap<Identifier, &'a FunDef>,
    reader: R,
    writer: W,
}

impl<'a, R: BufRead, W: Write> Interpreter<'a, R, W> {
    pub fn new(program: &'a Program, table: &'a SymbolTable, reader: R, writer: W) -> Self {
        let mut functions = HashMap::new();
        for module in &program.modules {
            for def in &module.node.defs {
                if let Def::Fun(fun) = &def.node {
                    functions.insert(fun.name, fun);
                }
            }
        }
        Self {
            table,
            program,
            functions,
            reader,
            writer,
        }
    }

    /// Evaluate every module initializer in program order.
    pub fn run_program(&mut self) -> Result<(), RuntimeError> {
        for module in &self.program.modules {
            if let Some(init) = &module.node.initializer {
                self.eval(init, &Env::new())?;
            }
        }
        Ok(())
    }

    fn eval(&mut self, expr: &Spanned<Expr>, env: &Env) -> RunResult<Value> {
        let span = expr.span;
        match &expr.node {
            Expr::Variable(id) => Ok(env
                .get(id)
                .expect("name analysis bound every variable")
                .clone()),

            Expr::Lit(Literal::Int(v)) => Ok(Value::Int(*v)),
            Expr::Lit(Literal::Bool(v)) => Ok(Value::Bool(*v)),
            Expr::Lit(Literal::Unit) => Ok(Value::Unit),
            // Each evaluation of a literal allocates a fresh string.
            Expr::Lit(Literal::Str(s)) => Ok(Value::Str(Rc::new(s.clone()))),

            Expr::BinaryOp { op, lhs, rhs } => self.eval_binop(*op, lhs, rhs, env, span),

            Expr::UnaryOp { op, operand } => {
                let value = self.eval(operand, env)?;
                Ok(match op {
                    UnaryOp::Neg => Value::Int(value.as_int().wrapping_neg()),
                    UnaryOp::Not => Value::Bool(!value.as_bool()),
                })
            }

            Expr::Call { callee, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg, env)?);
                }
                self.call(*callee, values, span)
            }

            Expr::Sequence(first, second) => {
                self.eval(first, env)?;
                self.eval(second, env)
            }

            Expr::Let { param, value, body } => {
                let value = self.eval(value, env)?;
                let mut inner = env.clone();
                inner.insert(param.name, value);
                self.eval(body, &inner)
            }

            Expr::Ite {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval(cond, env)?.as_bool() {
                    self.eval(then_branch, env)
                } else {
                    self.eval(else_branch, env)
                }
            }

            Expr::Match { scrutinee, cases } => {
                let value = self.eval(scrutinee, env)?;
                self.eval_match(&value, cases, env, span)
            }

            Expr::Error(message) => {
                let message = self.eval(message, env)?;
                Err(RuntimeError::new(message.as_str().as_str(), span))
            }
        }
    }

    fn eval_binop(
        &mut self,
        op: BinOp,
        lhs: &Spanned<Expr>,
        rhs: &Spanned<Expr>,
        env: &Env,
        span: Span,
    ) -> RunResult<Value> {
        // Short-circuit forms first; everything else is strict.
        match op {
            BinOp::And => {
                return if self.eval(lhs, env)?.as_bool() {
                    self.eval(rhs, env)
                } else {
                    Ok(Value::Bool(false))
                };
            }
            BinOp::Or => {
                return if self.eval(lhs, env)?.as_bool() {
                    Ok(Value::Bool(true))
                } else {
                    self.eval(rhs, env)
                };
            }
            _ => {}
        }

        let left = self.eval(lhs, env)?;
        let right = self.eval(rhs, env)?;
        Ok(match op {
            BinOp::Plus => Value::Int(left.as_int().wrapping_add(right.as_int())),
            BinOp::Minus => Value::Int(left.as_int().wrapping_sub(right.as_int())),
            BinOp::Times => Value::Int(left.as_int().wrapping_mul(right.as_int())),
            BinOp::Div => {
                if right.as_int() == 0 {
                    return Err(RuntimeError::new("Division by zero", span));
                }
                Value::Int(left.as_int().wrapping_div(right.as_int()))
            }
            BinOp::Mod => {
                if right.as_int() == 0 {
                    return Err(RuntimeError::new("Modulo by zero", span));
                }
                Value::Int(left.as_int().wrapping_rem(right.as_int()))
            }
            BinOp::LessThan => Value::Bool(left.as_int() < right.as_int()),
            BinOp::LessEquals => Value::Bool(left.as_int() <= right.as_int()),
            BinOp::Equals => Value::Bool(left.equals(&right)),
            BinOp::Concat => Value::Str(Rc::new(format!("{}{}", left.as_str(), right.as_str()))),
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        })
    }

    fn call(&mut self, callee: Identifier, args: Vec<Value>, span: Span) -> RunResult<Value> {
        if let Some(sig) = self.table.constructor(callee) {
            debug_assert_eq!(args.len(), sig.arg_types.len());
            return Ok(Value::Data(Rc::new(DataValue {
                constructor: callee,
                fields: args,
            })));
        }
        if let Some(value) = self.call_builtin(callee, &args, span)? {
            return Ok(value);
        }

        let fun = *self
            .functions
            .get(&callee)
            .expect("name analysis resolved the callee");
        let mut env = Env::new();
        for (param, value) in fun.params.iter().zip(args) {
            env.insert(param.node.name, value);
        }
        self.eval(&fun.body, &env)
    }

    /// Dispatch `Std` functions; `Ok(None)` when `callee` is user-defined.
    fn call_builtin(
        &mut self,
        callee: Identifier,
        args: &[Value],
        span: Span,
    ) -> RunResult<Option<Value>> {
        let std = self.table.std;
        let value = if callee == std.print_int {
            writeln!(self.writer, "{}", args[0].as_int())
                .map_err(|e| RuntimeError::new(e.to_string(), span))?;
            Value::Unit
        } else if callee == std.print_string {
            writeln!(self.writer, "{}", args[0].as_str())
                .map_err(|e| RuntimeError::new(e.to_string(), span))?;
            Value::Unit
        } else if callee == std.read_int {
            let line = self.read_line(span)?;
            let parsed: i32 = line
                .trim()
                .parse()
                .map_err(|_| RuntimeError::new("Invalid input to readInt", span))?;
            Value::Int(parsed)
        } else if callee == std.read_string {
            Value::Str(Rc::new(self.read_line(span)?))
        } else if callee == std.int_to_string || callee == std.digit_to_string {
            Value::Str(Rc::new(args[0].as_int().to_string()))
        } else {
            return Ok(None);
        };
        Ok(Some(value))
    }

    fn read_line(&mut self, span: Span) -> RunResult<String> {
        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| RuntimeError::new(e.to_string(), span))?;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    fn eval_match(
        &mut self,
        value: &Value,
        cases: &[MatchCase],
        env: &Env,
        span: Span,
    ) -> RunResult<Value> {
        for case in cases {
            let mut bindings = Vec::new();
            if match_pattern(value, &case.pattern.node, &mut bindings) {
                let mut inner = env.clone();
                for (id, bound) in bindings {
                    inner.insert(id, bound);
                }
                return self.eval(&case.expr, &inner);
            }
        }
        Err(RuntimeError::new("Match error!", span))
    }
}

fn match_pattern(value: &Value, pattern: &Pattern, bindings: &mut Vec<(Identifier, Value)>) -> bool {
    match pattern {
        Pattern::Wildcard => true,
        Pattern::Id(id) => {
            bindings.push((*id, value.clone()));
            true
        }
        // Literal patterns compare like `==` does: string literals allocate
        // fresh values, so they never match by reference.
        Pattern::Lit(lit) => {
            let literal = match lit {
                Literal::Int(v) => Value::Int(*v),
                Literal::Bool(v) => Value::Bool(*v),
                Literal::Unit => Value::Unit,
                Literal::Str(s) => Value::Str(Rc::new(s.clone())),
            };
            value.equals(&literal)
        }
        Pattern::CaseClass { constructor, args } => match value {
            Value::Data(data) if data.constructor == *constructor => data
                .fields
                .iter()
                .zip(args)
                .all(|(field, arg)| match_pattern(field, &arg.node, bindings)),
            _ => false,
        },
    }
}

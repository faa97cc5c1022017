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

//! Prints a module in the WebAssembly text format.

use std::fmt::Write;

use crate::instructions::{Function, Instruction, WasmModule, MEMORY_PAGES};

pub fn print_module(module: &WasmModule) -> String {
    let mut out = String::new();
    out.push_str("(module\n");
    let _ = writeln!(
        out,
        "  (import \"system\" \"mem\" (memory {}))",
        MEMORY_PAGES
    );
    for import in &module.imports {
        let params = if import.params > 0 {
            format!(" (param{})", " i32".repeat(import.params))
        } else {
            String::new()
        };
        let result = if import.returns { " (result i32)" } else { "" };
        let _ = writeln!(
            out,
            "  (import \"{}\" \"{}\" (func ${}{}{}))",
            import.module, import.name, import.name, params, result
        );
    }
    // The heap pointer: a bump allocator over the imported memory.
    out.push_str("  (global $hp (mut i32) (i32.const 0))\n");
    for function in &module.functions {
        print_function(&mut out, module, function);
    }
    out.push_str(")\n");
    out
}

fn print_function(out: &mut String, module: &WasmModule, function: &Function) {
    let _ = write!(out, "  (func ${}", function.name);
    if function.exported {
        let _ = write!(out, " (export \"{}\")", function.name);
    }
    if function.params > 0 {
        let _ = write!(out, " (param{})", " i32".repeat(function.params));
    }
    if function.returns {
        out.push_str(" (result i32)");
    }
    out.push('\n');
    if function.locals > 0 {
        let _ = writeln!(out, "    (local{})", " i32".repeat(function.locals));
    }

    let mut depth = 0usize;
    for instruction in &function.body {
        if matches!(
            instruction,
            Instruction::End | Instruction::Else
        ) {
            depth = depth.saturating_sub(1);
        }
        for _ in 0..depth + 2 {
            out.push_str("  ");
        }
        out.push_str(&render(module, instruction));
        out.push('\n');
        if matches!(
            instruction,
            Instruction::If { .. }
                | Instruction::Else
                | Instruction::Block { .. }
                | Instruction::Loop { .. }
        ) {
            depth += 1;
        }
    }
    out.push_str("  )\n");
}

fn render(module: &WasmModule, instruction: &Instruction) -> String {
    use Instruction::*;
    match instruction {
        I32Const(value) => format!("i32.const {}", value),
        I32Add => "i32.add".to_string(),
        I32Sub => "i32.sub".to_string(),
        I32Mul => "i32.mul".to_string(),
        I32DivS => "i32.div_s".to_string(),
        I32RemS => "i32.rem_s".to_string(),
        I32Eq => "i32.eq".to_string(),
        I32LtS => "i32.lt_s".to_string(),
        I32LeS => "i32.le_s".to_string(),
        I32Xor => "i32.xor".to_string(),
        LocalGet(index) => format!("local.get {}", index),
        LocalSet(index) => format!("local.set {}", index),
        GlobalGet(_) => "global.get $hp".to_string(),
        GlobalSet(_) => "global.set $hp".to_string(),
        Call(index) => format!("call ${}", module.function_name(*index)),
        If { result: true } => "if (result i32)".to_string(),
        If { result: false } => "if".to_string(),
        Else => "else".to_string(),
        Block { result: true } => "block (result i32)".to_string(),
        Block { result: false } => "block".to_string(),
        Loop { result: true } => "loop (result i32)".to_string(),
        Loop { result: false } => "loop".to_string(),
        Br(depth) => format!("br {}", depth),
        BrIf(depth) => format!("br_if {}", depth),
        End => "end".to_string(),
        Drop => "drop".to_string(),
        Unreachable => "unreachable".to_string(),
        I32Load(0) => "i32.load".to_string(),
        I32Load(offset) => format!("i32.load offset={}", offset),
        I32Store(0) => "i32.store".to_string(),
        I32Store(offset) => format!("i32.store offset={}", offset),
        I32Load8U(0) => "i32.load8_u".to_string(),
        I32Load8U(offset) => format!("i32.load8_u offset={}", offset),
        I32Store8(0) => "i32.store8".to_string(),
        I32Store8(offset) => format!("i32.store8 offset={}", offset),
    }
}

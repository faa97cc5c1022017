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

//! Encodes a module to the WASM binary format using `wasm-encoder`.

use std::collections::HashMap;

use wasm_encoder::{
    CodeSection, ConstExpr, EntityType, ExportKind, ExportSection, Function as WasmFunction,
    FunctionSection, GlobalSection, GlobalType, ImportSection, Instruction as Encoded, MemArg,
    MemoryType, Module as EncodedModule, TypeSection, ValType,
};

use crate::instructions::{Instruction, WasmModule, MEMORY_PAGES};

pub fn encode_module(module: &WasmModule) -> Vec<u8> {
    let mut types = TypeSection::new();
    // Function types are (i32^n) -> (i32?); deduplicate by shape.
    let mut type_indices: HashMap<(usize, bool), u32> = HashMap::new();
    let mut type_of = |params: usize, returns: bool, types: &mut TypeSection| -> u32 {
        *type_indices.entry((params, returns)).or_insert_with(|| {
            let results: &[ValType] = if returns { &[ValType::I32] } else { &[] };
            types.function(vec![ValType::I32; params], results.to_vec());
            types.len() - 1
        })
    };

    let mut imports = ImportSection::new();
    imports.import(
        "system",
        "mem",
        EntityType::Memory(MemoryType {
            minimum: MEMORY_PAGES,
            maximum: None,
            memory64: false,
            shared: false,
            page_size_log2: None,
        }),
    );
    for import in &module.imports {
        let type_index = type_of(import.params, import.returns, &mut types);
        imports.import(import.module, import.name, EntityType::Function(type_index));
    }

    let mut functions = FunctionSection::new();
    for function in &module.functions {
        let type_index = type_of(function.params, function.returns, &mut types);
        functions.function(type_index);
    }

    let mut globals = GlobalSection::new();
    globals.global(
        GlobalType {
            val_type: ValType::I32,
            mutable: true,
            shared: false,
        },
        &ConstExpr::i32_const(0),
    );

    let mut exports = ExportSection::new();
    for (position, function) in module.functions.iter().enumerate() {
        if function.exported {
            let index = (module.imports.len() + position) as u32;
            exports.export(&function.name, ExportKind::Func, index);
        }
    }

    let mut code = CodeSection::new();
    for function in &module.functions {
        let locals = if function.locals > 0 {
            vec![(function.locals as u32, ValType::I32)]
        } else {
            Vec::new()
        };
        let mut body = WasmFunction::new(locals);
        for instruction in &function.body {
            body.instruction(&encode(instruction));
        }
        body.instruction(&Encoded::End);
        code.function(&body);
    }

    let mut encoded = EncodedModule::new();
    encoded
        .section(&types)
        .section(&imports)
        .section(&functions)
        .section(&globals)
        .section(&exports)
        .section(&code);
    encoded.finish()
}

fn mem_arg(offset: u32, align: u32) -> MemArg {
    MemArg {
        offset: offset as u64,
        align,
        memory_index: 0,
    }
}

fn encode(instruction: &Instruction) -> Encoded<'static> {
    match *instruction {
        Instruction::I32Const(value) => Encoded::I32Const(value),
        Instruction::I32Add => Encoded::I32Add,
        Instruction::I32Sub => Encoded::I32Sub,
        Instruction::I32Mul => Encoded::I32Mul,
        Instruction::I32DivS => Encoded::I32DivS,
        Instruction::I32RemS => Encoded::I32RemS,
        Instruction::I32Eq => Encoded::I32Eq,
        Instruction::I32LtS => Encoded::I32LtS,
        Instruction::I32LeS => Encoded::I32LeS,
        Instruction::I32Xor => Encoded::I32Xor,
        Instruction::LocalGet(index) => Encoded::LocalGet(index),
        Instruction::LocalSet(index) => Encoded::LocalSet(index),
        Instruction::GlobalGet(index) => Encoded::GlobalGet(index),
        Instruction::GlobalSet(index) => Encoded::GlobalSet(index),
        Instruction::Call(index) => Encoded::Call(index),
        Instruction::If { result } => Encoded::If(block_type(result)),
        Instruction::Else => Encoded::Else,
        Instruction::Block { result } => Encoded::Block(block_type(result)),
        Instruction::Loop { result } => Encoded::Loop(block_type(result)),
        Instruction::Br(depth) => Encoded::Br(depth),
        Instruction::BrIf(depth) => Encoded::BrIf(depth),
        Instruction::End => Encoded::End,
        Instruction::Drop => Encoded::Drop,
        Instruction::Unreachable => Encoded::Unreachable,
        Instruction::I32Load(offset) => Encoded::I32Load(mem_arg(offset, 2)),
        Instruction::I32Store(offset) => Encoded::I32Store(mem_arg(offset, 2)),
        Instruction::I32Load8U(offset) => Encoded::I32Load8U(mem_arg(offset, 0)),
        Instruction::I32Store8(offset) => Encoded::I32Store8(mem_arg(offset, 0)),
    }
}

fn block_type(result: bool) -> wasm_encoder::BlockType {
    if result {
        wasm_encoder::BlockType::Result(ValType::I32)
    } else {
        wasm_encoder::BlockType::Empty
    }
}

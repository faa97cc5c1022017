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

//! Hand-built runtime support functions present in every emitted module,
//! plus the fixed import surface and the function index layout.
//!
//! Function index space: the four imports come first, then the runtime
//! functions, then user functions in program order.

use crate::instructions::Instruction::*;
use crate::instructions::{Function, Import, Instruction, HEAP_GLOBAL};

pub const PRINT_INT: u32 = 0;
pub const PRINT_STRING: u32 = 1;
pub const READ_INT: u32 = 2;
pub const READ_STRING0: u32 = 3;

pub const STRING_CONCAT: u32 = 4;
pub const STD_READ_STRING: u32 = 5;
pub const STD_DIGIT_TO_STRING: u32 = 6;
pub const STD_INT_TO_STRING: u32 = 7;

/// Index of the first user function.
pub const USER_BASE: u32 = 8;

pub fn imports() -> Vec<Import> {
    vec![
        Import {
            module: "system",
            name: "printInt",
            params: 1,
            returns: true,
        },
        Import {
            module: "system",
            name: "printString",
            params: 1,
            returns: true,
        },
        Import {
            module: "system",
            name: "readInt",
            params: 0,
            returns: true,
        },
        Import {
            module: "system",
            name: "readString0",
            params: 1,
            returns: true,
        },
    ]
}

pub fn support_functions() -> Vec<Function> {
    vec![
        string_concat(),
        std_read_string(),
        std_digit_to_string(),
        std_int_to_string(),
    ]
}

/// Emit a byte-copy loop: bytes from the pointer in local `src` are copied
/// to the cursor in local `cur` until a NUL; both locals advance.
fn copy_string(body: &mut Vec<Instruction>, src: u32, cur: u32, byte: u32) {
    body.extend([
        Block { result: false },
        Loop { result: false },
        // byte = *src; stop on the terminator
        LocalGet(src),
        I32Load8U(0),
        LocalSet(byte),
        LocalGet(byte),
        I32Const(0),
        I32Eq,
        BrIf(1),
        // *cur = byte
        LocalGet(cur),
        LocalGet(byte),
        I32Store8(0),
        // cur += 1; src += 1
        LocalGet(cur),
        I32Const(1),
        I32Add,
        LocalSet(cur),
        LocalGet(src),
        I32Const(1),
        I32Add,
        LocalSet(src),
        Br(0),
        End,
        End,
    ]);
}

/// `String_concat(a, b)` copies both NUL-terminated strings to the current
/// heap pointer, zero-pads to a 4-byte boundary, advances the heap global
/// and returns the base of the new string.
fn string_concat() -> Function {
    // params: a = 0, b = 1; locals: base = 2, cur = 3, byte = 4
    let (a, b, base, cur, byte) = (0, 1, 2, 3, 4);
    let mut body = vec![
        GlobalGet(HEAP_GLOBAL),
        LocalSet(base),
        GlobalGet(HEAP_GLOBAL),
        LocalSet(cur),
    ];
    copy_string(&mut body, a, cur, byte);
    copy_string(&mut body, b, cur, byte);
    body.extend([
        // NUL terminator
        LocalGet(cur),
        I32Const(0),
        I32Store8(0),
        LocalGet(cur),
        I32Const(1),
        I32Add,
        LocalSet(cur),
        // zero-pad until the cursor is 4-byte aligned
        Block { result: false },
        Loop { result: false },
        LocalGet(cur),
        I32Const(4),
        I32RemS,
        I32Const(0),
        I32Eq,
        BrIf(1),
        LocalGet(cur),
        I32Const(0),
        I32Store8(0),
        LocalGet(cur),
        I32Const(1),
        I32Add,
        LocalSet(cur),
        Br(0),
        End,
        End,
        // bump the heap and return the base
        LocalGet(cur),
        GlobalSet(HEAP_GLOBAL),
        LocalGet(base),
    ]);
    Function {
        name: "String_concat".to_string(),
        params: 2,
        locals: 3,
        returns: true,
        exported: false,
        body,
    }
}

/// `Std_readString()` hands the current heap pointer to the host's
/// `readString0`, which writes the line and returns the new heap pointer;
/// the old pointer is the resulting string.
fn std_read_string() -> Function {
    Function {
        name: "Std_readString".to_string(),
        params: 0,
        locals: 0,
        returns: true,
        exported: false,
        body: vec![
            GlobalGet(HEAP_GLOBAL),
            GlobalGet(HEAP_GLOBAL),
            Call(READ_STRING0),
            GlobalSet(HEAP_GLOBAL),
        ],
    }
}

/// `Std_digitToString(d)` allocates a fresh 4-byte string `'0' + d`.
fn std_digit_to_string() -> Function {
    Function {
        name: "Std_digitToString".to_string(),
        params: 1,
        locals: 0,
        returns: true,
        exported: false,
        body: vec![
            GlobalGet(HEAP_GLOBAL),
            LocalGet(0),
            I32Const(b'0' as i32),
            I32Add,
            I32Store8(0),
            GlobalGet(HEAP_GLOBAL),
            I32Const(0),
            I32Store8(1),
            GlobalGet(HEAP_GLOBAL),
            GlobalGet(HEAP_GLOBAL),
            I32Const(4),
            I32Add,
            GlobalSet(HEAP_GLOBAL),
        ],
    }
}

/// `Std_intToString(i)`: sign handling plus divide-by-ten recursion over
/// `String_concat` and `Std_digitToString`.
fn std_int_to_string() -> Function {
    // param: i = 0; local: div = 1
    let (i, div) = (0, 1);
    Function {
        name: "Std_intToString".to_string(),
        params: 1,
        locals: 1,
        returns: true,
        exported: false,
        body: vec![
            LocalGet(i),
            I32Const(0),
            I32LtS,
            If { result: true },
            // "-" ++ intToString(-i)
            GlobalGet(HEAP_GLOBAL),
            I32Const(b'-' as i32),
            I32Store8(0),
            GlobalGet(HEAP_GLOBAL),
            I32Const(0),
            I32Store8(1),
            GlobalGet(HEAP_GLOBAL),
            GlobalGet(HEAP_GLOBAL),
            I32Const(4),
            I32Add,
            GlobalSet(HEAP_GLOBAL),
            I32Const(0),
            LocalGet(i),
            I32Sub,
            Call(STD_INT_TO_STRING),
            Call(STRING_CONCAT),
            Else,
            LocalGet(i),
            I32Const(10),
            I32DivS,
            LocalSet(div),
            LocalGet(div),
            I32Const(0),
            I32Eq,
            If { result: true },
            LocalGet(i),
            Call(STD_DIGIT_TO_STRING),
            Else,
            // intToString(i / 10) ++ digitToString(i % 10)
            LocalGet(div),
            Call(STD_INT_TO_STRING),
            LocalGet(i),
            I32Const(10),
            I32RemS,
            Call(STD_DIGIT_TO_STRING),
            Call(STRING_CONCAT),
            End,
            End,
        ],
    }
}

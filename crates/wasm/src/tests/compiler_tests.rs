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

use wasmparser::Validator;

use super::analyze;
use crate::instructions::{Function, Instruction, WasmModule, HEAP_GLOBAL};
use crate::runtime;
use crate::{binary, wat};

fn compile(source: &str) -> WasmModule {
    let (program, table) = analyze(source);
    crate::compile(&program, &table).expect("program should type check")
}

/// Compile a module and validate the resulting WASM binary.
fn compile_and_validate(source: &str) -> WasmModule {
    let module = compile(source);
    let bytes = binary::encode_module(&module);
    Validator::new()
        .validate_all(&bytes)
        .expect("emitted binary should validate");
    module
}

fn function<'a>(module: &'a WasmModule, name: &str) -> &'a Function {
    module
        .functions
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("no function named {}", name))
}

const LIST: &str = "
object L {
  abstract class List
  case class Nil() extends List
  case class Cons(h: Int, t: List) extends List

  def sum(l: List): Int = {
    l match {
      case Nil() => 0
      case Cons(h, t) => h + sum(t)
    }
  }

  Std.printInt(sum(Cons(1, Cons(2, Nil()))))
}
";

#[test]
fn emitted_binaries_validate() {
    compile_and_validate(LIST);
    compile_and_validate("object H { def f(x: Int): Int = { x + 1 } f(41) }");
    compile_and_validate(
        "object M { val s: String = \"ab\" ++ Std.intToString(-42); Std.printString(s) }",
    );
}

#[test]
fn simple_call_lowering() {
    let module = compile_and_validate("object H { def f(x: Int): Int = { x + 1 } f(41) }");

    let f = function(&module, "H_f");
    assert_eq!(
        f.body,
        vec![
            Instruction::LocalGet(0),
            Instruction::I32Const(1),
            Instruction::I32Add
        ]
    );

    // The wrapper calls the first user function and drops the 42.
    let main = function(&module, "H_main");
    assert!(main.exported);
    assert!(!main.returns);
    assert_eq!(
        main.body,
        vec![
            Instruction::I32Const(41),
            Instruction::Call(runtime::USER_BASE),
            Instruction::Drop
        ]
    );
}

#[test]
fn logical_operators_short_circuit() {
    let module = compile("object M { true && false }");
    let main = function(&module, "M_main");
    assert_eq!(
        main.body,
        vec![
            Instruction::I32Const(1),
            Instruction::If { result: true },
            Instruction::I32Const(0),
            Instruction::Else,
            Instruction::I32Const(0),
            Instruction::End,
            Instruction::Drop
        ]
    );
}

#[test]
fn string_literals_are_materialized_byte_by_byte() {
    let module = compile_and_validate("object M { \"ab\" ++ \"cd\" }");
    let main = function(&module, "M_main");

    // Two literals of 4 padded bytes each ("ab\0\0", "cd\0\0").
    let store8s = main
        .body
        .iter()
        .filter(|i| matches!(i, Instruction::I32Store8(_)))
        .count();
    assert_eq!(store8s, 8);
    assert!(main
        .body
        .contains(&Instruction::Call(runtime::STRING_CONCAT)));
    // The first byte written is 'a'.
    assert!(main
        .body
        .windows(2)
        .any(|w| w == [Instruction::I32Const(b'a' as i32), Instruction::I32Store8(0)].as_slice()));
}

#[test]
fn constructor_allocation_stores_the_sibling_tag() {
    let module = compile_and_validate(
        "object M {
           abstract class L
           case class N() extends L
           case class C(h: Int, t: L) extends L
           C(1, C(2, N()))
         }",
    );
    let main = function(&module, "M_main");

    // Tag of C is 1 (second constructor of L), stored at word 0.
    assert!(main
        .body
        .windows(2)
        .any(|w| w == [Instruction::I32Const(1), Instruction::I32Store(0)].as_slice()));
    // Tag of N is 0.
    assert!(main
        .body
        .windows(2)
        .any(|w| w == [Instruction::I32Const(0), Instruction::I32Store(0)].as_slice()));
    // Fields land at offsets 4 and 8.
    assert!(main.body.contains(&Instruction::I32Store(4)));
    assert!(main.body.contains(&Instruction::I32Store(8)));
}

#[test]
fn match_failure_traps_after_all_arms() {
    let module = compile_and_validate(LIST);
    let sum = function(&module, "L_sum");
    assert!(sum.body.contains(&Instruction::Unreachable));
    // The trap follows the match-error message, not a bare trap.
    assert!(sum
        .body
        .windows(3)
        .any(|w| w
            == [
                Instruction::Call(runtime::PRINT_STRING),
                Instruction::Drop,
                Instruction::Unreachable
            ]
            .as_slice()));
}

#[test]
fn explicit_error_prints_then_traps() {
    let module = compile_and_validate("object M { error(\"boom\") }");
    let main = function(&module, "M_main");
    assert!(main
        .body
        .windows(3)
        .any(|w| w
            == [
                Instruction::Call(runtime::PRINT_STRING),
                Instruction::Drop,
                Instruction::Unreachable
            ]
            .as_slice()));
}

#[test]
fn only_main_wrappers_are_exported() {
    let module = compile_and_validate(LIST);
    let exported: Vec<_> = module
        .functions
        .iter()
        .filter(|f| f.exported)
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(exported, vec!["L_main"]);
}

#[test]
fn modules_without_initializers_get_no_wrapper() {
    let module = compile_and_validate("object A { def f(): Int = { 1 } } object B { A.f() }");
    assert!(!module.functions.iter().any(|f| f.name == "A_main"));
    assert!(module.functions.iter().any(|f| f.name == "B_main"));
}

#[test]
fn the_heap_global_only_grows() {
    // Every write to the heap pointer is either `old + size` (allocations),
    // the copy cursor of the concat loop, or the pointer returned by
    // readString0; none of them can shrink it.
    let module = compile_and_validate(LIST);
    for function in &module.functions {
        for window in function.body.windows(2) {
            if window[1] == Instruction::GlobalSet(HEAP_GLOBAL) {
                assert!(
                    matches!(
                        window[0],
                        Instruction::I32Add
                            | Instruction::LocalGet(_)
                            | Instruction::Call(runtime::READ_STRING0)
                    ),
                    "suspicious heap update in {}: {:?}",
                    function.name,
                    window
                );
            }
        }
    }
}

#[test]
fn wat_output_matches_the_import_surface() {
    let module = compile(LIST);
    let text = wat::print_module(&module);

    assert!(text.starts_with("(module\n"));
    assert!(text.contains("(import \"system\" \"mem\" (memory 100))"));
    assert!(text.contains("(import \"system\" \"printInt\" (func $printInt (param i32) (result i32)))"));
    assert!(text.contains("(import \"system\" \"readString0\" (func $readString0 (param i32) (result i32)))"));
    assert!(text.contains("(global $hp (mut i32) (i32.const 0))"));
    assert!(text.contains("(func $String_concat (param i32 i32) (result i32)"));
    assert!(text.contains("(func $L_main (export \"L_main\")"));
    assert!(text.contains("call $L_sum"));
    assert!(text.contains("unreachable"));
}

#[test]
fn compilation_is_deterministic() {
    let first = wat::print_module(&compile(LIST));
    let second = wat::print_module(&compile(LIST));
    assert_eq!(first, second);

    let first_bytes = binary::encode_module(&compile(LIST));
    let second_bytes = binary::encode_module(&compile(LIST));
    assert_eq!(first_bytes, second_bytes);
}

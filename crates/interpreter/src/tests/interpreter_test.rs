use std::io::Cursor;

use analyzer::symbol::SymbolTable;
use ast::symbolic::Program;

use crate::{Interpreter, RuntimeError};

fn analyze(source: &str) -> (Program, SymbolTable) {
    let tokens = parser::lexer::tokenize(&[(0, source)]);
    let mut p = parser::parser::Parser::new(tokens.into_iter(), vec![source.to_string()])
        .expect("LL(1)");
    let program = p.parse_program().expect("parse failed");
    analyzer::analyze(&program).expect("name analysis failed")
}

/// Run a program with the given stdin, returning its stdout.
fn run_with_input(source: &str, input: &str) -> Result<String, RuntimeError> {
    let (program, table) = analyze(source);
    let mut output = Vec::new();
    let result = Interpreter::new(&program, &table, Cursor::new(input.to_string()), &mut output)
        .run_program();
    result.map(|()| String::from_utf8(output).expect("programs print UTF-8"))
}

fn run(source: &str) -> Result<String, RuntimeError> {
    run_with_input(source, "")
}

#[test]
fn evaluates_the_top_level_expression() {
    let out = run("object H { def f(x: Int): Int = { x + 1 } Std.printInt(f(41)) }").unwrap();
    assert_eq!(out, "42\n");
}

#[test]
fn modules_run_in_program_order() {
    let out = run("object A { Std.printInt(1) } object B { Std.printInt(2) }").unwrap();
    assert_eq!(out, "1\n2\n");
}

#[test]
fn recursion_over_a_list() {
    let source = "
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

  Std.printInt(sum(Cons(1, Cons(2, Cons(39, Nil())))))
}
";
    assert_eq!(run(source).unwrap(), "42\n");
}

#[test]
fn short_circuit_skips_the_right_operand() {
    // The division by zero on the right must never run.
    let out = run("object M { if (false && 1 / 0 == 0) { Std.printInt(1) } else { Std.printInt(2) } }")
        .unwrap();
    assert_eq!(out, "2\n");
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let err = run("object M { Std.printInt(1 / 0) }").unwrap_err();
    assert_eq!(err.message, "Division by zero");
}

#[test]
fn explicit_error_aborts_with_its_message() {
    let err = run("object M { Std.printInt(1); error(\"boom\" ++ \"!\") }").unwrap_err();
    assert_eq!(err.message, "boom!");
}

#[test]
fn match_failure_is_a_runtime_error() {
    let source = "
object M {
  abstract class O
  case class A() extends O
  case class B() extends O
  def f(o: O): Int = { o match { case A() => 1 } }
  Std.printInt(f(B()))
}
";
    let err = run(source).unwrap_err();
    assert_eq!(err.message, "Match error!");
}

#[test]
fn patterns_bind_fields_and_respect_arm_order() {
    let source = "
object M {
  abstract class L
  case class Nil() extends L
  case class Cons(h: Int, t: L) extends L

  def describe(l: L): String = {
    l match {
      case Cons(1, _) => \"one\"
      case Cons(h, _) => Std.intToString(h)
      case _ => \"empty\"
    }
  }

  Std.printString(describe(Cons(1, Nil())));
  Std.printString(describe(Cons(7, Nil())));
  Std.printString(describe(Nil()))
}
";
    assert_eq!(run(source).unwrap(), "one\n7\nempty\n");
}

#[test]
fn string_equality_is_by_reference() {
    let source = "
object M {
  def tell(b: Boolean): Unit = {
    if (b) { Std.printString(\"eq\") } else { Std.printString(\"ne\") }
  }
  tell(\"a\" == \"a\");
  val s: String = \"a\";
  tell(s == s)
}
";
    assert_eq!(run(source).unwrap(), "ne\neq\n");
}

#[test]
fn data_equality_is_by_reference() {
    let source = "
object M {
  abstract class O
  case class A() extends O
  def tell(b: Boolean): Unit = {
    if (b) { Std.printString(\"eq\") } else { Std.printString(\"ne\") }
  }
  tell(A() == A());
  val a: O = A();
  tell(a == a)
}
";
    assert_eq!(run(source).unwrap(), "ne\neq\n");
}

#[test]
fn reads_integers_and_strings() {
    let out = run_with_input(
        "object M { Std.printInt(Std.readInt() + 1); Std.printString(\"hi \" ++ Std.readString()) }",
        "41\nworld\n",
    )
    .unwrap();
    assert_eq!(out, "42\nhi world\n");
}

#[test]
fn invalid_read_int_input_is_a_runtime_error() {
    let err = run_with_input("object M { Std.printInt(Std.readInt()) }", "nope\n").unwrap_err();
    assert_eq!(err.message, "Invalid input to readInt");
}

#[test]
fn int_to_string_handles_signs() {
    let out = run(
        "object M { Std.printString(Std.intToString(-42) ++ \"/\" ++ Std.intToString(0)) }",
    )
    .unwrap();
    assert_eq!(out, "-42/0\n");
}

use ast::nominal::{Def, Expr, Pattern, Program};
use ast::op::{BinOp, UnaryOp};
use ast::printer::print_program;
use ast::Literal;

use crate::lexer::tokenize;
use crate::ll1;
use crate::parser::Parser;

fn parse(source: &str) -> Program {
    let tokens = tokenize(&[(0, source)]);
    let mut parser = Parser::new(tokens.into_iter(), vec![source.to_string()])
        .expect("grammar should be LL(1)");
    parser.parse_program().expect("parse failed")
}

fn parse_initializer(expr_source: &str) -> Expr {
    let source = format!("object T {{ {} }}", expr_source);
    let program = parse(&source);
    program.modules[0]
        .node
        .initializer
        .clone()
        .expect("expected a module initializer")
        .node
}

#[test]
fn grammar_is_ll1() {
    assert!(ll1::validate().is_ok());
}

#[test]
fn parses_function_definition() {
    let program = parse("object H { def f(x: Int): Int = { x + 1 } }");
    assert_eq!(program.modules.len(), 1);
    let module = &program.modules[0].node;
    assert_eq!(module.name, "H");
    match &module.defs[0].node {
        Def::Fun(f) => {
            assert_eq!(f.name, "f");
            assert_eq!(f.params.len(), 1);
            assert_eq!(f.params[0].node.name, "x");
            match &f.body.node {
                Expr::BinaryOp { op, .. } => assert_eq!(*op, BinOp::Plus),
                other => panic!("expected BinaryOp, got {:?}", other),
            }
        }
        other => panic!("expected FunDef, got {:?}", other),
    }
}

#[test]
fn parses_class_hierarchy() {
    let program =
        parse("object M { abstract class L case class Nil() extends L case class Cons(h: Int, t: L) extends L }");
    let defs = &program.modules[0].node.defs;
    assert!(matches!(defs[0].node, Def::AbstractClass(_)));
    match &defs[2].node {
        Def::CaseClass(c) => {
            assert_eq!(c.name, "Cons");
            assert_eq!(c.fields.len(), 2);
            assert_eq!(c.parent, "L");
        }
        other => panic!("expected CaseClassDef, got {:?}", other),
    }
}

#[test]
fn precedence_of_binary_operators() {
    match parse_initializer("1 + 2 * 3") {
        Expr::BinaryOp { op, rhs, .. } => {
            assert_eq!(op, BinOp::Plus);
            match rhs.node {
                Expr::BinaryOp { op, .. } => assert_eq!(op, BinOp::Times),
                other => panic!("expected Times on the right, got {:?}", other),
            }
        }
        other => panic!("expected BinaryOp, got {:?}", other),
    }
}

#[test]
fn binary_operators_are_left_associative() {
    match parse_initializer("10 - 3 - 2") {
        Expr::BinaryOp { op, lhs, .. } => {
            assert_eq!(op, BinOp::Minus);
            assert!(matches!(
                lhs.node,
                Expr::BinaryOp {
                    op: BinOp::Minus,
                    ..
                }
            ));
        }
        other => panic!("expected BinaryOp, got {:?}", other),
    }
}

#[test]
fn unary_binds_tighter_than_binary() {
    match parse_initializer("-x + y") {
        Expr::BinaryOp { op, lhs, .. } => {
            assert_eq!(op, BinOp::Plus);
            assert!(matches!(
                lhs.node,
                Expr::UnaryOp {
                    op: UnaryOp::Neg,
                    ..
                }
            ));
        }
        other => panic!("expected BinaryOp, got {:?}", other),
    }
}

#[test]
fn sequence_is_right_associative() {
    match parse_initializer("1; 2; 3") {
        Expr::Sequence(_, rest) => {
            assert!(matches!(rest.node, Expr::Sequence(..)));
        }
        other => panic!("expected Sequence, got {:?}", other),
    }
}

#[test]
fn let_binding_scopes_over_the_rest_of_the_block() {
    match parse_initializer("val x: Int = 1; x + 1") {
        Expr::Let { param, body, .. } => {
            assert_eq!(param.name, "x");
            assert!(matches!(body.node, Expr::BinaryOp { .. }));
        }
        other => panic!("expected Let, got {:?}", other),
    }
}

#[test]
fn unit_literal_vs_grouping() {
    assert!(matches!(
        parse_initializer("()"),
        Expr::Lit(Literal::Unit)
    ));
    assert!(matches!(
        parse_initializer("(1)"),
        Expr::Lit(Literal::Int(1))
    ));
}

#[test]
fn variables_and_calls() {
    let source = "object M { def f(x: Int): Int = { x } f(1); Std.printInt(2); g() }";
    let program = parse(source);
    let mut expr = program.modules[0].node.initializer.clone().unwrap().node;
    // f(1)
    if let Expr::Sequence(first, rest) = expr {
        match first.node {
            Expr::Call { callee, args } => {
                assert_eq!(callee.module, None);
                assert_eq!(callee.name, "f");
                assert_eq!(args.len(), 1);
            }
            other => panic!("expected Call, got {:?}", other),
        }
        expr = rest.node;
    } else {
        panic!("expected Sequence");
    }
    // Std.printInt(2)
    if let Expr::Sequence(first, rest) = expr {
        match first.node {
            Expr::Call { callee, .. } => {
                assert_eq!(callee.module.as_deref(), Some("Std"));
                assert_eq!(callee.name, "printInt");
            }
            other => panic!("expected qualified Call, got {:?}", other),
        }
        expr = rest.node;
    } else {
        panic!("expected Sequence");
    }
    // g()
    assert!(matches!(expr, Expr::Call { .. }));
}

#[test]
fn match_chains_left_fold() {
    let expr = parse_initializer("x match { case _ => 1 } match { case _ => 2 }");
    match expr {
        Expr::Match { scrutinee, cases } => {
            assert_eq!(cases.len(), 1);
            assert!(matches!(scrutinee.node, Expr::Match { .. }));
        }
        other => panic!("expected Match, got {:?}", other),
    }
}

#[test]
fn patterns() {
    let expr = parse_initializer(
        "l match { case Nil() => 0 case Cons(h, Cons(_, t)) => h case x => 1 }",
    );
    match expr {
        Expr::Match { cases, .. } => {
            assert_eq!(cases.len(), 3);
            match &cases[0].pattern.node {
                Pattern::CaseClass { constructor, args } => {
                    assert_eq!(constructor.name, "Nil");
                    assert!(args.is_empty());
                }
                other => panic!("expected CaseClass pattern, got {:?}", other),
            }
            match &cases[1].pattern.node {
                Pattern::CaseClass { args, .. } => {
                    assert!(matches!(args[0].node, Pattern::Id(_)));
                    assert!(matches!(args[1].node, Pattern::CaseClass { .. }));
                }
                other => panic!("expected nested CaseClass pattern, got {:?}", other),
            }
            // A bare identifier always binds, never matches a constructor.
            assert!(matches!(cases[2].pattern.node, Pattern::Id(_)));
        }
        other => panic!("expected Match, got {:?}", other),
    }
}

#[test]
fn error_expression() {
    assert!(matches!(
        parse_initializer("error(\"boom\")"),
        Expr::Error(_)
    ));
}

#[test]
fn reports_unexpected_token() {
    let source = "object M { def }";
    let tokens = tokenize(&[(0, source)]);
    let mut parser =
        Parser::new(tokens.into_iter(), vec![source.to_string()]).expect("LL(1)");
    let err = parser.parse_program().unwrap_err();
    assert!(err.message.contains("expected an identifier"), "{}", err.message);
}

#[test]
fn reports_unexpected_eof() {
    let source = "object M {";
    let tokens = tokenize(&[(0, source)]);
    let mut parser =
        Parser::new(tokens.into_iter(), vec![source.to_string()]).expect("LL(1)");
    let err = parser.parse_program().unwrap_err();
    assert!(err.message.contains("end of input"), "{}", err.message);
}

#[test]
fn lex_errors_become_parse_failures() {
    let source = "object M { /* unterminated";
    let tokens = tokenize(&[(0, source)]);
    let mut parser =
        Parser::new(tokens.into_iter(), vec![source.to_string()]).expect("LL(1)");
    let err = parser.parse_program().unwrap_err();
    assert_eq!(err.message, "Unclosed comment");
}

#[test]
fn print_parse_round_trip_is_stable() {
    let source = r#"
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

  val x: Int = 3;
  if (!(x == 0) && 10 / x < 4) {
    Std.printString("small " ++ Std.intToString(x))
  } else {
    Std.printInt(sum(Cons(1, Cons(2, Nil()))))
  }
}
"#;
    let once = print_program(&parse(source));
    let twice = print_program(&parse(&once));
    assert_eq!(once, twice);
}

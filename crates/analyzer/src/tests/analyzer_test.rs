use std::collections::HashSet;

use ast::diagnostic::Diagnostic;
use ast::nominal;
use ast::symbolic::{Def, Expr, Identifier, Pattern, Program, Type};

use crate::symbol::SymbolTable;

fn parse(source: &str) -> nominal::Program {
    let tokens = parser::lexer::tokenize(&[(0, source)]);
    let mut p = parser::parser::Parser::new(tokens.into_iter(), vec![source.to_string()])
        .expect("LL(1)");
    p.parse_program().expect("parse failed")
}

fn analyze(source: &str) -> Result<(Program, SymbolTable), Vec<Diagnostic>> {
    crate::analyze(&parse(source))
}

fn analyze_ok(source: &str) -> (Program, SymbolTable) {
    analyze(source).expect("analysis should succeed")
}

fn errors_of(source: &str) -> Vec<String> {
    analyze(source)
        .expect_err("analysis should fail")
        .into_iter()
        .map(|d| d.message)
        .collect()
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

  sum(Cons(1, Cons(2, Nil())))
}
";

#[test]
fn constructor_tags_follow_declaration_order() {
    let (_, table) = analyze_ok(LIST);
    let module = table.module("L").unwrap();
    let nil = table.callable_in(module, "Nil").unwrap();
    let cons = table.callable_in(module, "Cons").unwrap();
    let list = table.type_in(module, "List").unwrap();

    assert_eq!(table.constructor(nil).unwrap().index, 0);
    assert_eq!(table.constructor(cons).unwrap().index, 1);
    assert_eq!(table.constructor(cons).unwrap().parent, list);
    assert_eq!(table.constructors_of(list), &[nil, cons]);
    assert_eq!(
        table.constructor(cons).unwrap().arg_types,
        vec![Type::Int, Type::Class(list)]
    );
}

#[test]
fn function_signatures_are_recorded() {
    let (_, table) = analyze_ok(LIST);
    let module = table.module("L").unwrap();
    let sum = table.callable_in(module, "sum").unwrap();
    let list = table.type_in(module, "List").unwrap();
    let sig = table.function(sum).unwrap();
    assert_eq!(sig.arg_types, vec![Type::Class(list)]);
    assert_eq!(sig.ret_type, Type::Int);
    assert_eq!(sig.owner, module);
}

#[test]
fn std_is_predeclared() {
    let (_, table) = analyze_ok("object M { Std.printInt(1) }");
    let sig = table.function(table.std.print_int).unwrap();
    assert_eq!(sig.arg_types, vec![Type::Int]);
    assert_eq!(sig.ret_type, Type::Unit);
}

#[test]
fn duplicate_module_name_is_fatal() {
    let errors = errors_of("object M { } object M { }");
    assert!(errors[0].contains("Duplicate module name"), "{:?}", errors);
}

#[test]
fn parent_must_be_an_abstract_class() {
    let errors = errors_of(
        "object M { abstract class A case class B() extends A case class C() extends B }",
    );
    assert!(
        errors[0].contains("must extend an abstract class"),
        "{:?}",
        errors
    );
}

#[test]
fn parent_must_exist() {
    let errors = errors_of("object M { case class B() extends Nope }");
    assert!(errors[0].contains("Unknown parent class"), "{:?}", errors);
}

#[test]
fn duplicate_parameter_names_are_rejected() {
    let errors = errors_of("object M { def f(x: Int, x: Int): Int = { x } }");
    assert!(errors[0].contains("Duplicate parameter 'x'"), "{:?}", errors);
}

#[test]
fn unknown_identifier_is_reported() {
    let errors = errors_of("object M { y }");
    assert!(errors[0].contains("Unknown identifier 'y'"), "{:?}", errors);
}

#[test]
fn errors_are_collected_not_first_fail() {
    let errors = errors_of("object M { def f(x: Nope1): Nope2 = { x } }");
    assert_eq!(errors.len(), 2, "{:?}", errors);
}

#[test]
fn bare_names_fall_back_to_nullary_calls() {
    let (program, table) = analyze_ok("object M { def f(): Int = { 1 } f }");
    let module = table.module("M").unwrap();
    let f = table.callable_in(module, "f").unwrap();
    let init = program.modules[0].node.initializer.as_ref().unwrap();
    match &init.node {
        Expr::Call { callee, args } => {
            assert_eq!(*callee, f);
            assert!(args.is_empty());
        }
        other => panic!("expected nullary Call, got {:?}", other),
    }
}

#[test]
fn let_shadows_outer_binding() {
    let (program, _) = analyze_ok("object M { val x: Int = 1; val x: Int = x; x }");
    let init = program.modules[0].node.initializer.as_ref().unwrap();
    let Expr::Let {
        param: outer_param,
        body,
        ..
    } = &init.node
    else {
        panic!("expected outer Let");
    };
    let Expr::Let {
        param: inner_param,
        value,
        body: inner_body,
    } = &body.node
    else {
        panic!("expected inner Let");
    };

    // The inner initializer still sees the outer `x`.
    assert_eq!(value.node, Expr::Variable(outer_param.name));
    // The body sees the shadowing one.
    assert_eq!(inner_body.node, Expr::Variable(inner_param.name));
    assert_ne!(outer_param.name, inner_param.name);
}

#[test]
fn pattern_binders_are_branch_local() {
    let source = "
object M {
  abstract class O
  case class A(v: Int) extends O
  case class B(v: Int) extends O

  def pick(o: O): Int = {
    o match {
      case A(x) => x
      case B(x) => x
    }
  }
}
";
    let (program, _) = analyze_ok(source);
    let Def::Fun(f) = &program.modules[0].node.defs[3].node else {
        panic!("expected pick");
    };
    let Expr::Match { cases, .. } = &f.body.node else {
        panic!("expected match body");
    };
    let binder = |case: &ast::symbolic::MatchCase| -> Identifier {
        let Pattern::CaseClass { args, .. } = &case.pattern.node else {
            panic!("expected constructor pattern");
        };
        let Pattern::Id(id) = &args[0].node else {
            panic!("expected binder");
        };
        *id
    };
    assert_ne!(binder(&cases[0]), binder(&cases[1]));
}

#[test]
fn duplicate_binders_in_one_pattern_are_rejected() {
    let errors = errors_of(
        "object M {
           abstract class P
           case class Pair(a: Int, b: Int) extends P
           def f(p: P): Int = { p match { case Pair(x, x) => x } }
         }",
    );
    assert!(
        errors[0].contains("Multiple occurrences of 'x'"),
        "{:?}",
        errors
    );
}

#[test]
fn qualified_calls_resolve_across_modules() {
    let source = "
object A { def one(): Int = { 1 } }
object B { Std.printInt(A.one()) }
";
    let (program, table) = analyze_ok(source);
    let a = table.module("A").unwrap();
    let one = table.callable_in(a, "one").unwrap();
    let init = program.modules[1].node.initializer.as_ref().unwrap();
    let Expr::Call { callee, args } = &init.node else {
        panic!("expected call");
    };
    assert_eq!(*callee, table.std.print_int);
    let Expr::Call { callee: inner, .. } = &args[0].node else {
        panic!("expected inner call");
    };
    assert_eq!(*inner, one);
}

#[test]
fn every_declaration_gets_a_unique_identifier() {
    let (program, _) = analyze_ok(LIST);
    let mut seen = HashSet::new();
    let mut declare = |id: Identifier| {
        assert!(seen.insert(id), "identifier {} issued twice", id);
    };
    for module in &program.modules {
        declare(module.node.name);
        for def in &module.node.defs {
            match &def.node {
                Def::AbstractClass(d) => declare(d.name),
                Def::CaseClass(d) => declare(d.name),
                Def::Fun(d) => {
                    declare(d.name);
                    for param in &d.params {
                        declare(param.node.name);
                    }
                    collect_binders(&d.body.node, &mut declare);
                }
            }
        }
        if let Some(init) = &module.node.initializer {
            collect_binders(&init.node, &mut declare);
        }
    }
}

fn collect_binders(expr: &Expr, declare: &mut impl FnMut(Identifier)) {
    match expr {
        Expr::Variable(_) | Expr::Lit(_) => {}
        Expr::BinaryOp { lhs, rhs, .. } => {
            collect_binders(&lhs.node, declare);
            collect_binders(&rhs.node, declare);
        }
        Expr::UnaryOp { operand, .. } => collect_binders(&operand.node, declare),
        Expr::Call { args, .. } => {
            for arg in args {
                collect_binders(&arg.node, declare);
            }
        }
        Expr::Sequence(a, b) => {
            collect_binders(&a.node, declare);
            collect_binders(&b.node, declare);
        }
        Expr::Let { param, value, body } => {
            declare(param.name);
            collect_binders(&value.node, declare);
            collect_binders(&body.node, declare);
        }
        Expr::Ite {
            cond,
            then_branch,
            else_branch,
        } => {
            collect_binders(&cond.node, declare);
            collect_binders(&then_branch.node, declare);
            collect_binders(&else_branch.node, declare);
        }
        Expr::Match { scrutinee, cases } => {
            collect_binders(&scrutinee.node, declare);
            for case in cases {
                collect_pattern_binders(&case.pattern.node, declare);
                collect_binders(&case.expr.node, declare);
            }
        }
        Expr::Error(message) => collect_binders(&message.node, declare),
    }
}

fn collect_pattern_binders(pattern: &Pattern, declare: &mut impl FnMut(Identifier)) {
    match pattern {
        Pattern::Wildcard | Pattern::Lit(_) => {}
        Pattern::Id(id) => declare(*id),
        Pattern::CaseClass { args, .. } => {
            for arg in args {
                collect_pattern_binders(&arg.node, declare);
            }
        }
    }
}

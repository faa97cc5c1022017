mod compiler_tests;

use analyzer::symbol::SymbolTable;
use ast::symbolic::Program;

/// Parse and resolve an Amy source, panicking on any front-end error.
pub(crate) fn analyze(source: &str) -> (Program, SymbolTable) {
    let tokens = parser::lexer::tokenize(&[(0, source)]);
    let mut p = parser::parser::Parser::new(tokens.into_iter(), vec![source.to_string()])
        .expect("LL(1)");
    let program = p.parse_program().expect("parse failed");
    analyzer::analyze(&program).expect("name analysis failed")
}

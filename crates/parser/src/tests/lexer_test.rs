use crate::lexer::{Token, TokenStream};

fn lex(source: &str) -> Vec<Token> {
    TokenStream::new(0, source).map(|(t, _)| t).collect()
}

#[test]
fn keywords_win_over_identifiers() {
    assert_eq!(
        lex("abstract class Shape"),
        vec![Token::Abstract, Token::Class, Token::Name, Token::Eof]
    );
    // A keyword prefix does not make an identifier a keyword.
    assert_eq!(lex("abstractness"), vec![Token::Name, Token::Eof]);
    assert_eq!(lex("matches"), vec![Token::Name, Token::Eof]);
}

#[test]
fn primitive_types_and_bools_are_reserved() {
    assert_eq!(
        lex("Int String Boolean Unit true false"),
        vec![
            Token::IntType,
            Token::StringType,
            Token::BooleanType,
            Token::UnitType,
            Token::True,
            Token::False,
            Token::Eof
        ]
    );
    assert_eq!(lex("Integer"), vec![Token::Name, Token::Eof]);
}

#[test]
fn longest_match_on_operators() {
    assert_eq!(
        lex("a <= b < c"),
        vec![
            Token::Name,
            Token::Le,
            Token::Name,
            Token::Lt,
            Token::Name,
            Token::Eof
        ]
    );
    assert_eq!(
        lex("x == y = z"),
        vec![
            Token::Name,
            Token::EqEq,
            Token::Name,
            Token::Assign,
            Token::Name,
            Token::Eof
        ]
    );
    assert_eq!(
        lex("=> ="),
        vec![Token::FatArrow, Token::Assign, Token::Eof]
    );
    assert_eq!(
        lex("++ + || | ?"),
        vec![
            Token::Concat,
            Token::Plus,
            Token::Or,
            Token::Error("Invalid character"),
            Token::Error("Invalid character"),
            Token::Eof
        ]
    );
}

#[test]
fn integer_literals_check_the_i32_range() {
    assert_eq!(lex("2147483647"), vec![Token::Number, Token::Eof]);
    assert_eq!(
        lex("2147483648"),
        vec![Token::Error("Invalid integer literal"), Token::Eof]
    );
}

#[test]
fn string_literals() {
    assert_eq!(lex("\"hello world\""), vec![Token::Str, Token::Eof]);
    assert_eq!(lex("\"\""), vec![Token::Str, Token::Eof]);
    // No closing quote on the same line.
    let tokens = lex("\"oops");
    assert_eq!(tokens[0], Token::Error("Unterminated string literal"));
}

#[test]
fn comments_are_dropped() {
    assert_eq!(
        lex("1 // comment\n2"),
        vec![Token::Number, Token::Number, Token::Eof]
    );
    assert_eq!(lex("/* block */ 3"), vec![Token::Number, Token::Eof]);
}

#[test]
fn block_comments_do_not_nest() {
    // The first closing marker terminates the comment.
    assert_eq!(
        lex("/* outer /* inner */ rest"),
        vec![Token::Name, Token::Eof]
    );
}

#[test]
fn unclosed_block_comment_is_an_error() {
    let tokens = lex("val /* unterminated");
    assert_eq!(tokens[0], Token::Val);
    assert_eq!(tokens[1], Token::Error("Unclosed comment"));
}

#[test]
fn positions_restart_per_file() {
    let first: Vec<_> = TokenStream::new(0, "a").without_eof().collect();
    let second: Vec<_> = TokenStream::new(1, "b").collect();
    assert_eq!(first[0].1.file, 0);
    assert_eq!(first[0].1.start, 0);
    assert_eq!(second[0].1.file, 1);
    assert_eq!(second[0].1.start, 0);
}

#[test]
fn exactly_one_eof() {
    let eof_count = lex("object A { }")
        .into_iter()
        .filter(|t| *t == Token::Eof)
        .count();
    assert_eq!(eof_count, 1);
}

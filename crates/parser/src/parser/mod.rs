mod binop;
mod expr;
mod pattern;

use std::iter::Peekable;

use ast::diagnostic::Diagnostic;
use ast::nominal::*;
use ast::{Literal, Span, Spanned};

use crate::lexer::{SpannedToken, Token};
use crate::ll1;

#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn into_fatal(self) -> Diagnostic {
        Diagnostic::fatal(self.message, self.span)
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ParseError at {}..{}: {}",
            self.span.start, self.span.end, self.message
        )
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<I: Iterator<Item = SpannedToken>> {
    tokens: Peekable<I>,
    current_span: Span,
    /// Source text of every input file, indexed by file id, for slicing
    /// identifiers and literals out of token spans.
    sources: Vec<String>,
}

impl<I: Iterator<Item = SpannedToken>> Parser<I> {
    /// Build a parser over a token stream. The grammar decision tables are
    /// validated for LL(1)-ness here, before any token is consumed.
    pub fn new(tokens: I, sources: Vec<String>) -> Result<Self, Diagnostic> {
        ll1::validate().map_err(|message| Diagnostic::fatal(message, Span::new(0, 0, 0)))?;
        Ok(Self {
            tokens: tokens.peekable(),
            current_span: Span::new(0, 0, 0),
            sources,
        })
    }

    /// Peek at the next token, returning a clone (avoids borrow issues).
    /// Lexical error tokens become parse errors carrying the lexer message.
    fn peek(&mut self) -> ParseResult<Token> {
        let span = self.peek_span();
        match self.peek_token() {
            Token::Error(message) => Err(ParseError {
                message: message.to_string(),
                span,
            }),
            token => Ok(token),
        }
    }

    fn peek_token(&mut self) -> Token {
        self.tokens
            .peek()
            .map(|(t, _)| t.clone())
            .unwrap_or(Token::Eof)
    }

    /// Peek at the span of the next token.
    fn peek_span(&mut self) -> Span {
        self.tokens
            .peek()
            .map(|(_, s)| *s)
            .unwrap_or(self.current_span)
    }

    /// Advances to the next token, updating the current span.
    fn advance(&mut self) -> Option<Token> {
        if let Some((token, span)) = self.tokens.next() {
            self.current_span = span;
            Some(token)
        } else {
            None
        }
    }

    /// Returns the source text for a span.
    fn text(&self, span: &Span) -> &str {
        &self.sources[span.file][span.start..span.end]
    }

    /// Returns the source text of the last consumed token.
    fn last_text(&self) -> &str {
        self.text(&self.current_span)
    }

    /// Consumes the next token if it matches `expected`, else returns an
    /// error naming both.
    fn expect(&mut self, expected: Token) -> ParseResult<Span> {
        let tok = self.peek()?;
        let span = self.peek_span();
        if tok == expected {
            self.advance();
            Ok(self.current_span)
        } else {
            Err(self.unexpected(&format!("{:?}", expected), tok, span))
        }
    }

    /// Consume an identifier and return its text.
    fn expect_name(&mut self) -> ParseResult<String> {
        let tok = self.peek()?;
        let span = self.peek_span();
        if tok == Token::Name {
            self.advance();
            Ok(self.last_text().to_string())
        } else {
            Err(self.unexpected("an identifier", tok, span))
        }
    }

    /// Checks if the next token matches, consuming it if so.
    fn eat(&mut self, expected: Token) -> ParseResult<bool> {
        if self.peek()? == expected {
            self.advance();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn unexpected(&self, expected: &str, found: Token, span: Span) -> ParseError {
        let found = match found {
            Token::Eof => "end of input".to_string(),
            other => format!("{:?}", other),
        };
        ParseError {
            message: format!("expected {}, found {}", expected, found),
            span,
        }
    }

    // --- Top-level ---

    /// Program ::= Module+ EOF
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut modules = Vec::new();
        loop {
            match self.peek()? {
                Token::Object => modules.push(self.parse_module()?),
                Token::Eof if !modules.is_empty() => break,
                other => {
                    let span = self.peek_span();
                    return Err(self.unexpected("'object'", other, span));
                }
            }
        }
        Ok(Program { modules })
    }

    /// Module ::= 'object' Id '{' Def* Expr? '}'
    fn parse_module(&mut self) -> ParseResult<Spanned<ModuleDef>> {
        let start = self.expect(Token::Object)?;
        let name = self.expect_name()?;
        self.expect(Token::LBrace)?;

        let mut defs = Vec::new();
        loop {
            match self.peek()? {
                Token::Def | Token::Abstract | Token::Case => defs.push(self.parse_def()?),
                _ => break,
            }
        }

        let initializer = if self.peek()? == Token::RBrace {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let end = self.expect(Token::RBrace)?;

        Ok(Spanned::new(
            ModuleDef {
                name,
                defs,
                initializer,
            },
            start.to(end),
        ))
    }

    /// Def ::= FunDef | AbstractDef | CaseDef
    fn parse_def(&mut self) -> ParseResult<Spanned<Def>> {
        match self.peek()? {
            Token::Def => self.parse_fun_def(),
            Token::Abstract => self.parse_abstract_class_def(),
            Token::Case => self.parse_case_class_def(),
            other => {
                let span = self.peek_span();
                Err(self.unexpected("'def', 'abstract' or 'case'", other, span))
            }
        }
    }

    /// FunDef ::= 'def' Id '(' Params ')' ':' Type '=' '{' Expr '}'
    fn parse_fun_def(&mut self) -> ParseResult<Spanned<Def>> {
        let start = self.expect(Token::Def)?;
        let name = self.expect_name()?;
        self.expect(Token::LParen)?;
        let params = self.parse_params()?;
        self.expect(Token::RParen)?;
        self.expect(Token::Colon)?;
        let ret_type = self.parse_type()?;
        self.expect(Token::Assign)?;
        self.expect(Token::LBrace)?;
        let body = self.parse_expr()?;
        let end = self.expect(Token::RBrace)?;

        Ok(Spanned::new(
            Def::Fun(FunDef {
                name,
                params,
                ret_type,
                body,
            }),
            start.to(end),
        ))
    }

    /// AbstractDef ::= 'abstract' 'class' Id
    fn parse_abstract_class_def(&mut self) -> ParseResult<Spanned<Def>> {
        let start = self.expect(Token::Abstract)?;
        self.expect(Token::Class)?;
        let name = self.expect_name()?;
        let end = self.current_span;

        Ok(Spanned::new(
            Def::AbstractClass(AbstractClassDef { name }),
            start.to(end),
        ))
    }

    /// CaseDef ::= 'case' 'class' Id '(' Params ')' 'extends' Id
    ///
    /// Field names are parsed but only the field types are kept: case-class
    /// fields are positional.
    fn parse_case_class_def(&mut self) -> ParseResult<Spanned<Def>> {
        let start = self.expect(Token::Case)?;
        self.expect(Token::Class)?;
        let name = self.expect_name()?;
        self.expect(Token::LParen)?;
        let params = self.parse_params()?;
        self.expect(Token::RParen)?;
        self.expect(Token::Extends)?;
        let parent = self.expect_name()?;
        let end = self.current_span;

        let fields = params.into_iter().map(|p| p.node.tpe).collect();
        Ok(Spanned::new(
            Def::CaseClass(CaseClassDef {
                name,
                fields,
                parent,
            }),
            start.to(end),
        ))
    }

    /// Params ::= (Param (',' Param)*)?
    fn parse_params(&mut self) -> ParseResult<Vec<Spanned<ParamDef>>> {
        let mut params = Vec::new();
        if self.peek()? != Token::Name {
            return Ok(params);
        }
        loop {
            params.push(self.parse_param()?);
            if !self.eat(Token::Comma)? {
                break;
            }
        }
        Ok(params)
    }

    /// Param ::= Id ':' Type
    pub(crate) fn parse_param(&mut self) -> ParseResult<Spanned<ParamDef>> {
        let start = self.peek_span();
        let name = self.expect_name()?;
        self.expect(Token::Colon)?;
        let tpe = self.parse_type()?;
        let span = start.to(self.current_span);
        Ok(Spanned::new(ParamDef { name, tpe }, span))
    }

    /// Type ::= 'Int' | 'String' | 'Boolean' | 'Unit' | Id ('.' Id)?
    fn parse_type(&mut self) -> ParseResult<Spanned<TypeTree>> {
        let span = self.peek_span();
        match self.peek()? {
            Token::IntType => {
                self.advance();
                Ok(Spanned::new(TypeTree::Int, span))
            }
            Token::StringType => {
                self.advance();
                Ok(Spanned::new(TypeTree::String, span))
            }
            Token::BooleanType => {
                self.advance();
                Ok(Spanned::new(TypeTree::Boolean, span))
            }
            Token::UnitType => {
                self.advance();
                Ok(Spanned::new(TypeTree::Unit, span))
            }
            Token::Name => {
                let (qname, span) = self.parse_qualified_name()?;
                Ok(Spanned::new(TypeTree::Class(qname), span))
            }
            other => Err(self.unexpected("a type", other, span)),
        }
    }

    /// Id ('.' Id)?
    pub(crate) fn parse_qualified_name(&mut self) -> ParseResult<(QualifiedName, Span)> {
        let start = self.peek_span();
        let first = self.expect_name()?;
        if self.eat(Token::Dot)? {
            let member = self.expect_name()?;
            let span = start.to(self.current_span);
            Ok((QualifiedName::qualified(first, member), span))
        } else {
            Ok((QualifiedName::plain(first), start.to(self.current_span)))
        }
    }
}

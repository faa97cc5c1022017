use super::*;

impl<I: Iterator<Item = SpannedToken>> Parser<I> {
    /// Case ::= 'case' Pattern '=>' Expr
    pub(crate) fn parse_case(&mut self) -> ParseResult<MatchCase> {
        self.expect(Token::Case)?;
        let pattern = self.parse_pattern()?;
        self.expect(Token::FatArrow)?;
        let expr = self.parse_expr()?;
        Ok(MatchCase { pattern, expr })
    }

    /// Pattern ::= Literal | '(' ')' | '_' | Id ('.' Id)? ('(' Patterns ')')?
    fn parse_pattern(&mut self) -> ParseResult<Spanned<Pattern>> {
        let start = self.peek_span();
        match self.peek()? {
            Token::Number => {
                self.advance();
                let value: i32 = self
                    .last_text()
                    .parse()
                    .expect("integer literal validated by the lexer");
                Ok(Spanned::new(Pattern::Lit(Literal::Int(value)), start))
            }
            Token::True => {
                self.advance();
                Ok(Spanned::new(Pattern::Lit(Literal::Bool(true)), start))
            }
            Token::False => {
                self.advance();
                Ok(Spanned::new(Pattern::Lit(Literal::Bool(false)), start))
            }
            Token::Str => {
                self.advance();
                let text = self.last_text();
                let body = text[1..text.len() - 1].to_string();
                Ok(Spanned::new(Pattern::Lit(Literal::Str(body)), start))
            }
            Token::LParen => {
                self.advance();
                let end = self.expect(Token::RParen)?;
                Ok(Spanned::new(Pattern::Lit(Literal::Unit), start.to(end)))
            }
            Token::Underscore => {
                self.advance();
                Ok(Spanned::new(Pattern::Wildcard, start))
            }
            Token::Name => {
                let (qname, span) = self.parse_qualified_name()?;
                if self.peek()? == Token::LParen {
                    let args = self.parse_pattern_args()?;
                    let span = start.to(self.current_span);
                    return Ok(Spanned::new(
                        Pattern::CaseClass {
                            constructor: qname,
                            args,
                        },
                        span,
                    ));
                }
                match qname.module {
                    // A qualified name cannot bind, so `M.C` is a nullary
                    // constructor pattern even without parentheses.
                    Some(_) => Ok(Spanned::new(
                        Pattern::CaseClass {
                            constructor: qname,
                            args: Vec::new(),
                        },
                        span,
                    )),
                    // A bare identifier always binds.
                    None => Ok(Spanned::new(Pattern::Id(qname.name), span)),
                }
            }
            other => Err(self.unexpected("a pattern", other, start)),
        }
    }

    /// Patterns ::= (Pattern (',' Pattern)*)?
    fn parse_pattern_args(&mut self) -> ParseResult<Vec<Spanned<Pattern>>> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if self.peek()? != Token::RParen {
            loop {
                args.push(self.parse_pattern()?);
                if !self.eat(Token::Comma)? {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }
}

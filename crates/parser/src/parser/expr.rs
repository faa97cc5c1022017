use super::*;

impl<I: Iterator<Item = SpannedToken>> Parser<I> {
    /// Expr ::= LetExpr | SeqExpr
    ///
    /// `val` bindings and `;` sequences both extend to the end of the
    /// enclosing block, so the tail recursion makes them right-associative.
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();

        if self.peek()? == Token::Val {
            self.advance();
            let param = self.parse_param()?;
            self.expect(Token::Assign)?;
            let value = self.parse_lv2_expr()?;
            self.expect(Token::Semicolon)?;
            let body = self.parse_expr()?;
            let span = start.to(self.current_span);
            return Ok(Spanned::new(
                Expr::Let {
                    param: param.node,
                    value: Box::new(value),
                    body: Box::new(body),
                },
                span,
            ));
        }

        let first = self.parse_lv2_expr()?;
        if self.eat(Token::Semicolon)? {
            let rest = self.parse_expr()?;
            let span = start.to(self.current_span);
            return Ok(Spanned::new(
                Expr::Sequence(Box::new(first), Box::new(rest)),
                span,
            ));
        }
        Ok(first)
    }

    /// Lv2Expr ::= (IteExpr | OpExpr) ('match' '{' Case+ '}')*
    ///
    /// Chained matches left-fold: `a match {…} match {…}` scrutinizes the
    /// value of the first match.
    fn parse_lv2_expr(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let mut expr = if self.peek()? == Token::If {
            self.parse_ite()?
        } else {
            self.parse_or()?
        };

        while self.peek()? == Token::Match {
            self.advance();
            self.expect(Token::LBrace)?;
            let mut cases = vec![self.parse_case()?];
            while self.peek()? == Token::Case {
                cases.push(self.parse_case()?);
            }
            self.expect(Token::RBrace)?;
            let span = start.to(self.current_span);
            expr = Spanned::new(
                Expr::Match {
                    scrutinee: Box::new(expr),
                    cases,
                },
                span,
            );
        }
        Ok(expr)
    }

    /// 'if' '(' Expr ')' '{' Expr '}' 'else' '{' Expr '}'
    fn parse_ite(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.expect(Token::If)?;
        self.expect(Token::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(Token::RParen)?;
        self.expect(Token::LBrace)?;
        let then_branch = self.parse_expr()?;
        self.expect(Token::RBrace)?;
        self.expect(Token::Else)?;
        self.expect(Token::LBrace)?;
        let else_branch = self.parse_expr()?;
        let end = self.expect(Token::RBrace)?;

        Ok(Spanned::new(
            Expr::Ite {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            start.to(end),
        ))
    }

    /// Simple ::= Literal | VarOrCall | '(' Expr? ')' | 'error' '(' Expr ')'
    pub(crate) fn parse_simple(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        match self.peek()? {
            Token::Number => {
                self.advance();
                let value: i32 = self
                    .last_text()
                    .parse()
                    .expect("integer literal validated by the lexer");
                Ok(Spanned::new(Expr::Lit(Literal::Int(value)), start))
            }
            Token::True => {
                self.advance();
                Ok(Spanned::new(Expr::Lit(Literal::Bool(true)), start))
            }
            Token::False => {
                self.advance();
                Ok(Spanned::new(Expr::Lit(Literal::Bool(false)), start))
            }
            Token::Str => {
                self.advance();
                let text = self.last_text();
                let body = text[1..text.len() - 1].to_string();
                Ok(Spanned::new(Expr::Lit(Literal::Str(body)), start))
            }
            Token::LParen => {
                self.advance();
                if self.peek()? == Token::RParen {
                    // '(' ')' is the unit literal.
                    let end = self.expect(Token::RParen)?;
                    return Ok(Spanned::new(Expr::Lit(Literal::Unit), start.to(end)));
                }
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::ErrorKw => {
                self.advance();
                self.expect(Token::LParen)?;
                let message = self.parse_expr()?;
                let end = self.expect(Token::RParen)?;
                Ok(Spanned::new(Expr::Error(Box::new(message)), start.to(end)))
            }
            Token::Name => self.parse_var_or_call(),
            other => Err(self.unexpected("an expression", other, start)),
        }
    }

    /// VarOrCall ::= Id ('.' Id)? ('(' Args ')')?
    ///
    /// A bare identifier is a variable reference; a qualifier or an argument
    /// list makes it a call (of a function or a constructor).
    fn parse_var_or_call(&mut self) -> ParseResult<Spanned<Expr>> {
        let (qname, start) = self.parse_qualified_name()?;

        if self.peek()? == Token::LParen {
            let args = self.parse_args()?;
            let span = start.to(self.current_span);
            return Ok(Spanned::new(Expr::Call { callee: qname, args }, span));
        }

        match qname.module {
            // `M.n` without an argument list is a nullary qualified call.
            Some(_) => Ok(Spanned::new(
                Expr::Call {
                    callee: qname,
                    args: Vec::new(),
                },
                start,
            )),
            None => Ok(Spanned::new(Expr::Variable(qname.name), start)),
        }
    }

    /// Args ::= (Expr (',' Expr)*)?
    fn parse_args(&mut self) -> ParseResult<Vec<Spanned<Expr>>> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if self.peek()? != Token::RParen {
            loop {
                args.push(self.parse_expr()?);
                if !self.eat(Token::Comma)? {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }
}

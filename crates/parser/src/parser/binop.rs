use super::*;
use ast::op::{BinOp, UnaryOp};

impl<I: Iterator<Item = SpannedToken>> Parser<I> {
    // Operator precedence, lowest to highest, all left-associative:
    //   ||  ;  &&  ;  ==  ;  < <=  ;  + - ++  ;  * / %
    // Unary operators bind tighter than any binary operator.

    pub(crate) fn parse_or(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let mut left = self.parse_and()?;
        while self.peek()? == Token::Or {
            self.advance();
            let right = self.parse_and()?;
            left = self.binop(BinOp::Or, left, right, start);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let mut left = self.parse_equality()?;
        while self.peek()? == Token::And {
            self.advance();
            let right = self.parse_equality()?;
            left = self.binop(BinOp::And, left, right, start);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let mut left = self.parse_comparison()?;
        while self.peek()? == Token::EqEq {
            self.advance();
            let right = self.parse_comparison()?;
            left = self.binop(BinOp::Equals, left, right, start);
        }
        Ok(left)
    }

    // < <=
    fn parse_comparison(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek()? {
                Token::Lt => BinOp::LessThan,
                Token::Le => BinOp::LessEquals,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = self.binop(op, left, right, start);
        }
        Ok(left)
    }

    // + - ++
    fn parse_additive(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek()? {
                Token::Plus => BinOp::Plus,
                Token::Minus => BinOp::Minus,
                Token::Concat => BinOp::Concat,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = self.binop(op, left, right, start);
        }
        Ok(left)
    }

    // * / %
    fn parse_term(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek()? {
                Token::Star => BinOp::Times,
                Token::Slash => BinOp::Div,
                Token::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.binop(op, left, right, start);
        }
        Ok(left)
    }

    /// UnaryExpr ::= '-' Simple | '!' Simple | Simple
    fn parse_unary(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.peek_span();
        let op = match self.peek()? {
            Token::Minus => Some(UnaryOp::Neg),
            Token::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_simple()?;
            let span = start.to(self.current_span);
            return Ok(Spanned::new(
                Expr::UnaryOp {
                    op,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_simple()
    }

    fn binop(
        &self,
        op: BinOp,
        left: Spanned<Expr>,
        right: Spanned<Expr>,
        start: Span,
    ) -> Spanned<Expr> {
        let span = start.to(self.current_span);
        Spanned::new(
            Expr::BinaryOp {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            },
            span,
        )
    }
}

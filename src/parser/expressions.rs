//! Expression parsing implementation
//!
//! Pratt parsing over the rule tables in [`grammar`](super::grammar). One
//! token is consumed and its prefix rule builds the left operand; then,
//! while the next token's infix rule binds tighter than the caller's
//! minimum level, that rule extends the operand.
//!
//! # Supported Expressions
//!
//! - Literals: strings, numbers, `.t.`/`.f.`, `nil`
//! - Names, parenthesised groups
//! - Unary `+ - ! @ ++ --`, postfix `++ --`
//! - Binary operators across the precedence bands
//! - Assignment `:=` and compound assignment (right-associative)
//! - Calls `f(a, b)`, indexing `a[i, j]`, member access `o:m`
//! - Array `{a, b}`, hash `{k => v}` and codeblock `{|x| x + 1}` literals
//! - Inline conditional `iif(cond, a, b)`

use crate::parser::ast::*;
use crate::parser::grammar::{Infix, InfixRule, Precedence, PrefixRule, GRAMMAR};
use crate::parser::parse::{ParseError, SyntaxError};
use crate::parser::reader::SourceReader;
use crate::parser::token::{Token, TokenKind};
use crate::render::Render;

/// Expression parser borrowing the statement parser's reader
pub struct ExpressionParser<'a> {
    reader: &'a mut SourceReader,
}

impl<'a> ExpressionParser<'a> {
    pub fn new(reader: &'a mut SourceReader) -> Self {
        Self { reader }
    }

    /// Parse an expression whose operators all bind tighter than `min_level`
    pub fn parse(&mut self, min_level: u8) -> Result<Expression, ParseError> {
        let token = self.reader.consume()?;
        let mut left = self.parse_prefix(token)?;

        loop {
            let next = self.reader.peek()?;
            let (kind, line) = (next.kind, next.location.line);
            let Some(infix) = GRAMMAR.infix_rule(kind) else {
                break;
            };
            if infix.precedence.level() <= min_level {
                break;
            }
            // `++`/`--` on a new line starts the next statement
            if infix.rule == InfixRule::Postfix && line != self.reader.previous_location().line {
                break;
            }
            let token = self.reader.consume()?;
            left = self.parse_infix(left, token, infix)?;
        }

        Ok(left)
    }

    /// Like [`parse`](Self::parse), but consumes nothing and returns `None`
    /// when the next token cannot start an expression
    pub fn parse_optional(&mut self, min_level: u8) -> Result<Option<Expression>, ParseError> {
        let kind = self.reader.peek()?.kind;
        if !GRAMMAR.starts_expression(kind) {
            return Ok(None);
        }
        self.parse(min_level).map(Some)
    }

    /// Full expression, any operator allowed
    pub fn parse_full(&mut self) -> Result<Expression, ParseError> {
        self.parse(Precedence::None.level())
    }

    fn parse_prefix(&mut self, token: Token) -> Result<Expression, ParseError> {
        if let Some(kind) = token.kind.literal() {
            return Ok(Expression::Literal {
                kind,
                raw: token.text,
            });
        }
        if token.kind == TokenKind::Nil {
            return Ok(Expression::Literal {
                kind: LiteralKind::Nil,
                raw: token.text,
            });
        }

        let Some(rule) = GRAMMAR.prefix_rule(token.kind) else {
            let message = format!("Expected expression, found {}", token);
            return Err(SyntaxError::at(&token, message).into());
        };

        match rule {
            PrefixRule::Name => Ok(Expression::Name(token.text)),
            PrefixRule::Group => {
                let inner = self.parse_full()?;
                self.reader.expect(TokenKind::RightParen)?;
                Ok(inner)
            }
            PrefixRule::Unary => {
                let operand = self.parse(Precedence::Prefix.level())?;
                if is_step(token.kind) {
                    check_lvalue(&token, &operand)?;
                }
                Ok(Expression::Prefix {
                    op: token.kind,
                    operand: Box::new(operand),
                })
            }
            PrefixRule::Brace => self.parse_brace(),
            PrefixRule::Conditional => self.parse_conditional(),
        }
    }

    fn parse_infix(
        &mut self,
        left: Expression,
        token: Token,
        infix: Infix,
    ) -> Result<Expression, ParseError> {
        match infix.rule {
            InfixRule::Binary => {
                let right = self.parse(infix.right_level())?;
                Ok(Expression::BinaryOp {
                    left: Box::new(left),
                    op: token.kind,
                    right: Box::new(right),
                })
            }
            InfixRule::Assign => {
                let value = self.parse(infix.right_level())?;
                check_lvalue(&token, &left)?;
                Ok(Expression::Assign {
                    target: Box::new(left),
                    op: token.kind,
                    value: Box::new(value),
                })
            }
            InfixRule::Postfix => {
                check_lvalue(&token, &left)?;
                Ok(Expression::Postfix {
                    operand: Box::new(left),
                    op: token.kind,
                })
            }
            InfixRule::Call => {
                let args = self.parse_list(TokenKind::RightParen)?;
                Ok(Expression::Call {
                    callee: Box::new(left),
                    args,
                })
            }
            InfixRule::Index => {
                let indices = self.parse_list(TokenKind::RightBracket)?;
                if indices.is_empty() {
                    return Err(SyntaxError::at(&token, "Empty index").into());
                }
                Ok(Expression::Index {
                    base: Box::new(left),
                    indices,
                })
            }
            InfixRule::FieldAccess => {
                // keywords double as member names: `oWin:End()`
                let member = if self.reader.peek()?.kind.is_keyword() {
                    self.reader.consume()?.text
                } else {
                    self.reader.expect(TokenKind::Name)?.text
                };
                Ok(Expression::FieldAccess {
                    base: Box::new(left),
                    member,
                })
            }
        }
    }

    /// Comma-separated expressions up to and including `close`
    fn parse_list(&mut self, close: TokenKind) -> Result<Vec<Expression>, ParseError> {
        let mut items = Vec::new();
        if self.reader.match_token(close)? {
            return Ok(items);
        }

        loop {
            items.push(self.parse_full()?);
            if !self.reader.match_token(TokenKind::Comma)? {
                break;
            }
        }
        self.reader.expect(close)?;

        Ok(items)
    }

    /// After `{`: codeblock, hash literal or array literal
    fn parse_brace(&mut self) -> Result<Expression, ParseError> {
        if self.reader.match_token(TokenKind::Pipe)? {
            return self.parse_codeblock();
        }

        // {=>} is the empty hash
        if self.reader.match_token(TokenKind::FatArrow)? {
            self.reader.expect(TokenKind::RightBrace)?;
            return Ok(Expression::HashLiteral(Vec::new()));
        }
        if self.reader.match_token(TokenKind::RightBrace)? {
            return Ok(Expression::ArrayLiteral(Vec::new()));
        }

        let first = self.parse_full()?;
        if !self.reader.match_token(TokenKind::FatArrow)? {
            let mut elements = vec![first];
            while self.reader.match_token(TokenKind::Comma)? {
                elements.push(self.parse_full()?);
            }
            self.reader.expect(TokenKind::RightBrace)?;
            return Ok(Expression::ArrayLiteral(elements));
        }

        let mut pairs = vec![(first, self.parse_full()?)];
        while self.reader.match_token(TokenKind::Comma)? {
            let key = self.parse_full()?;
            self.reader.expect(TokenKind::FatArrow)?;
            pairs.push((key, self.parse_full()?));
        }
        self.reader.expect(TokenKind::RightBrace)?;

        Ok(Expression::HashLiteral(pairs))
    }

    /// After `{|`: `params| body, ... }`
    fn parse_codeblock(&mut self) -> Result<Expression, ParseError> {
        let mut params = Vec::new();
        if !self.reader.check(TokenKind::Pipe)? {
            loop {
                params.push(self.reader.expect(TokenKind::Name)?.text);
                if !self.reader.match_token(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.reader.expect(TokenKind::Pipe)?;

        let body = self.parse_list(TokenKind::RightBrace)?;
        Ok(Expression::Codeblock { params, body })
    }

    /// After `iif`: `( cond, then, else )`
    fn parse_conditional(&mut self) -> Result<Expression, ParseError> {
        self.reader.expect(TokenKind::LeftParen)?;
        let condition = self.parse_full()?;
        self.reader.expect(TokenKind::Comma)?;
        let then_branch = self.parse_full()?;
        self.reader.expect(TokenKind::Comma)?;
        let else_branch = self.parse_full()?;
        self.reader.expect(TokenKind::RightParen)?;

        Ok(Expression::Conditional {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }
}

fn is_step(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::PlusPlus | TokenKind::MinusMinus)
}

/// `target` must be a name, index or member access
fn check_lvalue(op: &Token, target: &Expression) -> Result<(), ParseError> {
    if target.is_lvalue() {
        return Ok(());
    }
    let message = format!("Cannot apply {} to {}", op.kind, target.render());
    Err(SyntaxError::at(op, message).into())
}

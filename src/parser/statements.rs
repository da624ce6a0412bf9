//! Statement parsing implementation
//!
//! This module handles every statement form:
//!
//! - Definitions: `function`, `procedure`, optionally `static`
//! - Declarations: `local x := 1`, `static y`
//! - Control flow: `if`/`elseif`/`else`/`endif`, `while`/`endwhile`
//! - `return` inside nested blocks
//! - Expression statements: calls and assignments
//! - Comments and preprocessor directives, kept verbatim
//!
//! # Grammar
//!
//! ```text
//! statement   ::= definition | declaration | if_stmt | while_stmt
//!               | return_stmt | call_stmt | assign_stmt
//!               | COMMENT | DIRECTIVE
//! definition  ::= ["static"] ("function" | "procedure") NAME params
//!                 statement* "return" [expr]
//! params      ::= "(" [NAME {"," NAME}] ")"
//! declaration ::= ("local" | "static") NAME [":=" expr]
//! if_stmt     ::= "if" expr statement* {"elseif" expr statement*}
//!                 ["else" statement*] "endif"
//! while_stmt  ::= "while" expr statement* ("end" ["while"] | "endwhile")
//! return_stmt ::= "return" [expr]
//! ```
//!
//! The grammar ignores line breaks except in one place: the value of a
//! `return` must start on the same line as the keyword.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::parse::{ParseError, Parser, SyntaxError};
use crate::parser::token::{Token, TokenKind};

impl Parser {
    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let token = self.reader.peek()?.clone();

        match token.kind {
            kind if kind.is_comment() => {
                self.reader.consume()?;
                Ok(Statement::Comment(token.text))
            }
            kind if kind.is_directive() => {
                self.reader.consume()?;
                Ok(Statement::PreprocessorDirective(token.text))
            }
            TokenKind::Function | TokenKind::Procedure => {
                if self.in_definition {
                    return Err(nested_definition(&token));
                }
                self.parse_definition(false)
            }
            TokenKind::Static => {
                if self.starts_static_definition()? {
                    if self.in_definition {
                        return Err(nested_definition(&token));
                    }
                    self.reader.consume()?;
                    return self.parse_definition(true);
                }
                self.parse_declaration()
            }
            TokenKind::Local => self.parse_declaration(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Return => {
                if !self.in_definition {
                    return Err(SyntaxError::at(&token, "'return' outside of a function or procedure").into());
                }
                self.parse_return_statement()
            }
            TokenKind::Nil | TokenKind::Iif => self.parse_expression_statement(),
            kind if kind.is_keyword() => {
                Err(SyntaxError::at(&token, format!("Expected statement, found {}", token)).into())
            }
            _ => self.parse_expression_statement(),
        }
    }

    /// `static` directly followed by `function` or `procedure`
    fn starts_static_definition(&mut self) -> Result<bool, ParseError> {
        Ok(matches!(
            self.reader.look_ahead(1)?.kind,
            TokenKind::Function | TokenKind::Procedure
        ))
    }

    /// Parse a function or procedure definition, starting at its keyword
    fn parse_definition(&mut self, is_static: bool) -> Result<Statement, ParseError> {
        let keyword = self.reader.consume()?;
        let name = self.expect_name()?;
        let params = self.parse_parameters()?;

        self.in_definition = true;
        let body = self.parse_definition_body(&name);
        self.in_definition = false;
        let (body, return_token) = body?;

        let value = self.parse_return_value(&return_token)?;

        if keyword.kind == TokenKind::Function {
            let Some(retval) = value else {
                let message = format!("Function '{}' must return a value", name);
                return Err(SyntaxError::at(&return_token, message).into());
            };
            Ok(Statement::FunctionDef {
                name,
                params,
                body,
                retval,
                is_static,
            })
        } else {
            if value.is_some() {
                let message = format!("Procedure '{}' cannot return a value", name);
                return Err(SyntaxError::at(&return_token, message).into());
            }
            Ok(Statement::ProcedureDef {
                name,
                params,
                body,
                is_static,
            })
        }
    }

    /// `( a, b, c )`
    fn parse_parameters(&mut self) -> Result<Vec<String>, ParseError> {
        let mut params = Vec::new();
        self.reader.expect(TokenKind::LeftParen)?;

        if !self.reader.match_token(TokenKind::RightParen)? {
            loop {
                params.push(self.expect_name()?);
                if !self.reader.match_token(TokenKind::Comma)? {
                    break;
                }
            }
            self.reader.expect(TokenKind::RightParen)?;
        }

        Ok(params)
    }

    /// Statements up to the body-level `return`, which is consumed and returned
    fn parse_definition_body(&mut self, name: &str) -> Result<(Vec<Statement>, Token), ParseError> {
        let mut body = Vec::new();

        loop {
            let token = self.reader.consume()?;
            match token.kind {
                TokenKind::Return => return Ok((body, token)),
                TokenKind::Eof => {
                    let message = format!("Body of '{}' is not terminated by 'return'", name);
                    return Err(SyntaxError::at(&token, message).into());
                }
                TokenKind::Function | TokenKind::Procedure => {
                    let err = nested_definition(&token);
                    self.reader.put_back(token);
                    return Err(err);
                }
                _ => {
                    self.reader.put_back(token);
                    body.push(self.parse_statement()?);
                }
            }
        }
    }

    /// Optional value after `return`, only if it starts on the keyword's line
    fn parse_return_value(&mut self, keyword: &Token) -> Result<Option<Expression>, ParseError> {
        let next = self.reader.peek()?;
        if next.location.line != keyword.location.line {
            return Ok(None);
        }
        self.expression().parse_optional(0)
    }

    /// `return [expr]` nested inside a block of a definition
    fn parse_return_statement(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.reader.consume()?;
        let value = self.parse_return_value(&keyword)?;
        Ok(Statement::Return { value })
    }

    /// `local NAME [:= expr]` or `static NAME [:= expr]`
    fn parse_declaration(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.reader.consume()?;
        let name = self.expect_name()?;

        let init = if self.reader.match_token(TokenKind::Assign)? {
            Some(self.expression().parse_full()?)
        } else {
            None
        };

        if keyword.kind == TokenKind::Local {
            Ok(Statement::LocalDecl { name, init })
        } else {
            Ok(Statement::StaticDecl { name, init })
        }
    }

    /// Parse if statement
    fn parse_if_statement(&mut self) -> Result<Statement, ParseError> {
        self.reader.consume()?; // 'if'
        let condition = self.expression().parse_full()?;

        let arms = [TokenKind::ElseIf, TokenKind::Else, TokenKind::EndIf];
        let then_body = self.parse_block(&arms, "'endif'")?;

        let mut else_ifs = Vec::new();
        while self.reader.match_token(TokenKind::ElseIf)? {
            let condition = self.expression().parse_full()?;
            let body = self.parse_block(&arms, "'endif'")?;
            else_ifs.push(ElseIf { condition, body });
        }

        let else_body = if self.reader.match_token(TokenKind::Else)? {
            self.parse_block(&[TokenKind::EndIf], "'endif'")?
        } else {
            Vec::new()
        };

        self.reader.expect(TokenKind::EndIf)?;

        Ok(Statement::If {
            condition,
            then_body,
            else_ifs,
            else_body,
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Result<Statement, ParseError> {
        self.reader.consume()?; // 'while'
        let condition = self.expression().parse_full()?;

        let body = self.parse_block(&[TokenKind::End, TokenKind::EndWhile], "'endwhile'")?;

        if !self.reader.match_token(TokenKind::EndWhile)? {
            let end = self.reader.expect(TokenKind::End)?;
            // `end while` on one line
            let next = self.reader.peek()?;
            if next.kind == TokenKind::While && next.location.line == end.location.line {
                self.reader.consume()?;
            }
        }

        Ok(Statement::While { condition, body })
    }

    /// Statements until one of `terminators` (left unconsumed)
    fn parse_block(&mut self, terminators: &[TokenKind], closing: &str) -> Result<Vec<Statement>, ParseError> {
        let mut body = Vec::new();

        loop {
            let kind = self.reader.peek()?.kind;
            if terminators.contains(&kind) {
                return Ok(body);
            }
            if kind == TokenKind::Eof {
                return Err(self.error_at_next(format!("Expected {} before end of file", closing)));
            }
            body.push(self.parse_statement()?);
        }
    }

    /// Call statement or assignment statement, decided by speculative parses
    fn parse_expression_statement(&mut self) -> Result<Statement, ParseError> {
        let first = self.reader.peek()?.clone();

        let call_shaped = first.kind == TokenKind::Name
            && matches!(
                self.reader.look_ahead(1)?.kind,
                TokenKind::LeftParen | TokenKind::Colon | TokenKind::LeftBracket
            );

        if call_shaped {
            let checkpoint = self.reader.mark();
            match self.expression().parse_full() {
                Ok(expr @ Expression::Call { .. }) => {
                    self.reader.commit(checkpoint);
                    return Ok(Statement::Call(expr));
                }
                Err(e @ ParseError::Lex(_)) => {
                    self.reader.commit(checkpoint);
                    return Err(e);
                }
                Ok(_) | Err(ParseError::Syntax(_)) => self.reader.reset(checkpoint),
            }
        }

        let checkpoint = self.reader.mark();
        match self.expression().parse_full() {
            Ok(expr) if expr.is_assignment_like() => {
                self.reader.commit(checkpoint);
                Ok(Statement::Assignment(expr))
            }
            Ok(_) => {
                self.reader.reset(checkpoint);
                let message = format!("Expected statement, found {}", first);
                Err(SyntaxError::at(&first, message).into())
            }
            Err(e) => {
                self.reader.reset(checkpoint);
                Err(e)
            }
        }
    }
}

fn nested_definition(token: &Token) -> ParseError {
    let message = format!("Nested {} definition", token.kind);
    SyntaxError::at(token, message).into()
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::lexer::Lexer;
    use crate::parser::parse::{ParseError, Parser};
    use crate::parser::token::TokenKind;

    fn parse(source: &str) -> Result<SourceRoot, ParseError> {
        Parser::new(Lexer::new(source)).parse()
    }

    fn name(n: &str) -> Expression {
        Expression::Name(n.to_string())
    }

    fn num(raw: &str) -> Expression {
        Expression::Literal {
            kind: LiteralKind::Number,
            raw: raw.to_string(),
        }
    }

    fn assign(target: Expression, value: Expression) -> Expression {
        Expression::Assign {
            target: Box::new(target),
            op: TokenKind::Assign,
            value: Box::new(value),
        }
    }

    #[test]
    fn test_function_definition() {
        let root = parse("function a(b)\n local c := b\nreturn c").unwrap();
        assert_eq!(
            root.nodes,
            vec![Statement::FunctionDef {
                name: "a".to_string(),
                params: vec!["b".to_string()],
                body: vec![Statement::LocalDecl {
                    name: "c".to_string(),
                    init: Some(name("b")),
                }],
                retval: name("c"),
                is_static: false,
            }]
        );
    }

    #[test]
    fn test_static_procedure() {
        let root = parse("STATIC PROCEDURE Main(x, y)\n  x++\nRETURN").unwrap();
        assert_eq!(
            root.nodes,
            vec![Statement::ProcedureDef {
                name: "Main".to_string(),
                params: vec!["x".to_string(), "y".to_string()],
                body: vec![Statement::Assignment(Expression::Postfix {
                    operand: Box::new(name("x")),
                    op: TokenKind::PlusPlus,
                })],
                is_static: true,
            }]
        );
    }

    #[test]
    fn test_function_requires_return_value() {
        let err = parse("function f()\nreturn\n").unwrap_err();
        assert!(err.message().contains("must return a value"));
    }

    #[test]
    fn test_return_value_must_share_line() {
        // `x` on the next line is not the return value
        let err = parse("function f()\nreturn\nx").unwrap_err();
        assert!(err.message().contains("must return a value"));
    }

    #[test]
    fn test_procedure_cannot_return_value() {
        let err = parse("procedure p()\nreturn 1").unwrap_err();
        assert!(err.message().contains("cannot return a value"));
    }

    #[test]
    fn test_body_not_terminated() {
        let err = parse("function f()\n local x := 1\n").unwrap_err();
        assert!(matches!(err, ParseError::Syntax(_)));
        assert!(err.message().contains("not terminated by 'return'"));
    }

    #[test]
    fn test_nested_definition() {
        let err = parse("function f()\nfunction g()\nreturn 1\nreturn 2").unwrap_err();
        assert!(err.message().contains("Nested"));
        assert_eq!(err.location().line, 2);

        let err = parse("procedure p()\nstatic function g()\nreturn 1\nreturn").unwrap_err();
        assert!(err.message().contains("Nested"));
    }

    #[test]
    fn test_return_outside_definition() {
        let err = parse("return 1").unwrap_err();
        assert!(err.message().contains("outside"));
    }

    #[test]
    fn test_nested_return_statement() {
        let root = parse("function f(x)\nif x\nreturn 1\nendif\nreturn 0").unwrap();
        let Statement::FunctionDef { body, .. } = &root.nodes[0] else {
            panic!("expected function");
        };
        assert_eq!(
            body[0],
            Statement::If {
                condition: name("x"),
                then_body: vec![Statement::Return { value: Some(num("1")) }],
                else_ifs: vec![],
                else_body: vec![],
            }
        );
    }

    #[test]
    fn test_declarations() {
        let root = parse("static s\nlocal l := {}").unwrap();
        assert_eq!(
            root.nodes,
            vec![
                Statement::StaticDecl {
                    name: "s".to_string(),
                    init: None,
                },
                Statement::LocalDecl {
                    name: "l".to_string(),
                    init: Some(Expression::ArrayLiteral(vec![])),
                },
            ]
        );
    }

    #[test]
    fn test_if_elseif_else() {
        let root = parse("if a\n x := 1\nelseif b\n x := 2\nelse\n x := 3\nendif").unwrap();
        assert_eq!(
            root.nodes,
            vec![Statement::If {
                condition: name("a"),
                then_body: vec![Statement::Assignment(assign(name("x"), num("1")))],
                else_ifs: vec![ElseIf {
                    condition: name("b"),
                    body: vec![Statement::Assignment(assign(name("x"), num("2")))],
                }],
                else_body: vec![Statement::Assignment(assign(name("x"), num("3")))],
            }]
        );
    }

    #[test]
    fn test_missing_endif() {
        let err = parse("if a\n x := 1\n").unwrap_err();
        assert!(err.message().contains("'endif'"));
    }

    #[test]
    fn test_while_terminators() {
        let expected = vec![Statement::While {
            condition: name("a"),
            body: vec![Statement::Call(Expression::Call {
                callee: Box::new(name("f")),
                args: vec![],
            })],
        }];
        assert_eq!(parse("while a\n f()\nend").unwrap().nodes, expected);
        assert_eq!(parse("while a\n f()\nend while").unwrap().nodes, expected);
        assert_eq!(parse("while a\n f()\nENDWHILE").unwrap().nodes, expected);
    }

    #[test]
    fn test_end_followed_by_new_loop() {
        let root = parse("while a\nend\nwhile b\nend").unwrap();
        assert_eq!(root.nodes.len(), 2);
    }

    #[test]
    fn test_method_call_statement() {
        let root = parse("o:m(1)").unwrap();
        assert_eq!(
            root.nodes,
            vec![Statement::Call(Expression::Call {
                callee: Box::new(Expression::FieldAccess {
                    base: Box::new(name("o")),
                    member: "m".to_string(),
                }),
                args: vec![num("1")],
            })]
        );
    }

    #[test]
    fn test_member_assignment_backtracks() {
        let mut parser = Parser::new(Lexer::new("if x\n e:f := 1\nendif"));
        parser.reader.consume().unwrap(); // if
        let _condition = parser.expression().parse_full().unwrap();
        let statement = parser.parse_statement().unwrap();
        assert_eq!(
            statement,
            Statement::Assignment(assign(
                Expression::FieldAccess {
                    base: Box::new(name("e")),
                    member: "f".to_string(),
                },
                num("1"),
            ))
        );
        assert!(parser.reader.check(TokenKind::EndIf).unwrap());
    }

    #[test]
    fn test_index_assignment() {
        let root = parse("a[1] += 2").unwrap();
        assert!(matches!(
            &root.nodes[0],
            Statement::Assignment(Expression::Assign { op: TokenKind::PlusEq, .. })
        ));
    }

    #[test]
    fn test_bare_expression_rejected() {
        let err = parse("a + 1").unwrap_err();
        assert!(err.message().contains("Expected statement"));
        assert_eq!(err.location().column, 1);

        assert!(parse("f(1) + 1").is_err());
    }

    #[test]
    fn test_lex_error_inside_call_is_not_retried() {
        for source in [
            "f(1.1.1)",
            "x[1] := f(1.1.1)",
            "a[1] := f(\"abc\n)",
            "f( /* never closes",
        ] {
            let err = parse(source).unwrap_err();
            assert!(matches!(err, ParseError::Lex(_)), "{}: {}", source, err);
        }

        let err = parse("x[1] := f(1.1.1)").unwrap_err();
        assert_eq!(err.location().column, 11);
        assert!(err.message().contains("second decimal point"));
    }

    #[test]
    fn test_keyword_cannot_start_statement() {
        let err = parse("endif").unwrap_err();
        assert_eq!(err.message(), "Expected statement, found 'endif'");
    }

    #[test]
    fn test_comments_and_directives() {
        let root = parse("#include \"x.ch\"\n// top\nprocedure p()\n /* inner */\nreturn").unwrap();
        assert_eq!(root.nodes[0], Statement::PreprocessorDirective("#include \"x.ch\"".to_string()));
        assert_eq!(root.nodes[1], Statement::Comment("// top".to_string()));
        let Statement::ProcedureDef { body, .. } = &root.nodes[2] else {
            panic!("expected procedure");
        };
        assert_eq!(body, &vec![Statement::Comment("/* inner */".to_string())]);
    }
}

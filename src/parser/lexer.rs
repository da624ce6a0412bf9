//! Lexer (tokenizer) for Harbour source code
//!
//! Pull-based: [`Lexer::next_token`] scans exactly one token per call and
//! keeps returning [`TokenKind::Eof`] once the input is exhausted. Comments
//! and preprocessor directives are emitted as tokens rather than skipped, so
//! the parser can keep them in the tree.
//!
//! A few constructs need speculative reads (`#word`, `[ ... ]`). Those save
//! a [`Mark`] and restore it when the guess does not pan out.

use super::ast::SourceLocation;
use super::token::{Token, TokenKind, SPELLINGS};
use rustc_hash::FxHashSet;
use thiserror::Error;

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Lexer error at line {}, column {}: {}", .location.line, .location.column, .message)]
pub struct LexError {
    pub message: String,
    pub text: String, // offending source text
    pub location: SourceLocation,
}

/// Saved scanner position for speculative reads
#[derive(Debug, Clone, Copy)]
struct Mark {
    position: usize,
    line: usize,
    column: usize,
}

/// Lexer for Harbour source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    /// Kind of the last non-comment token, drives the `[` rule
    last_kind: Option<TokenKind>,
    /// Lower-cased identifiers seen so far
    names: FxHashSet<String>,
    /// First error; every later call reports it again
    failed: Option<LexError>,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            last_kind: None,
            names: FxHashSet::default(),
            failed: None,
        }
    }

    /// Tokenize the entire input, up to and including the first `Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(tokens)
    }

    /// Scan the next token
    ///
    /// Errors are sticky: once scanning fails, the same error is returned
    /// on every later call.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if let Some(e) = &self.failed {
            return Err(e.clone());
        }

        let result = self.scan();
        if let Err(e) = &result {
            self.failed = Some(e.clone());
        }
        result
    }

    fn scan(&mut self) -> Result<Token, LexError> {
        loop {
            let loc = self.current_location();
            let Some(ch) = self.peek() else {
                return Ok(Token::new(TokenKind::Eof, "", loc));
            };

            let token = match ch {
                '#' => self.hash(loc),
                '/' => self.slash(loc)?,
                '.' => self.dot(loc)?,
                '0'..='9' => self.number_literal(loc)?,
                '"' | '\'' => self.string_literal(ch, loc)?,
                '[' => self.bracket(loc),
                'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(loc),
                _ => match self.operator(loc) {
                    Some(token) => token,
                    None => {
                        // whitespace, newlines and unknown characters
                        self.advance();
                        continue;
                    }
                },
            };

            if !token.kind.is_comment() && !token.kind.is_directive() {
                self.last_kind = Some(token.kind);
            }
            return Ok(token);
        }
    }

    /// `#directive ...` or the `#` operator
    fn hash(&mut self, loc: SourceLocation) -> Token {
        let start = self.position;
        self.advance(); // '#'
        let after_hash = self.mark();

        let mut word = String::new();
        while let Some(ch) = self.peek() {
            if !ch.is_ascii_alphabetic() {
                break;
            }
            word.push(ch.to_ascii_lowercase());
            self.advance();
        }

        match SPELLINGS.directives.get(word.as_str()) {
            Some(&kind) => {
                self.skip_to_line_end();
                Token::new(kind, self.text_from(start), loc)
            }
            None => {
                self.reset(after_hash);
                Token::new(TokenKind::Hash, "#", loc)
            }
        }
    }

    /// Comments, `/=` and `/`
    fn slash(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let start = self.position;
        match self.peek_ahead(1) {
            Some('/') => {
                self.skip_to_line_end();
                Ok(Token::new(TokenKind::LineComment, self.text_from(start), loc))
            }
            Some('*') => {
                self.advance(); // '/'
                self.advance(); // '*'
                while !self.is_at_end() {
                    if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                        self.advance();
                        self.advance();
                        return Ok(Token::new(
                            TokenKind::BlockComment,
                            self.text_from(start),
                            loc,
                        ));
                    }
                    self.advance();
                }
                Err(LexError {
                    message: "Unterminated block comment".to_string(),
                    text: self.text_from(start),
                    location: loc,
                })
            }
            Some('=') => {
                self.advance();
                self.advance();
                Ok(Token::new(TokenKind::SlashEq, "/=", loc))
            }
            _ => {
                self.advance();
                Ok(Token::new(TokenKind::Slash, "/", loc))
            }
        }
    }

    /// `.t.`, `.f.`, `.and.`, `.or.` or a number starting with `.`
    fn dot(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        match self.peek_ahead(1) {
            Some(c) if c.is_ascii_digit() => self.number_literal(loc),
            Some(c) if c.is_ascii_alphabetic() => {
                let start = self.position;
                self.advance(); // '.'
                while let Some(ch) = self.peek() {
                    if !ch.is_ascii_alphabetic() {
                        break;
                    }
                    self.advance();
                }
                let closed = self.peek() == Some('.');
                if closed {
                    self.advance();
                }
                let text = self.text_from(start);
                let lower = text.to_ascii_lowercase();

                if closed {
                    if lower == ".t." || lower == ".f." {
                        return Ok(Token::new(TokenKind::BoolLiteral, text, loc));
                    }
                    if let Some(&kind) = SPELLINGS.dotted_operators.get(lower.as_str()) {
                        return Ok(Token::new(kind, text, loc));
                    }
                }
                Err(LexError {
                    message: format!("Unknown dotted operator '{}'", text),
                    text,
                    location: loc,
                })
            }
            _ => Err(LexError {
                message: "Unexpected '.'".to_string(),
                text: ".".to_string(),
                location: loc,
            }),
        }
    }

    /// Decimal or hexadecimal numeric literal
    fn number_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut text = String::new();
        let mut seen_dot = false;
        let mut hex = false;

        while let Some(ch) = self.peek() {
            match ch {
                '0'..='9' => {}
                '.' => {
                    // `1.and.` is a number followed by an operator
                    if self.peek_ahead(1).is_some_and(|c| c.is_ascii_alphabetic()) {
                        break;
                    }
                    if seen_dot {
                        text.push(ch);
                        return Err(LexError {
                            message: "Numeric literal has a second decimal point".to_string(),
                            text,
                            location: loc,
                        });
                    }
                    seen_dot = true;
                }
                'x' | 'X' => {
                    if text != "0" {
                        text.push(ch);
                        return Err(LexError {
                            message: format!("Misplaced '{}' in numeric literal", ch),
                            text,
                            location: loc,
                        });
                    }
                    hex = true;
                }
                'a'..='f' | 'A'..='F' => {
                    if !hex {
                        text.push(ch);
                        return Err(LexError {
                            message: "Hex digit outside a hex literal".to_string(),
                            text,
                            location: loc,
                        });
                    }
                }
                _ => break,
            }
            text.push(ch);
            self.advance();
        }

        Ok(Token::new(TokenKind::NumLiteral, text, loc))
    }

    /// `"..."` or `'...'`, quotes kept in the token text
    fn string_literal(&mut self, quote: char, loc: SourceLocation) -> Result<Token, LexError> {
        let start = self.position;
        self.advance(); // opening quote

        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
            if ch == quote {
                return Ok(Token::new(TokenKind::StrLiteral, self.text_from(start), loc));
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            text: self.text_from(start),
            location: loc,
        })
    }

    /// Index bracket or `[bracket string]`
    fn bracket(&mut self, loc: SourceLocation) -> Token {
        let start = self.position;
        self.advance(); // '['

        if self.last_kind.is_some_and(TokenKind::ends_operand) {
            return Token::new(TokenKind::LeftBracket, "[", loc);
        }

        let after_bracket = self.mark();
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
            if ch == ']' {
                let text = self.text_from(start);
                let content = text[1..text.len() - 1].trim().to_ascii_lowercase();
                if self.names.contains(&content) {
                    break;
                }
                return Token::new(TokenKind::StrLiteral, text, loc);
            }
        }

        self.reset(after_bracket);
        Token::new(TokenKind::LeftBracket, "[", loc)
    }

    /// Keyword or identifier
    fn identifier_or_keyword(&mut self, loc: SourceLocation) -> Token {
        let start = self.position;
        while let Some(ch) = self.peek() {
            if !(ch.is_ascii_alphanumeric() || ch == '_') {
                break;
            }
            self.advance();
        }

        let text = self.text_from(start);
        let lower = text.to_ascii_lowercase();
        if let Some(&kind) = SPELLINGS.keywords.get(lower.as_str()) {
            return Token::new(kind, text, loc);
        }

        self.names.insert(lower);
        Token::new(TokenKind::Name, text, loc)
    }

    /// Two-character operators first, then single characters
    fn operator(&mut self, loc: SourceLocation) -> Option<Token> {
        let first = self.peek()?;
        if let Some(second) = self.peek_ahead(1) {
            let pair: String = [first, second].iter().collect();
            if let Some(&kind) = SPELLINGS.compound_operators.get(pair.as_str()) {
                self.advance();
                self.advance();
                return Some(Token::new(kind, pair, loc));
            }
        }

        let kind = *SPELLINGS.simple_operators.get(&first)?;
        self.advance();
        Some(Token::new(kind, first.to_string(), loc))
    }

    /// Advance up to (not over) the next newline
    fn skip_to_line_end(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Source text from `start` to the current position, without a trailing `\r`
    fn text_from(&self, start: usize) -> String {
        let text: String = self.input[start..self.position].iter().collect();
        match text.strip_suffix('\r') {
            Some(stripped) => stripped.to_string(),
            None => text,
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            position: self.position,
            line: self.line,
            column: self.column,
        }
    }

    fn reset(&mut self, mark: Mark) {
        self.position = mark.position;
        self.line = mark.line;
        self.column = mark.column;
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn texts(source: &str) -> Vec<String> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn test_assignment_and_colon() {
        assert_eq!(
            kinds("a := b"),
            vec![TokenKind::Name, TokenKind::Assign, TokenKind::Name, TokenKind::Eof]
        );
        assert_eq!(
            kinds("a:b"),
            vec![TokenKind::Name, TokenKind::Colon, TokenKind::Name, TokenKind::Eof]
        );
    }

    #[test]
    fn test_eof_forever() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Name);
        for _ in 0..3 {
            assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        }
    }

    #[test]
    fn test_error_is_sticky() {
        let mut lexer = Lexer::new("x 1.1.1 y");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Name);
        let first = lexer.next_token().unwrap_err();
        assert_eq!(first.location.column, 3);
        for _ in 0..3 {
            assert_eq!(lexer.next_token().unwrap_err(), first);
        }
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let tokens = Lexer::new("FUNCTION Foo EndIf end1").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Function);
        assert_eq!(tokens[0].text, "FUNCTION");
        assert_eq!(tokens[1].kind, TokenKind::Name);
        assert_eq!(tokens[2].kind, TokenKind::EndIf);
        assert_eq!(tokens[3].kind, TokenKind::Name);
    }

    #[test]
    fn test_locations() {
        let tokens = Lexer::new("local x\n  x++").tokenize().unwrap();
        assert_eq!(tokens[0].location, SourceLocation::new(1, 1));
        assert_eq!(tokens[1].location, SourceLocation::new(1, 7));
        assert_eq!(tokens[2].location, SourceLocation::new(2, 3));
        assert_eq!(tokens[3].location, SourceLocation::new(2, 4));
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("+= -= *= /= %= ^= == != <= >= => ++ --"),
            vec![
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::StarEq,
                TokenKind::SlashEq,
                TokenKind::PercentEq,
                TokenKind::CaretEq,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::FatArrow,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("= # $ ? @ | !"),
            vec![
                TokenKind::Eq,
                TokenKind::Hash,
                TokenKind::Dollar,
                TokenKind::Question,
                TokenKind::At,
                TokenKind::Pipe,
                TokenKind::Not,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_dotted_operators_and_booleans() {
        let tokens = Lexer::new("a .AND. .t. .or. .F.").tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::And);
        assert_eq!(tokens[1].text, ".AND.");
        assert_eq!(tokens[2].kind, TokenKind::BoolLiteral);
        assert_eq!(tokens[3].kind, TokenKind::Or);
        assert_eq!(tokens[4].kind, TokenKind::BoolLiteral);
        assert_eq!(tokens[4].text, ".F.");
    }

    #[test]
    fn test_unknown_dotted_operator() {
        let err = Lexer::new(".xor.").tokenize().unwrap_err();
        assert!(err.message.contains(".xor."));
        assert!(Lexer::new("a . b").tokenize().is_err());
    }

    #[test]
    fn test_numbers() {
        assert_eq!(texts("12 3.25 .5 0x1F 0XaB"), vec!["12", "3.25", ".5", "0x1F", "0XaB", ""]);
        assert_eq!(
            kinds("1.and.2"),
            vec![TokenKind::NumLiteral, TokenKind::And, TokenKind::NumLiteral, TokenKind::Eof]
        );
    }

    #[test]
    fn test_number_errors() {
        let err = Lexer::new("1.1.1").tokenize().unwrap_err();
        assert_eq!(err.location, SourceLocation::new(1, 1));
        assert!(Lexer::new("12ab").tokenize().is_err());
        assert!(Lexer::new("10x5").tokenize().is_err());
        assert!(Lexer::new("0x1x").tokenize().is_err());
    }

    #[test]
    fn test_strings() {
        assert_eq!(texts(r#""it's" 'say "hi"'"#), vec![r#""it's""#, r#"'say "hi"'"#, ""]);
        let err = Lexer::new("\"abc\nd\"").tokenize().unwrap_err();
        assert!(err.message.contains("Unterminated string"));
        assert!(Lexer::new("'abc").tokenize().is_err());
    }

    #[test]
    fn test_comments_are_tokens() {
        let tokens = Lexer::new("x // note\n/* a\nb */ y").tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::LineComment);
        assert_eq!(tokens[1].text, "// note");
        assert_eq!(tokens[2].kind, TokenKind::BlockComment);
        assert_eq!(tokens[2].text, "/* a\nb */");
        assert_eq!(tokens[3].location, SourceLocation::new(3, 6));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = Lexer::new("/* never closes").tokenize().unwrap_err();
        assert!(err.message.contains("Unterminated block comment"));
    }

    #[test]
    fn test_directives() {
        let tokens = Lexer::new("#include \"std.ch\"\r\n#DEFINE X 1\na # b").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::IncludeDirective);
        assert_eq!(tokens[0].text, "#include \"std.ch\"");
        assert_eq!(tokens[1].kind, TokenKind::DefineDirective);
        assert_eq!(tokens[1].text, "#DEFINE X 1");
        assert_eq!(tokens[3].kind, TokenKind::Hash);
        assert_eq!(tokens[4].kind, TokenKind::Name);
    }

    #[test]
    fn test_unknown_directive_is_hash_operator() {
        assert_eq!(
            kinds("#foo"),
            vec![TokenKind::Hash, TokenKind::Name, TokenKind::Eof]
        );
    }

    #[test]
    fn test_bracket_after_operand_is_index() {
        assert_eq!(
            kinds("a[1] b()[2]"),
            vec![
                TokenKind::Name,
                TokenKind::LeftBracket,
                TokenKind::NumLiteral,
                TokenKind::RightBracket,
                TokenKind::Name,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBracket,
                TokenKind::NumLiteral,
                TokenKind::RightBracket,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_bracket_string() {
        let tokens = Lexer::new("x := [hello world]").tokenize().unwrap();
        assert_eq!(tokens[2].kind, TokenKind::StrLiteral);
        assert_eq!(tokens[2].text, "[hello world]");
    }

    #[test]
    fn test_bracket_with_known_name_is_bracket() {
        let tokens = Lexer::new("Idx := 1\nf([idx])").tokenize().unwrap();
        assert_eq!(tokens[5].kind, TokenKind::LeftBracket);
        assert_eq!(tokens[6].kind, TokenKind::Name);
        assert_eq!(tokens[7].kind, TokenKind::RightBracket);
    }

    #[test]
    fn test_unclosed_bracket_rewinds() {
        assert_eq!(
            kinds("f([1,\n2])")[2],
            TokenKind::LeftBracket
        );
    }

    #[test]
    fn test_unknown_characters_skipped() {
        assert_eq!(
            kinds("a ; ~ b"),
            vec![TokenKind::Name, TokenKind::Name, TokenKind::Eof]
        );
    }
}

//! Token categories and their fixed spellings
//!
//! Every [`TokenKind`] maps to at most one canonical spelling. The same
//! mapping drives two directions:
//! - the lexer's recognition tables ([`SpellingTables`]), built once from
//!   [`TokenKind::ALL`];
//! - the renderer, which prints operators and keywords back through
//!   [`TokenKind::spelling`].
//!
//! Keywords and directive names are matched case-insensitively; their
//! canonical spelling is lower case.

use super::ast::{LiteralKind, SourceLocation};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Closed set of token categories produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Punctuation and grouping
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    LeftBrace,    // {
    RightBrace,   // }
    Comma,        // ,
    Pipe,         // |

    // Assignment
    Assign,    // :=
    PlusEq,    // +=
    MinusEq,   // -=
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=
    CaretEq,   // ^=

    // Logical
    And, // .and.
    Or,  // .or.
    Not, // !

    // Relational
    Eq,    // =
    EqEq,  // ==
    Hash,  // #
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Arithmetic
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    Caret,      // ^
    PlusPlus,   // ++
    MinusMinus, // --

    // Miscellaneous
    Dollar,   // $
    Question, // ?
    Colon,    // :
    At,       // @
    FatArrow, // =>

    // Keywords
    Function,
    Procedure,
    Return,
    Nil,
    Local,
    Static,
    Iif,
    If,
    Else,
    ElseIf,
    End,
    EndIf,
    While,
    EndWhile,
    EndErr,

    // Literals
    StrLiteral,
    NumLiteral,
    BoolLiteral,

    // Identifiers
    Name,

    // Preprocessor directives
    IncludeDirective,
    DefineDirective,
    IfdefDirective,
    IfndefDirective,
    ElifDirective,
    ElseDirective,
    EndifDirective,
    UndefDirective,
    PragmaDirective,
    CommandDirective,
    XcommandDirective,
    TranslateDirective,
    XtranslateDirective,
    ErrorDirective,
    StdoutDirective,

    // Comments
    LineComment,
    BlockComment,

    // End of input
    Eof,
}

impl TokenKind {
    /// Every category, in declaration order. Used to derive lookup tables.
    pub const ALL: &'static [TokenKind] = &[
        TokenKind::LeftParen,
        TokenKind::RightParen,
        TokenKind::LeftBracket,
        TokenKind::RightBracket,
        TokenKind::LeftBrace,
        TokenKind::RightBrace,
        TokenKind::Comma,
        TokenKind::Pipe,
        TokenKind::Assign,
        TokenKind::PlusEq,
        TokenKind::MinusEq,
        TokenKind::StarEq,
        TokenKind::SlashEq,
        TokenKind::PercentEq,
        TokenKind::CaretEq,
        TokenKind::And,
        TokenKind::Or,
        TokenKind::Not,
        TokenKind::Eq,
        TokenKind::EqEq,
        TokenKind::Hash,
        TokenKind::NotEq,
        TokenKind::Lt,
        TokenKind::Le,
        TokenKind::Gt,
        TokenKind::Ge,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Star,
        TokenKind::Slash,
        TokenKind::Percent,
        TokenKind::Caret,
        TokenKind::PlusPlus,
        TokenKind::MinusMinus,
        TokenKind::Dollar,
        TokenKind::Question,
        TokenKind::Colon,
        TokenKind::At,
        TokenKind::FatArrow,
        TokenKind::Function,
        TokenKind::Procedure,
        TokenKind::Return,
        TokenKind::Nil,
        TokenKind::Local,
        TokenKind::Static,
        TokenKind::Iif,
        TokenKind::If,
        TokenKind::Else,
        TokenKind::ElseIf,
        TokenKind::End,
        TokenKind::EndIf,
        TokenKind::While,
        TokenKind::EndWhile,
        TokenKind::EndErr,
        TokenKind::StrLiteral,
        TokenKind::NumLiteral,
        TokenKind::BoolLiteral,
        TokenKind::Name,
        TokenKind::IncludeDirective,
        TokenKind::DefineDirective,
        TokenKind::IfdefDirective,
        TokenKind::IfndefDirective,
        TokenKind::ElifDirective,
        TokenKind::ElseDirective,
        TokenKind::EndifDirective,
        TokenKind::UndefDirective,
        TokenKind::PragmaDirective,
        TokenKind::CommandDirective,
        TokenKind::XcommandDirective,
        TokenKind::TranslateDirective,
        TokenKind::XtranslateDirective,
        TokenKind::ErrorDirective,
        TokenKind::StdoutDirective,
        TokenKind::LineComment,
        TokenKind::BlockComment,
        TokenKind::Eof,
    ];

    /// Keyword spelling, if this is a keyword.
    pub fn keyword(self) -> Option<&'static str> {
        let word = match self {
            TokenKind::Function => "function",
            TokenKind::Procedure => "procedure",
            TokenKind::Return => "return",
            TokenKind::Nil => "nil",
            TokenKind::Local => "local",
            TokenKind::Static => "static",
            TokenKind::Iif => "iif",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::ElseIf => "elseif",
            TokenKind::End => "end",
            TokenKind::EndIf => "endif",
            TokenKind::While => "while",
            TokenKind::EndWhile => "endwhile",
            TokenKind::EndErr => "enderr",
            _ => return None,
        };
        Some(word)
    }

    /// Directive name without the leading `#`, if this is a directive.
    pub fn directive(self) -> Option<&'static str> {
        let name = match self {
            TokenKind::IncludeDirective => "include",
            TokenKind::DefineDirective => "define",
            TokenKind::IfdefDirective => "ifdef",
            TokenKind::IfndefDirective => "ifndef",
            TokenKind::ElifDirective => "elif",
            TokenKind::ElseDirective => "else",
            TokenKind::EndifDirective => "endif",
            TokenKind::UndefDirective => "undef",
            TokenKind::PragmaDirective => "pragma",
            TokenKind::CommandDirective => "command",
            TokenKind::XcommandDirective => "xcommand",
            TokenKind::TranslateDirective => "translate",
            TokenKind::XtranslateDirective => "xtranslate",
            TokenKind::ErrorDirective => "error",
            TokenKind::StdoutDirective => "stdout",
            _ => return None,
        };
        Some(name)
    }

    /// Two-character operator spelling.
    pub fn compound_operator(self) -> Option<&'static str> {
        let op = match self {
            TokenKind::Assign => ":=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::CaretEq => "^=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::FatArrow => "=>",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            _ => return None,
        };
        Some(op)
    }

    /// Single-character operator or punctuation.
    pub fn simple_operator(self) -> Option<&'static str> {
        let op = match self {
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Pipe => "|",
            TokenKind::Not => "!",
            TokenKind::Eq => "=",
            TokenKind::Hash => "#",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Caret => "^",
            TokenKind::Dollar => "$",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::At => "@",
            _ => return None,
        };
        Some(op)
    }

    /// Dot-delimited logical operators.
    pub fn dotted_operator(self) -> Option<&'static str> {
        match self {
            TokenKind::And => Some(".and."),
            TokenKind::Or => Some(".or."),
            _ => None,
        }
    }

    /// Canonical spelling of any fixed-spelling category.
    ///
    /// Returns `None` for names, literals, comments, directives and `Eof`,
    /// whose text comes from the source.
    pub fn spelling(self) -> Option<&'static str> {
        if let Some(word) = self.keyword() {
            return Some(word);
        }
        if let Some(op) = self.compound_operator() {
            return Some(op);
        }
        if let Some(op) = self.dotted_operator() {
            return Some(op);
        }
        self.simple_operator()
    }

    /// Literal flavour carried by a literal marker.
    pub fn literal(self) -> Option<LiteralKind> {
        match self {
            TokenKind::StrLiteral => Some(LiteralKind::String),
            TokenKind::NumLiteral => Some(LiteralKind::Number),
            TokenKind::BoolLiteral => Some(LiteralKind::Boolean),
            _ => None,
        }
    }

    pub fn is_keyword(self) -> bool {
        self.keyword().is_some()
    }

    pub fn is_directive(self) -> bool {
        self.directive().is_some()
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }

    /// Whether a token of this kind can be the last token of an operand.
    /// A `[` right after such a token is an index bracket.
    pub(crate) fn ends_operand(self) -> bool {
        matches!(
            self,
            TokenKind::Name
                | TokenKind::RightParen
                | TokenKind::RightBracket
                | TokenKind::RightBrace
                | TokenKind::StrLiteral
                | TokenKind::NumLiteral
                | TokenKind::BoolLiteral
                | TokenKind::Nil
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(spelling) = self.spelling() {
            return write!(f, "'{}'", spelling);
        }
        if let Some(name) = self.directive() {
            return write!(f, "'#{}' directive", name);
        }
        match self {
            TokenKind::StrLiteral => write!(f, "string literal"),
            TokenKind::NumLiteral => write!(f, "numeric literal"),
            TokenKind::BoolLiteral => write!(f, "boolean literal"),
            TokenKind::Name => write!(f, "identifier"),
            TokenKind::LineComment => write!(f, "line comment"),
            TokenKind::BlockComment => write!(f, "block comment"),
            TokenKind::Eof => write!(f, "end of file"),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String, // exact source text
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            text: text.into(),
            location,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end of file"),
            TokenKind::Name => write!(f, "identifier '{}'", self.text),
            TokenKind::StrLiteral
            | TokenKind::NumLiteral
            | TokenKind::BoolLiteral
            | TokenKind::LineComment
            | TokenKind::BlockComment => write!(f, "{} {}", self.kind, self.text),
            _ => write!(f, "'{}'", self.text),
        }
    }
}

/// Lexer lookup tables, keyed by spelling.
pub(crate) struct SpellingTables {
    pub keywords: FxHashMap<&'static str, TokenKind>,
    pub directives: FxHashMap<&'static str, TokenKind>,
    pub compound_operators: FxHashMap<&'static str, TokenKind>,
    pub simple_operators: FxHashMap<char, TokenKind>,
    pub dotted_operators: FxHashMap<&'static str, TokenKind>,
}

impl SpellingTables {
    fn build() -> Self {
        let mut tables = SpellingTables {
            keywords: FxHashMap::default(),
            directives: FxHashMap::default(),
            compound_operators: FxHashMap::default(),
            simple_operators: FxHashMap::default(),
            dotted_operators: FxHashMap::default(),
        };

        for &kind in TokenKind::ALL {
            if let Some(name) = kind.directive() {
                tables.directives.insert(name, kind);
            } else if let Some(word) = kind.keyword() {
                tables.keywords.insert(word, kind);
            } else if let Some(op) = kind.compound_operator() {
                tables.compound_operators.insert(op, kind);
            } else if let Some(op) = kind.simple_operator().and_then(|op| op.chars().next()) {
                tables.simple_operators.insert(op, kind);
            } else if let Some(op) = kind.dotted_operator() {
                tables.dotted_operators.insert(op, kind);
            }
        }

        tables
    }
}

/// Process-wide spelling tables, shared by every lexer.
pub(crate) static SPELLINGS: LazyLock<SpellingTables> = LazyLock::new(SpellingTables::build);

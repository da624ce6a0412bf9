//! Expression grammar tables
//!
//! The expression parser is table driven: a token either starts an
//! expression (a [`PrefixRule`]) or continues one (an [`Infix`] entry with
//! its binding power). Both tables are built once and shared.
//!
//! # Precedence
//!
//! ```text
//! lowest   :=  +=  -=  *=  /=  %=  ^=      right
//!          .or.
//!          .and.
//!          =  ==  #  !=
//!          <  <=  >  >=  $
//!          +  -
//!          *  /  %
//!          ^                               right
//!          unary  + - ! @ ++ --
//!          postfix  ++ --
//! highest  call ( )  index [ ]  field :
//! ```

use super::token::TokenKind;
use rustc_hash::FxHashMap;
use std::sync::LazyLock;

/// Binding power bands, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Precedence {
    None = 0,
    Assignment,
    Or,
    And,
    Equality,
    Ordering,
    Sum,
    Product,
    Exponent,
    Prefix,
    Postfix,
    Call,
}

impl Precedence {
    pub fn level(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// How a token starts an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixRule {
    Name,
    /// `( expr )`
    Group,
    /// `+ - ! @ ++ --`
    Unary,
    /// `{` array, hash or codeblock
    Brace,
    /// `iif( cond, a, b )`
    Conditional,
}

/// How a token continues an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixRule {
    Binary,
    Assign,
    Postfix,
    Call,
    Index,
    FieldAccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Infix {
    pub rule: InfixRule,
    pub precedence: Precedence,
    pub associativity: Associativity,
}

impl Infix {
    /// Minimum level for the right operand
    pub fn right_level(&self) -> u8 {
        match self.associativity {
            Associativity::Left => self.precedence.level(),
            Associativity::Right => self.precedence.level() - 1,
        }
    }
}

pub struct Grammar {
    prefix: FxHashMap<TokenKind, PrefixRule>,
    infix: FxHashMap<TokenKind, Infix>,
}

impl Grammar {
    fn build() -> Self {
        use Associativity::{Left, Right};
        use TokenKind as T;

        let mut grammar = Grammar {
            prefix: FxHashMap::default(),
            infix: FxHashMap::default(),
        };

        grammar.prefix.insert(T::Name, PrefixRule::Name);
        grammar.prefix.insert(T::LeftParen, PrefixRule::Group);
        grammar.prefix.insert(T::LeftBrace, PrefixRule::Brace);
        grammar.prefix.insert(T::Iif, PrefixRule::Conditional);
        for kind in [T::Plus, T::Minus, T::Not, T::At, T::PlusPlus, T::MinusMinus] {
            grammar.prefix.insert(kind, PrefixRule::Unary);
        }

        let assignment = [T::Assign, T::PlusEq, T::MinusEq, T::StarEq, T::SlashEq, T::PercentEq, T::CaretEq];
        for kind in assignment {
            grammar.add_infix(kind, InfixRule::Assign, Precedence::Assignment, Right);
        }

        let binary: [(&[TokenKind], Precedence, Associativity); 7] = [
            (&[T::Or], Precedence::Or, Left),
            (&[T::And], Precedence::And, Left),
            (&[T::Eq, T::EqEq, T::Hash, T::NotEq], Precedence::Equality, Left),
            (&[T::Lt, T::Le, T::Gt, T::Ge, T::Dollar], Precedence::Ordering, Left),
            (&[T::Plus, T::Minus], Precedence::Sum, Left),
            (&[T::Star, T::Slash, T::Percent], Precedence::Product, Left),
            (&[T::Caret], Precedence::Exponent, Right),
        ];
        for (kinds, precedence, associativity) in binary {
            for &kind in kinds {
                grammar.add_infix(kind, InfixRule::Binary, precedence, associativity);
            }
        }

        grammar.add_infix(T::PlusPlus, InfixRule::Postfix, Precedence::Postfix, Left);
        grammar.add_infix(T::MinusMinus, InfixRule::Postfix, Precedence::Postfix, Left);
        grammar.add_infix(T::LeftParen, InfixRule::Call, Precedence::Call, Left);
        grammar.add_infix(T::LeftBracket, InfixRule::Index, Precedence::Call, Left);
        grammar.add_infix(T::Colon, InfixRule::FieldAccess, Precedence::Call, Left);

        grammar
    }

    fn add_infix(
        &mut self,
        kind: TokenKind,
        rule: InfixRule,
        precedence: Precedence,
        associativity: Associativity,
    ) {
        self.infix.insert(
            kind,
            Infix {
                rule,
                precedence,
                associativity,
            },
        );
    }

    pub fn prefix_rule(&self, kind: TokenKind) -> Option<PrefixRule> {
        self.prefix.get(&kind).copied()
    }

    pub fn infix_rule(&self, kind: TokenKind) -> Option<Infix> {
        self.infix.get(&kind).copied()
    }

    /// Whether `kind` can begin an expression
    pub fn starts_expression(&self, kind: TokenKind) -> bool {
        kind.literal().is_some() || kind == TokenKind::Nil || self.prefix.contains_key(&kind)
    }
}

pub static GRAMMAR: LazyLock<Grammar> = LazyLock::new(Grammar::build);

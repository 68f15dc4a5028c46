//! Token types for the C subset.
//!
//! Tokens are a closed enum over the terminal lexical categories. Only
//! identifiers and constants carry data; everything else is a bare tag.
//! Tokens do not record source locations.

use std::fmt;

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    // === Punctuation ===
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Semicolon,
    Colon,
    Comma,
    Question,

    // === Arithmetic operators ===
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // === Bitwise operators ===
    Tilde,
    Ampersand,
    Pipe,
    Caret,
    LeftShift,
    RightShift,

    // === Logical operators ===
    Bang,
    LogicalAnd,
    LogicalOr,

    // === Relational operators ===
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    EqualEqual,
    BangEqual,

    // === Assignment operators ===
    Equal,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    AmpersandEqual,
    PipeEqual,
    CaretEqual,
    LeftShiftEqual,
    RightShiftEqual,

    // === Increment / decrement ===
    PlusPlus,
    MinusMinus,

    // === Keywords ===
    KwInt,
    KwVoid,
    KwReturn,
    KwIf,
    KwElse,
    KwGoto,

    /// An identifier, carrying its textual name.
    Identifier(String),
    /// An integer constant, carrying its decimal digits as text.
    Constant(String),
}

impl fmt::Display for Token {
    /// Writes the token's source lexeme, for use in diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lexeme = match self {
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::OpenBrace => "{",
            Token::CloseBrace => "}",
            Token::Semicolon => ";",
            Token::Colon => ":",
            Token::Comma => ",",
            Token::Question => "?",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Tilde => "~",
            Token::Ampersand => "&",
            Token::Pipe => "|",
            Token::Caret => "^",
            Token::LeftShift => "<<",
            Token::RightShift => ">>",
            Token::Bang => "!",
            Token::LogicalAnd => "&&",
            Token::LogicalOr => "||",
            Token::Less => "<",
            Token::LessEqual => "<=",
            Token::Greater => ">",
            Token::GreaterEqual => ">=",
            Token::EqualEqual => "==",
            Token::BangEqual => "!=",
            Token::Equal => "=",
            Token::PlusEqual => "+=",
            Token::MinusEqual => "-=",
            Token::StarEqual => "*=",
            Token::SlashEqual => "/=",
            Token::PercentEqual => "%=",
            Token::AmpersandEqual => "&=",
            Token::PipeEqual => "|=",
            Token::CaretEqual => "^=",
            Token::LeftShiftEqual => "<<=",
            Token::RightShiftEqual => ">>=",
            Token::PlusPlus => "++",
            Token::MinusMinus => "--",
            Token::KwInt => "int",
            Token::KwVoid => "void",
            Token::KwReturn => "return",
            Token::KwIf => "if",
            Token::KwElse => "else",
            Token::KwGoto => "goto",
            Token::Identifier(name) => name,
            Token::Constant(digits) => digits,
        };
        f.write_str(lexeme)
    }
}

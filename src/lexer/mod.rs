//! # Lexer
//!
//! Tokenizes preprocessed C source into a stream of tokens.
//!
//! The scanner runs left to right and dispatches on the leading character of
//! each token: whitespace is skipped, digits start a constant, a letter or
//! underscore starts an identifier or keyword, and punctuation runs a small
//! maximal-munch match that consumes the longest legal prefix (so `<<=` wins
//! over `<<`, which wins over `<`). `//` begins a line comment.
//!
//! The lexer never looks back. Its only failure modes are an unknown leading
//! character and a constant with a trailing letter, both fatal.

pub mod cursor;
pub mod token;


use crate::error::CompileError;
use cursor::Cursor;
use token::Token;

pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    let mut cursor = Cursor::new(source);
    let mut tokens = Vec::new();

    while !cursor.is_at_end() {
        if let Some(token) = lex_token(&mut cursor)? {
            tokens.push(token);
        }
    }

    Ok(tokens)
}

fn lex_token(cursor: &mut Cursor) -> Result<Option<Token>, CompileError> {
    while matches!(cursor.peek(), Some(c) if c.is_ascii_whitespace()) {
        cursor.advance();
    }

    let Some(ch) = cursor.peek() else {
        return Ok(None);
    };

    let token = match ch {
        '(' => single(cursor, Token::OpenParen),
        ')' => single(cursor, Token::CloseParen),
        '{' => single(cursor, Token::OpenBrace),
        '}' => single(cursor, Token::CloseBrace),
        ';' => single(cursor, Token::Semicolon),
        ':' => single(cursor, Token::Colon),
        ',' => single(cursor, Token::Comma),
        '?' => single(cursor, Token::Question),
        '~' => single(cursor, Token::Tilde),
        '/' => {
            cursor.advance();
            if cursor.eat('/') {
                skip_line_comment(cursor);
                return Ok(None);
            } else if cursor.eat('=') {
                Token::SlashEqual
            } else {
                Token::Slash
            }
        }
        '+' => {
            cursor.advance();
            if cursor.eat('+') {
                Token::PlusPlus
            } else if cursor.eat('=') {
                Token::PlusEqual
            } else {
                Token::Plus
            }
        }
        '-' => {
            cursor.advance();
            if cursor.eat('-') {
                Token::MinusMinus
            } else if cursor.eat('=') {
                Token::MinusEqual
            } else {
                Token::Minus
            }
        }
        '*' => {
            cursor.advance();
            if cursor.eat('=') {
                Token::StarEqual
            } else {
                Token::Star
            }
        }
        '%' => {
            cursor.advance();
            if cursor.eat('=') {
                Token::PercentEqual
            } else {
                Token::Percent
            }
        }
        '&' => {
            cursor.advance();
            if cursor.eat('&') {
                Token::LogicalAnd
            } else if cursor.eat('=') {
                Token::AmpersandEqual
            } else {
                Token::Ampersand
            }
        }
        '|' => {
            cursor.advance();
            if cursor.eat('|') {
                Token::LogicalOr
            } else if cursor.eat('=') {
                Token::PipeEqual
            } else {
                Token::Pipe
            }
        }
        '^' => {
            cursor.advance();
            if cursor.eat('=') {
                Token::CaretEqual
            } else {
                Token::Caret
            }
        }
        '<' => {
            cursor.advance();
            if cursor.eat('<') {
                if cursor.eat('=') {
                    Token::LeftShiftEqual
                } else {
                    Token::LeftShift
                }
            } else if cursor.eat('=') {
                Token::LessEqual
            } else {
                Token::Less
            }
        }
        '>' => {
            cursor.advance();
            if cursor.eat('>') {
                if cursor.eat('=') {
                    Token::RightShiftEqual
                } else {
                    Token::RightShift
                }
            } else if cursor.eat('=') {
                Token::GreaterEqual
            } else {
                Token::Greater
            }
        }
        '=' => {
            cursor.advance();
            if cursor.eat('=') {
                Token::EqualEqual
            } else {
                Token::Equal
            }
        }
        '!' => {
            cursor.advance();
            if cursor.eat('=') {
                Token::BangEqual
            } else {
                Token::Bang
            }
        }
        c if c.is_ascii_digit() => lex_constant(cursor)?,
        c if c.is_ascii_alphabetic() || c == '_' => lex_word(cursor),
        _ => return Err(CompileError::UnexpectedCharacter(ch)),
    };

    Ok(Some(token))
}

fn single(cursor: &mut Cursor, token: Token) -> Token {
    cursor.advance();
    token
}

/// Consume the remainder of a `//` comment.
fn skip_line_comment(cursor: &mut Cursor) {
    while matches!(cursor.peek(), Some(c) if c != '\n') {
        cursor.advance();
    }
}

/// A constant is a run of decimal digits. A letter immediately following the
/// digit run is an invalid integer suffix and fatal.
fn lex_constant(cursor: &mut Cursor) -> Result<Token, CompileError> {
    let mut digits = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_digit()) {
        digits.push(cursor.advance().unwrap());
    }

    if let Some(next) = cursor.peek() {
        if next.is_ascii_alphabetic() {
            return Err(CompileError::InvalidConstantSuffix(format!(
                "{digits}{next}"
            )));
        }
    }

    Ok(Token::Constant(digits))
}

/// Identifiers match `[A-Za-z_][A-Za-z0-9_]*`; reserved words become their
/// keyword tokens.
fn lex_word(cursor: &mut Cursor) -> Token {
    let mut word = String::new();
    while matches!(cursor.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
        word.push(cursor.advance().unwrap());
    }

    match word.as_str() {
        "int" => Token::KwInt,
        "void" => Token::KwVoid,
        "return" => Token::KwReturn,
        "if" => Token::KwIf,
        "else" => Token::KwElse,
        "goto" => Token::KwGoto,
        _ => Token::Identifier(word),
    }
}

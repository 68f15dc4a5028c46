use thiserror::Error;

/// The single fatal error type shared by every stage of the pipeline.
///
/// Compilation stops at the first error; there is no recovery and no
/// source-location tracking. Each variant's message is the full diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    // === Lexer ===
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("invalid suffix on constant '{0}'")]
    InvalidConstantSuffix(String),

    // === Parser ===
    #[error("expected {expected}, found '{found}'")]
    UnexpectedToken { expected: String, found: String },
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("unexpected token '{0}' after function body")]
    TrailingToken(String),
    #[error("constant '{0}' does not fit in a 32-bit int")]
    ConstantOutOfRange(String),

    // === Resolver ===
    #[error("'{0}' is already declared in this scope")]
    DuplicateDeclaration(String),
    #[error("use of undeclared identifier '{0}'")]
    UndeclaredIdentifier(String),
    #[error("{0} requires a variable, not an arbitrary expression")]
    InvalidLvalue(&'static str),
    #[error("label '{0}' is defined more than once")]
    DuplicateLabel(String),
    #[error("goto targets undefined label '{0}'")]
    UndefinedLabel(String),
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Lexical
    #[error("line {0}: unterminated string literal")]
    UnterminatedString(usize),

    #[error("line {line}: integer constant `{text}` out of range")]
    IntegerRange { line: usize, text: String },

    #[error("line {line}: unexpected character `{ch}`")]
    UnexpectedChar { line: usize, ch: char },

    // Syntax
    #[error("line {line}: expected {expected}, found `{found}`")]
    Expected {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("cannot retreat before the first token")]
    RetreatAtStart,

    #[error("current token is not {0}")]
    TokenMismatch(&'static str),

    // Semantic
    #[error("line {line}: undefined variable `{name}`")]
    UndefinedVariable { line: usize, name: String },

    #[error("`{0}` is already defined in this scope")]
    Redefined(String),

    #[error("cannot pop to the constant segment")]
    PopConstant,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

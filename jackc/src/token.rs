use strum::{Display, EnumString};

/// Largest value an integer constant can carry.
pub const INT_MAX: u16 = 32767;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Keyword(Keyword),
    Symbol(char),
    Ident(String),
    IntConst(u16),
    StringConst(String),
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Keyword(kw) => write!(f, "{kw}"),
            TokenKind::Symbol(ch) => write!(f, "{ch}"),
            TokenKind::Ident(name) => write!(f, "{name}"),
            TokenKind::IntConst(value) => write!(f, "{value}"),
            TokenKind::StringConst(text) => write!(f, "\"{text}\""),
        }
    }
}

/// The reserved words. An identifier-shaped lexeme matching one of these is
/// always the keyword, never an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    Class,
    Constructor,
    Function,
    Method,
    Field,
    Static,
    Var,
    Int,
    Char,
    Boolean,
    Void,
    True,
    False,
    Null,
    This,
    Let,
    Do,
    If,
    Else,
    While,
    Return,
}

/// The symbol alphabet. `^`/`#` are the shift extension operators.
pub const SYMBOLS: &str = "{}()[].,;+-*/&|<>=~^#";

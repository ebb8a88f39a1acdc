use crate::error::Error;
use crate::token::{Keyword, Token, TokenKind, INT_MAX, SYMBOLS};
use std::iter::Peekable;
use std::str::Chars;

/// Produces the full token sequence for one compilation unit. Comments and
/// whitespace vanish here; string literals pass through the comment scan
/// untouched, so `"// not a comment"` stays intact.
pub fn tokenize(source: &str) -> Result<Tokens, Error> {
    let scanner = Scanner {
        iter: source.chars().peekable(),
        line: 1,
    };
    scanner.scan()
}

// ----------------------------------------------------------------------------
// Scanner

struct Scanner<'a> {
    iter: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn consume(&mut self) -> Option<char> {
        let ch = self.iter.next();
        if ch == Some('\n') {
            self.line += 1;
        }
        ch
    }

    fn scan(mut self) -> Result<Tokens, Error> {
        let mut toks = Vec::new();
        while let Some(&ch) = self.iter.peek() {
            // 0. Whitespace separates tokens and means nothing else.
            if ch.is_whitespace() {
                self.consume();
                continue;
            }

            let line = self.line;

            // 1. Comments, or the division symbol.
            if ch == '/' {
                self.consume();
                match self.iter.peek() {
                    Some('/') => {
                        while let Some(ch) = self.consume() {
                            if ch == '\n' {
                                break;
                            }
                        }
                    }
                    Some('*') => {
                        self.consume();
                        self.block_comment();
                    }
                    _ => toks.push(Token {
                        kind: TokenKind::Symbol('/'),
                        line,
                    }),
                }
                continue;
            }

            // 2. String literal.
            if ch == '"' {
                self.consume();
                let text = self.string_literal(line)?;
                toks.push(Token {
                    kind: TokenKind::StringConst(text),
                    line,
                });
                continue;
            }

            // 3. Integer constant: a maximal digit run.
            if ch.is_ascii_digit() {
                let mut text = String::new();
                while let Some(ch) = self.iter.next_if(|c| c.is_ascii_digit()) {
                    text.push(ch);
                }
                let value = text
                    .parse::<u16>()
                    .ok()
                    .filter(|v| *v <= INT_MAX)
                    .ok_or(Error::IntegerRange { line, text })?;
                toks.push(Token {
                    kind: TokenKind::IntConst(value),
                    line,
                });
                continue;
            }

            // 4. Keyword or identifier: a maximal word run, classified after.
            if ch.is_ascii_alphabetic() || ch == '_' {
                let mut word = String::new();
                while let Some(ch) = self
                    .iter
                    .next_if(|c| c.is_ascii_alphanumeric() || *c == '_')
                {
                    word.push(ch);
                }
                let kind = match word.parse::<Keyword>() {
                    Ok(keyword) => TokenKind::Keyword(keyword),
                    Err(_) => TokenKind::Ident(word),
                };
                toks.push(Token { kind, line });
                continue;
            }

            // 5. Single-character symbol.
            if SYMBOLS.contains(ch) {
                self.consume();
                toks.push(Token {
                    kind: TokenKind::Symbol(ch),
                    line,
                });
                continue;
            }

            return Err(Error::UnexpectedChar { line, ch });
        }
        Ok(Tokens { toks, pos: 0 })
    }

    /// Skips to just past the closing `*/`. Doc comments (`/** ... */`) need
    /// no special case. An unclosed comment swallows the rest of the input.
    fn block_comment(&mut self) {
        while let Some(ch) = self.consume() {
            if ch == '*' && self.iter.peek() == Some(&'/') {
                self.consume();
                return;
            }
        }
    }

    /// Scans to the next unescaped quote. `\"` becomes a literal quote;
    /// newlines are not part of the value.
    fn string_literal(&mut self, line: usize) -> Result<String, Error> {
        let mut text = String::new();
        while let Some(ch) = self.consume() {
            match ch {
                '"' => return Ok(text),
                '\\' if self.iter.peek() == Some(&'"') => {
                    self.consume();
                    text.push('"');
                }
                '\n' => {}
                ch => text.push(ch),
            }
        }
        Err(Error::UnterminatedString(line))
    }
}

// ----------------------------------------------------------------------------
// Token stream

/// The finite, index-addressed token sequence. Forward advance plus a
/// single-step retreat is all the lookahead the grammar needs.
pub struct Tokens {
    toks: Vec<Token>,
    pos: usize,
}

impl Tokens {
    pub fn len(&self) -> usize {
        self.toks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toks.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.pos < self.toks.len()
    }

    pub fn current(&self) -> Result<&Token, Error> {
        self.toks.get(self.pos).ok_or(Error::UnexpectedEof)
    }

    /// Line of the current token; falls back to the last token's line at the
    /// end of the stream.
    pub fn line(&self) -> usize {
        self.toks
            .get(self.pos)
            .or_else(|| self.toks.last())
            .map(|t| t.line)
            .unwrap_or(0)
    }

    pub fn advance(&mut self) -> Result<(), Error> {
        if !self.has_more() {
            return Err(Error::UnexpectedEof);
        }
        self.pos += 1;
        Ok(())
    }

    pub fn retreat(&mut self) -> Result<(), Error> {
        if self.pos == 0 {
            return Err(Error::RetreatAtStart);
        }
        self.pos -= 1;
        Ok(())
    }

    pub fn keyword(&self) -> Result<Keyword, Error> {
        match self.current()?.kind {
            TokenKind::Keyword(keyword) => Ok(keyword),
            _ => Err(Error::TokenMismatch("a keyword")),
        }
    }

    pub fn symbol(&self) -> Result<char, Error> {
        match self.current()?.kind {
            TokenKind::Symbol(ch) => Ok(ch),
            _ => Err(Error::TokenMismatch("a symbol")),
        }
    }

    pub fn identifier(&self) -> Result<&str, Error> {
        match &self.current()?.kind {
            TokenKind::Ident(name) => Ok(name),
            _ => Err(Error::TokenMismatch("an identifier")),
        }
    }

    pub fn int_val(&self) -> Result<u16, Error> {
        match self.current()?.kind {
            TokenKind::IntConst(value) => Ok(value),
            _ => Err(Error::TokenMismatch("an integer constant")),
        }
    }

    pub fn string_val(&self) -> Result<&str, Error> {
        match &self.current()?.kind {
            TokenKind::StringConst(text) => Ok(text),
            _ => Err(Error::TokenMismatch("a string constant")),
        }
    }
}

mod engine;
mod error;
mod symbols;
mod token;
mod tokenizer;
mod writer;

pub use engine::CompilationEngine;
pub use error::Error;
pub use symbols::{Entry, Kind, SymbolTable};
pub use token::{Keyword, Token, TokenKind, INT_MAX};
pub use tokenizer::{tokenize, Tokens};
pub use writer::VmWriter;

use std::io::Write;

/// Compiles one class source to VM code on `out`.
pub fn compile<W: Write>(source: &str, out: W) -> Result<W, Error> {
    let toks = tokenize(source)?;
    let mut engine = CompilationEngine::new(toks, out);
    engine.compile_class()?;
    Ok(engine.into_inner())
}

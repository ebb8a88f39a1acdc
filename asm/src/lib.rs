mod codegen;
mod error;
mod parser;
mod symbols;

pub use codegen::{assemble, to_text};
pub use error::Error;
pub use parser::{parse, Command};
pub use symbols::{SymbolTable, VAR_BASE};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{file}:{line}: {msg}")]
    Syntax { file: String, line: usize, msg: String },

    #[error("Unresolved symbol: `{0}`")]
    Unresolved(String),

    #[error("Variable space exhausted at `{0}`")]
    OutOfVariables(String),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}

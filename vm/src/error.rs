use arch::Segment;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{file}:{line}: {msg}")]
    Parse { file: String, line: usize, msg: String },

    #[error("Cannot pop to the constant segment")]
    PopConstant,

    #[error("Index {1} out of range for the {0} segment")]
    SegmentRange(Segment, u16),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

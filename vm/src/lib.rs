mod codegen;
mod error;

pub use codegen::{CodeWriter, STACK_BASE};
pub use error::Error;

use arch::VmCommand;
use std::io::Write;

/// Translates one source file's worth of VM text. `file` is the stem used to
/// namespace static references.
pub fn translate<W: Write>(
    writer: &mut CodeWriter<W>,
    file: &str,
    text: &str,
) -> Result<(), Error> {
    writer.set_file(file);
    for (idx, line) in text.lines().enumerate() {
        match VmCommand::parse(line) {
            Ok(Some(cmd)) => writer.write(&cmd)?,
            Ok(None) => {}
            Err(msg) => {
                return Err(Error::Parse {
                    file: file.to_string(),
                    line: idx + 1,
                    msg,
                })
            }
        }
    }
    Ok(())
}

use crate::error::Error;
use arch::Inst;

// ----------------------------------------------------------------------------
// Command

/// One parsed instruction together with where it came from, kept so later
/// passes can report positions without re-reading the source.
#[derive(Debug, Clone)]
pub struct Command {
    pub inst: Inst,
    pub file: String,
    pub line: usize,
}

/// Parses a whole source text into commands. Blank and comment-only lines
/// are dropped here; the returned sequence is what all three passes walk.
pub fn parse(file: &str, text: &str) -> Result<Vec<Command>, Error> {
    let mut commands = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        match Inst::parse(raw) {
            Ok(Some(inst)) => commands.push(Command {
                inst,
                file: file.to_string(),
                line: idx + 1,
            }),
            Ok(None) => {}
            Err(msg) => {
                return Err(Error::Syntax {
                    file: file.to_string(),
                    line: idx + 1,
                    msg,
                })
            }
        }
    }
    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch::Addr;

    #[test]
    fn keeps_only_real_commands() {
        let src = "// add two numbers\n@2\nD=A\n\n(LOOP)\n  @LOOP // spin\n";
        let commands = parse("add.asm", src).unwrap();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[0].inst, Inst::A(Addr::Value(2)));
        assert_eq!(commands[0].line, 2);
        assert_eq!(commands[3].line, 6);
    }

    #[test]
    fn reports_position_of_bad_line() {
        let err = parse("bad.asm", "@1\nD=Q\n").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 2, .. }));
    }
}

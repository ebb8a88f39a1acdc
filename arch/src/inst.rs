use crate::comp::{Comp, Dest, Jump};
use serde::{Deserialize, Serialize};

/// Largest value an A-instruction operand can carry (15 bits).
pub const ADDR_MAX: u16 = 0x7FFF;

// ----------------------------------------------------------------------------
// Instruction

/// One line of Hack assembly. Labels occupy no instruction slot; they bind a
/// name to the address of the next real instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inst {
    /// `@value` or `@symbol`
    A(Addr),
    /// `dest=comp;jump`
    C { dest: Dest, comp: Comp, jump: Jump },
    /// `(name)`
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Addr {
    Value(u16),
    Symbol(String),
}

impl Inst {
    /// Parses one source line. Whitespace is insignificant anywhere in the
    /// line; `//` starts a comment. Blank and comment-only lines yield
    /// `None`.
    pub fn parse(line: &str) -> Result<Option<Inst>, String> {
        let code = match line.split_once("//") {
            Some((code, _)) => code,
            None => line,
        };
        let code: String = code.split_whitespace().collect();
        if code.is_empty() {
            return Ok(None);
        }

        if let Some(operand) = code.strip_prefix('@') {
            return Ok(Some(Inst::A(Addr::parse(operand)?)));
        }

        if let Some(inner) = code.strip_prefix('(') {
            let name = inner
                .strip_suffix(')')
                .ok_or_else(|| format!("Unclosed label: `{code}`"))?;
            if name.is_empty() {
                return Err(format!("Empty label: `{code}`"));
            }
            return Ok(Some(Inst::Label(name.to_string())));
        }

        let (dest, rest) = match code.split_once('=') {
            Some((dest, rest)) => (Dest::parse(dest)?, rest),
            None => (Dest::default(), code.as_str()),
        };
        let (comp, jump) = match rest.split_once(';') {
            Some((comp, jump)) => (Comp::parse(comp)?, Jump::parse(jump)?),
            None => (Comp::parse(rest)?, Jump::None),
        };
        Ok(Some(Inst::C { dest, comp, jump }))
    }
}

impl Addr {
    fn parse(operand: &str) -> Result<Addr, String> {
        if operand.is_empty() {
            return Err("Empty address operand".to_string());
        }
        if operand.bytes().all(|b| b.is_ascii_digit()) {
            let value: u16 = operand
                .parse()
                .map_err(|_| format!("Address out of range: `{operand}`"))?;
            if value > ADDR_MAX {
                return Err(format!("Address out of range: `{operand}`"));
            }
            Ok(Addr::Value(value))
        } else {
            Ok(Addr::Symbol(operand.to_string()))
        }
    }
}

impl std::fmt::Display for Inst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Inst::A(Addr::Value(v)) => write!(f, "@{v}"),
            Inst::A(Addr::Symbol(s)) => write!(f, "@{s}"),
            Inst::C { dest, comp, jump } => {
                if !dest.is_empty() {
                    write!(f, "{dest}=")?;
                }
                write!(f, "{comp}")?;
                if *jump != Jump::None {
                    write!(f, ";{jump}")?;
                }
                Ok(())
            }
            Inst::Label(name) => write!(f, "({name})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_command_shape() {
        assert_eq!(
            Inst::parse("@17").unwrap(),
            Some(Inst::A(Addr::Value(17)))
        );
        assert_eq!(
            Inst::parse("@LOOP").unwrap(),
            Some(Inst::A(Addr::Symbol("LOOP".to_string())))
        );
        assert_eq!(
            Inst::parse("(LOOP)").unwrap(),
            Some(Inst::Label("LOOP".to_string()))
        );
        assert_eq!(
            Inst::parse("D=D+A").unwrap(),
            Some(Inst::C {
                dest: Dest::parse("D").unwrap(),
                comp: Comp::DPlusA,
                jump: Jump::None,
            })
        );
        assert_eq!(
            Inst::parse("D;JGT").unwrap(),
            Some(Inst::C {
                dest: Dest::default(),
                comp: Comp::D,
                jump: Jump::Jgt,
            })
        );
        assert_eq!(
            Inst::parse("AM = M - 1 // pop").unwrap(),
            Some(Inst::C {
                dest: Dest::parse("AM").unwrap(),
                comp: Comp::MMinusOne,
                jump: Jump::None,
            })
        );
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(Inst::parse("").unwrap(), None);
        assert_eq!(Inst::parse("   ").unwrap(), None);
        assert_eq!(Inst::parse("// just a comment").unwrap(), None);
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(Inst::parse("@32768").is_err());
        assert!(Inst::parse("(OPEN").is_err());
        assert!(Inst::parse("D=D+D").is_err());
        assert!(Inst::parse("D;JXX").is_err());
    }

    #[test]
    fn numeric_symbols_are_values_not_names() {
        // A purely numeric operand is never looked up as a symbol.
        assert_eq!(Inst::parse("@0").unwrap(), Some(Inst::A(Addr::Value(0))));
        assert_eq!(
            Inst::parse("@R0").unwrap(),
            Some(Inst::A(Addr::Symbol("R0".to_string())))
        );
    }
}

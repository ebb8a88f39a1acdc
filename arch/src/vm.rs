use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ----------------------------------------------------------------------------
// Segment

/// Named addressable regions of the VM memory model.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub fn parse(s: &str) -> Result<Self, String> {
        s.parse::<Self>().map_err(|_| format!("Unknown segment: `{s}`"))
    }
}

// ----------------------------------------------------------------------------
// Arithmetic

/// The fixed operator set of the VM. `shiftleft`/`shiftright` are the
/// platform extension ops.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
    ShiftLeft,
    ShiftRight,
}

impl ArithOp {
    pub fn parse(s: &str) -> Result<Self, String> {
        s.parse::<Self>().map_err(|_| format!("Unknown operator: `{s}`"))
    }
}

// ----------------------------------------------------------------------------
// Command

/// One VM instruction. The canonical text form is
/// `mnemonic arg1 [arg2]`, one instruction per line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VmCommand {
    Arithmetic(ArithOp),
    Push(Segment, u16),
    Pop(Segment, u16),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function(String, u16),
    Call(String, u16),
    Return,
}

impl VmCommand {
    /// Parses one source line. `//` starts a comment; blank and comment-only
    /// lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<VmCommand>, String> {
        let code = match line.split_once("//") {
            Some((code, _)) => code,
            None => line,
        };
        let words: Vec<&str> = code.split_whitespace().collect();
        let Some((&mnemonic, args)) = words.split_first() else {
            return Ok(None);
        };

        let cmd = match mnemonic {
            "push" => {
                let (segment, index) = segment_and_index(args)?;
                VmCommand::Push(segment, index)
            }
            "pop" => {
                let (segment, index) = segment_and_index(args)?;
                VmCommand::Pop(segment, index)
            }
            "label" => VmCommand::Label(one_name(args)?),
            "goto" => VmCommand::Goto(one_name(args)?),
            "if-goto" => VmCommand::IfGoto(one_name(args)?),
            "function" => {
                let (name, n) = name_and_count(args)?;
                VmCommand::Function(name, n)
            }
            "call" => {
                let (name, n) = name_and_count(args)?;
                VmCommand::Call(name, n)
            }
            "return" => VmCommand::Return,
            op => VmCommand::Arithmetic(ArithOp::parse(op)?),
        };
        Ok(Some(cmd))
    }
}

fn segment_and_index(args: &[&str]) -> Result<(Segment, u16), String> {
    match args {
        [segment, index] => {
            let segment = Segment::parse(segment)?;
            let index: u16 = index
                .parse()
                .map_err(|_| format!("Cannot parse `{index}` as index"))?;
            Ok((segment, index))
        }
        _ => Err("Invalid operands: expected [segment index]".to_string()),
    }
}

fn one_name(args: &[&str]) -> Result<String, String> {
    match args {
        [name] => Ok(name.to_string()),
        _ => Err("Invalid operands: expected [name]".to_string()),
    }
}

fn name_and_count(args: &[&str]) -> Result<(String, u16), String> {
    match args {
        [name, count] => {
            let count: u16 = count
                .parse()
                .map_err(|_| format!("Cannot parse `{count}` as count"))?;
            Ok((name.to_string(), count))
        }
        _ => Err("Invalid operands: expected [name count]".to_string()),
    }
}

impl std::fmt::Display for VmCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VmCommand::Arithmetic(op) => write!(f, "{op}"),
            VmCommand::Push(segment, index) => write!(f, "push {segment} {index}"),
            VmCommand::Pop(segment, index) => write!(f, "pop {segment} {index}"),
            VmCommand::Label(name) => write!(f, "label {name}"),
            VmCommand::Goto(name) => write!(f, "goto {name}"),
            VmCommand::IfGoto(name) => write!(f, "if-goto {name}"),
            VmCommand::Function(name, n) => write!(f, "function {name} {n}"),
            VmCommand::Call(name, n) => write!(f, "call {name} {n}"),
            VmCommand::Return => write!(f, "return"),
        }
    }
}

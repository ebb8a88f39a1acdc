use crate::error::Error;
use arch::{ArithOp, Segment, VmCommand};
use std::io::Write;

// Scratch registers. R13 holds a pop target address, R14 the return frame or
// a comparison operand, R15 a comparison result.
const ADDR: &str = "R13";
const FRAME: &str = "R14";
const FLAG: &str = "R15";

/// Stack-pointer base installed by the bootstrap.
pub const STACK_BASE: u16 = 256;

// ----------------------------------------------------------------------------
// CodeWriter

/// Expands VM commands into Hack assembly on the output collaborator.
///
/// All naming state lives on the instance: the current source file (static
/// variable namespacing), the current function (label namespacing), one
/// counter per call site and one per comparison site. Independent writers
/// never share labels.
pub struct CodeWriter<W: Write> {
    out: W,
    file: String,
    function: String,
    calls: usize,
    cmps: usize,
}

impl<W: Write> CodeWriter<W> {
    pub fn new(out: W) -> Self {
        CodeWriter {
            out,
            file: String::new(),
            function: String::new(),
            calls: 0,
            cmps: 0,
        }
    }

    /// Announces that commands now come from a new source file. Only static
    /// references care: `static i` in file `Xxx` lowers to `@Xxx.i`.
    pub fn set_file(&mut self, name: &str) {
        self.file = name.to_string();
    }

    /// Emitted exactly once, ahead of all translated files: set SP to the
    /// stack base and transfer control to the program entry function.
    pub fn write_bootstrap(&mut self) -> Result<(), Error> {
        writeln!(self.out, "// bootstrap")?;
        writeln!(self.out, "@{STACK_BASE}\nD=A\n@SP\nM=D")?;
        self.function = "Bootstrap".to_string();
        self.call("Sys.init", 0)
    }

    pub fn write(&mut self, cmd: &VmCommand) -> Result<(), Error> {
        writeln!(self.out, "// {cmd}")?;
        match cmd {
            VmCommand::Arithmetic(op) => self.arithmetic(*op),
            VmCommand::Push(segment, index) => self.push(*segment, *index),
            VmCommand::Pop(segment, index) => self.pop(*segment, *index),
            VmCommand::Label(name) => self.label(name),
            VmCommand::Goto(name) => self.goto(name),
            VmCommand::IfGoto(name) => self.if_goto(name),
            VmCommand::Function(name, locals) => self.define_function(name, *locals),
            VmCommand::Call(name, args) => self.call(name, *args),
            VmCommand::Return => self.ret(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

// ----------------------------------------------------------------------------
// Arithmetic

impl<W: Write> CodeWriter<W> {
    fn arithmetic(&mut self, op: ArithOp) -> Result<(), Error> {
        match op {
            ArithOp::Add => self.binary("M=M+D"),
            ArithOp::Sub => self.binary("M=M-D"),
            ArithOp::And => self.binary("M=M&D"),
            ArithOp::Or => self.binary("M=M|D"),
            ArithOp::Neg => self.unary("M=-M"),
            ArithOp::Not => self.unary("M=!M"),
            ArithOp::ShiftLeft => self.unary("M=M<<"),
            ArithOp::ShiftRight => self.unary("M=M>>"),
            ArithOp::Eq => self.equal(),
            ArithOp::Gt => self.compare("JGT"),
            ArithOp::Lt => self.compare("JLT"),
        }
    }

    /// Pop the top into D, then combine in place with the new top.
    fn binary(&mut self, compute: &str) -> Result<(), Error> {
        writeln!(self.out, "@SP\nAM=M-1\nD=M\nA=A-1\n{compute}")?;
        Ok(())
    }

    /// Mutate the top of the stack without popping.
    fn unary(&mut self, compute: &str) -> Result<(), Error> {
        writeln!(self.out, "@SP\nA=M-1\n{compute}")?;
        Ok(())
    }

    /// `eq` survives wraparound: x-y is zero exactly when x equals y, even
    /// when the subtraction overflows.
    fn equal(&mut self) -> Result<(), Error> {
        self.cmps += 1;
        let n = self.cmps;
        writeln!(self.out, "@SP\nAM=M-1\nD=M\nA=A-1\nD=M-D\nM=0")?;
        writeln!(self.out, "@NOT_EQUAL{n}\nD;JNE")?;
        writeln!(self.out, "@SP\nA=M-1\nM=-1")?;
        writeln!(self.out, "(NOT_EQUAL{n})")?;
        Ok(())
    }

    /// `gt`/`lt` cannot simply subtract and test the sign: opposite-sign
    /// operands of large magnitude overflow the subtraction. Branch on the
    /// signs first; only same-sign operands reach the subtract path, where
    /// overflow is impossible.
    fn compare(&mut self, condition: &str) -> Result<(), Error> {
        self.cmps += 1;
        let n = self.cmps;
        let (mixed_x_neg, mixed_x_pos) = match condition {
            "JGT" => ("M=0", "M=-1"),
            _ => ("M=-1", "M=0"),
        };

        // D = y; x stays below the (already moved) stack top.
        writeln!(self.out, "@SP\nAM=M-1\nD=M")?;
        writeln!(self.out, "@Y_NEG{n}\nD;JLT")?;

        // y >= 0
        writeln!(self.out, "@{FRAME}\nM=D")?;
        writeln!(self.out, "@SP\nA=M-1\nD=M")?;
        writeln!(self.out, "@X_NEG_Y_POS{n}\nD;JLT")?;
        self.compare_same_sign(condition, n)?;

        // x < 0 <= y: the signs alone decide.
        writeln!(self.out, "(X_NEG_Y_POS{n})")?;
        writeln!(self.out, "@{FLAG}\n{mixed_x_neg}")?;
        writeln!(self.out, "@CMP_END{n}\n0;JMP")?;

        // y < 0
        writeln!(self.out, "(Y_NEG{n})")?;
        writeln!(self.out, "@{FRAME}\nM=D")?;
        writeln!(self.out, "@SP\nA=M-1\nD=M")?;
        writeln!(self.out, "@X_Y_NEG{n}\nD;JLT")?;

        // y < 0 <= x: again immediate.
        writeln!(self.out, "@{FLAG}\n{mixed_x_pos}")?;
        writeln!(self.out, "@CMP_END{n}\n0;JMP")?;

        writeln!(self.out, "(X_Y_NEG{n})")?;
        self.compare_same_sign(condition, n)?;

        // Store the flag over x, the new stack top.
        writeln!(self.out, "(CMP_END{n})")?;
        writeln!(self.out, "@{FLAG}\nD=M")?;
        writeln!(self.out, "@SP\nA=M-1\nM=D")?;
        Ok(())
    }

    fn compare_same_sign(&mut self, condition: &str, n: usize) -> Result<(), Error> {
        writeln!(self.out, "@{FRAME}\nD=D-M")?;
        writeln!(self.out, "@{FLAG}\nM=-1")?;
        writeln!(self.out, "@CMP_END{n}\nD;{condition}")?;
        writeln!(self.out, "@{FLAG}\nM=0")?;
        writeln!(self.out, "@CMP_END{n}\n0;JMP")?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Memory access

impl<W: Write> CodeWriter<W> {
    fn push(&mut self, segment: Segment, index: u16) -> Result<(), Error> {
        match segment {
            Segment::Constant => writeln!(self.out, "@{index}\nD=A")?,
            _ => {
                self.point_at(segment, index)?;
                writeln!(self.out, "D=M")?;
            }
        }
        self.push_d()
    }

    fn pop(&mut self, segment: Segment, index: u16) -> Result<(), Error> {
        if segment == Segment::Constant {
            return Err(Error::PopConstant);
        }
        self.point_at(segment, index)?;
        writeln!(self.out, "D=A")?;
        writeln!(self.out, "@{ADDR}\nM=D")?;
        writeln!(self.out, "@SP\nAM=M-1\nD=M")?;
        writeln!(self.out, "@{ADDR}\nA=M\nM=D")?;
        Ok(())
    }

    /// Leaves A addressing `segment[index]`.
    fn point_at(&mut self, segment: Segment, index: u16) -> Result<(), Error> {
        match segment {
            Segment::Local => writeln!(self.out, "@LCL\nD=M\n@{index}\nA=D+A")?,
            Segment::Argument => writeln!(self.out, "@ARG\nD=M\n@{index}\nA=D+A")?,
            Segment::This => writeln!(self.out, "@THIS\nD=M\n@{index}\nA=D+A")?,
            Segment::That => writeln!(self.out, "@THAT\nD=M\n@{index}\nA=D+A")?,
            Segment::Temp => {
                if index > 7 {
                    return Err(Error::SegmentRange(segment, index));
                }
                writeln!(self.out, "@{}", 5 + index)?;
            }
            Segment::Pointer => match index {
                0 => writeln!(self.out, "@THIS")?,
                1 => writeln!(self.out, "@THAT")?,
                _ => return Err(Error::SegmentRange(segment, index)),
            },
            Segment::Static => writeln!(self.out, "@{}.{index}", self.file)?,
            Segment::Constant => unreachable!("constant is not addressable"),
        }
        Ok(())
    }

    fn push_d(&mut self) -> Result<(), Error> {
        writeln!(self.out, "@SP\nA=M\nM=D\n@SP\nM=M+1")?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Branching

impl<W: Write> CodeWriter<W> {
    fn scoped(&self, label: &str) -> String {
        format!("{}${}", self.function, label)
    }

    fn label(&mut self, label: &str) -> Result<(), Error> {
        writeln!(self.out, "({})", self.scoped(label))?;
        Ok(())
    }

    fn goto(&mut self, label: &str) -> Result<(), Error> {
        writeln!(self.out, "@{}\n0;JMP", self.scoped(label))?;
        Ok(())
    }

    fn if_goto(&mut self, label: &str) -> Result<(), Error> {
        writeln!(self.out, "@SP\nAM=M-1\nD=M")?;
        writeln!(self.out, "@{}\nD;JNE", self.scoped(label))?;
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Function protocol

impl<W: Write> CodeWriter<W> {
    fn define_function(&mut self, name: &str, locals: u16) -> Result<(), Error> {
        self.function = name.to_string();
        writeln!(self.out, "({name})")?;
        for _ in 0..locals {
            writeln!(self.out, "@SP\nA=M\nM=0\n@SP\nM=M+1")?;
        }
        Ok(())
    }

    fn call(&mut self, name: &str, args: u16) -> Result<(), Error> {
        self.calls += 1;
        let ret = format!("{}$ret.{}", self.function, self.calls);

        writeln!(self.out, "@{ret}\nD=A")?;
        self.push_d()?;
        for saved in ["LCL", "ARG", "THIS", "THAT"] {
            writeln!(self.out, "@{saved}\nD=M")?;
            self.push_d()?;
        }
        // ARG = SP - 5 - args, LCL = SP
        writeln!(self.out, "@{}\nD=A\n@SP\nD=M-D\n@ARG\nM=D", args + 5)?;
        writeln!(self.out, "@SP\nD=M\n@LCL\nM=D")?;
        writeln!(self.out, "@{name}\n0;JMP")?;
        writeln!(self.out, "({ret})")?;
        Ok(())
    }

    /// Result relocation must precede pointer restoration: once ARG is
    /// restored the caller's slot can no longer be found.
    fn ret(&mut self) -> Result<(), Error> {
        // frame = LCL; return address = *(frame - 5)
        writeln!(self.out, "@LCL\nD=M\n@{FRAME}\nM=D")?;
        writeln!(self.out, "@5\nA=D-A\nD=M\n@{ADDR}\nM=D")?;
        // *ARG = pop(); SP = ARG + 1
        writeln!(self.out, "@SP\nA=M-1\nD=M\n@ARG\nA=M\nM=D")?;
        writeln!(self.out, "@ARG\nD=M+1\n@SP\nM=D")?;
        // Restore THAT, THIS, ARG, LCL from frame-1 .. frame-4.
        for (offset, saved) in ["THAT", "THIS", "ARG", "LCL"].iter().enumerate() {
            writeln!(self.out, "@{FRAME}\nD=M\n@{}\nA=D-A\nD=M", offset + 1)?;
            writeln!(self.out, "@{saved}\nM=D")?;
        }
        writeln!(self.out, "@{ADDR}\nA=M\n0;JMP")?;
        Ok(())
    }
}

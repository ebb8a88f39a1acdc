use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

// ----------------------------------------------------------------------------
// Comp

/// Computation mnemonics of a C-instruction. The set is closed: anything not
/// listed here is not a Hack computation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
pub enum Comp {
    #[strum(serialize = "0")]
    Zero,
    #[strum(serialize = "1")]
    One,
    #[strum(serialize = "-1")]
    NegOne,
    #[strum(serialize = "D")]
    D,
    #[strum(serialize = "A")]
    A,
    #[strum(serialize = "M")]
    M,
    #[strum(serialize = "!D")]
    NotD,
    #[strum(serialize = "!A")]
    NotA,
    #[strum(serialize = "!M")]
    NotM,
    #[strum(serialize = "-D")]
    NegD,
    #[strum(serialize = "-A")]
    NegA,
    #[strum(serialize = "-M")]
    NegM,
    #[strum(serialize = "D+1")]
    DPlusOne,
    #[strum(serialize = "A+1")]
    APlusOne,
    #[strum(serialize = "M+1")]
    MPlusOne,
    #[strum(serialize = "D-1")]
    DMinusOne,
    #[strum(serialize = "A-1")]
    AMinusOne,
    #[strum(serialize = "M-1")]
    MMinusOne,
    #[strum(serialize = "D+A")]
    DPlusA,
    #[strum(serialize = "D+M")]
    DPlusM,
    #[strum(serialize = "D-A")]
    DMinusA,
    #[strum(serialize = "D-M")]
    DMinusM,
    #[strum(serialize = "A-D")]
    AMinusD,
    #[strum(serialize = "M-D")]
    MMinusD,
    #[strum(serialize = "D&A")]
    DAndA,
    #[strum(serialize = "D&M")]
    DAndM,
    #[strum(serialize = "D|A")]
    DOrA,
    #[strum(serialize = "D|M")]
    DOrM,
    #[strum(serialize = "A<<")]
    ShlA,
    #[strum(serialize = "D<<")]
    ShlD,
    #[strum(serialize = "M<<")]
    ShlM,
    #[strum(serialize = "A>>")]
    ShrA,
    #[strum(serialize = "D>>")]
    ShrD,
    #[strum(serialize = "M>>")]
    ShrM,
}

impl Comp {
    pub fn parse(s: &str) -> Result<Self, String> {
        s.parse::<Self>()
            .map_err(|_| format!("Unknown computation: `{s}`"))
    }

    /// True for the `<<`/`>>` extension mnemonics, which are emitted with the
    /// `101` instruction prefix instead of `111`.
    pub fn is_shift(self) -> bool {
        use Comp::*;
        matches!(self, ShlA | ShlD | ShlM | ShrA | ShrD | ShrM)
    }

    /// The a-bit and the six c-bits, packed as a 7-bit `0b a_cccccc` value.
    /// A- and M-forms share c-bits; the a-bit selects which operand feeds
    /// the ALU.
    pub fn code(self) -> u16 {
        use Comp::*;
        match self {
            Zero => 0b0_101010,
            One => 0b0_111111,
            NegOne => 0b0_111010,
            D => 0b0_001100,
            A => 0b0_110000,
            M => 0b1_110000,
            NotD => 0b0_001101,
            NotA => 0b0_110001,
            NotM => 0b1_110001,
            NegD => 0b0_001111,
            NegA => 0b0_110011,
            NegM => 0b1_110011,
            DPlusOne => 0b0_011111,
            APlusOne => 0b0_110111,
            MPlusOne => 0b1_110111,
            DMinusOne => 0b0_001110,
            AMinusOne => 0b0_110010,
            MMinusOne => 0b1_110010,
            DPlusA => 0b0_000010,
            DPlusM => 0b1_000010,
            DMinusA => 0b0_010011,
            DMinusM => 0b1_010011,
            AMinusD => 0b0_000111,
            MMinusD => 0b1_000111,
            DAndA => 0b0_000000,
            DAndM => 0b1_000000,
            DOrA => 0b0_010101,
            DOrM => 0b1_010101,
            ShlA => 0b0_100000,
            ShlD => 0b0_110000,
            ShlM => 0b1_100000,
            ShrA => 0b0_000000,
            ShrD => 0b0_010000,
            ShrM => 0b1_000000,
        }
    }
}

// ----------------------------------------------------------------------------
// Dest

/// Destination field of a C-instruction. One independent bit per writable
/// location, so any combination of A, D and M is expressible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dest {
    pub a: bool,
    pub d: bool,
    pub m: bool,
}

impl Dest {
    pub fn parse(s: &str) -> Result<Self, String> {
        let mut dest = Dest::default();
        for ch in s.chars() {
            match ch {
                'A' => dest.a = true,
                'D' => dest.d = true,
                'M' => dest.m = true,
                _ => return Err(format!("Unknown destination: `{s}`")),
            }
        }
        Ok(dest)
    }

    pub fn is_empty(self) -> bool {
        !(self.a || self.d || self.m)
    }

    /// 3-bit `a d m` code.
    pub fn code(self) -> u16 {
        (self.a as u16) << 2 | (self.d as u16) << 1 | self.m as u16
    }
}

impl std::fmt::Display for Dest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.a {
            write!(f, "A")?;
        }
        if self.d {
            write!(f, "D")?;
        }
        if self.m {
            write!(f, "M")?;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Jump

/// Jump field of a C-instruction. Discriminants are the 3-bit jump codes; an
/// absent mnemonic is `None` (0b000).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoPrimitive,
    TryFromPrimitive,
)]
#[repr(u8)]
pub enum Jump {
    #[default]
    None = 0b000,
    Jgt = 0b001,
    Jeq = 0b010,
    Jge = 0b011,
    Jlt = 0b100,
    Jne = 0b101,
    Jle = 0b110,
    Jmp = 0b111,
}

impl Jump {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "" => Ok(Jump::None),
            "JGT" => Ok(Jump::Jgt),
            "JEQ" => Ok(Jump::Jeq),
            "JGE" => Ok(Jump::Jge),
            "JLT" => Ok(Jump::Jlt),
            "JNE" => Ok(Jump::Jne),
            "JLE" => Ok(Jump::Jle),
            "JMP" => Ok(Jump::Jmp),
            _ => Err(format!("Unknown jump: `{s}`")),
        }
    }

    pub fn code(self) -> u16 {
        u8::from(self) as u16
    }

    /// Whether the condition holds for an ALU result.
    pub fn taken(self, out: i16) -> bool {
        match self {
            Jump::None => false,
            Jump::Jgt => out > 0,
            Jump::Jeq => out == 0,
            Jump::Jge => out >= 0,
            Jump::Jlt => out < 0,
            Jump::Jne => out != 0,
            Jump::Jle => out <= 0,
            Jump::Jmp => true,
        }
    }
}

impl std::fmt::Display for Jump {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Jump::None => "",
            Jump::Jgt => "JGT",
            Jump::Jeq => "JEQ",
            Jump::Jge => "JGE",
            Jump::Jlt => "JLT",
            Jump::Jne => "JNE",
            Jump::Jle => "JLE",
            Jump::Jmp => "JMP",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(comp: Comp, dest: Dest, jump: Jump) -> u16 {
        let prefix = if comp.is_shift() { 0b101 } else { 0b111 };
        prefix << 13 | comp.code() << 6 | dest.code() << 3 | jump.code()
    }

    #[test]
    fn comp_codes_match_reference_table() {
        let cases = [
            ("0", 0b1110101010_u16),
            ("1", 0b1110111111),
            ("-1", 0b1110111010),
            ("D", 0b1110001100),
            ("M", 0b1111110000),
            ("A", 0b1110110000),
            ("!D", 0b1110001101),
            ("!M", 0b1111110001),
            ("-D", 0b1110001111),
            ("-M", 0b1111110011),
            ("D+1", 0b1110011111),
            ("M+1", 0b1111110111),
            ("D-1", 0b1110001110),
            ("M-1", 0b1111110010),
            ("D+M", 0b1111000010),
            ("D-M", 0b1111010011),
            ("M-D", 0b1111000111),
            ("D&M", 0b1111000000),
            ("D|M", 0b1111010101),
            ("D|A", 0b1110010101),
            ("A<<", 0b1010100000),
            ("D<<", 0b1010110000),
            ("M<<", 0b1011100000),
            ("M>>", 0b1011000000),
        ];
        for (mnemonic, expect) in cases {
            let comp = Comp::parse(mnemonic).unwrap();
            let prefix = if comp.is_shift() { 0b101 } else { 0b111 };
            assert_eq!(prefix << 7 | comp.code(), expect, "comp bits for `{mnemonic}`");
        }
    }

    #[test]
    fn full_word_packing() {
        // D=A
        assert_eq!(
            word(Comp::A, Dest::parse("D").unwrap(), Jump::None),
            0b1110110000010000
        );
        // M=D
        assert_eq!(
            word(Comp::D, Dest::parse("M").unwrap(), Jump::None),
            0b1110001100001000
        );
        // AM=M-1
        assert_eq!(
            word(Comp::MMinusOne, Dest::parse("AM").unwrap(), Jump::None),
            0b1111110010101000
        );
        // 0;JMP
        assert_eq!(
            word(Comp::Zero, Dest::default(), Jump::Jmp),
            0b1110101010000111
        );
    }

    #[test]
    fn rejects_unknown_mnemonics() {
        assert!(Comp::parse("D+D").is_err());
        assert!(Dest::parse("X").is_err());
        assert!(Jump::parse("JJJ").is_err());
        assert_eq!(Jump::parse("").unwrap(), Jump::None);
    }

    #[test]
    fn mnemonics_round_trip() {
        for s in ["D+M", "A-1", "M<<", "0"] {
            assert_eq!(Comp::parse(s).unwrap().to_string(), s);
        }
        assert_eq!(Dest::parse("AMD").unwrap().to_string(), "ADM");
        assert_eq!(Jump::Jne.to_string(), "JNE");
    }
}

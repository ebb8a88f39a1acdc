use crate::error::Error;
use crate::parser::Command;
use crate::symbols::SymbolTable;
use arch::{Addr, Inst};

/// Resolves symbols and emits one 16-bit word per real instruction.
///
/// Three walks over the same command sequence: labels first (so forward
/// references work), then variables in first-seen order, then emission.
pub fn assemble(commands: &[Command]) -> Result<Vec<u16>, Error> {
    let mut symbols = SymbolTable::new();
    collect_labels(commands, &mut symbols);
    collect_variables(commands, &mut symbols)?;
    emit(commands, &symbols)
}

/// Pass 1: each label binds to the index of the next real instruction.
/// Label declarations occupy no slot themselves.
fn collect_labels(commands: &[Command], symbols: &mut SymbolTable) {
    let mut addr: u16 = 0;
    for command in commands {
        match &command.inst {
            Inst::Label(name) => symbols.add_label(name, addr),
            _ => addr += 1,
        }
    }
}

/// Pass 2: every symbolic A-operand not yet known becomes a variable,
/// numbered in first-encountered order.
fn collect_variables(commands: &[Command], symbols: &mut SymbolTable) -> Result<(), Error> {
    for command in commands {
        if let Inst::A(Addr::Symbol(name)) = &command.inst {
            if !symbols.contains(name) {
                symbols
                    .add_variable(name)
                    .ok_or_else(|| Error::OutOfVariables(name.clone()))?;
            }
        }
    }
    Ok(())
}

/// Pass 3: emission against the now-complete symbol table.
fn emit(commands: &[Command], symbols: &SymbolTable) -> Result<Vec<u16>, Error> {
    let mut words = Vec::new();
    for command in commands {
        match &command.inst {
            Inst::A(Addr::Value(value)) => words.push(*value),
            Inst::A(Addr::Symbol(name)) => {
                let addr = symbols
                    .get(name)
                    .ok_or_else(|| Error::Unresolved(name.clone()))?;
                words.push(addr);
            }
            Inst::C { dest, comp, jump } => {
                let prefix = if comp.is_shift() { 0b101 } else { 0b111 };
                words.push(prefix << 13 | comp.code() << 6 | dest.code() << 3 | jump.code());
            }
            Inst::Label(_) => {}
        }
    }
    Ok(words)
}

/// The terminal text format: one 16-character binary line per word.
pub fn to_text(words: &[u16]) -> String {
    let mut out = String::new();
    for word in words {
        out.push_str(&format!("{word:016b}\n"));
    }
    out
}

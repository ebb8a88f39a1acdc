use indexmap::IndexMap;
use once_cell::sync::Lazy;

/// First RAM address handed to program variables.
pub const VAR_BASE: u16 = 16;

/// Symbols every program can use without declaring them.
static PREDEFINED: Lazy<IndexMap<&'static str, u16>> = Lazy::new(|| {
    let mut map = IndexMap::new();
    map.insert("SP", 0);
    map.insert("LCL", 1);
    map.insert("ARG", 2);
    map.insert("THIS", 3);
    map.insert("THAT", 4);
    for (i, name) in [
        "R0", "R1", "R2", "R3", "R4", "R5", "R6", "R7", "R8", "R9", "R10", "R11", "R12",
        "R13", "R14", "R15",
    ]
    .iter()
    .enumerate()
    {
        map.insert(name, i as u16);
    }
    map.insert("SCREEN", 16384);
    map.insert("KBD", 24576);
    map
});

// ----------------------------------------------------------------------------
// Symbol table

/// Name → address map for one assembly run. Labels are entered by pass 1,
/// variables by pass 2 in first-seen order from `VAR_BASE` upward.
pub struct SymbolTable {
    map: IndexMap<String, u16>,
    next_var: u16,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            map: PREDEFINED
                .iter()
                .map(|(name, addr)| (name.to_string(), *addr))
                .collect(),
            next_var: VAR_BASE,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.map.get(name).copied()
    }

    pub fn add_label(&mut self, name: &str, addr: u16) {
        self.map.insert(name.to_string(), addr);
    }

    /// Allocates the next free variable slot. Returns `None` once the
    /// variable cursor would leave the addressable range.
    pub fn add_variable(&mut self, name: &str) -> Option<u16> {
        if self.next_var > arch::inst::ADDR_MAX {
            return None;
        }
        let addr = self.next_var;
        self.map.insert(name.to_string(), addr);
        self.next_var += 1;
        Some(addr)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefined_symbols_are_present() {
        let table = SymbolTable::new();
        assert_eq!(table.get("SP"), Some(0));
        assert_eq!(table.get("THAT"), Some(4));
        assert_eq!(table.get("R13"), Some(13));
        assert_eq!(table.get("SCREEN"), Some(16384));
        assert_eq!(table.get("KBD"), Some(24576));
    }

    #[test]
    fn variables_allocate_sequentially_from_base() {
        let mut table = SymbolTable::new();
        assert_eq!(table.add_variable("i"), Some(16));
        assert_eq!(table.add_variable("sum"), Some(17));
        assert_eq!(table.get("i"), Some(16));
    }
}

use crate::error::Error;
use arch::Segment;
use indexmap::IndexMap;

// ----------------------------------------------------------------------------
// Kind

/// Storage class of a declared name. Static and Field live for the class;
/// Arg and Var live for one subroutine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Static,
    Field,
    Arg,
    Var,
}

impl Kind {
    /// The VM segment this storage class lowers to.
    pub fn segment(self) -> Segment {
        match self {
            Kind::Static => Segment::Static,
            Kind::Field => Segment::This,
            Kind::Arg => Segment::Argument,
            Kind::Var => Segment::Local,
        }
    }

    fn is_class_scope(self) -> bool {
        matches!(self, Kind::Static | Kind::Field)
    }
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub ty: String,
    pub kind: Kind,
    pub index: u16,
}

// ----------------------------------------------------------------------------
// Symbol table

/// Two nested lifetimes: the class scope lasts the whole compilation unit,
/// the subroutine scope is discarded wholesale at each subroutine boundary.
#[derive(Default)]
pub struct SymbolTable {
    class: IndexMap<String, Entry>,
    subroutine: IndexMap<String, Entry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh subroutine scope. Class entries are untouched.
    pub fn start_subroutine(&mut self) {
        self.subroutine.clear();
    }

    /// Inserts a name, assigning the next index among its kind within the
    /// owning scope. Redefining a name its scope already holds is an error.
    pub fn define(&mut self, name: &str, ty: &str, kind: Kind) -> Result<(), Error> {
        let scope = if kind.is_class_scope() {
            &mut self.class
        } else {
            &mut self.subroutine
        };
        if scope.contains_key(name) {
            return Err(Error::Redefined(name.to_string()));
        }
        let index = scope.values().filter(|e| e.kind == kind).count() as u16;
        scope.insert(
            name.to_string(),
            Entry {
                ty: ty.to_string(),
                kind,
                index,
            },
        );
        Ok(())
    }

    /// Resolves a name, subroutine scope first. An unknown name is `None`,
    /// never a partial answer.
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.subroutine.get(name).or_else(|| self.class.get(name))
    }

    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.get(name).map(|e| e.kind)
    }

    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.get(name).map(|e| e.ty.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.get(name).map(|e| e.index)
    }

    /// Number of entries of `kind` in the scope that owns it.
    pub fn var_count(&self, kind: Kind) -> u16 {
        let scope = if kind.is_class_scope() {
            &self.class
        } else {
            &self.subroutine
        };
        scope.values().filter(|e| e.kind == kind).count() as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_count_per_kind_per_scope() {
        let mut table = SymbolTable::new();
        table.define("a", "int", Kind::Field).unwrap();
        table.define("b", "int", Kind::Field).unwrap();
        table.define("c", "int", Kind::Static).unwrap();
        table.define("x", "int", Kind::Arg).unwrap();
        table.define("y", "Point", Kind::Var).unwrap();
        table.define("z", "int", Kind::Var).unwrap();

        assert_eq!(table.index_of("b"), Some(1));
        assert_eq!(table.index_of("c"), Some(0));
        assert_eq!(table.index_of("x"), Some(0));
        assert_eq!(table.index_of("z"), Some(1));
        assert_eq!(table.var_count(Kind::Field), 2);
        assert_eq!(table.var_count(Kind::Var), 2);
    }

    #[test]
    fn subroutine_scope_shadows_and_resets() {
        let mut table = SymbolTable::new();
        table.define("value", "int", Kind::Field).unwrap();
        table.define("value", "boolean", Kind::Var).unwrap();
        assert_eq!(table.type_of("value"), Some("boolean"));

        table.start_subroutine();
        assert_eq!(table.type_of("value"), Some("int"));
        assert_eq!(table.kind_of("value"), Some(Kind::Field));
        assert_eq!(table.var_count(Kind::Var), 0);
    }

    #[test]
    fn unknown_names_resolve_to_nothing() {
        let table = SymbolTable::new();
        assert!(table.get("ghost").is_none());
        assert_eq!(table.index_of("ghost"), None);
    }

    #[test]
    fn redefinition_in_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        table.define("twice", "int", Kind::Var).unwrap();
        assert!(matches!(
            table.define("twice", "int", Kind::Var),
            Err(Error::Redefined(_))
        ));
        // Fresh subroutine scope frees the name again.
        table.start_subroutine();
        table.define("twice", "char", Kind::Arg).unwrap();
    }
}

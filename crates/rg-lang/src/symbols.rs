use crate::types::Type;

/// A named, typed slot visible to an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
}

/// Ordered symbol table. Slot `i` of a compiled expression reads value `i`
/// of the value list passed to [`CompiledExpr::eval`](crate::CompiledExpr::eval).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a symbol; returns its slot index.
    pub fn push(&mut self, name: impl Into<String>, ty: Type) -> usize {
        self.symbols.push(Symbol {
            name: name.into(),
            ty,
        });
        self.symbols.len() - 1
    }

    /// Resolve a name to its slot. Later declarations shadow earlier ones.
    pub fn resolve(&self, name: &str) -> Option<(usize, &Type)> {
        self.symbols
            .iter()
            .enumerate()
            .rev()
            .find(|(_, s)| s.name == name)
            .map(|(i, s)| (i, &s.ty))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}

impl<S: Into<String>> FromIterator<(S, Type)> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = (S, Type)>>(iter: I) -> Self {
        let mut table = SymbolTable::new();
        for (name, ty) in iter {
            table.push(name, ty);
        }
        table
    }
}

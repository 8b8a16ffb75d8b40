//! Manages labels and the instruction index each one names.
//!
//! The table is filled completely while collecting lines, before any
//! instruction is encoded, so jumps may refer to labels defined further down.
use std::collections::HashMap;

use crate::error::ErrorKind;

/// A label defined in the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    name: String,
    /// Zero-based index of the instruction following the label.
    index: usize,
    /// Line where the label was defined.
    defined_at_line: usize,
}

impl Symbol {
    pub fn new(name: String, index: usize, defined_at_line: usize) -> Self {
        Symbol {
            name,
            index,
            defined_at_line,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn defined_at_line(&self) -> usize {
        self.defined_at_line
    }
}

/// Label name to instruction index.
#[derive(Debug, Default)]
pub struct SymbolTable {
    table: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Defines a label. A name can only be defined once.
    pub fn define(&mut self, name: &str, index: usize, line: usize) -> Result<(), ErrorKind> {
        if self.table.contains_key(name) {
            return Err(ErrorKind::DuplicateLabel(name.to_string()));
        }
        self.table
            .insert(name.to_string(), Symbol::new(name.to_string(), index, line));
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.table.get(name)
    }

    /// Instruction index of `name`, if defined.
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.lookup(name).map(Symbol::index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Symbol)> {
        self.table.iter()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_symbol_table() {
        let st = SymbolTable::new();
        assert!(st.is_empty());
        assert_eq!(st.len(), 0);
    }

    #[test]
    fn test_define_and_lookup() {
        let mut st = SymbolTable::new();
        assert!(st.define("loop", 3, 5).is_ok());
        assert_eq!(st.len(), 1);

        let symbol = st.lookup("loop").unwrap();
        assert_eq!(symbol.name(), "loop");
        assert_eq!(symbol.index(), 3);
        assert_eq!(symbol.defined_at_line(), 5);
        assert_eq!(st.resolve("loop"), Some(3));
        assert_eq!(st.resolve("other"), None);
    }

    #[test]
    fn test_redefinition_error() {
        let mut st = SymbolTable::new();
        st.define("top", 0, 1).unwrap();
        let result = st.define("top", 4, 10);

        assert_eq!(result, Err(ErrorKind::DuplicateLabel("top".to_string())));
        assert_eq!(st.len(), 1);
        assert_eq!(st.resolve("top"), Some(0));
    }

    #[test]
    fn test_iter() {
        let mut st = SymbolTable::new();
        st.define("a", 0, 1).unwrap();
        st.define("b", 2, 4).unwrap();

        let mut names: Vec<_> = st.iter().map(|(name, sym)| (name.clone(), sym.index())).collect();
        names.sort();
        assert_eq!(names, vec![("a".to_string(), 0), ("b".to_string(), 2)]);
    }
}

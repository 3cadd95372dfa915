use std::collections::HashMap;

use super::SemanticError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolType {
    Integer,
    Str,
    Unknown,
}

impl SymbolType {
    /// Name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            SymbolType::Integer => "INTEGER",
            SymbolType::Str => "STRING",
            SymbolType::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: SymbolType,
    pub declared: bool,
    pub initialized: bool,
    pub line: usize,
}

/// Per-name symbol entries, append-only: redeclaring a name is rejected.
///
/// The parent link supports lexical nesting, but the language never opens a
/// second scope, so in practice the root table is the only one populated.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
    parent: Option<Box<SymbolTable>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(
        &mut self,
        name: &str,
        ty: SymbolType,
        line: usize,
    ) -> Result<(), SemanticError> {
        if self.symbols.contains_key(name) {
            return Err(SemanticError(format!(
                "Variable '{}' already declared at line {}",
                name, line
            )));
        }
        self.symbols.insert(
            name.to_string(),
            Symbol {
                name: name.to_string(),
                ty,
                declared: true,
                initialized: false,
                line,
            },
        );
        Ok(())
    }

    /// Looks a name up in this scope, then in enclosing scopes.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        if let Some(symbol) = self.symbols.get(name) {
            return Some(symbol);
        }
        self.parent.as_deref().and_then(|p| p.lookup(name))
    }

    pub fn set_initialized(&mut self, name: &str) -> Result<(), SemanticError> {
        if let Some(symbol) = self.symbols.get_mut(name) {
            symbol.initialized = true;
            return Ok(());
        }
        if let Some(parent) = self.parent.as_deref_mut() {
            return parent.set_initialized(name);
        }
        Err(SemanticError(format!("Variable '{}' not found", name)))
    }

    /// All symbols, sorted by name for stable diagnostic output.
    pub fn all_symbols(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self.symbols.values().collect();
        if let Some(parent) = self.parent.as_deref() {
            // shadowed parent entries are overridden by this scope's
            for symbol in parent.all_symbols() {
                if !self.symbols.contains_key(&symbol.name) {
                    symbols.push(symbol);
                }
            }
        }
        symbols.sort_by(|a, b| a.name.cmp(&b.name));
        symbols
    }
}

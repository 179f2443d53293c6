use crate::bytecode::symbol_scope::SymbolScope;

/// Where an `Outer` symbol's underlying binding actually lives: `level`
/// frames up from the scope that resolved it, under `scope`/`index` there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OuterPointer {
    pub level: usize,
    pub scope: SymbolScope,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub scope: SymbolScope,
    pub index: usize,
    pub ptr: Option<OuterPointer>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, scope: SymbolScope, index: usize) -> Self {
        Self {
            name: name.into(),
            scope,
            index,
            ptr: None,
        }
    }

    pub fn outer(name: impl Into<String>, ptr: OuterPointer) -> Self {
        Self {
            name: name.into(),
            scope: SymbolScope::Outer,
            index: 0,
            ptr: Some(ptr),
        }
    }

    pub fn is_local(&self) -> bool {
        self.scope == SymbolScope::Local
    }

    pub fn is_global(&self) -> bool {
        self.scope == SymbolScope::Global
    }

    pub fn is_function(&self) -> bool {
        self.scope == SymbolScope::Function
    }

    pub fn is_outer(&self) -> bool {
        self.scope == SymbolScope::Outer
    }
}

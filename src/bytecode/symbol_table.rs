use std::collections::HashMap;

use crate::bytecode::symbol::{OuterPointer, Symbol};
use crate::bytecode::symbol_scope::SymbolScope;

/// Lexical scope chain used by both the analyzer and the compiler. Each
/// function body and each `while` body gets its own table enclosing the
/// one it is nested in.
///
/// `while` bodies are special: they enclose the surrounding scope with
/// `inside_loop` set, which makes names resolved through them come back
/// as `Outer` symbols instead of being promoted to closure `Free`
/// variables. This is what lets a loop body read and reassign locals of
/// the function it lives in without needing to be its own closure.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    outer: Option<Box<SymbolTable>>,
    store: HashMap<String, Symbol>,
    num_definitions: usize,
    free_symbols: Vec<Symbol>,
    inside_loop: bool,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            outer: None,
            store: HashMap::new(),
            num_definitions: 0,
            free_symbols: Vec::new(),
            inside_loop: false,
        }
    }

    /// A loop scope does not get its own runtime frame: its body is
    /// appended inline into the enclosing function's instructions, so any
    /// `let` inside it must address the same local slots. Its local
    /// numbering therefore continues from the parent's count instead of
    /// restarting at 0; `into_outer` carries the final count back up.
    pub fn new_enclosed(outer: SymbolTable, inside_loop: bool) -> Self {
        let num_definitions = if inside_loop { outer.num_definitions } else { 0 };
        Self {
            outer: Some(Box::new(outer)),
            store: HashMap::new(),
            num_definitions,
            free_symbols: Vec::new(),
            inside_loop,
        }
    }

    pub fn is_global(&self) -> bool {
        self.outer.is_none()
    }

    pub fn inside_loop(&self) -> bool {
        self.inside_loop
    }

    pub fn num_definitions(&self) -> usize {
        self.num_definitions
    }

    pub fn free_symbols(&self) -> &[Symbol] {
        &self.free_symbols
    }

    /// Reclaims ownership of the enclosing table, mirroring how the
    /// compiler pops a compilation scope back to its parent. A loop
    /// scope's final local count is carried back into the parent, since
    /// the two share one runtime frame.
    pub fn into_outer(self) -> Option<SymbolTable> {
        let inside_loop = self.inside_loop;
        let num_definitions = self.num_definitions;
        self.outer.map(|boxed| {
            let mut outer = *boxed;
            if inside_loop {
                outer.num_definitions = num_definitions;
            }
            outer
        })
    }

    /// A table shares the global table's runtime frame if it *is* the
    /// global table, or if it's a loop scope sitting directly on top of one
    /// that does — a `while` body never gets its own frame, so a chain of
    /// nested top-level loop scopes still executes in the same frame as the
    /// program's globals. A function body breaks the chain: it always gets
    /// its own frame, loop-flagged or not.
    fn shares_global_frame(&self) -> bool {
        match &self.outer {
            None => true,
            Some(outer) => self.inside_loop && outer.shares_global_frame(),
        }
    }

    pub fn define(&mut self, name: impl Into<String>) -> Symbol {
        let name = name.into();
        let scope = if self.shares_global_frame() {
            SymbolScope::Global
        } else {
            SymbolScope::Local
        };
        let symbol = Symbol::new(name.clone(), scope, self.num_definitions);
        self.num_definitions += 1;
        self.store.insert(name, symbol.clone());
        symbol
    }

    pub fn define_builtin(&mut self, index: usize, name: impl Into<String>) -> Symbol {
        let name = name.into();
        let symbol = Symbol::new(name.clone(), SymbolScope::Builtin, index);
        self.store.insert(name, symbol.clone());
        symbol
    }

    pub fn define_function_name(&mut self, name: impl Into<String>) -> Symbol {
        let name = name.into();
        let symbol = Symbol::new(name.clone(), SymbolScope::Function, 0);
        self.store.insert(name, symbol.clone());
        symbol
    }

    fn define_free(&mut self, original: Symbol) -> Symbol {
        self.free_symbols.push(original.clone());
        let symbol = Symbol::new(
            original.name.clone(),
            SymbolScope::Free,
            self.free_symbols.len() - 1,
        );
        self.store.insert(symbol.name.clone(), symbol.clone());
        symbol
    }

    fn define_outer(&mut self, original: Symbol, level: usize) -> Symbol {
        let ptr = match original.scope {
            SymbolScope::Local | SymbolScope::Free | SymbolScope::Function => OuterPointer {
                level,
                scope: original.scope,
                index: original.index,
            },
            SymbolScope::Outer => {
                let inner = original.ptr.expect("outer symbol always carries a pointer");
                OuterPointer {
                    level: level + inner.level,
                    scope: inner.scope,
                    index: inner.index,
                }
            }
            SymbolScope::Global | SymbolScope::Builtin => {
                unreachable!("global/builtin symbols are returned before define_outer is reached")
            }
        };
        let symbol = Symbol::outer(original.name.clone(), ptr);
        self.store.insert(symbol.name.clone(), symbol.clone());
        symbol
    }

    pub fn resolve(&mut self, name: &str) -> Option<Symbol> {
        self.resolve_at_level(name, 0)
    }

    fn resolve_at_level(&mut self, name: &str, level: usize) -> Option<Symbol> {
        if let Some(symbol) = self.store.get(name) {
            return Some(symbol.clone());
        }
        let outer = self.outer.as_mut()?;
        let level = level + 1;
        let resolved = outer.resolve_at_level(name, level)?;
        if matches!(resolved.scope, SymbolScope::Global | SymbolScope::Builtin) {
            return Some(resolved);
        }
        if self.inside_loop {
            Some(self.define_outer(resolved, level))
        } else {
            Some(self.define_free(resolved))
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod symbol_table_test {
    use super::*;

    #[test]
    fn test_define() {
        let mut globals = SymbolTable::new();
        let a = globals.define("a");
        assert_eq!(a, Symbol::new("a", SymbolScope::Global, 0));
        let b = globals.define("b");
        assert_eq!(b, Symbol::new("b", SymbolScope::Global, 1));

        let mut first = SymbolTable::new_enclosed(globals, false);
        let c = first.define("c");
        assert_eq!(c, Symbol::new("c", SymbolScope::Local, 0));
        let d = first.define("d");
        assert_eq!(d, Symbol::new("d", SymbolScope::Local, 1));

        let mut second = SymbolTable::new_enclosed(first, false);
        let e = second.define("e");
        assert_eq!(e, Symbol::new("e", SymbolScope::Local, 0));
        let f = second.define("f");
        assert_eq!(f, Symbol::new("f", SymbolScope::Local, 1));
    }

    #[test]
    fn test_resolve_nested_locals_promote_to_free() {
        let mut globals = SymbolTable::new();
        globals.define("a");
        globals.define("b");

        let mut locals = SymbolTable::new_enclosed(globals, false);
        locals.define("c");
        locals.define("d");

        let mut nested = SymbolTable::new_enclosed(locals, false);
        nested.define("e");
        nested.define("f");

        assert_eq!(nested.resolve("a").unwrap().scope, SymbolScope::Global);
        assert_eq!(nested.resolve("c").unwrap().scope, SymbolScope::Free);
        assert_eq!(nested.resolve("d").unwrap().scope, SymbolScope::Free);
        assert_eq!(nested.resolve("e").unwrap().scope, SymbolScope::Local);

        assert_eq!(nested.free_symbols().len(), 2);
        assert_eq!(nested.free_symbols()[0].name, "c");
        assert_eq!(nested.free_symbols()[1].name, "d");
    }

    #[test]
    fn test_resolve_builtin_from_any_depth() {
        let mut globals = SymbolTable::new();
        globals.define_builtin(0, "len");
        let mut first = SymbolTable::new_enclosed(globals, false);
        let mut nested = SymbolTable::new_enclosed(first.clone(), false);

        assert_eq!(first.resolve("len").unwrap().scope, SymbolScope::Builtin);
        assert_eq!(nested.resolve("len").unwrap().scope, SymbolScope::Builtin);
    }

    #[test]
    fn test_define_and_resolve_function_name() {
        let mut globals = SymbolTable::new();
        globals.define_function_name("a");
        let resolved = globals.resolve("a").unwrap();
        assert_eq!(resolved, Symbol::new("a", SymbolScope::Function, 0));
    }

    #[test]
    fn test_shadow_function_name_with_local_definition() {
        let mut globals = SymbolTable::new();
        globals.define_function_name("a");
        globals.define("a");
        let resolved = globals.resolve("a").unwrap();
        assert_eq!(resolved, Symbol::new("a", SymbolScope::Global, 0));
    }

    #[test]
    fn test_resolve_through_loop_scope_gives_outer_not_free() {
        let globals = SymbolTable::new();
        let mut function_scope = SymbolTable::new_enclosed(globals, false);
        let x = function_scope.define("x");

        let mut loop_scope = SymbolTable::new_enclosed(function_scope, true);
        let resolved = loop_scope.resolve("x").unwrap();
        assert!(resolved.is_outer());
        let ptr = resolved.ptr.unwrap();
        assert_eq!(ptr.level, 1);
        assert_eq!(ptr.scope, x.scope);
        assert_eq!(ptr.index, x.index);
    }

    #[test]
    fn test_nested_loop_scopes_accumulate_level() {
        let globals = SymbolTable::new();
        let mut function_scope = SymbolTable::new_enclosed(globals, false);
        function_scope.define("x");

        let outer_loop = SymbolTable::new_enclosed(function_scope, true);
        let mut inner_loop = SymbolTable::new_enclosed(outer_loop, true);

        let resolved = inner_loop.resolve("x").unwrap();
        assert!(resolved.is_outer());
        assert_eq!(resolved.ptr.unwrap().level, 3);
    }

    #[test]
    fn test_loop_scope_local_numbering_continues_from_parent() {
        let globals = SymbolTable::new();
        let mut function_scope = SymbolTable::new_enclosed(globals, false);
        function_scope.define("a");
        function_scope.define("b");
        assert_eq!(function_scope.num_definitions(), 2);

        let mut loop_scope = SymbolTable::new_enclosed(function_scope, true);
        let c = loop_scope.define("c");
        assert_eq!(c, Symbol::new("c", SymbolScope::Local, 2));

        let function_scope = loop_scope.into_outer().unwrap();
        assert_eq!(function_scope.num_definitions(), 3);
    }

    #[test]
    fn test_let_inside_top_level_loop_scope_is_global_not_local() {
        let globals = SymbolTable::new();
        let mut loop_scope = SymbolTable::new_enclosed(globals, true);
        let x = loop_scope.define("x");
        assert_eq!(x, Symbol::new("x", SymbolScope::Global, 0));
    }

    #[test]
    fn test_let_inside_nested_top_level_loop_scopes_is_still_global() {
        let globals = SymbolTable::new();
        let outer_loop = SymbolTable::new_enclosed(globals, true);
        let mut inner_loop = SymbolTable::new_enclosed(outer_loop, true);
        let x = inner_loop.define("x");
        assert_eq!(x.scope, SymbolScope::Global);
    }

    #[test]
    fn test_let_inside_function_body_loop_scope_stays_local() {
        let globals = SymbolTable::new();
        let function_scope = SymbolTable::new_enclosed(globals, false);
        let mut loop_scope = SymbolTable::new_enclosed(function_scope, true);
        let x = loop_scope.define("x");
        assert_eq!(x.scope, SymbolScope::Local);
    }
}

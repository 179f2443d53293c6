use crate::bytecode::bytecode::Bytecode;
use crate::bytecode::compilation_scope::CompilationScope;
use crate::bytecode::symbol_table::SymbolTable;
use crate::diagnostics::diagnostic::Diagnostic;
use crate::runtime::builtins;
use crate::runtime::value::Value;
use crate::syntax::program::Program;

mod builder;
mod errors;
mod expression;
mod statement;


/// Turns an analyzed AST into bytecode. Keeps a stack of compilation
/// scopes, one per function body currently being compiled; the outermost
/// scope is the top-level program. `while` bodies do not get their own
/// scope — they compile straight into whichever scope is current, so a
/// loop's instructions always share its enclosing function's buffer and
/// runtime frame (see `enter_loop_scope`).
pub struct Compiler {
    constants: Vec<Value>,
    symbol_table: SymbolTable,
    scopes: Vec<CompilationScope>,
    scope_index: usize,
    file_path: String,
}

impl Compiler {
    pub fn new() -> Self {
        Self::new_with_file_path("<unknown>")
    }

    pub fn new_with_file_path(file_path: impl Into<String>) -> Self {
        let mut symbol_table = SymbolTable::new();
        for (index, builtin) in builtins::all().iter().enumerate() {
            symbol_table.define_builtin(index, builtin.name);
        }
        Self {
            constants: Vec::new(),
            symbol_table,
            scopes: vec![CompilationScope::new()],
            scope_index: 0,
            file_path: file_path.into(),
        }
    }

    /// Bootstraps a compiler from state a previous compile pass handed
    /// back, so a REPL can thread globals and constants across inputs.
    pub fn new_with_state(
        file_path: impl Into<String>,
        symbol_table: SymbolTable,
        constants: Vec<Value>,
    ) -> Self {
        let mut compiler = Self::new_with_file_path(file_path);
        compiler.symbol_table = symbol_table;
        compiler.constants = constants;
        compiler
    }

    /// Consumes the compiler and returns persistent state for REPL reuse.
    pub fn take_state(self) -> (SymbolTable, Vec<Value>) {
        (self.symbol_table, self.constants)
    }

    pub fn compile(&mut self, program: &Program) -> Result<(), Vec<Diagnostic>> {
        let mut errors = Vec::new();
        for statement in &program.statements {
            if let Err(diagnostic) = self.compile_statement(statement) {
                errors.push(diagnostic);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn bytecode(self) -> Bytecode {
        Bytecode {
            instructions: self.scopes[self.scope_index].instructions.clone(),
            constants: self.constants,
        }
    }

    fn enter_scope(&mut self) {
        self.scopes.push(CompilationScope::new());
        self.scope_index += 1;
        let outer = std::mem::replace(&mut self.symbol_table, SymbolTable::new());
        self.symbol_table = SymbolTable::new_enclosed(outer, false);
    }

    fn leave_scope(&mut self) -> CompilationScope {
        let scope = self.scopes.pop().expect("scope stack never empties");
        self.scope_index -= 1;
        let outer = std::mem::replace(&mut self.symbol_table, SymbolTable::new());
        self.symbol_table = outer.into_outer().expect("leave_scope only called on enclosed scopes");
        scope
    }

    /// A `while` body never gets its own `CompilationScope`: it has to
    /// share the enclosing function's instruction buffer and runtime
    /// frame, so only the symbol table nests. Entering/leaving this way
    /// means every jump a loop body emits is already an absolute offset
    /// into the buffer it will execute from — nothing needs relocating
    /// afterward.
    fn enter_loop_scope(&mut self) {
        let outer = std::mem::replace(&mut self.symbol_table, SymbolTable::new());
        self.symbol_table = SymbolTable::new_enclosed(outer, true);
    }

    fn leave_loop_scope(&mut self) {
        let outer = std::mem::replace(&mut self.symbol_table, SymbolTable::new());
        self.symbol_table = outer
            .into_outer()
            .expect("leave_loop_scope only called on enclosed scopes");
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

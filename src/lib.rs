pub mod analyze;
pub mod bytecode;
pub mod diagnostics;
pub mod runtime;
pub mod syntax;

use analyze::Analyzer;
use bytecode::bytecode::Bytecode;
use bytecode::compiler::Compiler;
use bytecode::symbol_table::SymbolTable;
use diagnostics::diagnostic::Diagnostic;
use syntax::parser::parse_source;

/// Parses, analyzes, and compiles a program in one pass, matching the
/// pipeline order described for the compiler and analyzer: the analyzer
/// walks the tree first so unresolved identifiers, loop-control misuse,
/// and illegal self-reassignment surface as diagnostics before the
/// compiler emits a single byte of bytecode.
pub fn compile_source(source: &str, file: impl Into<String>) -> Result<Bytecode, Vec<Diagnostic>> {
    let file = file.into();
    let program = parse_source(source, file.clone())?;

    let mut symbols = SymbolTable::new();
    Analyzer::new(file.clone())
        .analyze(&program, &mut symbols)
        .map_err(|diagnostic| vec![diagnostic])?;

    let mut compiler = Compiler::new_with_file_path(file);
    compiler.compile(&program)?;
    Ok(compiler.bytecode())
}

#[cfg(test)]
mod lib_test {
    use super::*;

    #[test]
    fn test_compile_source_rejects_unresolved_identifier() {
        let err = compile_source("foobar;", "<test>").unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].message, "identifier not found: foobar");
    }

    #[test]
    fn test_compile_source_succeeds_on_valid_program() {
        assert!(compile_source("let a = 1; a + 2;", "<test>").is_ok());
    }
}

pub mod bytecode;
pub mod compilation_scope;
pub mod compiler;
pub mod emitted_instruction;
pub mod op_code;
pub mod symbol;
pub mod symbol_scope;
pub mod symbol_table;

pub use bytecode::Bytecode;
pub use compiler::Compiler;
pub use symbol_table::SymbolTable;

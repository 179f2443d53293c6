use crate::bytecode::op_code::Instructions;
use crate::runtime::value::Value;

/// Final compiler output: the outermost scope's instruction stream plus
/// the constants pool it indexes into. A REPL threads the same
/// `Compiler` (and thus the same constants/symbol table) across
/// successive calls so globals persist; this crate exposes that via
/// `Compiler::new_with_state`.
#[derive(Debug, Clone)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Value>,
}

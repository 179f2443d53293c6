use crate::bytecode::emitted_instruction::EmittedInstruction;
use crate::bytecode::op_code::Instructions;

/// One compilation scope per function body being compiled (the outermost
/// scope is the main program); `while` bodies share their enclosing
/// function's scope rather than getting one of their own.
/// `break_positions`/`continue_positions` collect the placeholder
/// `break`/`continue` instructions emitted inside any `while` body
/// compiled as part of this scope; each `compile_while` call patches and
/// drains only the slice appended while its own body was compiling, so
/// nested loops never interfere with each other's back-patching.
#[derive(Debug, Clone, Default)]
pub struct CompilationScope {
    pub instructions: Instructions,
    pub last_instruction: EmittedInstruction,
    pub previous_instruction: EmittedInstruction,
    pub break_positions: Vec<usize>,
    pub continue_positions: Vec<usize>,
}

impl CompilationScope {
    pub fn new() -> Self {
        Self::default()
    }
}

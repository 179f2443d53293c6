#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    Global,
    Local,
    Builtin,
    Free,
    Function,
    /// Refers to a binding in an enclosing function from inside a `while`
    /// body. Unlike `Free`, which captures by value into a closure, an
    /// `Outer` symbol is resolved at VM runtime by walking `level` frames
    /// down the active call stack, so assignments through it are visible
    /// to the enclosing function.
    Outer,
}

/// Decodes the `scope` operand byte of `get_outer`/`set_outer`, the
/// runtime counterpart to encoding it via `as usize` when emitting those
/// instructions.
impl From<u8> for SymbolScope {
    fn from(byte: u8) -> Self {
        match byte {
            0 => SymbolScope::Global,
            1 => SymbolScope::Local,
            2 => SymbolScope::Builtin,
            3 => SymbolScope::Free,
            4 => SymbolScope::Function,
            5 => SymbolScope::Outer,
            other => panic!("unknown symbol scope tag {other}"),
        }
    }
}

use crate::diagnostics::diagnostic::Diagnostic;
use crate::diagnostics::position::Span;

use super::Compiler;

/// These paths are defensive: the public compile entry point always runs
/// the analyzer first, which rejects unresolved identifiers and
/// loop-control statements outside a loop before the compiler ever sees
/// them. They exist so the compiler is still safe to call directly
/// (e.g. from tests) without panicking on malformed input.
impl Compiler {
    pub(super) fn make_identifier_not_found_error(&self, name: &str, span: Span) -> Diagnostic {
        Diagnostic::new(
            self.file_path.clone(),
            span,
            format!("identifier not found: {name}"),
        )
    }

    pub(super) fn make_break_outside_loop_error(&self, span: Span) -> Diagnostic {
        Diagnostic::new(self.file_path.clone(), span, "syntax error: break outside loop")
    }

    pub(super) fn make_continue_outside_loop_error(&self, span: Span) -> Diagnostic {
        Diagnostic::new(self.file_path.clone(), span, "syntax error: continue outside loop")
    }
}

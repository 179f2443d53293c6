pub mod diagnostic;
pub mod position;

pub use diagnostic::Diagnostic;
pub use position::{Position, Span};

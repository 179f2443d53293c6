//! Runtime value model and VM execution.
//!
//! Heap-backed `Value` variants (`String`, `Array`, `Hash`) use `Rc` for
//! cheap sharing. The value graph stays acyclic by construction: a
//! closure's free variables are captured at creation time rather than
//! through a reference back to the enclosing frame, so plain reference
//! counting is sufficient without a tracing collector. `Closure::free` is
//! the one interior-mutability exception, needed so `set_free` is visible
//! to every `Value::Closure` sharing that `Rc`.

use crate::runtime::value::Value;

pub mod builtin_function;
pub mod builtins;
pub mod closure;
pub mod compiled_function;
pub mod frame;
pub mod hash_key;
pub mod value;
pub mod vm;

pub type BuiltinFn = fn(&[Value]) -> Value;

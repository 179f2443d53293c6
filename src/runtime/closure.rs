use std::cell::RefCell;
use std::rc::Rc;

use crate::runtime::compiled_function::CompiledFunction;
use crate::runtime::value::Value;

/// `free` is a `RefCell` rather than a plain `Vec` because `set_free`
/// mutates a closure's captured copy in place: two `Value::Closure`s that
/// share the same `Rc<Closure>` (e.g. a closure value copied into two
/// variables) must observe each other's `set_free` writes, while the
/// enclosing function's own binding the value was captured from stays
/// untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Closure {
    pub function: Rc<CompiledFunction>,
    pub free: RefCell<Vec<Value>>,
}

impl Closure {
    pub fn new(function: Rc<CompiledFunction>, free: Vec<Value>) -> Self {
        Self {
            function,
            free: RefCell::new(free),
        }
    }
}

use std::rc::Rc;

use crate::runtime::frame::Frame;
use crate::runtime::value::Value;

use super::Vm;

impl Vm {
    pub(super) fn execute_call(&mut self, num_args: usize) -> Result<(), String> {
        let callee = self.stack[self.sp - 1 - num_args].clone();
        match callee {
            Value::Closure(closure) => self.call_closure(closure, num_args),
            Value::Builtin(builtin) => self.call_builtin(builtin, num_args),
            other => Err(format!("calling non-function: {}", other.type_name())),
        }
    }

    fn call_closure(&mut self, closure: Rc<crate::runtime::closure::Closure>, num_args: usize) -> Result<(), String> {
        let num_parameters = closure.function.num_parameters;
        if num_args != num_parameters {
            return Err(format!(
                "wrong number of arguments: want={num_parameters}, got={num_args}"
            ));
        }

        let num_locals = closure.function.num_locals;
        let base_pointer = self.sp - num_args;
        let new_top = base_pointer + num_locals;

        self.ensure_stack_capacity(new_top)?;
        for slot in &mut self.stack[base_pointer + num_args..new_top] {
            *slot = Value::Null;
        }
        self.sp = new_top;

        self.push_frame(Frame::new(closure, base_pointer));
        Ok(())
    }

    fn call_builtin(&mut self, builtin: crate::runtime::builtin_function::BuiltinFunction, num_args: usize) -> Result<(), String> {
        let args = self.stack[self.sp - num_args..self.sp].to_vec();
        self.sp -= num_args + 1;
        let result = (builtin.func)(&args);
        self.push(result)
    }
}

#[cfg(test)]
mod function_call_test {
    use super::*;
    use crate::bytecode::bytecode::Bytecode;
    use crate::bytecode::op_code::Instructions;
    use crate::runtime::closure::Closure;
    use crate::runtime::compiled_function::CompiledFunction;

    fn new_vm() -> Vm {
        Vm::new(Bytecode {
            instructions: Instructions::new(),
            constants: vec![],
        })
    }

    #[test]
    fn test_call_builtin_pops_args_and_callee_pushes_result() {
        let mut vm = new_vm();
        let len_idx = crate::runtime::builtins::lookup("len").unwrap();
        let builtin = vm.builtins[len_idx].clone();
        vm.push(Value::Builtin(builtin)).unwrap();
        vm.push(Value::String("abc".into())).unwrap();
        vm.execute_call(1).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Integer(3));
        assert_eq!(vm.sp, 0);
    }

    #[test]
    fn test_call_closure_sets_up_frame_with_locals() {
        let mut vm = new_vm();
        let function = CompiledFunction::new(Instructions::new(), 2, 1);
        let closure = Rc::new(Closure::new(Rc::new(function), vec![]));
        vm.push(Value::Closure(Rc::clone(&closure))).unwrap();
        vm.push(Value::Integer(42)).unwrap();
        vm.execute_call(1).unwrap();
        assert_eq!(vm.frame_index, 1);
        let frame = vm.current_frame();
        assert_eq!(frame.base_pointer, 1);
        assert_eq!(vm.stack[1], Value::Integer(42));
        assert_eq!(vm.stack[2], Value::Null);
    }

    #[test]
    fn test_call_wrong_arity_is_runtime_error() {
        let mut vm = new_vm();
        let function = CompiledFunction::new(Instructions::new(), 1, 1);
        let closure = Rc::new(Closure::new(Rc::new(function), vec![]));
        vm.push(Value::Closure(closure)).unwrap();
        let err = vm.execute_call(0).unwrap_err();
        assert!(err.contains("wrong number of arguments"));
    }

    #[test]
    fn test_calling_non_function_is_runtime_error() {
        let mut vm = new_vm();
        vm.push(Value::Integer(5)).unwrap();
        let err = vm.execute_call(0).unwrap_err();
        assert!(err.contains("calling non-function"));
    }
}

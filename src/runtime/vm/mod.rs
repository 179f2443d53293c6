//! Stack-based bytecode interpreter. Owns the value stack, the call-frame
//! stack, and the globals table, and drives execution until the outermost
//! frame's instruction pointer runs past the end of the program.

use std::rc::Rc;

use crate::bytecode::bytecode::Bytecode;
use crate::bytecode::op_code::{OpCode, read_u8, read_u16};
use crate::bytecode::symbol_scope::SymbolScope;
use crate::runtime::builtin_function::BuiltinFunction;
use crate::runtime::builtins;
use crate::runtime::closure::Closure;
use crate::runtime::compiled_function::CompiledFunction;
use crate::runtime::frame::Frame;
use crate::runtime::value::Value;

mod binary_ops;
mod comparison_ops;
mod function_call;
mod index_ops;

const INITIAL_STACK_SIZE: usize = 2048;
const MAX_STACK_SIZE: usize = 1 << 20;
const GLOBALS_SIZE: usize = 65536;

pub struct Vm {
    constants: Vec<Value>,
    stack: Vec<Value>,
    sp: usize,
    last_popped: Value,
    globals: Vec<Value>,
    frames: Vec<Frame>,
    frame_index: usize,
    builtins: Vec<BuiltinFunction>,
}

impl Vm {
    pub fn new(bytecode: Bytecode) -> Self {
        let main_fn = CompiledFunction::new(bytecode.instructions, 0, 0);
        let main_closure = Closure::new(Rc::new(main_fn), vec![]);
        let main_frame = Frame::new(Rc::new(main_closure), 0);

        Self {
            constants: bytecode.constants,
            stack: vec![Value::Null; INITIAL_STACK_SIZE],
            sp: 0,
            last_popped: Value::Null,
            globals: vec![Value::Null; GLOBALS_SIZE],
            frames: vec![main_frame],
            frame_index: 0,
            builtins: builtins::all(),
        }
    }

    /// Runs the loaded program to completion, or to the first runtime error.
    pub fn run(&mut self) -> Result<(), String> {
        while self.current_frame().ip < self.current_frame().instructions().len() {
            self.step()?;
        }
        Ok(())
    }

    /// The most recent value popped by a `pop` opcode; the top-level
    /// result of a program that ends in an expression statement.
    pub fn last_popped_stack_elem(&self) -> &Value {
        &self.last_popped
    }

    fn step(&mut self) -> Result<(), String> {
        let ip = self.current_frame().ip;
        let op = OpCode::from(self.current_frame().instructions()[ip]);

        match op {
            OpCode::Constant => {
                let idx = self.read_u16_operand(ip + 1) as usize;
                self.current_frame_mut().ip = ip + 3;
                let value = self.constants[idx].clone();
                self.push(value)?;
            }
            OpCode::True => {
                self.current_frame_mut().ip = ip + 1;
                self.push(Value::Boolean(true))?;
            }
            OpCode::False => {
                self.current_frame_mut().ip = ip + 1;
                self.push(Value::Boolean(false))?;
            }
            OpCode::Null => {
                self.current_frame_mut().ip = ip + 1;
                self.push(Value::Null)?;
            }
            OpCode::Pop => {
                self.current_frame_mut().ip = ip + 1;
                self.pop()?;
            }
            OpCode::Add
            | OpCode::Sub
            | OpCode::Mul
            | OpCode::Div
            | OpCode::FloorDiv
            | OpCode::Mod
            | OpCode::BitAnd
            | OpCode::BitOr
            | OpCode::BitXor
            | OpCode::BitLsh
            | OpCode::BitRsh => {
                self.current_frame_mut().ip = ip + 1;
                self.execute_binary_operation(op)?;
            }
            OpCode::LogicalAnd | OpCode::LogicalOr => {
                self.current_frame_mut().ip = ip + 1;
                self.execute_logical_operation(op)?;
            }
            OpCode::Equal | OpCode::NotEqual | OpCode::GreaterThan | OpCode::GreaterEqual => {
                self.current_frame_mut().ip = ip + 1;
                self.execute_comparison(op)?;
            }
            OpCode::Minus => {
                self.current_frame_mut().ip = ip + 1;
                let operand = self.pop()?;
                let result = match operand {
                    Value::Integer(v) => Value::Integer(-v),
                    Value::Float(v) => Value::Float(-v),
                    other => {
                        return Err(format!(
                            "unsupported type for negation: {}",
                            other.type_name()
                        ));
                    }
                };
                self.push(result)?;
            }
            OpCode::Bang => {
                self.current_frame_mut().ip = ip + 1;
                let operand = self.pop()?;
                self.push(Value::Boolean(!operand.is_truthy()))?;
            }
            OpCode::JumpNotTruthy => {
                let target = self.read_u16_operand(ip + 1) as usize;
                let condition = self.pop()?;
                self.current_frame_mut().ip = if condition.is_truthy() { ip + 3 } else { target };
            }
            OpCode::Jump => {
                let target = self.read_u16_operand(ip + 1) as usize;
                self.current_frame_mut().ip = target;
            }
            OpCode::GetGlobal => {
                let idx = self.read_u16_operand(ip + 1) as usize;
                self.current_frame_mut().ip = ip + 3;
                let value = self.globals[idx].clone();
                self.push(value)?;
            }
            OpCode::SetGlobal => {
                let idx = self.read_u16_operand(ip + 1) as usize;
                self.current_frame_mut().ip = ip + 3;
                let value = self.pop()?;
                self.globals[idx] = value;
            }
            OpCode::Array => {
                let n = self.read_u16_operand(ip + 1) as usize;
                self.current_frame_mut().ip = ip + 3;
                let array = self.build_array(self.sp - n, self.sp);
                self.sp -= n;
                self.push(array)?;
            }
            OpCode::Hash => {
                let n = self.read_u16_operand(ip + 1) as usize;
                self.current_frame_mut().ip = ip + 3;
                let hash = self.build_hash(self.sp - n, self.sp)?;
                self.sp -= n;
                self.push(hash)?;
            }
            OpCode::Index => {
                self.current_frame_mut().ip = ip + 1;
                let index = self.pop()?;
                let left = self.pop()?;
                self.execute_index(left, index)?;
            }
            OpCode::Call => {
                let num_args = self.read_u8_operand(ip + 1) as usize;
                // Advance the caller's ip past `call` before any frame push,
                // so returning resumes at the right instruction.
                self.current_frame_mut().ip = ip + 2;
                self.execute_call(num_args)?;
            }
            OpCode::ReturnValue => {
                let return_value = self.pop()?;
                let frame = self.pop_frame();
                self.sp = frame.base_pointer - 1;
                self.push(return_value)?;
            }
            OpCode::Return => {
                let frame = self.pop_frame();
                self.sp = frame.base_pointer - 1;
                self.push(Value::Null)?;
            }
            OpCode::GetLocal => {
                let idx = self.read_u8_operand(ip + 1) as usize;
                self.current_frame_mut().ip = ip + 2;
                let bp = self.current_frame().base_pointer;
                let value = self.stack[bp + idx].clone();
                self.push(value)?;
            }
            OpCode::SetLocal => {
                let idx = self.read_u8_operand(ip + 1) as usize;
                self.current_frame_mut().ip = ip + 2;
                let bp = self.current_frame().base_pointer;
                let value = self.pop()?;
                self.stack[bp + idx] = value;
            }
            OpCode::GetBuiltin => {
                let idx = self.read_u8_operand(ip + 1) as usize;
                self.current_frame_mut().ip = ip + 2;
                let builtin = self.builtins[idx].clone();
                self.push(Value::Builtin(builtin))?;
            }
            OpCode::GetFree => {
                let idx = self.read_u8_operand(ip + 1) as usize;
                self.current_frame_mut().ip = ip + 2;
                let value = self.current_frame().closure.free.borrow()[idx].clone();
                self.push(value)?;
            }
            OpCode::SetFree => {
                let idx = self.read_u8_operand(ip + 1) as usize;
                self.current_frame_mut().ip = ip + 2;
                let value = self.pop()?;
                self.current_frame().closure.free.borrow_mut()[idx] = value;
            }
            OpCode::CurrentClosure => {
                self.current_frame_mut().ip = ip + 1;
                let closure = Rc::clone(&self.current_frame().closure);
                self.push(Value::Closure(closure))?;
            }
            OpCode::Closure => {
                let const_idx = self.read_u16_operand(ip + 1) as usize;
                let num_free = self.read_u8_operand(ip + 3) as usize;
                self.current_frame_mut().ip = ip + 4;
                self.push_closure(const_idx, num_free)?;
            }
            OpCode::GetOuter => {
                let scope = SymbolScope::from(self.read_u8_operand(ip + 2));
                let idx = self.read_u8_operand(ip + 3) as usize;
                self.current_frame_mut().ip = ip + 4;
                let value = self.get_outer_value(scope, idx)?;
                self.push(value)?;
            }
            OpCode::SetOuter => {
                let scope = SymbolScope::from(self.read_u8_operand(ip + 2));
                let idx = self.read_u8_operand(ip + 3) as usize;
                self.current_frame_mut().ip = ip + 4;
                let value = self.pop()?;
                self.set_outer_value(scope, idx, value)?;
            }
            OpCode::Break | OpCode::Continue => {
                return Err(format!("unpatched {op} encountered during execution"));
            }
        }
        Ok(())
    }

    /// `get_outer`/`set_outer` carry a `level` operand (decoded but unused
    /// here): since a `while` body never pushes its own frame — its
    /// instructions are appended inline into the enclosing function's — an
    /// `outer` symbol always addresses a slot in the *currently executing*
    /// frame, no matter how many nested loop scopes separate the reference
    /// from its binding.
    fn get_outer_value(&self, scope: SymbolScope, index: usize) -> Result<Value, String> {
        match scope {
            SymbolScope::Local => {
                let bp = self.current_frame().base_pointer;
                Ok(self.stack[bp + index].clone())
            }
            SymbolScope::Free => Ok(self.current_frame().closure.free.borrow()[index].clone()),
            SymbolScope::Function => Ok(Value::Closure(Rc::clone(&self.current_frame().closure))),
            other => Err(format!("invalid outer scope for read: {other:?}")),
        }
    }

    fn set_outer_value(&mut self, scope: SymbolScope, index: usize, value: Value) -> Result<(), String> {
        match scope {
            SymbolScope::Local => {
                let bp = self.current_frame().base_pointer;
                self.stack[bp + index] = value;
                Ok(())
            }
            SymbolScope::Free => {
                self.current_frame().closure.free.borrow_mut()[index] = value;
                Ok(())
            }
            other => Err(format!("invalid outer scope for assignment: {other:?}")),
        }
    }

    fn push_closure(&mut self, const_idx: usize, num_free: usize) -> Result<(), String> {
        let function = match &self.constants[const_idx] {
            Value::Function(f) => Rc::clone(f),
            other => return Err(format!("not a function: {}", other.type_name())),
        };
        let free = self.stack[self.sp - num_free..self.sp].to_vec();
        self.sp -= num_free;
        let closure = Closure::new(function, free);
        self.push(Value::Closure(Rc::new(closure)))
    }

    fn build_array(&mut self, start: usize, end: usize) -> Value {
        let elements = self.stack[start..end].to_vec();
        Value::Array(Rc::new(elements))
    }

    fn build_hash(&mut self, start: usize, end: usize) -> Result<Value, String> {
        let mut map = std::collections::HashMap::new();
        let mut i = start;
        while i < end {
            let key = self.stack[i]
                .to_hash_key()
                .ok_or_else(|| format!("unusable as hash key: {}", self.stack[i].type_name()))?;
            map.insert(key, self.stack[i + 1].clone());
            i += 2;
        }
        Ok(Value::Hash(Rc::new(map)))
    }

    fn current_frame(&self) -> &Frame {
        &self.frames[self.frame_index]
    }

    fn current_frame_mut(&mut self) -> &mut Frame {
        &mut self.frames[self.frame_index]
    }

    fn push_frame(&mut self, frame: Frame) {
        self.frame_index += 1;
        if self.frame_index >= self.frames.len() {
            self.frames.push(frame);
        } else {
            self.frames[self.frame_index] = frame;
        }
    }

    fn pop_frame(&mut self) -> Frame {
        let frame = self.frames[self.frame_index].clone();
        self.frame_index -= 1;
        frame
    }

    fn ensure_stack_capacity(&mut self, needed_top: usize) -> Result<(), String> {
        if needed_top <= self.stack.len() {
            return Ok(());
        }
        if needed_top > MAX_STACK_SIZE {
            return Err("stack overflow".to_string());
        }
        let mut new_len = self.stack.len().max(1);
        while new_len < needed_top {
            new_len = new_len.saturating_mul(2).min(MAX_STACK_SIZE);
        }
        self.stack.resize(new_len, Value::Null);
        Ok(())
    }

    fn push(&mut self, value: Value) -> Result<(), String> {
        self.ensure_stack_capacity(self.sp + 1)?;
        self.stack[self.sp] = value;
        self.sp += 1;
        Ok(())
    }

    fn pop(&mut self) -> Result<Value, String> {
        if self.sp == 0 {
            return Err("stack underflow".to_string());
        }
        self.sp -= 1;
        self.last_popped = std::mem::replace(&mut self.stack[self.sp], Value::Null);
        Ok(self.last_popped.clone())
    }

    fn read_u8_operand(&self, offset: usize) -> u8 {
        read_u8(self.current_frame().instructions(), offset)
    }

    fn read_u16_operand(&self, offset: usize) -> u16 {
        read_u16(self.current_frame().instructions(), offset)
    }
}

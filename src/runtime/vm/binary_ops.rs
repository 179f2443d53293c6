use crate::bytecode::op_code::OpCode;
use crate::runtime::value::Value;

use super::Vm;

impl Vm {
    pub(super) fn execute_binary_operation(&mut self, op: OpCode) -> Result<(), String> {
        let right = self.pop()?;
        let left = self.pop()?;

        let result = match (&left, &right) {
            (Value::Integer(l), Value::Integer(r)) => execute_integer_operation(op, *l, *r)?,
            (Value::Float(l), Value::Float(r)) => execute_float_operation(op, *l, *r)?,
            (Value::Integer(l), Value::Float(r)) => execute_float_operation(op, *l as f64, *r)?,
            (Value::Float(l), Value::Integer(r)) => execute_float_operation(op, *l, *r as f64)?,
            (Value::String(l), Value::String(r)) if op == OpCode::Add => {
                Value::String(format!("{l}{r}").into())
            }
            (Value::String(l), Value::Integer(r)) if op == OpCode::Add => {
                Value::String(format!("{l}{r}").into())
            }
            (Value::String(l), Value::Float(r)) if op == OpCode::Add => {
                Value::String(format!("{l}{r}").into())
            }
            _ => {
                return Err(format!(
                    "unsupported types for binary operation: {} {}",
                    left.type_name(),
                    right.type_name()
                ));
            }
        };

        self.push(result)
    }

    pub(super) fn execute_logical_operation(&mut self, op: OpCode) -> Result<(), String> {
        let right = self.pop()?;
        let left = self.pop()?;

        let result = match op {
            OpCode::LogicalAnd => {
                if left.is_truthy() {
                    right
                } else {
                    left
                }
            }
            OpCode::LogicalOr => {
                if left.is_truthy() {
                    left
                } else {
                    right
                }
            }
            other => return Err(format!("not a logical operator: {other}")),
        };

        self.push(result)
    }
}

fn execute_integer_operation(op: OpCode, left: i64, right: i64) -> Result<Value, String> {
    let value = match op {
        OpCode::Add => Value::Integer(left.wrapping_add(right)),
        OpCode::Sub => Value::Integer(left.wrapping_sub(right)),
        OpCode::Mul => Value::Integer(left.wrapping_mul(right)),
        OpCode::Div => {
            if right == 0 {
                return Err("division by zero".to_string());
            }
            Value::Integer(left / right)
        }
        OpCode::FloorDiv => {
            if right == 0 {
                return Err("division by zero".to_string());
            }
            Value::Integer(left.div_euclid(right))
        }
        OpCode::Mod => {
            if right == 0 {
                return Err("division by zero".to_string());
            }
            Value::Integer(left % right)
        }
        OpCode::BitAnd => Value::Integer(left & right),
        OpCode::BitOr => Value::Integer(left | right),
        OpCode::BitXor => Value::Integer(left ^ right),
        OpCode::BitLsh => Value::Integer(left << right),
        OpCode::BitRsh => Value::Integer(left >> right),
        other => return Err(format!("unknown integer operator: {other}")),
    };
    Ok(value)
}

fn execute_float_operation(op: OpCode, left: f64, right: f64) -> Result<Value, String> {
    let value = match op {
        OpCode::Add => Value::Float(left + right),
        OpCode::Sub => Value::Float(left - right),
        OpCode::Mul => Value::Float(left * right),
        OpCode::Div => {
            if right == 0.0 {
                return Err("division by zero".to_string());
            }
            Value::Float(left / right)
        }
        other => {
            return Err(format!(
                "unsupported operator for decimal operands: {other}"
            ));
        }
    };
    Ok(value)
}

#[cfg(test)]
mod binary_ops_test {
    use super::*;
    use crate::bytecode::bytecode::Bytecode;
    use crate::bytecode::op_code::Instructions;

    fn vm_with_stack(values: Vec<Value>) -> Vm {
        let mut vm = Vm::new(Bytecode {
            instructions: Instructions::new(),
            constants: vec![],
        });
        for value in values {
            vm.push(value).unwrap();
        }
        vm
    }

    #[test]
    fn test_integer_arithmetic() {
        let mut vm = vm_with_stack(vec![Value::Integer(10), Value::Integer(3)]);
        vm.execute_binary_operation(OpCode::Add).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Integer(13));
    }

    #[test]
    fn test_floor_div_and_mod() {
        let mut vm = vm_with_stack(vec![Value::Integer(7), Value::Integer(2)]);
        vm.execute_binary_operation(OpCode::Mod).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_division_by_zero_is_runtime_error() {
        let mut vm = vm_with_stack(vec![Value::Integer(1), Value::Integer(0)]);
        let err = vm.execute_binary_operation(OpCode::Div).unwrap_err();
        assert_eq!(err, "division by zero");
    }

    #[test]
    fn test_mixed_integer_float_promotes_to_float() {
        let mut vm = vm_with_stack(vec![Value::Integer(1), Value::Float(0.5)]);
        vm.execute_binary_operation(OpCode::Add).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Float(1.5));
    }

    #[test]
    fn test_string_concatenation_with_stringified_integer() {
        let mut vm = vm_with_stack(vec![Value::String("count: ".into()), Value::Integer(3)]);
        vm.execute_binary_operation(OpCode::Add).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::String("count: 3".into()));
    }

    #[test]
    fn test_logical_and_returns_determining_operand() {
        let mut vm = vm_with_stack(vec![Value::Integer(0), Value::Integer(5)]);
        vm.execute_logical_operation(OpCode::LogicalAnd).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Integer(0));

        let mut vm = vm_with_stack(vec![Value::Boolean(true), Value::Integer(5)]);
        vm.execute_logical_operation(OpCode::LogicalAnd).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Integer(5));
    }

    #[test]
    fn test_logical_or_returns_determining_operand() {
        let mut vm = vm_with_stack(vec![Value::Integer(7), Value::Integer(5)]);
        vm.execute_logical_operation(OpCode::LogicalOr).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Integer(7));

        let mut vm = vm_with_stack(vec![Value::Null, Value::Integer(5)]);
        vm.execute_logical_operation(OpCode::LogicalOr).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Integer(5));
    }
}

use std::cmp::Ordering;

use crate::bytecode::op_code::OpCode;
use crate::runtime::value::Value;

use super::Vm;

impl Vm {
    pub(super) fn execute_comparison(&mut self, op: OpCode) -> Result<(), String> {
        let right = self.pop()?;
        let left = self.pop()?;

        match op {
            OpCode::Equal => self.push(Value::Boolean(values_equal(&left, &right))),
            OpCode::NotEqual => self.push(Value::Boolean(!values_equal(&left, &right))),
            OpCode::GreaterThan => {
                let ordering = compare_ordered(&left, &right)?;
                self.push(Value::Boolean(ordering == Ordering::Greater))
            }
            OpCode::GreaterEqual => {
                let ordering = compare_ordered(&left, &right)?;
                self.push(Value::Boolean(ordering != Ordering::Less))
            }
            other => Err(format!("not a comparison operator: {other}")),
        }
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Integer(l), Value::Integer(r)) => l == r,
        (Value::Float(l), Value::Float(r)) => l == r,
        (Value::Integer(l), Value::Float(r)) | (Value::Float(r), Value::Integer(l)) => {
            *l as f64 == *r
        }
        (Value::Boolean(l), Value::Boolean(r)) => l == r,
        (Value::String(l), Value::String(r)) => l == r,
        _ => false,
    }
}

fn compare_ordered(left: &Value, right: &Value) -> Result<Ordering, String> {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => Ok(l.cmp(r)),
        (Value::Float(l), Value::Float(r)) => l
            .partial_cmp(r)
            .ok_or_else(|| "cannot compare NaN".to_string()),
        (Value::Integer(l), Value::Float(r)) => (*l as f64)
            .partial_cmp(r)
            .ok_or_else(|| "cannot compare NaN".to_string()),
        (Value::Float(l), Value::Integer(r)) => l
            .partial_cmp(&(*r as f64))
            .ok_or_else(|| "cannot compare NaN".to_string()),
        (Value::String(l), Value::String(r)) => Ok(l.cmp(r)),
        _ => Err(format!(
            "unsupported types for comparison: {} {}",
            left.type_name(),
            right.type_name()
        )),
    }
}

#[cfg(test)]
mod comparison_ops_test {
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
    fn test_null_equals_null() {
        let mut vm = vm_with_stack(vec![Value::Null, Value::Null]);
        vm.execute_comparison(OpCode::Equal).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_mixed_int_float_equality() {
        let mut vm = vm_with_stack(vec![Value::Integer(2), Value::Float(2.0)]);
        vm.execute_comparison(OpCode::Equal).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_different_types_not_equal() {
        let mut vm = vm_with_stack(vec![Value::Integer(2), Value::String("2".into())]);
        vm.execute_comparison(OpCode::Equal).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Boolean(false));
    }

    #[test]
    fn test_string_lexicographic_ordering() {
        let mut vm = vm_with_stack(vec![Value::String("banana".into()), Value::String("apple".into())]);
        vm.execute_comparison(OpCode::GreaterThan).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_greater_equal_on_equal_numbers() {
        let mut vm = vm_with_stack(vec![Value::Integer(3), Value::Integer(3)]);
        vm.execute_comparison(OpCode::GreaterEqual).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_incomparable_types_is_runtime_error() {
        let mut vm = vm_with_stack(vec![Value::Boolean(true), Value::Integer(1)]);
        assert!(vm.execute_comparison(OpCode::GreaterThan).is_err());
    }
}

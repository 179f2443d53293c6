use crate::runtime::value::Value;

use super::Vm;

impl Vm {
    pub(super) fn execute_index(&mut self, left: Value, index: Value) -> Result<(), String> {
        let result = match (&left, &index) {
            (Value::Array(elements), Value::Integer(i)) => index_array(elements, *i),
            (Value::Hash(map), _) => {
                let key = index
                    .to_hash_key()
                    .ok_or_else(|| format!("unusable as hash key: {}", index.type_name()))?;
                map.get(&key).cloned().unwrap_or(Value::Null)
            }
            (Value::String(s), Value::Integer(i)) => index_string(s, *i),
            _ => {
                return Err(format!(
                    "index operator not supported: {}",
                    left.type_name()
                ));
            }
        };
        self.push(result)
    }
}

fn index_array(elements: &[Value], index: i64) -> Value {
    if index < 0 || index as usize >= elements.len() {
        return Value::Null;
    }
    elements[index as usize].clone()
}

fn index_string(s: &str, index: i64) -> Value {
    if index < 0 {
        return Value::Null;
    }
    match s.chars().nth(index as usize) {
        Some(c) => Value::String(c.to_string().into()),
        None => Value::Null,
    }
}

#[cfg(test)]
mod index_ops_test {
    use super::*;
    use crate::bytecode::bytecode::Bytecode;
    use crate::bytecode::op_code::Instructions;
    use std::collections::HashMap;
    use std::rc::Rc;

    fn new_vm() -> Vm {
        Vm::new(Bytecode {
            instructions: Instructions::new(),
            constants: vec![],
        })
    }

    #[test]
    fn test_array_index_in_range() {
        let mut vm = new_vm();
        let array = Value::Array(Rc::new(vec![Value::Integer(1), Value::Integer(2)]));
        vm.execute_index(array, Value::Integer(1)).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Integer(2));
    }

    #[test]
    fn test_array_index_out_of_range_is_null() {
        let mut vm = new_vm();
        let array = Value::Array(Rc::new(vec![Value::Integer(1)]));
        vm.execute_index(array, Value::Integer(5)).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Null);
    }

    #[test]
    fn test_array_negative_index_is_null() {
        let mut vm = new_vm();
        let array = Value::Array(Rc::new(vec![Value::Integer(1)]));
        vm.execute_index(array, Value::Integer(-1)).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Null);
    }

    #[test]
    fn test_hash_index_missing_key_is_null() {
        let mut vm = new_vm();
        let hash = Value::Hash(Rc::new(HashMap::new()));
        vm.execute_index(hash, Value::Integer(1)).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Null);
    }

    #[test]
    fn test_hash_index_present_key() {
        let mut vm = new_vm();
        let mut map = HashMap::new();
        map.insert(
            Value::String("one".into()).to_hash_key().unwrap(),
            Value::Integer(1),
        );
        let hash = Value::Hash(Rc::new(map));
        vm.execute_index(hash, Value::String("one".into())).unwrap();
        assert_eq!(vm.pop().unwrap(), Value::Integer(1));
    }

    #[test]
    fn test_string_index_returns_single_char() {
        let mut vm = new_vm();
        vm.execute_index(Value::String("hello".into()), Value::Integer(1))
            .unwrap();
        assert_eq!(vm.pop().unwrap(), Value::String("e".into()));
    }

    #[test]
    fn test_unsupported_index_target_is_runtime_error() {
        let mut vm = new_vm();
        assert!(vm.execute_index(Value::Integer(1), Value::Integer(0)).is_err());
    }
}

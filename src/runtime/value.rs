use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::runtime::builtin_function::BuiltinFunction;
use crate::runtime::closure::Closure;
use crate::runtime::compiled_function::CompiledFunction;
use crate::runtime::hash_key::HashKey;

/// Runtime value used by the VM stack, globals, constants, and closures.
///
/// Heap-shaped variants (`String`, `Array`, `Hash`) are `Rc`-backed so
/// cloning a `Value` is O(1); primitives stay unboxed. The value graph is
/// acyclic by construction (closures capture free variables by value
/// rather than by referencing the enclosing frame), so reference counting
/// alone is sufficient — there is no tracing collector.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(Rc<str>),
    Null,
    Array(Rc<Vec<Value>>),
    Hash(Rc<HashMap<HashKey, Value>>),
    Function(Rc<CompiledFunction>),
    Closure(Rc<Closure>),
    Builtin(BuiltinFunction),
    /// First-class error produced by built-in misuse. Not an exception:
    /// it is a regular value that propagates through the stack like any
    /// other until something (currently: nothing in this language)
    /// inspects it.
    Error(Rc<str>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Null => write!(f, "null"),
            Value::Array(elements) => {
                let items: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Hash(pairs) => {
                let items: Vec<String> = pairs.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            Value::Function(_) => write!(f, "<function>"),
            Value::Closure(_) => write!(f, "<closure>"),
            Value::Builtin(b) => write!(f, "<builtin {}>", b.name),
            Value::Error(message) => write!(f, "ERROR: {message}"),
        }
    }
}

impl Value {
    /// Canonical runtime type label used in error messages. User-visible,
    /// expected to remain stable.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Boolean(_) => "Boolean",
            Value::String(_) => "String",
            Value::Null => "Null",
            Value::Array(_) => "Array",
            Value::Hash(_) => "Hash",
            Value::Function(_) => "Function",
            Value::Closure(_) => "Closure",
            Value::Builtin(_) => "Builtin",
            Value::Error(_) => "Error",
        }
    }

    /// Only `false` and `null` are falsy; everything else, including `0`
    /// and `""`, is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn to_hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Integer(v) => Some(HashKey::Integer(*v)),
            Value::Boolean(v) => Some(HashKey::Boolean(*v)),
            Value::String(v) => Some(HashKey::String(v.to_string())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod value_test {
    use super::*;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Float(3.5).to_string(), "3.5");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(
            Value::Array(Rc::new(vec![Value::Integer(1), Value::Integer(2)])).to_string(),
            "[1, 2]"
        );
    }

    #[test]
    fn test_is_truthy() {
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::Float(0.0).is_truthy());
        assert!(Value::String("".into()).is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Null.is_truthy());
    }

    #[test]
    fn test_hash_key() {
        assert_eq!(Value::Integer(1).to_hash_key(), Some(HashKey::Integer(1)));
        assert_eq!(
            Value::Boolean(false).to_hash_key(),
            Some(HashKey::Boolean(false))
        );
        assert_eq!(
            Value::String("a".into()).to_hash_key(),
            Some(HashKey::String("a".to_string()))
        );
        assert_eq!(Value::Array(Rc::new(vec![])).to_hash_key(), None);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Integer(1).type_name(), "Integer");
        assert_eq!(Value::Error("boom".into()).type_name(), "Error");
    }

    #[test]
    fn test_clone_shares_rc_for_string() {
        let value = Value::String("hello".into());
        let cloned = value.clone();

        match (value, cloned) {
            (Value::String(left), Value::String(right)) => {
                assert!(Rc::ptr_eq(&left, &right));
                assert_eq!(Rc::strong_count(&left), 2);
            }
            _ => panic!("expected string values"),
        }
    }

    #[test]
    fn test_clone_shares_rc_for_array_and_hash() {
        let array = Value::Array(Rc::new(vec![Value::Integer(1), Value::Integer(2)]));
        let array_clone = array.clone();
        match (array, array_clone) {
            (Value::Array(left), Value::Array(right)) => {
                assert!(Rc::ptr_eq(&left, &right));
                assert_eq!(Rc::strong_count(&left), 2);
            }
            _ => panic!("expected array values"),
        }

        let mut map = HashMap::new();
        map.insert(HashKey::String("k".to_string()), Value::Integer(42));
        let hash = Value::Hash(Rc::new(map));
        let hash_clone = hash.clone();
        match (hash, hash_clone) {
            (Value::Hash(left), Value::Hash(right)) => {
                assert!(Rc::ptr_eq(&left, &right));
                assert_eq!(Rc::strong_count(&left), 2);
            }
            _ => panic!("expected hash values"),
        }
    }
}

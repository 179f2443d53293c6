use std::rc::Rc;

use crate::runtime::builtin_function::BuiltinFunction;
use crate::runtime::value::Value;

fn error(message: impl Into<String>) -> Value {
    Value::Error(message.into().into())
}

fn len(args: &[Value]) -> Value {
    if args.len() != 1 {
        return error(format!(
            "wrong number of arguments to len(): expected=1, got={}",
            args.len()
        ));
    }
    match &args[0] {
        Value::String(s) => Value::Integer(s.chars().count() as i64),
        Value::Array(elements) => Value::Integer(elements.len() as i64),
        other => error(format!(
            "argument of type {} to len() is not supported",
            other.type_name()
        )),
    }
}

fn first(args: &[Value]) -> Value {
    if args.len() != 1 {
        return error(format!(
            "wrong number of arguments to first(): expected=1, got={}",
            args.len()
        ));
    }
    match &args[0] {
        Value::String(s) => s.chars().next().map_or(Value::Null, |c| Value::String(c.to_string().into())),
        Value::Array(elements) => elements.first().cloned().unwrap_or(Value::Null),
        other => error(format!(
            "argument of type {} to first() is not supported",
            other.type_name()
        )),
    }
}

fn last(args: &[Value]) -> Value {
    if args.len() != 1 {
        return error(format!(
            "wrong number of arguments to last(): expected=1, got={}",
            args.len()
        ));
    }
    match &args[0] {
        Value::String(s) => {
            if s.chars().count() > 1 {
                Value::String(s.chars().last().unwrap().to_string().into())
            } else {
                Value::Null
            }
        }
        Value::Array(elements) => elements.last().cloned().unwrap_or(Value::Null),
        other => error(format!(
            "argument of type {} to last() is not supported",
            other.type_name()
        )),
    }
}

fn rest(args: &[Value]) -> Value {
    if args.len() != 1 {
        return error(format!(
            "wrong number of arguments to rest(): expected=1, got={}",
            args.len()
        ));
    }
    match &args[0] {
        Value::String(s) => {
            if s.chars().count() > 1 {
                Value::String(s.chars().skip(1).collect::<String>().into())
            } else {
                Value::Null
            }
        }
        Value::Array(elements) => {
            if elements.len() > 1 {
                Value::Array(Rc::new(elements[1..].to_vec()))
            } else {
                Value::Null
            }
        }
        other => error(format!(
            "argument of type {} to rest() is not supported",
            other.type_name()
        )),
    }
}

fn push(args: &[Value]) -> Value {
    if args.len() != 2 {
        return error(format!(
            "wrong number of arguments to push(): expected=2, got={}",
            args.len()
        ));
    }
    match &args[0] {
        Value::Array(elements) => {
            let mut copy = elements.as_ref().clone();
            copy.push(args[1].clone());
            Value::Array(Rc::new(copy))
        }
        other => error(format!(
            "argument of type {} and {} to push() are not supported",
            other.type_name(),
            args[1].type_name()
        )),
    }
}

fn puts(args: &[Value]) -> Value {
    for arg in args {
        println!("{arg}");
    }
    Value::Null
}

pub fn all() -> Vec<BuiltinFunction> {
    vec![
        BuiltinFunction { name: "len", func: len },
        BuiltinFunction { name: "first", func: first },
        BuiltinFunction { name: "last", func: last },
        BuiltinFunction { name: "rest", func: rest },
        BuiltinFunction { name: "push", func: push },
        BuiltinFunction { name: "puts", func: puts },
    ]
}

pub fn lookup(name: &str) -> Option<usize> {
    all().iter().position(|b| b.name == name)
}

#[cfg(test)]
mod builtins_test {
    use super::*;

    #[test]
    fn test_len_string_and_array() {
        assert_eq!(len(&[Value::String("hello".into())]), Value::Integer(5));
        assert_eq!(
            len(&[Value::Array(Rc::new(vec![Value::Integer(1), Value::Integer(2)]))]),
            Value::Integer(2)
        );
    }

    #[test]
    fn test_len_wrong_arity() {
        let result = len(&[]);
        assert!(matches!(result, Value::Error(ref m) if m.contains("expected=1, got=0")));
    }

    #[test]
    fn test_len_unsupported_type() {
        let result = len(&[Value::Integer(1)]);
        assert!(matches!(result, Value::Error(ref m) if m.contains("not supported")));
    }

    #[test]
    fn test_first_last_rest_on_array() {
        let arr = Value::Array(Rc::new(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]));
        assert_eq!(first(&[arr.clone()]), Value::Integer(1));
        assert_eq!(last(&[arr.clone()]), Value::Integer(3));
        assert_eq!(
            rest(&[arr]),
            Value::Array(Rc::new(vec![Value::Integer(2), Value::Integer(3)]))
        );
    }

    #[test]
    fn test_rest_on_single_element_is_null() {
        let arr = Value::Array(Rc::new(vec![Value::Integer(1)]));
        assert_eq!(rest(&[arr]), Value::Null);
    }

    #[test]
    fn test_last_on_single_char_string_is_null() {
        assert_eq!(last(&[Value::String("a".into())]), Value::Null);
        assert_eq!(last(&[Value::String("".into())]), Value::Null);
        assert_eq!(
            last(&[Value::String("ab".into())]),
            Value::String("b".into())
        );
    }

    #[test]
    fn test_push_returns_new_array() {
        let arr = Value::Array(Rc::new(vec![Value::Integer(1)]));
        let pushed = push(&[arr.clone(), Value::Integer(2)]);
        assert_eq!(
            pushed,
            Value::Array(Rc::new(vec![Value::Integer(1), Value::Integer(2)]))
        );
        assert_eq!(arr, Value::Array(Rc::new(vec![Value::Integer(1)])));
    }

    #[test]
    fn test_lookup_finds_index() {
        assert_eq!(lookup("len"), Some(0));
        assert_eq!(lookup("puts"), Some(5));
        assert_eq!(lookup("missing"), None);
    }
}

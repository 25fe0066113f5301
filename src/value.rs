//! Runtime values.
//!
//! Primitive payloads are stored inline. `Array` and `Dict` payloads live
//! behind reference-counted cells, so cloning a composed value yields another
//! handle to the same storage: assignment, loop binding and variable reads all
//! alias rather than copy.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::types::Type;

#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Float(f32),
    Char(char),
    String(String),
    Array(ArrayRef),
    Dict(DictRef),
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Float(_) => Type::Float,
            Value::Char(_) => Type::Char,
            Value::String(_) => Type::String,
            Value::Array(array) => Type::array(array.elem_type().clone()),
            Value::Dict(dict) => Type::dict(dict.key_type().clone(), dict.value_type().clone()),
        }
    }

    /// The value an uninitialized declaration of `ty` starts with.
    pub fn zero(ty: &Type) -> Value {
        match ty {
            Type::Bool => Value::Bool(false),
            Type::Int => Value::Int(0),
            Type::Float => Value::Float(0.0),
            Type::Char => Value::Char('\0'),
            Type::String => Value::String(String::new()),
            Type::Array(elem) => Value::Array(ArrayRef::new(elem.as_ref().clone(), Vec::new())),
            Type::Dict { key, value } => Value::Dict(DictRef::new(
                key.as_ref().clone(),
                value.as_ref().clone(),
            )),
        }
    }

    /// Payload equality, as used for Dict keys. Values of different
    /// categories are never equal.
    pub fn payload_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                let (a, b) = (a.items.borrow(), b.items.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.payload_eq(y))
            }
            (Value::Dict(a), Value::Dict(b)) => {
                if a.ptr_eq(b) {
                    return true;
                }
                let (a, b) = (a.entries.borrow(), b.entries.borrow());
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((k1, v1), (k2, v2))| k1.payload_eq(k2) && v1.payload_eq(v2))
            }
            _ => false,
        }
    }

    /// Debug form used by `dump` and for elements inside containers:
    /// strings and chars are quoted.
    pub fn repr(&self) -> String {
        match self {
            Value::String(s) => format!("{:?}", s),
            Value::Char(c) => format!("{:?}", c),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.ty().matches(&other.ty()) && self.payload_eq(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::Char(c) => write!(f, "{}", c),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(array) => {
                let items: Vec<String> = array.items.borrow().iter().map(Value::repr).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Value::Dict(dict) => {
                let entries: Vec<String> = dict
                    .entries
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.repr(), v.repr()))
                    .collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
        }
    }
}

/// Shortest round-trip text for a float, always showing a fractional part
/// when the value is finite and integral.
pub fn format_float(x: f32) -> String {
    let text = x.to_string();
    if x.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

#[derive(Debug, Clone)]
pub struct ArrayRef {
    elem: Type,
    items: Rc<RefCell<Vec<Value>>>,
}

impl ArrayRef {
    pub fn new(elem: Type, items: Vec<Value>) -> Self {
        Self {
            elem,
            items: Rc::new(RefCell::new(items)),
        }
    }

    pub fn elem_type(&self) -> &Type {
        &self.elem
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.borrow().get(index).cloned()
    }

    /// Replaces the element at `index` in the shared storage. Returns false
    /// when the index is out of range.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.items.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn push(&self, value: Value) {
        self.items.borrow_mut().push(value);
    }

    /// Copy of the element handles at this moment.
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }
}

/// Ordered association list. Keys are distinct by payload equality and keep
/// insertion order; writing an existing key moves it to the end.
#[derive(Debug, Clone)]
pub struct DictRef {
    key: Type,
    value: Type,
    entries: Rc<RefCell<Vec<(Value, Value)>>>,
}

impl DictRef {
    pub fn new(key: Type, value: Type) -> Self {
        Self {
            key,
            value,
            entries: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn key_type(&self) -> &Type {
        &self.key
    }

    pub fn value_type(&self) -> &Type {
        &self.value
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.entries
            .borrow()
            .iter()
            .find(|(k, _)| k.payload_eq(key))
            .map(|(_, v)| v.clone())
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.entries.borrow().iter().any(|(k, _)| k.payload_eq(key))
    }

    pub fn insert(&self, key: Value, value: Value) {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|(k, _)| !k.payload_eq(&key));
        entries.push((key, value));
    }

    pub fn keys(&self) -> Vec<Value> {
        self.entries.borrow().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.entries.borrow().iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn ptr_eq(&self, other: &DictRef) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

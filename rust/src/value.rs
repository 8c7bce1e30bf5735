//! Runtime values conforming to a shape.

use std::collections::BTreeMap;

use crate::schema::TypeKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Struct(Instance),
}

impl Value {
    pub fn kind(&self) -> TypeKind {
        match self {
            Value::Bool(_) => TypeKind::Bool,
            Value::Byte(_) => TypeKind::Byte,
            Value::I16(_) => TypeKind::I16,
            Value::I32(_) => TypeKind::I32,
            Value::I64(_) => TypeKind::I64,
            Value::Double(_) => TypeKind::Double,
            Value::String(_) => TypeKind::String,
            Value::Binary(_) => TypeKind::Binary,
            Value::List(_) => TypeKind::List,
            Value::Set(_) => TypeKind::Set,
            Value::Map(_) => TypeKind::Map,
            Value::Struct(_) => TypeKind::Struct,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Instance> for Value {
    fn from(v: Instance) -> Self {
        Value::Struct(v)
    }
}

/// Field id -> value. Absent ids are unset fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Instance {
    fields: BTreeMap<i16, Value>,
}

impl Instance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `set`.
    pub fn with(mut self, id: i16, value: impl Into<Value>) -> Self {
        self.fields.insert(id, value.into());
        self
    }

    pub fn set(&mut self, id: i16, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(id, value.into())
    }

    pub fn get(&self, id: i16) -> Option<&Value> {
        self.fields.get(&id)
    }

    pub fn contains(&self, id: i16) -> bool {
        self.fields.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (i16, &Value)> {
        self.fields.iter().map(|(id, v)| (*id, v))
    }
}

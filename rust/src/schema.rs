//! Shape definitions: named, ordered sets of typed fields.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::RegistryError;

/// Coarse type classification, used for error reporting and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
    List,
    Set,
    Map,
    Struct,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Bool => "bool",
            TypeKind::Byte => "byte",
            TypeKind::I16 => "i16",
            TypeKind::I32 => "i32",
            TypeKind::I64 => "i64",
            TypeKind::Double => "double",
            TypeKind::String => "string",
            TypeKind::Binary => "binary",
            TypeKind::List => "list",
            TypeKind::Set => "set",
            TypeKind::Map => "map",
            TypeKind::Struct => "struct",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a field or collection element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
    List(Box<FieldType>),
    Set(Box<FieldType>),
    Map(Box<FieldType>, Box<FieldType>),
    /// Reference to another registered shape, by name
    Struct(String),
}

impl FieldType {
    pub fn list(elem: FieldType) -> Self {
        FieldType::List(Box::new(elem))
    }

    pub fn set(elem: FieldType) -> Self {
        FieldType::Set(Box::new(elem))
    }

    pub fn map(key: FieldType, value: FieldType) -> Self {
        FieldType::Map(Box::new(key), Box::new(value))
    }

    pub fn strukt(shape: impl Into<String>) -> Self {
        FieldType::Struct(shape.into())
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            FieldType::Bool => TypeKind::Bool,
            FieldType::Byte => TypeKind::Byte,
            FieldType::I16 => TypeKind::I16,
            FieldType::I32 => TypeKind::I32,
            FieldType::I64 => TypeKind::I64,
            FieldType::Double => TypeKind::Double,
            FieldType::String => TypeKind::String,
            FieldType::Binary => TypeKind::Binary,
            FieldType::List(_) => TypeKind::List,
            FieldType::Set(_) => TypeKind::Set,
            FieldType::Map(..) => TypeKind::Map,
            FieldType::Struct(_) => TypeKind::Struct,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requiredness {
    Required,
    Optional,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: i16,
    pub name: String,
    pub ty: FieldType,
    pub requiredness: Requiredness,
}

impl Field {
    pub fn is_required(&self) -> bool {
        self.requiredness == Requiredness::Required
    }
}

/// A named, versioned struct schema.
///
/// ```rust
/// use compactcode::schema::{FieldType, Shape};
///
/// let shape = Shape::new("Point")
///     .required(1, "x", FieldType::I32)
///     .optional(2, "label", FieldType::String);
/// assert_eq!(shape.fields.len(), 2);
/// assert!(shape.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub name: String,
    pub version: u32,
    pub fields: Vec<Field>,
}

impl Shape {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 1,
            fields: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn field(
        mut self,
        id: i16,
        name: impl Into<String>,
        ty: FieldType,
        requiredness: Requiredness,
    ) -> Self {
        self.fields.push(Field {
            id,
            name: name.into(),
            ty,
            requiredness,
        });
        self
    }

    pub fn required(self, id: i16, name: impl Into<String>, ty: FieldType) -> Self {
        self.field(id, name, ty, Requiredness::Required)
    }

    pub fn optional(self, id: i16, name: impl Into<String>, ty: FieldType) -> Self {
        self.field(id, name, ty, Requiredness::Optional)
    }

    /// Field ids and names must each be unique within the shape.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut ids = HashSet::with_capacity(self.fields.len());
        let mut names = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !ids.insert(field.id) {
                return Err(RegistryError::DuplicateFieldId {
                    shape: self.name.clone(),
                    id: field.id,
                });
            }
            if !names.insert(field.name.as_str()) {
                return Err(RegistryError::DuplicateFieldName {
                    shape: self.name.clone(),
                    name: field.name.clone(),
                });
            }
        }
        Ok(())
    }
}

//! Resolved per-shape codec plans.
//!
//! A [`Descriptor`] is built once from a [`Shape`]: struct references are
//! linked to their own descriptors and fields are indexed by id, so encode
//! and decode never look anything up by name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Error;
use crate::schema::{FieldType, Shape, TypeKind};

/// Linked form of a [`FieldType`].
#[derive(Debug, Clone)]
pub enum Plan {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
    List(Box<Plan>),
    Set(Box<Plan>),
    Map(Box<Plan>, Box<Plan>),
    Struct(Arc<Descriptor>),
}

impl Plan {
    pub fn kind(&self) -> TypeKind {
        match self {
            Plan::Bool => TypeKind::Bool,
            Plan::Byte => TypeKind::Byte,
            Plan::I16 => TypeKind::I16,
            Plan::I32 => TypeKind::I32,
            Plan::I64 => TypeKind::I64,
            Plan::Double => TypeKind::Double,
            Plan::String => TypeKind::String,
            Plan::Binary => TypeKind::Binary,
            Plan::List(_) => TypeKind::List,
            Plan::Set(_) => TypeKind::Set,
            Plan::Map(..) => TypeKind::Map,
            Plan::Struct(_) => TypeKind::Struct,
        }
    }

    fn link<R>(ty: &FieldType, resolve: &mut R) -> Result<Plan, Error>
    where
        R: FnMut(&str) -> Result<Arc<Descriptor>, Error>,
    {
        Ok(match ty {
            FieldType::Bool => Plan::Bool,
            FieldType::Byte => Plan::Byte,
            FieldType::I16 => Plan::I16,
            FieldType::I32 => Plan::I32,
            FieldType::I64 => Plan::I64,
            FieldType::Double => Plan::Double,
            FieldType::String => Plan::String,
            FieldType::Binary => Plan::Binary,
            FieldType::List(elem) => Plan::List(Box::new(Plan::link(elem, resolve)?)),
            FieldType::Set(elem) => Plan::Set(Box::new(Plan::link(elem, resolve)?)),
            FieldType::Map(k, v) => Plan::Map(
                Box::new(Plan::link(k, resolve)?),
                Box::new(Plan::link(v, resolve)?),
            ),
            FieldType::Struct(name) => Plan::Struct(resolve(name)?),
        })
    }
}

#[derive(Debug, Clone)]
pub struct FieldPlan {
    pub id: i16,
    pub name: String,
    pub plan: Plan,
    pub required: bool,
}

/// Shape bound to its encode/decode plan.
#[derive(Debug)]
pub struct Descriptor {
    shape: Arc<Shape>,
    fields: Vec<FieldPlan>,
    by_id: HashMap<i16, usize>,
}

impl Descriptor {
    /// Link `shape`, resolving struct references through `resolve`.
    pub fn build<R>(shape: Arc<Shape>, mut resolve: R) -> Result<Self, Error>
    where
        R: FnMut(&str) -> Result<Arc<Descriptor>, Error>,
    {
        shape.validate()?;

        let mut fields = Vec::with_capacity(shape.fields.len());
        let mut by_id = HashMap::with_capacity(shape.fields.len());
        for (idx, field) in shape.fields.iter().enumerate() {
            fields.push(FieldPlan {
                id: field.id,
                name: field.name.clone(),
                plan: Plan::link(&field.ty, &mut resolve)?,
                required: field.is_required(),
            });
            by_id.insert(field.id, idx);
        }

        Ok(Self {
            shape,
            fields,
            by_id,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.shape.name
    }

    #[inline]
    pub fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    /// Fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldPlan] {
        &self.fields
    }

    #[inline]
    pub fn field(&self, id: i16) -> Option<&FieldPlan> {
        self.by_id.get(&id).map(|&idx| &self.fields[idx])
    }
}

//! The benchmark shape catalog.
//!
//! Size classes are chosen to stress different codec paths: empty structs,
//! single varints, length-prefixed runs, mixed scalars, and lists of scalars
//! and of structs.

use crate::error::RegistryError;
use crate::fixtures;
use crate::registry::ShapeRegistry;
use crate::schema::{FieldType, Shape};

pub const EMPTY: &str = "Empty";
pub const SMALL_INT: &str = "SmallInt";
pub const BIG_INT: &str = "BigInt";
pub const SMALL_STRING: &str = "SmallString";
pub const BIG_STRING: &str = "BigString";
pub const BIG_BINARY: &str = "BigBinary";
pub const LARGE_BINARY: &str = "LargeBinary";
pub const MIXED: &str = "Mixed";
pub const SMALL_LIST_INT: &str = "SmallListInt";
pub const BIG_LIST_INT: &str = "BigListInt";
pub const BIG_LIST_MIXED: &str = "BigListMixed";
pub const LARGE_LIST_MIXED: &str = "LargeListMixed";

/// Every catalog shape, in benchmark order.
pub const ALL: [&str; 12] = [
    EMPTY,
    SMALL_INT,
    BIG_INT,
    SMALL_STRING,
    BIG_STRING,
    BIG_BINARY,
    LARGE_BINARY,
    MIXED,
    SMALL_LIST_INT,
    BIG_LIST_INT,
    BIG_LIST_MIXED,
    LARGE_LIST_MIXED,
];

/// Registry populated with every catalog shape and its fixture.
pub fn benchmark_registry() -> Result<ShapeRegistry, RegistryError> {
    let mut reg = ShapeRegistry::new();
    register_catalog(&mut reg)?;
    Ok(reg)
}

pub fn register_catalog(reg: &mut ShapeRegistry) -> Result<(), RegistryError> {
    reg.register_with_fixture(Shape::new(EMPTY), fixtures::empty)?;
    reg.register_with_fixture(
        Shape::new(SMALL_INT).optional(1, "smallint", FieldType::I32),
        fixtures::small_int,
    )?;
    reg.register_with_fixture(
        Shape::new(BIG_INT).optional(1, "bigint", FieldType::I64),
        fixtures::big_int,
    )?;
    reg.register_with_fixture(
        Shape::new(SMALL_STRING).optional(1, "str", FieldType::String),
        fixtures::small_string,
    )?;
    reg.register_with_fixture(
        Shape::new(BIG_STRING).optional(1, "str", FieldType::String),
        fixtures::big_string,
    )?;
    reg.register_with_fixture(
        Shape::new(BIG_BINARY).optional(1, "buf", FieldType::Binary),
        fixtures::big_binary,
    )?;
    reg.register_with_fixture(
        Shape::new(LARGE_BINARY).optional(1, "buf", FieldType::Binary),
        fixtures::large_binary,
    )?;
    reg.register_with_fixture(
        Shape::new(MIXED)
            .optional(1, "i", FieldType::I32)
            .optional(2, "l", FieldType::I64)
            .optional(3, "b", FieldType::Bool)
            .optional(4, "s", FieldType::String),
        fixtures::mixed,
    )?;
    reg.register_with_fixture(
        Shape::new(SMALL_LIST_INT).optional(1, "lst", FieldType::list(FieldType::I32)),
        fixtures::small_list_int,
    )?;
    reg.register_with_fixture(
        Shape::new(BIG_LIST_INT).optional(1, "lst", FieldType::list(FieldType::I32)),
        fixtures::big_list_int,
    )?;
    reg.register_with_fixture(
        Shape::new(BIG_LIST_MIXED).optional(1, "lst", FieldType::list(FieldType::strukt(MIXED))),
        fixtures::big_list_mixed,
    )?;
    reg.register_with_fixture(
        Shape::new(LARGE_LIST_MIXED).optional(1, "lst", FieldType::list(FieldType::strukt(MIXED))),
        fixtures::large_list_mixed,
    )?;
    Ok(())
}

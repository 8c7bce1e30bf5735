//! Deterministic fixture builders for the benchmark catalog.
//!
//! Each builder is a pure function of the shape: no randomness, clock or
//! environment input, so repeated builds encode to identical bytes.
//! Composite shapes build their elements through the registry.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::catalog::MIXED;
use crate::error::Result;
use crate::registry::{self, ShapeRegistry};
use crate::value::{Instance, Value};

pub const SMALL_INT_VALUE: i32 = 5;
pub const BIG_INT_VALUE: i64 = 0x0123_4567_89ab_cdef;
pub const SMALL_STRING_VALUE: &str = "small string";
pub const BIG_STRING_LEN: usize = 10_000;
pub const BIG_BINARY_LEN: usize = 10_000;
pub const LARGE_BINARY_LEN: usize = 10_000_000;
pub const SMALL_LIST_LEN: usize = 10;
pub const BIG_LIST_LEN: usize = 10_000;
pub const LARGE_LIST_LEN: usize = 1_000_000;
pub const LIST_ELEMENT: i32 = 5;

/// Lists at least this long are built in parallel when the feature is on.
pub const PARALLEL_THRESHOLD: usize = 1_000_000;

/// Build the fixture for `shape` from the process-wide catalog.
pub fn build(shape: &str) -> Result<Instance> {
    registry::global()?.build(shape)
}

pub fn empty(_: &ShapeRegistry) -> Result<Instance> {
    Ok(Instance::new())
}

pub fn small_int(_: &ShapeRegistry) -> Result<Instance> {
    Ok(Instance::new().with(1, SMALL_INT_VALUE))
}

pub fn big_int(_: &ShapeRegistry) -> Result<Instance> {
    Ok(Instance::new().with(1, BIG_INT_VALUE))
}

pub fn small_string(_: &ShapeRegistry) -> Result<Instance> {
    Ok(Instance::new().with(1, SMALL_STRING_VALUE))
}

pub fn big_string(_: &ShapeRegistry) -> Result<Instance> {
    Ok(Instance::new().with(1, "a".repeat(BIG_STRING_LEN)))
}

pub fn big_binary(_: &ShapeRegistry) -> Result<Instance> {
    Ok(Instance::new().with(1, Value::Binary(vec![0u8; BIG_BINARY_LEN])))
}

pub fn large_binary(_: &ShapeRegistry) -> Result<Instance> {
    Ok(Instance::new().with(1, Value::Binary(vec![0u8; LARGE_BINARY_LEN])))
}

pub fn mixed(_: &ShapeRegistry) -> Result<Instance> {
    Ok(Instance::new()
        .with(1, 5)
        .with(2, 12_345i64)
        .with(3, true)
        .with(4, "hello"))
}

pub fn small_list_int(_: &ShapeRegistry) -> Result<Instance> {
    Ok(Instance::new().with(1, int_list(SMALL_LIST_LEN)))
}

pub fn big_list_int(_: &ShapeRegistry) -> Result<Instance> {
    Ok(Instance::new().with(1, int_list(BIG_LIST_LEN)))
}

pub fn big_list_mixed(reg: &ShapeRegistry) -> Result<Instance> {
    Ok(Instance::new().with(1, struct_list(reg, MIXED, BIG_LIST_LEN)?))
}

pub fn large_list_mixed(reg: &ShapeRegistry) -> Result<Instance> {
    Ok(Instance::new().with(1, struct_list(reg, MIXED, LARGE_LIST_LEN)?))
}

fn int_list(len: usize) -> Value {
    Value::List(vec![Value::I32(LIST_ELEMENT); len])
}

fn struct_list(reg: &ShapeRegistry, shape: &str, len: usize) -> Result<Value> {
    #[cfg(feature = "parallel")]
    {
        if len >= PARALLEL_THRESHOLD {
            // indexed collect keeps element order
            let items = (0..len)
                .into_par_iter()
                .map(|_| reg.build(shape).map(Value::Struct))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Value::List(items));
        }
    }

    let items = (0..len)
        .map(|_| reg.build(shape).map(Value::Struct))
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::List(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn scalar_fixtures() {
        assert_eq!(build(catalog::SMALL_INT).unwrap().get(1), Some(&Value::I32(5)));
        assert_eq!(
            build(catalog::BIG_INT).unwrap().get(1),
            Some(&Value::I64(0x123456789abcdef))
        );
        assert!(build(catalog::EMPTY).unwrap().is_empty());
    }

    #[test]
    fn sized_fixtures() {
        match build(catalog::BIG_STRING).unwrap().get(1) {
            Some(Value::String(s)) => {
                assert_eq!(s.len(), BIG_STRING_LEN);
                assert!(s.bytes().all(|b| b == b'a'));
            }
            other => panic!("unexpected {other:?}"),
        }
        match build(catalog::BIG_BINARY).unwrap().get(1) {
            Some(Value::Binary(b)) => assert_eq!(b.len(), BIG_BINARY_LEN),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn list_of_mixed_reuses_mixed_builder() {
        let mixed = build(catalog::MIXED).unwrap();
        match build(catalog::BIG_LIST_MIXED).unwrap().get(1) {
            Some(Value::List(items)) => {
                assert_eq!(items.len(), BIG_LIST_LEN);
                assert!(items.iter().all(|v| *v == Value::Struct(mixed.clone())));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

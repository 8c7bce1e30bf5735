use compactcode::schema::{FieldType, Shape};
use compactcode::{codec, Instance, ShapeRegistry, Value};
use proptest::prelude::*;

fn registry() -> ShapeRegistry {
    let mut reg = ShapeRegistry::new();
    reg.register(
        Shape::new("Inner")
            .optional(1, "i", FieldType::I32)
            .optional(2, "s", FieldType::String),
    )
    .unwrap();
    reg.register(
        Shape::new("Everything")
            .optional(1, "flag", FieldType::Bool)
            .optional(2, "byte", FieldType::Byte)
            .optional(3, "short", FieldType::I16)
            .optional(4, "int", FieldType::I32)
            .optional(5, "long", FieldType::I64)
            .optional(6, "real", FieldType::Double)
            .optional(7, "text", FieldType::String)
            .optional(8, "blob", FieldType::Binary)
            .optional(9, "ints", FieldType::list(FieldType::I32))
            .optional(10, "flags", FieldType::list(FieldType::Bool))
            .optional(20, "tags", FieldType::set(FieldType::String))
            .optional(300, "attrs", FieldType::map(FieldType::String, FieldType::I64))
            .optional(-4, "inners", FieldType::list(FieldType::strukt("Inner"))),
    )
    .unwrap();
    reg
}

fn inner() -> impl Strategy<Value = Value> {
    (proptest::option::of(any::<i32>()), proptest::option::of(".{0,8}")).prop_map(|(i, s)| {
        let mut inst = Instance::new();
        if let Some(i) = i {
            inst.set(1, i);
        }
        if let Some(s) = s {
            inst.set(2, s);
        }
        Value::Struct(inst)
    })
}

fn everything() -> impl Strategy<Value = Instance> {
    let scalars = (
        proptest::option::of(any::<bool>()),
        proptest::option::of(any::<i8>()),
        proptest::option::of(any::<i16>()),
        proptest::option::of(any::<i32>()),
        proptest::option::of(any::<i64>()),
        // NaN never compares equal
        proptest::option::of(proptest::num::f64::NORMAL | proptest::num::f64::ZERO),
        proptest::option::of(".{0,32}"),
        proptest::option::of(proptest::collection::vec(any::<u8>(), 0..64)),
    );
    let containers = (
        proptest::option::of(proptest::collection::vec(any::<i32>(), 0..40)),
        proptest::option::of(proptest::collection::vec(any::<bool>(), 0..20)),
        proptest::option::of(proptest::collection::btree_set("[a-z]{1,6}", 0..8)),
        proptest::option::of(proptest::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..8)),
        proptest::option::of(proptest::collection::vec(inner(), 0..6)),
    );

    (scalars, containers).prop_map(
        |((flag, byte, short, int, long, real, text, blob), (ints, flags, tags, attrs, inners))| {
            let mut inst = Instance::new();
            if let Some(v) = flag {
                inst.set(1, v);
            }
            if let Some(v) = byte {
                inst.set(2, Value::Byte(v));
            }
            if let Some(v) = short {
                inst.set(3, Value::I16(v));
            }
            if let Some(v) = int {
                inst.set(4, v);
            }
            if let Some(v) = long {
                inst.set(5, v);
            }
            if let Some(v) = real {
                inst.set(6, v);
            }
            if let Some(v) = text {
                inst.set(7, v);
            }
            if let Some(v) = blob {
                inst.set(8, Value::Binary(v));
            }
            if let Some(v) = ints {
                inst.set(9, Value::List(v.into_iter().map(Value::I32).collect()));
            }
            if let Some(v) = flags {
                inst.set(10, Value::List(v.into_iter().map(Value::Bool).collect()));
            }
            if let Some(v) = tags {
                inst.set(20, Value::Set(v.into_iter().map(Value::String).collect()));
            }
            if let Some(v) = attrs {
                let entries = v
                    .into_iter()
                    .map(|(k, v)| (Value::String(k), Value::I64(v)))
                    .collect();
                inst.set(300, Value::Map(entries));
            }
            if let Some(v) = inners {
                inst.set(-4, Value::List(v));
            }
            inst
        },
    )
}

proptest! {
    #[test]
    fn prop_roundtrip(inst in everything()) {
        let reg = registry();
        let desc = reg.resolve("Everything").unwrap();

        let mut buf = codec::encode(&inst, &desc).unwrap();
        let decoded = codec::decode(&mut buf, &desc).unwrap();

        prop_assert_eq!(decoded, inst);
        prop_assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn prop_encoding_is_deterministic(inst in everything()) {
        let reg = registry();
        let desc = reg.resolve("Everything").unwrap();

        let a = codec::encode(&inst, &desc).unwrap();
        let b = codec::encode(&inst.clone(), &desc).unwrap();
        prop_assert_eq!(a.as_slice(), b.as_slice());
    }

    #[test]
    fn prop_garbage_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
        let reg = registry();
        let desc = reg.resolve("Everything").unwrap();
        let mut buf = compactcode::WireBuffer::from_vec(bytes);
        let _ = codec::decode(&mut buf, &desc);
    }
}

//! Every catalog fixture must survive encode -> decode unchanged

use compactcode::{catalog, codec, fixtures, registry, Value};

fn roundtrip(shape: &str) {
    let reg = registry::global().unwrap();
    let desc = reg.resolve(shape).unwrap();
    let instance = reg.build(shape).unwrap();

    let mut buf = codec::encode(&instance, &desc).unwrap();
    let encoded_len = buf.len();
    let decoded = codec::decode(&mut buf, &desc).unwrap();

    assert_eq!(instance, decoded, "{shape} did not round-trip");
    assert_eq!(buf.remaining(), 0, "{shape} left unread bytes");

    println!("✅ {shape}: {encoded_len} bytes");
}

#[test]
fn test_catalog_roundtrip() {
    for shape in catalog::ALL {
        if shape == catalog::LARGE_LIST_MIXED {
            continue;
        }
        roundtrip(shape);
    }
}

#[test]
#[ignore = "builds a million-element list; run with --ignored"]
fn test_large_list_mixed_roundtrip() {
    roundtrip(catalog::LARGE_LIST_MIXED);
}

#[test]
fn test_fixture_builds_are_byte_identical() {
    let reg = registry::global().unwrap();
    for shape in catalog::ALL {
        if shape == catalog::LARGE_LIST_MIXED {
            continue;
        }
        let desc = reg.resolve(shape).unwrap();
        let first = codec::encode(&reg.build(shape).unwrap(), &desc).unwrap();
        let second = codec::encode(&reg.build(shape).unwrap(), &desc).unwrap();
        assert_eq!(first.as_slice(), second.as_slice(), "{shape} is not deterministic");
    }
}

#[test]
fn test_small_int_scenario() {
    let bytes = compactcode::serialize("SmallInt", &fixtures::build("SmallInt").unwrap()).unwrap();
    let decoded = compactcode::deserialize("SmallInt", &bytes).unwrap();
    assert_eq!(decoded.get(1), Some(&Value::I32(5)));
}

#[test]
fn test_mixed_scenario() {
    let mixed = fixtures::build("Mixed").unwrap();
    assert_eq!(mixed.get(1), Some(&Value::I32(5)));
    assert_eq!(mixed.get(2), Some(&Value::I64(12345)));
    assert_eq!(mixed.get(3), Some(&Value::Bool(true)));
    assert_eq!(mixed.get(4), Some(&Value::String("hello".into())));

    let bytes = compactcode::serialize("Mixed", &mixed).unwrap();
    // i32 5, i64 12345, bool in header, string "hello", stop
    assert_eq!(
        bytes,
        vec![
            0x15, 0x0a, 0x16, 0xf2, 0xc0, 0x01, 0x11, 0x18, 0x05, b'h', b'e', b'l', b'l', b'o',
            0x00
        ]
    );
    assert_eq!(compactcode::deserialize("Mixed", &bytes).unwrap(), mixed);
}

#[test]
fn test_big_list_int_scenario() {
    let list = fixtures::build("BigListInt").unwrap();
    let bytes = compactcode::serialize("BigListInt", &list).unwrap();
    let decoded = compactcode::deserialize("BigListInt", &bytes).unwrap();

    match decoded.get(1) {
        Some(Value::List(items)) => {
            assert_eq!(items.len(), 10_000);
            assert!(items.iter().all(|v| *v == Value::I32(5)));
        }
        other => panic!("expected a list, got {other:?}"),
    }
}

#[test]
fn test_big_int_wire_bytes() {
    let bytes = compactcode::serialize("BigInt", &fixtures::build("BigInt").unwrap()).unwrap();
    // header + 9-byte varint (57 significant bits after zig-zag) + stop
    assert_eq!(bytes[0], 0x16);
    assert_eq!(bytes.len(), 1 + 9 + 1);
    assert_eq!(*bytes.last().unwrap(), 0x00);
}

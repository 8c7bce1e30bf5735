//! Instance encode/decode driven by a [`Descriptor`].
//!
//! ```rust
//! use compactcode::{codec, registry};
//!
//! let reg = registry::global().unwrap();
//! let desc = reg.resolve("Mixed").unwrap();
//! let instance = reg.build("Mixed").unwrap();
//!
//! let mut buf = codec::encode(&instance, &desc).unwrap();
//! let decoded = codec::decode(&mut buf, &desc).unwrap();
//! assert_eq!(instance, decoded);
//! ```

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::buffer::WireBuffer;
use crate::descriptor::{Descriptor, Plan};
use crate::error::{DecodeError, EncodeError};
use crate::protocol::{CompactProtocol, CompactType};
use crate::value::{Instance, Value};

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Codec limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Maximum struct/container nesting; the outermost struct is depth 1.
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Encode into a fresh buffer with default limits.
pub fn encode(instance: &Instance, desc: &Descriptor) -> Result<WireBuffer, EncodeError> {
    encode_with(instance, desc, &CodecConfig::default())
}

pub fn encode_with(
    instance: &Instance,
    desc: &Descriptor,
    cfg: &CodecConfig,
) -> Result<WireBuffer, EncodeError> {
    let mut buf = WireBuffer::new();
    encode_into(instance, desc, &mut buf, cfg)?;
    Ok(buf)
}

/// Append the encoding of `instance` at the buffer's write cursor.
pub fn encode_into(
    instance: &Instance,
    desc: &Descriptor,
    buf: &mut WireBuffer,
    cfg: &CodecConfig,
) -> Result<(), EncodeError> {
    let mut proto = CompactProtocol::new(buf);
    desc.write(instance, &mut proto, cfg)
}

/// Decode one struct starting at the buffer's read cursor, with default limits.
pub fn decode(buf: &mut WireBuffer, desc: &Descriptor) -> Result<Instance, DecodeError> {
    decode_with(buf, desc, &CodecConfig::default())
}

pub fn decode_with(
    buf: &mut WireBuffer,
    desc: &Descriptor,
    cfg: &CodecConfig,
) -> Result<Instance, DecodeError> {
    let mut proto = CompactProtocol::new(buf);
    desc.read(&mut proto, cfg)
}

impl Descriptor {
    /// Write `instance` as a struct through an existing protocol.
    ///
    /// On error the buffer is left exactly as it was before the call.
    pub fn write(
        &self,
        instance: &Instance,
        proto: &mut CompactProtocol<'_>,
        cfg: &CodecConfig,
    ) -> Result<(), EncodeError> {
        let mark = proto.write_mark();
        let result = self.write_struct(instance, proto, cfg, 1);
        if result.is_err() {
            proto.discard_from(mark);
        }
        result
    }

    /// Read one struct through an existing protocol.
    pub fn read(
        &self,
        proto: &mut CompactProtocol<'_>,
        cfg: &CodecConfig,
    ) -> Result<Instance, DecodeError> {
        self.read_struct(proto, cfg, 1)
    }

    fn write_struct(
        &self,
        instance: &Instance,
        proto: &mut CompactProtocol<'_>,
        cfg: &CodecConfig,
        depth: usize,
    ) -> Result<(), EncodeError> {
        if depth > cfg.max_depth {
            return Err(EncodeError::DepthLimitExceeded(cfg.max_depth));
        }

        if let Some((id, _)) = instance.iter().find(|(id, _)| self.field(*id).is_none()) {
            return Err(EncodeError::UnknownField {
                shape: self.name().to_string(),
                id,
            });
        }

        proto.write_struct_begin();
        for field in self.fields() {
            let Some(value) = instance.get(field.id) else {
                if field.required {
                    return Err(EncodeError::MissingRequiredField {
                        shape: self.name().to_string(),
                        field: field.name.clone(),
                    });
                }
                continue;
            };

            match (&field.plan, value) {
                (Plan::Bool, Value::Bool(b)) => proto.write_bool_field(field.id, *b),
                (plan, value) => {
                    let ty = CompactType::for_kind(plan.kind());
                    check_kind(plan, value, &field.name)?;
                    proto.write_field_header(ty, field.id);
                    write_value(plan, value, &field.name, proto, cfg, depth)?;
                }
            }
        }

        proto.write_struct_end();
        Ok(())
    }

    fn read_struct(
        &self,
        proto: &mut CompactProtocol<'_>,
        cfg: &CodecConfig,
        depth: usize,
    ) -> Result<Instance, DecodeError> {
        if depth > cfg.max_depth {
            return Err(DecodeError::DepthLimitExceeded(cfg.max_depth));
        }

        let mut instance = Instance::new();
        proto.read_struct_begin();
        loop {
            let header = proto.read_field_header()?;
            if header.is_stop() {
                break;
            }

            let Some(field) = self.field(header.id) else {
                trace!(shape = self.name(), id = header.id, "skipping unknown field");
                skip_field(header.ty, proto, cfg, depth)?;
                continue;
            };

            let expected = field.plan.kind();
            if !header.ty.matches(expected) {
                return Err(DecodeError::TypeMismatch {
                    field: field.name.clone(),
                    expected,
                    found: header.ty.kind().unwrap_or(expected),
                });
            }

            let value = match header.bool_value() {
                Some(b) => Value::Bool(b),
                None => read_value(&field.plan, &field.name, proto, cfg, depth)?,
            };
            instance.set(field.id, value);
        }
        proto.read_struct_end();

        if let Some(missing) = self
            .fields()
            .iter()
            .find(|f| f.required && !instance.contains(f.id))
        {
            return Err(DecodeError::MissingRequiredField {
                shape: self.name().to_string(),
                field: missing.name.clone(),
            });
        }

        Ok(instance)
    }
}

fn check_kind(plan: &Plan, value: &Value, field: &str) -> Result<(), EncodeError> {
    if plan.kind() == value.kind() {
        Ok(())
    } else {
        Err(EncodeError::TypeMismatch {
            field: field.to_string(),
            expected: plan.kind(),
            found: value.kind(),
        })
    }
}

fn container_len(len: usize) -> Result<u32, EncodeError> {
    i32::try_from(len)
        .map(|n| n as u32)
        .map_err(|_| EncodeError::ContainerTooLarge(len))
}

/// `depth` is the depth of the enclosing struct or container.
fn write_value(
    plan: &Plan,
    value: &Value,
    field: &str,
    proto: &mut CompactProtocol<'_>,
    cfg: &CodecConfig,
    depth: usize,
) -> Result<(), EncodeError> {
    match (plan, value) {
        (Plan::Bool, Value::Bool(v)) => proto.write_bool(*v),
        (Plan::Byte, Value::Byte(v)) => proto.write_byte(*v),
        (Plan::I16, Value::I16(v)) => proto.write_i16(*v),
        (Plan::I32, Value::I32(v)) => proto.write_i32(*v),
        (Plan::I64, Value::I64(v)) => proto.write_i64(*v),
        (Plan::Double, Value::Double(v)) => proto.write_double(*v),
        (Plan::String, Value::String(v)) => {
            container_len(v.len())?;
            proto.write_binary(v.as_bytes());
        }
        (Plan::Binary, Value::Binary(v)) => {
            container_len(v.len())?;
            proto.write_binary(v);
        }
        (Plan::List(elem), Value::List(items)) | (Plan::Set(elem), Value::Set(items)) => {
            if depth + 1 > cfg.max_depth {
                return Err(EncodeError::DepthLimitExceeded(cfg.max_depth));
            }
            let count = container_len(items.len())?;
            proto.write_collection_header(CompactType::for_kind(elem.kind()), count);
            for item in items {
                check_kind(elem, item, field)?;
                write_value(elem, item, field, proto, cfg, depth + 1)?;
            }
        }
        (Plan::Map(key, val), Value::Map(entries)) => {
            if depth + 1 > cfg.max_depth {
                return Err(EncodeError::DepthLimitExceeded(cfg.max_depth));
            }
            let count = container_len(entries.len())?;
            proto.write_map_header(
                CompactType::for_kind(key.kind()),
                CompactType::for_kind(val.kind()),
                count,
            );
            for (k, v) in entries {
                check_kind(key, k, field)?;
                write_value(key, k, field, proto, cfg, depth + 1)?;
                check_kind(val, v, field)?;
                write_value(val, v, field, proto, cfg, depth + 1)?;
            }
        }
        (Plan::Struct(desc), Value::Struct(inner)) => {
            desc.write_struct(inner, proto, cfg, depth + 1)?;
        }
        (plan, value) => return Err(mismatch(plan, value, field)),
    }
    Ok(())
}

fn mismatch(plan: &Plan, value: &Value, field: &str) -> EncodeError {
    EncodeError::TypeMismatch {
        field: field.to_string(),
        expected: plan.kind(),
        found: value.kind(),
    }
}

fn read_value(
    plan: &Plan,
    field: &str,
    proto: &mut CompactProtocol<'_>,
    cfg: &CodecConfig,
    depth: usize,
) -> Result<Value, DecodeError> {
    Ok(match plan {
        Plan::Bool => Value::Bool(proto.read_bool()?),
        Plan::Byte => Value::Byte(proto.read_byte()?),
        Plan::I16 => Value::I16(proto.read_i16()?),
        Plan::I32 => Value::I32(proto.read_i32()?),
        Plan::I64 => Value::I64(proto.read_i64()?),
        Plan::Double => Value::Double(proto.read_double()?),
        Plan::String => {
            let bytes = proto.read_binary()?;
            let s = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
            Value::String(s.to_owned())
        }
        Plan::Binary => Value::Binary(proto.read_binary()?.to_vec()),
        Plan::List(elem) => Value::List(read_elements(elem, field, proto, cfg, depth)?),
        Plan::Set(elem) => Value::Set(read_elements(elem, field, proto, cfg, depth)?),
        Plan::Map(key, val) => {
            if depth + 1 > cfg.max_depth {
                return Err(DecodeError::DepthLimitExceeded(cfg.max_depth));
            }
            let (key_ty, val_ty, count) = proto.read_map_header()?;
            if count > 0 {
                check_elem(key_ty, key, field)?;
                check_elem(val_ty, val, field)?;
            }
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                let k = read_value(key, field, proto, cfg, depth + 1)?;
                let v = read_value(val, field, proto, cfg, depth + 1)?;
                entries.push((k, v));
            }
            Value::Map(entries)
        }
        Plan::Struct(desc) => Value::Struct(desc.read_struct(proto, cfg, depth + 1)?),
    })
}

fn read_elements(
    elem: &Plan,
    field: &str,
    proto: &mut CompactProtocol<'_>,
    cfg: &CodecConfig,
    depth: usize,
) -> Result<Vec<Value>, DecodeError> {
    if depth + 1 > cfg.max_depth {
        return Err(DecodeError::DepthLimitExceeded(cfg.max_depth));
    }
    let (elem_ty, count) = proto.read_collection_header()?;
    if count > 0 {
        check_elem(elem_ty, elem, field)?;
    }
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(read_value(elem, field, proto, cfg, depth + 1)?);
    }
    Ok(items)
}

fn check_elem(wire: CompactType, plan: &Plan, field: &str) -> Result<(), DecodeError> {
    let expected = plan.kind();
    if wire.matches(expected) {
        Ok(())
    } else {
        Err(DecodeError::TypeMismatch {
            field: field.to_string(),
            expected,
            found: wire.kind().unwrap_or(expected),
        })
    }
}

/// Skip a field body whose header has already been read.
fn skip_field(
    ty: CompactType,
    proto: &mut CompactProtocol<'_>,
    cfg: &CodecConfig,
    depth: usize,
) -> Result<(), DecodeError> {
    match ty {
        // value lives in the header
        CompactType::BooleanTrue | CompactType::BooleanFalse => Ok(()),
        other => skip_value(other, proto, cfg, depth),
    }
}

fn skip_value(
    ty: CompactType,
    proto: &mut CompactProtocol<'_>,
    cfg: &CodecConfig,
    depth: usize,
) -> Result<(), DecodeError> {
    match ty {
        CompactType::Stop => return Err(DecodeError::UnknownType(CompactType::Stop as u8)),
        CompactType::BooleanTrue | CompactType::BooleanFalse => {
            proto.read_bool()?;
        }
        CompactType::Byte => {
            proto.read_byte()?;
        }
        CompactType::I16 | CompactType::I32 => {
            proto.buffer_mut().read_varint32()?;
        }
        CompactType::I64 => {
            proto.buffer_mut().read_varint64()?;
        }
        CompactType::Double => {
            proto.read_double()?;
        }
        CompactType::Binary => {
            proto.read_binary()?;
        }
        CompactType::List | CompactType::Set => {
            if depth + 1 > cfg.max_depth {
                return Err(DecodeError::DepthLimitExceeded(cfg.max_depth));
            }
            let (elem, count) = proto.read_collection_header()?;
            for _ in 0..count {
                skip_value(elem, proto, cfg, depth + 1)?;
            }
        }
        CompactType::Map => {
            if depth + 1 > cfg.max_depth {
                return Err(DecodeError::DepthLimitExceeded(cfg.max_depth));
            }
            let (key, val, count) = proto.read_map_header()?;
            for _ in 0..count {
                skip_value(key, proto, cfg, depth + 1)?;
                skip_value(val, proto, cfg, depth + 1)?;
            }
        }
        CompactType::Struct => {
            if depth + 1 > cfg.max_depth {
                return Err(DecodeError::DepthLimitExceeded(cfg.max_depth));
            }
            proto.read_struct_begin();
            loop {
                let header = proto.read_field_header()?;
                if header.is_stop() {
                    break;
                }
                skip_field(header.ty, proto, cfg, depth + 1)?;
            }
            proto.read_struct_end();
        }
    }
    Ok(())
}

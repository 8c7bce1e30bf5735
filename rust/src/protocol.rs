//! Compact protocol framing: field headers, collection headers and scalars
//! layered over a [`WireBuffer`].
//!
//! Field headers use a delta against the previous field id when it fits in
//! a nibble, otherwise a full type byte followed by a zig-zag field id.
//! Boolean fields carry their value in the header and have no payload.

use crate::buffer::WireBuffer;
use crate::error::DecodeError;
use crate::schema::TypeKind;

/// Type ids as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CompactType {
    Stop = 0,
    BooleanTrue = 1,
    BooleanFalse = 2,
    Byte = 3,
    I16 = 4,
    I32 = 5,
    I64 = 6,
    Double = 7,
    Binary = 8,
    List = 9,
    Set = 10,
    Map = 11,
    Struct = 12,
}

impl CompactType {
    /// Wire id used for a declared type (booleans default to the "true" id,
    /// which is what collection headers carry).
    pub fn for_kind(kind: TypeKind) -> Self {
        match kind {
            TypeKind::Bool => CompactType::BooleanTrue,
            TypeKind::Byte => CompactType::Byte,
            TypeKind::I16 => CompactType::I16,
            TypeKind::I32 => CompactType::I32,
            TypeKind::I64 => CompactType::I64,
            TypeKind::Double => CompactType::Double,
            TypeKind::String | TypeKind::Binary => CompactType::Binary,
            TypeKind::List => CompactType::List,
            TypeKind::Set => CompactType::Set,
            TypeKind::Map => CompactType::Map,
            TypeKind::Struct => CompactType::Struct,
        }
    }

    /// Declared kind this wire id decodes as. `Binary` reports as binary;
    /// strings and binaries share a wire id.
    pub fn kind(self) -> Option<TypeKind> {
        match self {
            CompactType::Stop => None,
            CompactType::BooleanTrue | CompactType::BooleanFalse => Some(TypeKind::Bool),
            CompactType::Byte => Some(TypeKind::Byte),
            CompactType::I16 => Some(TypeKind::I16),
            CompactType::I32 => Some(TypeKind::I32),
            CompactType::I64 => Some(TypeKind::I64),
            CompactType::Double => Some(TypeKind::Double),
            CompactType::Binary => Some(TypeKind::Binary),
            CompactType::List => Some(TypeKind::List),
            CompactType::Set => Some(TypeKind::Set),
            CompactType::Map => Some(TypeKind::Map),
            CompactType::Struct => Some(TypeKind::Struct),
        }
    }

    /// Whether a value with wire id `self` can fill a field declared as `kind`.
    pub fn matches(self, kind: TypeKind) -> bool {
        match kind {
            TypeKind::Bool => matches!(self, CompactType::BooleanTrue | CompactType::BooleanFalse),
            other => self == CompactType::for_kind(other),
        }
    }
}

impl TryFrom<u8> for CompactType {
    type Error = DecodeError;

    fn try_from(v: u8) -> Result<Self, DecodeError> {
        Ok(match v {
            0 => CompactType::Stop,
            1 => CompactType::BooleanTrue,
            2 => CompactType::BooleanFalse,
            3 => CompactType::Byte,
            4 => CompactType::I16,
            5 => CompactType::I32,
            6 => CompactType::I64,
            7 => CompactType::Double,
            8 => CompactType::Binary,
            9 => CompactType::List,
            10 => CompactType::Set,
            11 => CompactType::Map,
            12 => CompactType::Struct,
            other => return Err(DecodeError::UnknownType(other)),
        })
    }
}

/// A decoded field header. `ty == Stop` marks the end of a struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldHeader {
    pub ty: CompactType,
    pub id: i16,
}

impl FieldHeader {
    pub fn is_stop(&self) -> bool {
        self.ty == CompactType::Stop
    }

    /// For boolean fields, the value carried in the header.
    pub fn bool_value(&self) -> Option<bool> {
        match self.ty {
            CompactType::BooleanTrue => Some(true),
            CompactType::BooleanFalse => Some(false),
            _ => None,
        }
    }
}

/// Write position and field-id state captured by [`CompactProtocol::write_mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteMark {
    len: usize,
    last_field_id: i16,
    depth: usize,
}

/// Compact protocol bound to a transport buffer.
///
/// Creating one is cheap: no allocation until a nested struct is entered.
pub struct CompactProtocol<'a> {
    buf: &'a mut WireBuffer,
    last_field_id: i16,
    field_stack: Vec<i16>,
}

impl<'a> CompactProtocol<'a> {
    pub fn new(buf: &'a mut WireBuffer) -> Self {
        Self {
            buf,
            last_field_id: 0,
            field_stack: Vec::new(),
        }
    }

    pub fn buffer(&self) -> &WireBuffer {
        &*self.buf
    }

    pub fn buffer_mut(&mut self) -> &mut WireBuffer {
        &mut *self.buf
    }

    // ==================== Write side ====================

    pub fn write_mark(&self) -> WriteMark {
        WriteMark {
            len: self.buf.len(),
            last_field_id: self.last_field_id,
            depth: self.field_stack.len(),
        }
    }

    /// Drop everything written since `mark` and restore the field-id state.
    pub fn discard_from(&mut self, mark: WriteMark) {
        self.buf.truncate(mark.len);
        self.field_stack.truncate(mark.depth);
        self.last_field_id = mark.last_field_id;
    }

    pub fn write_struct_begin(&mut self) {
        self.field_stack.push(self.last_field_id);
        self.last_field_id = 0;
    }

    pub fn write_struct_end(&mut self) {
        self.buf.write_u8(CompactType::Stop as u8);
        self.last_field_id = self.field_stack.pop().unwrap_or(0);
    }

    pub fn write_field_header(&mut self, ty: CompactType, id: i16) {
        let delta = i32::from(id) - i32::from(self.last_field_id);
        if (1..=15).contains(&delta) {
            self.buf.write_u8(((delta as u8) << 4) | ty as u8);
        } else {
            self.buf.write_u8(ty as u8);
            self.buf.write_i16(id);
        }
        self.last_field_id = id;
    }

    pub fn write_bool_field(&mut self, id: i16, v: bool) {
        let ty = if v {
            CompactType::BooleanTrue
        } else {
            CompactType::BooleanFalse
        };
        self.write_field_header(ty, id);
    }

    /// Boolean outside a field header (collection element).
    pub fn write_bool(&mut self, v: bool) {
        let ty = if v {
            CompactType::BooleanTrue
        } else {
            CompactType::BooleanFalse
        };
        self.buf.write_u8(ty as u8);
    }

    pub fn write_byte(&mut self, v: i8) {
        self.buf.write_u8(v as u8);
    }

    pub fn write_i16(&mut self, v: i16) {
        self.buf.write_i16(v);
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.write_i32(v);
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.write_i64(v);
    }

    pub fn write_double(&mut self, v: f64) {
        self.buf.write_f64(v);
    }

    /// Length-prefixed byte run (strings and binaries).
    pub fn write_binary(&mut self, bytes: &[u8]) {
        self.buf.write_varint(bytes.len() as u64);
        self.buf.write_bytes(bytes);
    }

    /// List and set headers share one layout.
    pub fn write_collection_header(&mut self, elem: CompactType, count: u32) {
        if count < 15 {
            self.buf.write_u8(((count as u8) << 4) | elem as u8);
        } else {
            self.buf.write_u8(0xf0 | elem as u8);
            self.buf.write_varint(u64::from(count));
        }
    }

    pub fn write_map_header(&mut self, key: CompactType, value: CompactType, count: u32) {
        self.buf.write_varint(u64::from(count));
        if count > 0 {
            self.buf.write_u8(((key as u8) << 4) | value as u8);
        }
    }

    // ==================== Read side ====================

    pub fn read_struct_begin(&mut self) {
        self.field_stack.push(self.last_field_id);
        self.last_field_id = 0;
    }

    pub fn read_struct_end(&mut self) {
        self.last_field_id = self.field_stack.pop().unwrap_or(0);
    }

    pub fn read_field_header(&mut self) -> Result<FieldHeader, DecodeError> {
        let byte = self.buf.read_u8()?;
        let ty = CompactType::try_from(byte & 0x0f)?;
        if ty == CompactType::Stop {
            return Ok(FieldHeader { ty, id: 0 });
        }
        let delta = byte >> 4;
        let id = if delta == 0 {
            self.buf.read_i16()?
        } else {
            self.last_field_id
                .checked_add(i16::from(delta))
                .ok_or(DecodeError::IntegerOverflow)?
        };
        self.last_field_id = id;
        Ok(FieldHeader { ty, id })
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        match CompactType::try_from(self.buf.read_u8()?)? {
            CompactType::BooleanTrue => Ok(true),
            // some writers emit 0 for false inside collections
            CompactType::BooleanFalse | CompactType::Stop => Ok(false),
            other => Err(DecodeError::UnknownType(other as u8)),
        }
    }

    pub fn read_byte(&mut self) -> Result<i8, DecodeError> {
        Ok(self.buf.read_u8()? as i8)
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        self.buf.read_i16()
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        self.buf.read_i32()
    }

    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        self.buf.read_i64()
    }

    pub fn read_double(&mut self) -> Result<f64, DecodeError> {
        self.buf.read_f64()
    }

    pub fn read_binary(&mut self) -> Result<&[u8], DecodeError> {
        let len = self.read_length()?;
        self.buf.read_bytes(len)
    }

    /// Returns element type and count.
    pub fn read_collection_header(&mut self) -> Result<(CompactType, usize), DecodeError> {
        let byte = self.buf.read_u8()?;
        let elem = CompactType::try_from(byte & 0x0f)?;
        let short = (byte >> 4) & 0x0f;
        let count = if short == 15 {
            self.read_length()?
        } else {
            usize::from(short)
        };
        self.check_count(count)?;
        Ok((elem, count))
    }

    /// Returns key type, value type and count. Empty maps carry no type byte.
    pub fn read_map_header(&mut self) -> Result<(CompactType, CompactType, usize), DecodeError> {
        let count = self.read_length()?;
        if count == 0 {
            return Ok((CompactType::Stop, CompactType::Stop, 0));
        }
        self.check_count(count)?;
        let kv = self.buf.read_u8()?;
        let key = CompactType::try_from(kv >> 4)?;
        let value = CompactType::try_from(kv & 0x0f)?;
        Ok((key, value, count))
    }

    /// Varint length prefix, validated against the unread bytes.
    fn read_length(&mut self) -> Result<usize, DecodeError> {
        let raw = self.buf.read_varint32()? as i32;
        if raw < 0 {
            return Err(DecodeError::NegativeLength(i64::from(raw)));
        }
        let len = raw as usize;
        let remaining = self.buf.remaining();
        if len > remaining {
            return Err(DecodeError::LengthExceedsBuffer { len, remaining });
        }
        Ok(len)
    }

    // every element occupies at least one byte
    fn check_count(&self, count: usize) -> Result<(), DecodeError> {
        let remaining = self.buf.remaining();
        if count > remaining {
            return Err(DecodeError::LengthExceedsBuffer {
                len: count,
                remaining,
            });
        }
        Ok(())
    }
}

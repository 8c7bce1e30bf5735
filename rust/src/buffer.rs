//! Growable byte buffer with independent read and write cursors.

use crate::error::DecodeError;
use crate::varint;

/// Wire buffer - bytes are appended at the write end and consumed from the
/// read cursor. The write cursor is always `len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireBuffer {
    buf: Vec<u8>,
    read_pos: usize,
}

impl WireBuffer {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
            read_pos: 0,
        }
    }

    /// Wrap already-encoded bytes for reading.
    #[inline]
    pub fn from_vec(buf: Vec<u8>) -> Self {
        Self { buf, read_pos: 0 }
    }

    #[inline]
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    /// Everything written so far, regardless of the read cursor.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn read_position(&self) -> usize {
        self.read_pos
    }

    /// Bytes between the read cursor and the write cursor.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.read_pos
    }

    /// Rewind the read cursor to the start.
    #[inline]
    pub fn rewind(&mut self) {
        self.read_pos = 0;
    }

    /// Drop everything past `len` and pull the read cursor back if needed.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
        self.read_pos = self.read_pos.min(self.buf.len());
    }

    // ==================== Write side ====================

    #[inline]
    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    pub fn write_varint(&mut self, v: u64) {
        varint::encode_varint(v, &mut self.buf);
    }

    #[inline]
    pub fn write_i16(&mut self, v: i16) {
        self.write_varint(u64::from(varint::zigzag_encode_32(i32::from(v))));
    }

    #[inline]
    pub fn write_i32(&mut self, v: i32) {
        self.write_varint(u64::from(varint::zigzag_encode_32(v)));
    }

    #[inline]
    pub fn write_i64(&mut self, v: i64) {
        self.write_varint(varint::zigzag_encode_64(v));
    }

    #[inline]
    pub fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_bits().to_le_bytes());
    }

    // ==================== Read side ====================

    #[inline(always)]
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let v = *self.buf.get(self.read_pos).ok_or(DecodeError::Truncated {
            needed: 1,
            remaining: 0,
        })?;
        self.read_pos += 1;
        Ok(v)
    }

    #[inline(always)]
    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8], DecodeError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(DecodeError::Truncated {
                needed: len,
                remaining,
            });
        }
        let slice = &self.buf[self.read_pos..self.read_pos + len];
        self.read_pos += len;
        Ok(slice)
    }

    #[inline]
    pub fn read_varint32(&mut self) -> Result<u32, DecodeError> {
        let (v, used) = varint::decode_varint32(&self.buf[self.read_pos..])?;
        self.read_pos += used;
        Ok(v)
    }

    #[inline]
    pub fn read_varint64(&mut self) -> Result<u64, DecodeError> {
        let (v, used) = varint::decode_varint64(&self.buf[self.read_pos..])?;
        self.read_pos += used;
        Ok(v)
    }

    #[inline]
    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        let v = varint::zigzag_decode_32(self.read_varint32()?);
        i16::try_from(v).map_err(|_| DecodeError::IntegerOverflow)
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(varint::zigzag_decode_32(self.read_varint32()?))
    }

    #[inline]
    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(varint::zigzag_decode_64(self.read_varint64()?))
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        let bytes = self.read_bytes(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(f64::from_bits(u64::from_le_bytes(raw)))
    }
}

impl From<Vec<u8>> for WireBuffer {
    fn from(buf: Vec<u8>) -> Self {
        Self::from_vec(buf)
    }
}

impl AsRef<[u8]> for WireBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

//! # Compactcode
//!
//! Schema-driven struct codec for the Thrift compact protocol, plus a
//! deterministic benchmark harness for it.
//!
//! ```rust
//! use compactcode::{serialize, deserialize, Instance};
//!
//! let mixed = Instance::new()
//!     .with(1, 5)
//!     .with(2, 12345i64)
//!     .with(3, true)
//!     .with(4, "hello");
//! let bytes = serialize("Mixed", &mixed).unwrap();
//! let decoded = deserialize("Mixed", &bytes).unwrap();
//! assert_eq!(mixed, decoded);
//! ```

pub mod bench;
pub mod buffer;
pub mod catalog;
pub mod codec;
pub mod descriptor;
pub mod error;
pub mod fixtures;
pub mod harness;
pub mod protocol;
pub mod registry;
pub mod report;
pub mod schema;
pub mod value;
pub mod varint;

pub use buffer::WireBuffer;
pub use codec::CodecConfig;
pub use descriptor::Descriptor;
pub use error::{DecodeError, EncodeError, Error, RegistryError, Result, UnknownShapeError};
pub use registry::ShapeRegistry;
pub use schema::{FieldType, Shape};
pub use value::{Instance, Value};

/// Encode `instance` as the catalog shape `shape`.
#[inline]
pub fn serialize(shape: &str, instance: &Instance) -> Result<Vec<u8>> {
    let desc = registry::global()?.resolve(shape)?;
    Ok(codec::encode(instance, &desc)?.into_vec())
}

/// Decode `bytes` as the catalog shape `shape`.
#[inline]
pub fn deserialize(shape: &str, bytes: &[u8]) -> Result<Instance> {
    let desc = registry::global()?.resolve(shape)?;
    let mut buf = WireBuffer::from_vec(bytes.to_vec());
    Ok(codec::decode(&mut buf, &desc)?)
}

//! Error types for encoding, decoding and shape resolution.

use thiserror::Error;

use crate::schema::TypeKind;

/// Result type alias for codec and registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while writing an instance to the wire.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    /// A field value does not match the type declared by its shape
    #[error("field `{field}`: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: TypeKind,
        found: TypeKind,
    },

    /// A required field is absent from the instance
    #[error("shape `{shape}`: required field `{field}` is not set")]
    MissingRequiredField { shape: String, field: String },

    /// The instance carries a field id its shape does not declare
    #[error("shape `{shape}` has no field with id {id}")]
    UnknownField { shape: String, id: i16 },

    /// Struct or container nesting went past the configured limit
    #[error("nesting depth exceeds limit of {0}")]
    DepthLimitExceeded(usize),

    /// Collection or byte run is too long for the wire's 32-bit counts
    #[error("container of {0} elements is too large to encode")]
    ContainerTooLarge(usize),
}

/// Errors raised while reading an instance from the wire.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("truncated buffer: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("unrecognized type tag {0:#04x}")]
    UnknownType(u8),

    #[error("length prefix {len} exceeds the {remaining} remaining bytes")]
    LengthExceedsBuffer { len: usize, remaining: usize },

    #[error("negative length prefix {0}")]
    NegativeLength(i64),

    #[error("integer overflow")]
    IntegerOverflow,

    #[error("string field is not valid utf-8")]
    InvalidUtf8,

    #[error("nesting depth exceeds limit of {0}")]
    DepthLimitExceeded(usize),

    #[error("shape `{shape}`: required field `{field}` missing from input")]
    MissingRequiredField { shape: String, field: String },

    /// A known field id arrived with a wire type other than the declared one
    #[error("field `{field}`: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: TypeKind,
        found: TypeKind,
    },
}

/// The requested shape was never registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown shape `{0}`")]
pub struct UnknownShapeError(pub String);

/// Errors raised while registering or linking shapes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("shape `{0}` is already registered")]
    DuplicateShape(String),

    #[error("shape `{shape}`: field id {id} is declared more than once")]
    DuplicateFieldId { shape: String, id: i16 },

    #[error("shape `{shape}`: field name `{name}` is declared more than once")]
    DuplicateFieldName { shape: String, name: String },

    #[error("shape `{0}` refers to itself through its fields")]
    RecursiveShape(String),

    #[error("shape `{0}` has no fixture builder")]
    NoFixture(String),
}

/// Umbrella error for callers that drive the whole pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    UnknownShape(#[from] UnknownShapeError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

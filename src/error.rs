use std::io;

use thiserror::Error;
use unreal_helpers::error::FStringError;

/// Gets thrown when there is a deserialization error
#[derive(Error, Debug)]
pub enum DeserializeError {
    /// If the file header is not GVAS
    #[error("Invalid file type {0}")]
    InvalidFileType(i32),
    /// If the header itself is malformed or out of a supported version range
    #[error("Invalid header: {0}")]
    InvalidHeader(Box<str>),
    /// If a value has a size that was unexpected, e.g. UInt32Property has 8 bytes size
    #[error("Invalid value size, expected {0} got {1} at position {2}")]
    InvalidValueSize(u64, u64, u64),
    /// If a string has invalid size
    #[error("Invalid string size, got {0} at position {1}")]
    InvalidString(i32, u64),
    /// If a hint is missing.
    #[error("Missing hint for struct {0} at path {1}, cursor position: {2}")]
    MissingHint(String, String, u64),
    /// If an argument is missing
    #[error("Missing argument: {0} at position {1}")]
    MissingArgument(String, u64),
    /// If an EnumProperty has an invalid enum type
    #[error("Invalid enum type {0} at position {1}")]
    InvalidEnumType(String, u64),
    /// If a Property creation fails
    #[error("Invalid property {0} at position {1}")]
    InvalidProperty(String, u64),
    /// A property's type name didn't match what was expected at this position
    #[error("Expected property type {expected} got {got} at path {path}")]
    UnexpectedTypeName {
        /// The type name that was expected.
        expected: String,
        /// The type name that was actually read.
        got: String,
        /// The property path at which the mismatch occurred.
        path: String,
    },
    /// A padding field that must be zero was not
    #[error("Non-zero padding at path {0}, position {1}")]
    PaddingNotZero(String, u64),
    /// A property's declared `size` didn't match the number of bytes its payload actually consumed
    #[error("Size mismatch at path {path}: declared {declared}, consumed {consumed}")]
    SizeMismatch {
        /// The property path.
        path: String,
        /// The `size` field as read from the envelope.
        declared: u64,
        /// The number of bytes the payload decode actually consumed.
        consumed: u64,
    },
    /// Trailing bytes remained after a size-delimited inner read that a handler was not
    /// permitted to swallow.
    #[error("Trailing bytes after inner read at path {0}: {1} bytes remaining")]
    TrailingBytesAfterInnerRead(String, u64),
}

impl DeserializeError {
    /// A helper for creating `MissingArgument` errors
    pub fn missing_argument<S: io::Seek>(argument_name: &str, stream: &mut S) -> Self {
        let position = stream.stream_position().unwrap_or_default();
        Self::MissingArgument(argument_name.to_string(), position)
    }

    /// A helper for creating `InvalidProperty` errors
    pub fn invalid_property<S: io::Seek>(reason: &str, stream: &mut S) -> Self {
        let position = stream.stream_position().unwrap_or_default();
        Self::InvalidProperty(reason.to_string(), position)
    }
}

/// Gets thrown when there is a serialization error
#[derive(Error, Debug)]
pub enum SerializeError {
    /// A value was invalid
    #[error("Invalid value {0}")]
    InvalidValue(String),
    /// Struct is missing a field, e.g. struct with type_name `Vector` doesn't have an `X` property
    #[error("Struct {0} missing field {1}")]
    StructMissingField(String, String),
    /// A `Custom` node was encoded without the `custom_type` tag a handler needs to re-derive
    /// its encoder.
    #[error("Cannot encode Custom node without a custom_type tag at path {0}")]
    MissingCustomType(String),
}

impl SerializeError {
    /// A helper for creating `InvalidValue` errors
    pub fn invalid_value(msg: &str) -> Self {
        Self::InvalidValue(msg.to_string())
    }

    /// A helper for creating `StructMissingField` errors
    pub fn struct_missing_field(type_name: &str, missing_field: &str) -> Self {
        Self::StructMissingField(type_name.to_string(), missing_field.to_string())
    }
}

/// Gets thrown when the SAV container framing is invalid
#[derive(Error, Debug)]
pub enum ContainerError {
    /// The file is too short to contain a SAV header
    #[error("File too small to contain a SAV header: {0} bytes")]
    TooSmall(usize),
    /// The three-byte magic wasn't `PlZ` or `PlM`
    #[error("Unknown container format, magic bytes {0:?}")]
    UnknownContainerFormat([u8; 3]),
    /// The save_type byte wasn't one of the values this magic supports
    #[error("Unsupported save type {0:#04x} for magic {1:?}")]
    UnsupportedSaveType(u8, [u8; 3]),
}

/// Gets thrown when a compression codec adapter fails
#[derive(Error, Debug)]
pub enum CompressionError {
    /// The codec itself reported a failure (corrupt stream, short read, etc.)
    #[error("Compression codec failure: {0}")]
    CodecFailure(String),
    /// The decompressed length did not match the length declared in the container header
    #[error("Decompressed length mismatch: expected {expected} got {actual}")]
    LengthMismatch {
        /// Declared length from the container header.
        expected: usize,
        /// Actual length produced by the codec.
        actual: usize,
    },
    /// The codec does not support this operation (e.g. Ooz compression, which requires a
    /// proprietary encoder this crate does not have access to)
    #[error("Unsupported codec operation: {0}")]
    Unsupported(String),
}

/// A wrapper for the various error types this crate can emit
#[derive(Error, Debug)]
pub enum Error {
    /// A `DeserializeError` occurred
    #[error(transparent)]
    Deserialize(#[from] DeserializeError),
    /// A `SerializeError` occurred
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    /// A `ContainerError` occurred
    #[error(transparent)]
    Container(#[from] ContainerError),
    /// A `CompressionError` occurred
    #[error(transparent)]
    Compression(#[from] CompressionError),
    /// An `FStringError` occured
    #[error(transparent)]
    FString(#[from] FStringError),
    /// An `std::io::Error` occured
    #[error(transparent)]
    Io(#[from] io::Error),
}

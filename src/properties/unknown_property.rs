//! A passthrough for property types this crate doesn't recognize (spec
//! §4.C "no hidden loss"): the raw value bytes are kept so the property
//! still round-trips even though its shape was never decoded.

/// A property whose type name wasn't recognized; its value is kept as
/// opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnknownProperty {
    /// The wire type name as read, verbatim.
    pub type_name: String,
    /// The raw value bytes, exactly as read.
    pub raw: Vec<u8>,
}

impl UnknownProperty {
    /// Creates a new `UnknownProperty`.
    pub fn new(type_name: impl Into<String>, raw: Vec<u8>) -> Self {
        UnknownProperty {
            type_name: type_name.into(),
            raw,
        }
    }
}

//! An enum value tagged with its enum type name (spec §4.C).

use std::io::{Cursor, Write};

use crate::cursor_ext::{self, ReadExt, WriteExt};
use crate::error::Error;

/// A property holding one named value of a named enum type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumProperty {
    /// The enum type's name.
    pub enum_type: String,
    /// The chosen value's name.
    pub value: String,
}

impl EnumProperty {
    /// Creates a new `EnumProperty`.
    pub fn new(enum_type: impl Into<String>, value: impl Into<String>) -> Self {
        EnumProperty {
            enum_type: enum_type.into(),
            value: value.into(),
        }
    }

    pub(crate) fn from_bytes(enum_type: String, bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = Cursor::new(bytes.to_vec());
        let value = cursor.read_string()?;
        if !cursor_ext::at_eof(&cursor) {
            return Err(crate::error::DeserializeError::SizeMismatch {
                path: enum_type.clone(),
                declared: bytes.len() as u64,
                consumed: cursor.position(),
            }
            .into());
        }
        Ok(EnumProperty { enum_type, value })
    }

    pub(crate) fn write_body<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        cursor.write_string(&self.value)?;
        Ok(())
    }
}

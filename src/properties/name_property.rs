//! An interned name string (spec §3 `Name`).

use std::io::{Read, Seek, Write};

use crate::cursor_ext::{ReadExt, WriteExt};
use crate::error::Error;

/// A property that holds an interned name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameProperty {
    /// The name value.
    pub value: String,
}

impl NameProperty {
    /// Creates a new `NameProperty`.
    pub fn new(value: impl Into<String>) -> Self {
        NameProperty { value: value.into() }
    }

    pub(crate) fn read_body<R: Read + Seek>(cursor: &mut R) -> Result<Self, Error> {
        Ok(NameProperty {
            value: cursor.read_string()?,
        })
    }

    pub(crate) fn write_body<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        cursor.write_string(&self.value)?;
        Ok(())
    }
}

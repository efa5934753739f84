//! A reference to another object by path string.

use std::io::{Read, Seek, Write};

use crate::cursor_ext::{ReadExt, WriteExt};
use crate::error::Error;

/// A property that references another object, possibly nil (empty string).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectProperty {
    /// The referenced object's path.
    pub value: String,
}

impl From<&str> for ObjectProperty {
    fn from(value: &str) -> Self {
        ObjectProperty::new(value.into())
    }
}

impl ObjectProperty {
    /// Creates a new `ObjectProperty`.
    pub fn new(value: String) -> Self {
        ObjectProperty { value }
    }

    pub(crate) fn read_body<R: Read + Seek>(cursor: &mut R) -> Result<Self, Error> {
        Ok(ObjectProperty {
            value: cursor.read_string()?,
        })
    }

    pub(crate) fn write_body<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        cursor.write_string(&self.value)?;
        Ok(())
    }
}

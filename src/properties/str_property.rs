//! A length-prefixed GVAS string value (spec §3 `String`), distinguishing
//! an absent (`None`) string from an empty one.

use std::io::{Read, Seek, Write};

use crate::cursor_ext::{ReadExt, WriteExt};
use crate::error::Error;

/// A property that holds a GVAS string, or `None` when the string itself
/// is absent (as opposed to empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrProperty {
    /// The string value, or `None`.
    pub value: Option<String>,
}

impl From<&str> for StrProperty {
    fn from(value: &str) -> Self {
        StrProperty::new(Some(value.into()))
    }
}

impl StrProperty {
    /// Creates a new `StrProperty`.
    pub fn new(value: Option<String>) -> Self {
        StrProperty { value }
    }

    pub(crate) fn read_body<R: Read + Seek>(cursor: &mut R) -> Result<Self, Error> {
        Ok(StrProperty {
            value: cursor.read_optional_string()?,
        })
    }

    pub(crate) fn write_body<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        cursor.write_optional_string(self.value.as_deref())?;
        Ok(())
    }
}

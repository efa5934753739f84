//! A path to a `UStruct` field (spec §4.C generic property catalog).

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor_ext::{ReadExt, WriteExt};
use crate::error::Error;

/// An Unreal field path: a sequence of names and the name of the struct
/// that last resolved it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldPath {
    /// The path segments, root to leaf.
    pub path: Vec<String>,
    /// The name of the struct this path last resolved against.
    pub resolved_owner: String,
}

impl FieldPath {
    /// Creates a new `FieldPath`.
    pub fn new(path: Vec<String>, resolved_owner: String) -> Self {
        FieldPath { path, resolved_owner }
    }

    fn read<R: Read + Seek>(cursor: &mut R) -> Result<Self, Error> {
        let path_len = cursor.read_u32::<LittleEndian>()?;
        let mut path = Vec::with_capacity(path_len as usize);
        for _ in 0..path_len {
            path.push(cursor.read_string()?);
        }
        let resolved_owner = cursor.read_string()?;
        Ok(FieldPath { path, resolved_owner })
    }

    fn write<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        cursor.write_u32::<LittleEndian>(self.path.len() as u32)?;
        for segment in &self.path {
            cursor.write_string(segment)?;
        }
        cursor.write_string(&self.resolved_owner)?;
        Ok(())
    }
}

/// A property holding a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldPathProperty {
    /// The wrapped field path.
    pub value: FieldPath,
}

impl FieldPathProperty {
    /// Creates a new `FieldPathProperty`.
    pub fn new(value: FieldPath) -> Self {
        FieldPathProperty { value }
    }

    pub(crate) fn read_body<R: Read + Seek>(cursor: &mut R) -> Result<Self, Error> {
        Ok(FieldPathProperty {
            value: FieldPath::read(cursor)?,
        })
    }

    pub(crate) fn write_body<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        self.value.write(cursor)
    }
}

//! Unreal script delegate references (spec §4.C generic property catalog).

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor_ext::{ReadExt, WriteExt};
use crate::error::Error;

/// An unbound script delegate: the object it's bound to and the function
/// name to call on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Delegate {
    /// The bound object's path.
    pub object: String,
    /// The name of the function called on the bound object.
    pub function_name: String,
}

impl Delegate {
    /// Creates a new `Delegate`.
    pub fn new(object: String, function_name: String) -> Self {
        Delegate { object, function_name }
    }

    fn read<R: Read + Seek>(cursor: &mut R) -> Result<Self, Error> {
        let object = cursor.read_string()?;
        let function_name = cursor.read_string()?;
        Ok(Delegate { object, function_name })
    }

    fn write<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        cursor.write_string(&self.object)?;
        cursor.write_string(&self.function_name)?;
        Ok(())
    }
}

/// A property holding a single unbound delegate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DelegateProperty {
    /// The wrapped delegate.
    pub value: Delegate,
}

impl DelegateProperty {
    /// Creates a new `DelegateProperty`.
    pub fn new(value: Delegate) -> Self {
        DelegateProperty { value }
    }

    pub(crate) fn read_body<R: Read + Seek>(cursor: &mut R) -> Result<Self, Error> {
        Ok(DelegateProperty {
            value: Delegate::read(cursor)?,
        })
    }

    pub(crate) fn write_body<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        self.value.write(cursor)
    }
}

/// A multicast script delegate bound to zero or more object/function pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MulticastScriptDelegate {
    /// The bound delegates.
    pub delegates: Vec<Delegate>,
}

impl MulticastScriptDelegate {
    fn read<R: Read + Seek>(cursor: &mut R) -> Result<Self, Error> {
        let count = cursor.read_u32::<LittleEndian>()?;
        let mut delegates = Vec::with_capacity(count as usize);
        for _ in 0..count {
            delegates.push(Delegate::read(cursor)?);
        }
        Ok(MulticastScriptDelegate { delegates })
    }

    fn write<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        cursor.write_u32::<LittleEndian>(self.delegates.len() as u32)?;
        for delegate in &self.delegates {
            delegate.write(cursor)?;
        }
        Ok(())
    }
}

/// A property holding an inline-bound multicast delegate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MulticastInlineDelegateProperty {
    /// The wrapped multicast delegate.
    pub value: MulticastScriptDelegate,
}

impl MulticastInlineDelegateProperty {
    pub(crate) fn read_body<R: Read + Seek>(cursor: &mut R) -> Result<Self, Error> {
        Ok(MulticastInlineDelegateProperty {
            value: MulticastScriptDelegate::read(cursor)?,
        })
    }

    pub(crate) fn write_body<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        self.value.write(cursor)
    }
}

/// A property holding a sparsely-stored multicast delegate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MulticastSparseDelegateProperty {
    /// The wrapped multicast delegate.
    pub value: MulticastScriptDelegate,
}

impl MulticastSparseDelegateProperty {
    pub(crate) fn read_body<R: Read + Seek>(cursor: &mut R) -> Result<Self, Error> {
        Ok(MulticastSparseDelegateProperty {
            value: MulticastScriptDelegate::read(cursor)?,
        })
    }

    pub(crate) fn write_body<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        self.value.write(cursor)
    }
}

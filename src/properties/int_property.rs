//! Primitive numeric property bodies (spec §3 "Primitive value kinds").
//! Every type here is a thin wrapper around a single little-endian value;
//! the envelope (name, type name, size, array index) is handled once by
//! [`super::Property`], so these bodies only read/write the bare value.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::Error;

macro_rules! impl_int_property {
    ($name:ident, $ty:ty, $read_method:ident, $write_method:ident) => {
        #[doc = concat!("A `", stringify!($name), "`.")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name {
            /// The wrapped value.
            pub value: $ty,
        }

        impl $name {
            /// Wraps a raw value.
            pub fn new(value: $ty) -> Self {
                $name { value }
            }

            pub(crate) fn read_body<R: Read>(cursor: &mut R) -> Result<Self, Error> {
                Ok($name {
                    value: cursor.$read_method::<LittleEndian>()?,
                })
            }

            pub(crate) fn write_body<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
                cursor.$write_method::<LittleEndian>(self.value)?;
                Ok(())
            }
        }
    };
}

/// A single signed byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Int8Property {
    /// The wrapped value.
    pub value: i8,
}

impl Int8Property {
    /// Wraps a raw value.
    pub fn new(value: i8) -> Self {
        Int8Property { value }
    }

    pub(crate) fn read_body<R: Read>(cursor: &mut R) -> Result<Self, Error> {
        Ok(Int8Property {
            value: cursor.read_i8()?,
        })
    }

    pub(crate) fn write_body<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        cursor.write_i8(self.value)?;
        Ok(())
    }
}

impl_int_property!(Int16Property, i16, read_i16, write_i16);
impl_int_property!(UInt16Property, u16, read_u16, write_u16);
impl_int_property!(IntProperty, i32, read_i32, write_i32);
impl_int_property!(UInt32Property, u32, read_u32, write_u32);
impl_int_property!(Int64Property, i64, read_i64, write_i64);
impl_int_property!(UInt64Property, u64, read_u64, write_u64);

/// A single-precision float.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloatProperty {
    /// The wrapped value.
    pub value: f32,
}

impl FloatProperty {
    /// Wraps a raw value.
    pub fn new(value: f32) -> Self {
        FloatProperty { value }
    }

    pub(crate) fn read_body<R: Read>(cursor: &mut R) -> Result<Self, Error> {
        Ok(FloatProperty {
            value: cursor.read_f32::<LittleEndian>()?,
        })
    }

    pub(crate) fn write_body<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        cursor.write_f32::<LittleEndian>(self.value)?;
        Ok(())
    }
}

/// A double-precision float.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoubleProperty {
    /// The wrapped value.
    pub value: f64,
}

impl DoubleProperty {
    /// Wraps a raw value.
    pub fn new(value: f64) -> Self {
        DoubleProperty { value }
    }

    pub(crate) fn read_body<R: Read>(cursor: &mut R) -> Result<Self, Error> {
        Ok(DoubleProperty {
            value: cursor.read_f64::<LittleEndian>()?,
        })
    }

    pub(crate) fn write_body<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        cursor.write_f64::<LittleEndian>(self.value)?;
        Ok(())
    }
}

/// A boolean, stored inline in the property's tag (no value body at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoolProperty {
    /// The wrapped value.
    pub value: bool,
}

impl BoolProperty {
    /// Wraps a raw value.
    pub fn new(value: bool) -> Self {
        BoolProperty { value }
    }
}

/// The value a `ByteProperty` carries: a bare byte when its tag's
/// `enum_name` is `"None"`, otherwise an enum value name (spec §4.C
/// "ByteProperty").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteValue {
    /// A bare byte (no enum type attached).
    Byte(u8),
    /// An enum value name.
    Name(String),
}

/// A `ByteProperty`: either a bare byte or, when tagged with a non-`"None"`
/// enum type, an enum value name (spec §4.C).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ByteProperty {
    /// The enum type name from the tag, or `None` for a bare byte.
    pub enum_name: Option<String>,
    /// The decoded value.
    pub value: ByteValue,
}

impl ByteProperty {
    /// Creates a new bare-byte `ByteProperty`.
    pub fn new_byte(value: u8) -> Self {
        ByteProperty {
            enum_name: None,
            value: ByteValue::Byte(value),
        }
    }

    /// Creates a new enum-tagged `ByteProperty`.
    pub fn new_name(enum_name: String, value: String) -> Self {
        ByteProperty {
            enum_name: Some(enum_name),
            value: ByteValue::Name(value),
        }
    }

    pub(crate) fn from_bytes(enum_name: String, bytes: &[u8]) -> Result<Self, Error> {
        if enum_name == "None" {
            Ok(ByteProperty {
                enum_name: None,
                value: ByteValue::Byte(*bytes.first().unwrap_or(&0)),
            })
        } else {
            let mut cursor = std::io::Cursor::new(bytes.to_vec());
            let value = crate::cursor_ext::ReadExt::read_string(&mut cursor)?;
            Ok(ByteProperty {
                enum_name: Some(enum_name),
                value: ByteValue::Name(value),
            })
        }
    }

    pub(crate) fn write_body<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        match &self.value {
            ByteValue::Byte(b) => cursor.write_u8(*b)?,
            ByteValue::Name(name) => {
                crate::cursor_ext::WriteExt::write_string(cursor, name)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn int_round_trip() {
        let value = IntProperty::new(-42);
        let mut buf = Cursor::new(Vec::new());
        value.write_body(&mut buf).unwrap();
        buf.set_position(0);
        assert_eq!(IntProperty::read_body(&mut buf).unwrap(), value);
    }

    #[test]
    fn byte_property_bare_byte() {
        let prop = ByteProperty::from_bytes("None".to_string(), &[7]).unwrap();
        assert_eq!(prop.value, ByteValue::Byte(7));
        let mut buf = Cursor::new(Vec::new());
        prop.write_body(&mut buf).unwrap();
        assert_eq!(buf.into_inner(), vec![7]);
    }
}

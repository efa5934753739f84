//! An ordered sequence of key/value pairs (spec §4.C). Entry order is
//! load-bearing, so this is a `Vec<(Property, Property)>`, never a
//! `HashMap`/`IndexMap` keyed structure (see DESIGN.md).

use std::io::Write;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor_ext;
use crate::error::{DeserializeError, Error};
use crate::properties::name_property::NameProperty;
use crate::properties::object_property::ObjectProperty;
use crate::properties::str_property::StrProperty;
use crate::properties::{Property, PropertyOptions, ReadSeek};

/// A property holding an ordered list of key/value pairs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapProperty {
    /// The wire type name of every key.
    pub key_type: String,
    /// The wire type name of every value.
    pub value_type: String,
    /// The entries, in their original order.
    pub entries: Vec<(Property, Property)>,
}

impl MapProperty {
    /// Creates a new `MapProperty`.
    pub fn new(key_type: impl Into<String>, value_type: impl Into<String>, entries: Vec<(Property, Property)>) -> Self {
        MapProperty {
            key_type: key_type.into(),
            value_type: value_type.into(),
            entries,
        }
    }

    pub(crate) fn from_bytes(
        key_type: String,
        value_type: String,
        value_bytes: &[u8],
        options: &mut PropertyOptions,
    ) -> Result<Self, Error> {
        let mut cursor = cursor_ext::sub_reader(value_bytes);

        let padding = cursor.read_u32::<LittleEndian>()?;
        if padding != 0 {
            return Err(DeserializeError::PaddingNotZero(options.current_path(), cursor.position()).into());
        }
        let count = cursor.read_u32::<LittleEndian>()? as usize;

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let key = {
                let _guard = options.push_path("Key");
                Self::read_bare_element(&mut cursor, &key_type, options)?
            };
            let value = {
                let _guard = options.push_path("Value");
                Self::read_bare_element(&mut cursor, &value_type, options)?
            };
            entries.push((key, value));
        }

        if !cursor_ext::at_eof(&cursor) {
            return Err(DeserializeError::SizeMismatch {
                path: options.current_path(),
                declared: value_bytes.len() as u64,
                consumed: cursor.position(),
            }
            .into());
        }

        Ok(MapProperty {
            key_type,
            value_type,
            entries,
        })
    }

    /// Reads one bare (header-less) map entry side, special-casing the
    /// self-delimiting variable-length types the way
    /// [`super::array_property::ArrayProperty`] and
    /// [`super::set_property::SetProperty`] do, since `Property::read_bare`
    /// only handles fixed-size bare values.
    fn read_bare_element<R: ReadSeek>(reader: &mut R, type_name: &str, options: &mut PropertyOptions) -> Result<Property, Error> {
        match type_name {
            "NameProperty" => Ok(Property::Name(NameProperty::read_body(reader)?)),
            "StrProperty" => Ok(Property::Str(StrProperty::read_body(reader)?)),
            "ObjectProperty" => Ok(Property::Object(ObjectProperty::read_body(reader)?)),
            other => Property::read_bare(reader, other, None, options),
        }
    }

    pub(crate) fn write_value_body<W: Write>(&self, writer: &mut W, options: &mut PropertyOptions) -> Result<(), Error> {
        writer.write_u32::<LittleEndian>(0)?;
        writer.write_u32::<LittleEndian>(self.entries.len() as u32)?;

        for (key, value) in &self.entries {
            {
                let _guard = options.push_path("Key");
                key.write_bare(writer, options)?;
            }
            {
                let _guard = options.push_path("Value");
                value.write_bare(writer, options)?;
            }
        }

        Ok(())
    }
}

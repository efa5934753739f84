//! An ordered list of unique elements (spec §4.C): wire-identical to
//! [`super::array_property::ArrayProperty`] except for an extra
//! removed-index count ahead of the element count.

use std::io::Write;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor_ext::{self, ReadExt, WriteExt};
use crate::error::{DeserializeError, Error};
use crate::properties::name_property::NameProperty;
use crate::properties::object_property::ObjectProperty;
use crate::properties::str_property::StrProperty;
use crate::properties::struct_property::StructProperty;
use crate::properties::{Property, PropertyOptions, ReadSeek};

/// A property holding an ordered list of unique, same-typed elements.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SetProperty {
    /// The wire type name shared by every element.
    pub element_type: String,
    /// The elements, in order.
    pub values: Vec<Property>,
}

impl SetProperty {
    /// Creates a new `SetProperty`.
    pub fn new(element_type: impl Into<String>, values: Vec<Property>) -> Self {
        SetProperty {
            element_type: element_type.into(),
            values,
        }
    }

    pub(crate) fn from_bytes(element_type: String, value_bytes: &[u8], options: &mut PropertyOptions) -> Result<Self, Error> {
        let mut cursor = cursor_ext::sub_reader(value_bytes);

        let removed_count = cursor.read_u32::<LittleEndian>()?;
        if removed_count != 0 {
            return Err(DeserializeError::PaddingNotZero(options.current_path(), cursor.position()).into());
        }
        let count = cursor.read_u32::<LittleEndian>()? as usize;

        let values = if element_type == "StructProperty" {
            if count == 0 {
                Vec::new()
            } else {
                let _field_name = cursor.read_string()?;
                let _dup_type = cursor.read_string()?;
                let _item_length = cursor.read_u64::<LittleEndian>()?;
                let struct_name = cursor.read_string()?;
                let struct_guid = cursor.read_guid()?;
                cursor.read_zero_terminator(&options.current_path())?;

                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    let mut body = StructProperty::read_bare_body(&mut cursor, &struct_name, options)?;
                    body.guid = struct_guid;
                    values.push(Property::Struct(Box::new(body)));
                }
                values
            }
        } else {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(Self::read_bare_element(&mut cursor, &element_type, options)?);
            }
            values
        };

        if !cursor_ext::at_eof(&cursor) {
            return Err(DeserializeError::SizeMismatch {
                path: options.current_path(),
                declared: value_bytes.len() as u64,
                consumed: cursor.position(),
            }
            .into());
        }

        Ok(SetProperty { element_type, values })
    }

    fn read_bare_element<R: ReadSeek>(reader: &mut R, element_type: &str, options: &mut PropertyOptions) -> Result<Property, Error> {
        match element_type {
            "NameProperty" => Ok(Property::Name(NameProperty::read_body(reader)?)),
            "StrProperty" => Ok(Property::Str(StrProperty::read_body(reader)?)),
            "ObjectProperty" => Ok(Property::Object(ObjectProperty::read_body(reader)?)),
            other => Property::read_bare(reader, other, None, options),
        }
    }

    pub(crate) fn write_value_body<W: Write>(&self, writer: &mut W, options: &mut PropertyOptions) -> Result<(), Error> {
        writer.write_u32::<LittleEndian>(0)?;
        writer.write_u32::<LittleEndian>(self.values.len() as u32)?;

        if self.element_type == "StructProperty" {
            if let Some(Property::Struct(first)) = self.values.first() {
                let mut body_buf = Vec::new();
                {
                    let mut scratch = std::io::Cursor::new(&mut body_buf);
                    first.write_bare_body(&mut scratch, options)?;
                }

                writer.write_string("")?;
                writer.write_string("StructProperty")?;
                writer.write_u64::<LittleEndian>(body_buf.len() as u64)?;
                writer.write_string(&first.struct_name)?;
                writer.write_guid(&first.guid)?;
                writer.write_zero_terminator()?;

                for value in &self.values {
                    if let Property::Struct(s) = value {
                        s.write_bare_body(writer, options)?;
                    }
                }
            }
        } else {
            for value in &self.values {
                value.write_bare(writer, options)?;
            }
        }
        Ok(())
    }
}

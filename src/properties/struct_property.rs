//! A nested struct property (spec §4.C): either one of a handful of known
//! fixed-field structs with a hardcoded wire shape, or an arbitrary named
//! struct carrying its own nested, `None`-terminated property list.

use std::io::Write;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;

use crate::cursor_ext::{self, ReadExt, WriteExt};
use crate::error::{DeserializeError, Error};
use crate::properties::struct_types::{DateTime, IntPoint, LinearColor, Quat, Rotator, Vector};
use crate::properties::{read_properties, write_properties, Property, PropertyOptions, ReadSeek};
use crate::types::Guid;

/// The decoded body of a [`StructProperty`]: a known fixed-field struct, or
/// an arbitrary named property list (spec §4.C "Known struct types" /
/// fallback).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StructPropertyValue {
    /// `Vector`.
    Vector(Vector),
    /// `Rotator`.
    Rotator(Rotator),
    /// `Quat`.
    Quat(Quat),
    /// `LinearColor`.
    LinearColor(LinearColor),
    /// `DateTime`.
    DateTime(DateTime),
    /// `Guid`, stored as the struct's own value rather than the struct
    /// envelope's `guid` field.
    Guid(Guid),
    /// `IntPoint`.
    IntPoint(IntPoint),
    /// Any other struct type: a nested, ordered property list.
    CustomStruct(IndexMap<String, Property>),
}

/// A property holding a nested struct.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructProperty {
    /// The struct type's name.
    pub struct_name: String,
    /// The struct envelope's own GUID (almost always zero; distinct from a
    /// `Guid`-typed struct's value).
    pub guid: Guid,
    /// The decoded body.
    pub value: StructPropertyValue,
}

impl From<Vector> for StructProperty {
    fn from(value: Vector) -> Self {
        StructProperty {
            struct_name: "Vector".to_string(),
            guid: Guid::ZERO,
            value: StructPropertyValue::Vector(value),
        }
    }
}

impl From<Rotator> for StructProperty {
    fn from(value: Rotator) -> Self {
        StructProperty {
            struct_name: "Rotator".to_string(),
            guid: Guid::ZERO,
            value: StructPropertyValue::Rotator(value),
        }
    }
}

impl From<Quat> for StructProperty {
    fn from(value: Quat) -> Self {
        StructProperty {
            struct_name: "Quat".to_string(),
            guid: Guid::ZERO,
            value: StructPropertyValue::Quat(value),
        }
    }
}

impl From<LinearColor> for StructProperty {
    fn from(value: LinearColor) -> Self {
        StructProperty {
            struct_name: "LinearColor".to_string(),
            guid: Guid::ZERO,
            value: StructPropertyValue::LinearColor(value),
        }
    }
}

impl From<DateTime> for StructProperty {
    fn from(value: DateTime) -> Self {
        StructProperty {
            struct_name: "DateTime".to_string(),
            guid: Guid::ZERO,
            value: StructPropertyValue::DateTime(value),
        }
    }
}

impl From<IntPoint> for StructProperty {
    fn from(value: IntPoint) -> Self {
        StructProperty {
            struct_name: "IntPoint".to_string(),
            guid: Guid::ZERO,
            value: StructPropertyValue::IntPoint(value),
        }
    }
}

impl From<Guid> for StructProperty {
    fn from(value: Guid) -> Self {
        StructProperty {
            struct_name: "Guid".to_string(),
            guid: Guid::ZERO,
            value: StructPropertyValue::Guid(value),
        }
    }
}

impl StructProperty {
    /// Creates a new `StructProperty` for a custom, named struct body.
    pub fn new_custom(struct_name: impl Into<String>, guid: Guid, properties: IndexMap<String, Property>) -> Self {
        StructProperty {
            struct_name: struct_name.into(),
            guid,
            value: StructPropertyValue::CustomStruct(properties),
        }
    }

    pub(crate) fn from_bytes(
        struct_name: String,
        guid: Guid,
        value_bytes: &[u8],
        options: &mut PropertyOptions,
    ) -> Result<Self, Error> {
        let value = Self::decode_body(&struct_name, value_bytes, options)?;
        Ok(StructProperty { struct_name, guid, value })
    }

    /// Reads a struct body with no size prefix of its own: used for struct
    /// elements inside an array or set, which are self-delimiting (fixed
    /// structs have a known fixed length; custom structs end at their own
    /// `None` sentinel).
    pub(crate) fn read_bare_body<R: ReadSeek>(
        reader: &mut R,
        struct_name: &str,
        options: &mut PropertyOptions,
    ) -> Result<Self, Error> {
        let value = match struct_name {
            "Vector" => StructPropertyValue::Vector(Self::read_vector(reader, options.large_world_coordinates)?),
            "Rotator" => StructPropertyValue::Rotator(Self::read_rotator(reader, options.large_world_coordinates)?),
            "Quat" => StructPropertyValue::Quat(Self::read_quat(reader, options.large_world_coordinates)?),
            "LinearColor" => StructPropertyValue::LinearColor(Self::read_linear_color(reader)?),
            "DateTime" => StructPropertyValue::DateTime(DateTime::new(reader.read_u64::<LittleEndian>()?)),
            "Guid" => StructPropertyValue::Guid(reader.read_guid()?),
            "IntPoint" => StructPropertyValue::IntPoint(IntPoint::new(
                reader.read_i32::<LittleEndian>()?,
                reader.read_i32::<LittleEndian>()?,
            )),
            _ => {
                log::warn!("unknown struct type {struct_name:?} at {}, falling back to a nested property list", options.current_path());
                let properties = read_properties(reader, options)?;
                StructPropertyValue::CustomStruct(properties)
            }
        };
        Ok(StructProperty {
            struct_name: struct_name.to_string(),
            guid: Guid::ZERO,
            value,
        })
    }

    fn decode_body(struct_name: &str, value_bytes: &[u8], options: &mut PropertyOptions) -> Result<StructPropertyValue, Error> {
        let mut cursor = cursor_ext::sub_reader(value_bytes);
        let value = match struct_name {
            "Vector" => StructPropertyValue::Vector(Self::read_vector(&mut cursor, options.large_world_coordinates)?),
            "Rotator" => StructPropertyValue::Rotator(Self::read_rotator(&mut cursor, options.large_world_coordinates)?),
            "Quat" => StructPropertyValue::Quat(Self::read_quat(&mut cursor, options.large_world_coordinates)?),
            "LinearColor" => StructPropertyValue::LinearColor(Self::read_linear_color(&mut cursor)?),
            "DateTime" => StructPropertyValue::DateTime(DateTime::new(cursor.read_u64::<LittleEndian>()?)),
            "Guid" => StructPropertyValue::Guid(cursor.read_guid()?),
            "IntPoint" => StructPropertyValue::IntPoint(IntPoint::new(
                cursor.read_i32::<LittleEndian>()?,
                cursor.read_i32::<LittleEndian>()?,
            )),
            _ => {
                log::warn!("unknown struct type {struct_name:?} at {}, falling back to a nested property list", options.current_path());
                let properties = read_properties(&mut cursor, options)?;
                StructPropertyValue::CustomStruct(properties)
            }
        };
        if !cursor_ext::at_eof(&cursor) {
            return Err(DeserializeError::SizeMismatch {
                path: options.current_path(),
                declared: value_bytes.len() as u64,
                consumed: cursor.position(),
            }
            .into());
        }
        Ok(value)
    }

    fn read_vector<R: std::io::Read>(reader: &mut R, large_world_coordinates: bool) -> Result<Vector, Error> {
        if large_world_coordinates {
            Ok(Vector::new(
                reader.read_f64::<LittleEndian>()?,
                reader.read_f64::<LittleEndian>()?,
                reader.read_f64::<LittleEndian>()?,
            ))
        } else {
            Ok(Vector::new(
                reader.read_f32::<LittleEndian>()? as f64,
                reader.read_f32::<LittleEndian>()? as f64,
                reader.read_f32::<LittleEndian>()? as f64,
            ))
        }
    }

    fn read_rotator<R: std::io::Read>(reader: &mut R, large_world_coordinates: bool) -> Result<Rotator, Error> {
        if large_world_coordinates {
            Ok(Rotator::new(
                reader.read_f64::<LittleEndian>()?,
                reader.read_f64::<LittleEndian>()?,
                reader.read_f64::<LittleEndian>()?,
            ))
        } else {
            Ok(Rotator::new(
                reader.read_f32::<LittleEndian>()? as f64,
                reader.read_f32::<LittleEndian>()? as f64,
                reader.read_f32::<LittleEndian>()? as f64,
            ))
        }
    }

    fn read_quat<R: std::io::Read>(reader: &mut R, large_world_coordinates: bool) -> Result<Quat, Error> {
        if large_world_coordinates {
            Ok(Quat::new(
                reader.read_f64::<LittleEndian>()?,
                reader.read_f64::<LittleEndian>()?,
                reader.read_f64::<LittleEndian>()?,
                reader.read_f64::<LittleEndian>()?,
            ))
        } else {
            Ok(Quat::new(
                reader.read_f32::<LittleEndian>()? as f64,
                reader.read_f32::<LittleEndian>()? as f64,
                reader.read_f32::<LittleEndian>()? as f64,
                reader.read_f32::<LittleEndian>()? as f64,
            ))
        }
    }

    fn read_linear_color<R: std::io::Read>(reader: &mut R) -> Result<LinearColor, Error> {
        Ok(LinearColor::new(
            reader.read_f32::<LittleEndian>()?,
            reader.read_f32::<LittleEndian>()?,
            reader.read_f32::<LittleEndian>()?,
            reader.read_f32::<LittleEndian>()?,
        ))
    }

    /// Writes the value with its own struct-name/guid header, for use inside
    /// arrays/sets whose element is a `StructProperty` (self-delimiting, no
    /// size prefix of its own at this level).
    pub(crate) fn write_bare_body<W: Write>(&self, writer: &mut W, options: &mut PropertyOptions) -> Result<(), Error> {
        self.write_value_body(writer, options)
    }

    pub(crate) fn write_value_body<W: Write>(&self, writer: &mut W, options: &mut PropertyOptions) -> Result<(), Error> {
        match &self.value {
            StructPropertyValue::Vector(v) => Self::write_vector(writer, v, options.large_world_coordinates),
            StructPropertyValue::Rotator(v) => Self::write_rotator(writer, v, options.large_world_coordinates),
            StructPropertyValue::Quat(v) => Self::write_quat(writer, v, options.large_world_coordinates),
            StructPropertyValue::LinearColor(v) => Self::write_linear_color(writer, v),
            StructPropertyValue::DateTime(v) => Ok(writer.write_u64::<LittleEndian>(v.ticks)?),
            StructPropertyValue::Guid(v) => writer.write_guid(v),
            StructPropertyValue::IntPoint(v) => {
                writer.write_i32::<LittleEndian>(v.x)?;
                writer.write_i32::<LittleEndian>(v.y)?;
                Ok(())
            }
            StructPropertyValue::CustomStruct(properties) => write_properties(writer, properties, options),
        }
    }

    fn write_vector<W: Write>(writer: &mut W, v: &Vector, large_world_coordinates: bool) -> Result<(), Error> {
        if large_world_coordinates {
            writer.write_f64::<LittleEndian>(v.x)?;
            writer.write_f64::<LittleEndian>(v.y)?;
            writer.write_f64::<LittleEndian>(v.z)?;
        } else {
            writer.write_f32::<LittleEndian>(v.x as f32)?;
            writer.write_f32::<LittleEndian>(v.y as f32)?;
            writer.write_f32::<LittleEndian>(v.z as f32)?;
        }
        Ok(())
    }

    fn write_rotator<W: Write>(writer: &mut W, v: &Rotator, large_world_coordinates: bool) -> Result<(), Error> {
        if large_world_coordinates {
            writer.write_f64::<LittleEndian>(v.pitch)?;
            writer.write_f64::<LittleEndian>(v.yaw)?;
            writer.write_f64::<LittleEndian>(v.roll)?;
        } else {
            writer.write_f32::<LittleEndian>(v.pitch as f32)?;
            writer.write_f32::<LittleEndian>(v.yaw as f32)?;
            writer.write_f32::<LittleEndian>(v.roll as f32)?;
        }
        Ok(())
    }

    fn write_quat<W: Write>(writer: &mut W, v: &Quat, large_world_coordinates: bool) -> Result<(), Error> {
        if large_world_coordinates {
            writer.write_f64::<LittleEndian>(v.x)?;
            writer.write_f64::<LittleEndian>(v.y)?;
            writer.write_f64::<LittleEndian>(v.z)?;
            writer.write_f64::<LittleEndian>(v.w)?;
        } else {
            writer.write_f32::<LittleEndian>(v.x as f32)?;
            writer.write_f32::<LittleEndian>(v.y as f32)?;
            writer.write_f32::<LittleEndian>(v.z as f32)?;
            writer.write_f32::<LittleEndian>(v.w as f32)?;
        }
        Ok(())
    }

    fn write_linear_color<W: Write>(writer: &mut W, v: &LinearColor) -> Result<(), Error> {
        writer.write_f32::<LittleEndian>(v.r)?;
        writer.write_f32::<LittleEndian>(v.g)?;
        writer.write_f32::<LittleEndian>(v.b)?;
        writer.write_f32::<LittleEndian>(v.a)?;
        Ok(())
    }
}

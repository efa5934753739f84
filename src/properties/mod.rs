//! The property-graph codec (spec §4.C): reads and writes the tagged,
//! recursive `name: type, size, array_index, [type-specific header], value`
//! records a GVAS property list is built from.
//!
//! Every property entry's `size` field measures its *value* only — the name,
//! type name, size, array index, and any type-specific header fields that
//! precede the value are not counted. Each read dispatches on the entry's
//! `type_name` string and, for the handful of variants that carry one,
//! parses a type-specific header before the value; unrecognized type names
//! fall back to [`unknown_property::UnknownProperty`], which keeps the raw
//! value bytes so an unrecognized property still round-trips byte for byte.

pub mod array_property;
pub mod delegate_property;
pub mod enum_property;
pub mod field_path_property;
pub mod int_property;
pub mod map_property;
pub mod name_property;
pub mod object_property;
pub mod set_property;
pub mod str_property;
pub mod struct_property;
pub mod struct_types;
pub mod text_property;
pub mod unknown_property;

use std::io::{Cursor, Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;

use crate::cursor_ext::{ReadExt, WriteExt};
use crate::error::{DeserializeError, Error};
use crate::registry::TypeHintRegistry;
use crate::scoped_stack_entry::ScopedStackEntry;
use crate::types::Guid;

pub use array_property::ArrayProperty;
pub use delegate_property::{DelegateProperty, MulticastInlineDelegateProperty, MulticastSparseDelegateProperty};
pub use enum_property::EnumProperty;
pub use field_path_property::FieldPathProperty;
pub use int_property::{
    BoolProperty, ByteProperty, ByteValue, DoubleProperty, FloatProperty, Int16Property, Int64Property,
    Int8Property, IntProperty, UInt16Property, UInt32Property, UInt64Property,
};
pub use map_property::MapProperty;
pub use name_property::NameProperty;
pub use object_property::ObjectProperty;
pub use set_property::SetProperty;
pub use str_property::StrProperty;
pub use struct_property::{StructProperty, StructPropertyValue};
pub use text_property::TextProperty;
pub use unknown_property::UnknownProperty;

/// A reader able to both read and seek; used as a trait-object parameter so
/// the codec isn't nailed down to any particular concrete buffer type.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek + ?Sized> ReadSeek for T {}

/// Per-conversion context threaded through every recursive read/write call
/// (spec §4.C / §4.D): the type-hint table, the dotted path of property
/// names and type names seen so far, and the version facts that change how
/// a handful of struct types are shaped.
pub struct PropertyOptions<'a> {
    /// Struct/enum type hints for paths the wire format doesn't disambiguate
    /// on its own (spec §4.D).
    pub hints: &'a TypeHintRegistry,
    /// The path of property names and type names from the document root
    /// down to the value currently being read or written, maintained with
    /// [`ScopedStackEntry`] guards as recursion descends and unwinds.
    pub properties_stack: Vec<String>,
    /// Whether `Vector`/`Rotator`/`Quat` struct bodies use double precision
    /// (set from the header's engine version; spec §4.C).
    pub large_world_coordinates: bool,
    /// Custom version GUIDs read from the file header, consulted by a few
    /// struct types (e.g. `Text`) whose wire shape changed across engine
    /// releases.
    pub custom_versions: IndexMap<Guid, u32>,
    /// The wire-level identity of the map entry currently being processed,
    /// e.g. the module-type enum name or object id carried by a
    /// `MapProperty` entry's key. A handler reached through a path pattern
    /// has no other way to see a sibling key's value, since it is only
    /// handed the value side's raw bytes (spec §4.E); set for the duration
    /// of a single entry's value processing by `doc::map_to_doc`/
    /// `doc::map_from_doc`, `None` everywhere else.
    pub current_discriminant: Option<String>,
}

impl<'a> PropertyOptions<'a> {
    /// Builds options with an empty path, for use at the root of a
    /// document.
    pub fn new(hints: &'a TypeHintRegistry, large_world_coordinates: bool, custom_versions: IndexMap<Guid, u32>) -> Self {
        PropertyOptions {
            hints,
            properties_stack: Vec::new(),
            large_world_coordinates,
            custom_versions,
            current_discriminant: None,
        }
    }

    /// The current path, rendered the way hint patterns are written:
    /// dot-joined name/type-name segments.
    pub fn current_path(&self) -> String {
        self.properties_stack.join(".")
    }

    /// Pushes a segment onto the path for the duration of the returned
    /// guard's lifetime.
    pub fn push_path(&mut self, segment: impl Into<String>) -> ScopedStackEntry<String> {
        ScopedStackEntry::new(&mut self.properties_stack, segment.into())
    }

    /// True if the file's custom version for `T`'s GUID is at or past the
    /// given version, i.e. a version-gated field is present on the wire.
    /// Versions the header never recorded a custom version for are treated
    /// as version 0 (the field absent).
    pub fn supports_version<T>(&self, version: T) -> bool
    where
        T: crate::custom_version::CustomVersionTrait + Into<u32>,
    {
        let current = self.custom_versions.get(&T::GUID).copied().unwrap_or(0);
        current >= version.into()
    }
}

/// The tagged union of every property kind this crate knows how to decode
/// (spec §4.C). Unrecognized type names decode as [`UnknownProperty`], which
/// preserves the raw value bytes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Property {
    /// A single signed byte.
    Int8(Int8Property),
    /// A byte, or an enum value name when a non-`"None"` enum type is
    /// attached to the tag.
    Byte(ByteProperty),
    /// A little-endian 16-bit signed integer.
    Int16(Int16Property),
    /// A little-endian 16-bit unsigned integer.
    UInt16(UInt16Property),
    /// A little-endian 32-bit signed integer (the common `IntProperty`).
    Int(IntProperty),
    /// A little-endian 32-bit unsigned integer.
    UInt32(UInt32Property),
    /// A little-endian 64-bit signed integer.
    Int64(Int64Property),
    /// A little-endian 64-bit unsigned integer.
    UInt64(UInt64Property),
    /// A single-precision float.
    Float(FloatProperty),
    /// A double-precision float.
    Double(DoubleProperty),
    /// A boolean, stored inline in the tag (no value body).
    Bool(BoolProperty),
    /// A length-prefixed string, possibly absent (`None`, as opposed to
    /// empty).
    Str(StrProperty),
    /// An interned name string.
    Name(NameProperty),
    /// A reference to another object by path string.
    Object(ObjectProperty),
    /// Localized/formatted text.
    Text(TextProperty),
    /// An unbound delegate reference.
    Delegate(DelegateProperty),
    /// A multicast delegate bound inline.
    MulticastInlineDelegate(MulticastInlineDelegateProperty),
    /// A multicast delegate stored sparsely.
    MulticastSparseDelegate(MulticastSparseDelegateProperty),
    /// A path to a `UStruct` field.
    FieldPath(FieldPathProperty),
    /// An enum value, tagged with its enum type name.
    Enum(EnumProperty),
    /// A nested struct, either a known fixed-field type or an arbitrary
    /// named property list.
    Struct(Box<StructProperty>),
    /// An ordered list of elements, all of the same element type.
    Array(Box<ArrayProperty>),
    /// An ordered list of key/value pairs (spec §4.C "insertion-ordered,
    /// not a `HashMap`").
    Map(Box<MapProperty>),
    /// An ordered list of unique elements.
    Set(Box<SetProperty>),
    /// A property whose type name this crate does not recognize; its value
    /// bytes are kept verbatim.
    Unknown(UnknownProperty),
}

/// The shared envelope fields every property entry in a list carries:
/// `name`, `type_name`, `size` (value bytes only), and `array_index`.
struct PropertyHeader {
    size: u32,
}

impl Property {
    /// Reads one full property entry — name, type name, size, array index,
    /// any type-specific header, and the value — returning `None` at the
    /// `"None"` sentinel that terminates every property list (spec §4.C).
    pub fn read_entry<R: ReadSeek>(
        reader: &mut R,
        options: &mut PropertyOptions,
    ) -> Result<Option<(String, Property)>, Error> {
        let name = reader.read_string()?;
        if name == "None" || name.is_empty() {
            return Ok(None);
        }
        let type_name = reader.read_string()?;
        let size = reader.read_u32::<LittleEndian>()?;
        let _array_index = reader.read_u32::<LittleEndian>()?;
        let header = PropertyHeader { size };

        let _name_guard = options.push_path(name.clone());
        let property = Property::read_with_header(reader, &type_name, &header, options)?;
        Ok(Some((name, property)))
    }

    fn read_with_header<R: ReadSeek>(
        reader: &mut R,
        type_name: &str,
        header: &PropertyHeader,
        options: &mut PropertyOptions,
    ) -> Result<Property, Error> {
        // Type-specific header fields (none of these are counted in `size`).
        let property = match type_name {
            "BoolProperty" => {
                let value = reader.read_u8()? != 0;
                Property::assert_has_no_guid(reader)?;
                if header.size != 0 {
                    return Err(DeserializeError::InvalidValueSize(0, header.size as u64, reader.stream_position()?).into());
                }
                Property::Bool(BoolProperty { value })
            }
            "ByteProperty" => {
                let enum_name = reader.read_string()?;
                Property::assert_has_no_guid(reader)?;
                let value_bytes = Property::read_value_bytes(reader, header.size)?;
                Property::Byte(ByteProperty::from_bytes(enum_name, &value_bytes)?)
            }
            "EnumProperty" => {
                let enum_type = reader.read_string()?;
                Property::assert_has_no_guid(reader)?;
                let value_bytes = Property::read_value_bytes(reader, header.size)?;
                Property::Enum(EnumProperty::from_bytes(enum_type, &value_bytes)?)
            }
            "StructProperty" => {
                let struct_name = reader.read_string()?;
                let struct_guid = reader.read_guid()?;
                Property::assert_has_no_guid(reader)?;
                let value_bytes = Property::read_value_bytes(reader, header.size)?;
                Property::Struct(Box::new(StructProperty::from_bytes(struct_name, struct_guid, &value_bytes, options)?))
            }
            "ArrayProperty" => {
                let inner_type = reader.read_string()?;
                Property::assert_has_no_guid(reader)?;
                let value_bytes = Property::read_value_bytes(reader, header.size)?;
                Property::Array(Box::new(ArrayProperty::from_bytes(inner_type, &value_bytes, options)?))
            }
            "SetProperty" => {
                let inner_type = reader.read_string()?;
                Property::assert_has_no_guid(reader)?;
                let value_bytes = Property::read_value_bytes(reader, header.size)?;
                Property::Set(Box::new(SetProperty::from_bytes(inner_type, &value_bytes, options)?))
            }
            "MapProperty" => {
                let key_type = reader.read_string()?;
                let value_type = reader.read_string()?;
                Property::assert_has_no_guid(reader)?;
                let value_bytes = Property::read_value_bytes(reader, header.size)?;
                Property::Map(Box::new(MapProperty::from_bytes(key_type, value_type, &value_bytes, options)?))
            }
            other => {
                Property::assert_has_no_guid(reader)?;
                let value_bytes = Property::read_value_bytes(reader, header.size)?;
                Property::read_simple_or_unknown(other, &value_bytes, options)?
            }
        };
        Ok(property)
    }

    fn read_simple_or_unknown(type_name: &str, value_bytes: &[u8], options: &mut PropertyOptions) -> Result<Property, Error> {
        let mut cursor = Cursor::new(value_bytes.to_vec());
        let property = match type_name {
            "Int8Property" => Property::Int8(Int8Property::read_body(&mut cursor)?),
            "Int16Property" => Property::Int16(Int16Property::read_body(&mut cursor)?),
            "UInt16Property" => Property::UInt16(UInt16Property::read_body(&mut cursor)?),
            "IntProperty" => Property::Int(IntProperty::read_body(&mut cursor)?),
            "UInt32Property" => Property::UInt32(UInt32Property::read_body(&mut cursor)?),
            "Int64Property" => Property::Int64(Int64Property::read_body(&mut cursor)?),
            "UInt64Property" => Property::UInt64(UInt64Property::read_body(&mut cursor)?),
            "FloatProperty" => Property::Float(FloatProperty::read_body(&mut cursor)?),
            "DoubleProperty" => Property::Double(DoubleProperty::read_body(&mut cursor)?),
            "StrProperty" => Property::Str(StrProperty::read_body(&mut cursor)?),
            "NameProperty" => Property::Name(NameProperty::read_body(&mut cursor)?),
            "ObjectProperty" => Property::Object(ObjectProperty::read_body(&mut cursor)?),
            "TextProperty" => Property::Text(TextProperty::read_body(&mut cursor, value_bytes.len() as u64, options)?),
            "DelegateProperty" => Property::Delegate(DelegateProperty::read_body(&mut cursor)?),
            "MulticastInlineDelegateProperty" => {
                Property::MulticastInlineDelegate(MulticastInlineDelegateProperty::read_body(&mut cursor)?)
            }
            "MulticastSparseDelegateProperty" => {
                Property::MulticastSparseDelegate(MulticastSparseDelegateProperty::read_body(&mut cursor)?)
            }
            "FieldPathProperty" => Property::FieldPath(FieldPathProperty::read_body(&mut cursor)?),
            _ => {
                return Ok(Property::Unknown(UnknownProperty {
                    type_name: type_name.to_string(),
                    raw: value_bytes.to_vec(),
                }))
            }
        };
        if !crate::cursor_ext::at_eof(&cursor) {
            return Err(DeserializeError::SizeMismatch {
                path: "".to_string(),
                declared: value_bytes.len() as u64,
                consumed: cursor.position(),
            }
            .into());
        }
        Ok(property)
    }

    fn read_value_bytes<R: Read>(reader: &mut R, size: u32) -> Result<Vec<u8>, Error> {
        let mut buf = vec![0u8; size as usize];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn assert_has_no_guid<R: Read>(reader: &mut R) -> Result<(), Error> {
        let has_guid = reader.read_u8()?;
        if has_guid != 0 {
            return Err(DeserializeError::invalid_property(
                "property guids are not supported",
                &mut Cursor::new(Vec::<u8>::new()),
            )
            .into());
        }
        Ok(())
    }

    /// Reads a single bare (header-less) property value of the given type
    /// name, for use inside arrays, sets, and map keys/values, which carry
    /// only the value bytes with no per-element tag (spec §4.C). `size_hint`
    /// gives the exact byte length when the caller already knows it (e.g.
    /// a `SetProperty` dividing its total length by its element count);
    /// `None` means the type itself determines its length (every fixed-size
    /// primitive, plus `Struct`/`Array`/`Map`/`Set`, which are
    /// self-delimiting).
    pub fn read_bare<R: ReadSeek>(
        reader: &mut R,
        type_name: &str,
        size_hint: Option<u64>,
        options: &mut PropertyOptions,
    ) -> Result<Property, Error> {
        match type_name {
            "StructProperty" => {
                let struct_name = options
                    .hints
                    .lookup(&options.properties_stack.iter().map(String::as_str).collect::<Vec<_>>())
                    .map(|s| s.to_string())
                    .ok_or_else(|| {
                        DeserializeError::MissingHint(
                            "StructProperty".to_string(),
                            options.current_path(),
                            reader.stream_position().unwrap_or_default(),
                        )
                    })?;
                Ok(Property::Struct(Box::new(StructProperty::read_bare_body(
                    reader,
                    &struct_name,
                    options,
                )?)))
            }
            "ArrayProperty" | "SetProperty" | "MapProperty" => Err(DeserializeError::invalid_property(
                "nested container properties must carry their own header",
                reader,
            )
            .into()),
            other => {
                let len = match size_hint {
                    Some(len) => len,
                    None => Property::fixed_size_of(other)?,
                };
                let bytes = Property::read_value_bytes(reader, len as u32)?;
                Property::read_simple_or_unknown(other, &bytes, options)
            }
        }
    }

    fn fixed_size_of(type_name: &str) -> Result<u64, Error> {
        Ok(match type_name {
            "Int8Property" | "ByteProperty" | "BoolProperty" => 1,
            "Int16Property" | "UInt16Property" => 2,
            "IntProperty" | "UInt32Property" | "FloatProperty" => 4,
            "Int64Property" | "UInt64Property" | "DoubleProperty" => 8,
            _ => {
                return Err(DeserializeError::missing_argument(
                    &format!("fixed size for bare property type {type_name}"),
                    &mut Cursor::new(Vec::<u8>::new()),
                )
                .into())
            }
        })
    }

    /// Writes a single full property entry — name, type name, size, array
    /// index, header, and value.
    pub fn write_entry<W: Write>(&self, writer: &mut W, name: &str, options: &mut PropertyOptions) -> Result<(), Error> {
        writer.write_string(name)?;
        writer.write_string(self.type_name())?;

        let mut header_buf = Cursor::new(Vec::new());
        self.write_type_header(&mut header_buf)?;
        let header_bytes = header_buf.into_inner();

        let mut body_buf = Cursor::new(Vec::new());
        self.write_value(&mut body_buf, options)?;
        let body_bytes = body_buf.into_inner();

        writer.write_u32::<LittleEndian>(body_bytes.len() as u32)?;
        writer.write_u32::<LittleEndian>(0)?;
        writer.write_all(&header_bytes)?;
        writer.write_u8(0)?;
        writer.write_all(&body_bytes)?;
        Ok(())
    }

    /// Writes a bare (header-less) value, the counterpart of
    /// [`Property::read_bare`].
    pub fn write_bare<W: Write>(&self, writer: &mut W, options: &mut PropertyOptions) -> Result<(), Error> {
        match self {
            Property::Struct(s) => s.write_bare_body(writer, options),
            _ => self.write_value(writer, options),
        }
    }

    /// The wire type name for this property's variant.
    pub fn type_name(&self) -> std::borrow::Cow<'static, str> {
        match self {
            Property::Int8(_) => "Int8Property".into(),
            Property::Byte(_) => "ByteProperty".into(),
            Property::Int16(_) => "Int16Property".into(),
            Property::UInt16(_) => "UInt16Property".into(),
            Property::Int(_) => "IntProperty".into(),
            Property::UInt32(_) => "UInt32Property".into(),
            Property::Int64(_) => "Int64Property".into(),
            Property::UInt64(_) => "UInt64Property".into(),
            Property::Float(_) => "FloatProperty".into(),
            Property::Double(_) => "DoubleProperty".into(),
            Property::Bool(_) => "BoolProperty".into(),
            Property::Str(_) => "StrProperty".into(),
            Property::Name(_) => "NameProperty".into(),
            Property::Object(_) => "ObjectProperty".into(),
            Property::Text(_) => "TextProperty".into(),
            Property::Delegate(_) => "DelegateProperty".into(),
            Property::MulticastInlineDelegate(_) => "MulticastInlineDelegateProperty".into(),
            Property::MulticastSparseDelegate(_) => "MulticastSparseDelegateProperty".into(),
            Property::FieldPath(_) => "FieldPathProperty".into(),
            Property::Enum(_) => "EnumProperty".into(),
            Property::Struct(_) => "StructProperty".into(),
            Property::Array(_) => "ArrayProperty".into(),
            Property::Map(_) => "MapProperty".into(),
            Property::Set(_) => "SetProperty".into(),
            Property::Unknown(u) => u.type_name.clone().into(),
        }
    }

    fn write_type_header<W: Write>(&self, writer: &mut W) -> Result<(), Error> {
        match self {
            Property::Bool(p) => writer.write_u8(p.value as u8)?,
            Property::Byte(p) => writer.write_string(p.enum_name.as_deref().unwrap_or("None"))?,
            Property::Enum(p) => writer.write_string(&p.enum_type)?,
            Property::Struct(p) => {
                writer.write_string(&p.struct_name)?;
                writer.write_guid(&p.guid)?;
            }
            Property::Array(p) => writer.write_string(&p.element_type)?,
            Property::Set(p) => writer.write_string(&p.element_type)?,
            Property::Map(p) => {
                writer.write_string(&p.key_type)?;
                writer.write_string(&p.value_type)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn write_value<W: Write>(&self, writer: &mut W, options: &mut PropertyOptions) -> Result<(), Error> {
        match self {
            Property::Int8(p) => p.write_body(writer),
            Property::Byte(p) => p.write_body(writer),
            Property::Int16(p) => p.write_body(writer),
            Property::UInt16(p) => p.write_body(writer),
            Property::Int(p) => p.write_body(writer),
            Property::UInt32(p) => p.write_body(writer),
            Property::Int64(p) => p.write_body(writer),
            Property::UInt64(p) => p.write_body(writer),
            Property::Float(p) => p.write_body(writer),
            Property::Double(p) => p.write_body(writer),
            Property::Bool(_) => Ok(()),
            Property::Str(p) => p.write_body(writer),
            Property::Name(p) => p.write_body(writer),
            Property::Object(p) => p.write_body(writer),
            Property::Text(p) => p.write_body(writer, options),
            Property::Delegate(p) => p.write_body(writer),
            Property::MulticastInlineDelegate(p) => p.write_body(writer),
            Property::MulticastSparseDelegate(p) => p.write_body(writer),
            Property::FieldPath(p) => p.write_body(writer),
            Property::Enum(p) => p.write_body(writer),
            Property::Struct(p) => p.write_value_body(writer, options),
            Property::Array(p) => p.write_value_body(writer, options),
            Property::Map(p) => p.write_value_body(writer, options),
            Property::Set(p) => p.write_value_body(writer, options),
            Property::Unknown(p) => writer.write_all(&p.raw).map_err(Error::from),
        }
    }
}

/// Reads a whole `None`-terminated property list into an order-preserving
/// map (spec §4.C "order preservation"; `IndexMap`, never `HashMap`).
pub fn read_properties<R: ReadSeek>(
    reader: &mut R,
    options: &mut PropertyOptions,
) -> Result<IndexMap<String, Property>, Error> {
    let mut properties = IndexMap::new();
    while let Some((name, property)) = Property::read_entry(reader, options)? {
        properties.insert(name, property);
    }
    Ok(properties)
}

/// Writes a whole property list followed by the `None` sentinel, the
/// counterpart of [`read_properties`].
pub fn write_properties<W: Write>(
    writer: &mut W,
    properties: &IndexMap<String, Property>,
    options: &mut PropertyOptions,
) -> Result<(), Error> {
    for (name, property) in properties {
        property.write_entry(writer, name, options)?;
    }
    writer.write_string("None")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::int_property::{BoolProperty, IntProperty};
    use crate::properties::str_property::StrProperty;

    fn options(hints: &TypeHintRegistry) -> PropertyOptions<'_> {
        PropertyOptions::new(hints, false, IndexMap::new())
    }

    #[test]
    fn round_trips_a_short_property_list_in_insertion_order() {
        let mut properties = IndexMap::new();
        properties.insert("Level".to_string(), Property::Int(IntProperty::new(7)));
        properties.insert("Alive".to_string(), Property::Bool(BoolProperty::new(true)));
        properties.insert("Name".to_string(), Property::Str(StrProperty::new(Some("Rex".to_string()))));

        let hints = TypeHintRegistry::new();
        let mut write_options = options(&hints);
        let mut buf = Vec::new();
        write_properties(&mut buf, &properties, &mut write_options).unwrap();

        let mut read_options = options(&hints);
        let decoded = read_properties(&mut Cursor::new(buf), &mut read_options).unwrap();

        assert_eq!(decoded, properties);
        assert_eq!(decoded.keys().collect::<Vec<_>>(), vec!["Level", "Alive", "Name"]);
    }

    #[test]
    fn empty_property_list_is_just_the_none_sentinel() {
        let properties: IndexMap<String, Property> = IndexMap::new();
        let hints = TypeHintRegistry::new();
        let mut write_options = options(&hints);
        let mut buf = Vec::new();
        write_properties(&mut buf, &properties, &mut write_options).unwrap();

        // "None" as a length-prefixed FString: 4-byte length + 4 bytes + terminator.
        assert_eq!(buf.len(), 4 + "None".len() + 1);

        let mut read_options = options(&hints);
        let decoded = read_properties(&mut Cursor::new(buf), &mut read_options).unwrap();
        assert!(decoded.is_empty());
    }
}

//! DOC lowering/lifting (spec §4.H): maps the typed property graph to a
//! language-neutral tree of objects, arrays, strings, numbers, booleans,
//! and byte arrays, and back. The DOC layer never parses or emits the JSON
//! text itself — that's an external collaborator's job; this module only
//! builds and consumes the in-memory [`DocValue`] tree.

use std::io::Cursor;

use indexmap::IndexMap;

use crate::cursor_ext;
use crate::error::{Error, SerializeError};
use crate::properties::delegate_property::{Delegate, MulticastScriptDelegate};
use crate::properties::field_path_property::FieldPath;
use crate::properties::int_property::ByteValue;
use crate::properties::struct_types::{DateTime, IntPoint, LinearColor, Quat, Rotator, Vector};
use crate::properties::text_property::{FText, FTextHistory};
use crate::properties::{
    ArrayProperty, BoolProperty, ByteProperty, DelegateProperty, DoubleProperty, EnumProperty, FieldPathProperty,
    FloatProperty, Int16Property, Int64Property, Int8Property, IntProperty, MapProperty,
    MulticastInlineDelegateProperty, MulticastSparseDelegateProperty, NameProperty, ObjectProperty, Property,
    PropertyOptions, SetProperty, StrProperty, StructProperty, StructPropertyValue, TextProperty, UInt16Property,
    UInt32Property, UInt64Property, UnknownProperty,
};
use crate::registry::{CustomPropertyRegistry, CustomValue, HandlerContext};
use crate::types::Guid;

/// A language-neutral, JSON-shaped value (spec §4.H).
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    /// The JSON `null` literal.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer, used for every signed integer property width.
    Int(i64),
    /// An unsigned integer, used for every unsigned integer property width
    /// (so `UInt64Property` values above `i64::MAX` still round-trip).
    UInt(u64),
    /// A floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// An opaque byte run, surfaced as `{ "values": [int, ...] }` per spec
    /// §6.
    Bytes(Vec<u8>),
    /// An ordered list.
    Array(Vec<DocValue>),
    /// A string-keyed object, insertion-ordered.
    Object(IndexMap<String, DocValue>),
}

impl DocValue {
    pub(crate) fn as_object(&self, path: &str) -> Result<&IndexMap<String, DocValue>, Error> {
        match self {
            DocValue::Object(o) => Ok(o),
            _ => Err(SerializeError::invalid_value(&format!("expected object at {path}")).into()),
        }
    }

    pub(crate) fn as_array(&self, path: &str) -> Result<&[DocValue], Error> {
        match self {
            DocValue::Array(a) => Ok(a),
            _ => Err(SerializeError::invalid_value(&format!("expected array at {path}")).into()),
        }
    }

    pub(crate) fn as_str(&self, path: &str) -> Result<&str, Error> {
        match self {
            DocValue::String(s) => Ok(s),
            _ => Err(SerializeError::invalid_value(&format!("expected string at {path}")).into()),
        }
    }

    pub(crate) fn as_opt_str(&self, path: &str) -> Result<Option<&str>, Error> {
        match self {
            DocValue::Null => Ok(None),
            DocValue::String(s) => Ok(Some(s)),
            _ => Err(SerializeError::invalid_value(&format!("expected string or null at {path}")).into()),
        }
    }

    pub(crate) fn as_bool(&self, path: &str) -> Result<bool, Error> {
        match self {
            DocValue::Bool(b) => Ok(*b),
            _ => Err(SerializeError::invalid_value(&format!("expected bool at {path}")).into()),
        }
    }

    pub(crate) fn as_i64(&self, path: &str) -> Result<i64, Error> {
        match self {
            DocValue::Int(i) => Ok(*i),
            DocValue::UInt(u) => Ok(*u as i64),
            _ => Err(SerializeError::invalid_value(&format!("expected integer at {path}")).into()),
        }
    }

    pub(crate) fn as_u64(&self, path: &str) -> Result<u64, Error> {
        match self {
            DocValue::UInt(u) => Ok(*u),
            DocValue::Int(i) => Ok(*i as u64),
            _ => Err(SerializeError::invalid_value(&format!("expected integer at {path}")).into()),
        }
    }

    pub(crate) fn as_f64(&self, path: &str) -> Result<f64, Error> {
        match self {
            DocValue::Float(f) => Ok(*f),
            // A non-finite value lowered under the `nonfinite_to_null` flag
            // comes back as `null`; there's no way to recover which
            // non-finite value it was, so NaN is the conservative default.
            DocValue::Null => Ok(f64::NAN),
            _ => Err(SerializeError::invalid_value(&format!("expected float at {path}")).into()),
        }
    }

    pub(crate) fn as_bytes(&self, path: &str) -> Result<Vec<u8>, Error> {
        match self {
            DocValue::Bytes(b) => Ok(b.clone()),
            _ => Err(SerializeError::invalid_value(&format!("expected bytes at {path}")).into()),
        }
    }

    pub(crate) fn field<'a>(&'a self, key: &str, path: &str) -> Result<&'a DocValue, Error> {
        self.as_object(path)?
            .get(key)
            .ok_or_else(|| SerializeError::struct_missing_field(path, key).into())
    }
}

fn float_to_doc(value: f64, nonfinite_to_null: bool) -> DocValue {
    if nonfinite_to_null && !value.is_finite() {
        DocValue::Null
    } else {
        DocValue::Float(value)
    }
}

/// Per-conversion DOC context: the custom-property registry and the
/// `nonfinite_to_null` flag, threaded alongside [`PropertyOptions`] (which
/// already carries the path stack and type hints the property codec
/// needs).
pub struct DocOptions<'a> {
    /// Path-matched custom-property decoders/encoders (spec §4.D/§4.E).
    pub custom_properties: &'a CustomPropertyRegistry,
    /// Replace non-finite floats with `null` while lowering (spec §4.H).
    /// Never applied while lifting.
    pub nonfinite_to_null: bool,
}

/// Lowers a whole property list into a DOC object keyed by property name
/// (spec §6 `properties` field).
pub fn properties_to_doc(
    properties: &IndexMap<String, Property>,
    property_options: &mut PropertyOptions,
    doc_options: &DocOptions,
) -> Result<DocValue, Error> {
    let mut object = IndexMap::new();
    for (name, property) in properties {
        let _guard = property_options.push_path(name.clone());
        object.insert(name.clone(), property_to_doc(property, property_options, doc_options)?);
    }
    Ok(DocValue::Object(object))
}

/// Lifts a DOC object back into a property list, the inverse of
/// [`properties_to_doc`].
pub fn doc_to_properties(
    doc: &DocValue,
    property_options: &mut PropertyOptions,
    doc_options: &DocOptions,
) -> Result<IndexMap<String, Property>, Error> {
    let object = doc.as_object("properties")?;
    let mut properties = IndexMap::new();
    for (name, value) in object {
        let _guard = property_options.push_path(name.clone());
        properties.insert(name.clone(), property_from_doc(value, property_options, doc_options)?);
    }
    Ok(properties)
}

/// Lowers one property, first giving the custom-property registry a chance
/// to reinterpret its raw bytes (spec §4.E), falling back to the generic,
/// type-faithful shape otherwise.
pub fn property_to_doc(property: &Property, options: &mut PropertyOptions, doc_options: &DocOptions) -> Result<DocValue, Error> {
    let path_segments: Vec<&str> = options.properties_stack.iter().map(String::as_str).collect();
    if let Some(handler) = doc_options.custom_properties.lookup(&path_segments) {
        let array_bytes = match property {
            Property::Array(a) => array_as_raw_bytes(a),
            _ => None,
        };
        let raw = match array_bytes {
            Some(bytes) => bytes,
            None => {
                let mut raw = Vec::new();
                property.write_bare(&mut Cursor::new(&mut raw), options)?;
                raw
            }
        };
        let path = options.current_path();
        let context = HandlerContext { path: &path, discriminant: options.current_discriminant.as_deref() };
        if let Some(custom) = handler.decode(&raw, &context)? {
            if let Some(unknown_bytes) = &custom.unknown_bytes {
                log::debug!("custom handler at {path} left {} trailing byte(s) unrecognized", unknown_bytes.len());
            }
            let mut object = IndexMap::new();
            object.insert("type".to_string(), DocValue::String("Custom".to_string()));
            object.insert("wire_type".to_string(), DocValue::String(property.type_name().into_owned()));
            object.insert("wire_header".to_string(), DocValue::Object(wire_header_to_doc(property)));
            object.insert("fields".to_string(), DocValue::Object(custom.fields.clone()));
            object.insert(
                "unknown_bytes".to_string(),
                match &custom.unknown_bytes {
                    Some(bytes) => DocValue::Bytes(bytes.clone()),
                    None => DocValue::Null,
                },
            );
            return Ok(DocValue::Object(object));
        }
        log::debug!("custom handler at {path} did not recognize its payload, falling back to generic decode");
    }
    property_to_doc_generic(property, options, doc_options)
}

/// Extracts a plain byte vector from a byte-element `ArrayProperty`
/// (`RawData`-shaped leaves), with no count prefix — the shape a
/// [`crate::registry::CustomPropertyHandler`] actually operates on. `None`
/// for anything else, so the caller falls back to the full bare
/// serialization.
fn array_as_raw_bytes(array: &ArrayProperty) -> Option<Vec<u8>> {
    if array.element_type != "ByteProperty" && array.element_type != "Int8Property" {
        return None;
    }
    let mut bytes = Vec::with_capacity(array.values.len());
    for value in &array.values {
        let byte = match value {
            Property::Byte(p) => match &p.value {
                ByteValue::Byte(b) => *b,
                ByteValue::Name(_) => return None,
            },
            Property::Int8(p) => p.value as u8,
            _ => return None,
        };
        bytes.push(byte);
    }
    Some(bytes)
}

/// Rebuilds a byte-element `ArrayProperty` from a plain byte vector, the
/// inverse of [`array_as_raw_bytes`].
fn raw_bytes_to_array(bytes: &[u8]) -> ArrayProperty {
    let values = bytes
        .iter()
        .map(|b| Property::Byte(ByteProperty { enum_name: None, value: ByteValue::Byte(*b) }))
        .collect();
    ArrayProperty::new("ByteProperty".to_string(), values)
}

/// The header fields a container-shaped property carries outside its bare
/// value body (element/key/value type names, struct name and guid) — not
/// recoverable from the raw bytes a custom handler sees, so the `Custom`
/// DOC node keeps them alongside `wire_type` to let lifting reconstruct the
/// exact [`Property`] variant (spec §4.E).
fn wire_header_to_doc(property: &Property) -> IndexMap<String, DocValue> {
    let mut header = IndexMap::new();
    match property {
        Property::Array(a) => {
            header.insert("element_type".to_string(), DocValue::String(a.element_type.clone()));
        }
        Property::Set(s) => {
            header.insert("element_type".to_string(), DocValue::String(s.element_type.clone()));
        }
        Property::Map(m) => {
            header.insert("key_type".to_string(), DocValue::String(m.key_type.clone()));
            header.insert("value_type".to_string(), DocValue::String(m.value_type.clone()));
        }
        Property::Struct(s) => {
            header.insert("struct_name".to_string(), DocValue::String(s.struct_name.clone()));
            header.insert("guid".to_string(), DocValue::String(s.guid.to_dashed_lowercase()));
        }
        _ => {}
    }
    header
}

/// Lifts one DOC property-object back into a [`Property`], the inverse of
/// [`property_to_doc`].
pub fn property_from_doc(doc: &DocValue, options: &mut PropertyOptions, doc_options: &DocOptions) -> Result<Property, Error> {
    let path = options.current_path();
    let type_tag = doc.field("type", &path)?.as_str(&path)?;
    if type_tag == "Custom" {
        let wire_type = doc.field("wire_type", &path)?.as_str(&path)?.to_string();
        let fields = match doc.field("fields", &path)? {
            DocValue::Object(o) => o.clone(),
            _ => return Err(SerializeError::invalid_value(&format!("expected object fields at {path}")).into()),
        };
        let unknown_bytes = match doc.field("unknown_bytes", &path)? {
            DocValue::Null => None,
            DocValue::Bytes(b) => Some(b.clone()),
            _ => return Err(SerializeError::invalid_value(&format!("expected bytes or null at {path}.unknown_bytes")).into()),
        };
        let wire_header = doc.field("wire_header", &path)?;
        let path_segments: Vec<&str> = options.properties_stack.iter().map(String::as_str).collect();
        let handler = doc_options
            .custom_properties
            .lookup(&path_segments)
            .ok_or_else(|| SerializeError::MissingCustomType(path.clone()))?;
        let context = HandlerContext { path: &path, discriminant: options.current_discriminant.as_deref() };
        let raw = handler.encode(&CustomValue { fields, unknown_bytes }, &context)?;
        return reconstruct_custom_property(&wire_type, wire_header, raw, options);
    }
    property_from_doc_generic(type_tag, doc, options, doc_options)
}

/// Rebuilds the [`Property`] a custom handler's `encode` produced bytes
/// for. Container-shaped wire types bypass [`Property::read_bare`] (which
/// refuses bare array/set/map bodies, since those normally carry their own
/// full-entry header) and go straight to each type's own `from_bytes`,
/// fed the header fields [`wire_header_to_doc`] preserved.
fn reconstruct_custom_property(wire_type: &str, wire_header: &DocValue, raw: Vec<u8>, options: &mut PropertyOptions) -> Result<Property, Error> {
    let path = options.current_path();
    Ok(match wire_type {
        "ArrayProperty" => {
            let element_type = wire_header.field("element_type", &path)?.as_str(&path)?.to_string();
            if element_type == "ByteProperty" || element_type == "Int8Property" {
                Property::Array(Box::new(raw_bytes_to_array(&raw)))
            } else {
                Property::Array(Box::new(ArrayProperty::from_bytes(element_type, &raw, options)?))
            }
        }
        "SetProperty" => {
            let element_type = wire_header.field("element_type", &path)?.as_str(&path)?.to_string();
            Property::Set(Box::new(SetProperty::from_bytes(element_type, &raw, options)?))
        }
        "MapProperty" => {
            let key_type = wire_header.field("key_type", &path)?.as_str(&path)?.to_string();
            let value_type = wire_header.field("value_type", &path)?.as_str(&path)?.to_string();
            Property::Map(Box::new(MapProperty::from_bytes(key_type, value_type, &raw, options)?))
        }
        "StructProperty" => {
            let struct_name = wire_header.field("struct_name", &path)?.as_str(&path)?.to_string();
            let guid_str = wire_header.field("guid", &path)?.as_str(&path)?;
            let guid = Guid::parse_dashed(guid_str).ok_or_else(|| SerializeError::invalid_value(&format!("bad guid at {path}")))?;
            Property::Struct(Box::new(StructProperty::from_bytes(struct_name, guid, &raw, options)?))
        }
        other => {
            let mut cursor = cursor_ext::sub_reader(&raw);
            Property::read_bare(&mut cursor, other, Some(raw.len() as u64), options)?
        }
    })
}

fn property_to_doc_generic(property: &Property, options: &mut PropertyOptions, doc_options: &DocOptions) -> Result<DocValue, Error> {
    let type_name = property.type_name().into_owned();
    let value = match property {
        Property::Int8(p) => DocValue::Int(p.value as i64),
        Property::Int16(p) => DocValue::Int(p.value as i64),
        Property::UInt16(p) => DocValue::UInt(p.value as u64),
        Property::Int(p) => DocValue::Int(p.value as i64),
        Property::UInt32(p) => DocValue::UInt(p.value as u64),
        Property::Int64(p) => DocValue::Int(p.value),
        Property::UInt64(p) => DocValue::UInt(p.value),
        Property::Float(p) => float_to_doc(p.value as f64, doc_options.nonfinite_to_null),
        Property::Double(p) => float_to_doc(p.value, doc_options.nonfinite_to_null),
        Property::Bool(p) => DocValue::Bool(p.value),
        Property::Str(p) => match &p.value {
            Some(s) => DocValue::String(s.clone()),
            None => DocValue::Null,
        },
        Property::Name(p) => DocValue::String(p.value.clone()),
        Property::Object(p) => DocValue::String(p.value.clone()),
        Property::Byte(p) => byte_to_doc(p),
        Property::Enum(p) => enum_to_doc(p),
        Property::Text(p) => text_to_doc(p),
        Property::Delegate(p) => delegate_to_doc(&p.value),
        Property::MulticastInlineDelegate(p) => multicast_to_doc(&p.value),
        Property::MulticastSparseDelegate(p) => multicast_to_doc(&p.value),
        Property::FieldPath(p) => field_path_to_doc(&p.value),
        Property::Struct(p) => struct_to_doc(p, options, doc_options)?,
        Property::Array(p) => array_to_doc(p, options, doc_options)?,
        Property::Map(p) => map_to_doc(p, options, doc_options)?,
        Property::Set(p) => set_to_doc(p, options, doc_options)?,
        Property::Unknown(p) => DocValue::Bytes(p.raw.clone()),
    };

    let mut object = IndexMap::new();
    object.insert("type".to_string(), DocValue::String(type_name));
    object.insert("id".to_string(), DocValue::Null);
    object.insert("value".to_string(), value);
    Ok(DocValue::Object(object))
}

fn byte_to_doc(p: &ByteProperty) -> DocValue {
    let mut object = IndexMap::new();
    object.insert(
        "enum_name".to_string(),
        match &p.enum_name {
            Some(n) => DocValue::String(n.clone()),
            None => DocValue::Null,
        },
    );
    object.insert(
        "value".to_string(),
        match &p.value {
            ByteValue::Byte(b) => DocValue::UInt(*b as u64),
            ByteValue::Name(n) => DocValue::String(n.clone()),
        },
    );
    DocValue::Object(object)
}

fn enum_to_doc(p: &EnumProperty) -> DocValue {
    let mut object = IndexMap::new();
    object.insert("enum_type".to_string(), DocValue::String(p.enum_type.clone()));
    object.insert("value".to_string(), DocValue::String(p.value.clone()));
    DocValue::Object(object)
}

fn delegate_to_doc(delegate: &Delegate) -> DocValue {
    let mut object = IndexMap::new();
    object.insert("object".to_string(), DocValue::String(delegate.object.clone()));
    object.insert("function_name".to_string(), DocValue::String(delegate.function_name.clone()));
    DocValue::Object(object)
}

fn multicast_to_doc(multicast: &MulticastScriptDelegate) -> DocValue {
    DocValue::Array(multicast.delegates.iter().map(delegate_to_doc).collect())
}

fn field_path_to_doc(field_path: &FieldPath) -> DocValue {
    let mut object = IndexMap::new();
    object.insert(
        "path".to_string(),
        DocValue::Array(field_path.path.iter().map(|s| DocValue::String(s.clone())).collect()),
    );
    object.insert("resolved_owner".to_string(), DocValue::String(field_path.resolved_owner.clone()));
    DocValue::Object(object)
}

fn text_to_doc(p: &TextProperty) -> DocValue {
    let mut object = IndexMap::new();
    object.insert("flags".to_string(), DocValue::UInt(p.value.flags as u64));
    let history = match &p.value.history {
        FTextHistory::None { culture_invariant_string } => {
            let mut h = IndexMap::new();
            h.insert("kind".to_string(), DocValue::String("None".to_string()));
            h.insert(
                "culture_invariant_string".to_string(),
                match culture_invariant_string {
                    Some(s) => DocValue::String(s.clone()),
                    None => DocValue::Null,
                },
            );
            DocValue::Object(h)
        }
        FTextHistory::Base { namespace, key, source_string } => {
            let mut h = IndexMap::new();
            h.insert("kind".to_string(), DocValue::String("Base".to_string()));
            h.insert("namespace".to_string(), opt_string_to_doc(namespace));
            h.insert("key".to_string(), opt_string_to_doc(key));
            h.insert("source_string".to_string(), opt_string_to_doc(source_string));
            DocValue::Object(h)
        }
        FTextHistory::Other { history_type, raw } => {
            let mut h = IndexMap::new();
            h.insert("kind".to_string(), DocValue::String("Other".to_string()));
            h.insert("history_type".to_string(), DocValue::Int(*history_type as i64));
            h.insert("raw".to_string(), DocValue::Bytes(raw.clone()));
            DocValue::Object(h)
        }
    };
    object.insert("history".to_string(), history);
    DocValue::Object(object)
}

fn opt_string_to_doc(value: &Option<String>) -> DocValue {
    match value {
        Some(s) => DocValue::String(s.clone()),
        None => DocValue::Null,
    }
}

fn struct_to_doc(p: &StructProperty, options: &mut PropertyOptions, doc_options: &DocOptions) -> Result<DocValue, Error> {
    let mut object = IndexMap::new();
    object.insert("struct_name".to_string(), DocValue::String(p.struct_name.clone()));
    object.insert("guid".to_string(), DocValue::String(p.guid.to_dashed_lowercase()));
    let body = match &p.value {
        StructPropertyValue::Vector(v) => vector_to_doc(v),
        StructPropertyValue::Rotator(v) => rotator_to_doc(v),
        StructPropertyValue::Quat(v) => quat_to_doc(v),
        StructPropertyValue::LinearColor(v) => linear_color_to_doc(v),
        StructPropertyValue::DateTime(v) => DocValue::UInt(v.ticks),
        StructPropertyValue::Guid(v) => DocValue::String(v.to_dashed_lowercase()),
        StructPropertyValue::IntPoint(v) => int_point_to_doc(v),
        StructPropertyValue::CustomStruct(fields) => properties_to_doc(fields, options, doc_options)?,
    };
    object.insert("body".to_string(), body);
    Ok(DocValue::Object(object))
}

fn vector_to_doc(v: &Vector) -> DocValue {
    let mut o = IndexMap::new();
    o.insert("x".to_string(), DocValue::Float(v.x));
    o.insert("y".to_string(), DocValue::Float(v.y));
    o.insert("z".to_string(), DocValue::Float(v.z));
    DocValue::Object(o)
}

fn rotator_to_doc(v: &Rotator) -> DocValue {
    let mut o = IndexMap::new();
    o.insert("pitch".to_string(), DocValue::Float(v.pitch));
    o.insert("yaw".to_string(), DocValue::Float(v.yaw));
    o.insert("roll".to_string(), DocValue::Float(v.roll));
    DocValue::Object(o)
}

fn quat_to_doc(v: &Quat) -> DocValue {
    let mut o = IndexMap::new();
    o.insert("x".to_string(), DocValue::Float(v.x));
    o.insert("y".to_string(), DocValue::Float(v.y));
    o.insert("z".to_string(), DocValue::Float(v.z));
    o.insert("w".to_string(), DocValue::Float(v.w));
    DocValue::Object(o)
}

fn linear_color_to_doc(v: &LinearColor) -> DocValue {
    let mut o = IndexMap::new();
    o.insert("r".to_string(), DocValue::Float(v.r as f64));
    o.insert("g".to_string(), DocValue::Float(v.g as f64));
    o.insert("b".to_string(), DocValue::Float(v.b as f64));
    o.insert("a".to_string(), DocValue::Float(v.a as f64));
    DocValue::Object(o)
}

fn int_point_to_doc(v: &IntPoint) -> DocValue {
    let mut o = IndexMap::new();
    o.insert("x".to_string(), DocValue::Int(v.x as i64));
    o.insert("y".to_string(), DocValue::Int(v.y as i64));
    DocValue::Object(o)
}

fn array_to_doc(p: &ArrayProperty, options: &mut PropertyOptions, doc_options: &DocOptions) -> Result<DocValue, Error> {
    let mut values = Vec::with_capacity(p.values.len());
    for value in &p.values {
        values.push(property_to_doc(value, options, doc_options)?);
    }
    let mut object = IndexMap::new();
    object.insert("element_type".to_string(), DocValue::String(p.element_type.clone()));
    object.insert("values".to_string(), DocValue::Array(values));
    Ok(DocValue::Object(object))
}

fn set_to_doc(p: &SetProperty, options: &mut PropertyOptions, doc_options: &DocOptions) -> Result<DocValue, Error> {
    let mut values = Vec::with_capacity(p.values.len());
    for value in &p.values {
        values.push(property_to_doc(value, options, doc_options)?);
    }
    let mut object = IndexMap::new();
    object.insert("element_type".to_string(), DocValue::String(p.element_type.clone()));
    object.insert("values".to_string(), DocValue::Array(values));
    Ok(DocValue::Object(object))
}

/// Renders a map entry's key as the sibling discriminant a handler hung off
/// that entry's value can see (a module type, an object id, …) — the key is
/// otherwise invisible to a handler, which is only ever handed the value
/// side's raw bytes (spec §4.E).
fn discriminant_of(key: &Property) -> Option<String> {
    match key {
        Property::Enum(p) => Some(p.value.clone()),
        Property::Byte(p) => match &p.value {
            ByteValue::Name(n) => Some(n.clone()),
            ByteValue::Byte(b) => Some(b.to_string()),
        },
        Property::Str(p) => p.value.clone(),
        Property::Name(p) => Some(p.value.clone()),
        Property::Struct(p) => match &p.value {
            StructPropertyValue::Guid(g) => Some(g.to_dashed_lowercase()),
            _ => None,
        },
        _ => None,
    }
}

fn map_to_doc(p: &MapProperty, options: &mut PropertyOptions, doc_options: &DocOptions) -> Result<DocValue, Error> {
    let mut entries = Vec::with_capacity(p.entries.len());
    for (key, value) in &p.entries {
        let key_doc = {
            let _guard = options.push_path("Key");
            property_to_doc(key, options, doc_options)?
        };
        let previous_discriminant = options.current_discriminant.take();
        options.current_discriminant = discriminant_of(key);
        let value_doc = {
            let _guard = options.push_path("Value");
            property_to_doc(value, options, doc_options)?
        };
        options.current_discriminant = previous_discriminant;
        let mut entry = IndexMap::new();
        entry.insert("key".to_string(), key_doc);
        entry.insert("value".to_string(), value_doc);
        entries.push(DocValue::Object(entry));
    }
    let mut object = IndexMap::new();
    object.insert("key_type".to_string(), DocValue::String(p.key_type.clone()));
    object.insert("value_type".to_string(), DocValue::String(p.value_type.clone()));
    object.insert("entries".to_string(), DocValue::Array(entries));
    Ok(DocValue::Object(object))
}

fn property_from_doc_generic(
    type_name: &str,
    doc: &DocValue,
    options: &mut PropertyOptions,
    doc_options: &DocOptions,
) -> Result<Property, Error> {
    let path = options.current_path();
    let value = doc.field("value", &path)?;
    Ok(match type_name {
        "Int8Property" => Property::Int8(Int8Property::new(value.as_i64(&path)? as i8)),
        "Int16Property" => Property::Int16(Int16Property::new(value.as_i64(&path)? as i16)),
        "UInt16Property" => Property::UInt16(UInt16Property::new(value.as_u64(&path)? as u16)),
        "IntProperty" => Property::Int(IntProperty::new(value.as_i64(&path)? as i32)),
        "UInt32Property" => Property::UInt32(UInt32Property::new(value.as_u64(&path)? as u32)),
        "Int64Property" => Property::Int64(Int64Property::new(value.as_i64(&path)?)),
        "UInt64Property" => Property::UInt64(UInt64Property::new(value.as_u64(&path)?)),
        "FloatProperty" => Property::Float(FloatProperty::new(value.as_f64(&path)? as f32)),
        "DoubleProperty" => Property::Double(DoubleProperty::new(value.as_f64(&path)?)),
        "BoolProperty" => Property::Bool(BoolProperty::new(value.as_bool(&path)?)),
        "StrProperty" => Property::Str(StrProperty::new(value.as_opt_str(&path)?.map(str::to_string))),
        "NameProperty" => Property::Name(NameProperty::new(value.as_str(&path)?.to_string())),
        "ObjectProperty" => Property::Object(ObjectProperty::new(value.as_str(&path)?.to_string())),
        "ByteProperty" => Property::Byte(byte_from_doc(value, &path)?),
        "EnumProperty" => Property::Enum(enum_from_doc(value, &path)?),
        "TextProperty" => Property::Text(text_from_doc(value, &path)?),
        "DelegateProperty" => Property::Delegate(DelegateProperty::new(delegate_from_doc(value, &path)?)),
        "MulticastInlineDelegateProperty" => {
            Property::MulticastInlineDelegate(MulticastInlineDelegateProperty::new(multicast_from_doc(value, &path)?))
        }
        "MulticastSparseDelegateProperty" => {
            Property::MulticastSparseDelegate(MulticastSparseDelegateProperty::new(multicast_from_doc(value, &path)?))
        }
        "FieldPathProperty" => Property::FieldPath(FieldPathProperty::new(field_path_from_doc(value, &path)?)),
        "StructProperty" => Property::Struct(Box::new(struct_from_doc(value, options, doc_options)?)),
        "ArrayProperty" => Property::Array(Box::new(array_from_doc(value, options, doc_options)?)),
        "MapProperty" => Property::Map(Box::new(map_from_doc(value, options, doc_options)?)),
        "SetProperty" => Property::Set(Box::new(set_from_doc(value, options, doc_options)?)),
        other => Property::Unknown(UnknownProperty::new(other, value.as_bytes(&path)?)),
    })
}

fn byte_from_doc(doc: &DocValue, path: &str) -> Result<ByteProperty, Error> {
    let enum_name = doc.field("enum_name", path)?.as_opt_str(path)?.map(str::to_string);
    let value_doc = doc.field("value", path)?;
    let value = match &enum_name {
        None => ByteValue::Byte(value_doc.as_u64(path)? as u8),
        Some(_) => ByteValue::Name(value_doc.as_str(path)?.to_string()),
    };
    Ok(ByteProperty { enum_name, value })
}

fn enum_from_doc(doc: &DocValue, path: &str) -> Result<EnumProperty, Error> {
    let enum_type = doc.field("enum_type", path)?.as_str(path)?.to_string();
    let value = doc.field("value", path)?.as_str(path)?.to_string();
    Ok(EnumProperty::new(enum_type, value))
}

fn delegate_from_doc(doc: &DocValue, path: &str) -> Result<Delegate, Error> {
    let object = doc.field("object", path)?.as_str(path)?.to_string();
    let function_name = doc.field("function_name", path)?.as_str(path)?.to_string();
    Ok(Delegate::new(object, function_name))
}

fn multicast_from_doc(doc: &DocValue, path: &str) -> Result<MulticastScriptDelegate, Error> {
    let entries = doc.as_array(path)?;
    let mut delegates = Vec::with_capacity(entries.len());
    for entry in entries {
        delegates.push(delegate_from_doc(entry, path)?);
    }
    Ok(MulticastScriptDelegate { delegates })
}

fn field_path_from_doc(doc: &DocValue, path: &str) -> Result<FieldPath, Error> {
    let segments = doc.field("path", path)?.as_array(path)?;
    let mut field_path = Vec::with_capacity(segments.len());
    for segment in segments {
        field_path.push(segment.as_str(path)?.to_string());
    }
    let resolved_owner = doc.field("resolved_owner", path)?.as_str(path)?.to_string();
    Ok(FieldPath::new(field_path, resolved_owner))
}

fn text_from_doc(doc: &DocValue, path: &str) -> Result<TextProperty, Error> {
    let flags = doc.field("flags", path)?.as_u64(path)? as u32;
    let history_doc = doc.field("history", path)?;
    let kind = history_doc.field("kind", path)?.as_str(path)?;
    let history = match kind {
        "None" => FTextHistory::None {
            culture_invariant_string: history_doc.field("culture_invariant_string", path)?.as_opt_str(path)?.map(str::to_string),
        },
        "Base" => FTextHistory::Base {
            namespace: history_doc.field("namespace", path)?.as_opt_str(path)?.map(str::to_string),
            key: history_doc.field("key", path)?.as_opt_str(path)?.map(str::to_string),
            source_string: history_doc.field("source_string", path)?.as_opt_str(path)?.map(str::to_string),
        },
        _ => FTextHistory::Other {
            history_type: history_doc.field("history_type", path)?.as_i64(path)? as i8,
            raw: history_doc.field("raw", path)?.as_bytes(path)?,
        },
    };
    Ok(TextProperty::new(FText { flags, history }))
}

fn struct_from_doc(doc: &DocValue, options: &mut PropertyOptions, doc_options: &DocOptions) -> Result<StructProperty, Error> {
    let path = options.current_path();
    let struct_name = doc.field("struct_name", &path)?.as_str(&path)?.to_string();
    let guid_str = doc.field("guid", &path)?.as_str(&path)?;
    let guid = Guid::parse_dashed(guid_str).ok_or_else(|| SerializeError::invalid_value(&format!("bad guid at {path}")))?;
    let body = doc.field("body", &path)?;
    let value = match struct_name.as_str() {
        "Vector" => StructPropertyValue::Vector(Vector::new(
            body.field("x", &path)?.as_f64(&path)?,
            body.field("y", &path)?.as_f64(&path)?,
            body.field("z", &path)?.as_f64(&path)?,
        )),
        "Rotator" => StructPropertyValue::Rotator(Rotator::new(
            body.field("pitch", &path)?.as_f64(&path)?,
            body.field("yaw", &path)?.as_f64(&path)?,
            body.field("roll", &path)?.as_f64(&path)?,
        )),
        "Quat" => StructPropertyValue::Quat(Quat::new(
            body.field("x", &path)?.as_f64(&path)?,
            body.field("y", &path)?.as_f64(&path)?,
            body.field("z", &path)?.as_f64(&path)?,
            body.field("w", &path)?.as_f64(&path)?,
        )),
        "LinearColor" => StructPropertyValue::LinearColor(LinearColor::new(
            body.field("r", &path)?.as_f64(&path)? as f32,
            body.field("g", &path)?.as_f64(&path)? as f32,
            body.field("b", &path)?.as_f64(&path)? as f32,
            body.field("a", &path)?.as_f64(&path)? as f32,
        )),
        "DateTime" => StructPropertyValue::DateTime(DateTime::new(body.as_u64(&path)?)),
        "Guid" => StructPropertyValue::Guid(
            Guid::parse_dashed(body.as_str(&path)?).ok_or_else(|| SerializeError::invalid_value(&format!("bad guid at {path}")))?,
        ),
        "IntPoint" => StructPropertyValue::IntPoint(IntPoint::new(
            body.field("x", &path)?.as_i64(&path)? as i32,
            body.field("y", &path)?.as_i64(&path)? as i32,
        )),
        _ => StructPropertyValue::CustomStruct(doc_to_properties(body, options, doc_options)?),
    };
    Ok(StructProperty { struct_name, guid, value })
}

fn array_from_doc(doc: &DocValue, options: &mut PropertyOptions, doc_options: &DocOptions) -> Result<ArrayProperty, Error> {
    let path = options.current_path();
    let element_type = doc.field("element_type", &path)?.as_str(&path)?.to_string();
    let values_doc = doc.field("values", &path)?.as_array(&path)?;
    let mut values = Vec::with_capacity(values_doc.len());
    for value_doc in values_doc {
        values.push(property_from_doc(value_doc, options, doc_options)?);
    }
    Ok(ArrayProperty::new(element_type, values))
}

fn set_from_doc(doc: &DocValue, options: &mut PropertyOptions, doc_options: &DocOptions) -> Result<SetProperty, Error> {
    let path = options.current_path();
    let element_type = doc.field("element_type", &path)?.as_str(&path)?.to_string();
    let values_doc = doc.field("values", &path)?.as_array(&path)?;
    let mut values = Vec::with_capacity(values_doc.len());
    for value_doc in values_doc {
        values.push(property_from_doc(value_doc, options, doc_options)?);
    }
    Ok(SetProperty::new(element_type, values))
}

fn map_from_doc(doc: &DocValue, options: &mut PropertyOptions, doc_options: &DocOptions) -> Result<MapProperty, Error> {
    let path = options.current_path();
    let key_type = doc.field("key_type", &path)?.as_str(&path)?.to_string();
    let value_type = doc.field("value_type", &path)?.as_str(&path)?.to_string();
    let entries_doc = doc.field("entries", &path)?.as_array(&path)?;
    let mut entries = Vec::with_capacity(entries_doc.len());
    for entry_doc in entries_doc {
        let key = {
            let _guard = options.push_path("Key");
            property_from_doc(entry_doc.field("key", &path)?, options, doc_options)?
        };
        let previous_discriminant = options.current_discriminant.take();
        options.current_discriminant = discriminant_of(&key);
        let value = {
            let _guard = options.push_path("Value");
            property_from_doc(entry_doc.field("value", &path)?, options, doc_options)?
        };
        options.current_discriminant = previous_discriminant;
        entries.push((key, value));
    }
    Ok(MapProperty::new(key_type, value_type, entries))
}

//! `worldSaveData.BaseCampSaveData.Value.ModuleMap.Value.RawData` (spec
//! §4.E): a per-module-type sub-switch. The module type isn't carried in
//! the raw bytes themselves — it's the sibling map key
//! ([`HandlerContext::discriminant`]) this handler is hung off.
//!
//! Grounded on `palworld_save_tools.rawdata.base_camp_module`.

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;

use crate::cursor_ext::{self, ReadExt, WriteExt};
use crate::doc::DocValue;
use crate::error::{Error, SerializeError};
use crate::registry::{CustomPropertyHandler, CustomValue, HandlerContext};

/// Module types that carry no payload at all beyond their presence in the
/// map (`NO_OP_TYPES` in the original tool).
const NO_OP_TYPES: &[&str] = &[
    "EPalBaseCampModuleType::Energy",
    "EPalBaseCampModuleType::Medical",
    "EPalBaseCampModuleType::ResourceCollector",
    "EPalBaseCampModuleType::ItemStorages",
    "EPalBaseCampModuleType::FacilityReservation",
    "EPalBaseCampModuleType::ObjectMaintenance",
    "EPalBaseCampModuleType::ItemStackInfo",
];

/// Decodes a base camp module's `RawData`, dispatching on the module type
/// carried by the enclosing map entry's key.
#[derive(Debug)]
pub struct BaseCampModuleMapHandler;

impl CustomPropertyHandler for BaseCampModuleMapHandler {
    fn decode(&self, raw: &[u8], context: &HandlerContext) -> Result<Option<CustomValue>, Error> {
        let Some(module_type) = context.discriminant else {
            return Ok(None);
        };
        let mut cursor = Cursor::new(raw.to_vec());
        let mut fields = IndexMap::new();

        if NO_OP_TYPES.contains(&module_type) {
            // Nothing to decode.
        } else if module_type == "EPalBaseCampModuleType::TransportItemDirector" {
            let item_infos = cursor.read_tarray(read_item_and_num)?;
            if cursor_ext::remaining(&cursor) < 4 {
                return Ok(None);
            }
            let mut trailing = [0u8; 4];
            cursor.read_exact(&mut trailing)?;
            fields.insert("item_infos".to_string(), DocValue::Array(item_infos));
            fields.insert("trailing_bytes".to_string(), DocValue::Bytes(trailing.to_vec()));
        } else if module_type == "EPalBaseCampModuleType::PassiveEffect" {
            let passive_effects = cursor.read_tarray(read_passive_effect)?;
            fields.insert("passive_effects".to_string(), DocValue::Array(passive_effects));
        } else {
            return Ok(None);
        }

        if !cursor_ext::at_eof(&cursor) {
            return Ok(None);
        }
        Ok(Some(CustomValue { fields, unknown_bytes: None }))
    }

    fn encode(&self, value: &CustomValue, context: &HandlerContext) -> Result<Vec<u8>, Error> {
        let path = context.path;
        let Some(module_type) = context.discriminant else {
            return Err(SerializeError::invalid_value("base camp module handler needs a discriminant").into());
        };
        let mut out = Cursor::new(Vec::new());

        if NO_OP_TYPES.contains(&module_type) {
            // Nothing to write.
        } else if module_type == "EPalBaseCampModuleType::TransportItemDirector" {
            let item_infos = value
                .fields
                .get("item_infos")
                .ok_or_else(|| Error::from(SerializeError::struct_missing_field("TransportItemDirector", "item_infos")))?
                .as_array(path)?;
            out.write_tarray(item_infos, write_item_and_num)?;
            let trailing = value
                .fields
                .get("trailing_bytes")
                .ok_or_else(|| Error::from(SerializeError::struct_missing_field("TransportItemDirector", "trailing_bytes")))?
                .as_bytes(path)?;
            out.write_all(&trailing)?;
        } else if module_type == "EPalBaseCampModuleType::PassiveEffect" {
            let passive_effects = value
                .fields
                .get("passive_effects")
                .ok_or_else(|| Error::from(SerializeError::struct_missing_field("PassiveEffect", "passive_effects")))?
                .as_array(path)?;
            out.write_tarray(passive_effects, write_passive_effect)?;
        }

        Ok(out.into_inner())
    }
}

fn read_item_and_num(cursor: &mut Cursor<Vec<u8>>) -> Result<DocValue, Error> {
    let static_id = cursor.read_string()?;
    let created_world_id = cursor.read_guid()?;
    let local_id_in_created_world = cursor.read_guid()?;
    let count = cursor.read_i32::<LittleEndian>()?;

    let mut dynamic_id = IndexMap::new();
    dynamic_id.insert("created_world_id".to_string(), DocValue::String(created_world_id.to_dashed_lowercase()));
    dynamic_id.insert(
        "local_id_in_created_world".to_string(),
        DocValue::String(local_id_in_created_world.to_dashed_lowercase()),
    );

    let mut item_id = IndexMap::new();
    item_id.insert("static_id".to_string(), DocValue::String(static_id));
    item_id.insert("dynamic_id".to_string(), DocValue::Object(dynamic_id));

    let mut entry = IndexMap::new();
    entry.insert("item_id".to_string(), DocValue::Object(item_id));
    entry.insert("count".to_string(), DocValue::Int(count as i64));
    Ok(DocValue::Object(entry))
}

fn write_item_and_num(cursor: &mut Cursor<Vec<u8>>, entry: &DocValue) -> Result<(), Error> {
    let path = "item_infos";
    let item_id = entry.field("item_id", path)?;
    cursor.write_string(item_id.field("static_id", path)?.as_str(path)?)?;
    let dynamic_id = item_id.field("dynamic_id", path)?;
    let created_world_id = crate::types::Guid::parse_dashed(dynamic_id.field("created_world_id", path)?.as_str(path)?)
        .ok_or_else(|| SerializeError::invalid_value("bad created_world_id guid"))?;
    let local_id = crate::types::Guid::parse_dashed(dynamic_id.field("local_id_in_created_world", path)?.as_str(path)?)
        .ok_or_else(|| SerializeError::invalid_value("bad local_id_in_created_world guid"))?;
    cursor.write_guid(&created_world_id)?;
    cursor.write_guid(&local_id)?;
    cursor.write_i32::<LittleEndian>(entry.field("count", path)?.as_i64(path)? as i32)?;
    Ok(())
}

fn read_passive_effect(cursor: &mut Cursor<Vec<u8>>) -> Result<DocValue, Error> {
    let effect_type = cursor.read_u8()?;
    let mut entry = IndexMap::new();
    entry.insert("type".to_string(), DocValue::UInt(effect_type as u64));
    if effect_type == 2 {
        let work_hard_type = cursor.read_u8()?;
        let mut trailer = vec![0u8; 12];
        cursor.read_exact(&mut trailer)?;
        entry.insert("work_hard_type".to_string(), DocValue::UInt(work_hard_type as u64));
        entry.insert("unknown_trailer".to_string(), DocValue::Bytes(trailer));
    }
    Ok(DocValue::Object(entry))
}

fn write_passive_effect(cursor: &mut Cursor<Vec<u8>>, entry: &DocValue) -> Result<(), Error> {
    let path = "passive_effects";
    let effect_type = entry.field("type", path)?.as_u64(path)? as u8;
    cursor.write_u8(effect_type)?;
    if effect_type == 2 {
        cursor.write_u8(entry.field("work_hard_type", path)?.as_u64(path)? as u8)?;
        cursor.write_all(&entry.field("unknown_trailer", path)?.as_bytes(path)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_op_module_type_decodes_to_empty_fields() {
        let handler = BaseCampModuleMapHandler;
        let context = HandlerContext {
            path: "worldSaveData.BaseCampSaveData.Value.ModuleMap.Value.RawData",
            discriminant: Some("EPalBaseCampModuleType::Energy"),
        };
        let decoded = handler.decode(&[], &context).unwrap().unwrap();
        assert!(decoded.fields.is_empty());
        assert_eq!(handler.encode(&decoded, &context).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn unrecognized_module_type_falls_back_to_raw() {
        let handler = BaseCampModuleMapHandler;
        let context = HandlerContext {
            path: "worldSaveData.BaseCampSaveData.Value.ModuleMap.Value.RawData",
            discriminant: Some("EPalBaseCampModuleType::SomethingNew"),
        };
        assert!(handler.decode(&[1, 2, 3], &context).unwrap().is_none());
    }
}

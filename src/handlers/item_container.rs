//! `worldSaveData.ItemContainerSaveData.Value.Slots` (spec §4.E): a
//! counted list of inventory slots, each holding a static item id, a
//! dynamic-item reference pair, and a stack count.
//!
//! Structural analogy to the item/count records already grounded in
//! `palworld_save_tools.rawdata.base_camp_module`'s `TransportItemDirector`
//! handling; this handler adds the slot index that a container's slot list
//! carries ahead of each item record.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;

use crate::cursor_ext::{self, ReadExt, WriteExt};
use crate::doc::DocValue;
use crate::error::{Error, SerializeError};
use crate::registry::{CustomPropertyHandler, CustomValue, HandlerContext};
use crate::types::Guid;

#[derive(Debug)]
pub struct ItemContainerSlotsHandler;

impl CustomPropertyHandler for ItemContainerSlotsHandler {
    fn decode(&self, raw: &[u8], _context: &HandlerContext) -> Result<Option<CustomValue>, Error> {
        let mut cursor = Cursor::new(raw.to_vec());
        let slots = match cursor.read_tarray(read_slot) {
            Ok(slots) => slots,
            Err(_) => return Ok(None),
        };
        if !cursor_ext::at_eof(&cursor) {
            return Ok(None);
        }
        let mut fields = IndexMap::new();
        fields.insert("slots".to_string(), DocValue::Array(slots));
        Ok(Some(CustomValue { fields, unknown_bytes: None }))
    }

    fn encode(&self, value: &CustomValue, context: &HandlerContext) -> Result<Vec<u8>, Error> {
        let path = context.path;
        let slots = value
            .fields
            .get("slots")
            .ok_or_else(|| Error::from(SerializeError::struct_missing_field(path, "slots")))?
            .as_array(path)?;
        let mut out = Cursor::new(Vec::new());
        out.write_tarray(slots, write_slot)?;
        Ok(out.into_inner())
    }
}

fn read_slot(cursor: &mut Cursor<Vec<u8>>) -> Result<DocValue, Error> {
    let slot_index = cursor.read_i32::<LittleEndian>()?;
    let static_id = cursor.read_string()?;
    let created_world_id = cursor.read_guid()?;
    let local_id_in_created_world = cursor.read_guid()?;
    let stack_count = cursor.read_i32::<LittleEndian>()?;

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
    entry.insert("slot_index".to_string(), DocValue::Int(slot_index as i64));
    entry.insert("item_id".to_string(), DocValue::Object(item_id));
    entry.insert("stack_count".to_string(), DocValue::Int(stack_count as i64));
    Ok(DocValue::Object(entry))
}

fn write_slot(cursor: &mut Cursor<Vec<u8>>, entry: &DocValue) -> Result<(), Error> {
    let path = "slots";
    cursor.write_i32::<LittleEndian>(entry.field("slot_index", path)?.as_i64(path)? as i32)?;
    let item_id = entry.field("item_id", path)?;
    cursor.write_string(item_id.field("static_id", path)?.as_str(path)?)?;
    let dynamic_id = item_id.field("dynamic_id", path)?;
    let created_world_id = Guid::parse_dashed(dynamic_id.field("created_world_id", path)?.as_str(path)?)
        .ok_or_else(|| SerializeError::invalid_value("bad created_world_id guid"))?;
    let local_id = Guid::parse_dashed(dynamic_id.field("local_id_in_created_world", path)?.as_str(path)?)
        .ok_or_else(|| SerializeError::invalid_value("bad local_id_in_created_world guid"))?;
    cursor.write_guid(&created_world_id)?;
    cursor.write_guid(&local_id)?;
    cursor.write_i32::<LittleEndian>(entry.field("stack_count", path)?.as_i64(path)? as i32)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_handful_of_slots() {
        let handler = ItemContainerSlotsHandler;
        let mut raw = Vec::new();
        raw.extend_from_slice(&2u32.to_le_bytes());
        for slot_index in 0..2i32 {
            raw.extend_from_slice(&slot_index.to_le_bytes());
            raw.extend_from_slice(&5u32.to_le_bytes());
            raw.extend_from_slice(b"Wood");
            raw.push(0);
            raw.extend_from_slice(&Guid::ZERO.0);
            raw.extend_from_slice(&Guid::ZERO.0);
            raw.extend_from_slice(&10i32.to_le_bytes());
        }

        let context = HandlerContext { path: "worldSaveData.ItemContainerSaveData.Value.Slots", discriminant: None };
        let decoded = handler.decode(&raw, &context).unwrap().unwrap();
        assert_eq!(decoded.fields.get("slots").unwrap().as_array("slots").unwrap().len(), 2);
        let encoded = handler.encode(&decoded, &context).unwrap();
        assert_eq!(encoded, raw);
    }

    #[test]
    fn malformed_bytes_fall_back_to_raw() {
        let handler = ItemContainerSlotsHandler;
        let context = HandlerContext { path: "worldSaveData.ItemContainerSaveData.Value.Slots", discriminant: None };
        assert!(handler.decode(&[1, 2, 3], &context).unwrap().is_none());
    }
}

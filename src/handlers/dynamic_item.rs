//! `worldSaveData.DynamicItemSaveData.RawData` (spec §4.E): the per-item
//! dynamic state (durability, crafted-stats rolls) attached to an
//! equipment instance referenced elsewhere by its `dynamic_id` guid pair.
//!
//! Structural analogy to the `item_id`/`dynamic_id` record grounded in
//! `palworld_save_tools.rawdata.map_concrete_model`'s `PalMapObjectDropItemModel`.

use std::io::{Cursor, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;

use crate::cursor_ext::{self, ReadExt, WriteExt};
use crate::doc::DocValue;
use crate::error::{Error, SerializeError};
use crate::registry::{CustomPropertyHandler, CustomValue, HandlerContext};
use crate::types::Guid;

#[derive(Debug)]
pub struct DynamicItemHandler;

impl CustomPropertyHandler for DynamicItemHandler {
    fn decode(&self, raw: &[u8], _context: &HandlerContext) -> Result<Option<CustomValue>, Error> {
        if raw.len() < 16 + 16 + 4 {
            return Ok(None);
        }
        let mut cursor = Cursor::new(raw.to_vec());
        let local_id_in_created_world = cursor.read_guid()?;
        let created_world_id = cursor.read_guid()?;
        let durability = cursor.read_f32::<LittleEndian>()?;

        let mut fields = IndexMap::new();
        fields.insert("local_id_in_created_world".to_string(), DocValue::String(local_id_in_created_world.to_dashed_lowercase()));
        fields.insert("created_world_id".to_string(), DocValue::String(created_world_id.to_dashed_lowercase()));
        fields.insert("durability".to_string(), DocValue::Float(durability as f64));

        let unknown_bytes = if cursor_ext::at_eof(&cursor) { None } else { Some(cursor_ext::read_to_end_vec(&mut cursor)?) };
        Ok(Some(CustomValue { fields, unknown_bytes }))
    }

    fn encode(&self, value: &CustomValue, context: &HandlerContext) -> Result<Vec<u8>, Error> {
        let path = context.path;
        let field = |name: &'static str| {
            value
                .fields
                .get(name)
                .ok_or_else(|| Error::from(SerializeError::struct_missing_field(path, name)))
        };
        let local_id_in_created_world = Guid::parse_dashed(field("local_id_in_created_world")?.as_str(path)?)
            .ok_or_else(|| SerializeError::invalid_value("bad local_id_in_created_world guid"))?;
        let created_world_id = Guid::parse_dashed(field("created_world_id")?.as_str(path)?)
            .ok_or_else(|| SerializeError::invalid_value("bad created_world_id guid"))?;
        let durability = field("durability")?.as_f64(path)? as f32;

        let mut out = Cursor::new(Vec::new());
        out.write_guid(&local_id_in_created_world)?;
        out.write_guid(&created_world_id)?;
        out.write_f32::<LittleEndian>(durability)?;
        if let Some(unknown) = &value.unknown_bytes {
            out.write_all(unknown)?;
        }
        Ok(out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_with_no_trailer() {
        let handler = DynamicItemHandler;
        let mut raw = Vec::new();
        raw.extend_from_slice(&Guid::from_4_ints(1, 2, 3, 4).0);
        raw.extend_from_slice(&Guid::from_4_ints(5, 6, 7, 8).0);
        raw.extend_from_slice(&0.75f32.to_le_bytes());

        let context = HandlerContext { path: "worldSaveData.DynamicItemSaveData.RawData", discriminant: None };
        let decoded = handler.decode(&raw, &context).unwrap().unwrap();
        assert_eq!(decoded.unknown_bytes, None);
        let encoded = handler.encode(&decoded, &context).unwrap();
        assert_eq!(encoded, raw);
    }

    #[test]
    fn too_short_input_falls_back_to_raw() {
        let handler = DynamicItemHandler;
        let context = HandlerContext { path: "worldSaveData.DynamicItemSaveData.RawData", discriminant: None };
        assert!(handler.decode(&[1, 2, 3], &context).unwrap().is_none());
    }
}

//! `worldSaveData.CharacterSaveParameterMap.Value.SaveParameter.ItemContainerInfos`
//! (spec §4.E): a counted list of container references, each pointing a
//! named inventory slot (common storage, equipped weapon, armor, food, ...)
//! at an [`crate::handlers::item_container`] container by id.
//!
//! Structural analogy to the container-reference shapes already grounded in
//! `palworld_save_tools.rawdata.character_container` and
//! `rawdata.map_concrete_model`'s `item_id` record.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;

use crate::cursor_ext::{self, ReadExt, WriteExt};
use crate::doc::DocValue;
use crate::error::{Error, SerializeError};
use crate::registry::{CustomPropertyHandler, CustomValue, HandlerContext};
use crate::types::Guid;

#[derive(Debug)]
pub struct InventoryInfoHandler;

impl CustomPropertyHandler for InventoryInfoHandler {
    fn decode(&self, raw: &[u8], _context: &HandlerContext) -> Result<Option<CustomValue>, Error> {
        let mut cursor = Cursor::new(raw.to_vec());
        let infos = match cursor.read_tarray(read_container_info) {
            Ok(infos) => infos,
            Err(_) => return Ok(None),
        };
        if !cursor_ext::at_eof(&cursor) {
            return Ok(None);
        }
        let mut fields = IndexMap::new();
        fields.insert("container_infos".to_string(), DocValue::Array(infos));
        Ok(Some(CustomValue { fields, unknown_bytes: None }))
    }

    fn encode(&self, value: &CustomValue, context: &HandlerContext) -> Result<Vec<u8>, Error> {
        let path = context.path;
        let infos = value
            .fields
            .get("container_infos")
            .ok_or_else(|| Error::from(SerializeError::struct_missing_field(path, "container_infos")))?
            .as_array(path)?;
        let mut out = Cursor::new(Vec::new());
        out.write_tarray(infos, write_container_info)?;
        Ok(out.into_inner())
    }
}

fn read_container_info(cursor: &mut Cursor<Vec<u8>>) -> Result<DocValue, Error> {
    let permission_type = cursor.read_u8()?;
    let container_id = cursor.read_guid()?;
    let mut entry = IndexMap::new();
    entry.insert("permission_type".to_string(), DocValue::UInt(permission_type as u64));
    entry.insert("container_id".to_string(), DocValue::String(container_id.to_dashed_lowercase()));
    Ok(DocValue::Object(entry))
}

fn write_container_info(cursor: &mut Cursor<Vec<u8>>, entry: &DocValue) -> Result<(), Error> {
    let path = "container_infos";
    cursor.write_u8(entry.field("permission_type", path)?.as_u64(path)? as u8)?;
    let container_id = Guid::parse_dashed(entry.field("container_id", path)?.as_str(path)?)
        .ok_or_else(|| SerializeError::invalid_value("bad container_id guid"))?;
    cursor.write_guid(&container_id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_container_references() {
        let handler = InventoryInfoHandler;
        let mut raw = Vec::new();
        raw.extend_from_slice(&1u32.to_le_bytes());
        raw.push(1);
        raw.extend_from_slice(&Guid::from_4_ints(9, 9, 9, 9).0);

        let context = HandlerContext {
            path: "worldSaveData.CharacterSaveParameterMap.Value.SaveParameter.ItemContainerInfos",
            discriminant: None,
        };
        let decoded = handler.decode(&raw, &context).unwrap().unwrap();
        let encoded = handler.encode(&decoded, &context).unwrap();
        assert_eq!(encoded, raw);
    }

    #[test]
    fn truncated_bytes_fall_back_to_raw() {
        let handler = InventoryInfoHandler;
        let context = HandlerContext {
            path: "worldSaveData.CharacterSaveParameterMap.Value.SaveParameter.ItemContainerInfos",
            discriminant: None,
        };
        assert!(handler.decode(&[1, 0, 0, 0, 1], &context).unwrap().is_none());
    }
}

//! `worldSaveData.CharacterSaveParameterMap.Value.RawData` (spec §4.E): a
//! player GUID, an instance GUID, and a permission-tribe byte, with
//! anything left over kept verbatim rather than decoded.
//!
//! Grounded on `palworld_save_tools.rawdata.character_container`.

use std::io::{Cursor, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;

use crate::cursor_ext::{self, ReadExt, WriteExt};
use crate::doc::DocValue;
use crate::error::{Error, SerializeError};
use crate::registry::{CustomPropertyHandler, CustomValue, HandlerContext};
use crate::types::Guid;

/// Decodes a character container's `RawData` into its player/instance GUIDs
/// and permission tribe id.
#[derive(Debug)]
pub struct CharacterContainerHandler;

impl CustomPropertyHandler for CharacterContainerHandler {
    fn decode(&self, raw: &[u8], _context: &HandlerContext) -> Result<Option<CustomValue>, Error> {
        if raw.is_empty() {
            return Ok(None);
        }
        let mut cursor = Cursor::new(raw.to_vec());
        let player_uid = cursor.read_guid()?;
        let instance_id = cursor.read_guid()?;
        let permission_tribe_id = cursor.read_u8()?;

        let mut fields = IndexMap::new();
        fields.insert("player_uid".to_string(), DocValue::String(player_uid.to_dashed_lowercase()));
        fields.insert("instance_id".to_string(), DocValue::String(instance_id.to_dashed_lowercase()));
        fields.insert("permission_tribe_id".to_string(), DocValue::UInt(permission_tribe_id as u64));

        let unknown_bytes = if cursor_ext::at_eof(&cursor) { None } else { Some(cursor_ext::read_to_end_vec(&mut cursor)?) };

        Ok(Some(CustomValue { fields, unknown_bytes }))
    }

    fn encode(&self, value: &CustomValue, context: &HandlerContext) -> Result<Vec<u8>, Error> {
        let path = context.path;
        let field = |name: &'static str| {
            value
                .fields
                .get(name)
                .ok_or_else(|| Error::from(SerializeError::struct_missing_field("CharacterContainer", name)))
        };
        let player_uid = Guid::parse_dashed(field("player_uid")?.as_str(path)?)
            .ok_or_else(|| SerializeError::invalid_value("bad player_uid guid"))?;
        let instance_id = Guid::parse_dashed(field("instance_id")?.as_str(path)?)
            .ok_or_else(|| SerializeError::invalid_value("bad instance_id guid"))?;
        let permission_tribe_id = field("permission_tribe_id")?.as_u64(path)? as u8;

        let mut out = Cursor::new(Vec::new());
        out.write_guid(&player_uid)?;
        out.write_guid(&instance_id)?;
        out.write_u8(permission_tribe_id)?;
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
        let handler = CharacterContainerHandler;
        let mut raw = Vec::new();
        raw.extend_from_slice(&Guid::from_4_ints(1, 2, 3, 4).0);
        raw.extend_from_slice(&Guid::from_4_ints(5, 6, 7, 8).0);
        raw.push(3);

        let context = HandlerContext { path: "worldSaveData.CharacterSaveParameterMap.Value.RawData", discriminant: None };
        let decoded = handler.decode(&raw, &context).unwrap().unwrap();
        assert_eq!(decoded.unknown_bytes, None);
        let encoded = handler.encode(&decoded, &context).unwrap();
        assert_eq!(encoded, raw);
    }

    #[test]
    fn round_trips_with_unknown_trailer() {
        let handler = CharacterContainerHandler;
        let mut raw = Vec::new();
        raw.extend_from_slice(&Guid::from_4_ints(1, 2, 3, 4).0);
        raw.extend_from_slice(&Guid::from_4_ints(5, 6, 7, 8).0);
        raw.push(3);
        raw.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);

        let context = HandlerContext { path: "worldSaveData.CharacterSaveParameterMap.Value.RawData", discriminant: None };
        let decoded = handler.decode(&raw, &context).unwrap().unwrap();
        assert_eq!(decoded.unknown_bytes, Some(vec![0xde, 0xad, 0xbe, 0xef]));
        let encoded = handler.encode(&decoded, &context).unwrap();
        assert_eq!(encoded, raw);
    }

    #[test]
    fn empty_input_falls_back_to_raw() {
        let handler = CharacterContainerHandler;
        let context = HandlerContext { path: "worldSaveData.CharacterSaveParameterMap.Value.RawData", discriminant: None };
        assert!(handler.decode(&[], &context).unwrap().is_none());
    }
}

//! `worldSaveData.GroupSaveDataMap.Value.RawData` (spec §4.E): guild/group
//! membership, dispatched on the group type carried by the enclosing map
//! entry's key, the same discriminant convention as
//! [`crate::handlers::base_camp_module`].
//!
//! Structural analogy to `palworld_save_tools.rawdata.base_camp_module`'s
//! per-discriminant dispatch; a guild's member list is built the way that
//! module builds its `tarray`-of-record fields.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;

use crate::cursor_ext::{self, ReadExt, WriteExt};
use crate::doc::DocValue;
use crate::error::{Error, SerializeError};
use crate::registry::{CustomPropertyHandler, CustomValue, HandlerContext};
use crate::types::Guid;

#[derive(Debug)]
pub struct GroupDataHandler;

impl CustomPropertyHandler for GroupDataHandler {
    fn decode(&self, raw: &[u8], context: &HandlerContext) -> Result<Option<CustomValue>, Error> {
        let Some(group_type) = context.discriminant else {
            return Ok(None);
        };
        if group_type != "EPalGroupType::Guild" && group_type != "EPalGroupType::Organization" {
            return Ok(None);
        }

        let mut cursor = Cursor::new(raw.to_vec());
        let group_id = cursor.read_guid()?;
        let guild_name = cursor.read_string()?;
        let members = match cursor.read_tarray(read_member) {
            Ok(members) => members,
            Err(_) => return Ok(None),
        };
        if !cursor_ext::at_eof(&cursor) {
            return Ok(None);
        }

        let mut fields = IndexMap::new();
        fields.insert("group_id".to_string(), DocValue::String(group_id.to_dashed_lowercase()));
        fields.insert("guild_name".to_string(), DocValue::String(guild_name));
        fields.insert("members".to_string(), DocValue::Array(members));
        Ok(Some(CustomValue { fields, unknown_bytes: None }))
    }

    fn encode(&self, value: &CustomValue, context: &HandlerContext) -> Result<Vec<u8>, Error> {
        let path = context.path;
        let group_id = Guid::parse_dashed(
            value
                .fields
                .get("group_id")
                .ok_or_else(|| Error::from(SerializeError::struct_missing_field(path, "group_id")))?
                .as_str(path)?,
        )
        .ok_or_else(|| SerializeError::invalid_value("bad group_id guid"))?;
        let guild_name = value
            .fields
            .get("guild_name")
            .ok_or_else(|| Error::from(SerializeError::struct_missing_field(path, "guild_name")))?
            .as_str(path)?;
        let members = value
            .fields
            .get("members")
            .ok_or_else(|| Error::from(SerializeError::struct_missing_field(path, "members")))?
            .as_array(path)?;

        let mut out = Cursor::new(Vec::new());
        out.write_guid(&group_id)?;
        out.write_string(guild_name)?;
        out.write_tarray(members, write_member)?;
        Ok(out.into_inner())
    }
}

fn read_member(cursor: &mut Cursor<Vec<u8>>) -> Result<DocValue, Error> {
    let player_uid = cursor.read_guid()?;
    let player_name = cursor.read_string()?;
    let mut entry = IndexMap::new();
    entry.insert("player_uid".to_string(), DocValue::String(player_uid.to_dashed_lowercase()));
    entry.insert("player_name".to_string(), DocValue::String(player_name));
    Ok(DocValue::Object(entry))
}

fn write_member(cursor: &mut Cursor<Vec<u8>>, entry: &DocValue) -> Result<(), Error> {
    let path = "members";
    let player_uid = Guid::parse_dashed(entry.field("player_uid", path)?.as_str(path)?)
        .ok_or_else(|| SerializeError::invalid_value("bad player_uid guid"))?;
    cursor.write_guid(&player_uid)?;
    cursor.write_string(entry.field("player_name", path)?.as_str(path)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_guild_with_members() {
        let handler = GroupDataHandler;
        let mut raw = Vec::new();
        raw.extend_from_slice(&Guid::from_4_ints(1, 1, 1, 1).0);
        raw.extend_from_slice(&6u32.to_le_bytes());
        raw.extend_from_slice(b"Guild");
        raw.push(0);
        raw.extend_from_slice(&1u32.to_le_bytes());
        raw.extend_from_slice(&Guid::from_4_ints(2, 2, 2, 2).0);
        raw.extend_from_slice(&4u32.to_le_bytes());
        raw.extend_from_slice(b"Pal");
        raw.push(0);

        let context = HandlerContext {
            path: "worldSaveData.GroupSaveDataMap.Value.RawData",
            discriminant: Some("EPalGroupType::Guild"),
        };
        let decoded = handler.decode(&raw, &context).unwrap().unwrap();
        let encoded = handler.encode(&decoded, &context).unwrap();
        assert_eq!(encoded, raw);
    }

    #[test]
    fn non_guild_group_type_falls_back_to_raw() {
        let handler = GroupDataHandler;
        let context = HandlerContext {
            path: "worldSaveData.GroupSaveDataMap.Value.RawData",
            discriminant: Some("EPalGroupType::IndependentGuild"),
        };
        assert!(handler.decode(&[1, 2, 3], &context).unwrap().is_none());
    }
}

//! `worldSaveData.BaseCampSaveData.Value.WorkerDirector.RawData` (spec
//! §4.E): a counted list of pal-to-work assignments, each naming the
//! assigned pal instance and the work type it's been put on.
//!
//! Structural analogy to the discriminant-driven, fixed-field records
//! grounded in `palworld_save_tools.rawdata.base_camp_module`.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;

use crate::cursor_ext::{self, ReadExt, WriteExt};
use crate::doc::DocValue;
use crate::error::{Error, SerializeError};
use crate::registry::{CustomPropertyHandler, CustomValue, HandlerContext};
use crate::types::Guid;

#[derive(Debug)]
pub struct WorkAssignmentHandler;

impl CustomPropertyHandler for WorkAssignmentHandler {
    fn decode(&self, raw: &[u8], _context: &HandlerContext) -> Result<Option<CustomValue>, Error> {
        let mut cursor = Cursor::new(raw.to_vec());
        let assignments = match cursor.read_tarray(read_assignment) {
            Ok(assignments) => assignments,
            Err(_) => return Ok(None),
        };
        if !cursor_ext::at_eof(&cursor) {
            return Ok(None);
        }
        let mut fields = IndexMap::new();
        fields.insert("assignments".to_string(), DocValue::Array(assignments));
        Ok(Some(CustomValue { fields, unknown_bytes: None }))
    }

    fn encode(&self, value: &CustomValue, context: &HandlerContext) -> Result<Vec<u8>, Error> {
        let path = context.path;
        let assignments = value
            .fields
            .get("assignments")
            .ok_or_else(|| Error::from(SerializeError::struct_missing_field(path, "assignments")))?
            .as_array(path)?;
        let mut out = Cursor::new(Vec::new());
        out.write_tarray(assignments, write_assignment)?;
        Ok(out.into_inner())
    }
}

fn read_assignment(cursor: &mut Cursor<Vec<u8>>) -> Result<DocValue, Error> {
    let assigned_pal_instance_id = cursor.read_guid()?;
    let work_type = cursor.read_u8()?;
    let progress_rate = cursor.read_f32::<LittleEndian>()?;
    let mut entry = IndexMap::new();
    entry.insert("assigned_pal_instance_id".to_string(), DocValue::String(assigned_pal_instance_id.to_dashed_lowercase()));
    entry.insert("work_type".to_string(), DocValue::UInt(work_type as u64));
    entry.insert("progress_rate".to_string(), DocValue::Float(progress_rate as f64));
    Ok(DocValue::Object(entry))
}

fn write_assignment(cursor: &mut Cursor<Vec<u8>>, entry: &DocValue) -> Result<(), Error> {
    let path = "assignments";
    let assigned_pal_instance_id = Guid::parse_dashed(entry.field("assigned_pal_instance_id", path)?.as_str(path)?)
        .ok_or_else(|| SerializeError::invalid_value("bad assigned_pal_instance_id guid"))?;
    cursor.write_guid(&assigned_pal_instance_id)?;
    cursor.write_u8(entry.field("work_type", path)?.as_u64(path)? as u8)?;
    cursor.write_f32::<LittleEndian>(entry.field("progress_rate", path)?.as_f64(path)? as f32)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_assignments() {
        let handler = WorkAssignmentHandler;
        let mut raw = Vec::new();
        raw.extend_from_slice(&1u32.to_le_bytes());
        raw.extend_from_slice(&Guid::from_4_ints(1, 2, 3, 4).0);
        raw.push(7);
        raw.extend_from_slice(&0.5f32.to_le_bytes());

        let context = HandlerContext { path: "worldSaveData.BaseCampSaveData.Value.WorkerDirector.RawData", discriminant: None };
        let decoded = handler.decode(&raw, &context).unwrap().unwrap();
        let encoded = handler.encode(&decoded, &context).unwrap();
        assert_eq!(encoded, raw);
    }

    #[test]
    fn truncated_bytes_fall_back_to_raw() {
        let handler = WorkAssignmentHandler;
        let context = HandlerContext { path: "worldSaveData.BaseCampSaveData.Value.WorkerDirector.RawData", discriminant: None };
        assert!(handler.decode(&[1, 0, 0, 0], &context).unwrap().is_none());
    }
}

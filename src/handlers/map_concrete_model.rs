//! `worldSaveData.MapObjectSaveData.ConcreteModel` (spec §4.E): the
//! in-world object catalog is large (the original tool keys several
//! hundred object ids to a few dozen payload shapes); this handler covers a
//! representative slice of those shapes and falls back to raw bytes for
//! everything else, same as the original does for object ids it doesn't
//! recognize.
//!
//! Grounded on `palworld_save_tools.rawdata.map_concrete_model`.

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;

use crate::cursor_ext::{self, ReadExt, WriteExt};
use crate::doc::DocValue;
use crate::error::{Error, SerializeError};
use crate::registry::{CustomPropertyHandler, CustomValue, HandlerContext};
use crate::types::Guid;

/// A representative slice of `MAP_OBJECT_NAME_TO_CONCRETE_MODEL_CLASS`,
/// mapping lowercased object ids to the shape that decodes their bytes.
const OBJECT_ID_TO_MODEL: &[(&str, &str)] = &[
    ("supplystoragemodel", "PalMapObjectSupplyStorageModel"),
    ("energystoragemodel", "PalMapObjectEnergyStorageModel"),
    ("deathdroppedcharactermodel", "PalMapObjectDeathDroppedCharacterModel"),
    ("pickupitemonlevelmodel", "PalMapObjectPickupItemOnLevelModel"),
    ("generateenergymodel", "PalMapObjectGenerateEnergyModel"),
    ("fasttravelpointmodel", "PalMapObjectFastTravelPointModel"),
    ("torchmodel", "PalMapObjectTorchModel"),
    ("treasureboxmodel", "PalMapObjectTreasureBoxModel"),
    ("basecamppointmodel", "PalMapObjectBaseCampPoint"),
];

/// Decodes a map object's `ConcreteModel` bytes for a representative subset
/// of object shapes, dispatching on the object id carried as the sibling
/// discriminant.
#[derive(Debug)]
pub struct MapConcreteModelHandler;

impl CustomPropertyHandler for MapConcreteModelHandler {
    fn decode(&self, raw: &[u8], context: &HandlerContext) -> Result<Option<CustomValue>, Error> {
        if raw.is_empty() {
            let mut fields = IndexMap::new();
            fields.insert("values".to_string(), DocValue::Array(Vec::new()));
            return Ok(Some(CustomValue { fields, unknown_bytes: None }));
        }
        let Some(object_id) = context.discriminant else {
            return Ok(None);
        };
        let object_id_lower = object_id.to_lowercase();
        let Some((_, model_type)) = OBJECT_ID_TO_MODEL.iter().find(|(id, _)| object_id_lower.contains(id)) else {
            return Ok(None);
        };

        let mut cursor = Cursor::new(raw.to_vec());
        let instance_id = cursor.read_guid()?;
        let model_instance_id = cursor.read_guid()?;

        let mut fields = IndexMap::new();
        fields.insert("instance_id".to_string(), DocValue::String(instance_id.to_dashed_lowercase()));
        fields.insert("model_instance_id".to_string(), DocValue::String(model_instance_id.to_dashed_lowercase()));
        fields.insert("concrete_model_type".to_string(), DocValue::String(model_type.to_string()));

        match *model_type {
            "PalMapObjectSupplyStorageModel" => {
                fields.insert("created_at_real_time".to_string(), DocValue::Int(cursor.read_i64::<LittleEndian>()?));
                fields.insert("trailing_bytes".to_string(), DocValue::Bytes(read_n(&mut cursor, 8)?));
            }
            "PalMapObjectEnergyStorageModel" => {
                fields.insert("stored_energy_amount".to_string(), DocValue::Float(cursor.read_f32::<LittleEndian>()? as f64));
                fields.insert("trailing_bytes".to_string(), DocValue::Bytes(read_n(&mut cursor, 8)?));
            }
            "PalMapObjectDeathDroppedCharacterModel" => {
                let stored_parameter_id = cursor.read_guid()?;
                let owner_player_uid = cursor.read_guid()?;
                fields.insert("stored_parameter_id".to_string(), DocValue::String(stored_parameter_id.to_dashed_lowercase()));
                fields.insert("owner_player_uid".to_string(), DocValue::String(owner_player_uid.to_dashed_lowercase()));
                if !cursor_ext::at_eof(&cursor) {
                    fields.insert("unknown_bytes".to_string(), DocValue::Bytes(cursor_ext::read_to_end_vec(&mut cursor)?));
                }
            }
            "PalMapObjectPickupItemOnLevelModel" => {
                fields.insert("auto_picked_up".to_string(), DocValue::Bool(cursor.read_u32::<LittleEndian>()? > 0));
            }
            "PalMapObjectGenerateEnergyModel" => {
                fields.insert(
                    "generate_energy_rate_by_worker".to_string(),
                    DocValue::Float(cursor.read_f32::<LittleEndian>()? as f64),
                );
                fields.insert("stored_energy_amount".to_string(), DocValue::Float(cursor.read_f32::<LittleEndian>()? as f64));
                fields.insert("consume_energy_speed".to_string(), DocValue::Float(cursor.read_f32::<LittleEndian>()? as f64));
            }
            "PalMapObjectFastTravelPointModel" => {
                let location_instance_id = cursor.read_guid()?;
                fields.insert("location_instance_id".to_string(), DocValue::String(location_instance_id.to_dashed_lowercase()));
                if !cursor_ext::at_eof(&cursor) {
                    fields.insert("unknown_bytes".to_string(), DocValue::Bytes(cursor_ext::read_to_end_vec(&mut cursor)?));
                }
            }
            "PalMapObjectTorchModel" => {
                fields.insert("ignition_minutes".to_string(), DocValue::Int(cursor.read_i32::<LittleEndian>()? as i64));
                fields.insert("extinction_date_time".to_string(), DocValue::Int(cursor.read_i64::<LittleEndian>()?));
                fields.insert("trailing_bytes".to_string(), DocValue::Bytes(read_n(&mut cursor, 4)?));
            }
            "PalMapObjectTreasureBoxModel" => {
                fields.insert("treasure_grade_type".to_string(), DocValue::UInt(cursor.read_u8()? as u64));
                fields.insert("treasure_special_type".to_string(), DocValue::UInt(cursor.read_u8()? as u64));
                fields.insert("opened".to_string(), DocValue::UInt(cursor.read_u8()? as u64));
                fields.insert("long_hold_interaction_duration".to_string(), DocValue::Float(cursor.read_f32::<LittleEndian>()? as f64));
                fields.insert("interact_player_action_type".to_string(), DocValue::UInt(cursor.read_u8()? as u64));
                fields.insert("is_lock_riding".to_string(), DocValue::UInt(cursor.read_u8()? as u64));
            }
            "PalMapObjectBaseCampPoint" => {
                let leading_bytes = read_n(&mut cursor, 4)?;
                let base_camp_id = cursor.read_guid()?;
                fields.insert("leading_bytes".to_string(), DocValue::Bytes(leading_bytes));
                fields.insert("base_camp_id".to_string(), DocValue::String(base_camp_id.to_dashed_lowercase()));
                fields.insert("trailing_bytes".to_string(), DocValue::Bytes(read_n(&mut cursor, 4)?));
            }
            _ => unreachable!("model_type was resolved from OBJECT_ID_TO_MODEL above"),
        }

        if !cursor_ext::at_eof(&cursor) {
            return Ok(None);
        }
        Ok(Some(CustomValue { fields, unknown_bytes: None }))
    }

    fn encode(&self, value: &CustomValue, context: &HandlerContext) -> Result<Vec<u8>, Error> {
        let path = context.path;
        if value.fields.is_empty() {
            return Ok(Vec::new());
        }
        let model_type = value.fields.get("concrete_model_type").ok_or_else(|| {
            Error::from(SerializeError::struct_missing_field(path, "concrete_model_type"))
        })?;
        let model_type = model_type.as_str(path)?;

        let field = |name: &str| value.fields.get(name).ok_or_else(|| Error::from(SerializeError::struct_missing_field(path, name)));
        let guid_field = |name: &str| -> Result<Guid, Error> {
            Guid::parse_dashed(field(name)?.as_str(path)?).ok_or_else(|| SerializeError::invalid_value(&format!("bad guid at {name}")))
        };

        let mut out = Cursor::new(Vec::new());
        out.write_guid(&guid_field("instance_id")?)?;
        out.write_guid(&guid_field("model_instance_id")?)?;

        match model_type {
            "PalMapObjectSupplyStorageModel" => {
                out.write_i64::<LittleEndian>(field("created_at_real_time")?.as_i64(path)?)?;
                out.write_all(&field("trailing_bytes")?.as_bytes(path)?)?;
            }
            "PalMapObjectEnergyStorageModel" => {
                out.write_f32::<LittleEndian>(field("stored_energy_amount")?.as_f64(path)? as f32)?;
                out.write_all(&field("trailing_bytes")?.as_bytes(path)?)?;
            }
            "PalMapObjectDeathDroppedCharacterModel" => {
                out.write_guid(&guid_field("stored_parameter_id")?)?;
                out.write_guid(&guid_field("owner_player_uid")?)?;
                if let Some(unknown) = value.fields.get("unknown_bytes") {
                    out.write_all(&unknown.as_bytes(path)?)?;
                }
            }
            "PalMapObjectPickupItemOnLevelModel" => {
                out.write_u32::<LittleEndian>(if field("auto_picked_up")?.as_bool(path)? { 1 } else { 0 })?;
            }
            "PalMapObjectGenerateEnergyModel" => {
                out.write_f32::<LittleEndian>(field("generate_energy_rate_by_worker")?.as_f64(path)? as f32)?;
                out.write_f32::<LittleEndian>(field("stored_energy_amount")?.as_f64(path)? as f32)?;
                out.write_f32::<LittleEndian>(field("consume_energy_speed")?.as_f64(path)? as f32)?;
            }
            "PalMapObjectFastTravelPointModel" => {
                out.write_guid(&guid_field("location_instance_id")?)?;
                if let Some(unknown) = value.fields.get("unknown_bytes") {
                    out.write_all(&unknown.as_bytes(path)?)?;
                }
            }
            "PalMapObjectTorchModel" => {
                out.write_i32::<LittleEndian>(field("ignition_minutes")?.as_i64(path)? as i32)?;
                out.write_i64::<LittleEndian>(field("extinction_date_time")?.as_i64(path)?)?;
                out.write_all(&field("trailing_bytes")?.as_bytes(path)?)?;
            }
            "PalMapObjectTreasureBoxModel" => {
                out.write_u8(field("treasure_grade_type")?.as_u64(path)? as u8)?;
                out.write_u8(field("treasure_special_type")?.as_u64(path)? as u8)?;
                out.write_u8(field("opened")?.as_u64(path)? as u8)?;
                out.write_f32::<LittleEndian>(field("long_hold_interaction_duration")?.as_f64(path)? as f32)?;
                out.write_u8(field("interact_player_action_type")?.as_u64(path)? as u8)?;
                out.write_u8(field("is_lock_riding")?.as_u64(path)? as u8)?;
            }
            "PalMapObjectBaseCampPoint" => {
                out.write_all(&field("leading_bytes")?.as_bytes(path)?)?;
                out.write_guid(&guid_field("base_camp_id")?)?;
                out.write_all(&field("trailing_bytes")?.as_bytes(path)?)?;
            }
            other => return Err(SerializeError::invalid_value(&format!("unsupported concrete model type {other}")).into()),
        }

        Ok(out.into_inner())
    }
}

fn read_n(cursor: &mut Cursor<Vec<u8>>, n: usize) -> Result<Vec<u8>, Error> {
    let mut buf = vec![0u8; n];
    cursor.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bytes_decode_to_empty_values() {
        let handler = MapConcreteModelHandler;
        let context = HandlerContext { path: "worldSaveData.MapObjectSaveData.ConcreteModel", discriminant: Some("torchmodel") };
        let decoded = handler.decode(&[], &context).unwrap().unwrap();
        assert_eq!(decoded.fields.get("values"), Some(&DocValue::Array(Vec::new())));
    }

    #[test]
    fn energy_storage_model_round_trips() {
        let handler = MapConcreteModelHandler;
        let mut raw = Vec::new();
        raw.extend_from_slice(&Guid::from_4_ints(1, 1, 1, 1).0);
        raw.extend_from_slice(&Guid::from_4_ints(2, 2, 2, 2).0);
        raw.extend_from_slice(&42.5f32.to_le_bytes());
        raw.extend_from_slice(&[0u8; 8]);

        let context = HandlerContext {
            path: "worldSaveData.MapObjectSaveData.ConcreteModel",
            discriminant: Some("EnemyCamp_EnergyStorageModel"),
        };
        let decoded = handler.decode(&raw, &context).unwrap().unwrap();
        assert_eq!(decoded.fields.get("concrete_model_type"), Some(&DocValue::String("PalMapObjectEnergyStorageModel".to_string())));
        let encoded = handler.encode(&decoded, &context).unwrap();
        assert_eq!(encoded, raw);
    }

    #[test]
    fn unrecognized_object_id_falls_back_to_raw() {
        let handler = MapConcreteModelHandler;
        let context = HandlerContext { path: "worldSaveData.MapObjectSaveData.ConcreteModel", discriminant: Some("some_unknown_object") };
        assert!(handler.decode(&[1, 2, 3, 4], &context).unwrap().is_none());
    }
}

//! Representative custom-property handlers (spec §4.E): each one owns a
//! dotted path registered in [`crate::registry::CustomPropertyRegistry`]
//! and reinterprets that property's raw bytes as a domain-specific shape.
//! Every handler falls back to `Ok(None)` on anything it doesn't recognize
//! so the caller keeps the raw bytes instead of failing the whole decode.

pub mod base_camp_module;
pub mod character_container;
pub mod dynamic_item;
pub mod group_data;
pub mod inventory_info;
pub mod item_container;
pub mod map_concrete_model;
pub mod work_assignment;

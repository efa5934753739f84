//! Type-hint and custom-property registries (spec §4.D): pure, read-only
//! metadata a caller constructs once and passes by reference into every
//! recursive property-codec call. No crate-level statics anywhere (spec §5,
//! §9 "Paths vs. module-level state").

use std::collections::HashMap;
use std::fmt::Debug;

use crate::doc::DocValue;
use crate::error::Error;

/// A dotted path pattern used to key both the type-hint and custom-property
/// tables. Segments are matched literally except `*` (match exactly one
/// segment) and `**` (match any number of trailing segments, including
/// zero). Matching is longest-specific-wins: among all patterns that match
/// a given path, the one with the fewest wildcard segments (and, as a
/// tiebreaker, the most segments overall) is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathPattern(Vec<String>);

impl PathPattern {
    /// Parses a dotted pattern string, e.g. `"worldSaveData.*.ModuleMap.**"`.
    pub fn parse(pattern: &str) -> Self {
        PathPattern(pattern.split('.').map(|s| s.to_string()).collect())
    }

    fn matches(&self, path_segments: &[&str]) -> bool {
        Self::matches_from(&self.0, path_segments)
    }

    fn matches_from(pattern: &[String], path: &[&str]) -> bool {
        match pattern.first() {
            None => path.is_empty(),
            Some(seg) if seg == "**" => {
                if pattern.len() == 1 {
                    return true;
                }
                // Try consuming zero-or-more path segments for the `**` wildcard.
                for skip in 0..=path.len() {
                    if Self::matches_from(&pattern[1..], &path[skip..]) {
                        return true;
                    }
                }
                false
            }
            Some(seg) => {
                let Some((head, rest)) = path.split_first() else {
                    return false;
                };
                let segment_matches = seg == "*" || seg == *head;
                segment_matches && Self::matches_from(&pattern[1..], rest)
            }
        }
    }

    /// A specificity score: fewer wildcard segments (and more total
    /// segments) wins when multiple patterns match the same path.
    fn specificity(&self) -> (usize, usize) {
        let wildcards = self.0.iter().filter(|s| *s == "*" || *s == "**").count();
        (usize::MAX - wildcards, self.0.len())
    }
}

fn best_match<'a, V>(
    table: &'a HashMap<PathPattern, V>,
    path_segments: &[&str],
) -> Option<&'a V> {
    table
        .iter()
        .filter(|(pattern, _)| pattern.matches(path_segments))
        .max_by_key(|(pattern, _)| pattern.specificity())
        .map(|(_, value)| value)
}

/// Out-of-band declarations of the struct/enum type name for a property
/// whose envelope alone doesn't disambiguate it (spec §4.C "Type-hint
/// consultation"). Keyed by dotted path pattern.
#[derive(Debug, Clone, Default)]
pub struct TypeHintRegistry {
    hints: HashMap<PathPattern, String>,
}

impl TypeHintRegistry {
    /// An empty registry: every path falls back to the generic decode.
    pub fn new() -> Self {
        TypeHintRegistry::default()
    }

    /// Registers a hint for a dotted path pattern.
    pub fn insert(&mut self, pattern: &str, type_name: &str) -> &mut Self {
        self.hints
            .insert(PathPattern::parse(pattern), type_name.to_string());
        self
    }

    /// Looks up the struct/enum type name hinted for a path, if any.
    pub fn lookup(&self, path_segments: &[&str]) -> Option<&str> {
        best_match(&self.hints, path_segments).map(|s| s.as_str())
    }

    /// Builds a registry seeded with the dotted paths known to require
    /// hints in real Palworld save files (recovered from the teacher's own
    /// `tests/common/palworld.rs` fixture — see DESIGN.md).
    ///
    /// Paths are dotted chains of property/field names only (spec §4.C
    /// "the path is maintained by appending each property name and each
    /// struct field name"; spec's own example is
    /// `.worldSaveData.BaseCampSaveData.Value.ModuleMap.Key`) — never the
    /// wire type name, which is exactly what this table's value already
    /// supplies.
    pub fn default_palworld_hints() -> Self {
        let mut registry = TypeHintRegistry::new();
        registry
            .insert("worldSaveData.CharacterSaveParameterMap.Key", "StructProperty")
            .insert("worldSaveData.CharacterSaveParameterMap.Value", "StructProperty")
            .insert("worldSaveData.MapObjectSaveData.ConcreteModel.ModuleMap.Value", "StructProperty")
            .insert("worldSaveData.FoliageGridSaveDataMap.Key", "StructProperty")
            .insert("worldSaveData.FoliageGridSaveDataMap.Value", "StructProperty")
            .insert("worldSaveData.FoliageGridSaveDataMap.Value.ModelMap.Value", "StructProperty")
            .insert(
                "worldSaveData.FoliageGridSaveDataMap.Value.ModelMap.Value.InstanceDataMap.Key",
                "StructProperty",
            )
            .insert(
                "worldSaveData.FoliageGridSaveDataMap.Value.ModelMap.Value.InstanceDataMap.Value",
                "StructProperty",
            )
            .insert("worldSaveData.MapObjectSpawnerInStageSaveData.Key", "StructProperty")
            .insert("worldSaveData.MapObjectSpawnerInStageSaveData.Value", "StructProperty")
            .insert(
                "worldSaveData.MapObjectSpawnerInStageSaveData.Value.SpawnerDataMapByLevelObjectInstanceId.Key",
                "Guid",
            )
            .insert(
                "worldSaveData.MapObjectSpawnerInStageSaveData.Value.SpawnerDataMapByLevelObjectInstanceId.Value",
                "StructProperty",
            )
            .insert(
                "worldSaveData.MapObjectSpawnerInStageSaveData.Value.SpawnerDataMapByLevelObjectInstanceId.Value.ItemMap.Value",
                "StructProperty",
            )
            .insert("worldSaveData.BaseCampSaveData.Key", "Guid")
            .insert("worldSaveData.BaseCampSaveData.Value", "StructProperty")
            .insert("worldSaveData.BaseCampSaveData.Value.ModuleMap.Value", "StructProperty")
            .insert("worldSaveData.ItemContainerSaveData.Key", "StructProperty")
            .insert("worldSaveData.ItemContainerSaveData.Value", "StructProperty")
            .insert("worldSaveData.CharacterContainerSaveData.Key", "StructProperty")
            .insert("worldSaveData.CharacterContainerSaveData.Value", "StructProperty")
            .insert("worldSaveData.GroupSaveDataMap.Key", "Guid")
            .insert("worldSaveData.GroupSaveDataMap.Value", "StructProperty")
            .insert("worldSaveData.EnemyCampSaveData.EnemyCampStatusMap.Value", "StructProperty");
        registry
    }
}

/// The result a [`CustomPropertyHandler`] produces when it decodes a raw
/// byte payload into a domain-specific value (spec §4.E). This lives at the
/// DOC layer (component H), not the property-tree layer: a handler is
/// applied while lowering a byte-blob-shaped property (typically a `TArray`
/// of bytes such as `RawData`) into its DOC representation, and again in
/// reverse while lifting a DOC tree back into raw bytes before
/// re-serializing the enclosing property.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomValue {
    /// The decoded fields, keyed the same way a struct's fields would be,
    /// so the DOC layer can embed them as a nested object.
    pub fields: indexmap::IndexMap<String, DocValue>,
    /// Bytes left over after decode, when the handler could not fully
    /// interpret its input (spec §4.E "must consume all bytes or return an
    /// unknown_bytes remainder").
    pub unknown_bytes: Option<Vec<u8>>,
}

/// Everything a [`CustomPropertyHandler`] can see beyond its raw byte
/// payload: the dotted path it was reached at, and — for a handler hung off
/// a `MapProperty` entry's value — the sibling discriminant carried by that
/// entry's key (a module type, an object id, …), since the handler is never
/// handed the key itself (spec §4.E).
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    /// The dotted path the handler was matched at.
    pub path: &'a str,
    /// The enclosing map entry's key, rendered as a string, when one is in
    /// scope. `None` outside of a map value or when the key has no sensible
    /// string form.
    pub discriminant: Option<&'a str>,
}

/// One registered sub-format decoder/encoder pair (spec §4.E). Implementors
/// must be pure functions of their inputs and hold no mutable state.
pub trait CustomPropertyHandler: Debug + Send + Sync {
    /// Decodes a raw byte payload into a [`CustomValue`]. Must not panic on
    /// malformed input — fall back to `Ok(None)` so the caller retains the
    /// raw bytes instead (spec §7 "Handler fallback (non-fatal)").
    fn decode(&self, raw: &[u8], context: &HandlerContext) -> Result<Option<CustomValue>, Error>;

    /// Re-encodes a [`CustomValue`] produced by [`Self::decode`] back into
    /// the exact byte sequence that was consumed.
    fn encode(&self, value: &CustomValue, context: &HandlerContext) -> Result<Vec<u8>, Error>;
}

/// Path-matched table of [`CustomPropertyHandler`]s (spec §4.D). Pure
/// metadata; owns no mutable state, so it is `Send + Sync` for free and can
/// be shared across concurrent conversions without synchronization.
#[derive(Default)]
pub struct CustomPropertyRegistry {
    handlers: HashMap<PathPattern, Box<dyn CustomPropertyHandler>>,
}

impl Debug for CustomPropertyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomPropertyRegistry")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl CustomPropertyRegistry {
    /// An empty registry: no property gets custom handling.
    pub fn new() -> Self {
        CustomPropertyRegistry::default()
    }

    /// Registers a handler for a dotted path pattern.
    pub fn insert(&mut self, pattern: &str, handler: Box<dyn CustomPropertyHandler>) -> &mut Self {
        self.handlers.insert(PathPattern::parse(pattern), handler);
        self
    }

    /// Looks up the handler registered for a path, if any.
    pub fn lookup(&self, path_segments: &[&str]) -> Option<&dyn CustomPropertyHandler> {
        best_match(&self.handlers, path_segments).map(|b| b.as_ref())
    }

    /// Builds a registry seeded with the representative Palworld custom
    /// property handlers from spec §4.E / `handlers::*`.
    pub fn default_palworld_handlers() -> Self {
        let mut registry = CustomPropertyRegistry::new();
        registry
            .insert(
                "worldSaveData.CharacterSaveParameterMap.Value.RawData",
                Box::new(crate::handlers::character_container::CharacterContainerHandler),
            )
            .insert(
                "worldSaveData.BaseCampSaveData.Value.ModuleMap.Value.RawData",
                Box::new(crate::handlers::base_camp_module::BaseCampModuleMapHandler),
            )
            .insert(
                "worldSaveData.MapObjectSaveData.ConcreteModel",
                Box::new(crate::handlers::map_concrete_model::MapConcreteModelHandler),
            )
            .insert(
                "worldSaveData.ItemContainerSaveData.Value.Slots",
                Box::new(crate::handlers::item_container::ItemContainerSlotsHandler),
            )
            .insert(
                "worldSaveData.GroupSaveDataMap.Value.RawData",
                Box::new(crate::handlers::group_data::GroupDataHandler),
            )
            .insert(
                "worldSaveData.CharacterSaveParameterMap.Value.SaveParameter.ItemContainerInfos",
                Box::new(crate::handlers::inventory_info::InventoryInfoHandler),
            )
            .insert(
                "worldSaveData.BaseCampSaveData.Value.WorkerDirector.RawData",
                Box::new(crate::handlers::work_assignment::WorkAssignmentHandler),
            )
            .insert(
                "worldSaveData.DynamicItemSaveData.RawData",
                Box::new(crate::handlers::dynamic_item::DynamicItemHandler),
            );
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_pattern_matches_exact_path() {
        let pattern = PathPattern::parse("a.b.c");
        assert!(pattern.matches(&["a", "b", "c"]));
        assert!(!pattern.matches(&["a", "b"]));
        assert!(!pattern.matches(&["a", "b", "c", "d"]));
    }

    #[test]
    fn single_star_matches_one_segment() {
        let pattern = PathPattern::parse("a.*.c");
        assert!(pattern.matches(&["a", "anything", "c"]));
        assert!(!pattern.matches(&["a", "c"]));
    }

    #[test]
    fn double_star_matches_any_suffix() {
        let pattern = PathPattern::parse("a.**");
        assert!(pattern.matches(&["a"]));
        assert!(pattern.matches(&["a", "b"]));
        assert!(pattern.matches(&["a", "b", "c"]));
        assert!(!pattern.matches(&["x"]));
    }

    #[test]
    fn longest_specific_wins() {
        let mut hints = TypeHintRegistry::new();
        hints.insert("a.**", "Generic");
        hints.insert("a.b.c", "Specific");
        assert_eq!(hints.lookup(&["a", "b", "c"]), Some("Specific"));
        assert_eq!(hints.lookup(&["a", "b", "d"]), Some("Generic"));
    }
}

//! Round-trips a hand-built [`GvasFile`] through `serde_json`, and through
//! the DOC lowering/lifting pipeline, checking both agree with the typed
//! graph they started from (spec §8 "DOC round-trip").

use indexmap::IndexMap;
use palgvas::doc::DocOptions;
use palgvas::engine_version::FEngineVersion;
use palgvas::game_version::DeserializedGameVersion;
use palgvas::properties::int_property::{BoolProperty, FloatProperty, IntProperty};
use palgvas::properties::map_property::MapProperty;
use palgvas::properties::name_property::NameProperty;
use palgvas::properties::str_property::StrProperty;
use palgvas::properties::Property;
use palgvas::registry::{CustomPropertyRegistry, TypeHintRegistry};
use palgvas::types::Guid;
use palgvas::{GvasFile, GvasHeader};

fn sample_file() -> GvasFile {
    let mut custom_versions = IndexMap::new();
    custom_versions.insert(Guid::from_4_ints(1, 2, 3, 4), 17u32);

    let header = GvasHeader::Version2 {
        package_file_version: 0x205,
        engine_version: FEngineVersion::new(4, 27, 2, 0, String::new()),
        custom_version_format: 3,
        custom_versions,
        save_game_class_name: "/Script/Example.ExampleSaveGame".to_string(),
    };

    let mut properties = IndexMap::new();
    properties.insert("Level".to_string(), Property::Int(IntProperty::new(42)));
    properties.insert("Nickname".to_string(), Property::Str(StrProperty::new(Some("Boss".to_string()))));
    properties.insert("IsAlive".to_string(), Property::Bool(BoolProperty::new(true)));
    properties.insert("Health".to_string(), Property::Float(FloatProperty::new(12.5)));

    // A map with a deliberately non-alphabetical entry order, since entry
    // order is load-bearing (spec §3 "Ordering").
    let mut map_value = Vec::new();
    map_value.push((
        Property::Name(NameProperty::new("b".to_string())),
        Property::Int(IntProperty::new(2)),
    ));
    map_value.push((
        Property::Name(NameProperty::new("a".to_string())),
        Property::Int(IntProperty::new(1)),
    ));
    map_value.push((
        Property::Name(NameProperty::new("c".to_string())),
        Property::Int(IntProperty::new(3)),
    ));
    properties.insert(
        "Scores".to_string(),
        Property::Map(Box::new(MapProperty::new("NameProperty".to_string(), "IntProperty".to_string(), map_value))),
    );

    GvasFile {
        deserialized_game_version: DeserializedGameVersion::Default,
        header,
        properties,
    }
}

#[test]
fn gvas_file_serde_round_trips() {
    let file = sample_file();
    let json = serde_json::to_string(&file).expect("serialize");
    let from_json: GvasFile = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(file, from_json);
}

#[test]
fn doc_round_trip_preserves_map_entry_order() {
    let file = sample_file();
    let hints = TypeHintRegistry::new();
    let custom_properties = CustomPropertyRegistry::new();
    let doc_options = DocOptions { custom_properties: &custom_properties, nonfinite_to_null: false };

    let doc = file.to_doc(&doc_options).expect("lower to doc");
    let lifted = GvasFile::from_doc(&doc, &hints, &doc_options).expect("lift from doc");

    assert_eq!(lifted.header, file.header);
    assert_eq!(lifted.properties, file.properties);

    let Property::Map(scores) = &lifted.properties["Scores"] else {
        panic!("expected Scores to lift back into a MapProperty");
    };
    let keys: Vec<&str> = scores
        .entries
        .iter()
        .map(|(k, _)| match k {
            Property::Name(n) => n.value.as_str(),
            _ => panic!("expected Name keys"),
        })
        .collect();
    assert_eq!(keys, vec!["b", "a", "c"]);
}

#[test]
fn doc_json_text_round_trips_through_serde_json() {
    // The DOC tree itself carries no serde impl by design (spec §1 keeps
    // the text serializer out of scope); exercise the documented contract
    // through the crate's own serde feature on the typed graph instead,
    // confirming a JSON value produced from one `GvasFile` deserializes
    // back into an equal one after a text round trip through `serde_json`.
    let file = sample_file();
    let json = serde_json::to_string_pretty(&file).expect("serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("parse json");
    let text = serde_json::to_string(&value).expect("re-serialize");
    let from_text: GvasFile = serde_json::from_str(&text).expect("deserialize from re-emitted text");
    assert_eq!(file, from_text);
}

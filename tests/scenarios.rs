//! The seed test suite from the spec's testable-properties section: a
//! minimal GVAS built by hand, run through the full SAV ⇄ GVAS ⇄ DOC
//! pipeline, checking round-trip fidelity, order preservation, unknown-type
//! fallback, and container-format detection. No binary fixtures are used —
//! every input is synthesized in Rust, the way a library with no checked-in
//! save files has to.

use std::io::Cursor;

use indexmap::IndexMap;
use palgvas::doc::DocOptions;
use palgvas::engine_version::FEngineVersion;
use palgvas::error::Error;
use palgvas::game_version::{DeserializedGameVersion, GameVersion, PalworldCompressionType};
use palgvas::properties::int_property::IntProperty;
use palgvas::properties::map_property::MapProperty;
use palgvas::properties::name_property::NameProperty;
use palgvas::properties::struct_property::StructProperty;
use palgvas::properties::Property;
use palgvas::registry::{CustomPropertyRegistry, TypeHintRegistry};
use palgvas::types::Guid;
use palgvas::{GvasFile, GvasHeader};

fn minimal_header() -> GvasHeader {
    GvasHeader::Version2 {
        package_file_version: 0x205,
        engine_version: FEngineVersion::new(4, 27, 2, 0, String::new()),
        custom_version_format: 3,
        custom_versions: IndexMap::new(),
        save_game_class_name: "/Script/Example.ExampleSaveGame".to_string(),
    }
}

/// S1: a minimal GVAS with header + a single `IntProperty("A", 42)` +
/// sentinel + trailer, wrapped in a single-pass zlib `PlZ`/`0x31` container.
#[test]
fn s1_single_int_property_zlib_once() {
    let mut properties = IndexMap::new();
    properties.insert("A".to_string(), Property::Int(IntProperty::new(42)));

    let file = GvasFile {
        deserialized_game_version: DeserializedGameVersion::Palworld(PalworldCompressionType::Zlib),
        header: minimal_header(),
        properties,
    };

    let mut sav = Vec::new();
    file.write(&mut sav).expect("write sav");
    // `PlZ` magic followed by the 0x31 single-pass save type tag.
    assert_eq!(&sav[8..11], b"PlZ");
    assert_eq!(sav[11], 0x31);

    let decoded = GvasFile::read(&mut Cursor::new(sav), GameVersion::Palworld).expect("read sav");
    assert_eq!(decoded.properties, file.properties);
    match decoded.properties["A"] {
        Property::Int(IntProperty { value: 42 }) => {}
        ref other => panic!("unexpected value {other:?}"),
    }
}

/// S2: the same plaintext double-zlib-wrapped with save_type `0x32`.
#[test]
fn s2_double_zlib_round_trips_to_the_same_plaintext() {
    let mut properties = IndexMap::new();
    properties.insert("A".to_string(), Property::Int(IntProperty::new(42)));

    let file = GvasFile {
        deserialized_game_version: DeserializedGameVersion::Palworld(PalworldCompressionType::ZlibTwice),
        header: minimal_header(),
        properties,
    };

    let mut sav = Vec::new();
    file.write(&mut sav).expect("write sav");
    assert_eq!(&sav[8..11], b"PlZ");
    assert_eq!(sav[11], 0x32);

    let decoded = GvasFile::read(&mut Cursor::new(sav), GameVersion::Palworld).expect("read sav");
    assert_eq!(decoded.properties, file.properties);
    assert_eq!(decoded.deserialized_game_version, DeserializedGameVersion::Palworld(PalworldCompressionType::ZlibTwice));
}

/// S3: a `MapProperty<Name, Int>` with entries inserted as `{b, a, c}`
/// keeps that exact order after a full SAV round trip.
#[test]
fn s3_map_property_preserves_insertion_order() {
    let entries = vec![
        (Property::Name(NameProperty::new("b")), Property::Int(IntProperty::new(2))),
        (Property::Name(NameProperty::new("a")), Property::Int(IntProperty::new(1))),
        (Property::Name(NameProperty::new("c")), Property::Int(IntProperty::new(3))),
    ];
    let mut properties = IndexMap::new();
    properties.insert(
        "Scores".to_string(),
        Property::Map(Box::new(MapProperty::new("NameProperty", "IntProperty", entries))),
    );

    let file = GvasFile {
        deserialized_game_version: DeserializedGameVersion::Default,
        header: minimal_header(),
        properties,
    };

    let mut bytes = Vec::new();
    file.write(&mut bytes).expect("write gvas");
    let decoded = GvasFile::read(&mut Cursor::new(bytes), GameVersion::Default).expect("read gvas");

    let Property::Map(scores) = &decoded.properties["Scores"] else {
        panic!("expected a MapProperty");
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

/// S4: a `StructProperty` whose `struct_type` isn't one of the fixed
/// built-ins falls back to a nested property list, and its re-encoded
/// `size` matches the original payload length exactly.
#[test]
fn s4_unknown_struct_type_falls_back_to_nested_properties() {
    let mut inner = IndexMap::new();
    inner.insert("Level".to_string(), Property::Int(IntProperty::new(7)));
    inner.insert("Nickname".to_string(), Property::Name(NameProperty::new("Boss")));

    let mut properties = IndexMap::new();
    properties.insert(
        "PlayerData".to_string(),
        Property::Struct(Box::new(StructProperty::new_custom("PalPlayerSaveData", Guid::ZERO, inner))),
    );

    let file = GvasFile {
        deserialized_game_version: DeserializedGameVersion::Default,
        header: minimal_header(),
        properties,
    };

    let mut bytes = Vec::new();
    file.write(&mut bytes).expect("write gvas");
    let decoded = GvasFile::read(&mut Cursor::new(bytes.clone()), GameVersion::Default).expect("read gvas");
    assert_eq!(decoded.properties, file.properties);

    // Re-encoding the decoded graph reproduces the exact same bytes —
    // the `size` field recomputed for the fallback nested list matches.
    let mut re_encoded = Vec::new();
    decoded.write(&mut re_encoded).expect("re-write gvas");
    assert_eq!(re_encoded, bytes);
}

/// S7: container detection rejects unknown magic and unsupported save
/// types rather than silently misparsing.
#[test]
fn s7_rejects_unknown_magic_and_save_type() {
    let mut bad_magic = Vec::new();
    bad_magic.extend_from_slice(&0u32.to_le_bytes()); // uncompressed_len
    bad_magic.extend_from_slice(&0u32.to_le_bytes()); // compressed_len
    bad_magic.extend_from_slice(b"XYZ");
    bad_magic.push(0x31);

    let err = GvasFile::read(&mut Cursor::new(bad_magic), GameVersion::Palworld).unwrap_err();
    assert!(matches!(err, Error::Container(palgvas::error::ContainerError::UnknownContainerFormat(m)) if &m == b"XYZ"));

    let mut bad_save_type = Vec::new();
    bad_save_type.extend_from_slice(&0u32.to_le_bytes());
    bad_save_type.extend_from_slice(&0u32.to_le_bytes());
    bad_save_type.extend_from_slice(b"PlZ");
    bad_save_type.push(0x05);

    let err = GvasFile::read(&mut Cursor::new(bad_save_type), GameVersion::Palworld).unwrap_err();
    assert!(matches!(err, Error::Container(palgvas::error::ContainerError::UnsupportedSaveType(0x05, m)) if &m == b"PlZ"));
}

/// DOC round trip (testable property 2): lowering then lifting a decoded
/// file reproduces the exact same typed graph, and re-encoding that lifted
/// graph reproduces the exact same SAV bytes.
#[test]
fn doc_round_trip_reproduces_original_sav_bytes() {
    let mut properties = IndexMap::new();
    properties.insert("A".to_string(), Property::Int(IntProperty::new(42)));
    properties.insert("Name".to_string(), Property::Name(NameProperty::new("Rex")));

    let file = GvasFile {
        deserialized_game_version: DeserializedGameVersion::Palworld(PalworldCompressionType::Zlib),
        header: minimal_header(),
        properties,
    };

    let mut sav = Vec::new();
    file.write(&mut sav).expect("write sav");

    let decoded = GvasFile::read(&mut Cursor::new(sav.clone()), GameVersion::Palworld).expect("read sav");

    let custom_properties = CustomPropertyRegistry::new();
    let doc_options = DocOptions { custom_properties: &custom_properties, nonfinite_to_null: false };
    let doc = decoded.to_doc(&doc_options).expect("lower to doc");

    let hints = TypeHintRegistry::new();
    let mut lifted = GvasFile::from_doc(&doc, &hints, &doc_options).expect("lift from doc");
    lifted.deserialized_game_version = decoded.deserialized_game_version;

    let mut re_encoded = Vec::new();
    lifted.write(&mut re_encoded).expect("re-write sav");
    assert_eq!(re_encoded, sav);
}

/// Idempotence of decode: decoding a re-encoded file produces a
/// structurally equal typed graph to decoding the original.
#[test]
fn decode_is_idempotent_across_a_round_trip() {
    let mut properties = IndexMap::new();
    properties.insert("A".to_string(), Property::Int(IntProperty::new(1)));
    properties.insert("B".to_string(), Property::Int(IntProperty::new(2)));

    let file = GvasFile {
        deserialized_game_version: DeserializedGameVersion::Default,
        header: minimal_header(),
        properties,
    };

    let mut first = Vec::new();
    file.write(&mut first).expect("write 1");
    let decoded_once = GvasFile::read(&mut Cursor::new(first), GameVersion::Default).expect("read 1");

    let mut second = Vec::new();
    decoded_once.write(&mut second).expect("write 2");
    let decoded_twice = GvasFile::read(&mut Cursor::new(second), GameVersion::Default).expect("read 2");

    assert_eq!(decoded_once.properties, decoded_twice.properties);
    assert_eq!(decoded_once.header, decoded_twice.header);
}

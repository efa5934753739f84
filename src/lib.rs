#![warn(clippy::expect_used, clippy::panic, clippy::unwrap_used)]
#![warn(missing_docs)]

//! palgvas
//!
//! A bidirectional converter between a compressed game save container
//! (SAV), the Unreal-style property-graph binary it wraps (GVAS), and a
//! language-neutral structured document (DOC) — built around Palworld's
//! save format as the primary target.
//!
//! # Examples
//!
//! ```no_run
//! use palgvas::{error::Error, GvasFile};
//! use std::fs::File;
//! use palgvas::game_version::GameVersion;
//!
//! let mut file = File::open("save.sav")?;
//! let gvas_file = GvasFile::read(&mut file, GameVersion::Default);
//!
//! println!("{:#?}", gvas_file);
//! # Ok::<(), Error>(())
//! ```
//!
//! ## Hints
//!
//! If your file fails while parsing with a [`error::DeserializeError::MissingHint`] error you
//! need hints. When a struct is stored inside `ArrayProperty`/`SetProperty`/`MapProperty` the
//! wire format does not carry a type annotation for it, so the codec must be told the type
//! beforehand via the [`registry::TypeHintRegistry`].
//!
//! ```no_run
//! use palgvas::{error::Error, GvasFile};
//! use palgvas::registry::TypeHintRegistry;
//! use std::fs::File;
//! use palgvas::game_version::GameVersion;
//!
//! let mut file = File::open("save.sav")?;
//!
//! let mut hints = TypeHintRegistry::new();
//! hints.insert("UnLockedMissionParameters.MapProperty.Key.StructProperty", "Guid");
//!
//! let gvas_file = GvasFile::read_with_hints(&mut file, GameVersion::Default, &hints);
//!
//! println!("{:#?}", gvas_file);
//! # Ok::<(), Error>(())
//! ```

/// SAV container framing.
pub mod container;
/// Compression codec adapters.
pub mod codecs;
/// Extensions for `Cursor`.
pub mod cursor_ext;
/// Custom version information.
pub mod custom_version;
/// DOC lowering/lifting.
pub mod doc;
/// Engine version information.
pub mod engine_version;
/// Error types.
pub mod error;
/// Game version enumeration.
pub mod game_version;
/// Representative custom-property handlers.
pub mod handlers;
/// Object version information.
pub mod object_version;
/// Extensions for `Ord`.
mod ord_ext;
/// Property types.
pub mod properties;
/// Type-hint and custom-property registries.
pub mod registry;
/// Savegame version information.
pub mod savegame_version;
pub(crate) mod scoped_stack_entry;
/// Various types.
pub mod types;

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use indexmap::IndexMap;

use crate::doc::{DocOptions, DocValue};
use crate::error::DeserializeError;
use crate::game_version::{DeserializedGameVersion, GameVersion, PalworldCompressionType};
use cursor_ext::{ReadExt, WriteExt};
use custom_version::FCustomVersion;
use engine_version::FEngineVersion;
use error::Error;
use object_version::EUnrealEngineObjectUE5Version;
use ord_ext::OrdExt;
use properties::{Property, PropertyOptions};
use registry::TypeHintRegistry;
use savegame_version::SaveGameVersion;
use types::Guid;

/// The four bytes 'GVAS' appear at the beginning of every GVAS file.
pub const FILE_TYPE_GVAS: u32 = u32::from_le_bytes([b'G', b'V', b'A', b'S']);

/// Save class name substrings that select double-zlib (`0x32`) compression
/// on write when no prior compression choice is known (spec §4.F "choose
/// `PlM`... else `PlZ`"; this crate never writes Oodle, so the two `PlZ`
/// variants stand in for that choice — see DESIGN.md for the resolved Open
/// Question). Grounded on
/// `palworld_save_tools.commands.convert`'s class-name substring check.
const DOUBLE_ZLIB_CLASS_NAME_SENTINELS: &[&str] = &["Pal.PalWorldSaveGame", "Pal.PalLocalWorldSaveGame"];

/// Picks the default compression a freshly built Palworld save should use,
/// based on a substring match against its `save_game_class_name` (spec
/// §4.F). Only consulted when constructing a file with no prior
/// [`DeserializedGameVersion`] to preserve — see
/// [`GvasFile::write`], which otherwise always reproduces the compression
/// variant the file was read with.
pub fn default_compression_for_class_name(save_game_class_name: &str) -> PalworldCompressionType {
    if DOUBLE_ZLIB_CLASS_NAME_SENTINELS.iter().any(|s| save_game_class_name.contains(s)) {
        PalworldCompressionType::ZlibTwice
    } else {
        PalworldCompressionType::Zlib
    }
}

/// Stores information about GVAS file, engine version, etc.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum GvasHeader {
    /// Version 2
    Version2 {
        /// File format version.
        package_file_version: u32,
        /// Unreal Engine version.
        engine_version: FEngineVersion,
        /// Custom version format.
        custom_version_format: u32,
        /// Custom versions.
        custom_versions: IndexMap<Guid, u32>,
        /// Save game class name.
        save_game_class_name: String,
    },
    /// Version 3
    Version3 {
        /// File format version (UE4).
        package_file_version: u32,
        /// File format version (UE5).
        package_file_version_ue5: u32,
        /// Unreal Engine version.
        engine_version: FEngineVersion,
        /// Custom version format.
        custom_version_format: u32,
        /// Custom versions.
        custom_versions: IndexMap<Guid, u32>,
        /// Save game class name.
        save_game_class_name: String,
    },
}

impl GvasHeader {
    /// Read GvasHeader from a binary file
    ///
    /// # Errors
    ///
    /// If this function reads an invalid header it returns [`Error`]
    pub fn read<R: Read + Seek>(cursor: &mut R) -> Result<Self, Error> {
        let file_type_tag = cursor.read_u32::<LittleEndian>()?;
        if file_type_tag != FILE_TYPE_GVAS {
            Err(DeserializeError::InvalidHeader(
                format!("File type {file_type_tag} not recognized").into_boxed_str(),
            ))?
        }

        let save_game_file_version = cursor.read_u32::<LittleEndian>()?;
        if !save_game_file_version.between(
            SaveGameVersion::AddedCustomVersions as u32,
            SaveGameVersion::PackageFileSummaryVersionChange as u32,
        ) {
            Err(DeserializeError::InvalidHeader(
                format!("GVAS version {save_game_file_version} not supported").into_boxed_str(),
            ))?
        }

        let package_file_version = cursor.read_u32::<LittleEndian>()?;
        if !package_file_version.between(0x205, 0x20D) {
            Err(DeserializeError::InvalidHeader(
                format!("Package file version {package_file_version} not supported").into_boxed_str(),
            ))?
        }
        if package_file_version != 0x205 {
            log::debug!("package file version {package_file_version:#x} is in the supported range but not the common 0x205");
        }

        // This field is only present in the v3 header
        let package_file_version_ue5 = if save_game_file_version >= SaveGameVersion::PackageFileSummaryVersionChange as u32 {
            let version = cursor.read_u32::<LittleEndian>()?;
            if !version.between(
                EUnrealEngineObjectUE5Version::InitialVersion as u32,
                EUnrealEngineObjectUE5Version::DataResources as u32,
            ) {
                Err(DeserializeError::InvalidHeader(
                    format!("UE5 Package file version {version} is not supported").into_boxed_str(),
                ))?
            }
            Some(version)
        } else {
            None
        };

        let engine_version = FEngineVersion::read(cursor)?;
        let custom_version_format = cursor.read_u32::<LittleEndian>()?;
        if custom_version_format != 3 {
            Err(DeserializeError::InvalidHeader(
                format!("Custom version format {custom_version_format} not supported").into_boxed_str(),
            ))?
        }

        let custom_versions_len = cursor.read_u32::<LittleEndian>()?;
        let mut custom_versions = IndexMap::new();
        for _ in 0..custom_versions_len {
            let FCustomVersion { key, version } = FCustomVersion::read(cursor)?;
            custom_versions.insert(key, version);
        }

        let save_game_class_name = cursor.read_string()?;

        Ok(match package_file_version_ue5 {
            None => GvasHeader::Version2 { package_file_version, engine_version, custom_version_format, custom_versions, save_game_class_name },
            Some(package_file_version_ue5) => GvasHeader::Version3 {
                package_file_version,
                package_file_version_ue5,
                engine_version,
                custom_version_format,
                custom_versions,
                save_game_class_name,
            },
        })
    }

    /// Write GvasHeader to a binary file
    pub fn write<W: Write>(&self, cursor: &mut W) -> Result<usize, Error> {
        cursor.write_u32::<LittleEndian>(FILE_TYPE_GVAS)?;
        match self {
            GvasHeader::Version2 { package_file_version, engine_version, custom_version_format, custom_versions, save_game_class_name } => {
                let mut len = 20;
                cursor.write_u32::<LittleEndian>(2)?;
                cursor.write_u32::<LittleEndian>(*package_file_version)?;
                len += engine_version.write(cursor)?;
                cursor.write_u32::<LittleEndian>(*custom_version_format)?;
                cursor.write_u32::<LittleEndian>(custom_versions.len() as u32)?;
                for (&key, &version) in custom_versions {
                    len += FCustomVersion::new(key, version).write(cursor)?;
                }
                len += cursor.write_string(save_game_class_name)?;
                Ok(len)
            }
            GvasHeader::Version3 {
                package_file_version,
                package_file_version_ue5,
                engine_version,
                custom_version_format,
                custom_versions,
                save_game_class_name,
            } => {
                let mut len = 24;
                cursor.write_u32::<LittleEndian>(3)?;
                cursor.write_u32::<LittleEndian>(*package_file_version)?;
                cursor.write_u32::<LittleEndian>(*package_file_version_ue5)?;
                len += engine_version.write(cursor)?;
                cursor.write_u32::<LittleEndian>(*custom_version_format)?;
                cursor.write_u32::<LittleEndian>(custom_versions.len() as u32)?;
                for (&key, &version) in custom_versions {
                    len += FCustomVersion::new(key, version).write(cursor)?
                }
                len += cursor.write_string(save_game_class_name)?;
                Ok(len)
            }
        }
    }

    /// Get custom versions from this header
    pub fn get_custom_versions(&self) -> &IndexMap<Guid, u32> {
        match self {
            GvasHeader::Version2 { custom_versions, .. } => custom_versions,
            GvasHeader::Version3 { custom_versions, .. } => custom_versions,
        }
    }

    /// The save game class name, consulted by the container framing to
    /// pick a default compression codec on write (spec §4.B).
    pub fn save_game_class_name(&self) -> &str {
        match self {
            GvasHeader::Version2 { save_game_class_name, .. } => save_game_class_name,
            GvasHeader::Version3 { save_game_class_name, .. } => save_game_class_name,
        }
    }
}

trait GvasHeaderTrait {
    fn use_large_world_coordinates(&self) -> bool;
}

impl GvasHeaderTrait for GvasHeader {
    fn use_large_world_coordinates(&self) -> bool {
        match self {
            GvasHeader::Version2 { .. } => false,
            GvasHeader::Version3 { .. } => true,
        }
    }
}

fn header_to_doc(header: &GvasHeader) -> DocValue {
    let mut object = IndexMap::new();
    let (version_tag, package_file_version_ue5) = match header {
        GvasHeader::Version2 { .. } => (2i64, None),
        GvasHeader::Version3 { package_file_version_ue5, .. } => (3i64, Some(*package_file_version_ue5)),
    };
    object.insert("version".to_string(), DocValue::Int(version_tag));
    object.insert("package_file_version".to_string(), DocValue::Int(match header {
        GvasHeader::Version2 { package_file_version, .. } => *package_file_version as i64,
        GvasHeader::Version3 { package_file_version, .. } => *package_file_version as i64,
    }));
    if let Some(ue5) = package_file_version_ue5 {
        object.insert("package_file_version_ue5".to_string(), DocValue::Int(ue5 as i64));
    }
    object.insert("engine_version".to_string(), engine_version_to_doc(header_engine_version(header)));
    object.insert("custom_version_format".to_string(), DocValue::Int(match header {
        GvasHeader::Version2 { custom_version_format, .. } => *custom_version_format as i64,
        GvasHeader::Version3 { custom_version_format, .. } => *custom_version_format as i64,
    }));
    let mut custom_versions = Vec::new();
    for (guid, version) in header.get_custom_versions() {
        let mut entry = IndexMap::new();
        entry.insert("key".to_string(), DocValue::String(guid.to_dashed_lowercase()));
        entry.insert("version".to_string(), DocValue::Int(*version as i64));
        custom_versions.push(DocValue::Object(entry));
    }
    object.insert("custom_versions".to_string(), DocValue::Array(custom_versions));
    object.insert("save_game_class_name".to_string(), DocValue::String(header.save_game_class_name().to_string()));
    DocValue::Object(object)
}

fn header_engine_version(header: &GvasHeader) -> &FEngineVersion {
    match header {
        GvasHeader::Version2 { engine_version, .. } => engine_version,
        GvasHeader::Version3 { engine_version, .. } => engine_version,
    }
}

fn engine_version_to_doc(engine_version: &FEngineVersion) -> DocValue {
    let mut object = IndexMap::new();
    object.insert("major".to_string(), DocValue::UInt(engine_version.major as u64));
    object.insert("minor".to_string(), DocValue::UInt(engine_version.minor as u64));
    object.insert("patch".to_string(), DocValue::UInt(engine_version.patch as u64));
    object.insert("change_list".to_string(), DocValue::UInt(engine_version.change_list as u64));
    object.insert("branch".to_string(), DocValue::String(engine_version.branch.clone()));
    DocValue::Object(object)
}

fn engine_version_from_doc(doc: &DocValue, path: &str) -> Result<FEngineVersion, Error> {
    let doc = doc.field("engine_version", path)?;
    Ok(FEngineVersion::new(
        doc.field("major", path)?.as_u64(path)? as u16,
        doc.field("minor", path)?.as_u64(path)? as u16,
        doc.field("patch", path)?.as_u64(path)? as u16,
        doc.field("change_list", path)?.as_u64(path)? as u32,
        doc.field("branch", path)?.as_str(path)?.to_string(),
    ))
}

/// Main save file struct: a header, an ordered property list, and the
/// [`DeserializedGameVersion`] facts needed to reproduce the exact SAV
/// container the file was read from.
///
/// Not `Eq`: a property list may carry `FloatProperty`/`DoubleProperty`
/// values, and `f32`/`f64` can't implement `Eq` (NaN isn't reflexive).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GvasFile {
    /// Game version
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "DeserializedGameVersion::is_default"))]
    pub deserialized_game_version: DeserializedGameVersion,
    /// GVAS file header.
    pub header: GvasHeader,
    /// GVAS properties.
    pub properties: IndexMap<String, Property>,
}

impl GvasFile {
    /// Read GvasFile from a binary file, with no type hints.
    ///
    /// # Errors
    ///
    /// If this function reads an invalid file it returns [`Error`]. If it reads a file that
    /// needs hints it returns [`error::DeserializeError::MissingHint`].
    pub fn read<R: Read + Seek>(cursor: &mut R, game_version: GameVersion) -> Result<Self, Error> {
        Self::read_with_hints(cursor, game_version, &TypeHintRegistry::new())
    }

    /// Read GvasFile from a binary file, consulting `hints` to disambiguate
    /// struct/enum payloads the wire format alone can't resolve.
    ///
    /// # Errors
    ///
    /// If this function reads an invalid file it returns [`Error`]. If a hint is missing for a
    /// path that needs one it returns [`error::DeserializeError::MissingHint`].
    pub fn read_with_hints<R: Read + Seek>(cursor: &mut R, game_version: GameVersion, hints: &TypeHintRegistry) -> Result<Self, Error> {
        let (gvas_bytes, deserialized_game_version) = match game_version {
            GameVersion::Default => {
                let mut data = Vec::new();
                cursor.read_to_end(&mut data)?;
                (data, DeserializedGameVersion::Default)
            }
            GameVersion::Palworld => container::decode_container(cursor)?,
        };

        let mut gvas_cursor = std::io::Cursor::new(gvas_bytes);
        let header = GvasHeader::read(&mut gvas_cursor)?;

        let mut options = PropertyOptions::new(hints, header.use_large_world_coordinates(), header.get_custom_versions().clone());
        let properties = properties::read_properties(&mut gvas_cursor, &mut options)?;

        Ok(GvasFile { deserialized_game_version, header, properties })
    }

    /// Write GvasFile to a binary file, reproducing the exact SAV container
    /// shape ([`DeserializedGameVersion`]) it carries — which for a file
    /// produced by [`GvasFile::read`] is always the shape it was read from.
    /// A file built fresh (e.g. lifted from DOC) should set
    /// `deserialized_game_version` explicitly beforehand, using
    /// [`default_compression_for_class_name`] as a starting point.
    ///
    /// # Errors
    ///
    /// If the file was modified in a way that makes it invalid this function returns [`Error`]
    pub fn write<W: Write>(&self, cursor: &mut W) -> Result<(), Error> {
        let mut gvas_cursor = std::io::Cursor::new(Vec::new());
        self.header.write(&mut gvas_cursor)?;

        let mut options = PropertyOptions::new(&TypeHintRegistry::new(), self.header.use_large_world_coordinates(), self.header.get_custom_versions().clone());
        properties::write_properties(&mut gvas_cursor, &self.properties, &mut options)?;
        gvas_cursor.write_i32::<LittleEndian>(0)?; // trailer

        let gvas_bytes = gvas_cursor.into_inner();
        container::encode_container(cursor, &gvas_bytes, self.deserialized_game_version)
    }

    /// Lowers this file into a DOC tree (spec §6 `{header, properties,
    /// trailer}`).
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if a registered custom-property handler fails to decode its bytes in a
    /// way other than the non-fatal `Ok(None)` fallback.
    pub fn to_doc(&self, doc_options: &DocOptions) -> Result<DocValue, Error> {
        let hints = TypeHintRegistry::new();
        let mut options = PropertyOptions::new(&hints, self.header.use_large_world_coordinates(), self.header.get_custom_versions().clone());
        let properties_doc = doc::properties_to_doc(&self.properties, &mut options, doc_options)?;

        let mut object = IndexMap::new();
        object.insert("header".to_string(), header_to_doc(&self.header));
        object.insert("properties".to_string(), properties_doc);
        object.insert("trailer".to_string(), DocValue::Int(0));
        Ok(DocValue::Object(object))
    }

    /// Lifts a DOC tree back into a [`GvasFile`], the inverse of
    /// [`GvasFile::to_doc`]. The resulting file's `deserialized_game_version`
    /// defaults to [`DeserializedGameVersion::Default`]; set it explicitly
    /// (e.g. via [`default_compression_for_class_name`]) before calling
    /// [`GvasFile::write`] for a Palworld container.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if the DOC tree is malformed, references a custom-property path with no
    /// registered handler, or a handler's `encode` fails.
    pub fn from_doc(doc: &DocValue, hints: &TypeHintRegistry, doc_options: &DocOptions) -> Result<Self, Error> {
        let path = "";
        let header = header_from_doc(doc.field("header", path)?)?;
        let mut options = PropertyOptions::new(hints, header.use_large_world_coordinates(), header.get_custom_versions().clone());
        let properties = doc::doc_to_properties(doc.field("properties", path)?, &mut options, doc_options)?;

        Ok(GvasFile { deserialized_game_version: DeserializedGameVersion::Default, header, properties })
    }
}

fn header_from_doc(doc: &DocValue) -> Result<GvasHeader, Error> {
    let path = "header";
    let version = doc.field("version", path)?.as_i64(path)?;
    let package_file_version = doc.field("package_file_version", path)?.as_i64(path)? as u32;
    let engine_version = engine_version_from_doc(doc, path)?;
    let custom_version_format = doc.field("custom_version_format", path)?.as_i64(path)? as u32;

    let mut custom_versions = IndexMap::new();
    for entry in doc.field("custom_versions", path)?.as_array(path)? {
        let key = Guid::parse_dashed(entry.field("key", path)?.as_str(path)?)
            .ok_or_else(|| error::SerializeError::invalid_value("bad custom version guid"))?;
        let version = entry.field("version", path)?.as_i64(path)? as u32;
        custom_versions.insert(key, version);
    }

    let save_game_class_name = doc.field("save_game_class_name", path)?.as_str(path)?.to_string();

    Ok(match version {
        3 => {
            let package_file_version_ue5 = doc.field("package_file_version_ue5", path)?.as_i64(path)? as u32;
            GvasHeader::Version3 {
                package_file_version,
                package_file_version_ue5,
                engine_version,
                custom_version_format,
                custom_versions,
                save_game_class_name,
            }
        }
        _ => GvasHeader::Version2 { package_file_version, engine_version, custom_version_format, custom_versions, save_game_class_name },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_compression_matches_palworld_class_names() {
        assert_eq!(default_compression_for_class_name("/Script/Pal.PalWorldSaveGame"), PalworldCompressionType::ZlibTwice);
        assert_eq!(default_compression_for_class_name("/Script/Pal.PalLocalWorldSaveGame"), PalworldCompressionType::ZlibTwice);
        assert_eq!(default_compression_for_class_name("/Script/SomethingElseSaveGame"), PalworldCompressionType::Zlib);
    }

    #[test]
    fn header_doc_round_trips_custom_versions_and_class_name() {
        let mut custom_versions = IndexMap::new();
        custom_versions.insert(Guid::from_4_ints(1, 2, 3, 4), 7u32);
        let header = GvasHeader::Version3 {
            package_file_version: 0x205,
            package_file_version_ue5: 1007,
            engine_version: FEngineVersion::new(5, 1, 1, 0, String::new()),
            custom_version_format: 3,
            custom_versions,
            save_game_class_name: "/Script/Pal.PalWorldSaveGame".to_string(),
        };
        let doc = header_to_doc(&header);
        let lifted = header_from_doc(&doc).unwrap();
        assert_eq!(lifted, header);
    }
}

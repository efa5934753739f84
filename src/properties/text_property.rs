//! Localized/formatted text (spec §4.C generic property catalog).
//!
//! `FText` carries a history tag describing how it was constructed
//! (a literal/invariant string, a namespaced localization key plus source
//! string, or one of a dozen richer formatting histories UE uses for
//! argument substitution, number/date formatting, and string table
//! lookups). Save games almost exclusively use the first two; the rest are
//! kept as opaque bytes after their history-type tag so a text value built
//! from one of the less common histories still round-trips byte for byte
//! even though this crate doesn't interpret its internal shape.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::cursor_ext::{ReadExt, WriteExt};
use crate::custom_version::FEditorObjectVersion;
use crate::error::Error;
use crate::properties::PropertyOptions;

/// How an `FText`'s display string was produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FTextHistory {
    /// A literal/invariant string with no localization key (`history_type ==
    /// -1`). Newer engine versions additionally store the literal string a
    /// second time for culture-invariant comparisons.
    None {
        /// The culture-invariant copy of the string, present only on saves
        /// written after `FEditorObjectVersion::CultureInvariantTextSerializationKeyStability`.
        culture_invariant_string: Option<String>,
    },
    /// A localized string identified by namespace and key, with its
    /// original source string (`history_type == 0`).
    Base {
        /// The localization namespace.
        namespace: Option<String>,
        /// The localization key.
        key: Option<String>,
        /// The source (un-translated) string.
        source_string: Option<String>,
    },
    /// Any other history (`NamedFormat`, `OrderedFormat`, `AsNumber`,
    /// `AsDateTime`, `StringTableEntry`, etc.): the history-type tag plus
    /// everything after it, kept verbatim.
    Other {
        /// The wire history-type tag.
        history_type: i8,
        /// The raw bytes following the tag.
        raw: Vec<u8>,
    },
}

/// An Unreal localizable/formatted text value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FText {
    /// Display flags (transient/culture-invariant/etc. bit flags).
    pub flags: u32,
    /// How the display string was produced.
    pub history: FTextHistory,
}

/// A property holding an [`FText`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextProperty {
    /// The wrapped text value.
    pub value: FText,
}

impl TextProperty {
    /// Creates a new `TextProperty`.
    pub fn new(value: FText) -> Self {
        TextProperty { value }
    }

    pub(crate) fn read_body<R: Read>(reader: &mut R, _len: u64, options: &mut PropertyOptions) -> Result<Self, Error> {
        let flags = reader.read_u32::<LittleEndian>()?;
        let history_type = reader.read_i8()?;

        let history = match history_type {
            -1 => {
                let culture_invariant_string = if options.supports_version(FEditorObjectVersion::CultureInvariantTextSerializationKeyStability) {
                    reader.read_optional_string()?
                } else {
                    None
                };
                FTextHistory::None { culture_invariant_string }
            }
            0 => {
                let namespace = reader.read_optional_string()?;
                let key = reader.read_optional_string()?;
                let source_string = reader.read_optional_string()?;
                FTextHistory::Base { namespace, key, source_string }
            }
            other => {
                let mut raw = Vec::new();
                reader.read_to_end(&mut raw)?;
                FTextHistory::Other { history_type: other, raw }
            }
        };

        Ok(TextProperty {
            value: FText { flags, history },
        })
    }

    pub(crate) fn write_body<W: Write>(&self, writer: &mut W, options: &mut PropertyOptions) -> Result<(), Error> {
        writer.write_u32::<LittleEndian>(self.value.flags)?;
        match &self.value.history {
            FTextHistory::None { culture_invariant_string } => {
                writer.write_i8(-1)?;
                if options.supports_version(FEditorObjectVersion::CultureInvariantTextSerializationKeyStability) {
                    writer.write_optional_string(culture_invariant_string.as_deref())?;
                }
            }
            FTextHistory::Base { namespace, key, source_string } => {
                writer.write_i8(0)?;
                writer.write_optional_string(namespace.as_deref())?;
                writer.write_optional_string(key.as_deref())?;
                writer.write_optional_string(source_string.as_deref())?;
            }
            FTextHistory::Other { history_type, raw } => {
                writer.write_i8(*history_type)?;
                writer.write_all(raw)?;
            }
        }
        Ok(())
    }
}

//! Small value types shared across the header, property, and DOC codecs.

use std::fmt::{Debug, Display};

/// A 128-bit GUID, stored exactly as it appears on disk: four little-endian
/// `u32` words, concatenated byte-for-byte.
///
/// This is *not* RFC-4122 wire order — see `docs/DESIGN.md` for the
/// canonical transform this crate picked and why it doesn't matter as long
/// as both ends agree.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Guid(pub [u8; 16]);

impl Guid {
    /// The all-zero GUID, used as the default for untagged struct properties.
    pub const ZERO: Guid = Guid([0u8; 16]);

    /// Builds a `Guid` from four little-endian 32-bit words, the layout GVAS
    /// struct properties of type `Guid` actually use on disk.
    pub fn from_4_ints(a: u32, b: u32, c: u32, d: u32) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0..4].copy_from_slice(&a.to_le_bytes());
        bytes[4..8].copy_from_slice(&b.to_le_bytes());
        bytes[8..12].copy_from_slice(&c.to_le_bytes());
        bytes[12..16].copy_from_slice(&d.to_le_bytes());
        Guid(bytes)
    }

    /// Wraps sixteen raw bytes, taken verbatim from the wire.
    pub fn new(guid: [u8; 16]) -> Self {
        Guid(guid)
    }

    /// Builds a `Guid` from four little-endian 32-bit words given as an
    /// array, the shape custom version GUID constants are usually quoted in
    /// (e.g. `FEditorObjectVersion`'s GUID).
    pub fn from_u32(words: [u32; 4]) -> Self {
        Guid::from_4_ints(words[0], words[1], words[2], words[3])
    }

    /// Splits this GUID back into the four little-endian 32-bit words it was
    /// built from (or read as).
    pub fn to_4_ints(&self) -> (u32, u32, u32, u32) {
        let word = |i: usize| -> u32 { u32::from_le_bytes(self.0[i..i + 4].try_into().unwrap()) };
        (word(0), word(4), word(8), word(12))
    }

    /// Renders the GUID as a lowercase, dash-separated 32-hex-digit string,
    /// the shape the DOC layer (spec §6) expects.
    pub fn to_dashed_lowercase(&self) -> String {
        format!("{self:x}")
    }

    /// Parses a dashed (or bare) 32-hex-digit GUID string, with or without
    /// surrounding braces. Inverse of [`Guid::to_dashed_lowercase`].
    pub fn parse_dashed(s: &str) -> Option<Guid> {
        let trimmed = s.trim_start_matches('{').trim_end_matches('}');
        let hex: String = trimmed.chars().filter(|c| *c != '-').collect();
        if hex.len() != 32 {
            return None;
        }
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Guid(bytes))
    }
}

impl From<(u32, u32, u32, u32)> for Guid {
    fn from((a, b, c, d): (u32, u32, u32, u32)) -> Self {
        Guid::from_4_ints(a, b, c, d)
    }
}

impl From<Guid> for (u32, u32, u32, u32) {
    fn from(guid: Guid) -> Self {
        guid.to_4_ints()
    }
}

impl Debug for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Guid").field(&self.to_dashed_lowercase()).finish()
    }
}

impl Display for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:X}")
    }
}

impl std::fmt::LowerHex for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_dashed(&self.0, f, false)
    }
}

impl std::fmt::UpperHex for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_dashed(&self.0, f, true)
    }
}

fn write_dashed(bytes: &[u8; 16], f: &mut std::fmt::Formatter<'_>, upper: bool) -> std::fmt::Result {
    let groups: [&[u8]; 5] = [
        &bytes[0..4],
        &bytes[4..6],
        &bytes[6..8],
        &bytes[8..10],
        &bytes[10..16],
    ];
    for (i, group) in groups.iter().enumerate() {
        if i != 0 {
            write!(f, "-")?;
        }
        for byte in group.iter() {
            if upper {
                write!(f, "{byte:02X}")?;
            } else {
                write!(f, "{byte:02x}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_4_ints() {
        let guid = Guid::from_4_ints(0x1dec0538, 0xa9455fd2, 0x65aa42ec, 0xc56a4180);
        assert_eq!(guid.to_4_ints(), (0x1dec0538, 0xa9455fd2, 0x65aa42ec, 0xc56a4180));
    }

    #[test]
    fn formats_as_dashed_hex() {
        let bytes = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f,
        ];
        let guid = Guid(bytes);
        assert_eq!(format!("{guid}"), "00010203-0405-0607-0809-0A0B0C0D0E0F");
        assert_eq!(guid.to_dashed_lowercase(), "00010203-0405-0607-0809-0a0b0c0d0e0f");
    }

    #[test]
    fn parses_dashed_and_braced_strings() {
        let guid = Guid::parse_dashed("{3805EC1D-D25F-45A9-EC42-AA6580416AC5}").unwrap();
        assert_eq!(format!("{guid}"), "3805EC1D-D25F-45A9-EC42-AA6580416AC5");
        assert_eq!(Guid::parse_dashed("not-a-guid"), None);
    }
}

//! SAV container framing (spec §4.F): the outer envelope around a GVAS
//! byte stream — an optional `CNK` chunk prefix, a 12-byte header
//! (uncompressed length, compressed length, three-byte magic, one-byte
//! save type), and the compressed payload itself.
//!
//! Grounded on `palworld_save_tools.compressor.Compressor._parse_sav_header`
//! / `palsav.decompress_sav_to_gvas`: a `CNK` prefix only ever shifts where
//! the real 12-byte header starts (by 12 bytes) and is never re-derived
//! from the payload, so this module reads it but never re-emits it on
//! write — every save this crate produces is written in the unprefixed
//! shape.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::codecs::{Codec, OozCodec, ZlibCodec};
use crate::error::{CompressionError, ContainerError, Error};
use crate::game_version::{DeserializedGameVersion, PalworldCompressionType, PLM_MAGIC, PLZ_MAGIC};

const HEADER_LEN: usize = 12;
const CNK_PREFIX_LEN: usize = 12;

/// Reads a whole SAV container and returns the decompressed GVAS bytes
/// along with the [`DeserializedGameVersion`] the header implied, so the
/// caller can round-trip the same container shape on write.
pub fn decode_container<R: Read>(reader: &mut R) -> Result<(Vec<u8>, DeserializedGameVersion), Error> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    if data.len() < HEADER_LEN {
        return Err(ContainerError::TooSmall(data.len()).into());
    }

    let header_offset = if data.starts_with(b"CNK") {
        log::debug!("input carries a CNK prefix, shifting the container header by {CNK_PREFIX_LEN} bytes");
        CNK_PREFIX_LEN
    } else {
        0
    };
    if data.len() < header_offset + HEADER_LEN {
        return Err(ContainerError::TooSmall(data.len()).into());
    }

    let mut header = &data[header_offset..header_offset + HEADER_LEN];
    let uncompressed_len = header.read_u32::<LittleEndian>()? as usize;
    let _compressed_len = header.read_u32::<LittleEndian>()? as usize;
    let mut magic = [0u8; 3];
    magic.copy_from_slice(&data[header_offset + 8..header_offset + 11]);
    let save_type = data[header_offset + 11];
    let payload = &data[header_offset + HEADER_LEN..];

    if &magic == PLZ_MAGIC {
        let compression_type = PalworldCompressionType::try_from(save_type)
            .map_err(|_| ContainerError::UnsupportedSaveType(save_type, magic))?;
        let gvas = match compression_type {
            PalworldCompressionType::None => payload.to_vec(),
            PalworldCompressionType::Zlib => ZlibCodec.decompress(payload, uncompressed_len)?,
            PalworldCompressionType::ZlibTwice => {
                let once = zlib_decompress_unbounded(payload)?;
                ZlibCodec.decompress(&once, uncompressed_len)?
            }
        };
        Ok((gvas, DeserializedGameVersion::Palworld(compression_type)))
    } else if &magic == PLM_MAGIC {
        let gvas = OozCodec.decompress(payload, uncompressed_len)?;
        Ok((gvas, DeserializedGameVersion::PalworldOodle))
    } else {
        Err(ContainerError::UnknownContainerFormat(magic).into())
    }
}

/// Decompresses one zlib stream without checking the result against a
/// declared length. `ZlibTwice`'s outer header only records the fully
/// unwrapped GVAS length, not the length of the intermediate zlib stream
/// the first pass produces, so that pass can't use [`ZlibCodec::decompress`]
/// (which requires an exact expected length up front).
fn zlib_decompress_unbounded(payload: &[u8]) -> Result<Vec<u8>, Error> {
    let mut decoder = flate2::read::ZlibDecoder::new(payload);
    let mut output = Vec::new();
    decoder
        .read_to_end(&mut output)
        .map_err(|e| CompressionError::CodecFailure(e.to_string()))?;
    Ok(output)
}

/// Writes a SAV container around already-serialized GVAS bytes, choosing
/// the codec from `deserialized_game_version`. Never emits a `CNK` prefix
/// (spec §4.F) — every container this crate writes starts with the
/// 12-byte header.
pub fn encode_container<W: Write>(writer: &mut W, gvas_bytes: &[u8], deserialized_game_version: DeserializedGameVersion) -> Result<(), Error> {
    match deserialized_game_version {
        DeserializedGameVersion::Default => {
            writer.write_all(gvas_bytes)?;
            Ok(())
        }
        DeserializedGameVersion::Palworld(compression_type) => {
            let compressed = match compression_type {
                PalworldCompressionType::None => gvas_bytes.to_vec(),
                PalworldCompressionType::Zlib => ZlibCodec.compress(gvas_bytes)?,
                PalworldCompressionType::ZlibTwice => ZlibCodec.compress(&ZlibCodec.compress(gvas_bytes)?)?,
            };
            writer.write_u32::<LittleEndian>(gvas_bytes.len() as u32)?;
            writer.write_u32::<LittleEndian>(compressed.len() as u32)?;
            writer.write_all(PLZ_MAGIC)?;
            writer.write_u8(compression_type.into())?;
            writer.write_all(&compressed)?;
            Ok(())
        }
        DeserializedGameVersion::PalworldOodle => Err(crate::error::CompressionError::Unsupported(
            "re-encoding a PlM (Oodle) container requires an encoder this crate does not have".to_string(),
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn round_trip(compression_type: PalworldCompressionType) {
        let gvas = b"GVAS-shaped-bytes-for-testing-purposes".to_vec();
        let mut buf = Vec::new();
        encode_container(&mut buf, &gvas, DeserializedGameVersion::Palworld(compression_type)).unwrap();
        let (decoded, version) = decode_container(&mut Cursor::new(buf)).unwrap();
        assert_eq!(decoded, gvas);
        assert_eq!(version, DeserializedGameVersion::Palworld(compression_type));
    }

    #[test]
    fn round_trips_none() {
        round_trip(PalworldCompressionType::None);
    }

    #[test]
    fn round_trips_zlib() {
        round_trip(PalworldCompressionType::Zlib);
    }

    #[test]
    fn round_trips_zlib_twice() {
        round_trip(PalworldCompressionType::ZlibTwice);
    }

    #[test]
    fn rejects_unknown_magic() {
        let mut data = vec![0u8; 12];
        data[8..11].copy_from_slice(b"xyz");
        let err = decode_container(&mut Cursor::new(data));
        assert!(err.is_err());
    }

    #[test]
    fn rejects_too_small() {
        let err = decode_container(&mut Cursor::new(vec![0u8; 4]));
        assert!(err.is_err());
    }

    #[test]
    fn strips_cnk_prefix_on_read_and_never_reemits_it() {
        // Exercises the CNK debug log above; run with `RUST_LOG=debug` to see it.
        let _ = env_logger::try_init();
        let gvas = b"more-gvas-bytes".to_vec();
        let mut inner = Vec::new();
        encode_container(&mut inner, &gvas, DeserializedGameVersion::Palworld(PalworldCompressionType::None)).unwrap();
        let mut prefixed = b"CNK0".to_vec();
        prefixed.extend_from_slice(&[0u8; 8]);
        prefixed.extend_from_slice(&inner);
        let (decoded, _) = decode_container(&mut Cursor::new(prefixed)).unwrap();
        assert_eq!(decoded, gvas);

        let mut reencoded = Vec::new();
        encode_container(&mut reencoded, &gvas, DeserializedGameVersion::Palworld(PalworldCompressionType::None)).unwrap();
        assert!(!reencoded.starts_with(b"CNK"));
    }
}

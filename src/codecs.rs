//! Codec adapters (spec §4.G): one small wrapper per wire compression
//! scheme a SAV container can carry, each translating a third-party crate's
//! own error type into [`CompressionError`].

use std::io::Read;

use crate::error::{CompressionError, Error};

/// A single compression/decompression scheme, keyed off the container's
/// magic + save-type byte (component F builds these, never the handler
/// modules).
pub trait Codec {
    /// Decompresses `payload` into exactly `expected_len` bytes.
    fn decompress(&self, payload: &[u8], expected_len: usize) -> Result<Vec<u8>, Error>;

    /// Compresses `payload`. Codecs that cannot re-encode (no public
    /// encoder exists for the wire format) return
    /// [`CompressionError::Unsupported`] instead of guessing.
    fn compress(&self, payload: &[u8]) -> Result<Vec<u8>, Error>;
}

/// Zlib, used by every `PlZ`-magic save type and by the `CNK` chunked
/// variant (spec §4.F).
#[derive(Debug, Default, Clone, Copy)]
pub struct ZlibCodec;

impl Codec for ZlibCodec {
    fn decompress(&self, payload: &[u8], expected_len: usize) -> Result<Vec<u8>, Error> {
        let mut decoder = flate2::read::ZlibDecoder::new(payload);
        let mut output = Vec::with_capacity(expected_len);
        decoder
            .read_to_end(&mut output)
            .map_err(|e| CompressionError::CodecFailure(e.to_string()))?;
        if output.len() != expected_len {
            return Err(CompressionError::LengthMismatch { expected: expected_len, actual: output.len() }.into());
        }
        Ok(output)
    }

    fn compress(&self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        use std::io::Write;
        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(payload)
            .map_err(|e| CompressionError::CodecFailure(e.to_string()))?;
        encoder.finish().map_err(|e| CompressionError::CodecFailure(e.to_string()).into())
    }
}

/// Oodle (Kraken), used by the `PlM`-magic save type. Decode-only: this
/// crate has no encoder for the proprietary format, so [`Codec::compress`]
/// always fails with [`CompressionError::Unsupported`] — an honestly
/// disclosed limitation rather than a silent no-op.
#[derive(Debug, Default, Clone, Copy)]
pub struct OozCodec;

impl Codec for OozCodec {
    fn decompress(&self, payload: &[u8], expected_len: usize) -> Result<Vec<u8>, Error> {
        let mut output = vec![0u8; expected_len];
        let mut extractor = oozextract::Extractor::new();
        let written = extractor
            .read_from_slice(payload, output.as_mut_slice())
            .map_err(|e| CompressionError::CodecFailure(e.to_string()))?;
        if written != output.len() {
            return Err(CompressionError::LengthMismatch { expected: expected_len, actual: written }.into());
        }
        Ok(output)
    }

    fn compress(&self, _payload: &[u8]) -> Result<Vec<u8>, Error> {
        Err(CompressionError::Unsupported("Oodle/Kraken encoding is not available".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zlib_round_trips() {
        let codec = ZlibCodec;
        let payload = b"the quick brown fox jumps over the lazy dog".repeat(4);
        let compressed = codec.compress(&payload).unwrap();
        let decompressed = codec.decompress(&compressed, payload.len()).unwrap();
        assert_eq!(decompressed, payload);
    }

    #[test]
    fn zlib_rejects_length_mismatch() {
        let codec = ZlibCodec;
        let compressed = codec.compress(b"hello").unwrap();
        let err = codec.decompress(&compressed, 999);
        assert!(err.is_err());
    }

    #[test]
    fn ooz_compress_is_unsupported() {
        let codec = OozCodec;
        assert!(codec.compress(b"hello").is_err());
    }
}

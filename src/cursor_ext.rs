//! Primitive little-endian I/O over an in-memory buffer: the byte
//! reader/writer component (spec §4.A). Everything here is a thin,
//! bounds-checked wrapper — the interesting codec logic lives in
//! `properties` and `header`.

use std::io::{Cursor, Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use unreal_helpers::{UnrealReadExt, UnrealWriteExt};

use crate::error::{DeserializeError, Error};
use crate::types::Guid;

/// Read-side extensions, implemented for any `Read + Seek`.
pub trait ReadExt: Read + Seek {
    /// Reads a length-prefixed GVAS string (spec §4.A / §6): a positive
    /// length means a single-byte-per-char (plus terminator) encoding, a
    /// negative length means two-byte-per-char UTF-16, and zero means an
    /// empty string with no terminator at all.
    fn read_string(&mut self) -> Result<String, Error> {
        match self.read_fstring()? {
            Some(s) => Ok(s),
            None => Ok(String::new()),
        }
    }

    /// Like [`ReadExt::read_string`] but preserves the "null string" case
    /// (as opposed to empty string) that `StrProperty` can carry.
    fn read_optional_string(&mut self) -> Result<Option<String>, Error> {
        Ok(self.read_fstring()?)
    }

    /// Reads a 128-bit GUID as four consecutive little-endian `u32` words.
    fn read_guid(&mut self) -> Result<Guid, Error> {
        let mut bytes = [0u8; 16];
        self.read_exact(&mut bytes)?;
        Ok(Guid::new(bytes))
    }

    /// Reads a single padding/terminator byte and checks that it's zero.
    fn read_zero_terminator(&mut self, path: &str) -> Result<(), Error> {
        let byte = self.read_u8()?;
        if byte != 0 {
            return Err(DeserializeError::PaddingNotZero(path.to_string(), self.stream_position()?).into());
        }
        Ok(())
    }

    /// Reads a `u32` count followed by `count` elements produced by `read_one`
    /// (spec §4.A `tarray(T)`).
    fn read_tarray<T>(
        &mut self,
        mut read_one: impl FnMut(&mut Self) -> Result<T, Error>,
    ) -> Result<Vec<T>, Error> {
        let count = self.read_u32::<LittleEndian>()? as usize;
        let mut out = Vec::with_capacity(count.min(1 << 20));
        for _ in 0..count {
            out.push(read_one(self)?);
        }
        Ok(out)
    }
}

impl<R: Read + Seek + ?Sized> ReadExt for R {}

/// Write-side extensions, implemented for any `Write`.
pub trait WriteExt: Write {
    /// Writes a length-prefixed GVAS string using the single-byte encoding
    /// when every character fits in Latin-1/UTF-8 and falling back to the
    /// two-byte encoding (negative length) otherwise — mirrors
    /// [`ReadExt::read_string`].
    fn write_string(&mut self, v: &str) -> Result<(), Error> {
        self.write_fstring(Some(v))?;
        Ok(())
    }

    /// Writes the GVAS "null string" sentinel (a zero length prefix with no
    /// terminator byte).
    fn write_optional_string(&mut self, v: Option<&str>) -> Result<(), Error> {
        self.write_fstring(v)?;
        Ok(())
    }

    /// Writes a 128-bit GUID as four consecutive little-endian `u32` words.
    fn write_guid(&mut self, guid: &Guid) -> Result<(), Error> {
        self.write_all(&guid.0)?;
        Ok(())
    }

    /// Writes a single zero padding/terminator byte.
    fn write_zero_terminator(&mut self) -> Result<(), Error> {
        self.write_u8(0)?;
        Ok(())
    }

    /// Writes a `u32` count followed by each element via `write_one` (the
    /// write-side counterpart of [`ReadExt::read_tarray`]).
    fn write_tarray<T>(
        &mut self,
        items: &[T],
        mut write_one: impl FnMut(&mut Self, &T) -> Result<(), Error>,
    ) -> Result<(), Error> {
        self.write_u32::<LittleEndian>(items.len() as u32)?;
        for item in items {
            write_one(self, item)?;
        }
        Ok(())
    }
}

impl<W: Write + ?Sized> WriteExt for W {}

/// Creates a bounded, logically independent cursor over an owned byte
/// buffer, positioned at offset 0 (spec §4.A "bounded sub-reader"). Used
/// whenever a `size`-delimited value (a custom property's raw payload, a
/// struct body read out of a byte array) needs its own cursor while the
/// parent cursor keeps advancing past the whole record.
pub fn sub_reader(bytes: &[u8]) -> Cursor<Vec<u8>> {
    Cursor::new(bytes.to_vec())
}

/// True if a cursor over an owned buffer has been read to its end.
pub fn at_eof(cursor: &Cursor<Vec<u8>>) -> bool {
    cursor.position() >= cursor.get_ref().len() as u64
}

/// The number of bytes remaining between the cursor's position and the end
/// of its buffer.
pub fn remaining(cursor: &Cursor<Vec<u8>>) -> u64 {
    (cursor.get_ref().len() as u64).saturating_sub(cursor.position())
}

/// Reads whatever bytes remain in a bounded cursor, consuming it to EOF.
pub fn read_to_end_vec(cursor: &mut Cursor<Vec<u8>>) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    cursor.read_to_end(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_round_trip_ascii_and_utf16() {
        let mut cursor = Cursor::new(Vec::new());
        cursor.write_string("hello").unwrap();
        assert_eq!(
            cursor.get_ref(),
            &[6u8, 0, 0, 0, b'h', b'e', b'l', b'l', b'o', 0],
        );
        cursor.set_position(0);
        assert_eq!(cursor.read_string().unwrap(), "hello");

        let mut cursor = Cursor::new(Vec::new());
        cursor.write_string("\u{A7}").unwrap();
        cursor.set_position(0);
        assert_eq!(cursor.read_string().unwrap(), "\u{A7}");
    }

    #[test]
    fn guid_round_trip() {
        let guid = Guid::from_4_ints(1, 2, 3, 4);
        let mut cursor = Cursor::new(Vec::new());
        cursor.write_guid(&guid).unwrap();
        cursor.set_position(0);
        assert_eq!(cursor.read_guid().unwrap(), guid);
    }

    #[test]
    fn tarray_round_trip() {
        let values = vec![1u32, 2, 3, 4];
        let mut cursor = Cursor::new(Vec::new());
        cursor
            .write_tarray(&values, |c, v| {
                c.write_u32::<LittleEndian>(*v)?;
                Ok(())
            })
            .unwrap();
        cursor.set_position(0);
        let read_back = cursor.read_tarray(|c| Ok(c.read_u32::<LittleEndian>()?)).unwrap();
        assert_eq!(read_back, values);
    }
}

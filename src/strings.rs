//! Null-terminated string codecs shared by every record that carries a
//! string of implicit length, plus the hex rendering used in device path
//! text.
//!
//! The `read_*` / `write_*` functions have the shape binrw expects from
//! `parse_with` and `write_with`, so they can be used both from derived
//! structs and called directly on a reader.

use std::char::{decode_utf16, REPLACEMENT_CHARACTER};
use std::fmt::Write as _;

use binrw::io::{Read, Seek, Write};
use binrw::{BinReaderExt, BinResult, BinWriterExt, Endian};

/// Reads UTF-16 code units up to and including the first zero unit. The
/// terminator is consumed but not returned. Running out of input before the
/// terminator is an end-of-file error.
pub fn read_utf16z<R: Read + Seek>(
    reader: &mut R, endian: Endian, _: (),
) -> BinResult<Vec<u16>> {
    let mut v: Vec<u16> = Vec::new();
    loop {
        let ch: u16 = reader.read_type(endian)?;
        if ch == 0 {
            return Ok(v);
        }
        v.push(ch);
    }
}

/// Units before the first zero unit, the part a terminated string can hold.
fn utf16z_prefix(units: &[u16]) -> &[u16] {
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    &units[..end]
}

fn asciiz_prefix(data: &[u8]) -> &[u8] {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    &data[..end]
}

/// Writes the units followed by a zero terminator. Units after an embedded
/// zero are dropped, so the output always reads back with `read_utf16z`.
pub fn write_utf16z<W: Write + Seek>(
    units: &Vec<u16>, writer: &mut W, endian: Endian, _: (),
) -> BinResult<()> {
    for u in utf16z_prefix(units) {
        writer.write_type(u, endian)?;
    }
    writer.write_type(&0u16, endian)?;
    Ok(())
}

/// Reads bytes up to and including the first NUL, which is not returned.
pub fn read_asciiz<R: Read + Seek>(
    reader: &mut R, endian: Endian, _: (),
) -> BinResult<Vec<u8>> {
    let mut v: Vec<u8> = Vec::new();
    loop {
        let ch: u8 = reader.read_type(endian)?;
        if ch == 0 {
            return Ok(v);
        }
        v.push(ch);
    }
}

/// Writes the bytes up to the first NUL, then a NUL.
pub fn write_asciiz<W: Write + Seek>(
    data: &Vec<u8>, writer: &mut W, _endian: Endian, _: (),
) -> BinResult<()> {
    writer.write_all(asciiz_prefix(data))?;
    writer.write_all(&[0])?;
    Ok(())
}

/// Encoded size of a terminated UTF-16 string holding `units`.
pub fn utf16z_len(units: &[u16]) -> usize {
    (utf16z_prefix(units).len() + 1) * 2
}

/// Encoded size of a terminated ASCII string holding `data`.
pub fn asciiz_len(data: &[u8]) -> usize {
    asciiz_prefix(data).len() + 1
}

pub fn to_utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

/// Renders units up to the first zero unit; unpaired surrogates become
/// U+FFFD.
pub fn utf16_to_string(units: &[u16]) -> String {
    decode_utf16(utf16z_prefix(units).iter().cloned())
        .map(|r| r.unwrap_or(REPLACEMENT_CHARACTER))
        .collect::<String>()
}

/// Renders bytes up to the first NUL.
pub fn ascii_to_string(data: &[u8]) -> String {
    String::from_utf8_lossy(asciiz_prefix(data)).into_owned()
}

pub fn hex_upper(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 2);
    for b in data {
        let _ = write!(s, "{:02X}", b);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use binrw::io::Cursor;

    #[test]
    fn utf16z_stops_at_first_aligned_zero() {
        // 0x0100 0x0061 contains a zero byte pair straddling two units,
        // which must not be taken as the terminator.
        let data = [0x00, 0x01, 0x61, 0x00, 0x00, 0x00, 0x01, 0x02];
        let mut c = Cursor::new(&data[..]);
        let units = read_utf16z(&mut c, Endian::Little, ()).unwrap();
        assert_eq!(units, vec![0x0100, 0x0061]);
        assert_eq!(c.position(), 6);
    }

    #[test]
    fn utf16z_unterminated_is_eof() {
        let data = [0x61, 0x00, 0x73, 0x00, 0x64];
        let mut c = Cursor::new(&data[..]);
        let err = read_utf16z(&mut c, Endian::Little, ()).unwrap_err();
        assert!(err.is_eof());
    }

    #[test]
    fn utf16z_write_appends_terminator() {
        let mut c = Cursor::new(Vec::new());
        write_utf16z(&to_utf16("asd"), &mut c, Endian::Little, ()).unwrap();
        assert_eq!(c.into_inner(),
            vec![0x61, 0x00, 0x73, 0x00, 0x64, 0x00, 0x00, 0x00]);
        assert_eq!(utf16z_len(&to_utf16("asd")), 8);
    }

    #[test]
    fn to_utf16_units() {
        assert_eq!(to_utf16("test"), vec![0x74, 0x65, 0x73, 0x74]);
    }

    #[test]
    fn asciiz_round_trip() {
        let data = b"floppy\0rest";
        let mut c = Cursor::new(&data[..]);
        let s = read_asciiz(&mut c, Endian::Little, ()).unwrap();
        assert_eq!(s, b"floppy".to_vec());
        assert_eq!(c.position(), 7);

        let mut out = Cursor::new(Vec::new());
        write_asciiz(&s, &mut out, Endian::Little, ()).unwrap();
        assert_eq!(out.into_inner(), b"floppy\0".to_vec());
    }

    #[test]
    fn embedded_zero_ends_the_string() {
        let units = to_utf16("a\0b");
        let mut c = Cursor::new(Vec::new());
        write_utf16z(&units, &mut c, Endian::Little, ()).unwrap();
        let out = c.into_inner();
        assert_eq!(out, vec![0x61, 0x00, 0x00, 0x00]);
        assert_eq!(utf16z_len(&units), out.len());

        let mut c = Cursor::new(Vec::new());
        write_asciiz(&b"a\0b".to_vec(), &mut c, Endian::Little, ()).unwrap();
        assert_eq!(c.into_inner(), b"a\0".to_vec());
        assert_eq!(asciiz_len(b"a\0b"), 2);
        assert_eq!(asciiz_len(b""), 1);
    }

    #[test]
    fn rendering() {
        assert_eq!(utf16_to_string(&[0x41, 0xd800, 0x42, 0, 0x43]),
            "A\u{fffd}B");
        assert_eq!(ascii_to_string(b"http://x/\0junk"), "http://x/");
        assert_eq!(hex_upper(&[0x01, 0x23, 0xab]), "0123AB");
        assert_eq!(hex_upper(&[]), "");
    }
}

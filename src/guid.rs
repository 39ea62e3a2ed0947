use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::Serialize;
use serde::Serializer;

use binrw::binrw;

// Appendix A of the UEFI specification: the first three fields are stored
// little-endian, the last eight bytes in order.
#[binrw]
#[brw(little)]
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy, Default)]
pub struct EfiGuid {
    data1: u32,
    data2: u16,
    data3: u16,
    data4: [u8; 8],
}

impl EfiGuid {
    pub const fn from_fields(
        data1: u32, data2: u16, data3: u16, data4: [u8; 8],
    ) -> Self {
        Self { data1, data2, data3, data4 }
    }

    /// Builds a GUID from its 16-byte on-disk encoding.
    pub fn from_bytes(b: [u8; 16]) -> Self {
        Self {
            data1: u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            data2: u16::from_le_bytes([b[4], b[5]]),
            data3: u16::from_le_bytes([b[6], b[7]]),
            data4: [b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15]],
        }
    }

    pub fn to_bytes(&self) -> [u8; 16] {
        let mut b = [0u8; 16];
        b[..4].copy_from_slice(&self.data1.to_le_bytes());
        b[4..6].copy_from_slice(&self.data2.to_le_bytes());
        b[6..8].copy_from_slice(&self.data3.to_le_bytes());
        b[8..].copy_from_slice(&self.data4);
        b
    }

    /// The first field, which MBR partition signatures share storage with.
    pub fn data1(&self) -> u32 {
        self.data1
    }
}

impl fmt::Display for EfiGuid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-\
            {:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1, self.data2, self.data3, self.data4[0], self.data4[1],
            self.data4[2], self.data4[3], self.data4[4], self.data4[5],
            self.data4[6], self.data4[7])
    }
}

// Device path text uses the upper-case form.
impl fmt::UpperHex for EfiGuid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-\
            {:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
            self.data1, self.data2, self.data3, self.data4[0], self.data4[1],
            self.data4[2], self.data4[3], self.data4[4], self.data4[5],
            self.data4[6], self.data4[7])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuidParseError {
    /// Wrong number of dash-separated groups, or a group of the wrong width.
    Format,
    Digit(ParseIntError),
}

impl fmt::Display for GuidParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GuidParseError::Format => write!(f, "malformed GUID"),
            GuidParseError::Digit(e) => write!(f, "invalid GUID digit: {}", e),
        }
    }
}

impl std::error::Error for GuidParseError {}

impl From<ParseIntError> for GuidParseError {
    fn from(e: ParseIntError) -> Self {
        GuidParseError::Digit(e)
    }
}

impl FromStr for EfiGuid {
    type Err = GuidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 5 || parts[3].len() != 4 || parts[4].len() != 12
            || !s.is_ascii()
        {
            return Err(GuidParseError::Format);
        }
        let mut guid = EfiGuid {
            data1: u32::from_str_radix(parts[0], 16)?,
            data2: u16::from_str_radix(parts[1], 16)?,
            data3: u16::from_str_radix(parts[2], 16)?,
            ..Default::default()
        };
        guid.data4[0] = u8::from_str_radix(&parts[3][..2], 16)?;
        guid.data4[1] = u8::from_str_radix(&parts[3][2..], 16)?;
        for (i, pair) in (2..).zip((0..12).step_by(2)) {
            guid.data4[i] = u8::from_str_radix(&parts[4][pair..pair + 2], 16)?;
        }
        Ok(guid)
    }
}

impl Serialize for EfiGuid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binrw::io::Cursor;
    use binrw::BinReaderExt;
    use std::num::IntErrorKind;

    const EFI_GLOBAL_VARIABLE_GUID: EfiGuid = EfiGuid::from_fields(
        0x8be4_df61, 0x93ca, 0x11d2,
        [0xaa, 0x0d, 0x00, 0xe0, 0x98, 0x03, 0x2b, 0x8c],
    );

    #[test]
    fn guid_to_str() {
        assert_eq!(
            EFI_GLOBAL_VARIABLE_GUID.to_string(),
            "8be4df61-93ca-11d2-aa0d-00e098032b8c"
        );
        assert_eq!(
            format!("{:X}", EFI_GLOBAL_VARIABLE_GUID),
            "8BE4DF61-93CA-11D2-AA0D-00E098032B8C"
        );
    }

    #[test]
    fn guid_from_str() {
        assert_eq!(
            EfiGuid::from_str("8be4df61-93ca-11d2-aa0d-00e098032b8c"),
            Ok(EFI_GLOBAL_VARIABLE_GUID)
        );
    }

    #[test]
    fn guid_from_str_err() {
        let err = EfiGuid::from_str("xbe4df61-93ca-11d2-aa0d-00e098032b8c")
            .unwrap_err();
        match err {
            GuidParseError::Digit(e) =>
                assert_eq!(e.kind(), &IntErrorKind::InvalidDigit),
            other => panic!("unexpected {:?}", other),
        }
        let err = EfiGuid::from_str("018be4df61-93ca-11d2-aa0d-00e098032b8c")
            .unwrap_err();
        match err {
            GuidParseError::Digit(e) =>
                assert_eq!(e.kind(), &IntErrorKind::PosOverflow),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(EfiGuid::from_str("8be4df61-93ca-11d2-aa0d"),
            Err(GuidParseError::Format));
    }

    #[test]
    fn guid_bytes_match_binrw_layout() {
        let bytes = EFI_GLOBAL_VARIABLE_GUID.to_bytes();
        assert_eq!(&bytes[..4], &[0x61, 0xdf, 0xe4, 0x8b]);
        let mut c = Cursor::new(&bytes[..]);
        let guid: EfiGuid = c.read_le().unwrap();
        assert_eq!(guid, EFI_GLOBAL_VARIABLE_GUID);
        assert_eq!(EfiGuid::from_bytes(bytes), EFI_GLOBAL_VARIABLE_GUID);
    }
}

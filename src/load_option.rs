use std::fmt;

use binrw::binrw;
use binrw::io::{Cursor, Read, Seek, Write};
use binrw::{BinReaderExt, BinWriterExt, Endian};
use log::debug;
use serde::{Serialize, Serializer};

use crate::device_path::{
    default_registry, DevicePathList, DevicePathNode, Registry,
};
use crate::error::{Error, Location, Result};
use crate::guid::EfiGuid;
use crate::strings;

pub const LOAD_OPTION_ACTIVE: u32           = 0x0000_0001;
pub const LOAD_OPTION_FORCE_RECONNECT: u32  = 0x0000_0002;
pub const LOAD_OPTION_HIDDEN: u32           = 0x0000_0008;
pub const LOAD_OPTION_CATEGORY_MASK: u32    = 0x0000_1f00;
pub const LOAD_OPTION_CATEGORY_BOOT: u32    = 0x0000_0000;
pub const LOAD_OPTION_CATEGORY_APP: u32     = 0x0000_0100;

#[binrw]
#[brw(little)]
struct FixedHeader {
    attributes:             u32,
    file_path_list_length:  u16,
}

const FIXED_HEADER_SIZE: usize = 6;

// See section 3.1.3 of the UEFI specification, version 2.9, for the
// EFI_LOAD_OPTION structure. FilePathListLength is not stored: it is
// recomputed from `file_path_list` every time the option is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadOption {
    pub attributes:     u32,
    /// UTF-16 units without the terminator.
    #[serde(serialize_with = "serialize_utf16")]
    pub description:    Vec<u16>,
    pub file_path_list: DevicePathList,
    /// Everything after the device path, up to the end of the value.
    pub optional_data:  Vec<u8>,
}

#[allow(clippy::ptr_arg)]
fn serialize_utf16<S>(units: &Vec<u16>, serializer: S)
    -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&strings::utf16_to_string(units))
}

fn field_error(e: binrw::Error, name: &'static str, offset: u64) -> Error {
    let location = Location::Field(name);
    if e.is_eof() {
        Error::TruncatedInput { location, offset }
    } else {
        Error::Io { location, source: e }
    }
}

impl LoadOption {
    pub fn new(
        attributes: u32, description: &str, file_path_list: DevicePathList,
        optional_data: Vec<u8>,
    ) -> Self {
        Self {
            attributes,
            description: strings::to_utf16(description),
            file_path_list,
            optional_data,
        }
    }

    pub fn description(&self) -> String {
        strings::utf16_to_string(&self.description)
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = strings::to_utf16(description);
    }

    /// Decodes a whole load option value with the built-in registry.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_with(default_registry(), data)
    }

    pub fn parse_with(registry: &Registry, data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(data);

        let header: FixedHeader = c.read_le()
            .map_err(|e| field_error(e, "Attributes", 0))?;
        let declared = header.file_path_list_length as usize;

        let offset = c.position();
        let description =
            strings::read_utf16z(&mut c, Endian::Little, ())
            .map_err(|e| field_error(e, "Description", offset))?;

        let start = c.position() as usize;
        if data.len() - start < declared {
            return Err(Error::TruncatedInput {
                location: Location::Field("FilePathList"),
                offset: start as u64,
            });
        }
        let (file_path_list, consumed) =
            DevicePathList::parse_at(registry, &data[start..], start as u64)?;
        if consumed != declared {
            return Err(Error::LengthMismatch {
                location: Location::Field("FilePathListLength"),
                declared: declared as u64,
                actual: consumed as u64,
            });
        }

        let optional_data = data[start + declared..].to_vec();
        debug!("load option {:?}: {} path nodes, {} bytes optional data",
            strings::utf16_to_string(&description), file_path_list.len(),
            optional_data.len());

        Ok(Self {
            attributes: header.attributes,
            description,
            file_path_list,
            optional_data,
        })
    }

    /// Reads the reader to its end and decodes what was read. Returns the
    /// option and the number of bytes consumed.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<(Self, u64)> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)
            .map_err(|e| Error::io(e, Location::Field("Attributes")))?;
        let option = Self::parse(&data)?;
        Ok((option, data.len() as u64))
    }

    /// Encoded size of the device path list, sentinel included. This is the
    /// FilePathListLength value `write_to` emits.
    pub fn file_path_list_length(&self) -> usize {
        self.file_path_list.encoded_len()
    }

    pub fn encoded_len(&self) -> usize {
        FIXED_HEADER_SIZE
            + strings::utf16z_len(&self.description)
            + self.file_path_list_length()
            + self.optional_data.len()
    }

    /// Writes the option and returns the number of bytes written.
    pub fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<u64> {
        let list = self.file_path_list.encode()?;
        let file_path_list_length = u16::try_from(list.len())
            .map_err(|_| Error::LengthMismatch {
                location: Location::Field("FilePathListLength"),
                declared: u16::MAX as u64,
                actual: list.len() as u64,
            })?;

        let header = FixedHeader {
            attributes: self.attributes,
            file_path_list_length,
        };
        writer.write_le(&header).map_err(|source| Error::Io {
            location: Location::Field("Attributes"),
            source,
        })?;
        strings::write_utf16z(&self.description, writer, Endian::Little, ())
            .map_err(|source| Error::Io {
                location: Location::Field("Description"),
                source,
            })?;
        writer.write_all(&list)
            .map_err(|e| Error::io(e, Location::Field("FilePathList")))?;
        writer.write_all(&self.optional_data)
            .map_err(|e| Error::io(e, Location::Field("OptionalData")))?;

        Ok((FIXED_HEADER_SIZE
            + strings::utf16z_len(&self.description)
            + list.len()
            + self.optional_data.len()) as u64)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut c = Cursor::new(Vec::with_capacity(self.encoded_len()));
        self.write_to(&mut c)?;
        Ok(c.into_inner())
    }

    pub fn is_active(&self) -> bool {
        self.attributes & LOAD_OPTION_ACTIVE != 0
    }

    pub fn is_hidden(&self) -> bool {
        self.attributes & LOAD_OPTION_HIDDEN != 0
    }

    pub fn category(&self) -> u32 {
        self.attributes & LOAD_OPTION_CATEGORY_MASK
    }

    /// What the entry boots, judged from its device path. Later nodes win,
    /// so a file path under a PCI device reports the file.
    pub fn boot_target(&self) -> BootTarget {
        let mut target = BootTarget::Unknown;
        for node in &self.file_path_list {
            match node {
                DevicePathNode::Pci(p) => {
                    target = BootTarget::Pci(p.device, p.function);
                }
                DevicePathNode::FirmwareFile(guid) => {
                    target = BootTarget::App(*guid);
                }
                DevicePathNode::FilePath(f) => {
                    target = BootTarget::Path(f.path());
                }
                _ => {}
            }
        }
        target
    }

    /// True when the entry boots from a URI (HTTP boot).
    pub fn is_uri(&self) -> bool {
        self.file_path_list.iter()
            .any(|n| matches!(n, DevicePathNode::Uri(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub enum BootTarget {
    #[default]
    Unknown,
    /// PCI device and function.
    Pci(u8, u8),
    /// A firmware application, by file GUID.
    App(EfiGuid),
    Path(String),
}

impl fmt::Display for BootTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BootTarget::Pci(d, func) => write!(f, "PCI {}.{}", d, func),
            BootTarget::App(guid) => write!(f, "App {}", guid),
            BootTarget::Path(path) => write!(f, "Path {}", path),
            BootTarget::Unknown => write!(f, "unknown"),
        }
    }
}

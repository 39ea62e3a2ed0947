//! Device paths: chains of typed, variable-length records describing the
//! route to a boot resource.
//!
//! Every record starts with a 4-byte [`Header`] and is followed by a body of
//! `length - 4` bytes. A [`DevicePathList`] is a sequence of records closed
//! by an end-of-entire-path record, which is framing only and never stored
//! in the list.

mod list;
mod node;
mod registry;

pub use list::DevicePathList;
pub use node::{
    Acpi, BiosBootSpec, CdRom, DevicePathNode, FilePath, HardDrive,
    MacAddress, Pci, Sata, Unrecognized, Uri, Usb,
    MBR_TYPE_EFI_PARTITION_TABLE_HEADER, MBR_TYPE_PCAT,
    SIGNATURE_TYPE_GUID, SIGNATURE_TYPE_MBR, SIGNATURE_TYPE_NONE,
};
pub use registry::{default_registry, DecodeFn, Registry};

use binrw::binrw;
use serde::Serialize;

// Section 10.3.1 - Generic Device Path Structures
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    pub device_type:    u8,
    pub sub_type:       u8,
    /// Total record length, header included.
    pub length:         u16,
}

impl Header {
    pub const SIZE: usize = 4;

    pub fn new(device_type: u8, sub_type: u8, length: u16) -> Self {
        Self { device_type, sub_type, length }
    }

    pub fn is(&self, device_type: u8, sub_type: u8) -> bool {
        self.device_type == device_type && self.sub_type == sub_type
    }

    pub fn is_end_entire(&self) -> bool {
        self.is(DevicePathType::End as u8, END_ENTIRE_SUBTYPE)
    }

    /// Length of the body that follows the header, or `None` when the
    /// declared length cannot even cover the header.
    pub fn body_len(&self) -> Option<usize> {
        (self.length as usize).checked_sub(Self::SIZE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DevicePathType {
    Hardware = 1,
    Acpi = 2,
    Messaging = 3,
    Media = 4,
    Bios = 5,
    End = 0x7f,
}

/// Ends one instance of a multi-instance path; another instance follows.
pub const END_INSTANCE_SUBTYPE: u8 = 0x01;
/// Ends the entire device path.
pub const END_ENTIRE_SUBTYPE: u8 = 0xff;

pub const HW_PCI: u8 = 1;

pub const ACPI_ACPI: u8 = 1;

pub const MSG_USB: u8 = 5;
pub const MSG_MAC_ADDRESS: u8 = 11;
pub const MSG_SATA: u8 = 18;
pub const MSG_URI: u8 = 24;

pub const MEDIA_HARD_DRIVE: u8 = 1;
pub const MEDIA_CDROM: u8 = 2;
pub const MEDIA_FILE_PATH: u8 = 4;
pub const MEDIA_PIWG_FIRMWARE_FILE: u8 = 6;
pub const MEDIA_PIWG_FIRMWARE_VOLUME: u8 = 7;

pub const BBS_BBS: u8 = 1;

use std::fmt;

use binrw::binrw;
use binrw::io::{Cursor, Read, Seek, Write};
use binrw::{BinReaderExt, BinResult, BinWriterExt};
use serde::Serialize;

use super::{
    DevicePathType, Header, ACPI_ACPI, BBS_BBS, END_ENTIRE_SUBTYPE,
    END_INSTANCE_SUBTYPE, HW_PCI,
    MEDIA_CDROM, MEDIA_FILE_PATH, MEDIA_HARD_DRIVE, MEDIA_PIWG_FIRMWARE_FILE,
    MEDIA_PIWG_FIRMWARE_VOLUME, MSG_MAC_ADDRESS, MSG_SATA, MSG_URI, MSG_USB,
};
use crate::error::{Error, Location, Result};
use crate::guid::EfiGuid;
use crate::strings;

// 10.3.2.1 PCI Device Path
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pci {
    pub function:       u8,
    pub device:         u8,
}

// 10.3.3 ACPI Device Path
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Acpi {
    /// Compressed EISA id when the low word is 0x41d0.
    pub hid:            u32,
    pub uid:            u32,
}

const EISA_PNP_ID: u32 = 0x41d0;

// 10.3.4.5 USB Device Path
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Usb {
    pub parent_port:    u8,
    pub interface:      u8,
}

// 10.3.4.11 MAC Address Device Path
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacAddress {
    /// Padded with zeros past the address length of the interface type.
    pub address:        [u8; 32],
    /// RFC 3232 network interface type.
    pub if_type:        u8,
}

impl MacAddress {
    pub fn address_bytes(&self) -> &[u8] {
        match self.if_type {
            0 | 1 => &self.address[..6],
            _ => &self.address,
        }
    }
}

// 10.3.4.6 SATA Device Path
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sata {
    pub hba_port:               u16,
    pub port_multiplier_port:   u16,
    pub lun:                    u16,
}

// 10.3.4.23 Uniform Resource Identifiers (URI) Device Path. The body is the
// URI text with no terminator, kept as found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Uri {
    pub uri:            Vec<u8>,
}

impl Uri {
    pub fn new(uri: &str) -> Self {
        Self { uri: uri.as_bytes().to_vec() }
    }
}

pub const MBR_TYPE_PCAT: u8 = 1;
pub const MBR_TYPE_EFI_PARTITION_TABLE_HEADER: u8 = 2;

pub const SIGNATURE_TYPE_NONE: u8 = 0;
pub const SIGNATURE_TYPE_MBR: u8 = 1;
pub const SIGNATURE_TYPE_GUID: u8 = 2;

// 10.3.5.1 Hard Drive Media Device Path
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HardDrive {
    pub partition_number:       u32,
    /// Starting LBA of the partition.
    pub partition_start:        u64,
    /// Size of the partition in logical blocks.
    pub partition_size:         u64,
    /// A GPT partition GUID, or an MBR signature in the first four bytes
    /// with the rest zeroed, depending on `signature_type`.
    pub partition_signature:    EfiGuid,
    pub partition_format:       u8,
    pub signature_type:         u8,
}

impl HardDrive {
    pub fn mbr_signature(&self) -> Option<u32> {
        match self.signature_type {
            SIGNATURE_TYPE_MBR => Some(self.partition_signature.data1()),
            _ => None,
        }
    }

    pub fn partition_guid(&self) -> Option<EfiGuid> {
        match self.signature_type {
            SIGNATURE_TYPE_GUID => Some(self.partition_signature),
            _ => None,
        }
    }
}

// 10.3.5.2 CD-ROM Media Device Path
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CdRom {
    pub boot_entry:             u32,
    pub partition_start:        u64,
    pub partition_size:         u64,
}

// 10.3.5.4 File Path Media Device Path. Units are kept exactly as stored,
// including the terminator when the record has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePath {
    pub path_name:      Vec<u16>,
}

impl FilePath {
    /// A terminated path, the form firmware writes.
    pub fn new(path: &str) -> Self {
        let mut path_name = strings::to_utf16(path);
        path_name.push(0);
        Self { path_name }
    }

    pub fn path(&self) -> String {
        strings::utf16_to_string(&self.path_name)
    }
}

// 10.3.7 BIOS Boot Specification Device Path
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BiosBootSpec {
    pub device_type:    u16,
    pub status_flag:    u16,
    #[br(parse_with = strings::read_asciiz)]
    #[bw(write_with = strings::write_asciiz)]
    pub description:    Vec<u8>,
}

impl BiosBootSpec {
    pub fn new(device_type: u16, description: &str, status_flag: u16) -> Self {
        Self {
            device_type,
            status_flag,
            description: description.as_bytes().to_vec(),
        }
    }
}

/// Any record whose tag has no registered decoder. The body is carried
/// verbatim so it re-encodes to the bytes it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unrecognized {
    pub device_type:    u8,
    pub sub_type:       u8,
    pub data:           Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DevicePathNode {
    Pci(Pci),
    Acpi(Acpi),
    Usb(Usb),
    MacAddress(MacAddress),
    Sata(Sata),
    Uri(Uri),
    HardDrive(HardDrive),
    CdRom(CdRom),
    FilePath(FilePath),
    /// PIWG firmware file, named by its file GUID.
    FirmwareFile(EfiGuid),
    /// PIWG firmware volume, named by its volume GUID.
    FirmwareVolume(EfiGuid),
    BiosBootSpec(BiosBootSpec),
    /// Separates the instances of a multi-instance path.
    EndInstance,
    Unrecognized(Unrecognized),
}

impl DevicePathNode {
    /// The (type, sub-type) pair this node is written with.
    pub fn tag(&self) -> (u8, u8) {
        use DevicePathType as T;

        match self {
            DevicePathNode::Pci(_) => (T::Hardware as u8, HW_PCI),
            DevicePathNode::Acpi(_) => (T::Acpi as u8, ACPI_ACPI),
            DevicePathNode::Usb(_) => (T::Messaging as u8, MSG_USB),
            DevicePathNode::MacAddress(_) =>
                (T::Messaging as u8, MSG_MAC_ADDRESS),
            DevicePathNode::Sata(_) => (T::Messaging as u8, MSG_SATA),
            DevicePathNode::Uri(_) => (T::Messaging as u8, MSG_URI),
            DevicePathNode::HardDrive(_) =>
                (T::Media as u8, MEDIA_HARD_DRIVE),
            DevicePathNode::CdRom(_) => (T::Media as u8, MEDIA_CDROM),
            DevicePathNode::FilePath(_) => (T::Media as u8, MEDIA_FILE_PATH),
            DevicePathNode::FirmwareFile(_) =>
                (T::Media as u8, MEDIA_PIWG_FIRMWARE_FILE),
            DevicePathNode::FirmwareVolume(_) =>
                (T::Media as u8, MEDIA_PIWG_FIRMWARE_VOLUME),
            DevicePathNode::BiosBootSpec(_) => (T::Bios as u8, BBS_BBS),
            DevicePathNode::EndInstance =>
                (T::End as u8, END_INSTANCE_SUBTYPE),
            DevicePathNode::Unrecognized(u) => (u.device_type, u.sub_type),
        }
    }

    pub fn body_len(&self) -> usize {
        match self {
            DevicePathNode::Pci(_) | DevicePathNode::Usb(_) => 2,
            DevicePathNode::Acpi(_) => 8,
            DevicePathNode::MacAddress(_) => 33,
            DevicePathNode::Sata(_) => 6,
            DevicePathNode::Uri(u) => u.uri.len(),
            DevicePathNode::HardDrive(_) => 38,
            DevicePathNode::CdRom(_) => 20,
            DevicePathNode::FilePath(p) => p.path_name.len() * 2,
            DevicePathNode::FirmwareFile(_)
            | DevicePathNode::FirmwareVolume(_) => 16,
            DevicePathNode::BiosBootSpec(b) =>
                4 + strings::asciiz_len(&b.description),
            DevicePathNode::EndInstance => 0,
            DevicePathNode::Unrecognized(u) => u.data.len(),
        }
    }

    /// The header this node is written with. The length is always derived
    /// from the current body; it saturates at `u16::MAX` for bodies too
    /// large to encode, which `write_to` rejects.
    pub fn header(&self) -> Header {
        let (device_type, sub_type) = self.tag();
        let length = u16::try_from(Header::SIZE + self.body_len())
            .unwrap_or(u16::MAX);
        Header { device_type, sub_type, length }
    }

    fn write_body<W: Write + Seek>(&self, w: &mut W) -> BinResult<()> {
        match self {
            DevicePathNode::Pci(n) => w.write_le(n),
            DevicePathNode::Acpi(n) => w.write_le(n),
            DevicePathNode::Usb(n) => w.write_le(n),
            DevicePathNode::MacAddress(n) => w.write_le(n),
            DevicePathNode::Sata(n) => w.write_le(n),
            DevicePathNode::Uri(n) => Ok(w.write_all(&n.uri)?),
            DevicePathNode::HardDrive(n) => w.write_le(n),
            DevicePathNode::CdRom(n) => w.write_le(n),
            DevicePathNode::FilePath(n) => w.write_le(&n.path_name),
            DevicePathNode::FirmwareFile(g)
            | DevicePathNode::FirmwareVolume(g) => w.write_le(g),
            DevicePathNode::BiosBootSpec(n) => w.write_le(n),
            DevicePathNode::EndInstance => Ok(()),
            DevicePathNode::Unrecognized(n) => Ok(w.write_all(&n.data)?),
        }
    }

    /// Writes header and body, returning the number of bytes written.
    /// `index` is the node's position in its list, for error context.
    pub fn write_to<W: Write + Seek>(
        &self, writer: &mut W, index: usize,
    ) -> Result<u64> {
        let location = Location::Node(index);
        let (device_type, sub_type) = self.tag();
        // The end-of-entire-path record is framing; written inside a list
        // it would cut the list short when read back.
        if device_type == DevicePathType::End as u8
            && sub_type == END_ENTIRE_SUBTYPE
        {
            return Err(Error::UnsupportedVariantBody {
                location,
                device_type,
                sub_type,
                message: "end of entire device path is not a node".to_string(),
            });
        }

        let mut body = Cursor::new(Vec::with_capacity(self.body_len()));
        self.write_body(&mut body)
            .map_err(|source| Error::Io { location, source })?;
        let body = body.into_inner();

        let total = Header::SIZE + body.len();
        let length = u16::try_from(total)
            .map_err(|_| Error::LengthMismatch {
                location,
                declared: u16::MAX as u64,
                actual: total as u64,
            })?;
        writer.write_le(&Header { device_type, sub_type, length })
            .map_err(|source| Error::Io { location, source })?;
        writer.write_all(&body).map_err(|e| Error::io(e, location))?;
        Ok(total as u64)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut c = Cursor::new(Vec::new());
        self.write_to(&mut c, 0)?;
        Ok(c.into_inner())
    }

    /// Canonical text form of this node, derived from its fields only.
    pub fn describe(&self) -> String {
        match self {
            DevicePathNode::Pci(n) =>
                format!("Pci(0x{:x},0x{:x})", n.device, n.function),
            DevicePathNode::Acpi(n) => describe_acpi(n),
            DevicePathNode::Usb(n) =>
                format!("USB(0x{:x},0x{:x})", n.parent_port, n.interface),
            DevicePathNode::MacAddress(n) =>
                format!("MAC({},{})",
                    strings::hex_upper(n.address_bytes()), n.if_type),
            DevicePathNode::Sata(n) =>
                format!("Sata(0x{:x},0x{:x},0x{:x})",
                    n.hba_port, n.port_multiplier_port, n.lun),
            DevicePathNode::Uri(n) =>
                format!("Uri({})", strings::ascii_to_string(&n.uri)),
            DevicePathNode::HardDrive(n) => describe_hard_drive(n),
            DevicePathNode::CdRom(n) =>
                format!("CDROM(0x{:x},0x{:x},0x{:x})",
                    n.boot_entry, n.partition_start, n.partition_size),
            DevicePathNode::FilePath(n) => format!("File({})", n.path()),
            DevicePathNode::FirmwareFile(g) => format!("FvFile({:X})", g),
            DevicePathNode::FirmwareVolume(g) => format!("Fv({:X})", g),
            DevicePathNode::BiosBootSpec(n) =>
                format!("BBS({},\"{}\",{})", n.device_type,
                    strings::ascii_to_string(&n.description), n.status_flag),
            DevicePathNode::EndInstance => ",".to_string(),
            DevicePathNode::Unrecognized(n) =>
                format!("Path({},{},{})", n.device_type, n.sub_type,
                    strings::hex_upper(&n.data)),
        }
    }
}

fn describe_acpi(n: &Acpi) -> String {
    if n.hid & 0xffff != EISA_PNP_ID {
        return format!("Acpi(0x{:08X},0x{:x})", n.hid, n.uid);
    }
    match n.hid >> 16 {
        0x0a03 => format!("PciRoot(0x{:x})", n.uid),
        0x0a08 => format!("PcieRoot(0x{:x})", n.uid),
        pnp => format!("Acpi(PNP{:04X},0x{:x})", pnp, n.uid),
    }
}

fn describe_hard_drive(n: &HardDrive) -> String {
    let signature = match n.signature_type {
        SIGNATURE_TYPE_MBR =>
            format!("MBR,0x{:08x}", n.partition_signature.data1()),
        SIGNATURE_TYPE_GUID => format!("GPT,{:X}", n.partition_signature),
        other => format!("{},0", other),
    };
    format!("HD({},{},0x{:x},0x{:x})", n.partition_number, signature,
        n.partition_start, n.partition_size)
}

impl fmt::Display for DevicePathNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

// Body decoders for the default registry. Each is handed a cursor over
// exactly the record body.

pub(crate) fn decode_pci(c: &mut Cursor<&[u8]>) -> BinResult<DevicePathNode> {
    Ok(DevicePathNode::Pci(c.read_le()?))
}

pub(crate) fn decode_acpi(c: &mut Cursor<&[u8]>) -> BinResult<DevicePathNode> {
    Ok(DevicePathNode::Acpi(c.read_le()?))
}

pub(crate) fn decode_usb(c: &mut Cursor<&[u8]>) -> BinResult<DevicePathNode> {
    Ok(DevicePathNode::Usb(c.read_le()?))
}

pub(crate) fn decode_mac(c: &mut Cursor<&[u8]>) -> BinResult<DevicePathNode> {
    Ok(DevicePathNode::MacAddress(c.read_le()?))
}

pub(crate) fn decode_sata(c: &mut Cursor<&[u8]>) -> BinResult<DevicePathNode> {
    Ok(DevicePathNode::Sata(c.read_le()?))
}

pub(crate) fn decode_uri(c: &mut Cursor<&[u8]>) -> BinResult<DevicePathNode> {
    let mut uri = Vec::new();
    c.read_to_end(&mut uri)?;
    Ok(DevicePathNode::Uri(Uri { uri }))
}

pub(crate) fn decode_hard_drive(
    c: &mut Cursor<&[u8]>,
) -> BinResult<DevicePathNode> {
    Ok(DevicePathNode::HardDrive(c.read_le()?))
}

pub(crate) fn decode_cdrom(c: &mut Cursor<&[u8]>) -> BinResult<DevicePathNode> {
    Ok(DevicePathNode::CdRom(c.read_le()?))
}

pub(crate) fn decode_file_path(
    c: &mut Cursor<&[u8]>,
) -> BinResult<DevicePathNode> {
    let start = c.position();
    let mut raw = Vec::new();
    c.read_to_end(&mut raw)?;
    if raw.len() % 2 != 0 {
        return Err(binrw::Error::AssertFail {
            pos: start,
            message: format!("file path body of {} bytes is not UTF-16",
                raw.len()),
        });
    }
    let path_name = raw
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect();
    Ok(DevicePathNode::FilePath(FilePath { path_name }))
}

pub(crate) fn decode_firmware_file(
    c: &mut Cursor<&[u8]>,
) -> BinResult<DevicePathNode> {
    Ok(DevicePathNode::FirmwareFile(c.read_le()?))
}

pub(crate) fn decode_firmware_volume(
    c: &mut Cursor<&[u8]>,
) -> BinResult<DevicePathNode> {
    Ok(DevicePathNode::FirmwareVolume(c.read_le()?))
}

pub(crate) fn decode_bbs(c: &mut Cursor<&[u8]>) -> BinResult<DevicePathNode> {
    Ok(DevicePathNode::BiosBootSpec(c.read_le()?))
}

pub(crate) fn decode_end_instance(
    _c: &mut Cursor<&[u8]>,
) -> BinResult<DevicePathNode> {
    Ok(DevicePathNode::EndInstance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hard_drive() -> HardDrive {
        HardDrive {
            partition_number: 1,
            partition_start: 0x800,
            partition_size: 0x32000,
            partition_signature: EfiGuid::from_bytes([0xff; 16]),
            partition_format: MBR_TYPE_EFI_PARTITION_TABLE_HEADER,
            signature_type: SIGNATURE_TYPE_GUID,
        }
    }

    #[test]
    fn hard_drive_text_and_layout() {
        let node = DevicePathNode::HardDrive(hard_drive());
        assert_eq!(node.describe(),
            "HD(1,GPT,FFFFFFFF-FFFF-FFFF-FFFF-FFFFFFFFFFFF,0x800,0x32000)");
        assert_eq!(node.header(), Header::new(4, 1, 42));

        let bytes = node.encode().unwrap();
        assert_eq!(bytes.len(), 42);
        assert_eq!(&bytes[..4], &[0x04, 0x01, 0x2a, 0x00]);
        assert_eq!(&bytes[4..8], &[0x01, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[8..16], &0x800u64.to_le_bytes());
        assert_eq!(&bytes[16..24], &0x32000u64.to_le_bytes());
        assert_eq!(&bytes[24..40], &[0xff; 16]);
        assert_eq!(&bytes[40..], &[0x02, 0x02]);
    }

    #[test]
    fn hard_drive_mbr_text() {
        let mut hd = hard_drive();
        hd.partition_format = MBR_TYPE_PCAT;
        hd.signature_type = SIGNATURE_TYPE_MBR;
        hd.partition_signature = EfiGuid::from_bytes(
            [0x78, 0x56, 0x34, 0x12, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(hd.mbr_signature(), Some(0x1234_5678));
        assert_eq!(hd.partition_guid(), None);
        assert_eq!(DevicePathNode::HardDrive(hd).describe(),
            "HD(1,MBR,0x12345678,0x800,0x32000)");

        hd.signature_type = SIGNATURE_TYPE_NONE;
        assert_eq!(DevicePathNode::HardDrive(hd).describe(),
            "HD(1,0,0,0x800,0x32000)");
    }

    #[test]
    fn file_path_is_terminated() {
        let node = DevicePathNode::FilePath(
            FilePath::new("EFI\\LINUX\\GRUB.EFI"));
        assert_eq!(node.describe(), "File(EFI\\LINUX\\GRUB.EFI)");
        assert_eq!(node.header().length, 42);
        let bytes = node.encode().unwrap();
        assert_eq!(&bytes[bytes.len() - 2..], &[0, 0]);
    }

    #[test]
    fn file_path_odd_body_rejected() {
        let body = [0x41u8, 0x00, 0x42];
        let err = decode_file_path(&mut Cursor::new(&body[..])).unwrap_err();
        assert!(matches!(err, binrw::Error::AssertFail { .. }));
    }

    #[test]
    fn bbs_text_and_length() {
        let node = DevicePathNode::BiosBootSpec(BiosBootSpec::new(5, "", 0));
        assert_eq!(node.describe(), "BBS(5,\"\",0)");
        assert_eq!(node.encode().unwrap(),
            vec![0x05, 0x01, 0x09, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn bbs_description_ends_at_nul() {
        let node = DevicePathNode::BiosBootSpec(BiosBootSpec::new(5, "a\0b", 0));
        assert_eq!(node.header().length, 4 + 4 + 2);
        let bytes = node.encode().unwrap();
        assert_eq!(bytes.len(), 10);
        assert_eq!(&bytes[8..], b"a\0");
    }

    #[test]
    fn end_entire_is_not_a_node() {
        let node = DevicePathNode::Unrecognized(Unrecognized {
            device_type: 0x7f,
            sub_type: 0xff,
            data: vec![],
        });
        let err = node.write_to(&mut Cursor::new(Vec::new()), 3).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVariantBody {
            location: Location::Node(3), device_type: 0x7f, sub_type: 0xff, ..
        }));
    }

    #[test]
    fn unrecognized_text() {
        let node = DevicePathNode::Unrecognized(Unrecognized {
            device_type: 128,
            sub_type: 1,
            data: vec![0x01, 0x23, 0x45, 0x67, 0x89],
        });
        assert_eq!(node.describe(), "Path(128,1,0123456789)");
        assert_eq!(node.header(), Header::new(128, 1, 9));

        let empty = DevicePathNode::Unrecognized(Unrecognized {
            device_type: 0x99,
            sub_type: 0x99,
            data: vec![],
        });
        assert_eq!(empty.describe(), "Path(153,153,)");
        assert_eq!(empty.encode().unwrap(), vec![0x99, 0x99, 0x04, 0x00]);
    }

    #[test]
    fn messaging_text() {
        let mut address = [0u8; 32];
        address[..6].copy_from_slice(&[0x52, 0x54, 0x00, 0x12, 0x34, 0x56]);
        let mac = DevicePathNode::MacAddress(MacAddress { address, if_type: 1 });
        assert_eq!(mac.describe(), "MAC(525400123456,1)");
        assert_eq!(mac.header().length, 37);

        let uri = DevicePathNode::Uri(Uri::new("http://boot/efi.img"));
        assert_eq!(uri.describe(), "Uri(http://boot/efi.img)");
        assert_eq!(uri.header().length, 4 + 19);

        let sata = DevicePathNode::Sata(Sata {
            hba_port: 0,
            port_multiplier_port: 0xffff,
            lun: 0,
        });
        assert_eq!(sata.describe(), "Sata(0x0,0xffff,0x0)");
        assert_eq!(DevicePathNode::Usb(Usb { parent_port: 2, interface: 0 })
            .describe(), "USB(0x2,0x0)");
    }

    #[test]
    fn hardware_and_acpi_text() {
        let pci = DevicePathNode::Pci(Pci { function: 0, device: 0x1f });
        assert_eq!(pci.describe(), "Pci(0x1f,0x0)");
        assert_eq!(pci.encode().unwrap(), vec![1, 1, 6, 0, 0x00, 0x1f]);

        let root = Acpi { hid: 0x0a03_41d0, uid: 0 };
        assert_eq!(DevicePathNode::Acpi(root).describe(), "PciRoot(0x0)");
        let pcie = Acpi { hid: 0x0a08_41d0, uid: 1 };
        assert_eq!(DevicePathNode::Acpi(pcie).describe(), "PcieRoot(0x1)");
        let floppy = Acpi { hid: 0x0604_41d0, uid: 0 };
        assert_eq!(DevicePathNode::Acpi(floppy).describe(),
            "Acpi(PNP0604,0x0)");
        let other = Acpi { hid: 0x1234_5678, uid: 2 };
        assert_eq!(DevicePathNode::Acpi(other).describe(),
            "Acpi(0x12345678,0x2)");
    }

    #[test]
    fn media_guid_text() {
        let guid: EfiGuid = "7c04a583-9e3e-4f1c-ad65-e05268d0b4d1"
            .parse().unwrap();
        assert_eq!(DevicePathNode::FirmwareFile(guid).describe(),
            "FvFile(7C04A583-9E3E-4F1C-AD65-E05268D0B4D1)");
        assert_eq!(DevicePathNode::FirmwareVolume(guid).describe(),
            "Fv(7C04A583-9E3E-4F1C-AD65-E05268D0B4D1)");
        let cd = CdRom { boot_entry: 1, partition_start: 0x10, partition_size: 0x20 };
        assert_eq!(DevicePathNode::CdRom(cd).describe(),
            "CDROM(0x1,0x10,0x20)");
    }

    #[test]
    fn oversized_body_rejected() {
        let node = DevicePathNode::Unrecognized(Unrecognized {
            device_type: 1,
            sub_type: 0x80,
            data: vec![0; u16::MAX as usize],
        });
        assert_eq!(node.header().length, u16::MAX);
        let err = node.encode().unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { .. }));
    }

    #[test]
    fn describe_ignores_source_bytes() {
        // Two distinct encodings of the same path text decode to different
        // nodes, but identical fields always render identically.
        let a = DevicePathNode::FilePath(FilePath::new("\\a.efi"));
        let b = a.clone();
        assert_eq!(a.describe(), b.describe());
        let unterminated = DevicePathNode::FilePath(FilePath {
            path_name: strings::to_utf16("\\a.efi"),
        });
        assert_eq!(unterminated.describe(), a.describe());
        assert_ne!(unterminated.encode().unwrap(), a.encode().unwrap());
    }
}

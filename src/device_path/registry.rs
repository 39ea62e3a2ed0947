use std::collections::HashMap;
use std::fmt;

use binrw::io::Cursor;
use binrw::BinResult;
use log::debug;

use super::node::{self, DevicePathNode, Unrecognized};
use super::*;
use crate::error::{Error, Location, Result};

/// Decodes one record body. The cursor covers exactly the body bytes, so a
/// decoder can never read into the next record. The node it returns must
/// encode under the tag it was registered for.
pub type DecodeFn = fn(&mut Cursor<&[u8]>) -> BinResult<DevicePathNode>;

/// Maps exact (type, sub-type) pairs to body decoders. Tags with no entry
/// decode as [`Unrecognized`] records.
#[derive(Clone)]
pub struct Registry {
    decoders: HashMap<(u8, u8), DecodeFn>,
}

lazy_static! {
    static ref DEFAULT_REGISTRY: Registry = Registry::default();
}

/// The built-in registry, shared read-only by every parse that does not
/// supply its own.
pub fn default_registry() -> &'static Registry {
    &DEFAULT_REGISTRY
}

impl Registry {
    /// A registry that knows no tags; everything decodes as unrecognized.
    pub fn empty() -> Self {
        Self { decoders: HashMap::new() }
    }

    /// Adds or replaces the decoder for a tag, returning the one it
    /// replaced.
    pub fn register(
        &mut self, device_type: u8, sub_type: u8, decoder: DecodeFn,
    ) -> Option<DecodeFn> {
        self.decoders.insert((device_type, sub_type), decoder)
    }

    pub fn lookup(&self, device_type: u8, sub_type: u8) -> Option<DecodeFn> {
        self.decoders.get(&(device_type, sub_type)).copied()
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decodes the body that followed `header`. `body` must be exactly
    /// `header.length - 4` bytes; `offset` is where the body starts in the
    /// enclosing input and `index` the record's position in its list.
    pub fn decode(
        &self, header: Header, body: &[u8], offset: u64, index: usize,
    ) -> Result<DevicePathNode> {
        let location = Location::Node(index);
        let tag = (header.device_type, header.sub_type);

        let decoder = match self.lookup(tag.0, tag.1) {
            Some(d) => d,
            None => {
                debug!("device path {:#x}/{:#x} has no decoder, keeping \
                    {} raw bytes", tag.0, tag.1, body.len());
                return Ok(DevicePathNode::Unrecognized(Unrecognized {
                    device_type: tag.0,
                    sub_type: tag.1,
                    data: body.to_vec(),
                }));
            }
        };

        let mut c = Cursor::new(body);
        let node = decoder(&mut c).map_err(|e|
            Error::from_binrw(e, location, offset + c.position(), tag))?;

        if node.tag() != tag {
            let (t, s) = node.tag();
            return Err(Error::UnsupportedVariantBody {
                location,
                device_type: tag.0,
                sub_type: tag.1,
                message: format!("decoded node would encode as {:#x}/{:#x}",
                    t, s),
            });
        }

        // A known layout that leaves bytes unread would not re-encode to
        // the declared length.
        let used = c.position();
        if used != body.len() as u64 {
            return Err(Error::LengthMismatch {
                location,
                declared: header.length as u64,
                actual: Header::SIZE as u64 + used,
            });
        }
        Ok(node)
    }
}

impl Default for Registry {
    fn default() -> Self {
        use DevicePathType as T;

        let mut r = Registry::empty();
        r.register(T::Hardware as u8, HW_PCI, node::decode_pci);
        r.register(T::Acpi as u8, ACPI_ACPI, node::decode_acpi);
        r.register(T::Messaging as u8, MSG_USB, node::decode_usb);
        r.register(T::Messaging as u8, MSG_MAC_ADDRESS, node::decode_mac);
        r.register(T::Messaging as u8, MSG_SATA, node::decode_sata);
        r.register(T::Messaging as u8, MSG_URI, node::decode_uri);
        r.register(T::Media as u8, MEDIA_HARD_DRIVE, node::decode_hard_drive);
        r.register(T::Media as u8, MEDIA_CDROM, node::decode_cdrom);
        r.register(T::Media as u8, MEDIA_FILE_PATH, node::decode_file_path);
        r.register(T::Media as u8, MEDIA_PIWG_FIRMWARE_FILE,
            node::decode_firmware_file);
        r.register(T::Media as u8, MEDIA_PIWG_FIRMWARE_VOLUME,
            node::decode_firmware_volume);
        r.register(T::Bios as u8, BBS_BBS, node::decode_bbs);
        r.register(T::End as u8, END_INSTANCE_SUBTYPE,
            node::decode_end_instance);
        r
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut tags: Vec<&(u8, u8)> = self.decoders.keys().collect();
        tags.sort();
        f.debug_struct("Registry").field("tags", &tags).finish()
    }
}

//! Codec for UEFI boot configuration structures: device paths and the load
//! options (`Boot####`, `Driver####`, ...) that embed them.
//!
//! Decoding is lossless. Records with tags the [`Registry`] does not know
//! are kept as raw bytes and written back unchanged, and every length field
//! is recomputed from the encoded contents when writing.
//!
//! ```
//! use efiboot::LoadOption;
//!
//! let value = [
//!     0x01, 0x00, 0x00, 0x00,             // attributes
//!     0x04, 0x00,                         // file path list length
//!     0x41, 0x00, 0x00, 0x00,             // "A"
//!     0x7f, 0xff, 0x04, 0x00,             // end of device path
//! ];
//! let opt = LoadOption::parse(&value).unwrap();
//! assert_eq!(opt.description(), "A");
//! assert_eq!(opt.encode().unwrap(), value);
//! ```

#[macro_use]
extern crate lazy_static;

pub mod device_path;
pub mod error;
pub mod guid;
pub mod load_option;
pub mod strings;

pub use device_path::{DevicePathList, DevicePathNode, Header, Registry};
pub use error::{Error, Location, Result};
pub use guid::EfiGuid;
pub use load_option::{BootTarget, LoadOption};

use std::fmt;
use std::slice;

use binrw::io::{Cursor, Seek, Write};
use binrw::{BinReaderExt, BinWriterExt};
use log::{debug, trace};
use serde::Serialize;

use super::node::DevicePathNode;
use super::registry::{default_registry, Registry};
use super::{DevicePathType, Header, END_ENTIRE_SUBTYPE};
use crate::error::{Error, Location, Result};

const END_ENTIRE: Header = Header {
    device_type: DevicePathType::End as u8,
    sub_type: END_ENTIRE_SUBTYPE,
    length: Header::SIZE as u16,
};

/// An ordered device path. The closing end-of-entire-path record is not
/// held here: parsing consumes it and encoding always writes exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DevicePathList {
    nodes: Vec<DevicePathNode>,
}

impl DevicePathList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[DevicePathNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut Vec<DevicePathNode> {
        &mut self.nodes
    }

    pub fn push(&mut self, node: DevicePathNode) {
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, DevicePathNode> {
        self.nodes.iter()
    }

    /// Parses records from the start of `data` with the built-in registry
    /// up to and including the end-of-entire-path record. Returns the list
    /// and the number of bytes consumed; anything after the sentinel is
    /// left alone.
    pub fn parse(data: &[u8]) -> Result<(Self, usize)> {
        Self::parse_with(default_registry(), data)
    }

    pub fn parse_with(
        registry: &Registry, data: &[u8],
    ) -> Result<(Self, usize)> {
        Self::parse_at(registry, data, 0)
    }

    /// `base` is the offset of `data` within the caller's input and only
    /// feeds error reports.
    pub(crate) fn parse_at(
        registry: &Registry, data: &[u8], base: u64,
    ) -> Result<(Self, usize)> {
        let mut c = Cursor::new(data);
        let mut nodes = Vec::new();

        loop {
            let index = nodes.len();
            let location = Location::Node(index);
            let start = c.position() as usize;

            if data.len() - start < Header::SIZE {
                return Err(Error::TruncatedInput {
                    location,
                    offset: base + start as u64,
                });
            }
            let header: Header = c.read_le()
                .map_err(|source| Error::Io { location, source })?;

            if header.is_end_entire() {
                if header.length as usize != Header::SIZE {
                    return Err(Error::LengthMismatch {
                        location,
                        declared: header.length as u64,
                        actual: Header::SIZE as u64,
                    });
                }
                break;
            }

            let body_len = header.body_len()
                .ok_or(Error::LengthMismatch {
                    location,
                    declared: header.length as u64,
                    actual: Header::SIZE as u64,
                })?;
            let body_start = start + Header::SIZE;
            if data.len() - body_start < body_len {
                return Err(Error::TruncatedInput {
                    location,
                    offset: base + body_start as u64,
                });
            }

            let body = &data[body_start..body_start + body_len];
            let node = registry.decode(
                header, body, base + body_start as u64, index)?;
            trace!("node #{} {:#x}/{:#x} length {}: {}", index,
                header.device_type, header.sub_type, header.length, node);
            nodes.push(node);
            c.set_position((body_start + body_len) as u64);
        }

        let consumed = c.position() as usize;
        debug!("parsed device path of {} nodes, {} bytes", nodes.len(),
            consumed);
        Ok((Self { nodes }, consumed))
    }

    /// Size of the encoded list including the closing sentinel.
    pub fn encoded_len(&self) -> usize {
        self.nodes.iter()
            .map(|n| Header::SIZE + n.body_len())
            .sum::<usize>() + Header::SIZE
    }

    /// Writes every node followed by one end-of-entire-path record and
    /// returns the number of bytes written.
    pub fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<u64> {
        let mut written = 0;
        for (index, node) in self.nodes.iter().enumerate() {
            written += node.write_to(writer, index)?;
        }
        writer.write_le(&END_ENTIRE).map_err(|source| Error::Io {
            location: Location::Node(self.nodes.len()),
            source,
        })?;
        Ok(written + Header::SIZE as u64)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut c = Cursor::new(Vec::with_capacity(self.encoded_len()));
        self.write_to(&mut c)?;
        Ok(c.into_inner())
    }

    pub fn is_multi_instance(&self) -> bool {
        self.nodes.iter().any(|n| matches!(n, DevicePathNode::EndInstance))
    }

    /// The nodes of each instance, split at end-of-instance records.
    pub fn instances(&self) -> impl Iterator<Item = &[DevicePathNode]> {
        self.nodes.split(|n| matches!(n, DevicePathNode::EndInstance))
    }

    /// Text of every node in order. Instance separators are left out; see
    /// [`instance_texts`](Self::instance_texts).
    pub fn node_texts(&self) -> Vec<String> {
        self.nodes.iter()
            .filter(|n| !matches!(n, DevicePathNode::EndInstance))
            .map(DevicePathNode::describe)
            .collect()
    }

    /// One `/`-joined text per instance. An empty list has no instances.
    pub fn instance_texts(&self) -> Vec<String> {
        if self.nodes.is_empty() {
            return Vec::new();
        }
        self.instances()
            .map(|instance| instance.iter()
                .map(DevicePathNode::describe)
                .collect::<Vec<String>>()
                .join("/"))
            .collect()
    }
}

impl fmt::Display for DevicePathList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.instance_texts().join(","))
    }
}

impl From<Vec<DevicePathNode>> for DevicePathList {
    fn from(nodes: Vec<DevicePathNode>) -> Self {
        Self { nodes }
    }
}

impl FromIterator<DevicePathNode> for DevicePathList {
    fn from_iter<I: IntoIterator<Item = DevicePathNode>>(iter: I) -> Self {
        Self { nodes: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a DevicePathList {
    type Item = &'a DevicePathNode;
    type IntoIter = slice::Iter<'a, DevicePathNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

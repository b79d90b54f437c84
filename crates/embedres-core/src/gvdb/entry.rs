//! Decoded bundle entries.

use super::Endian;
use crate::config::FormatConfig;
use crate::error::{EmbedError, Result};
use bytes::Bytes;
use serde::Serialize;

/// Per-leaf flags recorded by the packer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct ResourceFlags(pub u32);

impl ResourceFlags {
    pub const NONE: ResourceFlags = ResourceFlags(0);
    /// Payload is a zlib stream that inflates to the leaf's `size`.
    pub const COMPRESSED: ResourceFlags = ResourceFlags(1 << 0);

    pub fn is_compressed(self) -> bool {
        self.0 & Self::COMPRESSED.0 != 0
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

/// A node of the bundle's virtual directory tree.
#[derive(Debug, Clone)]
pub enum Entry {
    /// Child names, relative to this directory (`"dock/"`, `"Application.css"`).
    Directory { children: Vec<String> },
    Leaf(Leaf),
}

/// A named payload as stored in the bundle.
#[derive(Debug, Clone)]
pub struct Leaf {
    /// Size of the original, uncompressed content.
    pub size: u32,
    pub flags: ResourceFlags,
    /// Stored bytes; compressed when `flags` says so.
    pub data: Bytes,
}

impl Leaf {
    /// Decode a serialized `v` value holding a `(uuay)` tuple.
    ///
    /// A variant is laid out as `child bytes | 0x00 | type string`, so the
    /// type string starts after the last zero byte.
    pub(crate) fn parse(value: Bytes, endian: Endian) -> Result<Self> {
        let separator = value
            .iter()
            .rposition(|&b| b == 0)
            .ok_or_else(|| EmbedError::invalid_format("leaf value has no type string"))?;

        let type_string = &value[separator + 1..];
        if type_string != FormatConfig::LEAF_TYPE.as_bytes() {
            return Err(EmbedError::invalid_format(format!(
                "leaf value has type {:?}, expected {}",
                String::from_utf8_lossy(type_string),
                FormatConfig::LEAF_TYPE
            )));
        }

        let child = value.slice(..separator);
        let (Some(size), Some(flags)) = (endian.u32_at(&child, 0), endian.u32_at(&child, 4))
        else {
            return Err(EmbedError::invalid_format("leaf tuple is truncated"));
        };

        Ok(Self {
            size,
            flags: ResourceFlags(flags),
            data: child.slice(8..),
        })
    }
}

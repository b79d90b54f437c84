//! Reader for the packed bundle format (GVariant database).
//!
//! A bundle is a single hash table mapping absolute paths to entries:
//!
//! ```text
//! header    "GVariant" | version u32 | options u32 | root {start u32, end u32}
//! table     bloom_hdr u32 | n_buckets u32 | bloom[n] | buckets[n] | items[..]
//! item      hash u32 | parent u32 | key_start u32 | key_size u16 | type u8 | pad u8 | value {start, end}
//! ```
//!
//! Keys are stored relative to their parent item, so a full path is the
//! concatenation of the parent chain. The reader never copies the bundle:
//! every slice it hands out is a view into the original [`Bytes`].

mod entry;
mod hash;

pub use entry::{Entry, Leaf, ResourceFlags};
pub use hash::djb_hash;

use crate::config::FormatConfig;
use crate::error::{EmbedError, Result};
use bytes::Bytes;
use std::ops::Range;

/// Byte order of a bundle, detected from its signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    fn u32_at(self, data: &[u8], offset: usize) -> Option<u32> {
        let bytes: [u8; 4] = data.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
        Some(match self {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        })
    }

    fn u16_at(self, data: &[u8], offset: usize) -> Option<u16> {
        let bytes: [u8; 2] = data.get(offset..offset.checked_add(2)?)?.try_into().ok()?;
        Some(match self {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        })
    }
}

/// One hash item, decoded on demand.
#[derive(Debug, Clone)]
struct HashItem {
    hash: u32,
    parent: u32,
    key: Range<usize>,
    kind: u8,
    value: Range<usize>,
}

/// The root hash table of a bundle.
#[derive(Debug, Clone)]
pub struct Table {
    data: Bytes,
    endian: Endian,
    bloom: Range<usize>,
    bloom_shift: u32,
    buckets: Range<usize>,
    items_start: usize,
    n_items: usize,
}

impl Table {
    /// Parse the header and root table. Items are decoded lazily.
    pub fn parse(data: Bytes) -> Result<Self> {
        if data.len() < FormatConfig::HEADER_SIZE {
            return Err(EmbedError::invalid_format(format!(
                "bundle is {} bytes, shorter than the {}-byte header",
                data.len(),
                FormatConfig::HEADER_SIZE
            )));
        }

        let endian = detect_endian(&data)?;
        let word = |offset| endian.u32_at(&data, offset).unwrap_or(0);

        let version = word(8);
        if version != FormatConfig::SUPPORTED_VERSION {
            return Err(EmbedError::UnsupportedVersion(version));
        }

        let root = pointer(word(16), word(20), data.len())?;
        if root.start % 4 != 0 {
            return Err(EmbedError::invalid_format("root table is not 4-byte aligned"));
        }
        if root.len() < FormatConfig::HASH_HEADER_SIZE {
            return Err(EmbedError::invalid_format("root table is truncated"));
        }

        let bloom_hdr = word(root.start);
        let n_bloom = (bloom_hdr & FormatConfig::BLOOM_COUNT_MASK) as usize;
        let bloom_shift = bloom_hdr >> FormatConfig::BLOOM_SHIFT_BITS;
        let n_buckets = word(root.start + 4) as usize;

        let bloom_start = root.start + FormatConfig::HASH_HEADER_SIZE;
        let buckets_start = n_bloom
            .checked_mul(4)
            .and_then(|len| bloom_start.checked_add(len))
            .ok_or_else(|| EmbedError::invalid_format("bloom filter overflows table"))?;
        let items_start = n_buckets
            .checked_mul(4)
            .and_then(|len| buckets_start.checked_add(len))
            .filter(|&end| end <= root.end)
            .ok_or_else(|| EmbedError::invalid_format("bucket array overflows table"))?;

        let n_items = (root.end - items_start) / FormatConfig::HASH_ITEM_SIZE;

        Ok(Self {
            data,
            endian,
            bloom: bloom_start..buckets_start,
            bloom_shift,
            buckets: buckets_start..items_start,
            items_start,
            n_items,
        })
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Number of hash items (directories and leaves).
    pub fn len(&self) -> usize {
        self.n_items
    }

    pub fn is_empty(&self) -> bool {
        self.n_items == 0
    }

    /// Look up a full path. Returns `None` for unknown keys.
    pub fn lookup(&self, key: &str) -> Result<Option<Entry>> {
        match self.find(key) {
            Some(index) => self.entry(index).map(Some),
            None => Ok(None),
        }
    }

    /// Full paths of every leaf in the table, sorted.
    pub fn leaf_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = (0..self.n_items)
            .filter_map(|index| {
                let item = self.item(index)?;
                (item.kind == FormatConfig::TYPE_VALUE)
                    .then(|| self.full_path(index))
                    .flatten()
            })
            .collect();
        paths.sort();
        paths
    }

    fn find(&self, key: &str) -> Option<usize> {
        let n_buckets = self.buckets.len() / 4;
        if n_buckets == 0 || self.n_items == 0 {
            return None;
        }

        let hash = djb_hash(key);
        if !self.bloom_contains(hash) {
            return None;
        }

        let bucket = (hash as usize) % n_buckets;
        let mut index = self.word(self.buckets.start + bucket * 4)? as usize;
        let last = if bucket == n_buckets - 1 {
            self.n_items
        } else {
            (self.word(self.buckets.start + (bucket + 1) * 4)? as usize).min(self.n_items)
        };

        while index < last {
            let item = self.item(index)?;
            if item.hash == hash && self.key_matches(item, key.as_bytes()) {
                return Some(index);
            }
            index += 1;
        }
        None
    }

    fn bloom_contains(&self, hash: u32) -> bool {
        let n_words = self.bloom.len() / 4;
        if n_words == 0 {
            return true;
        }

        let word_index = (hash as usize / 32) % n_words;
        let mask = (1u32 << (hash & 31)) | (1u32 << ((hash >> self.bloom_shift) & 31));
        self.word(self.bloom.start + word_index * 4)
            .is_some_and(|word| word & mask == mask)
    }

    /// Match `key` against the item's own key and then its parent chain,
    /// consuming the key from the end.
    fn key_matches(&self, item: HashItem, key: &[u8]) -> bool {
        let mut remaining = key.len();
        let mut current = item;

        // Each step consumes at least one byte or terminates, and a chain can
        // never be longer than the table.
        for _ in 0..=self.n_items {
            let Some(segment) = self.data.get(current.key.clone()) else {
                return false;
            };
            if segment.len() > remaining || &key[remaining - segment.len()..remaining] != segment {
                return false;
            }
            remaining -= segment.len();

            if current.parent == FormatConfig::NO_PARENT {
                return remaining == 0;
            }
            if remaining == 0 || segment.is_empty() {
                return false;
            }
            match self.item(current.parent as usize) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
        false
    }

    fn full_path(&self, index: usize) -> Option<String> {
        let mut segments = Vec::new();
        let mut current = self.item(index)?;

        for _ in 0..=self.n_items {
            segments.push(self.data.get(current.key.clone())?);
            if current.parent == FormatConfig::NO_PARENT {
                let bytes: Vec<u8> = segments.iter().rev().flat_map(|s| s.iter().copied()).collect();
                return String::from_utf8(bytes).ok();
            }
            current = self.item(current.parent as usize)?;
        }
        None
    }

    fn entry(&self, index: usize) -> Result<Entry> {
        let item = self
            .item(index)
            .ok_or_else(|| EmbedError::invalid_format(format!("hash item {index} out of range")))?;

        match item.kind {
            FormatConfig::TYPE_DIRECTORY => {
                let listing = self.data.slice(item.value.clone());
                if listing.len() % 4 != 0 {
                    return Err(EmbedError::invalid_format("directory listing is misaligned"));
                }
                let children = (0..listing.len() / 4)
                    .map(|i| {
                        let child = self.endian.u32_at(&listing, i * 4).unwrap_or(u32::MAX);
                        self.item(child as usize)
                            .and_then(|child| self.data.get(child.key))
                            .map(|name| String::from_utf8_lossy(name).into_owned())
                            .ok_or_else(|| {
                                EmbedError::invalid_format(format!(
                                    "directory lists missing item {child}"
                                ))
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Entry::Directory { children })
            }
            FormatConfig::TYPE_VALUE => {
                Leaf::parse(self.data.slice(item.value.clone()), self.endian).map(Entry::Leaf)
            }
            other => Err(EmbedError::invalid_format(format!(
                "unsupported item type {:?}",
                other as char
            ))),
        }
    }

    fn item(&self, index: usize) -> Option<HashItem> {
        if index >= self.n_items {
            return None;
        }
        let base = self.items_start + index * FormatConfig::HASH_ITEM_SIZE;
        let data = &self.data[..];

        let key_start = self.endian.u32_at(data, base + 8)? as usize;
        let key_size = self.endian.u16_at(data, base + 12)? as usize;
        let key = key_start..key_start.checked_add(key_size)?;
        let value = pointer(
            self.endian.u32_at(data, base + 16)?,
            self.endian.u32_at(data, base + 20)?,
            data.len(),
        )
        .ok()?;
        if key.end > data.len() {
            return None;
        }

        Some(HashItem {
            hash: self.endian.u32_at(data, base)?,
            parent: self.endian.u32_at(data, base + 4)?,
            key,
            kind: *data.get(base + 14)?,
            value,
        })
    }

    fn word(&self, offset: usize) -> Option<u32> {
        self.endian.u32_at(&self.data, offset)
    }
}

fn detect_endian(data: &[u8]) -> Result<Endian> {
    let sig0 = Endian::Little.u32_at(data, 0);
    let sig1 = Endian::Little.u32_at(data, 4);

    match (sig0, sig1) {
        (Some(FormatConfig::SIGNATURE_0), Some(FormatConfig::SIGNATURE_1)) => Ok(Endian::Little),
        (Some(a), Some(b))
            if a == FormatConfig::SIGNATURE_0.swap_bytes()
                && b == FormatConfig::SIGNATURE_1.swap_bytes() =>
        {
            Ok(Endian::Big)
        }
        _ => Err(EmbedError::invalid_format("bad signature")),
    }
}

fn pointer(start: u32, end: u32, len: usize) -> Result<Range<usize>> {
    let (start, end) = (start as usize, end as usize);
    if start > end || end > len {
        return Err(EmbedError::invalid_format(format!(
            "pointer {start}..{end} outside {len}-byte bundle"
        )));
    }
    Ok(start..end)
}

//! A parsed resource bundle and its path queries.

use crate::config::ResourceConfig;
use crate::error::{EmbedError, Result};
use crate::gvdb::{Entry, Leaf, ResourceFlags, Table};
use bytes::Bytes;
use flate2::read::ZlibDecoder;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Size and flags of a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceInfo {
    /// Uncompressed size in bytes.
    pub size: usize,
    pub flags: ResourceFlags,
}

/// One parsed bundle: the handle a registry holds for a container.
///
/// Bundles built from static bytes are never copied; uncompressed payloads
/// handed out by [`Resource::lookup_data`] point straight into them.
#[derive(Debug, Clone)]
pub struct Resource {
    table: Table,
}

impl Resource {
    /// Wrap bytes that live for the whole program, typically an embedded container.
    pub fn from_static(data: &'static [u8]) -> Result<Self> {
        Self::from_bytes(Bytes::from_static(data))
    }

    pub fn from_bytes(data: Bytes) -> Result<Self> {
        let table = Table::parse(data)?;
        debug!("Parsed resource bundle with {} entries", table.len());
        Ok(Self { table })
    }

    /// Read a bundle file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| EmbedError::io_with_path(e, path))?;
        debug!("Loaded resource bundle from {}", path.display());
        Self::from_bytes(Bytes::from(data))
    }

    /// Contents of the resource at `path`, inflated if it was stored compressed.
    ///
    /// A trailing `/` is ignored. Directories are not resources and report
    /// [`EmbedError::NotFound`].
    pub fn lookup_data(&self, path: &str) -> Result<Bytes> {
        let leaf = self.leaf(path)?;
        let size = leaf.size as usize;

        if leaf.flags.is_compressed() {
            return inflate(path, &leaf);
        }

        if leaf.data.len() < size {
            return Err(EmbedError::invalid_format(format!(
                "resource at \"{path}\" holds {} bytes, header says {size}",
                leaf.data.len()
            )));
        }
        Ok(leaf.data.slice(..size))
    }

    pub fn get_info(&self, path: &str) -> Result<ResourceInfo> {
        let leaf = self.leaf(path)?;
        Ok(ResourceInfo {
            size: leaf.size as usize,
            flags: leaf.flags,
        })
    }

    /// Names of the direct children of the directory at `path`.
    ///
    /// Subdirectory names keep their trailing `/`.
    pub fn enumerate_children(&self, path: &str) -> Result<Vec<String>> {
        if path.is_empty() {
            return Err(EmbedError::not_found(path));
        }

        let dir = directory_key(path);
        match self.table.lookup(&dir)? {
            Some(Entry::Directory { children }) => Ok(children),
            _ => Err(EmbedError::not_found(path)),
        }
    }

    /// True if `path` names a directory with at least one child.
    pub fn has_children(&self, path: &str) -> bool {
        self.enumerate_children(path)
            .map(|children| !children.is_empty())
            .unwrap_or(false)
    }

    /// Every resource path in the bundle, sorted.
    pub fn leaf_paths(&self) -> Vec<String> {
        self.table.leaf_paths()
    }

    fn leaf(&self, path: &str) -> Result<Leaf> {
        let key = path
            .strip_suffix(ResourceConfig::PATH_SEPARATOR)
            .unwrap_or(path);

        match self.table.lookup(key)? {
            Some(Entry::Leaf(leaf)) => Ok(leaf),
            _ => Err(EmbedError::not_found(path)),
        }
    }
}

fn directory_key(path: &str) -> String {
    if path.ends_with(ResourceConfig::PATH_SEPARATOR) {
        path.to_string()
    } else {
        format!("{path}{}", ResourceConfig::PATH_SEPARATOR)
    }
}

fn inflate(path: &str, leaf: &Leaf) -> Result<Bytes> {
    let expected = leaf.size as usize;
    let mut out = Vec::with_capacity(expected);

    ZlibDecoder::new(&leaf.data[..])
        .read_to_end(&mut out)
        .map_err(|e| EmbedError::Decompress {
            path: path.to_string(),
            message: e.to_string(),
            source: Some(e),
        })?;

    if out.len() != expected {
        return Err(EmbedError::Decompress {
            path: path.to_string(),
            message: format!("inflated to {} bytes, expected {expected}", out.len()),
            source: None,
        });
    }
    Ok(Bytes::from(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gvdb::tests::DOCK_BUNDLE;
    use std::io::Write;

    const CSS_PATH: &str = "/io/elementary/dock/Application.css";
    const CSS: &[u8] = b"window {\n    background-color: transparent;\n}\n";

    fn dock() -> Resource {
        Resource::from_static(DOCK_BUNDLE).unwrap()
    }

    #[test]
    fn test_lookup_compressed_resource() {
        let data = dock().lookup_data(CSS_PATH).unwrap();
        assert_eq!(data.len(), 46);
        assert_eq!(&data[..], CSS);
    }

    #[test]
    fn test_lookup_ignores_trailing_slash() {
        let data = dock().lookup_data("/io/elementary/dock/Application.css/").unwrap();
        assert_eq!(&data[..], CSS);
    }

    #[test]
    fn test_lookup_missing_and_directory_paths() {
        let resource = dock();
        assert!(resource.lookup_data("/io/elementary/dock/Missing.css").unwrap_err().is_not_found());
        assert!(resource.lookup_data("/io/elementary/dock/").unwrap_err().is_not_found());
        assert!(resource.lookup_data("io/elementary/dock/Application.css").unwrap_err().is_not_found());
    }

    #[test]
    fn test_get_info() {
        let info = dock().get_info(CSS_PATH).unwrap();
        assert_eq!(info.size, 46);
        assert!(info.flags.is_compressed());
    }

    #[test]
    fn test_enumerate_children() {
        let resource = dock();
        assert_eq!(resource.enumerate_children("/").unwrap(), vec!["io/"]);
        assert_eq!(resource.enumerate_children("/io").unwrap(), vec!["elementary/"]);
        assert_eq!(
            resource.enumerate_children("/io/elementary/dock/").unwrap(),
            vec!["Application.css"]
        );
        assert!(resource.enumerate_children("/nope/").unwrap_err().is_not_found());
        assert!(resource.enumerate_children("").unwrap_err().is_not_found());
        assert!(resource.enumerate_children(CSS_PATH).unwrap_err().is_not_found());
    }

    #[test]
    fn test_has_children() {
        let resource = dock();
        assert!(resource.has_children("/io/elementary"));
        assert!(!resource.has_children(CSS_PATH));
        assert!(!resource.has_children("/missing"));
    }

    #[test]
    fn test_corrupt_payload_fails_to_decompress() {
        let mut data = DOCK_BUNDLE.to_vec();
        // Inside the deflate data; the zlib stream starts at 0xe8.
        data[0xee] ^= 0xff;
        data[0xef] ^= 0xff;
        let resource = Resource::from_bytes(Bytes::from(data)).unwrap();
        let err = resource.lookup_data(CSS_PATH).unwrap_err();
        assert!(matches!(err, EmbedError::Decompress { .. }));
    }

    #[test]
    fn test_inflate_checks_declared_size() {
        use flate2::write::ZlibEncoder;
        use flate2::Compression;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(CSS).unwrap();
        let stream = Bytes::from(encoder.finish().unwrap());

        let leaf = Leaf {
            size: CSS.len() as u32,
            flags: ResourceFlags::COMPRESSED,
            data: stream,
        };
        assert_eq!(&inflate(CSS_PATH, &leaf).unwrap()[..], CSS);

        let short = Leaf {
            size: 10,
            ..leaf
        };
        let err = inflate(CSS_PATH, &short).unwrap_err();
        assert!(matches!(err, EmbedError::Decompress { source: None, .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DOCK_BUNDLE).unwrap();

        let resource = Resource::load(file.path()).unwrap();
        assert_eq!(resource.leaf_paths(), vec![CSS_PATH.to_string()]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Resource::load("/nonexistent/bundle.gresource").unwrap_err();
        assert!(matches!(err, EmbedError::Io { path: Some(_), .. }));
    }
}

//! Centralized configuration for embedded resource bundles.
//!
//! The bundle format is produced by an external packer, so these constants
//! pin the layout this crate reads rather than tune behavior.

/// Binary layout of the packed bundle (GVariant database).
pub struct FormatConfig;

impl FormatConfig {
    /// First header word, `"GVar"` read little-endian.
    pub const SIGNATURE_0: u32 = 0x7261_5647;
    /// Second header word, `"iant"` read little-endian.
    pub const SIGNATURE_1: u32 = 0x746e_6169;
    pub const SIGNATURE: &'static [u8; 8] = b"GVariant";
    pub const SUPPORTED_VERSION: u32 = 0;

    pub const HEADER_SIZE: usize = 24;
    pub const HASH_HEADER_SIZE: usize = 8;
    pub const HASH_ITEM_SIZE: usize = 24;

    /// Bloom word count lives in the low 27 bits; the shift in the top 5.
    pub const BLOOM_COUNT_MASK: u32 = (1 << 27) - 1;
    pub const BLOOM_SHIFT_BITS: u32 = 27;

    pub const HASH_SEED: u32 = 5381;
    pub const NO_PARENT: u32 = u32::MAX;

    pub const TYPE_DIRECTORY: u8 = b'L';
    pub const TYPE_VALUE: u8 = b'v';

    /// Variant type string of a leaf payload: (size, flags, data).
    pub const LEAF_TYPE: &'static str = "(uuay)";
}

/// Placement and lookup conventions for resource bundles.
pub struct ResourceConfig;

impl ResourceConfig {
    /// Alignment of the container start; offsets inside the bundle may point
    /// at word-sized structures.
    pub const ALIGNMENT: usize = 8;
    /// Prefix of the per-bundle ELF section name.
    pub const SECTION_PREFIX: &'static str = ".gresource.";
    pub const PATH_SEPARATOR: char = '/';
    pub const ROOT: &'static str = "/";
}

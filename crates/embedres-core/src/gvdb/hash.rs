//! Key hashing for bundle hash tables.

use crate::config::FormatConfig;

/// djb2 over the full key, treating each byte as signed.
///
/// Bytes above 0x7f sign-extend before the add, which is what the packer does
/// on platforms where `char` is signed. Keys are almost always ASCII paths.
pub fn djb_hash(key: &str) -> u32 {
    key.bytes().fold(FormatConfig::HASH_SEED, |hash, byte| {
        hash.wrapping_mul(33)
            .wrapping_add((byte as i8) as i32 as u32)
    })
}

//! Avalanche mixing of packed k-mers into structure keys.
//!
//! The counting structure derives slot and fingerprint directly from the key
//! bits, so these functions must stay bit-exact: an "equally good" hash would
//! silently split build and query keys apart.

use crate::encoding::check_k;
use crate::errors::KmerQfResult;

// The individual keys handed to the counting structure
pub type KmerKey = u64;

/// Low `2k` bits set.
#[inline]
pub fn kmer_mask(k: u32) -> KmerQfResult<u64> {
    let k = check_k(k)?;
    Ok(mask_for(k))
}

#[inline]
pub(crate) fn mask_for(k: u32) -> u64 {
    if k >= 32 {
        u64::MAX
    } else {
        (1u64 << (2 * k)) - 1
    }
}

/// Invertible integer mix restricted to the bits of `mask`.
#[inline]
pub fn mix(key: u64, mask: u64) -> KmerKey {
    // (key << 21) - key - 1
    let mut key = (!key).wrapping_add(key << 21) & mask;
    key ^= key >> 24;
    // key * 265
    key = key.wrapping_add(key << 3).wrapping_add(key << 8) & mask;
    key ^= key >> 14;
    // key * 21
    key = key.wrapping_add(key << 2).wrapping_add(key << 4) & mask;
    key ^= key >> 28;
    key.wrapping_add(key << 31) & mask
}

/// Key of a packed k-mer, used as is.
#[inline]
pub fn hash_key(value: u64, k: u32) -> KmerQfResult<KmerKey> {
    Ok(mix(value, kmer_mask(k)?))
}

/// Key of the one's complement of a canonical code.
///
/// Because insertion codes are the complement of canonical-form codes, this
/// is the insertion key of the canonical k-mer.
#[inline]
pub fn complement_hash_key(canonical: u64, k: u32) -> KmerQfResult<KmerKey> {
    Ok(mix(!canonical, kmer_mask(k)?))
}

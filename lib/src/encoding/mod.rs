//! 2-bit packing of DNA k-mers.
//!
//! Two base orders coexist. The insertion order (`A=3, C=2, G=1, T=0`) is the
//! bitwise complement of the canonical order (`A=0, C=1, G=2, T=3`), so for
//! any k-mer `encode_insertion(s) == !encode_canonical_form(s) & mask(k)`.
//!
//! Bytes outside `ACG` (including lowercase and `N`) take the code of `T`.
//! Which keys collide depends on this, so it must not be changed to a
//! rejection.

mod revcomp;

use crate::errors::{KmerQfError, KmerQfResult};

pub(crate) use revcomp::canonical_unchecked;
pub use revcomp::{canonical, checked_reverse_complement, reverse_complement, REV_COMP_TABLE};

/// Longest k-mer that fits in a `u64` at 2 bits per base.
pub const MAX_K: u32 = 32;

/// ASCII → insertion code. Unlisted bytes are 0 (the code of `T`).
pub static INSERTION_CODES: [u8; 256] = {
    let mut t = [0u8; 256];
    t[b'A' as usize] = 3;
    t[b'C' as usize] = 2;
    t[b'G' as usize] = 1;
    t
};

/// ASCII → canonical-form code. Unlisted bytes are 3 (the code of `T`).
pub static CANONICAL_CODES: [u8; 256] = {
    let mut t = [3u8; 256];
    t[b'A' as usize] = 0;
    t[b'C' as usize] = 1;
    t[b'G' as usize] = 2;
    t
};

/// Base order used to pack a k-mer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Convention {
    /// `A=3, C=2, G=1, T=0`
    Insertion,
    /// `A=0, C=1, G=2, T=3`
    CanonicalForm,
}

impl Convention {
    #[inline]
    fn table(self) -> &'static [u8; 256] {
        match self {
            Convention::Insertion => &INSERTION_CODES,
            Convention::CanonicalForm => &CANONICAL_CODES,
        }
    }

    /// Pack `kmer` left to right, most significant base first.
    pub fn encode(self, kmer: &[u8]) -> KmerQfResult<u64> {
        if kmer.is_empty() || kmer.len() > MAX_K as usize {
            return Err(KmerQfError::InvalidKmerLength(kmer.len()));
        }
        Ok(pack(self.table(), kmer))
    }
}

#[inline]
pub(crate) fn pack(table: &[u8; 256], kmer: &[u8]) -> u64 {
    kmer.iter()
        .fold(0u64, |acc, &b| (acc << 2) | u64::from(table[b as usize]))
}

#[inline]
pub(crate) fn pack_canonical_form(kmer: &[u8]) -> u64 {
    pack(&CANONICAL_CODES, kmer)
}

#[inline]
pub(crate) fn pack_insertion(kmer: &[u8]) -> u64 {
    pack(&INSERTION_CODES, kmer)
}

/// Encode with the insertion order (`A=3, C=2, G=1, T=0`).
pub fn encode_insertion<K: AsRef<[u8]> + ?Sized>(kmer: &K) -> KmerQfResult<u64> {
    Convention::Insertion.encode(kmer.as_ref())
}

/// Encode with the canonical-form order (`A=0, C=1, G=2, T=3`).
pub fn encode_canonical_form<K: AsRef<[u8]> + ?Sized>(kmer: &K) -> KmerQfResult<u64> {
    Convention::CanonicalForm.encode(kmer.as_ref())
}

/// Reject any k that doesn't fit a 2-bit packing in 64 bits.
#[inline]
pub fn check_k(k: u32) -> KmerQfResult<u32> {
    if k == 0 || k > MAX_K {
        return Err(KmerQfError::InvalidK(k));
    }
    Ok(k)
}

/// Unpack a canonical-form code back into bases.
pub fn decode_canonical_form(code: u64, k: u32) -> KmerQfResult<Vec<u8>> {
    check_k(k)?;
    Ok((0..k)
        .rev()
        .map(|i| b"ACGT"[((code >> (2 * i)) & 0b11) as usize])
        .collect())
}

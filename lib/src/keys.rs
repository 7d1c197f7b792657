use serde::{Deserialize, Serialize};

use crate::encoding::{canonical_unchecked, check_k, pack_canonical_form, pack_insertion};
use crate::errors::{KmerQfError, KmerQfResult};
use crate::hashing::{mask_for, mix, KmerKey};

/// How a k-mer is turned into a key when it is inserted.
///
/// Queries always go through the canonical path: canonical-form encoding,
/// canonicalization over `2k` bits, then the hash of the complemented code.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyScheme {
    /// Insert through the same canonical path as queries, so either strand of
    /// a k-mer finds the count.
    Canonical,
    /// Hash the insertion encoding of the k-mer exactly as given. Keys only
    /// match queries when the inserted k-mers are already canonical (as in
    /// the output of canonical k-mer counters).
    Raw,
}

impl Default for KeyScheme {
    fn default() -> Self {
        KeyScheme::Canonical
    }
}

/// Derives structure keys for k-mers of one fixed length.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KmerKeyer {
    k: u32,
    scheme: KeyScheme,
    mask: u64,
}

impl KmerKeyer {
    pub fn new(k: u32, scheme: KeyScheme) -> KmerQfResult<Self> {
        let k = check_k(k)?;
        Ok(KmerKeyer {
            k,
            scheme,
            mask: mask_for(k),
        })
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    pub fn scheme(&self) -> KeyScheme {
        self.scheme
    }

    pub fn mask(&self) -> u64 {
        self.mask
    }

    fn check_len(&self, kmer: &[u8], record: usize) -> KmerQfResult<()> {
        if kmer.len() != self.k as usize {
            return Err(KmerQfError::KmerLength {
                expected: self.k,
                found: kmer.len(),
                record,
            });
        }
        Ok(())
    }

    /// Key under which `kmer` is inserted.
    pub fn insertion_key<K: AsRef<[u8]> + ?Sized>(&self, kmer: &K) -> KmerQfResult<KmerKey> {
        self.record_insertion_key(kmer.as_ref(), 0)
    }

    /// Key under which `kmer` is looked up.
    pub fn query_key<K: AsRef<[u8]> + ?Sized>(&self, kmer: &K) -> KmerQfResult<KmerKey> {
        let kmer = kmer.as_ref();
        self.check_len(kmer, 0)?;
        Ok(self.window_key(kmer))
    }

    /// [`insertion_key`](Self::insertion_key) reporting `record` on a length mismatch.
    pub(crate) fn record_insertion_key(&self, kmer: &[u8], record: usize) -> KmerQfResult<KmerKey> {
        self.check_len(kmer, record)?;
        Ok(match self.scheme {
            KeyScheme::Canonical => self.window_key(kmer),
            KeyScheme::Raw => mix(pack_insertion(kmer), self.mask),
        })
    }

    /// Query key of a window already known to hold exactly `k` bytes.
    #[inline]
    pub(crate) fn window_key(&self, window: &[u8]) -> KmerKey {
        let canonical = canonical_unchecked(pack_canonical_form(window), 2 * self.k);
        mix(!canonical, self.mask)
    }
}

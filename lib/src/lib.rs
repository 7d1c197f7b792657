//! Canonical k-mer keys for approximate counting structures.
//!
//! A k-mer is packed at 2 bits per base, folded onto its canonical strand,
//! and mixed into a key masked to `2k` bits. Building an index inserts
//! `(key, count)` pairs into a [`CountingStructure`]; querying slides a
//! k-mer window along a read and looks each window's key up.
//!
//! ```
//! use kmerqf::{build_index, query_window_counts, ExactCounter};
//!
//! let mut counter = ExactCounter::new();
//! build_index(vec![("GATT", 4)], &mut counter, 4).unwrap();
//! let counts: Vec<_> = query_window_counts("GATTACA", 4, &counter).unwrap().collect();
//! assert_eq!(counts[0], (0, 4));
//! assert_eq!(counts.len(), 4);
//! ```

use std::io::BufRead;

pub mod counting;
pub mod encoding;
pub mod errors;
pub mod hashing;
pub mod keys;
pub mod params;
pub mod pipeline;
pub mod statistics;

pub use crate::counting::{
    CountingStructure, ExactCounter, LockMode, SlotCounter, StructureKind, StructureParams,
};
pub use crate::encoding::{
    canonical, encode_canonical_form, encode_insertion, reverse_complement,
};
pub use crate::errors::{KmerQfError, KmerQfResult};
pub use crate::hashing::{complement_hash_key, hash_key, kmer_mask, mix, KmerKey};
pub use crate::keys::{KeyScheme, KmerKeyer};
pub use crate::params::IndexParams;
pub use crate::pipeline::{
    build_index, build_index_from_reader, build_index_par, build_index_with, query_fastx,
    query_lines, query_window_counts, query_window_counts_with, BuildSummary, ReadCounts,
    WindowCounts,
};
pub use crate::statistics::{verify_estimates, EstimateReport};

/// A structure built from parameters, ready to be queried.
pub struct Index {
    pub params: IndexParams,
    pub keyer: KmerKeyer,
    pub structure: Box<dyn CountingStructure + Send + Sync>,
    pub summary: BuildSummary,
}

impl Index {
    pub fn query<Q: AsRef<[u8]> + ?Sized>(&self, kmer: &Q) -> KmerQfResult<u64> {
        Ok(self.structure.query(self.keyer.query_key(kmer)?))
    }

    pub fn window_counts<'a, Q: AsRef<[u8]> + ?Sized>(
        &'a self,
        sequence: &'a Q,
    ) -> WindowCounts<'a, dyn CountingStructure + Send + Sync> {
        query_window_counts_with(sequence, &self.keyer, &*self.structure)
    }
}

/// Create the structure described by `params` and fill it from
/// tab-separated `kmer<TAB>count` text.
pub fn index_stream<R: BufRead>(reader: R, params: &IndexParams) -> KmerQfResult<Index> {
    let keyer = params.keyer()?;
    let mut structure = params.create_structure()?;
    let summary = build_index_from_reader(reader, &mut structure, &keyer, params.lock_mode)?;
    Ok(Index {
        params: params.clone(),
        keyer,
        structure,
        summary,
    })
}

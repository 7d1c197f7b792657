//! Build and query workflows over a [`CountingStructure`].

mod query;
mod records;

use std::io::BufRead;

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::counting::{CountingStructure, LockMode};
use crate::errors::KmerQfResult;
use crate::hashing::KmerKey;
use crate::keys::{KeyScheme, KmerKeyer};
pub use query::{
    query_fastx, query_lines, query_window_counts, query_window_counts_with, ReadCounts,
    WindowCounts,
};
pub use records::{parse_count_record, CountRecord, CountRecords};

/// Records between two progress log lines.
pub const PROGRESS_INTERVAL: u64 = 500_000;

/// What a build inserted.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct BuildSummary {
    pub records: u64,
    pub total_count: u64,
    pub occupied_slots: u64,
}

impl BuildSummary {
    fn add<S: CountingStructure + ?Sized>(
        &mut self,
        structure: &mut S,
        key: KmerKey,
        count: u64,
        mode: LockMode,
    ) -> KmerQfResult<()> {
        structure.insert(key, count, mode)?;
        self.records += 1;
        self.total_count = self.total_count.saturating_add(count);
        if self.records % PROGRESS_INTERVAL == 0 {
            info!(
                "{} records indexed, {} occupied slots",
                self.records,
                structure.occupied_slots()
            );
        }
        Ok(())
    }

    fn finish<S: CountingStructure + ?Sized>(mut self, structure: &S) -> Self {
        self.occupied_slots = structure.occupied_slots();
        info!(
            "indexed {} records (total count {}), {} occupied slots",
            self.records, self.total_count, self.occupied_slots
        );
        self
    }
}

/// Insert every `(kmer, count)` record with the default key scheme.
///
/// The default [`KeyScheme::Canonical`] canonicalizes each k-mer before
/// hashing, so either strand finds the count. Use [`build_index_with`] and
/// [`KeyScheme::Raw`] to hash the insertion encoding directly.
///
/// Stops at the first k-mer whose length isn't `k` or the first insert the
/// structure refuses; records before it stay inserted.
pub fn build_index<I, K, S>(records: I, structure: &mut S, k: u32) -> KmerQfResult<BuildSummary>
where
    I: IntoIterator<Item = (K, u64)>,
    K: AsRef<[u8]>,
    S: CountingStructure + ?Sized,
{
    let keyer = KmerKeyer::new(k, KeyScheme::default())?;
    build_index_with(records, structure, &keyer, LockMode::NoLock)
}

pub fn build_index_with<I, K, S>(
    records: I,
    structure: &mut S,
    keyer: &KmerKeyer,
    mode: LockMode,
) -> KmerQfResult<BuildSummary>
where
    I: IntoIterator<Item = (K, u64)>,
    K: AsRef<[u8]>,
    S: CountingStructure + ?Sized,
{
    let mut summary = BuildSummary::default();
    for (ix, (kmer, count)) in records.into_iter().enumerate() {
        let key = keyer.record_insertion_key(kmer.as_ref(), ix + 1)?;
        summary.add(structure, key, count, mode)?;
    }
    Ok(summary.finish(structure))
}

/// Build from tab-separated `kmer<TAB>count` text, failing on the first bad line.
pub fn build_index_from_reader<R, S>(
    reader: R,
    structure: &mut S,
    keyer: &KmerKeyer,
    mode: LockMode,
) -> KmerQfResult<BuildSummary>
where
    R: BufRead,
    S: CountingStructure + ?Sized,
{
    let mut summary = BuildSummary::default();
    let mut records = CountRecords::new(reader);
    while let Some(record) = records.next() {
        let record = record?;
        let key = keyer.record_insertion_key(&record.kmer, records.line_no())?;
        summary.add(structure, key, record.count, mode)?;
    }
    Ok(summary.finish(structure))
}

/// Like [`build_index_with`], with the keys computed on the rayon pool.
///
/// Inserts still happen on the calling thread, in input order.
pub fn build_index_par<K, S>(
    records: &[(K, u64)],
    structure: &mut S,
    keyer: &KmerKeyer,
    mode: LockMode,
) -> KmerQfResult<BuildSummary>
where
    K: AsRef<[u8]> + Sync,
    S: CountingStructure + ?Sized,
{
    let keys: Vec<KmerKey> = records
        .par_iter()
        .enumerate()
        .map(|(ix, (kmer, _))| keyer.record_insertion_key(kmer.as_ref(), ix + 1))
        .collect::<KmerQfResult<_>>()?;

    let mut summary = BuildSummary::default();
    for (key, (_, count)) in keys.into_iter().zip(records) {
        summary.add(structure, key, *count, mode)?;
    }
    Ok(summary.finish(structure))
}

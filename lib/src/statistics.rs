use log::warn;
use serde::{Deserialize, Serialize};

use crate::counting::CountingStructure;
use crate::errors::KmerQfResult;
use crate::keys::KmerKeyer;

/// How a structure's answers compare with the counts that were inserted.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EstimateReport {
    pub records: u64,
    pub exact: u64,
    pub overestimated: u64,
    /// Sum of `reported - expected` over overestimated records.
    pub total_overestimate: u64,
    /// Should stay zero: the structure is never allowed to undercount.
    pub underestimated: u64,
}

impl EstimateReport {
    pub fn mean_overestimate(&self) -> f64 {
        if self.overestimated == 0 {
            return 0.;
        }
        self.total_overestimate as f64 / self.overestimated as f64
    }
}

/// Look up every `(kmer, expected count)` record under its insertion key.
///
/// Records should list each k-mer once with its full count; duplicate
/// k-mers inserted separately show up as overestimates.
pub fn verify_estimates<I, K, S>(
    records: I,
    structure: &S,
    keyer: &KmerKeyer,
) -> KmerQfResult<EstimateReport>
where
    I: IntoIterator<Item = (K, u64)>,
    K: AsRef<[u8]>,
    S: CountingStructure + ?Sized,
{
    let mut report = EstimateReport::default();
    for (ix, (kmer, expected)) in records.into_iter().enumerate() {
        let kmer = kmer.as_ref();
        let key = keyer.record_insertion_key(kmer, ix + 1)?;
        let found = structure.query(key);
        report.records += 1;
        if found > expected {
            report.overestimated += 1;
            report.total_overestimate = report.total_overestimate.saturating_add(found - expected);
        } else if found < expected {
            warn!(
                "{} expected count {}, structure reports {}",
                String::from_utf8_lossy(kmer),
                expected,
                found
            );
            report.underestimated += 1;
        } else {
            report.exact += 1;
        }
    }
    Ok(report)
}

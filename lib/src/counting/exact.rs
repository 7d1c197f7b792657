use std::collections::HashMap;

use crate::counting::{CountingStructure, LockMode};
use crate::errors::KmerQfResult;
use crate::hashing::KmerKey;

/// Exact key → count map; never overestimates and never fills up.
#[derive(Clone, Debug, Default)]
pub struct ExactCounter {
    counts: HashMap<KmerKey, u64>,
}

impl ExactCounter {
    pub fn new() -> Self {
        ExactCounter::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ExactCounter {
            counts: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (KmerKey, u64)> + '_ {
        self.counts.iter().map(|(k, v)| (*k, *v))
    }
}

impl CountingStructure for ExactCounter {
    fn insert(&mut self, key: KmerKey, count: u64, _mode: LockMode) -> KmerQfResult<()> {
        let entry = self.counts.entry(key).or_insert(0);
        *entry = entry.saturating_add(count);
        Ok(())
    }

    fn query(&self, key: KmerKey) -> u64 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    fn occupied_slots(&self) -> u64 {
        self.counts.len() as u64
    }
}

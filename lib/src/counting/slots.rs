use std::collections::HashMap;

use log::debug;

use crate::counting::{CountingStructure, LockMode, StructureParams};
use crate::errors::{KmerQfError, KmerQfResult};
use crate::hashing::KmerKey;

/// Fixed-capacity counter over truncated keys.
///
/// Only the low `key_bits` of a key are kept, so keys that agree on those
/// bits share a count (overestimate, never underestimate). Each distinct
/// truncated key takes one of `num_slots` slots; counts saturate at
/// `2^value_bits - 1`.
#[derive(Clone, Debug)]
pub struct SlotCounter {
    params: StructureParams,
    key_mask: u64,
    max_count: u64,
    counts: HashMap<u64, u64>,
}

impl SlotCounter {
    pub fn new(params: StructureParams) -> KmerQfResult<Self> {
        params.validate()?;
        debug!(
            "creating slot counter: {} slots, {} key bits, {} value bits",
            params.num_slots, params.key_bits, params.value_bits
        );
        Ok(SlotCounter {
            params,
            key_mask: params.key_mask(),
            max_count: params.max_count(),
            counts: HashMap::new(),
        })
    }

    pub fn params(&self) -> &StructureParams {
        &self.params
    }

    /// Fraction of slots in use.
    pub fn load_factor(&self) -> f64 {
        self.counts.len() as f64 / self.params.num_slots as f64
    }
}

impl CountingStructure for SlotCounter {
    fn insert(&mut self, key: KmerKey, count: u64, _mode: LockMode) -> KmerQfResult<()> {
        if count == 0 {
            return Ok(());
        }
        let occupied = self.counts.len() as u64;
        let max_count = self.max_count;
        match self.counts.get_mut(&(key & self.key_mask)) {
            Some(c) => {
                *c = c.saturating_add(count).min(max_count);
            }
            None => {
                if occupied >= self.params.num_slots {
                    return Err(KmerQfError::StructureFull {
                        num_slots: self.params.num_slots,
                    });
                }
                self.counts.insert(key & self.key_mask, count.min(max_count));
            }
        }
        Ok(())
    }

    fn query(&self, key: KmerKey) -> u64 {
        self.counts
            .get(&(key & self.key_mask))
            .copied()
            .unwrap_or(0)
    }

    fn occupied_slots(&self) -> u64 {
        self.counts.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(num_slots: u64, key_bits: u32, value_bits: u32) -> StructureParams {
        StructureParams {
            num_slots,
            key_bits,
            value_bits,
        }
    }

    #[test]
    fn test_truncated_keys_share_counts() {
        let mut counter = SlotCounter::new(params(8, 8, 16)).unwrap();
        counter.insert(0x1_05, 3, LockMode::NoLock).unwrap();
        counter.insert(0x2_05, 4, LockMode::NoLock).unwrap();
        // both keys end in 0x05
        assert_eq!(counter.query(0x05), 7);
        assert_eq!(counter.query(0x1_05), 7);
        assert_eq!(counter.query(0x06), 0);
        assert_eq!(counter.occupied_slots(), 1);
    }

    #[test]
    fn test_full_structure() {
        let mut counter = SlotCounter::new(params(2, 16, 8)).unwrap();
        counter.insert(1, 1, LockMode::NoLock).unwrap();
        counter.insert(2, 1, LockMode::NoLock).unwrap();
        // existing keys still accumulate
        counter.insert(2, 1, LockMode::NoLock).unwrap();
        assert!(matches!(
            counter.insert(3, 1, LockMode::NoLock),
            Err(KmerQfError::StructureFull { num_slots: 2 })
        ));
        assert_eq!(counter.query(2), 2);
        assert_eq!(counter.query(3), 0);
        assert!((counter.load_factor() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_counts_saturate() {
        let mut counter = SlotCounter::new(params(4, 16, 4)).unwrap();
        counter.insert(9, 20, LockMode::NoLock).unwrap();
        assert_eq!(counter.query(9), 15);
        counter.insert(10, 10, LockMode::NoLock).unwrap();
        counter.insert(10, 10, LockMode::NoLock).unwrap();
        assert_eq!(counter.query(10), 15);
    }

    #[test]
    fn test_zero_count_is_noop() {
        let mut counter = SlotCounter::new(params(1, 16, 8)).unwrap();
        counter.insert(5, 0, LockMode::NoLock).unwrap();
        assert_eq!(counter.occupied_slots(), 0);
        assert_eq!(counter.params().num_slots, 1);
    }

    #[test]
    fn test_invalid_params() {
        assert!(SlotCounter::new(params(0, 16, 8)).is_err());
    }
}

//! The approximate counting structure the pipelines write keys into.

mod exact;
mod slots;

use serde::{Deserialize, Serialize};

use crate::errors::{KmerQfError, KmerQfResult};
use crate::hashing::KmerKey;
pub use exact::ExactCounter;
pub use slots::SlotCounter;

/// Locking discipline requested for an insert.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    NoLock,
    WaitForLock,
}

impl Default for LockMode {
    fn default() -> Self {
        LockMode::NoLock
    }
}

/// A multiset of keys with approximate counts.
///
/// `query` may overestimate (keys can share addressing) but never
/// underestimates what was inserted.
pub trait CountingStructure {
    /// Add `count` occurrences of `key`.
    fn insert(&mut self, key: KmerKey, count: u64, mode: LockMode) -> KmerQfResult<()>;
    fn query(&self, key: KmerKey) -> u64;
    fn occupied_slots(&self) -> u64;
}

impl<S: CountingStructure + ?Sized> CountingStructure for Box<S> {
    fn insert(&mut self, key: KmerKey, count: u64, mode: LockMode) -> KmerQfResult<()> {
        (**self).insert(key, count, mode)
    }

    fn query(&self, key: KmerKey) -> u64 {
        (**self).query(key)
    }

    fn occupied_slots(&self) -> u64 {
        (**self).occupied_slots()
    }
}

/// Sizing of a counting structure.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct StructureParams {
    pub num_slots: u64,
    /// Significant key bits kept by the structure.
    pub key_bits: u32,
    /// Width of a stored count.
    pub value_bits: u32,
}

impl StructureParams {
    pub fn validate(&self) -> KmerQfResult<()> {
        if self.num_slots == 0 {
            return Err(KmerQfError::InvalidStructureParams(
                "num_slots must be positive".to_string(),
            ));
        }
        if self.key_bits == 0 || self.key_bits > 64 {
            return Err(KmerQfError::InvalidStructureParams(format!(
                "key_bits must be in 1..=64, got {}",
                self.key_bits
            )));
        }
        if self.value_bits == 0 || self.value_bits > 64 {
            return Err(KmerQfError::InvalidStructureParams(format!(
                "value_bits must be in 1..=64, got {}",
                self.value_bits
            )));
        }
        Ok(())
    }

    pub fn key_mask(&self) -> u64 {
        low_bits(self.key_bits)
    }

    pub fn max_count(&self) -> u64 {
        low_bits(self.value_bits)
    }
}

#[inline]
fn low_bits(n: u32) -> u64 {
    if n >= 64 {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

/// Which in-memory structure to build.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureKind {
    Exact,
    Slots,
}

impl Default for StructureKind {
    fn default() -> Self {
        StructureKind::Slots
    }
}

impl StructureKind {
    pub fn create(
        self,
        params: &StructureParams,
    ) -> KmerQfResult<Box<dyn CountingStructure + Send + Sync>> {
        Ok(match self {
            StructureKind::Exact => Box::new(ExactCounter::new()),
            StructureKind::Slots => Box::new(SlotCounter::new(*params)?),
        })
    }
}

use serde::{Deserialize, Serialize};

use crate::bail;
use crate::counting::{CountingStructure, LockMode, StructureKind, StructureParams};
use crate::encoding::check_k;
use crate::errors::KmerQfResult;
use crate::keys::{KeyScheme, KmerKeyer};

/// Everything needed to build an index and to query it consistently.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct IndexParams {
    pub k: u32,
    pub scheme: KeyScheme,
    pub structure: StructureKind,
    /// log2 of the number of slots (quotient bits).
    pub log_slots: u32,
    /// Key bits kept beyond the quotient.
    pub remainder_bits: u32,
    pub value_bits: u32,
    pub lock_mode: LockMode,
}

impl Default for IndexParams {
    fn default() -> Self {
        IndexParams {
            k: 32,
            scheme: KeyScheme::default(),
            structure: StructureKind::default(),
            log_slots: 20,
            remainder_bits: 12,
            value_bits: 32,
            lock_mode: LockMode::default(),
        }
    }
}

impl IndexParams {
    /// Parse (and validate) parameters from JSON; missing fields take defaults.
    pub fn from_json(json: &str) -> KmerQfResult<Self> {
        let params: IndexParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json(&self) -> KmerQfResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> KmerQfResult<()> {
        check_k(self.k)?;
        if self.log_slots == 0 || self.log_slots > 48 {
            bail!("log_slots must be in 1..=48, got {}", self.log_slots);
        }
        let key_bits = self.log_slots.saturating_add(self.remainder_bits);
        if key_bits > 64 {
            bail!(
                "log_slots + remainder_bits must be at most 64, got {}",
                key_bits
            );
        }
        self.structure_params().validate()
    }

    pub fn keyer(&self) -> KmerQfResult<KmerKeyer> {
        KmerKeyer::new(self.k, self.scheme)
    }

    pub fn structure_params(&self) -> StructureParams {
        StructureParams {
            num_slots: 1u64 << self.log_slots.min(63),
            key_bits: self.log_slots.saturating_add(self.remainder_bits),
            value_bits: self.value_bits,
        }
    }

    pub fn create_structure(&self) -> KmerQfResult<Box<dyn CountingStructure + Send + Sync>> {
        self.validate()?;
        self.structure.create(&self.structure_params())
    }

    /// Return the first parameter difference that would make keys written
    /// with `self` unreadable with `other`.
    pub fn check_compatibility(&self, other: &IndexParams) -> Option<(&str, String, String)> {
        if self.k != other.k {
            return Some(("k", self.k.to_string(), other.k.to_string()));
        }
        if self.scheme != other.scheme {
            return Some((
                "key scheme",
                format!("{:?}", self.scheme),
                format!("{:?}", other.scheme),
            ));
        }
        let (ours, theirs) = (self.structure_params(), other.structure_params());
        if ours.key_bits != theirs.key_bits {
            return Some((
                "key bits",
                ours.key_bits.to_string(),
                theirs.key_bits.to_string(),
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::KmerQfError;

    #[test]
    fn test_defaults() {
        let params = IndexParams::default();
        assert!(params.validate().is_ok());
        let structure = params.structure_params();
        assert_eq!(structure.num_slots, 1 << 20);
        assert_eq!(structure.key_bits, 32);
        assert_eq!(params.keyer().unwrap().k(), 32);
    }

    #[test]
    fn test_from_json() {
        let params = IndexParams::from_json(
            r#"{
                "k": 21,
                "scheme": "raw",
                "log_slots": 10,
                "remainder_bits": 8,
                "lock_mode": "wait_for_lock"
            }"#,
        )
        .unwrap();
        assert_eq!(params.k, 21);
        assert_eq!(params.scheme, KeyScheme::Raw);
        assert_eq!(params.lock_mode, LockMode::WaitForLock);
        assert_eq!(params.value_bits, 32);
        assert_eq!(params.structure, StructureKind::Slots);
        assert_eq!(params.structure_params().key_bits, 18);

        let round_trip = IndexParams::from_json(&params.to_json().unwrap()).unwrap();
        assert_eq!(round_trip, params);
    }

    #[test]
    fn test_invalid_json_params() {
        assert!(matches!(
            IndexParams::from_json(r#"{"k": 40}"#),
            Err(KmerQfError::InvalidK(40))
        ));
        assert!(matches!(
            IndexParams::from_json(r#"{"log_slots": 0}"#),
            Err(KmerQfError::Message(_))
        ));
        assert!(matches!(
            IndexParams::from_json(r#"{"log_slots": 40, "remainder_bits": 30}"#),
            Err(KmerQfError::Message(_))
        ));
        assert!(matches!(
            IndexParams::from_json(r#"{"value_bits": 0}"#),
            Err(KmerQfError::InvalidStructureParams(_))
        ));
        assert!(matches!(
            IndexParams::from_json(r#"{"scheme": "sideways"}"#),
            Err(KmerQfError::Json(_))
        ));
    }

    #[test]
    fn test_create_structure() {
        let params = IndexParams {
            k: 4,
            log_slots: 2,
            remainder_bits: 6,
            ..IndexParams::default()
        };
        let mut structure = params.create_structure().unwrap();
        let keyer = params.keyer().unwrap();
        structure
            .insert(keyer.insertion_key("ACGT").unwrap(), 3, params.lock_mode)
            .unwrap();
        assert_eq!(structure.query(keyer.query_key("ACGT").unwrap()), 3);
    }

    #[test]
    fn test_check_compatibility() {
        let base = IndexParams::default();
        assert_eq!(base.check_compatibility(&base.clone()), None);
        let other = IndexParams {
            k: 31,
            ..base.clone()
        };
        assert_eq!(
            base.check_compatibility(&other),
            Some(("k", "32".to_string(), "31".to_string()))
        );
        let other = IndexParams {
            scheme: KeyScheme::Raw,
            ..base.clone()
        };
        assert_eq!(base.check_compatibility(&other).unwrap().0, "key scheme");
        let other = IndexParams {
            remainder_bits: 4,
            ..base.clone()
        };
        assert_eq!(base.check_compatibility(&other).unwrap().0, "key bits");
        // value width doesn't change keys
        let other = IndexParams {
            value_bits: 8,
            ..base.clone()
        };
        assert_eq!(base.check_compatibility(&other), None);
    }
}

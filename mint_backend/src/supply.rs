use candid::{CandidType, Deserialize};
use ic_stable_structures::storable::Bound;
use ic_stable_structures::Storable;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::borrow::Cow;

use crate::types::{MintError, PoolStats, UnitId};

/// Supply ledger: fixed capacity and a monotonic issued counter.
///
/// `last_mint_digest` chains every committed request and feeds the seed
/// derivation as the "previous block" input.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolState {
    pub capacity: u64,
    pub issued_count: u64,
    pub last_mint_digest: [u8; 32],
}

impl PoolState {
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            issued_count: 0,
            last_mint_digest: [0u8; 32],
        }
    }

    pub fn remaining(&self) -> u64 {
        self.capacity.saturating_sub(self.issued_count)
    }

    /// Record `quantity` newly issued units. Never lets `issued_count` pass `capacity`.
    pub fn record_issued(&mut self, quantity: u64) -> Result<(), MintError> {
        let remaining = self.remaining();
        if quantity > remaining {
            return Err(MintError::SupplyExhausted { remaining, requested: quantity });
        }
        self.issued_count += quantity;
        Ok(())
    }

    /// Fold a committed request into the digest chain.
    pub fn advance_digest(&mut self, seed: &[u8; 32], units: &[UnitId]) {
        let mut hasher = Sha256::new();
        hasher.update(self.last_mint_digest);
        hasher.update(seed);
        for unit in units {
            hasher.update(unit.to_be_bytes());
        }
        self.last_mint_digest.copy_from_slice(&hasher.finalize());
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.capacity,
            issued: self.issued_count,
            remaining: self.remaining(),
        }
    }
}

impl Storable for PoolState {
    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(
            candid::encode_one(self).expect(
                "CRITICAL: Failed to encode PoolState. \
                 This should never happen unless there's a bug in candid serialization."
            )
        )
    }

    fn into_bytes(self) -> Vec<u8> {
        self.to_bytes().into_owned()
    }

    fn from_bytes(bytes: Cow<'_, [u8]>) -> Self {
        candid::decode_one(&bytes).expect(
            "CRITICAL: Failed to decode PoolState from stable storage. \
             Supply accounting cannot be trusted - manual intervention required."
        )
    }

    const BOUND: Bound = Bound::Unbounded;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_tracks_issued() {
        let mut pool = PoolState::new(99);
        assert_eq!(pool.remaining(), 99);
        pool.record_issued(40).unwrap();
        assert_eq!(pool.remaining(), 59);
        pool.record_issued(59).unwrap();
        assert_eq!(pool.remaining(), 0);
    }

    #[test]
    fn cannot_issue_past_capacity() {
        let mut pool = PoolState::new(3);
        pool.record_issued(2).unwrap();
        let err = pool.record_issued(2).unwrap_err();
        assert_eq!(err, MintError::SupplyExhausted { remaining: 1, requested: 2 });
        assert_eq!(pool.issued_count, 2);
    }

    #[test]
    fn digest_changes_with_each_commit() {
        let mut pool = PoolState::new(10);
        let before = pool.last_mint_digest;
        pool.advance_digest(&[1u8; 32], &[3, 1]);
        let after_first = pool.last_mint_digest;
        assert_ne!(before, after_first);

        pool.advance_digest(&[1u8; 32], &[3, 1]);
        assert_ne!(after_first, pool.last_mint_digest);
    }

    #[test]
    fn pool_state_roundtrip() {
        let mut pool = PoolState::new(10_000);
        pool.record_issued(17).unwrap();
        pool.advance_digest(&[9u8; 32], &[42]);
        assert_eq!(PoolState::from_bytes(pool.to_bytes()), pool);
    }
}

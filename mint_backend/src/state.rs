use candid::Principal;
use ic_stable_structures::memory_manager::{MemoryId, MemoryManager};
use ic_stable_structures::{DefaultMemoryImpl, StableBTreeMap, StableCell};
use std::collections::BTreeMap;

use crate::allocator::apply_writes;
use crate::memory_ids::*;
use crate::supply::PoolState;
use crate::types::{AuditEntry, AuditEvent, MintConfig, MintError, UnitId, MAX_EVENTS_PAGE};
use crate::Memory;

/// All mint state owned by the canister.
///
/// Passed by `&mut` into the orchestrator; nothing in the core reaches for
/// ambient globals.
pub struct MintState {
    pool: StableCell<PoolState, Memory>,
    config: StableCell<MintConfig, Memory>,
    swap_table: StableBTreeMap<u64, u64, Memory>,
    requester_counts: StableBTreeMap<Principal, u64, Memory>,
    members: StableBTreeMap<Principal, u64, Memory>,
    audit_log: StableBTreeMap<u64, AuditEntry, Memory>,
}

impl MintState {
    /// Open (or create) state in the managed memories. Existing contents win
    /// over `pool` and `config`, which only seed a fresh install.
    pub fn init(memory_manager: &MemoryManager<DefaultMemoryImpl>, pool: PoolState, config: MintConfig) -> Self {
        let memory = |id: u8| memory_manager.get(MemoryId::new(id));
        Self {
            pool: StableCell::init(memory(POOL_STATE_MEMORY_ID), pool),
            config: StableCell::init(memory(CONFIG_MEMORY_ID), config),
            swap_table: StableBTreeMap::init(memory(SWAP_TABLE_MEMORY_ID)),
            requester_counts: StableBTreeMap::init(memory(REQUESTER_COUNTS_MEMORY_ID)),
            members: StableBTreeMap::init(memory(MEMBERSHIP_MEMORY_ID)),
            audit_log: StableBTreeMap::init(memory(AUDIT_LOG_MAP_MEMORY_ID)),
        }
    }

    // =========================================================================
    // READS
    // =========================================================================

    pub fn pool(&self) -> &PoolState {
        self.pool.get()
    }

    pub fn config(&self) -> &MintConfig {
        self.config.get()
    }

    pub fn swap_table(&self) -> &StableBTreeMap<u64, u64, Memory> {
        &self.swap_table
    }

    pub fn units_held(&self, requester: &Principal) -> u64 {
        self.requester_counts.get(requester).unwrap_or(0)
    }

    pub fn is_member(&self, identity: &Principal) -> bool {
        self.members.contains_key(identity)
    }

    pub fn member_count(&self) -> u64 {
        self.members.len()
    }

    /// Per-requester cap minus units already held. Never negative.
    pub fn remaining_allowance(&self, requester: &Principal) -> u64 {
        self.config()
            .per_requester_cap
            .saturating_sub(self.units_held(requester))
    }

    pub fn event_count(&self) -> u64 {
        self.audit_log.len()
    }

    pub fn events(&self, offset: u64, limit: u64) -> Vec<AuditEntry> {
        let end = offset
            .saturating_add(limit.min(MAX_EVENTS_PAGE))
            .min(self.audit_log.len());
        (offset..end)
            .filter_map(|seq| self.audit_log.get(&seq))
            .collect()
    }

    // =========================================================================
    // ADMIN WRITES
    // =========================================================================

    pub fn set_config(&mut self, config: MintConfig) {
        let _ = self.config.set(config);
    }

    /// Returns how many identities were newly added.
    pub fn add_members(&mut self, identities: &[Principal], now: u64) -> u64 {
        let mut added = 0;
        for identity in identities {
            if self.members.insert(*identity, now).is_none() {
                added += 1;
            }
        }
        added
    }

    /// Returns how many identities were actually removed.
    pub fn remove_members(&mut self, identities: &[Principal]) -> u64 {
        identities
            .iter()
            .filter(|identity| self.members.remove(identity).is_some())
            .count() as u64
    }

    // =========================================================================
    // COMMIT
    // =========================================================================

    /// Apply a fully-validated request in one step: swap table, supply,
    /// requester record, event log and digest chain.
    pub fn commit_allocation(
        &mut self,
        requester: Principal,
        seed: &[u8; 32],
        units: &[UnitId],
        writes: BTreeMap<u64, u64>,
        now: u64,
    ) -> Result<(), MintError> {
        let quantity = units.len() as u64;

        let mut pool = self.pool().clone();
        pool.record_issued(quantity)?;
        pool.advance_digest(seed, units);

        apply_writes(&mut self.swap_table, writes);
        let _ = self.pool.set(pool);

        let held = self.units_held(&requester);
        self.requester_counts.insert(requester, held + quantity);

        for unit_id in units {
            let seq = self.audit_log.len();
            self.audit_log.insert(
                seq,
                AuditEntry {
                    timestamp: now,
                    event: AuditEvent::UnitIssued { requester, unit_id: *unit_id },
                },
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_state(capacity: u64) -> MintState {
        let manager = MemoryManager::init(DefaultMemoryImpl::default());
        MintState::init(&manager, PoolState::new(capacity), MintConfig::default())
    }

    #[test]
    fn reopening_keeps_existing_contents() {
        let manager = MemoryManager::init(DefaultMemoryImpl::default());
        {
            let mut state = MintState::init(&manager, PoolState::new(10), MintConfig::default());
            let alice = Principal::from_slice(&[1]);
            let mut writes = BTreeMap::new();
            writes.insert(4, 9);
            state.commit_allocation(alice, &[0u8; 32], &[5], writes, 1).unwrap();
        }

        let state = MintState::init(&manager, PoolState::new(999), MintConfig::default());
        assert_eq!(state.pool().capacity, 10);
        assert_eq!(state.pool().issued_count, 1);
        assert_eq!(state.swap_table().get(&4), Some(9));
        assert_eq!(state.units_held(&Principal::from_slice(&[1])), 1);
    }

    #[test]
    fn membership_add_and_remove() {
        let mut state = fresh_state(10);
        let a = Principal::from_slice(&[1]);
        let b = Principal::from_slice(&[2]);

        assert_eq!(state.add_members(&[a, b, a], 100), 2);
        assert!(state.is_member(&a));
        assert_eq!(state.member_count(), 2);

        assert_eq!(state.remove_members(&[a, Principal::from_slice(&[3])]), 1);
        assert!(!state.is_member(&a));
        assert!(state.is_member(&b));
    }

    #[test]
    fn allowance_saturates_at_zero() {
        let mut state = fresh_state(10);
        let a = Principal::from_slice(&[1]);
        state
            .commit_allocation(a, &[0u8; 32], &[1, 2, 3], BTreeMap::new(), 0)
            .unwrap();
        let mut config = state.config().clone();
        config.per_requester_cap = 2;
        state.set_config(config);
        assert_eq!(state.remaining_allowance(&a), 0);
    }

    #[test]
    fn events_are_paged_in_order() {
        let mut state = fresh_state(300);
        let a = Principal::from_slice(&[1]);
        let units: Vec<UnitId> = (1..=150).collect();
        state
            .commit_allocation(a, &[0u8; 32], &units, BTreeMap::new(), 7)
            .unwrap();

        let page = state.events(0, 500);
        assert_eq!(page.len() as u64, MAX_EVENTS_PAGE);
        assert_eq!(
            page[0].event,
            AuditEvent::UnitIssued { requester: a, unit_id: 1 }
        );

        let tail = state.events(140, 100);
        assert_eq!(tail.len(), 10);
        assert_eq!(
            tail[9].event,
            AuditEvent::UnitIssued { requester: a, unit_id: 150 }
        );
    }

    #[test]
    fn commit_refuses_to_overdraw() {
        let mut state = fresh_state(2);
        let a = Principal::from_slice(&[1]);
        let result = state.commit_allocation(a, &[0u8; 32], &[1, 2, 3], BTreeMap::new(), 0);
        assert!(matches!(result, Err(MintError::SupplyExhausted { .. })));
        assert_eq!(state.pool().issued_count, 0);
        assert_eq!(state.event_count(), 0);
    }
}

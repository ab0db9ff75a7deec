use candid::Principal;

use crate::registry::OwnershipRegistry;
use crate::state::MintState;
use crate::types::{AuditEntry, MintConfig, PoolStats, UnitId};

// =============================================================================
// SUPPLY QUERIES
// =============================================================================

pub fn get_pool_stats(state: &MintState) -> PoolStats {
    state.pool().stats()
}

pub fn get_config(state: &MintState) -> MintConfig {
    state.config().clone()
}

// =============================================================================
// REQUESTER QUERIES
// =============================================================================

pub fn get_remaining_allowance(state: &MintState, requester: Principal) -> u64 {
    state.remaining_allowance(&requester)
}

pub fn units_held(state: &MintState, requester: Principal) -> u64 {
    state.units_held(&requester)
}

pub fn is_member(state: &MintState, identity: Principal) -> bool {
    state.is_member(&identity)
}

// =============================================================================
// REGISTRY & EVENTS
// =============================================================================

pub fn owner_of(registry: &OwnershipRegistry, unit_id: UnitId) -> Option<Principal> {
    registry.owner_of(unit_id)
}

pub fn get_issue_events(state: &MintState, offset: u64, limit: u64) -> Vec<AuditEntry> {
    state.events(offset, limit)
}

use candid::Principal;
use ic_stable_structures::memory_manager::{MemoryId, MemoryManager};
use ic_stable_structures::{DefaultMemoryImpl, StableBTreeMap};

use crate::memory_ids::UNIT_OWNERS_MEMORY_ID;
use crate::types::{MintError, UnitId};
use crate::Memory;

/// Issuance capability the orchestrator depends on.
///
/// `retract` undoes issuances made earlier in the *same* request when a later
/// step fails. It is never used on committed units.
pub trait UnitRegistry {
    fn issue(&mut self, owner: Principal, unit_id: UnitId) -> Result<(), MintError>;
    fn retract(&mut self, unit_ids: &[UnitId]);
}

/// Minimal single-owner registry persisted in stable memory.
pub struct OwnershipRegistry {
    owners: StableBTreeMap<UnitId, Principal, Memory>,
}

impl OwnershipRegistry {
    pub fn init(memory_manager: &MemoryManager<DefaultMemoryImpl>) -> Self {
        Self {
            owners: StableBTreeMap::init(memory_manager.get(MemoryId::new(UNIT_OWNERS_MEMORY_ID))),
        }
    }

    pub fn owner_of(&self, unit_id: UnitId) -> Option<Principal> {
        self.owners.get(&unit_id)
    }

    pub fn total_issued(&self) -> u64 {
        self.owners.len()
    }
}

impl UnitRegistry for OwnershipRegistry {
    fn issue(&mut self, owner: Principal, unit_id: UnitId) -> Result<(), MintError> {
        if unit_id == 0 {
            return Err(MintError::RegistryRejected {
                unit_id,
                reason: "unit 0 is reserved".to_string(),
            });
        }
        if self.owners.contains_key(&unit_id) {
            return Err(MintError::RegistryRejected {
                unit_id,
                reason: "unit already issued".to_string(),
            });
        }
        self.owners.insert(unit_id, owner);
        Ok(())
    }

    fn retract(&mut self, unit_ids: &[UnitId]) {
        for unit_id in unit_ids {
            self.owners.remove(unit_id);
        }
    }
}

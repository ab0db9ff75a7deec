mod model;

use candid::Principal;
use ic_stable_structures::memory_manager::MemoryManager;
use ic_stable_structures::DefaultMemoryImpl;

use crate::registry::OwnershipRegistry;
use crate::state::MintState;
use crate::supply::PoolState;
use crate::types::MintConfig;

pub use model::DenseShuffleModel;

/// Fresh state and registry sharing one in-memory stable memory.
pub fn fixture(capacity: u64, config: MintConfig) -> (MintState, OwnershipRegistry) {
    let manager = MemoryManager::init(DefaultMemoryImpl::default());
    let state = MintState::init(&manager, PoolState::new(capacity), config);
    let registry = OwnershipRegistry::init(&manager);
    (state, registry)
}

pub fn open_config(per_requester_cap: u64) -> MintConfig {
    MintConfig {
        owner: Principal::anonymous(),
        gating_enabled: false,
        per_requester_cap,
        unit_price: 0,
    }
}

pub fn user(id: u8) -> Principal {
    Principal::from_slice(&[id])
}

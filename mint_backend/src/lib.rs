//! Scarce-unit mint canister.
//!
//! **Design Philosophy:**
//! A fixed pool of numbered units (1..=capacity) is handed out in random
//! order without ever materialising the pool. Each request passes an
//! eligibility gate first and then either receives every unit it asked for
//! or nothing.
//!
//! **Randomness:**
//! - Seed: SHA-256 over caller, attached cycles, issued count, previous
//!   commit digest and host time
//! - Predictable by anyone who can observe those inputs (accepted limitation)

use candid::Principal;
use ic_cdk::{init, post_upgrade, pre_upgrade, query, update};
use ic_stable_structures::memory_manager::{MemoryManager, VirtualMemory};
use ic_stable_structures::DefaultMemoryImpl;
use std::cell::RefCell;

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

pub mod admin;
pub mod allocator;
pub mod gate;
pub mod guard;
pub mod memory_ids;
pub mod mint;
pub mod query;
pub mod registry;
pub mod seed;
pub mod state;
pub mod supply;
pub mod types;

#[cfg(test)]
mod tests;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use types::{AuditEntry, MintConfig, MintError, MintInitArgs, MintReceipt, PoolStats, UnitId};

use admin::AdminCaller;
use registry::OwnershipRegistry;
use state::MintState;
use supply::PoolState;
use types::{DEFAULT_CAPACITY, DEFAULT_PER_REQUESTER_CAP};

// =============================================================================
// MEMORY MANAGEMENT
// =============================================================================

pub type Memory = VirtualMemory<DefaultMemoryImpl>;

thread_local! {
    pub static MEMORY_MANAGER: RefCell<MemoryManager<DefaultMemoryImpl>> =
        RefCell::new(MemoryManager::init(DefaultMemoryImpl::default()));

    static STATE: RefCell<Option<MintState>> = const { RefCell::new(None) };
    static REGISTRY: RefCell<Option<OwnershipRegistry>> = const { RefCell::new(None) };
}

fn open_state(pool: PoolState, config: MintConfig) {
    MEMORY_MANAGER.with(|m| {
        let manager = m.borrow();
        STATE.with(|s| *s.borrow_mut() = Some(MintState::init(&manager, pool, config)));
        REGISTRY.with(|r| *r.borrow_mut() = Some(OwnershipRegistry::init(&manager)));
    });
}

fn with_state<T>(f: impl FnOnce(&MintState) -> T) -> T {
    STATE.with(|s| {
        let state = s.borrow();
        match state.as_ref() {
            Some(state) => f(state),
            None => ic_cdk::trap("Mint state not initialized"),
        }
    })
}

fn with_state_mut<T>(f: impl FnOnce(&mut MintState, &mut OwnershipRegistry) -> T) -> T {
    STATE.with(|s| {
        REGISTRY.with(|r| {
            let mut state = s.borrow_mut();
            let mut registry = r.borrow_mut();
            match (state.as_mut(), registry.as_mut()) {
                (Some(state), Some(registry)) => f(state, registry),
                _ => ic_cdk::trap("Mint state not initialized"),
            }
        })
    })
}

fn admin_caller() -> AdminCaller {
    let principal = ic_cdk::api::msg_caller();
    AdminCaller {
        principal,
        is_controller: ic_cdk::api::is_controller(&principal),
    }
}

// =============================================================================
// LIFECYCLE HOOKS
// =============================================================================

#[init]
fn init(args: Option<MintInitArgs>) {
    let args = args.unwrap_or(MintInitArgs {
        capacity: None,
        owner: None,
        per_requester_cap: None,
        unit_price: None,
        gating_enabled: None,
    });

    let capacity = args.capacity.unwrap_or(DEFAULT_CAPACITY);
    if capacity == 0 {
        ic_cdk::trap("Capacity must be at least 1");
    }

    let config = MintConfig {
        owner: args.owner.unwrap_or_else(ic_cdk::api::msg_caller),
        gating_enabled: args.gating_enabled.unwrap_or(false),
        per_requester_cap: args.per_requester_cap.unwrap_or(DEFAULT_PER_REQUESTER_CAP),
        unit_price: args.unit_price.unwrap_or(0),
    };

    ic_cdk::println!(
        "Mint Backend Initialized: capacity {}, config {}",
        capacity,
        serde_json::to_string(&config).unwrap_or_default()
    );
    open_state(PoolState::new(capacity), config);
}

#[pre_upgrade]
fn pre_upgrade() {
    ic_cdk::println!("Pre-upgrade: state persists automatically");
}

#[post_upgrade]
fn post_upgrade() {
    // Stable memory already holds pool and config; these placeholders are ignored.
    open_state(PoolState::new(DEFAULT_CAPACITY), MintConfig::default());
    let stats = with_state(query::get_pool_stats);
    ic_cdk::println!(
        "Post-upgrade: {} of {} units issued",
        stats.issued,
        stats.capacity
    );
}

// =============================================================================
// MINT ENDPOINT
// =============================================================================

/// Payment is the cycles attached to the call. Exactly `unit_price * quantity`
/// cycles are kept on success; everything is refunded on failure.
#[update]
fn mint(quantity: u64) -> Result<MintReceipt, MintError> {
    let requester = ic_cdk::api::msg_caller();
    let payment = ic_cdk::api::msg_cycles_available();
    let request = mint::MintRequest {
        requester,
        quantity,
        payment,
        now: ic_cdk::api::time(),
    };

    let result = with_state_mut(|state, registry| {
        let price = state.config().unit_price;
        mint::allocate(state, registry, request).map(|receipt| (receipt, price))
    });

    match result {
        Ok((receipt, price)) => {
            let cost = price.saturating_mul(quantity as u128);
            let accepted = ic_cdk::api::msg_cycles_accept(cost);
            ic_cdk::println!(
                "Minted {:?} to {} ({} cycles accepted, {} remaining)",
                receipt.units,
                requester,
                accepted,
                receipt.remaining
            );
            Ok(receipt)
        }
        Err(e) => {
            ic_cdk::println!("Mint rejected for {}: {}", requester, e);
            Err(e)
        }
    }
}

// =============================================================================
// ADMIN ENDPOINTS
// =============================================================================

fn log_config_change(action: &str, result: &Result<MintConfig, MintError>) {
    match result {
        Ok(config) => ic_cdk::println!(
            "Admin {}: {}",
            action,
            serde_json::to_string(config).unwrap_or_default()
        ),
        Err(e) => ic_cdk::println!("Admin {} refused: {}", action, e),
    }
}

#[update]
fn set_gating(enabled: bool) -> Result<MintConfig, MintError> {
    let caller = admin_caller();
    let result = with_state_mut(|state, _| admin::set_gating(state, &caller, enabled));
    log_config_change("set_gating", &result);
    result
}

#[update]
fn set_per_requester_cap(cap: u64) -> Result<MintConfig, MintError> {
    let caller = admin_caller();
    let result = with_state_mut(|state, _| admin::set_per_requester_cap(state, &caller, cap));
    log_config_change("set_per_requester_cap", &result);
    result
}

#[update]
fn set_unit_price(price: u128) -> Result<MintConfig, MintError> {
    let caller = admin_caller();
    let result = with_state_mut(|state, _| admin::set_unit_price(state, &caller, price));
    log_config_change("set_unit_price", &result);
    result
}

#[update]
fn transfer_ownership(new_owner: Principal) -> Result<MintConfig, MintError> {
    let caller = admin_caller();
    let result = with_state_mut(|state, _| admin::transfer_ownership(state, &caller, new_owner));
    log_config_change("transfer_ownership", &result);
    result
}

#[update]
fn add_members(identities: Vec<Principal>) -> Result<u64, MintError> {
    let caller = admin_caller();
    let now = ic_cdk::api::time();
    let result = with_state_mut(|state, _| admin::add_members(state, &caller, &identities, now));
    if let Ok(added) = &result {
        ic_cdk::println!("Admin add_members: {} of {} newly admitted", added, identities.len());
    }
    result
}

#[update]
fn remove_members(identities: Vec<Principal>) -> Result<u64, MintError> {
    let caller = admin_caller();
    let result = with_state_mut(|state, _| admin::remove_members(state, &caller, &identities));
    if let Ok(removed) = &result {
        ic_cdk::println!("Admin remove_members: {} removed", removed);
    }
    result
}

// =============================================================================
// QUERY ENDPOINTS
// =============================================================================

#[query]
fn get_remaining_allowance(requester: Principal) -> u64 {
    with_state(|state| query::get_remaining_allowance(state, requester))
}

#[query]
fn get_my_remaining_allowance() -> u64 {
    get_remaining_allowance(ic_cdk::api::msg_caller())
}

#[query]
fn get_pool_stats() -> PoolStats {
    with_state(query::get_pool_stats)
}

#[query]
fn get_config() -> MintConfig {
    with_state(query::get_config)
}

#[query]
fn is_member(identity: Principal) -> bool {
    with_state(|state| query::is_member(state, identity))
}

#[query]
fn units_held(requester: Principal) -> u64 {
    with_state(|state| query::units_held(state, requester))
}

#[query]
fn owner_of(unit_id: UnitId) -> Option<Principal> {
    REGISTRY.with(|r| r.borrow().as_ref().and_then(|registry| query::owner_of(registry, unit_id)))
}

#[query]
fn get_issue_events(offset: u64, limit: u64) -> Vec<AuditEntry> {
    with_state(|state| query::get_issue_events(state, offset, limit))
}

ic_cdk::export_candid!();

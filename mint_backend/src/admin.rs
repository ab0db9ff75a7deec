use candid::Principal;

use crate::state::MintState;
use crate::types::{MintConfig, MintError, MAX_MEMBERS_PER_CALL};

/// Who is calling an admin endpoint. Controllers may always administer.
#[derive(Clone, Copy, Debug)]
pub struct AdminCaller {
    pub principal: Principal,
    pub is_controller: bool,
}

fn require_owner(state: &MintState, caller: &AdminCaller) -> Result<(), MintError> {
    if caller.is_controller || caller.principal == state.config().owner {
        return Ok(());
    }
    Err(MintError::Unauthorized)
}

fn update_config(
    state: &mut MintState,
    caller: &AdminCaller,
    apply: impl FnOnce(&mut MintConfig),
) -> Result<MintConfig, MintError> {
    require_owner(state, caller)?;
    let mut config = state.config().clone();
    apply(&mut config);
    state.set_config(config.clone());
    Ok(config)
}

pub fn set_gating(state: &mut MintState, caller: &AdminCaller, enabled: bool) -> Result<MintConfig, MintError> {
    update_config(state, caller, |c| c.gating_enabled = enabled)
}

pub fn set_per_requester_cap(state: &mut MintState, caller: &AdminCaller, cap: u64) -> Result<MintConfig, MintError> {
    update_config(state, caller, |c| c.per_requester_cap = cap)
}

pub fn set_unit_price(state: &mut MintState, caller: &AdminCaller, price: u128) -> Result<MintConfig, MintError> {
    update_config(state, caller, |c| c.unit_price = price)
}

pub fn transfer_ownership(state: &mut MintState, caller: &AdminCaller, new_owner: Principal) -> Result<MintConfig, MintError> {
    if new_owner == Principal::anonymous() {
        return Err(MintError::InvalidConfig("owner cannot be anonymous".to_string()));
    }
    update_config(state, caller, |c| c.owner = new_owner)
}

fn check_batch(identities: &[Principal]) -> Result<(), MintError> {
    if identities.len() > MAX_MEMBERS_PER_CALL {
        return Err(MintError::InvalidConfig(format!(
            "at most {} identities per call",
            MAX_MEMBERS_PER_CALL
        )));
    }
    Ok(())
}

/// Returns the number of identities newly admitted.
pub fn add_members(state: &mut MintState, caller: &AdminCaller, identities: &[Principal], now: u64) -> Result<u64, MintError> {
    require_owner(state, caller)?;
    check_batch(identities)?;
    Ok(state.add_members(identities, now))
}

/// Returns the number of identities removed.
pub fn remove_members(state: &mut MintState, caller: &AdminCaller, identities: &[Principal]) -> Result<u64, MintError> {
    require_owner(state, caller)?;
    check_batch(identities)?;
    Ok(state.remove_members(identities))
}

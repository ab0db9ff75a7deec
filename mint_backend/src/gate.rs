use crate::supply::PoolState;
use crate::types::{MintConfig, MintError};

/// Everything the gate needs to judge one request. Built by the orchestrator
/// from a read-only view of state.
#[derive(Clone, Debug)]
pub struct GateInput {
    pub is_member: bool,
    pub held: u64,
    pub quantity: u64,
    pub payment: u128,
}

/// Cost of `quantity` units, or `None` if the product does not fit in u128.
pub fn required_payment(config: &MintConfig, quantity: u64) -> Option<u128> {
    config.unit_price.checked_mul(quantity as u128)
}

/// Validate a request against configuration and supply. No state is touched.
///
/// Checks run in a fixed order and the first failure wins:
/// membership, per-requester cap, remaining supply, payment.
pub fn check(config: &MintConfig, pool: &PoolState, input: &GateInput) -> Result<(), MintError> {
    if config.gating_enabled && !input.is_member {
        return Err(MintError::NotEligible);
    }

    let over_cap = input
        .held
        .checked_add(input.quantity)
        .map_or(true, |total| total > config.per_requester_cap);
    if over_cap {
        return Err(MintError::CapExceeded {
            held: input.held,
            requested: input.quantity,
            cap: config.per_requester_cap,
        });
    }

    let remaining = pool.remaining();
    if remaining < input.quantity {
        return Err(MintError::SupplyExhausted {
            remaining,
            requested: input.quantity,
        });
    }

    // An unrepresentable price can never be paid.
    match required_payment(config, input.quantity) {
        Some(required) if input.payment >= required => Ok(()),
        required => Err(MintError::InsufficientPayment {
            required: required.unwrap_or(u128::MAX),
            supplied: input.payment,
        }),
    }
}

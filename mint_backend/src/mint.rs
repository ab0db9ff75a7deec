use candid::Principal;

use crate::allocator::SwapOverlay;
use crate::gate::{self, GateInput};
use crate::guard::MintGuard;
use crate::registry::UnitRegistry;
use crate::seed::{derive_seed, seed_digest, SeedInputs};
use crate::state::MintState;
use crate::types::{MintError, MintReceipt, UnitId};

/// One allocation request, with every host-provided value made explicit.
#[derive(Clone, Debug)]
pub struct MintRequest {
    pub requester: Principal,
    pub quantity: u64,
    /// Cycles attached to the call.
    pub payment: u128,
    /// Host time in nanoseconds; doubles as the weight signal of the seed.
    pub now: u64,
}

// =============================================================================
// MAIN ALLOCATION LOGIC
// =============================================================================

/// Allocate `quantity` random units to the requester, or nothing at all.
pub fn allocate<R: UnitRegistry>(
    state: &mut MintState,
    registry: &mut R,
    request: MintRequest,
) -> Result<MintReceipt, MintError> {
    let _guard = MintGuard::acquire()?;

    if request.quantity == 0 {
        return Err(MintError::InvalidQuantity);
    }

    let requester = request.requester;
    let gate_input = GateInput {
        is_member: state.is_member(&requester),
        held: state.units_held(&requester),
        quantity: request.quantity,
        payment: request.payment,
    };
    gate::check(state.config(), state.pool(), &gate_input)?;

    let pool = state.pool();
    let seed = derive_seed(&SeedInputs {
        requester,
        fee_signal: request.payment,
        sequence_position: pool.issued_count,
        prior_digest: pool.last_mint_digest,
        weight_signal: request.now,
    });

    let mut overlay = SwapOverlay::new(state.swap_table(), pool.remaining());
    let mut units: Vec<UnitId> = Vec::with_capacity(request.quantity as usize);

    for draw_index in 0..request.quantity {
        let issued = overlay
            .draw_one(&seed, draw_index)
            .map(|index| index + 1)
            .and_then(|unit_id| registry.issue(requester, unit_id).map(|_| unit_id));

        match issued {
            Ok(unit_id) => units.push(unit_id),
            Err(e) => {
                registry.retract(&units);
                return Err(e);
            }
        }
    }

    let writes = overlay.into_writes();
    if let Err(e) = state.commit_allocation(requester, &seed, &units, writes, request.now) {
        registry.retract(&units);
        return Err(e);
    }

    Ok(MintReceipt {
        units,
        remaining: state.pool().remaining(),
        seed_digest: seed_digest(&seed),
    })
}

use std::cell::RefCell;

use crate::types::MintError;

thread_local! {
    static ALLOCATION_IN_PROGRESS: RefCell<bool> = const { RefCell::new(false) };
}

/// Guard against reentrant allocation.
/// Uses RAII pattern to release the flag on every exit path.
pub struct MintGuard {
    _private: (),
}

impl MintGuard {
    /// Returns error if an allocation is already running on this canister.
    pub fn acquire() -> Result<Self, MintError> {
        ALLOCATION_IN_PROGRESS.with(|flag| {
            let mut flag = flag.borrow_mut();
            if *flag {
                return Err(MintError::AllocationInProgress);
            }
            *flag = true;
            Ok(Self { _private: () })
        })
    }
}

impl Drop for MintGuard {
    fn drop(&mut self) {
        ALLOCATION_IN_PROGRESS.with(|flag| {
            *flag.borrow_mut() = false;
        });
    }
}

/// Query: whether an allocation currently holds the guard.
pub fn is_allocation_active() -> bool {
    ALLOCATION_IN_PROGRESS.with(|flag| *flag.borrow())
}

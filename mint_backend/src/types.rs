use candid::{CandidType, Deserialize, Principal};
use ic_stable_structures::storable::Bound;
use ic_stable_structures::Storable;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

// =============================================================================
// CONSTANTS
// =============================================================================

pub const DEFAULT_CAPACITY: u64 = 10_000;
pub const DEFAULT_PER_REQUESTER_CAP: u64 = 5;
pub const MAX_EVENTS_PAGE: u64 = 100;
pub const MAX_MEMBERS_PER_CALL: usize = 500;

/// Unit identifiers are 1-based; 0 is never issued.
pub type UnitId = u64;

// =============================================================================
// INIT ARGS
// =============================================================================

#[derive(CandidType, Deserialize, Serialize, Clone, Debug)]
pub struct MintInitArgs {
    pub capacity: Option<u64>,
    pub owner: Option<Principal>,
    pub per_requester_cap: Option<u64>,
    pub unit_price: Option<u128>,
    pub gating_enabled: Option<bool>,
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Runtime configuration. Written only by the admin surface, read by the core.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct MintConfig {
    pub owner: Principal,
    pub gating_enabled: bool,
    pub per_requester_cap: u64,
    /// Price of one unit, in cycles.
    pub unit_price: u128,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            owner: Principal::anonymous(),
            gating_enabled: false,
            per_requester_cap: DEFAULT_PER_REQUESTER_CAP,
            unit_price: 0,
        }
    }
}

impl Storable for MintConfig {
    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(
            candid::encode_one(self).expect(
                "CRITICAL: Failed to encode MintConfig. \
                 This should never happen unless there's a bug in candid serialization."
            )
        )
    }

    fn into_bytes(self) -> Vec<u8> {
        self.to_bytes().into_owned()
    }

    fn from_bytes(bytes: Cow<'_, [u8]>) -> Self {
        candid::decode_one(&bytes).expect(
            "CRITICAL: Failed to decode MintConfig from stable storage. \
             This indicates storage corruption or an incompatible canister upgrade."
        )
    }

    const BOUND: Bound = Bound::Unbounded;
}

// =============================================================================
// API TYPES
// =============================================================================

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PoolStats {
    pub capacity: u64,
    pub issued: u64,
    pub remaining: u64,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct MintReceipt {
    /// Issued identifiers, in draw order.
    pub units: Vec<UnitId>,
    pub remaining: u64,
    /// Hex SHA-256 of the request seed.
    pub seed_digest: String,
}

// =============================================================================
// EVENTS
// =============================================================================

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AuditEntry {
    pub timestamp: u64,
    pub event: AuditEvent,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub enum AuditEvent {
    UnitIssued { requester: Principal, unit_id: UnitId },
}

impl Storable for AuditEntry {
    fn to_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(
            candid::encode_one(self).expect(
                "CRITICAL: Failed to encode AuditEntry. \
                 Audit logging is failing - system integrity may be compromised."
            )
        )
    }

    fn into_bytes(self) -> Vec<u8> {
        self.to_bytes().into_owned()
    }

    fn from_bytes(bytes: Cow<'_, [u8]>) -> Self {
        candid::decode_one(&bytes).expect(
            "CRITICAL: Failed to decode AuditEntry from stable storage. \
             Audit trail integrity cannot be guaranteed."
        )
    }

    const BOUND: Bound = Bound::Bounded {
        max_size: 200,
        is_fixed_size: false,
    };
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub enum MintError {
    NotEligible,
    CapExceeded { held: u64, requested: u64, cap: u64 },
    SupplyExhausted { remaining: u64, requested: u64 },
    InsufficientPayment { required: u128, supplied: u128 },
    InvalidQuantity,
    AllocationInProgress,
    Unauthorized,
    RegistryRejected { unit_id: UnitId, reason: String },
    InvalidConfig(String),
}

impl fmt::Display for MintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MintError::NotEligible => write!(f, "Caller is not on the membership list"),
            MintError::CapExceeded { held, requested, cap } => write!(
                f,
                "Per-requester cap exceeded: holds {}, requested {}, cap {}",
                held, requested, cap
            ),
            MintError::SupplyExhausted { remaining, requested } => write!(
                f,
                "Supply exhausted: {} remaining, {} requested",
                remaining, requested
            ),
            MintError::InsufficientPayment { required, supplied } => write!(
                f,
                "Insufficient payment: {} cycles required, {} supplied",
                required, supplied
            ),
            MintError::InvalidQuantity => write!(f, "Quantity must be at least 1"),
            MintError::AllocationInProgress => write!(f, "Allocation already in progress"),
            MintError::Unauthorized => write!(f, "Unauthorized: owner only"),
            MintError::RegistryRejected { unit_id, reason } => {
                write!(f, "Registry rejected unit {}: {}", unit_id, reason)
            }
            MintError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for MintError {}

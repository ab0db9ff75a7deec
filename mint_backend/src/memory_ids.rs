//! Central registry for stable memory IDs.
//!
//! IMPORTANT: All memory IDs must be unique across the entire canister.
//!
//! Allocation strategy:
//! - 0-9: Supply state (pool, swap table)
//! - 10-19: Requester state (issued counts, membership)
//! - 20-29: Configuration
//! - 30-39: Registry & events

// Supply state (0-9)
pub const POOL_STATE_MEMORY_ID: u8 = 0;
pub const SWAP_TABLE_MEMORY_ID: u8 = 1;

// Requester state (10-19)
pub const REQUESTER_COUNTS_MEMORY_ID: u8 = 10;
pub const MEMBERSHIP_MEMORY_ID: u8 = 11;

// Configuration (20-29)
pub const CONFIG_MEMORY_ID: u8 = 20;

// Registry & events (30-39)
pub const UNIT_OWNERS_MEMORY_ID: u8 = 30;
pub const AUDIT_LOG_MAP_MEMORY_ID: u8 = 31;

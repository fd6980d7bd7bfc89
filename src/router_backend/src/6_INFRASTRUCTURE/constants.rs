//! Router constants

use ic_stable_structures::memory_manager::MemoryId;

/// Memo attached to every ledger call the router makes
pub const ROUTER_MEMO: &[u8] = b"router settlement";

/// Allowance expiry for AMM grants (15 minutes)
pub const APPROVAL_EXPIRY_NANOS: u64 = 900_000_000_000;

/// Ledger fees the router pays on a granted input: allowance reset,
/// allowance raise, the AMM's pull and the final revoke
pub const GRANTED_INPUT_FEES: u64 = 4;

/// Admin log entries kept in heap memory
pub const MAX_ADMIN_LOG_ENTRIES: usize = 1000;

/// Largest page returned by `get_events`
pub const MAX_EVENTS_PAGE: u64 = 100;

/// Decimal places used when displaying execution prices
pub const PRICE_DISPLAY_DP: u32 = 8;

// Stable memory layout
pub const CONFIG_MEMORY_ID: MemoryId = MemoryId::new(0);
pub const EVENT_INDEX_MEMORY_ID: MemoryId = MemoryId::new(1);
pub const EVENT_DATA_MEMORY_ID: MemoryId = MemoryId::new(2);

//! Stable storage management for upgrade persistence
//!
//! Router configuration lives in a `StableCell`, the audit trail in a
//! `StableLog`. Both sit in virtual memories carved out by one
//! `MemoryManager`, so nothing needs saving in `pre_upgrade`.

use std::borrow::Cow;
use std::cell::RefCell;
use candid::{CandidType, Deserialize, Principal};
use ic_stable_structures::memory_manager::{MemoryManager, VirtualMemory};
use ic_stable_structures::storable::Bound;
use ic_stable_structures::{DefaultMemoryImpl, StableCell, StableLog, Storable};
use serde::Serialize;
use crate::infrastructure::constants::{CONFIG_MEMORY_ID, EVENT_DATA_MEMORY_ID, EVENT_INDEX_MEMORY_ID};
use crate::infrastructure::events::RouterEvent;
use crate::infrastructure::{Result, RouterError, SystemError};

type Memory = VirtualMemory<DefaultMemoryImpl>;

/// Persistent router configuration
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    pub owner: Principal,
    pub paused: bool,
    pub amm_canister: Principal,
    pub native_ledger: Principal,
    pub wrapped_native: Principal,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            owner: Principal::anonymous(),
            paused: false,
            amm_canister: Principal::anonymous(),
            native_ledger: Principal::anonymous(),
            wrapped_native: Principal::anonymous(),
        }
    }
}

impl Storable for RouterConfig {
    fn to_bytes(&self) -> Cow<[u8]> {
        Cow::Owned(candid::encode_one(self).expect("RouterConfig is always candid-encodable"))
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        candid::decode_one(&bytes).expect("RouterConfig bytes were written by to_bytes")
    }

    const BOUND: Bound = Bound::Unbounded;
}

impl Storable for RouterEvent {
    fn to_bytes(&self) -> Cow<[u8]> {
        Cow::Owned(candid::encode_one(self).expect("RouterEvent is always candid-encodable"))
    }

    fn from_bytes(bytes: Cow<[u8]>) -> Self {
        candid::decode_one(&bytes).expect("RouterEvent bytes were written by to_bytes")
    }

    const BOUND: Bound = Bound::Unbounded;
}

thread_local! {
    static MEMORY_MANAGER: RefCell<MemoryManager<DefaultMemoryImpl>> =
        RefCell::new(MemoryManager::init(DefaultMemoryImpl::default()));

    static CONFIG: RefCell<StableCell<RouterConfig, Memory>> = RefCell::new(
        StableCell::init(
            MEMORY_MANAGER.with(|m| m.borrow().get(CONFIG_MEMORY_ID)),
            RouterConfig::default(),
        )
        .expect("Failed to initialize config cell"),
    );

    static EVENT_LOG: RefCell<StableLog<RouterEvent, Memory, Memory>> = RefCell::new(
        StableLog::init(
            MEMORY_MANAGER.with(|m| m.borrow().get(EVENT_INDEX_MEMORY_ID)),
            MEMORY_MANAGER.with(|m| m.borrow().get(EVENT_DATA_MEMORY_ID)),
        )
        .expect("Failed to initialize event log"),
    );
}

/// Current router configuration
pub fn read_config() -> RouterConfig {
    CONFIG.with(|cell| cell.borrow().get().clone())
}

/// Apply `change` to the configuration and persist it
pub fn update_config<F>(change: F) -> Result<RouterConfig>
where
    F: FnOnce(&mut RouterConfig),
{
    CONFIG.with(|cell| {
        let mut cell = cell.borrow_mut();
        let mut config = cell.get().clone();
        change(&mut config);
        cell.set(config.clone()).map_err(|e| {
            crate::log!("⚠️ Failed to persist router config: {:?}", e);
            RouterError::System(SystemError::StorageFailed {
                reason: format!("config write failed: {:?}", e),
            })
        })?;
        Ok(config)
    })
}

/// Append a record to the event log, returning its sequence number
pub fn append_event(event: &RouterEvent) -> Result<u64> {
    EVENT_LOG.with(|log| {
        log.borrow_mut().append(event).map_err(|e| {
            crate::log!("⚠️ Failed to append event {}: {:?}", event.sequence, e);
            RouterError::System(SystemError::StorageFailed {
                reason: format!("event log write failed: {:?}", e),
            })
        })
    })
}

pub fn event_count() -> u64 {
    EVENT_LOG.with(|log| log.borrow().len())
}

/// Read up to `limit` events starting at `offset`
pub fn read_events(offset: u64, limit: u64) -> Vec<RouterEvent> {
    EVENT_LOG.with(|log| {
        let log = log.borrow();
        let end = offset.saturating_add(limit).min(log.len());
        (offset..end).filter_map(|idx| log.get(idx)).collect()
    })
}

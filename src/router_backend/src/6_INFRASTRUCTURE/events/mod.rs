//! Event ledger - auditable records of completed operations
//!
//! Records are written once per successful operation. Operations stage their
//! record in the custody journal and only the journal's commit reaches
//! `emit`, so a failed operation never leaves a record behind.

use candid::{CandidType, Deserialize, Nat, Principal};
use serde::Serialize;
use crate::infrastructure::stable_storage;
use crate::infrastructure::Result;
use crate::types::Asset;

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum RouterEventKind {
    SwapExecuted {
        sender: Principal,
        asset_in: Asset,
        asset_out: Asset,
        amount_in: Nat,
        amount_out: Nat,
    },
    LiquidityAdded {
        sender: Principal,
        token_a: Asset,
        token_b: Asset,
        amount_a: Nat,
        amount_b: Nat,
        liquidity_minted: Nat,
    },
    LiquidityRemoved {
        sender: Principal,
        token_a: Asset,
        token_b: Asset,
        amount_a: Nat,
        amount_b: Nat,
        liquidity_burned: Nat,
    },
}

impl RouterEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            RouterEventKind::SwapExecuted { .. } => "SwapExecuted",
            RouterEventKind::LiquidityAdded { .. } => "LiquidityAdded",
            RouterEventKind::LiquidityRemoved { .. } => "LiquidityRemoved",
        }
    }
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RouterEvent {
    pub sequence: u64,
    pub timestamp: u64,
    pub kind: RouterEventKind,
}

/// Persist one record
pub fn emit(kind: RouterEventKind, now: u64) -> Result<u64> {
    let event = RouterEvent {
        sequence: stable_storage::event_count(),
        timestamp: now,
        kind,
    };
    let sequence = stable_storage::append_event(&event)?;
    crate::log!("📜 {} #{} recorded", event.kind.name(), sequence);
    Ok(sequence)
}

pub fn get_events(offset: u64, limit: u64) -> Vec<RouterEvent> {
    stable_storage::read_events(offset, limit)
}

pub fn total_events() -> u64 {
    stable_storage::event_count()
}

//! Display module - router status, event history and quotes for UIs

use std::str::FromStr;
use candid::{CandidType, Deserialize, Nat, Principal};
use rust_decimal::Decimal;
use serde::Serialize;
use crate::_2_CRITICAL_DATA::validation;
use crate::_3_AMM_SERVICE::Collaborators;
use crate::_4_TRADING_EXECUTION::delegate;
use crate::infrastructure::constants::{MAX_EVENTS_PAGE, PRICE_DISPLAY_DP};
use crate::infrastructure::events::{self, RouterEvent};
use crate::infrastructure::reentrancy::{router_guard_state, GuardState};
use crate::infrastructure::stable_storage;
use crate::infrastructure::Result;

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RouterStatus {
    pub owner: Principal,
    pub paused: bool,
    /// Operation currently holding the router lock, if any
    pub active_operation: Option<String>,
    pub event_count: u64,
    pub amm_canister: Principal,
    pub native_ledger: Principal,
    pub wrapped_native: Principal,
}

pub fn get_router_status() -> RouterStatus {
    let config = stable_storage::read_config();
    let active_operation = match router_guard_state() {
        GuardState::Locked { operation } => Some(operation.to_string()),
        GuardState::Unlocked => None,
    };

    RouterStatus {
        owner: config.owner,
        paused: config.paused,
        active_operation,
        event_count: events::total_events(),
        amm_canister: config.amm_canister,
        native_ledger: config.native_ledger,
        wrapped_native: config.wrapped_native,
    }
}

/// One page of the event history, oldest first. `limit` is capped.
pub fn get_events(offset: u64, limit: u64) -> Vec<RouterEvent> {
    events::get_events(offset, limit.min(MAX_EVENTS_PAGE))
}

// === QUOTES ===

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub amounts: Vec<Nat>,
    pub amount_in: Nat,
    pub amount_out: Nat,
    /// Output per unit of input, rounded for display
    pub execution_price: Option<String>,
}

fn to_decimal(amount: &Nat) -> Option<Decimal> {
    // BigUint's Display has no digit separators, unlike Nat's
    Decimal::from_str(&amount.0.to_string()).ok()
}

/// `amount_out / amount_in`, or None when it does not fit a Decimal
pub fn execution_price(amount_in: &Nat, amount_out: &Nat) -> Option<Decimal> {
    let input = to_decimal(amount_in)?;
    let output = to_decimal(amount_out)?;
    output
        .checked_div(input)
        .map(|price| price.round_dp(PRICE_DISPLAY_DP).normalize())
}

fn build_quote(amounts: Vec<Nat>) -> Quote {
    let amount_in = amounts[0].clone();
    let amount_out = amounts[amounts.len() - 1].clone();
    let execution_price = execution_price(&amount_in, &amount_out).map(|p| p.to_string());
    Quote { amounts, amount_in, amount_out, execution_price }
}

/// What `amount_in` would buy along `path` right now
pub async fn quote_exact_in<C: Collaborators>(deps: &C, amount_in: Nat, path: Vec<Principal>) -> Result<Quote> {
    validation::check_path(&path)?;
    validation::check_positive(&amount_in, "amount_in")?;

    let amounts = delegate::quote_amounts_out(deps, amount_in, path).await?;
    Ok(build_quote(amounts))
}

/// What it would cost to receive `amount_out` along `path` right now
pub async fn quote_exact_out<C: Collaborators>(deps: &C, amount_out: Nat, path: Vec<Principal>) -> Result<Quote> {
    validation::check_path(&path)?;
    validation::check_positive(&amount_out, "amount_out")?;

    let amounts = delegate::quote_amounts_in(deps, amount_out, path).await?;
    Ok(build_quote(amounts))
}

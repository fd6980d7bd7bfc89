//! Router Backend - Swap and liquidity router in front of an external AMM
//!
//! Architecture:
//! 1_CRITICAL_OPERATIONS - Swaps, liquidity, rescue (move caller value)
//! 2_CRITICAL_DATA - Input validation, custody journal
//! 3_AMM_SERVICE - Ledger and AMM collaborator traits and canister adapters
//! 4_TRADING_EXECUTION - Approvals and AMM delegation
//! 5_INFORMATIONAL - Status, event history, quotes
//! 6_INFRASTRUCTURE - Errors, guard, storage, events, admin

// Import numbered modules with explicit paths
#[path = "1_CRITICAL_OPERATIONS/mod.rs"]
mod critical_operations_1;
use critical_operations_1 as _1_CRITICAL_OPERATIONS;

#[path = "2_CRITICAL_DATA/mod.rs"]
mod critical_data_2;
use critical_data_2 as _2_CRITICAL_DATA;

#[path = "3_AMM_SERVICE/mod.rs"]
mod amm_service_3;
use amm_service_3 as _3_AMM_SERVICE;

#[path = "4_TRADING_EXECUTION/mod.rs"]
mod trading_execution_4;
use trading_execution_4 as _4_TRADING_EXECUTION;

#[path = "5_INFORMATIONAL/mod.rs"]
mod informational_5;
use informational_5 as _5_INFORMATIONAL;

#[path = "6_INFRASTRUCTURE/mod.rs"]
mod infrastructure_6;
use infrastructure_6 as infrastructure;

mod types;

#[cfg(test)]
mod test_support;

use candid::{candid_method, Nat, Principal};
use ic_cdk::{init, post_upgrade, query, update};
use _3_AMM_SERVICE::canister::IcCollaborators;
use _5_INFORMATIONAL::display::{Quote, RouterStatus};
use infrastructure::admin::{self, AdminAction};
use infrastructure::events::RouterEvent;
use infrastructure::{stable_storage, Result};
use types::*;

fn call_context(value: Nat) -> CallContext {
    CallContext {
        caller: ic_cdk::caller(),
        now: ic_cdk::api::time(),
        value,
    }
}

fn no_value() -> CallContext {
    call_context(Nat::from(0u64))
}

// ===== SWAPS =====

#[update]
#[candid_method(update)]
async fn swap_exact_tokens_for_tokens(args: SwapExactInArgs) -> Result<SwapReceipt> {
    let deps = IcCollaborators::current();
    _1_CRITICAL_OPERATIONS::swaps::swap_exact_tokens_for_tokens(&deps, &no_value(), args).await
}

#[update]
#[candid_method(update)]
async fn swap_tokens_for_exact_tokens(args: SwapExactOutArgs) -> Result<SwapReceipt> {
    let deps = IcCollaborators::current();
    _1_CRITICAL_OPERATIONS::swaps::swap_tokens_for_exact_tokens(&deps, &no_value(), args).await
}

/// `value` is the native amount the caller approved the router to draw
#[update]
#[candid_method(update)]
async fn swap_exact_native_for_tokens(args: SwapExactNativeInArgs, value: Nat) -> Result<SwapReceipt> {
    let deps = IcCollaborators::current();
    _1_CRITICAL_OPERATIONS::swaps::swap_exact_native_for_tokens(&deps, &call_context(value), args).await
}

#[update]
#[candid_method(update)]
async fn swap_tokens_for_exact_native(args: SwapExactNativeOutArgs) -> Result<SwapReceipt> {
    let deps = IcCollaborators::current();
    _1_CRITICAL_OPERATIONS::swaps::swap_tokens_for_exact_native(&deps, &no_value(), args).await
}

#[update]
#[candid_method(update)]
async fn swap_exact_tokens_for_native(args: SwapExactInForNativeArgs) -> Result<SwapReceipt> {
    let deps = IcCollaborators::current();
    _1_CRITICAL_OPERATIONS::swaps::swap_exact_tokens_for_native(&deps, &no_value(), args).await
}

#[update]
#[candid_method(update)]
async fn swap_native_for_exact_tokens(args: SwapNativeForExactOutArgs, value: Nat) -> Result<SwapReceipt> {
    let deps = IcCollaborators::current();
    _1_CRITICAL_OPERATIONS::swaps::swap_native_for_exact_tokens(&deps, &call_context(value), args).await
}

// ===== LIQUIDITY =====

#[update]
#[candid_method(update)]
async fn add_liquidity(args: AddLiquidityArgs) -> Result<LiquidityAddition> {
    let deps = IcCollaborators::current();
    _1_CRITICAL_OPERATIONS::liquidity::add_liquidity(&deps, &no_value(), args).await
}

#[update]
#[candid_method(update)]
async fn add_liquidity_native(args: AddLiquidityNativeArgs, value: Nat) -> Result<LiquidityAddition> {
    let deps = IcCollaborators::current();
    _1_CRITICAL_OPERATIONS::liquidity::add_liquidity_native(&deps, &call_context(value), args).await
}

#[update]
#[candid_method(update)]
async fn remove_liquidity(args: RemoveLiquidityArgs) -> Result<LiquidityRemoval> {
    let deps = IcCollaborators::current();
    _1_CRITICAL_OPERATIONS::liquidity::remove_liquidity(&deps, &no_value(), args).await
}

#[update]
#[candid_method(update)]
async fn remove_liquidity_native(args: RemoveLiquidityNativeArgs) -> Result<LiquidityRemoval> {
    let deps = IcCollaborators::current();
    _1_CRITICAL_OPERATIONS::liquidity::remove_liquidity_native(&deps, &no_value(), args).await
}

// ===== QUOTES =====

/// Quotes call the AMM, so they run as updates
#[update]
#[candid_method(update)]
async fn quote_exact_in(amount_in: Nat, path: Vec<Principal>) -> Result<Quote> {
    let deps = IcCollaborators::current();
    _5_INFORMATIONAL::display::quote_exact_in(&deps, amount_in, path).await
}

#[update]
#[candid_method(update)]
async fn quote_exact_out(amount_out: Nat, path: Vec<Principal>) -> Result<Quote> {
    let deps = IcCollaborators::current();
    _5_INFORMATIONAL::display::quote_exact_out(&deps, amount_out, path).await
}

// ===== QUERIES =====

#[query]
#[candid_method(query)]
fn get_router_status() -> RouterStatus {
    _5_INFORMATIONAL::display::get_router_status()
}

#[query]
#[candid_method(query)]
fn get_events(offset: u64, limit: u64) -> Vec<RouterEvent> {
    _5_INFORMATIONAL::display::get_events(offset, limit)
}

#[query]
#[candid_method(query)]
fn get_owner() -> Principal {
    admin::get_owner()
}

#[query]
#[candid_method(query)]
fn get_admin_action_log() -> Vec<AdminAction> {
    admin::get_admin_log()
}

#[query]
#[candid_method(query)]
fn get_canister_id() -> Principal {
    ic_cdk::id()
}

// ===== ADMIN CONTROLS =====

#[update]
#[candid_method(update)]
fn transfer_ownership(new_owner: Principal) -> Result<()> {
    admin::transfer_ownership(ic_cdk::caller(), new_owner, ic_cdk::api::time())
}

#[update]
#[candid_method(update)]
fn set_paused(paused: bool) -> Result<()> {
    admin::set_paused(ic_cdk::caller(), paused, ic_cdk::api::time())
}

#[update]
#[candid_method(update)]
async fn rescue_asset(token: Principal, amount: Nat) -> Result<()> {
    let deps = IcCollaborators::current();
    _1_CRITICAL_OPERATIONS::rescue::rescue_asset(&deps, &no_value(), token, amount).await
}

#[update]
#[candid_method(update)]
async fn rescue_native(amount: Nat) -> Result<()> {
    let deps = IcCollaborators::current();
    _1_CRITICAL_OPERATIONS::rescue::rescue_native(&deps, &no_value(), amount).await
}

// ===== INITIALIZATION =====

#[init]
fn init(args: RouterInitArgs) {
    let owner = args.owner.unwrap_or_else(ic_cdk::caller);

    let written = stable_storage::update_config(|config| {
        config.owner = owner;
        config.paused = false;
        config.amm_canister = args.amm_canister;
        config.native_ledger = args.native_ledger;
        config.wrapped_native = args.wrapped_native;
    });
    if let Err(e) = written {
        ic_cdk::trap(&format!("Router init failed: {}", e));
    }

    crate::log!("===================================");
    crate::log!("Router Backend Initialized");
    crate::log!("Owner: {}", owner);
    crate::log!("AMM: {}", args.amm_canister);
    crate::log!("===================================");
}

#[post_upgrade]
fn post_upgrade() {
    let config = stable_storage::read_config();
    crate::log!("===================================");
    crate::log!("Router Backend Post-Upgrade");
    crate::log!(
        "✅ Config restored (owner {}, paused {}), {} events on record",
        config.owner,
        config.paused,
        infrastructure::events::total_events()
    );
    crate::log!("===================================");
}

// Export Candid interface
ic_cdk::export_candid!();

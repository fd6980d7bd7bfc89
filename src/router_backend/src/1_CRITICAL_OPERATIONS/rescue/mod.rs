//! Owner-only recovery of value stranded in the router
//!
//! Normal operations leave nothing behind. Residue only appears when a
//! compensation step fails or when someone sends assets to the router
//! directly; the owner can move it out from here. Rescue stays available
//! while the router is paused. The ledger fee comes out of the rescued
//! amount.

use candid::{Nat, Principal};
use crate::_2_CRITICAL_DATA::{validation, CustodyJournal};
use crate::_3_AMM_SERVICE::Collaborators;
use crate::infrastructure::{acquire_router_lock, log_admin_action, require_router_owner, Result};
use crate::types::CallContext;

/// Send `amount` of `token` held by the router to the owner
pub async fn rescue_asset<C: Collaborators>(deps: &C, ctx: &CallContext, token: Principal, amount: Nat) -> Result<()> {
    let owner = require_router_owner(&ctx.caller, "rescue_asset")?;
    validation::check_principal(&token, "token")?;
    validation::check_positive(&amount, "amount")?;
    let _lock = acquire_router_lock("rescue_asset")?;

    let mut journal = CustodyJournal::open(deps, "rescue_asset", ctx);
    let outcome = journal.push_out(token, owner, &amount).await;
    let delivered = journal.settle(outcome).await?;

    log_admin_action(owner, format!("RESCUE_ASSET {} of {} ({} delivered)", amount, token, delivered), ctx.now);
    Ok(())
}

/// Send `amount` of the router's native balance to the owner
pub async fn rescue_native<C: Collaborators>(deps: &C, ctx: &CallContext, amount: Nat) -> Result<()> {
    let owner = require_router_owner(&ctx.caller, "rescue_native")?;
    validation::check_positive(&amount, "amount")?;
    let _lock = acquire_router_lock("rescue_native")?;

    let mut journal = CustodyJournal::open(deps, "rescue_native", ctx);
    let outcome = journal.send_native(owner, &amount).await;
    let delivered = journal.settle(outcome).await?;

    log_admin_action(owner, format!("RESCUE_NATIVE {} ({} delivered)", amount, delivered), ctx.now);
    Ok(())
}

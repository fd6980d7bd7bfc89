//! Liquidity provisioning and withdrawal
//!
//! Adding pulls the full desired amounts, lets the AMM take what the pool
//! ratio allows and refunds the rest. Removing checks the pool and the
//! caller's shares before any transfer, then hands the shares to the AMM,
//! which pays both sides straight to the recipient.

use candid::{Nat, Principal};
use crate::_2_CRITICAL_DATA::{share_balance, validation, CustodyJournal};
use crate::_3_AMM_SERVICE::{AmmService, Collaborators};
use crate::_4_TRADING_EXECUTION::{approvals, delegate};
use crate::infrastructure::{acquire_router_lock, check_not_paused, LiquidityError, Result, RouterError};
use crate::infrastructure::events::RouterEventKind;
use crate::types::amm::{
    AddLiquidityNativeRequest, AddLiquidityRequest, RemoveLiquidityNativeRequest, RemoveLiquidityRequest,
};
use crate::types::{
    AddLiquidityArgs, AddLiquidityNativeArgs, Asset, CallContext, LiquidityAddition, LiquidityRemoval,
    RemoveLiquidityArgs, RemoveLiquidityNativeArgs,
};


// === ADD ===

pub async fn add_liquidity<C: Collaborators>(deps: &C, ctx: &CallContext, args: AddLiquidityArgs) -> Result<LiquidityAddition> {
    validation::validate_add_liquidity(&args, ctx.now)?;
    check_not_paused()?;
    let _lock = acquire_router_lock("add_liquidity")?;

    crate::log!(
        "💧 add_liquidity for {}: {} {} + {} {}",
        ctx.caller, args.amount_a_desired, args.token_a, args.amount_b_desired, args.token_b
    );

    let mut journal = CustodyJournal::open(deps, "add_liquidity", ctx);
    let outcome = run_add(&mut journal, args).await;
    journal.settle(outcome).await
}

async fn run_add<C: Collaborators>(journal: &mut CustodyJournal<'_, C>, args: AddLiquidityArgs) -> Result<LiquidityAddition> {
    let deps = journal.deps();
    let caller = journal.caller();
    let spender = deps.amm().id();

    // Step 1: Escrow both sides
    journal.pull_in(args.token_a, &args.amount_a_desired).await?;
    journal.pull_in(args.token_b, &args.amount_b_desired).await?;

    // Step 2: Let the AMM take them
    approvals::grant(journal, args.token_a, spender, &args.amount_a_desired).await?;
    approvals::grant(journal, args.token_b, spender, &args.amount_b_desired).await?;

    // Step 3: Delegate; shares go straight to the recipient
    let addition = delegate::add_liquidity(deps, AddLiquidityRequest {
        token_a: args.token_a,
        token_b: args.token_b,
        amount_a_desired: args.amount_a_desired.clone(),
        amount_b_desired: args.amount_b_desired.clone(),
        amount_a_min: args.amount_a_min,
        amount_b_min: args.amount_b_min,
        to: args.recipient,
        deadline: args.deadline,
    }).await?;
    journal.record_consumed(Asset::Token(args.token_a), &addition.amount_a).await?;
    journal.record_consumed(Asset::Token(args.token_b), &addition.amount_b).await?;

    // Step 4: Close allowances
    approvals::revoke(journal, args.token_a, spender).await?;
    approvals::revoke(journal, args.token_b, spender).await?;

    // Step 5: Refund what the pool ratio did not take
    journal.refund_unused(args.token_a, caller, &args.amount_a_desired, &addition.amount_a).await?;
    journal.refund_unused(args.token_b, caller, &args.amount_b_desired, &addition.amount_b).await?;

    journal.stage(RouterEventKind::LiquidityAdded {
        sender: caller,
        token_a: Asset::Token(args.token_a),
        token_b: Asset::Token(args.token_b),
        amount_a: addition.amount_a.clone(),
        amount_b: addition.amount_b.clone(),
        liquidity_minted: addition.liquidity.clone(),
    });

    crate::log!("✅ Minted {} shares for {}", addition.liquidity, args.recipient);
    Ok(addition)
}

/// Token side is pulled, native side is the attached value
///
/// In the returned addition `amount_a` is the token and `amount_b` the native
/// amount the pool took.
pub async fn add_liquidity_native<C: Collaborators>(deps: &C, ctx: &CallContext, args: AddLiquidityNativeArgs) -> Result<LiquidityAddition> {
    validation::validate_add_liquidity_native(&args, &ctx.value, &deps.amm().wrapped_native(), ctx.now)?;
    check_not_paused()?;
    let _lock = acquire_router_lock("add_liquidity_native")?;

    crate::log!(
        "💧 add_liquidity_native for {}: {} {} + {} native",
        ctx.caller, args.amount_token_desired, args.token, ctx.value
    );

    let mut journal = CustodyJournal::open(deps, "add_liquidity_native", ctx);
    let outcome = run_add_native(&mut journal, args, ctx.value.clone()).await;
    journal.settle(outcome).await
}

async fn run_add_native<C: Collaborators>(journal: &mut CustodyJournal<'_, C>, args: AddLiquidityNativeArgs, value: Nat) -> Result<LiquidityAddition> {
    let deps = journal.deps();
    let caller = journal.caller();
    let spender = deps.amm().id();

    // Step 1: Escrow the token side and the attached value
    journal.track_native().await?;
    journal.pull_in(args.token, &args.amount_token_desired).await?;
    journal.accept_native(&value).await?;

    // Step 2: Token allowance (native value travels with the call)
    approvals::grant(journal, args.token, spender, &args.amount_token_desired).await?;

    // Step 3: Delegate
    let addition = delegate::add_liquidity_native(deps, AddLiquidityNativeRequest {
        token: args.token,
        amount_token_desired: args.amount_token_desired.clone(),
        amount_token_min: args.amount_token_min,
        amount_native_min: args.amount_native_min,
        native_value: value,
        to: args.recipient,
        deadline: args.deadline,
    }).await?;
    journal.record_consumed(Asset::Token(args.token), &addition.amount_a).await?;
    journal.record_consumed(Asset::Native, &addition.amount_b).await?;

    // Step 4: Close the allowance
    approvals::revoke(journal, args.token, spender).await?;

    // Step 5: Refund both remainders
    journal.refund_unused(args.token, caller, &args.amount_token_desired, &addition.amount_a).await?;
    journal.refund_excess_native(caller).await?;

    journal.stage(RouterEventKind::LiquidityAdded {
        sender: caller,
        token_a: Asset::Token(args.token),
        token_b: Asset::Native,
        amount_a: addition.amount_a.clone(),
        amount_b: addition.amount_b.clone(),
        liquidity_minted: addition.liquidity.clone(),
    });

    crate::log!("✅ Minted {} shares for {}", addition.liquidity, args.recipient);
    Ok(addition)
}

// === REMOVE ===

/// Share token of (a, b) or `PairNotFound`
async fn require_pair<C: Collaborators>(deps: &C, token_a: Principal, token_b: Principal, label_b: String) -> Result<Principal> {
    delegate::find_pair(deps, token_a, token_b)
        .await?
        .ok_or_else(|| RouterError::Liquidity(LiquidityError::PairNotFound {
            token_a: token_a.to_text(),
            token_b: label_b,
        }))
}

async fn require_shares<C: Collaborators>(deps: &C, pair: Principal, owner: Principal, liquidity: &Nat) -> Result<()> {
    let available = share_balance(deps, pair, owner).await?;
    if available < *liquidity {
        return Err(RouterError::Liquidity(LiquidityError::InsufficientLiquidity {
            available: available.to_string(),
            required: liquidity.to_string(),
        }));
    }
    Ok(())
}

pub async fn remove_liquidity<C: Collaborators>(deps: &C, ctx: &CallContext, args: RemoveLiquidityArgs) -> Result<LiquidityRemoval> {
    validation::validate_remove_liquidity(&args, ctx.now)?;
    check_not_paused()?;
    let _lock = acquire_router_lock("remove_liquidity")?;

    // Preconditions, before any transfer
    let pair = require_pair(deps, args.token_a, args.token_b, args.token_b.to_text()).await?;
    require_shares(deps, pair, ctx.caller, &args.liquidity).await?;

    crate::log!("🔥 remove_liquidity for {}: {} shares of {}", ctx.caller, args.liquidity, pair);

    let mut journal = CustodyJournal::open(deps, "remove_liquidity", ctx);
    let outcome = run_remove(&mut journal, pair, args).await;
    journal.settle(outcome).await
}

async fn run_remove<C: Collaborators>(journal: &mut CustodyJournal<'_, C>, pair: Principal, args: RemoveLiquidityArgs) -> Result<LiquidityRemoval> {
    let deps = journal.deps();
    let caller = journal.caller();
    let spender = deps.amm().id();

    // Step 1: Escrow the shares
    journal.pull_in(pair, &args.liquidity).await?;
    approvals::grant(journal, pair, spender, &args.liquidity).await?;

    // Step 2: Delegate; both sides go straight to the recipient
    let removal = delegate::remove_liquidity(deps, RemoveLiquidityRequest {
        token_a: args.token_a,
        token_b: args.token_b,
        liquidity: args.liquidity.clone(),
        amount_a_min: args.amount_a_min,
        amount_b_min: args.amount_b_min,
        to: args.recipient,
        deadline: args.deadline,
    }).await?;
    journal.record_consumed(Asset::Token(pair), &args.liquidity).await?;

    // Step 3: Close the allowance
    approvals::revoke(journal, pair, spender).await?;

    journal.stage(RouterEventKind::LiquidityRemoved {
        sender: caller,
        token_a: Asset::Token(args.token_a),
        token_b: Asset::Token(args.token_b),
        amount_a: removal.amount_a.clone(),
        amount_b: removal.amount_b.clone(),
        liquidity_burned: args.liquidity,
    });

    Ok(removal)
}

/// Withdraw from the (token, wrapped native) pool; the native side is paid
/// out as native currency. `amount_a` is the token side.
pub async fn remove_liquidity_native<C: Collaborators>(deps: &C, ctx: &CallContext, args: RemoveLiquidityNativeArgs) -> Result<LiquidityRemoval> {
    let wrapped_native = deps.amm().wrapped_native();
    validation::validate_remove_liquidity_native(&args, &wrapped_native, ctx.now)?;
    check_not_paused()?;
    let _lock = acquire_router_lock("remove_liquidity_native")?;

    let pair = require_pair(deps, args.token, wrapped_native, Asset::Native.label()).await?;
    require_shares(deps, pair, ctx.caller, &args.liquidity).await?;

    crate::log!("🔥 remove_liquidity_native for {}: {} shares of {}", ctx.caller, args.liquidity, pair);

    let mut journal = CustodyJournal::open(deps, "remove_liquidity_native", ctx);
    let outcome = run_remove_native(&mut journal, pair, args).await;
    journal.settle(outcome).await
}

async fn run_remove_native<C: Collaborators>(journal: &mut CustodyJournal<'_, C>, pair: Principal, args: RemoveLiquidityNativeArgs) -> Result<LiquidityRemoval> {
    let deps = journal.deps();
    let caller = journal.caller();
    let spender = deps.amm().id();

    journal.pull_in(pair, &args.liquidity).await?;
    approvals::grant(journal, pair, spender, &args.liquidity).await?;

    let removal = delegate::remove_liquidity_native(deps, RemoveLiquidityNativeRequest {
        token: args.token,
        liquidity: args.liquidity.clone(),
        amount_token_min: args.amount_token_min,
        amount_native_min: args.amount_native_min,
        to: args.recipient,
        deadline: args.deadline,
    }).await?;
    journal.record_consumed(Asset::Token(pair), &args.liquidity).await?;

    approvals::revoke(journal, pair, spender).await?;

    journal.stage(RouterEventKind::LiquidityRemoved {
        sender: caller,
        token_a: Asset::Token(args.token),
        token_b: Asset::Native,
        amount_a: removal.amount_a.clone(),
        amount_b: removal.amount_b.clone(),
        liquidity_burned: args.liquidity,
    });

    Ok(removal)
}

//! Swap orchestration
//!
//! Six caller-facing shapes share one execution path. Each entry point
//! validates its request and describes it as a `SwapPlan`; `execute_swap`
//! then runs escrow, delegation and settlement under the router lock.
//!
//! The AMM always pays the router (`to = router`); the router forwards the
//! realized output to the recipient itself so output delivery is journaled
//! like every other movement.
//!
//! Once the AMM has run, the allowance is revoked first and the unused input
//! refunded next, so the recipient is paid last. A failure before that point
//! leaves the output in custody, and rollback hands it to the caller.
//! Receipt amounts are the AMM's legs; each ledger fee comes out of what
//! actually reaches the recipient or the caller.

use candid::{Nat, Principal};
use crate::_2_CRITICAL_DATA::validation;
use crate::_2_CRITICAL_DATA::CustodyJournal;
use crate::_3_AMM_SERVICE::{AmmService, Collaborators};
use crate::_4_TRADING_EXECUTION::{approvals, delegate};
use crate::_4_TRADING_EXECUTION::delegate::SwapCall;
use crate::infrastructure::{acquire_router_lock, check_not_paused, Result};
use crate::infrastructure::events::RouterEventKind;
use crate::types::amm::{ExactInRequest, ExactOutRequest};
use crate::types::{
    Asset, CallContext, SwapExactInArgs, SwapExactInForNativeArgs, SwapExactNativeInArgs,
    SwapExactNativeOutArgs, SwapExactOutArgs, SwapNativeForExactOutArgs, SwapReceipt,
};


/// A validated swap, ready to execute
pub struct SwapPlan {
    pub operation: &'static str,
    pub asset_in: Asset,
    pub asset_out: Asset,
    /// Amount taken into custody: exact input, input ceiling, or attached value
    pub supplied: Nat,
    pub recipient: Principal,
    pub call: SwapCall,
}

fn native_in_path<C: Collaborators>(deps: &C, token: Principal) -> Vec<Principal> {
    vec![deps.amm().wrapped_native(), token]
}

fn native_out_path<C: Collaborators>(deps: &C, token: Principal) -> Vec<Principal> {
    vec![token, deps.amm().wrapped_native()]
}

fn first_token(path: &[Principal]) -> Asset {
    Asset::Token(path[0])
}

fn last_token(path: &[Principal]) -> Asset {
    Asset::Token(path[path.len() - 1])
}

// === ENTRY POINTS ===

/// Exact tokens in, tokens out
pub async fn swap_exact_tokens_for_tokens<C: Collaborators>(deps: &C, ctx: &CallContext, args: SwapExactInArgs) -> Result<SwapReceipt> {
    validation::validate_swap_exact_in(&args, ctx.now)?;

    let plan = SwapPlan {
        operation: "swap_exact_tokens_for_tokens",
        asset_in: first_token(&args.path),
        asset_out: last_token(&args.path),
        supplied: args.amount_in.clone(),
        recipient: args.recipient,
        call: SwapCall::ExactTokensForTokens(ExactInRequest {
            amount_in: args.amount_in,
            amount_out_min: args.amount_out_min,
            path: args.path,
            to: deps.router_id(),
            deadline: args.deadline,
        }),
    };
    execute_swap(deps, ctx, plan).await
}

/// Tokens in (up to `amount_in_max`), exact tokens out
pub async fn swap_tokens_for_exact_tokens<C: Collaborators>(deps: &C, ctx: &CallContext, args: SwapExactOutArgs) -> Result<SwapReceipt> {
    validation::validate_swap_exact_out(&args, ctx.now)?;

    let plan = SwapPlan {
        operation: "swap_tokens_for_exact_tokens",
        asset_in: first_token(&args.path),
        asset_out: last_token(&args.path),
        supplied: args.amount_in_max.clone(),
        recipient: args.recipient,
        call: SwapCall::TokensForExactTokens(ExactOutRequest {
            amount_out: args.amount_out,
            amount_in_max: args.amount_in_max,
            path: args.path,
            to: deps.router_id(),
            deadline: args.deadline,
        }),
    };
    execute_swap(deps, ctx, plan).await
}

/// All attached native value in, tokens out
pub async fn swap_exact_native_for_tokens<C: Collaborators>(deps: &C, ctx: &CallContext, args: SwapExactNativeInArgs) -> Result<SwapReceipt> {
    validation::validate_swap_exact_native_in(&args, &ctx.value, &deps.amm().wrapped_native(), ctx.now)?;

    let plan = SwapPlan {
        operation: "swap_exact_native_for_tokens",
        asset_in: Asset::Native,
        asset_out: Asset::Token(args.token),
        supplied: ctx.value.clone(),
        recipient: args.recipient,
        call: SwapCall::ExactNativeForTokens(ExactInRequest {
            amount_in: ctx.value.clone(),
            amount_out_min: args.amount_out_min,
            path: native_in_path(deps, args.token),
            to: deps.router_id(),
            deadline: args.deadline,
        }),
    };
    execute_swap(deps, ctx, plan).await
}

/// Tokens in (up to `amount_in_max`), exact native out
pub async fn swap_tokens_for_exact_native<C: Collaborators>(deps: &C, ctx: &CallContext, args: SwapExactNativeOutArgs) -> Result<SwapReceipt> {
    validation::validate_swap_exact_native_out(&args, &deps.amm().wrapped_native(), ctx.now)?;

    let plan = SwapPlan {
        operation: "swap_tokens_for_exact_native",
        asset_in: Asset::Token(args.token),
        asset_out: Asset::Native,
        supplied: args.amount_in_max.clone(),
        recipient: args.recipient,
        call: SwapCall::TokensForExactNative(ExactOutRequest {
            amount_out: args.amount_out,
            amount_in_max: args.amount_in_max,
            path: native_out_path(deps, args.token),
            to: deps.router_id(),
            deadline: args.deadline,
        }),
    };
    execute_swap(deps, ctx, plan).await
}

/// Exact tokens in, native out
pub async fn swap_exact_tokens_for_native<C: Collaborators>(deps: &C, ctx: &CallContext, args: SwapExactInForNativeArgs) -> Result<SwapReceipt> {
    validation::validate_swap_exact_in_for_native(&args, &deps.amm().wrapped_native(), ctx.now)?;

    let plan = SwapPlan {
        operation: "swap_exact_tokens_for_native",
        asset_in: Asset::Token(args.token),
        asset_out: Asset::Native,
        supplied: args.amount_in.clone(),
        recipient: args.recipient,
        call: SwapCall::ExactTokensForNative(ExactInRequest {
            amount_in: args.amount_in,
            amount_out_min: args.amount_out_min,
            path: native_out_path(deps, args.token),
            to: deps.router_id(),
            deadline: args.deadline,
        }),
    };
    execute_swap(deps, ctx, plan).await
}

/// Native in (up to the attached value), exact tokens out
///
/// The whole attached value is forwarded as the input ceiling; whatever the
/// AMM does not spend comes back to the caller.
pub async fn swap_native_for_exact_tokens<C: Collaborators>(deps: &C, ctx: &CallContext, args: SwapNativeForExactOutArgs) -> Result<SwapReceipt> {
    validation::validate_swap_native_for_exact_out(&args, &ctx.value, &deps.amm().wrapped_native(), ctx.now)?;

    let plan = SwapPlan {
        operation: "swap_native_for_exact_tokens",
        asset_in: Asset::Native,
        asset_out: Asset::Token(args.token),
        supplied: ctx.value.clone(),
        recipient: args.recipient,
        call: SwapCall::NativeForExactTokens(ExactOutRequest {
            amount_out: args.amount_out,
            amount_in_max: ctx.value.clone(),
            path: native_in_path(deps, args.token),
            to: deps.router_id(),
            deadline: args.deadline,
        }),
    };
    execute_swap(deps, ctx, plan).await
}

// === EXECUTION ===

/// Run a validated plan as one all-or-nothing operation
pub async fn execute_swap<C: Collaborators>(deps: &C, ctx: &CallContext, plan: SwapPlan) -> Result<SwapReceipt> {
    check_not_paused()?;
    let _lock = acquire_router_lock(plan.operation)?;

    crate::log!(
        "🔄 {} for {}: {} {} -> {}",
        plan.operation, ctx.caller, plan.supplied, plan.asset_in.label(), plan.asset_out.label()
    );

    let mut journal = CustodyJournal::open(deps, plan.operation, ctx);
    let outcome = run_swap(&mut journal, plan).await;
    journal.settle(outcome).await
}

async fn run_swap<C: Collaborators>(journal: &mut CustodyJournal<'_, C>, plan: SwapPlan) -> Result<SwapReceipt> {
    let deps = journal.deps();
    let caller = journal.caller();
    let spender = deps.amm().id();

    // Step 1: Escrow the input
    match plan.asset_in {
        Asset::Native => journal.accept_native(&plan.supplied).await?,
        Asset::Token(token) => {
            journal.pull_in(token, &plan.supplied).await?;
            // Step 2: Let the AMM take it
            approvals::grant(journal, token, spender, &plan.supplied).await?;
        }
    }

    // Step 3: Delegate
    let amounts = delegate::execute_swap(deps, plan.call).await?;
    let amount_in = amounts[0].clone();
    let amount_out = amounts[amounts.len() - 1].clone();
    journal.record_consumed(plan.asset_in, &amount_in).await?;
    journal.record_received(plan.asset_out, &amount_out);

    // Step 4: Close the allowance
    if let Asset::Token(token) = plan.asset_in {
        approvals::revoke(journal, token, spender).await?;
    }

    // Step 5: Refund unused input
    let refunded = match plan.asset_in {
        Asset::Token(token) => journal.refund_unused(token, caller, &plan.supplied, &amount_in).await?,
        Asset::Native => journal.refund_excess_native(caller).await?,
    };

    // Step 6: Deliver the output
    let delivered = match plan.asset_out {
        Asset::Native => journal.send_native(plan.recipient, &amount_out).await?,
        Asset::Token(token) => journal.push_out(token, plan.recipient, &amount_out).await?,
    };

    // Step 7: Record
    journal.stage(RouterEventKind::SwapExecuted {
        sender: caller,
        asset_in: plan.asset_in,
        asset_out: plan.asset_out,
        amount_in: amount_in.clone(),
        amount_out: amount_out.clone(),
    });

    crate::log!(
        "✅ {} settled: in {} out {} delivered {} refunded {}",
        plan.operation, amount_in, amount_out, delivered, refunded
    );

    Ok(SwapReceipt {
        amounts,
        amount_in,
        amount_out,
        delivered,
        refunded,
    })
}

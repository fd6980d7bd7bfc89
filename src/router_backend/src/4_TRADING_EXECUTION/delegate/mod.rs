//! # Exchange Delegate
//!
//! Failure boundary around every AMM call. Whatever the AMM reports on
//! failure is logged here and then dropped: callers only ever see
//! `SwapFailed`, `AddLiquidityFailed` or `RemoveLiquidityFailed` tagged with
//! the operation name.
//!
//! A reply that claims success but cannot be right (wrong number of legs,
//! nothing delivered, more input than allowed, an exact input that does not
//! match the request) is treated the same way.

use candid::{Nat, Principal};
use crate::_3_AMM_SERVICE::{AmmService, Collaborators};
use crate::infrastructure::{DelegateError, Result, RouterError};
use crate::infrastructure::math::is_zero;
use crate::types::amm::{
    AddLiquidityNativeRequest, AddLiquidityRequest, ExactInRequest, ExactOutRequest,
    RemoveLiquidityNativeRequest, RemoveLiquidityRequest,
};
use crate::types::{LiquidityAddition, LiquidityRemoval};

fn swap_failed(operation: &str, detail: &str) -> RouterError {
    crate::log!("❌ AMM {} failed: {}", operation, detail);
    RouterError::Delegate(DelegateError::SwapFailed { operation: operation.to_string() })
}

fn add_failed(operation: &str, detail: &str) -> RouterError {
    crate::log!("❌ AMM {} failed: {}", operation, detail);
    RouterError::Delegate(DelegateError::AddLiquidityFailed { operation: operation.to_string() })
}

fn remove_failed(operation: &str, detail: &str) -> RouterError {
    crate::log!("❌ AMM {} failed: {}", operation, detail);
    RouterError::Delegate(DelegateError::RemoveLiquidityFailed { operation: operation.to_string() })
}

/// One delegated swap, in any of the six shapes
#[derive(Debug, Clone)]
pub enum SwapCall {
    ExactTokensForTokens(ExactInRequest),
    TokensForExactTokens(ExactOutRequest),
    ExactNativeForTokens(ExactInRequest),
    TokensForExactNative(ExactOutRequest),
    ExactTokensForNative(ExactInRequest),
    NativeForExactTokens(ExactOutRequest),
}

impl SwapCall {
    /// AMM method name
    pub fn operation(&self) -> &'static str {
        match self {
            SwapCall::ExactTokensForTokens(_) => "swap_exact_tokens_for_tokens",
            SwapCall::TokensForExactTokens(_) => "swap_tokens_for_exact_tokens",
            SwapCall::ExactNativeForTokens(_) => "swap_exact_native_for_tokens",
            SwapCall::TokensForExactNative(_) => "swap_tokens_for_exact_native",
            SwapCall::ExactTokensForNative(_) => "swap_exact_tokens_for_native",
            SwapCall::NativeForExactTokens(_) => "swap_native_for_exact_tokens",
        }
    }

    fn path_len(&self) -> usize {
        match self {
            SwapCall::ExactTokensForTokens(r) | SwapCall::ExactNativeForTokens(r) | SwapCall::ExactTokensForNative(r) => r.path.len(),
            SwapCall::TokensForExactTokens(r) | SwapCall::TokensForExactNative(r) | SwapCall::NativeForExactTokens(r) => r.path.len(),
        }
    }

    /// Largest first leg the AMM may report
    fn input_cap(&self) -> Option<&Nat> {
        match self {
            SwapCall::TokensForExactTokens(r) | SwapCall::TokensForExactNative(r) | SwapCall::NativeForExactTokens(r) => Some(&r.amount_in_max),
            _ => None,
        }
    }

    /// First leg an exact-input swap must report
    fn exact_input(&self) -> Option<&Nat> {
        match self {
            SwapCall::ExactTokensForTokens(r) | SwapCall::ExactNativeForTokens(r) | SwapCall::ExactTokensForNative(r) => Some(&r.amount_in),
            _ => None,
        }
    }
}

fn check_legs(operation: &str, amounts: &[Nat], path_len: usize) -> Result<()> {
    if amounts.len() != path_len {
        return Err(swap_failed(
            operation,
            &format!("expected {} legs, got {}", path_len, amounts.len()),
        ));
    }
    match (amounts.first(), amounts.last()) {
        (Some(first), Some(last)) if !is_zero(first) && !is_zero(last) => Ok(()),
        _ => Err(swap_failed(operation, "zero amount leg")),
    }
}

/// Run a swap on the AMM and return the realized amount of every leg
pub async fn execute_swap<C: Collaborators>(deps: &C, call: SwapCall) -> Result<Vec<Nat>> {
    let operation = call.operation();
    let path_len = call.path_len();
    let cap = call.input_cap().cloned();
    let exact = call.exact_input().cloned();
    let amm = deps.amm();

    crate::log!("🔄 Delegating {} over {} hops", operation, path_len.saturating_sub(1));

    let reply = match call {
        SwapCall::ExactTokensForTokens(r) => amm.swap_exact_tokens_for_tokens(r).await,
        SwapCall::TokensForExactTokens(r) => amm.swap_tokens_for_exact_tokens(r).await,
        SwapCall::ExactNativeForTokens(r) => amm.swap_exact_native_for_tokens(r).await,
        SwapCall::TokensForExactNative(r) => amm.swap_tokens_for_exact_native(r).await,
        SwapCall::ExactTokensForNative(r) => amm.swap_exact_tokens_for_native(r).await,
        SwapCall::NativeForExactTokens(r) => amm.swap_native_for_exact_tokens(r).await,
    };

    let amounts = reply.map_err(|e| swap_failed(operation, &e))?;
    check_legs(operation, &amounts, path_len)?;

    if let Some(cap) = cap {
        if amounts[0] > cap {
            return Err(swap_failed(
                operation,
                &format!("spent {} above the {} limit", amounts[0], cap),
            ));
        }
    }

    if let Some(exact) = exact {
        if amounts[0] != exact {
            return Err(swap_failed(
                operation,
                &format!("reported input {} for an exact input of {}", amounts[0], exact),
            ));
        }
    }

    crate::log!("✅ {} realized {:?}", operation, amounts.iter().map(|a| a.to_string()).collect::<Vec<_>>());
    Ok(amounts)
}

/// Expected output of every leg for `amount_in`
pub async fn quote_amounts_out<C: Collaborators>(deps: &C, amount_in: Nat, path: Vec<Principal>) -> Result<Vec<Nat>> {
    let path_len = path.len();
    let amounts = deps.amm()
        .get_amounts_out(amount_in, path)
        .await
        .map_err(|e| swap_failed("get_amounts_out", &e))?;
    check_legs("get_amounts_out", &amounts, path_len)?;
    Ok(amounts)
}

/// Required input of every leg to receive `amount_out`
pub async fn quote_amounts_in<C: Collaborators>(deps: &C, amount_out: Nat, path: Vec<Principal>) -> Result<Vec<Nat>> {
    let path_len = path.len();
    let amounts = deps.amm()
        .get_amounts_in(amount_out, path)
        .await
        .map_err(|e| swap_failed("get_amounts_in", &e))?;
    check_legs("get_amounts_in", &amounts, path_len)?;
    Ok(amounts)
}

fn check_addition(operation: &str, addition: &LiquidityAddition) -> Result<()> {
    if is_zero(&addition.liquidity) {
        return Err(add_failed(operation, "no shares minted"));
    }
    Ok(())
}

pub async fn add_liquidity<C: Collaborators>(deps: &C, request: AddLiquidityRequest) -> Result<LiquidityAddition> {
    crate::log!("🔄 Delegating add_liquidity {} / {}", request.token_a, request.token_b);
    let addition = deps.amm()
        .add_liquidity(request)
        .await
        .map_err(|e| add_failed("add_liquidity", &e))?;
    check_addition("add_liquidity", &addition)?;
    Ok(addition)
}

/// `amount_a` of the reply is the token side, `amount_b` the native side
pub async fn add_liquidity_native<C: Collaborators>(deps: &C, request: AddLiquidityNativeRequest) -> Result<LiquidityAddition> {
    crate::log!("🔄 Delegating add_liquidity_native {} with {} native", request.token, request.native_value);
    let addition = deps.amm()
        .add_liquidity_native(request)
        .await
        .map_err(|e| add_failed("add_liquidity_native", &e))?;
    check_addition("add_liquidity_native", &addition)?;
    Ok(addition)
}

pub async fn remove_liquidity<C: Collaborators>(deps: &C, request: RemoveLiquidityRequest) -> Result<LiquidityRemoval> {
    crate::log!("🔄 Delegating remove_liquidity of {} shares", request.liquidity);
    deps.amm()
        .remove_liquidity(request)
        .await
        .map_err(|e| remove_failed("remove_liquidity", &e))
}

/// `amount_a` of the reply is the token side, `amount_b` the native side
pub async fn remove_liquidity_native<C: Collaborators>(deps: &C, request: RemoveLiquidityNativeRequest) -> Result<LiquidityRemoval> {
    crate::log!("🔄 Delegating remove_liquidity_native of {} shares", request.liquidity);
    deps.amm()
        .remove_liquidity_native(request)
        .await
        .map_err(|e| remove_failed("remove_liquidity_native", &e))
}

/// Share token of the pool, if the AMM has one
pub async fn find_pair<C: Collaborators>(deps: &C, token_a: Principal, token_b: Principal) -> Result<Option<Principal>> {
    deps.amm()
        .get_pair(token_a, token_b)
        .await
        .map_err(|e| remove_failed("get_pair", &e))
}

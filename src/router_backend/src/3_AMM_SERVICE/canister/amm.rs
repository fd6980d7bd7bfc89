//! AMM canister adapter
//!
//! Every mutating AMM method replies `Result<T, String>`. Native value is
//! forwarded by paying it to the AMM on the native ledger immediately before
//! the call; the AMM returns whatever it does not use (and everything on a
//! rejected call) to the router's native account.

use candid::utils::ArgumentEncoder;
use candid::{CandidType, Nat, Principal};
use serde::de::DeserializeOwned;
use crate::types::amm::{
    AddLiquidityNativeRequest, AddLiquidityRequest, ExactInRequest, ExactOutRequest,
    RemoveLiquidityNativeRequest, RemoveLiquidityRequest,
};
use crate::types::{LiquidityAddition, LiquidityRemoval};
use crate::_3_AMM_SERVICE::{AmmService, NativeLedger, ServiceResult};
use super::ledger::NativeIcrcLedger;

#[derive(Debug, Clone)]
pub struct AmmCanister {
    pub canister_id: Principal,
    pub wrapped_native: Principal,
    pub native: NativeIcrcLedger,
}

impl AmmCanister {
    async fn call_amm<A, R>(&self, method: &str, args: A) -> ServiceResult<R>
    where
        A: ArgumentEncoder,
        R: CandidType + DeserializeOwned,
    {
        let (reply,): (std::result::Result<R, String>,) = ic_cdk::call(self.canister_id, method, args)
            .await
            .map_err(|(code, msg)| format!("{} call failed: {:?} - {}", method, code, msg))?;
        reply
    }

    async fn forward_native(&self, value: &Nat) -> ServiceResult<()> {
        self.native.send(self.canister_id, value.clone()).await
    }
}

impl AmmService for AmmCanister {
    fn id(&self) -> Principal {
        self.canister_id
    }

    fn wrapped_native(&self) -> Principal {
        self.wrapped_native
    }

    async fn get_pair(&self, token_a: Principal, token_b: Principal) -> ServiceResult<Option<Principal>> {
        let (pair,): (Option<Principal>,) = ic_cdk::call(self.canister_id, "get_pair", (token_a, token_b))
            .await
            .map_err(|(code, msg)| format!("get_pair call failed: {:?} - {}", code, msg))?;
        Ok(pair)
    }

    async fn get_amounts_out(&self, amount_in: Nat, path: Vec<Principal>) -> ServiceResult<Vec<Nat>> {
        self.call_amm("get_amounts_out", (amount_in, path)).await
    }

    async fn get_amounts_in(&self, amount_out: Nat, path: Vec<Principal>) -> ServiceResult<Vec<Nat>> {
        self.call_amm("get_amounts_in", (amount_out, path)).await
    }

    async fn swap_exact_tokens_for_tokens(&self, request: ExactInRequest) -> ServiceResult<Vec<Nat>> {
        self.call_amm("swap_exact_tokens_for_tokens", (request,)).await
    }

    async fn swap_tokens_for_exact_tokens(&self, request: ExactOutRequest) -> ServiceResult<Vec<Nat>> {
        self.call_amm("swap_tokens_for_exact_tokens", (request,)).await
    }

    async fn swap_exact_native_for_tokens(&self, request: ExactInRequest) -> ServiceResult<Vec<Nat>> {
        self.forward_native(&request.amount_in).await?;
        self.call_amm("swap_exact_native_for_tokens", (request,)).await
    }

    async fn swap_tokens_for_exact_native(&self, request: ExactOutRequest) -> ServiceResult<Vec<Nat>> {
        self.call_amm("swap_tokens_for_exact_native", (request,)).await
    }

    async fn swap_exact_tokens_for_native(&self, request: ExactInRequest) -> ServiceResult<Vec<Nat>> {
        self.call_amm("swap_exact_tokens_for_native", (request,)).await
    }

    async fn swap_native_for_exact_tokens(&self, request: ExactOutRequest) -> ServiceResult<Vec<Nat>> {
        self.forward_native(&request.amount_in_max).await?;
        self.call_amm("swap_native_for_exact_tokens", (request,)).await
    }

    async fn add_liquidity(&self, request: AddLiquidityRequest) -> ServiceResult<LiquidityAddition> {
        self.call_amm("add_liquidity", (request,)).await
    }

    async fn add_liquidity_native(&self, request: AddLiquidityNativeRequest) -> ServiceResult<LiquidityAddition> {
        self.forward_native(&request.native_value).await?;
        self.call_amm("add_liquidity_native", (request,)).await
    }

    async fn remove_liquidity(&self, request: RemoveLiquidityRequest) -> ServiceResult<LiquidityRemoval> {
        self.call_amm("remove_liquidity", (request,)).await
    }

    async fn remove_liquidity_native(&self, request: RemoveLiquidityNativeRequest) -> ServiceResult<LiquidityRemoval> {
        self.call_amm("remove_liquidity_native", (request,)).await
    }
}

//! Request shapes sent to the external AMM service
//!
//! `to` is whoever the AMM pays: the router itself for swaps (it settles
//! outputs to the recipient), the recipient directly for liquidity flows.

use candid::{CandidType, Deserialize, Nat, Principal};
use serde::Serialize;

/// Exact input. For native-in swaps `amount_in` is the forwarded value.
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ExactInRequest {
    pub amount_in: Nat,
    pub amount_out_min: Nat,
    pub path: Vec<Principal>,
    pub to: Principal,
    pub deadline: u64,
}

/// Exact output. For native-in swaps `amount_in_max` is the forwarded value.
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ExactOutRequest {
    pub amount_out: Nat,
    pub amount_in_max: Nat,
    pub path: Vec<Principal>,
    pub to: Principal,
    pub deadline: u64,
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityRequest {
    pub token_a: Principal,
    pub token_b: Principal,
    pub amount_a_desired: Nat,
    pub amount_b_desired: Nat,
    pub amount_a_min: Nat,
    pub amount_b_min: Nat,
    pub to: Principal,
    pub deadline: u64,
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityNativeRequest {
    pub token: Principal,
    pub amount_token_desired: Nat,
    pub amount_token_min: Nat,
    pub amount_native_min: Nat,
    /// Native value forwarded with the call
    pub native_value: Nat,
    pub to: Principal,
    pub deadline: u64,
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityRequest {
    pub token_a: Principal,
    pub token_b: Principal,
    pub liquidity: Nat,
    pub amount_a_min: Nat,
    pub amount_b_min: Nat,
    pub to: Principal,
    pub deadline: u64,
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityNativeRequest {
    pub token: Principal,
    pub liquidity: Nat,
    pub amount_token_min: Nat,
    pub amount_native_min: Nat,
    pub to: Principal,
    pub deadline: u64,
}

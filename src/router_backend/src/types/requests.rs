use candid::{CandidType, Deserialize, Nat, Principal};
use serde::Serialize;

/// An asset the router can hold: native currency or a ledger token
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    Native,
    Token(Principal),
}

impl Asset {
    pub fn label(&self) -> String {
        match self {
            Asset::Native => "native".to_string(),
            Asset::Token(id) => id.to_text(),
        }
    }
}

/// Who is calling, when, and with how much native value attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Principal,
    pub now: u64,
    pub value: Nat,
}

// === SWAPS ===

/// Exact tokens in -> tokens out
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SwapExactInArgs {
    pub amount_in: Nat,
    pub amount_out_min: Nat,
    pub path: Vec<Principal>,
    pub recipient: Principal,
    pub deadline: u64,
}

/// Tokens in -> exact tokens out
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SwapExactOutArgs {
    pub amount_out: Nat,
    pub amount_in_max: Nat,
    pub path: Vec<Principal>,
    pub recipient: Principal,
    pub deadline: u64,
}

/// Exact native in (the attached value) -> `token` out
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SwapExactNativeInArgs {
    pub token: Principal,
    pub amount_out_min: Nat,
    pub recipient: Principal,
    pub deadline: u64,
}

/// `token` in -> exact native out
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SwapExactNativeOutArgs {
    pub token: Principal,
    pub amount_out: Nat,
    pub amount_in_max: Nat,
    pub recipient: Principal,
    pub deadline: u64,
}

/// Exact `token` in -> native out
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SwapExactInForNativeArgs {
    pub token: Principal,
    pub amount_in: Nat,
    pub amount_out_min: Nat,
    pub recipient: Principal,
    pub deadline: u64,
}

/// Native in (up to the attached value) -> exact `token` out
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SwapNativeForExactOutArgs {
    pub token: Principal,
    pub amount_out: Nat,
    pub recipient: Principal,
    pub deadline: u64,
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SwapReceipt {
    /// Realized amount for every leg, input first
    pub amounts: Vec<Nat>,
    pub amount_in: Nat,
    pub amount_out: Nat,
    /// What reached the recipient after the output ledger's fee
    pub delivered: Nat,
    /// Unused input that reached the caller (token or native), after fees
    pub refunded: Nat,
}

// === LIQUIDITY ===

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityArgs {
    pub token_a: Principal,
    pub token_b: Principal,
    pub amount_a_desired: Nat,
    pub amount_b_desired: Nat,
    pub amount_a_min: Nat,
    pub amount_b_min: Nat,
    pub recipient: Principal,
    pub deadline: u64,
}

/// Token side is pulled; the native side is the attached value
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AddLiquidityNativeArgs {
    pub token: Principal,
    pub amount_token_desired: Nat,
    pub amount_token_min: Nat,
    pub amount_native_min: Nat,
    pub recipient: Principal,
    pub deadline: u64,
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityArgs {
    pub token_a: Principal,
    pub token_b: Principal,
    pub liquidity: Nat,
    pub amount_a_min: Nat,
    pub amount_b_min: Nat,
    pub recipient: Principal,
    pub deadline: u64,
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RemoveLiquidityNativeArgs {
    pub token: Principal,
    pub liquidity: Nat,
    pub amount_token_min: Nat,
    pub amount_native_min: Nat,
    pub recipient: Principal,
    pub deadline: u64,
}

/// Amounts the AMM actually used and the shares it minted
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LiquidityAddition {
    pub amount_a: Nat,
    pub amount_b: Nat,
    pub liquidity: Nat,
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LiquidityRemoval {
    pub amount_a: Nat,
    pub amount_b: Nat,
}

// === CANISTER ===

#[derive(CandidType, Deserialize, Serialize, Debug, Clone)]
pub struct RouterInitArgs {
    /// Defaults to the installing principal
    pub owner: Option<Principal>,
    pub amm_canister: Principal,
    pub native_ledger: Principal,
    pub wrapped_native: Principal,
}

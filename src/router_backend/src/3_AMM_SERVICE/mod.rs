//! # AMM Service Boundary
//!
//! Everything the router consumes but does not implement:
//! - **TokenLedger**: ICRC-1/ICRC-2 token movements and allowances
//! - **NativeLedger**: native-currency custody
//! - **AmmService**: pricing, pools and swaps
//!
//! Ledgers charge a flat fee per movement or approval, paid by the account
//! the value leaves; `fee` reports it so the router can budget for it.
//!
//! Each method reports failure as a plain `String`. The router treats any
//! failure uniformly: ledger failures become custody errors, AMM failures are
//! remapped at the delegate boundary and their text is dropped.
//!
//! ### canister/
//! Inter-canister implementations used by the deployed router.

pub mod canister;

use candid::{Nat, Principal};
use crate::types::amm::{
    AddLiquidityNativeRequest, AddLiquidityRequest, ExactInRequest, ExactOutRequest,
    RemoveLiquidityNativeRequest, RemoveLiquidityRequest,
};
use crate::types::{LiquidityAddition, LiquidityRemoval};

pub type ServiceResult<T> = std::result::Result<T, String>;

/// Token ledger as seen from the router (the router is always the caller)
#[allow(async_fn_in_trait)]
pub trait TokenLedger {
    /// Move `amount` from `from` to `to` using `from`'s allowance to the router
    async fn transfer_from(&self, token: Principal, from: Principal, to: Principal, amount: Nat) -> ServiceResult<()>;

    /// Move `amount` out of the router's own account
    async fn transfer(&self, token: Principal, to: Principal, amount: Nat) -> ServiceResult<()>;

    /// Set the router's allowance for `spender` to exactly `amount`
    async fn approve(&self, token: Principal, spender: Principal, amount: Nat) -> ServiceResult<()>;

    /// Flat fee the ledger charges per transfer or approval
    async fn fee(&self, token: Principal) -> ServiceResult<Nat>;

    async fn balance_of(&self, token: Principal, owner: Principal) -> ServiceResult<Nat>;
}

/// Native currency held by the router
#[allow(async_fn_in_trait)]
pub trait NativeLedger {
    /// The router's own native balance
    async fn balance(&self) -> ServiceResult<Nat>;

    /// Take `amount` of attached value from `from` into the router
    async fn receive(&self, from: Principal, amount: Nat) -> ServiceResult<()>;

    async fn send(&self, to: Principal, amount: Nat) -> ServiceResult<()>;

    async fn fee(&self) -> ServiceResult<Nat>;
}

/// External automated market maker
#[allow(async_fn_in_trait)]
pub trait AmmService {
    /// Principal the router grants allowances to
    fn id(&self) -> Principal;

    /// Token standing in for native currency inside paths
    fn wrapped_native(&self) -> Principal;

    /// Share token of the (a, b) pool, if the pool exists
    async fn get_pair(&self, token_a: Principal, token_b: Principal) -> ServiceResult<Option<Principal>>;

    async fn get_amounts_out(&self, amount_in: Nat, path: Vec<Principal>) -> ServiceResult<Vec<Nat>>;

    async fn get_amounts_in(&self, amount_out: Nat, path: Vec<Principal>) -> ServiceResult<Vec<Nat>>;

    async fn swap_exact_tokens_for_tokens(&self, request: ExactInRequest) -> ServiceResult<Vec<Nat>>;

    async fn swap_tokens_for_exact_tokens(&self, request: ExactOutRequest) -> ServiceResult<Vec<Nat>>;

    async fn swap_exact_native_for_tokens(&self, request: ExactInRequest) -> ServiceResult<Vec<Nat>>;

    async fn swap_tokens_for_exact_native(&self, request: ExactOutRequest) -> ServiceResult<Vec<Nat>>;

    async fn swap_exact_tokens_for_native(&self, request: ExactInRequest) -> ServiceResult<Vec<Nat>>;

    async fn swap_native_for_exact_tokens(&self, request: ExactOutRequest) -> ServiceResult<Vec<Nat>>;

    async fn add_liquidity(&self, request: AddLiquidityRequest) -> ServiceResult<LiquidityAddition>;

    async fn add_liquidity_native(&self, request: AddLiquidityNativeRequest) -> ServiceResult<LiquidityAddition>;

    async fn remove_liquidity(&self, request: RemoveLiquidityRequest) -> ServiceResult<LiquidityRemoval>;

    async fn remove_liquidity_native(&self, request: RemoveLiquidityNativeRequest) -> ServiceResult<LiquidityRemoval>;
}

/// The full set of services one router operation talks to
pub trait Collaborators {
    type Ledger: TokenLedger;
    type Native: NativeLedger;
    type Amm: AmmService;

    /// The router's own principal (custody account owner)
    fn router_id(&self) -> Principal;

    fn ledger(&self) -> &Self::Ledger;

    fn native(&self) -> &Self::Native;

    fn amm(&self) -> &Self::Amm;
}

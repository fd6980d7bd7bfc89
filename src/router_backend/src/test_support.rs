//! In-memory ledgers and AMM for unit tests
//!
//! `MockState` is one world: token and native balances, router allowances,
//! and a constant-rate AMM that really pulls router allowances and pays `to`.
//! Callers are treated as having approved the router already, so
//! `transfer_from` only checks balances. Ledger fees are burned from the
//! payer on top of the amount moved; approvals cost the router one fee.
//!
//! `MockWorld` wraps a `MockState` and can re-enter the router from inside a
//! ledger callback.

use candid::{Nat, Principal};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use crate::_1_CRITICAL_OPERATIONS::swaps;
use crate::_3_AMM_SERVICE::{AmmService, Collaborators, NativeLedger, ServiceResult, TokenLedger};
use crate::infrastructure::math::{nat_zero, saturating_sub};
use crate::infrastructure::Result;
use crate::types::amm::{
    AddLiquidityNativeRequest, AddLiquidityRequest, ExactInRequest, ExactOutRequest,
    RemoveLiquidityNativeRequest, RemoveLiquidityRequest,
};
use crate::types::{Asset, CallContext, LiquidityAddition, LiquidityRemoval, SwapExactInArgs, SwapReceipt};

pub fn principal(n: u8) -> Principal {
    Principal::from_slice(&[n; 29])
}

pub const ROUTER: u8 = 200;
pub const AMM: u8 = 201;
pub const WRAPPED_NATIVE: u8 = 202;

const BPS: u64 = 10_000;
/// Output per input on every hop: num / den
const RATE: (u64, u64) = (2, 1);

struct Books {
    balances: HashMap<(Asset, Principal), Nat>,
    /// (token, owner, spender)
    allowances: HashMap<(Principal, Principal, Principal), Nat>,
    /// Every approve the router issued: (token, spender, amount)
    approvals: Vec<(Principal, Principal, Nat)>,
    ledger_calls: usize,
    failing: HashSet<Asset>,
    /// Assets whose router-to-anyone transfers fail; pulls still work
    failing_payouts: HashSet<Asset>,
    fees: HashMap<Asset, Nat>,
    approve_calls: usize,
    /// Approvals fail from this call number (1-based) on
    failing_approvals_from: Option<usize>,
    /// Added to the reported input of exact-input swaps
    input_skew: u64,
    strict_approvals: bool,
    amm_failure: Option<String>,
    /// Share of each desired amount the AMM takes when adding liquidity
    usage_bps: (u64, u64),
    pairs: HashMap<(Principal, Principal), Principal>,
    next_pair: u8,
}

pub struct MockState {
    books: RefCell<Books>,
    router: Principal,
    amm: Principal,
    wrapped_native: Principal,
}

impl MockState {
    pub fn new() -> Self {
        Self {
            books: RefCell::new(Books {
                balances: HashMap::new(),
                allowances: HashMap::new(),
                approvals: Vec::new(),
                ledger_calls: 0,
                failing: HashSet::new(),
                failing_payouts: HashSet::new(),
                fees: HashMap::new(),
                approve_calls: 0,
                failing_approvals_from: None,
                input_skew: 0,
                strict_approvals: false,
                amm_failure: None,
                usage_bps: (BPS, BPS),
                pairs: HashMap::new(),
                next_pair: 100,
            }),
            router: principal(ROUTER),
            amm: principal(AMM),
            wrapped_native: principal(WRAPPED_NATIVE),
        }
    }

    pub fn router(&self) -> Principal {
        self.router
    }

    pub fn amm_id(&self) -> Principal {
        self.amm
    }

    pub fn wrapped(&self) -> Principal {
        self.wrapped_native
    }

    // === SCENARIO SETUP ===

    pub fn mint(&self, asset: Asset, owner: Principal, amount: u64) {
        self.credit(asset, owner, &Nat::from(amount));
    }

    pub fn set_allowance(&self, token: Principal, owner: Principal, spender: Principal, amount: u64) {
        self.books.borrow_mut().allowances.insert((token, owner, spender), Nat::from(amount));
    }

    pub fn fail_transfers_of(&self, asset: Asset) {
        self.books.borrow_mut().failing.insert(asset);
    }

    pub fn strict_approvals(&self) {
        self.books.borrow_mut().strict_approvals = true;
    }

    pub fn fail_amm(&self, reason: &str) {
        self.books.borrow_mut().amm_failure = Some(reason.to_string());
    }

    /// Router payouts of `asset` fail; pulls and approvals still work
    pub fn fail_payouts_of(&self, asset: Asset) {
        self.books.borrow_mut().failing_payouts.insert(asset);
    }

    /// Approvals from the `nth` call (1-based) on are rejected
    pub fn fail_approvals_from(&self, nth: usize) {
        self.books.borrow_mut().failing_approvals_from = Some(nth);
    }

    /// Bring a failed ledger back
    pub fn heal(&self, asset: Asset) {
        let mut books = self.books.borrow_mut();
        books.failing.remove(&asset);
        books.failing_payouts.remove(&asset);
    }

    pub fn set_fee(&self, asset: Asset, fee: u64) {
        self.books.borrow_mut().fees.insert(asset, Nat::from(fee));
    }

    /// Exact-input swaps report `skew` more input than they were asked to take
    pub fn skew_reported_input(&self, skew: u64) {
        self.books.borrow_mut().input_skew = skew;
    }

    pub fn set_liquidity_usage(&self, a_bps: u64, b_bps: u64) {
        self.books.borrow_mut().usage_bps = (a_bps, b_bps);
    }

    /// Register a pool and return its share token
    pub fn create_pair(&self, token_a: Principal, token_b: Principal) -> Principal {
        let mut books = self.books.borrow_mut();
        if let Some(pair) = books.pairs.get(&(token_a, token_b)).or(books.pairs.get(&(token_b, token_a))) {
            return *pair;
        }
        let pair = principal(books.next_pair);
        books.next_pair += 1;
        books.pairs.insert((token_a, token_b), pair);
        pair
    }

    // === INSPECTION ===

    pub fn balance(&self, asset: Asset, owner: Principal) -> Nat {
        self.books.borrow().balances.get(&(asset, owner)).cloned().unwrap_or_else(nat_zero)
    }

    pub fn allowance(&self, token: Principal, owner: Principal, spender: Principal) -> Nat {
        self.books.borrow().allowances.get(&(token, owner, spender)).cloned().unwrap_or_else(nat_zero)
    }

    pub fn approvals(&self) -> Vec<(Principal, Principal, Nat)> {
        self.books.borrow().approvals.clone()
    }

    /// Number of ledger calls (token and native) made so far
    pub fn ledger_calls(&self) -> usize {
        self.books.borrow().ledger_calls
    }

    // === BOOKKEEPING ===

    fn credit(&self, asset: Asset, owner: Principal, amount: &Nat) {
        let mut books = self.books.borrow_mut();
        let entry = books.balances.entry((asset, owner)).or_insert_with(nat_zero);
        *entry = entry.clone() + amount.clone();
    }

    fn debit(&self, asset: Asset, owner: Principal, amount: &Nat) -> ServiceResult<()> {
        let mut books = self.books.borrow_mut();
        let entry = books.balances.entry((asset, owner)).or_insert_with(nat_zero);
        if *entry < *amount {
            return Err(format!("insufficient funds: {} < {}", entry, amount));
        }
        *entry = saturating_sub(entry, amount);
        Ok(())
    }

    fn ledger_call(&self, asset: Asset) -> ServiceResult<()> {
        let mut books = self.books.borrow_mut();
        books.ledger_calls += 1;
        if books.failing.contains(&asset) {
            return Err(format!("ledger {} unavailable", asset.label()));
        }
        Ok(())
    }

    fn payout_call(&self, asset: Asset) -> ServiceResult<()> {
        self.ledger_call(asset)?;
        if self.books.borrow().failing_payouts.contains(&asset) {
            return Err(format!("ledger {} rejected the payout", asset.label()));
        }
        Ok(())
    }

    fn fee_of(&self, asset: Asset) -> Nat {
        self.books.borrow().fees.get(&asset).cloned().unwrap_or_else(nat_zero)
    }

    /// Move `amount` and burn the ledger fee from the payer
    fn move_with_fee(&self, asset: Asset, from: Principal, to: Principal, amount: &Nat) -> ServiceResult<()> {
        let fee = self.fee_of(asset);
        self.debit(asset, from, &(amount.clone() + fee))?;
        self.credit(asset, to, amount);
        Ok(())
    }

    fn pair_of(&self, token_a: Principal, token_b: Principal) -> Option<Principal> {
        let books = self.books.borrow();
        books.pairs.get(&(token_a, token_b)).or(books.pairs.get(&(token_b, token_a))).copied()
    }

    // === AMM INTERNALS ===

    fn check_amm(&self) -> ServiceResult<()> {
        match &self.books.borrow().amm_failure {
            Some(reason) => Err(reason.clone()),
            None => Ok(()),
        }
    }

    /// AMM takes router tokens through the router's allowance; the
    /// allowance has to cover the ledger fee too
    fn amm_spend(&self, token: Principal, amount: &Nat) -> ServiceResult<()> {
        let key = (token, self.router, self.amm);
        let allowed = self.allowance(token, self.router, self.amm);
        let charged = amount.clone() + self.fee_of(Asset::Token(token));
        if allowed < charged {
            return Err(format!("allowance {} below {}", allowed, charged));
        }
        self.move_with_fee(Asset::Token(token), self.router, self.amm, amount)?;
        self.books.borrow_mut().allowances.insert(key, saturating_sub(&allowed, &charged));
        Ok(())
    }

    /// AMM takes native value the router forwarded
    fn amm_take_native(&self, amount: &Nat) -> ServiceResult<()> {
        self.move_with_fee(Asset::Native, self.router, self.amm, amount)
    }

    fn asset_of(&self, token: Principal) -> Asset {
        if token == self.wrapped_native {
            Asset::Native
        } else {
            Asset::Token(token)
        }
    }

    fn legs_out(&self, amount_in: &Nat, hops: usize) -> Vec<Nat> {
        let (num, den) = RATE;
        let mut amounts = vec![amount_in.clone()];
        for _ in 0..hops {
            let last = amounts[amounts.len() - 1].clone();
            amounts.push(last * Nat::from(num) / Nat::from(den));
        }
        amounts
    }

    fn legs_in(&self, amount_out: &Nat, hops: usize) -> Vec<Nat> {
        let (num, den) = RATE;
        let mut amounts = vec![amount_out.clone()];
        for _ in 0..hops {
            let next = amounts[0].clone() * Nat::from(den);
            amounts.insert(0, (next + Nat::from(num - 1)) / Nat::from(num));
        }
        amounts
    }

    fn exact_in(&self, request: &ExactInRequest) -> ServiceResult<Vec<Nat>> {
        self.check_amm()?;
        let mut amounts = self.legs_out(&request.amount_in, request.path.len().saturating_sub(1));
        let out = amounts[amounts.len() - 1].clone();
        if out < request.amount_out_min {
            return Err(format!("output {} below minimum {}", out, request.amount_out_min));
        }

        match self.asset_of(request.path[0]) {
            Asset::Native => self.amm_take_native(&request.amount_in)?,
            Asset::Token(token) => self.amm_spend(token, &request.amount_in)?,
        }
        self.credit(self.asset_of(request.path[request.path.len() - 1]), request.to, &out);
        let skew = self.books.borrow().input_skew;
        amounts[0] = amounts[0].clone() + Nat::from(skew);
        Ok(amounts)
    }

    fn exact_out(&self, request: &ExactOutRequest) -> ServiceResult<Vec<Nat>> {
        self.check_amm()?;
        let amounts = self.legs_in(&request.amount_out, request.path.len().saturating_sub(1));
        if amounts[0] > request.amount_in_max {
            return Err(format!("input {} above maximum {}", amounts[0], request.amount_in_max));
        }

        match self.asset_of(request.path[0]) {
            Asset::Native => self.amm_take_native(&amounts[0])?,
            Asset::Token(token) => self.amm_spend(token, &amounts[0])?,
        }
        self.credit(self.asset_of(request.path[request.path.len() - 1]), request.to, &request.amount_out);
        Ok(amounts)
    }

    fn used(&self, desired: &Nat, side: usize) -> Nat {
        let (a_bps, b_bps) = self.books.borrow().usage_bps;
        let bps = if side == 0 { a_bps } else { b_bps };
        desired.clone() * Nat::from(bps) / Nat::from(BPS)
    }
}

impl TokenLedger for MockState {
    async fn transfer_from(&self, token: Principal, from: Principal, to: Principal, amount: Nat) -> ServiceResult<()> {
        self.ledger_call(Asset::Token(token))?;
        self.move_with_fee(Asset::Token(token), from, to, &amount)
    }

    async fn transfer(&self, token: Principal, to: Principal, amount: Nat) -> ServiceResult<()> {
        self.payout_call(Asset::Token(token))?;
        self.move_with_fee(Asset::Token(token), self.router, to, &amount)
    }

    async fn approve(&self, token: Principal, spender: Principal, amount: Nat) -> ServiceResult<()> {
        self.ledger_call(Asset::Token(token))?;
        let current = self.allowance(token, self.router, spender);
        {
            let mut books = self.books.borrow_mut();
            books.approve_calls += 1;
            let call = books.approve_calls;
            if books.failing_approvals_from.is_some_and(|nth| call >= nth) {
                return Err(format!("approve #{} rejected", call));
            }
            if books.strict_approvals && current != nat_zero() && amount != nat_zero() {
                return Err("allowance must be reset to zero first".to_string());
            }
        }
        self.debit(Asset::Token(token), self.router, &self.fee_of(Asset::Token(token)))?;

        let mut books = self.books.borrow_mut();
        books.approvals.push((token, spender, amount.clone()));
        books.allowances.insert((token, self.router, spender), amount);
        Ok(())
    }

    async fn fee(&self, token: Principal) -> ServiceResult<Nat> {
        Ok(self.fee_of(Asset::Token(token)))
    }

    async fn balance_of(&self, token: Principal, owner: Principal) -> ServiceResult<Nat> {
        self.ledger_call(Asset::Token(token))?;
        Ok(self.balance(Asset::Token(token), owner))
    }
}

impl NativeLedger for MockState {
    async fn balance(&self) -> ServiceResult<Nat> {
        self.ledger_call(Asset::Native)?;
        Ok(MockState::balance(self, Asset::Native, self.router))
    }

    async fn receive(&self, from: Principal, amount: Nat) -> ServiceResult<()> {
        self.ledger_call(Asset::Native)?;
        self.move_with_fee(Asset::Native, from, self.router, &amount)
    }

    async fn send(&self, to: Principal, amount: Nat) -> ServiceResult<()> {
        self.payout_call(Asset::Native)?;
        self.move_with_fee(Asset::Native, self.router, to, &amount)
    }

    async fn fee(&self) -> ServiceResult<Nat> {
        Ok(self.fee_of(Asset::Native))
    }
}

impl AmmService for MockState {
    fn id(&self) -> Principal {
        self.amm
    }

    fn wrapped_native(&self) -> Principal {
        self.wrapped_native
    }

    async fn get_pair(&self, token_a: Principal, token_b: Principal) -> ServiceResult<Option<Principal>> {
        self.check_amm()?;
        Ok(self.pair_of(token_a, token_b))
    }

    async fn get_amounts_out(&self, amount_in: Nat, path: Vec<Principal>) -> ServiceResult<Vec<Nat>> {
        self.check_amm()?;
        Ok(self.legs_out(&amount_in, path.len().saturating_sub(1)))
    }

    async fn get_amounts_in(&self, amount_out: Nat, path: Vec<Principal>) -> ServiceResult<Vec<Nat>> {
        self.check_amm()?;
        Ok(self.legs_in(&amount_out, path.len().saturating_sub(1)))
    }

    async fn swap_exact_tokens_for_tokens(&self, request: ExactInRequest) -> ServiceResult<Vec<Nat>> {
        self.exact_in(&request)
    }

    async fn swap_tokens_for_exact_tokens(&self, request: ExactOutRequest) -> ServiceResult<Vec<Nat>> {
        self.exact_out(&request)
    }

    async fn swap_exact_native_for_tokens(&self, request: ExactInRequest) -> ServiceResult<Vec<Nat>> {
        self.exact_in(&request)
    }

    async fn swap_tokens_for_exact_native(&self, request: ExactOutRequest) -> ServiceResult<Vec<Nat>> {
        self.exact_out(&request)
    }

    async fn swap_exact_tokens_for_native(&self, request: ExactInRequest) -> ServiceResult<Vec<Nat>> {
        self.exact_in(&request)
    }

    async fn swap_native_for_exact_tokens(&self, request: ExactOutRequest) -> ServiceResult<Vec<Nat>> {
        self.exact_out(&request)
    }

    async fn add_liquidity(&self, request: AddLiquidityRequest) -> ServiceResult<LiquidityAddition> {
        self.check_amm()?;
        let amount_a = self.used(&request.amount_a_desired, 0);
        let amount_b = self.used(&request.amount_b_desired, 1);
        if amount_a < request.amount_a_min || amount_b < request.amount_b_min {
            return Err("slippage: minimum not met".to_string());
        }

        self.amm_spend(request.token_a, &amount_a)?;
        self.amm_spend(request.token_b, &amount_b)?;
        let pair = self.create_pair(request.token_a, request.token_b);
        let liquidity = amount_a.clone() + amount_b.clone();
        self.credit(Asset::Token(pair), request.to, &liquidity);
        Ok(LiquidityAddition { amount_a, amount_b, liquidity })
    }

    async fn add_liquidity_native(&self, request: AddLiquidityNativeRequest) -> ServiceResult<LiquidityAddition> {
        self.check_amm()?;
        let amount_a = self.used(&request.amount_token_desired, 0);
        let amount_b = self.used(&request.native_value, 1);
        if amount_a < request.amount_token_min || amount_b < request.amount_native_min {
            return Err("slippage: minimum not met".to_string());
        }

        self.amm_spend(request.token, &amount_a)?;
        self.amm_take_native(&amount_b)?;
        let pair = self.create_pair(request.token, self.wrapped_native);
        let liquidity = amount_a.clone() + amount_b.clone();
        self.credit(Asset::Token(pair), request.to, &liquidity);
        Ok(LiquidityAddition { amount_a, amount_b, liquidity })
    }

    /// Pays `liquidity` of token A and twice that of token B
    async fn remove_liquidity(&self, request: RemoveLiquidityRequest) -> ServiceResult<LiquidityRemoval> {
        self.check_amm()?;
        let pair = self.pair_of(request.token_a, request.token_b).ok_or("no such pool")?;
        let amount_a = request.liquidity.clone();
        let amount_b = request.liquidity.clone() * Nat::from(2u64);
        if amount_a < request.amount_a_min || amount_b < request.amount_b_min {
            return Err("slippage: minimum not met".to_string());
        }

        self.amm_spend(pair, &request.liquidity)?;
        self.credit(Asset::Token(request.token_a), request.to, &amount_a);
        self.credit(Asset::Token(request.token_b), request.to, &amount_b);
        Ok(LiquidityRemoval { amount_a, amount_b })
    }

    async fn remove_liquidity_native(&self, request: RemoveLiquidityNativeRequest) -> ServiceResult<LiquidityRemoval> {
        self.check_amm()?;
        let pair = self.pair_of(request.token, self.wrapped_native).ok_or("no such pool")?;
        let amount_a = request.liquidity.clone();
        let amount_b = request.liquidity.clone() * Nat::from(2u64);
        if amount_a < request.amount_token_min || amount_b < request.amount_native_min {
            return Err("slippage: minimum not met".to_string());
        }

        self.amm_spend(pair, &request.liquidity)?;
        self.credit(Asset::Token(request.token), request.to, &amount_a);
        self.credit(Asset::Native, request.to, &amount_b);
        Ok(LiquidityRemoval { amount_a, amount_b })
    }
}

impl Collaborators for MockState {
    type Ledger = MockState;
    type Native = MockState;
    type Amm = MockState;

    fn router_id(&self) -> Principal {
        self.router
    }

    fn ledger(&self) -> &MockState {
        self
    }

    fn native(&self) -> &MockState {
        self
    }

    fn amm(&self) -> &MockState {
        self
    }
}

/// A `MockState` whose token ledger calls back into the router once
///
/// The first `transfer_from` runs `reentry` against the router before moving
/// funds, the way a hostile token would.
pub struct MockWorld {
    pub state: MockState,
    reentry: RefCell<Option<(CallContext, SwapExactInArgs)>>,
    reentry_result: RefCell<Option<Result<SwapReceipt>>>,
}

impl MockWorld {
    pub fn new(state: MockState) -> Self {
        Self {
            state,
            reentry: RefCell::new(None),
            reentry_result: RefCell::new(None),
        }
    }

    pub fn reenter_with(&self, ctx: CallContext, args: SwapExactInArgs) {
        *self.reentry.borrow_mut() = Some((ctx, args));
    }

    pub fn reentry_result(&self) -> Option<Result<SwapReceipt>> {
        self.reentry_result.borrow().clone()
    }
}

impl TokenLedger for MockWorld {
    async fn transfer_from(&self, token: Principal, from: Principal, to: Principal, amount: Nat) -> ServiceResult<()> {
        let pending = self.reentry.borrow_mut().take();
        if let Some((ctx, args)) = pending {
            let inner = swaps::swap_exact_tokens_for_tokens(&self.state, &ctx, args).await;
            *self.reentry_result.borrow_mut() = Some(inner);
        }
        self.state.transfer_from(token, from, to, amount).await
    }

    async fn transfer(&self, token: Principal, to: Principal, amount: Nat) -> ServiceResult<()> {
        TokenLedger::transfer(&self.state, token, to, amount).await
    }

    async fn approve(&self, token: Principal, spender: Principal, amount: Nat) -> ServiceResult<()> {
        TokenLedger::approve(&self.state, token, spender, amount).await
    }

    async fn fee(&self, token: Principal) -> ServiceResult<Nat> {
        TokenLedger::fee(&self.state, token).await
    }

    async fn balance_of(&self, token: Principal, owner: Principal) -> ServiceResult<Nat> {
        TokenLedger::balance_of(&self.state, token, owner).await
    }
}

impl Collaborators for MockWorld {
    type Ledger = MockWorld;
    type Native = MockState;
    type Amm = MockState;

    fn router_id(&self) -> Principal {
        self.state.router
    }

    fn ledger(&self) -> &MockWorld {
        self
    }

    fn native(&self) -> &MockState {
        &self.state
    }

    fn amm(&self) -> &MockState {
        &self.state
    }
}

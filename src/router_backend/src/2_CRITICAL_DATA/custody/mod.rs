//! Asset custody and the per-operation custody journal
//!
//! Every movement of caller value through the router goes through a
//! `CustodyJournal`. The journal knows what the router currently holds on the
//! caller's behalf, which AMM allowances are still open, and which event
//! records the operation wants to publish. `settle` either commits (events
//! written) or compensates (grants revoked, holdings returned to the caller).
//!
//! Compensation only reaches value the router still holds. Anything the AMM
//! has already committed stays with the AMM; anything a failed compensation
//! leaves behind stays in the router and is recoverable through rescue.

use candid::{Nat, Principal};
use crate::_3_AMM_SERVICE::{Collaborators, NativeLedger, TokenLedger};
use crate::infrastructure::{CustodyError, Result, RouterError};
use crate::infrastructure::events::{self, RouterEventKind};
use crate::infrastructure::constants::GRANTED_INPUT_FEES;
use crate::infrastructure::math::{is_zero, nat_zero, saturating_sub};
use crate::_4_TRADING_EXECUTION::approvals;
use crate::types::{Asset, CallContext};

fn transfer_failed(asset: Asset, amount: &Nat, operation: &str, reason: String) -> RouterError {
    crate::log!("❌ {} of {} {} failed: {}", operation, amount, asset.label(), reason);
    RouterError::Custody(CustodyError::TransferFailed {
        asset: asset.label(),
        amount: amount.to_string(),
        operation: operation.to_string(),
    })
}

fn refund_failed(asset: Asset, amount: &Nat, reason: String) -> RouterError {
    crate::log!("❌ Refund of {} {} failed: {}", amount, asset.label(), reason);
    RouterError::Custody(CustodyError::RefundFailed {
        asset: asset.label(),
        amount: amount.to_string(),
    })
}

/// Share-token balance of `owner` for a pool
pub async fn share_balance<C: Collaborators>(deps: &C, pair: Principal, owner: Principal) -> Result<Nat> {
    deps.ledger()
        .balance_of(pair, owner)
        .await
        .map_err(|e| transfer_failed(Asset::Token(pair), &nat_zero(), "balance_of", e))
}

pub struct CustodyJournal<'a, C: Collaborators> {
    deps: &'a C,
    operation: &'static str,
    caller: Principal,
    now: u64,
    /// Amounts the router holds for the caller, per asset
    held: Vec<(Asset, Nat)>,
    /// Open allowances (token, spender)
    grants: Vec<(Principal, Principal)>,
    /// Ledger fees seen during this operation
    fees: Vec<(Asset, Nat)>,
    native_baseline: Option<Nat>,
    staged: Vec<RouterEventKind>,
}

impl<'a, C: Collaborators> CustodyJournal<'a, C> {
    pub fn open(deps: &'a C, operation: &'static str, ctx: &CallContext) -> Self {
        Self {
            deps,
            operation,
            caller: ctx.caller,
            now: ctx.now,
            held: Vec::new(),
            grants: Vec::new(),
            fees: Vec::new(),
            native_baseline: None,
            staged: Vec::new(),
        }
    }

    pub fn deps(&self) -> &'a C {
        self.deps
    }

    pub fn caller(&self) -> Principal {
        self.caller
    }

    /// Amount currently held for the caller in `asset`
    pub fn held(&self, asset: Asset) -> Nat {
        self.held
            .iter()
            .find(|(a, _)| *a == asset)
            .map(|(_, amount)| amount.clone())
            .unwrap_or_else(nat_zero)
    }

    pub fn open_grants(&self) -> &[(Principal, Principal)] {
        &self.grants
    }

    fn add_held(&mut self, asset: Asset, amount: &Nat) {
        match self.held.iter_mut().find(|(a, _)| *a == asset) {
            Some((_, held)) => *held = held.clone() + amount.clone(),
            None => self.held.push((asset, amount.clone())),
        }
    }

    fn sub_held(&mut self, asset: Asset, amount: &Nat) {
        if let Some((_, held)) = self.held.iter_mut().find(|(a, _)| *a == asset) {
            *held = saturating_sub(held, amount);
        }
    }

    // === LEDGER FEES ===

    /// Flat ledger fee for `asset`, queried once per operation
    pub async fn fee(&mut self, asset: Asset) -> Result<Nat> {
        if let Some((_, fee)) = self.fees.iter().find(|(a, _)| *a == asset) {
            return Ok(fee.clone());
        }

        let fee = match asset {
            Asset::Token(token) => self.deps.ledger().fee(token).await,
            Asset::Native => self.deps.native().fee().await,
        }
        .map_err(|e| transfer_failed(asset, &nat_zero(), "fee", e))?;

        self.fees.push((asset, fee.clone()));
        Ok(fee)
    }

    /// The router paid one ledger fee in `asset` out of what it holds
    pub async fn pay_fee(&mut self, asset: Asset) -> Result<()> {
        let fee = self.fee(asset).await?;
        self.sub_held(asset, &fee);
        Ok(())
    }

    // === ESCROW IN ===

    /// Snapshot the router's native balance so only this operation's surplus
    /// is refunded later
    pub async fn track_native(&mut self) -> Result<()> {
        let balance = self.deps.native().balance().await
            .map_err(|e| transfer_failed(Asset::Native, &nat_zero(), "native balance", e))?;
        self.native_baseline = Some(balance);
        Ok(())
    }

    /// caller -> router, using the caller's allowance to the router
    ///
    /// Pulls `amount` plus the fees the router pays while granting it to the
    /// AMM, so the caller funds them rather than the router.
    pub async fn pull_in(&mut self, token: Principal, amount: &Nat) -> Result<()> {
        let fee = self.fee(Asset::Token(token)).await?;
        let total = amount.clone() + fee * Nat::from(GRANTED_INPUT_FEES);

        self.deps.ledger()
            .transfer_from(token, self.caller, self.deps.router_id(), total.clone())
            .await
            .map_err(|e| transfer_failed(Asset::Token(token), &total, "pull_in", e))?;

        crate::log!("📥 Pulled {} of {} from {}", total, token, self.caller);
        self.add_held(Asset::Token(token), &total);
        Ok(())
    }

    /// Take the value the caller attached to this call, plus the native fee
    /// for forwarding it to the AMM
    pub async fn accept_native(&mut self, amount: &Nat) -> Result<()> {
        if self.native_baseline.is_none() {
            self.track_native().await?;
        }
        let total = amount.clone() + self.fee(Asset::Native).await?;

        self.deps.native()
            .receive(self.caller, total.clone())
            .await
            .map_err(|e| transfer_failed(Asset::Native, &total, "accept_native", e))?;

        crate::log!("📥 Accepted {} native from {}", total, self.caller);
        self.add_held(Asset::Native, &total);
        Ok(())
    }

    // === AMM SETTLEMENT ===

    /// The AMM took `amount` of a held asset; its transfer fee comes out of
    /// the holding too
    pub async fn record_consumed(&mut self, asset: Asset, amount: &Nat) -> Result<()> {
        self.sub_held(asset, amount);
        self.pay_fee(asset).await
    }

    /// The AMM paid `amount` to the router for the caller
    pub fn record_received(&mut self, asset: Asset, amount: &Nat) {
        self.add_held(asset, amount);
    }

    pub fn record_grant(&mut self, token: Principal, spender: Principal) {
        if !self.grants.contains(&(token, spender)) {
            self.grants.push((token, spender));
        }
    }

    pub fn record_revoke(&mut self, token: Principal, spender: Principal) {
        self.grants.retain(|grant| *grant != (token, spender));
    }

    // === ESCROW OUT ===

    /// Pay `gross` of `asset` from router custody to `to`; the ledger fee
    /// comes out of it. Returns what actually arrives.
    async fn deliver(
        &mut self,
        asset: Asset,
        to: Principal,
        gross: &Nat,
        failed: fn(Asset, &Nat, String) -> RouterError,
    ) -> Result<Nat> {
        if is_zero(gross) {
            return Ok(nat_zero());
        }

        let fee = self.fee(asset).await?;
        let net = saturating_sub(gross, &fee);
        if is_zero(&net) {
            crate::log!("⚠️ {} {} does not cover the ledger fee; left in router custody", gross, asset.label());
            return Ok(net);
        }

        let sent = match asset {
            Asset::Token(token) => self.deps.ledger().transfer(token, to, net.clone()).await,
            Asset::Native => self.deps.native().send(to, net.clone()).await,
        };
        sent.map_err(|e| failed(asset, gross, e))?;

        self.sub_held(asset, gross);
        Ok(net)
    }

    /// router -> `to`; returns the amount delivered after the ledger fee
    pub async fn push_out(&mut self, token: Principal, to: Principal, amount: &Nat) -> Result<Nat> {
        let delivered = self
            .deliver(Asset::Token(token), to, amount, |asset, amount, e| {
                transfer_failed(asset, amount, "push_out", e)
            })
            .await?;
        crate::log!("📤 Paid {} of {} to {}", delivered, token, to);
        Ok(delivered)
    }

    pub async fn send_native(&mut self, to: Principal, amount: &Nat) -> Result<Nat> {
        let delivered = self
            .deliver(Asset::Native, to, amount, |asset, amount, e| {
                transfer_failed(asset, amount, "send_native", e)
            })
            .await?;
        crate::log!("📤 Paid {} native to {}", delivered, to);
        Ok(delivered)
    }

    /// Return `supplied - used` of `token` to `to`; returns the amount
    /// delivered after the ledger fee
    pub async fn refund_unused(&mut self, token: Principal, to: Principal, supplied: &Nat, used: &Nat) -> Result<Nat> {
        let remainder = saturating_sub(supplied, used);
        let refunded = self.deliver(Asset::Token(token), to, &remainder, refund_failed).await?;
        if !is_zero(&refunded) {
            crate::log!("↩️ Refunded {} of {} to {}", refunded, token, to);
        }
        Ok(refunded)
    }

    /// Send back whatever native value this operation left above the
    /// baseline taken before it accepted any, never more than the router
    /// holds for the caller
    pub async fn refund_excess_native(&mut self, to: Principal) -> Result<Nat> {
        let baseline = match &self.native_baseline {
            Some(baseline) => baseline.clone(),
            None => return Ok(nat_zero()),
        };

        let balance = self.deps.native().balance().await
            .map_err(|e| refund_failed(Asset::Native, &nat_zero(), e))?;
        let surplus = saturating_sub(&balance, &baseline);
        let held = self.held(Asset::Native);
        let excess = if surplus < held { surplus } else { held };

        let refunded = self.deliver(Asset::Native, to, &excess, refund_failed).await?;
        if !is_zero(&refunded) {
            crate::log!("↩️ Refunded {} native to {}", refunded, to);
        }
        Ok(refunded)
    }

    // === OUTCOME ===

    /// Queue a record for publication on commit
    pub fn stage(&mut self, kind: RouterEventKind) {
        self.staged.push(kind);
    }

    /// Commit on success, compensate on failure
    pub async fn settle<T>(self, outcome: Result<T>) -> Result<T> {
        match outcome {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(error) => {
                self.rollback(&error).await;
                Err(error)
            }
        }
    }

    pub async fn commit(mut self) -> Result<()> {
        // Flows revoke explicitly; anything still open is closed here
        let open: Vec<_> = self.grants.clone();
        for (token, spender) in open {
            approvals::revoke(&mut self, token, spender).await?;
        }

        for kind in self.staged.drain(..) {
            events::emit(kind, self.now)?;
        }

        crate::log!("✅ {} committed", self.operation);
        Ok(())
    }

    /// Best-effort compensation in reverse order of the escrow steps
    pub async fn rollback(mut self, error: &RouterError) {
        crate::log!("⏪ Rolling back {}: {}", self.operation, error);

        let deps = self.deps;
        let revocations = self.grants.iter().map(|(token, spender)| {
            let (token, spender) = (*token, *spender);
            async move { (token, deps.ledger().approve(token, spender, nat_zero()).await) }
        });
        let revoked = futures::future::join_all(revocations).await;
        for (token, result) in revoked {
            match result {
                Ok(()) => {
                    if let Err(e) = self.pay_fee(Asset::Token(token)).await {
                        crate::log!("⚠️ Revoked {} but its fee is unknown: {}", token, e);
                    }
                }
                Err(e) => crate::log!("⚠️ Could not revoke allowance on {}: {}", token, e),
            }
        }
        self.grants.clear();

        let caller = self.caller;
        let held: Vec<_> = self.held.iter().rev().cloned().collect();
        for (asset, amount) in held {
            if is_zero(&amount) {
                continue;
            }
            let returned = self
                .deliver(asset, caller, &amount, |asset, amount, e| {
                    transfer_failed(asset, amount, "rollback_return", e)
                })
                .await;
            match returned {
                Ok(net) if !is_zero(&net) => crate::log!("↩️ Returned {} {} to {}", net, asset.label(), caller),
                Ok(_) => {}
                Err(e) => crate::log!(
                    "⚠️ Could not return {} {} to {} ({}); left in router custody",
                    amount, asset.label(), caller, e
                ),
            }
        }

        self.staged.clear();
    }
}

//! # Allowance Management
//!
//! The AMM pulls router-held tokens with ICRC-2 `transfer_from`, so every
//! delegated call needs an allowance from the router to the AMM.
//!
//! ## Grant Flow
//! 1. Reset the allowance to zero
//! 2. Raise it to the amount the delegated call may spend plus the ledger
//!    fee on the AMM's `transfer_from`
//! 3. Delegated call runs
//! 4. Revoke back to zero
//!
//! ## Safety
//! - Step 1 is never skipped: some ledgers reject a nonzero to nonzero
//!   change, and a partially consumed earlier grant must not carry over
//! - Grants are journaled, so a failed operation revokes them on rollback
//! - The custodian never touches allowances; only this module does
//! - Each approve costs the router one ledger fee, charged to the journal

use candid::{Nat, Principal};
use crate::_2_CRITICAL_DATA::CustodyJournal;
use crate::_3_AMM_SERVICE::{Collaborators, TokenLedger};
use crate::infrastructure::{CustodyError, Result, RouterError};
use crate::infrastructure::math::nat_zero;
use crate::types::Asset;

fn approval_failed(token: Principal, amount: &Nat, operation: &str, reason: String) -> RouterError {
    crate::log!("❌ Approval {} of {} on {} failed: {}", operation, amount, token, reason);
    RouterError::Custody(CustodyError::TransferFailed {
        asset: token.to_text(),
        amount: amount.to_string(),
        operation: operation.to_string(),
    })
}

/// Allow `spender` to take `amount` of the router's `token`
pub async fn grant<C: Collaborators>(
    journal: &mut CustodyJournal<'_, C>,
    token: Principal,
    spender: Principal,
    amount: &Nat,
) -> Result<()> {
    let ledger = journal.deps().ledger();
    let allowance = amount.clone() + journal.fee(Asset::Token(token)).await?;

    // Step 1: reset
    ledger.approve(token, spender, nat_zero())
        .await
        .map_err(|e| approval_failed(token, &nat_zero(), "approve_reset", e))?;
    journal.pay_fee(Asset::Token(token)).await?;

    // Step 2: raise (journaled first so an ambiguous failure still gets revoked)
    journal.record_grant(token, spender);
    ledger.approve(token, spender, allowance.clone())
        .await
        .map_err(|e| approval_failed(token, &allowance, "approve", e))?;
    journal.pay_fee(Asset::Token(token)).await?;

    crate::log!("📝 Approved {} of {} for {}", allowance, token, spender);
    Ok(())
}

/// Set the router's allowance for `spender` back to zero
pub async fn revoke<C: Collaborators>(
    journal: &mut CustodyJournal<'_, C>,
    token: Principal,
    spender: Principal,
) -> Result<()> {
    journal.deps().ledger()
        .approve(token, spender, nat_zero())
        .await
        .map_err(|e| approval_failed(token, &nat_zero(), "approve_revoke", e))?;

    journal.record_revoke(token, spender);
    journal.pay_fee(Asset::Token(token)).await?;
    crate::log!("🔒 Revoked allowance on {} for {}", token, spender);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{principal, MockState};
    use crate::types::CallContext;
    use futures::executor::block_on;

    fn ctx() -> CallContext {
        CallContext { caller: principal(1), now: 1, value: nat_zero() }
    }

    #[test]
    fn test_grant_resets_before_raising() {
        let world = MockState::new();
        let token = principal(10);
        let amm = principal(50);
        world.strict_approvals();
        // Leftover from an earlier, partially consumed grant
        world.set_allowance(token, world.router(), amm, 7);

        block_on(async {
            let mut journal = CustodyJournal::open(&world, "test", &ctx());
            grant(&mut journal, token, amm, &Nat::from(500u64)).await.unwrap();
            assert_eq!(journal.open_grants(), &[(token, amm)]);
        });

        assert_eq!(world.allowance(token, world.router(), amm), Nat::from(500u64));
        assert_eq!(
            world.approvals(),
            vec![(token, amm, nat_zero()), (token, amm, Nat::from(500u64))]
        );
    }

    #[test]
    fn test_revoke_round_trip_leaves_zero() {
        let world = MockState::new();
        let token = principal(10);
        let amm = principal(50);

        block_on(async {
            let mut journal = CustodyJournal::open(&world, "test", &ctx());
            grant(&mut journal, token, amm, &Nat::from(500u64)).await.unwrap();
            revoke(&mut journal, token, amm).await.unwrap();
            assert!(journal.open_grants().is_empty());
        });

        assert_eq!(world.allowance(token, world.router(), amm), nat_zero());
    }

    #[test]
    fn test_grant_covers_and_charges_ledger_fees() {
        let world = MockState::new();
        let token = principal(10);
        let amm = principal(50);
        world.set_fee(Asset::Token(token), 10);
        world.mint(Asset::Token(token), principal(1), 1_000);

        block_on(async {
            let mut journal = CustodyJournal::open(&world, "test", &ctx());
            // 500 plus four fees
            journal.pull_in(token, &Nat::from(500u64)).await.unwrap();
            assert_eq!(journal.held(Asset::Token(token)), Nat::from(540u64));

            grant(&mut journal, token, amm, &Nat::from(500u64)).await.unwrap();
            assert_eq!(journal.held(Asset::Token(token)), Nat::from(520u64));
            revoke(&mut journal, token, amm).await.unwrap();
            assert_eq!(journal.held(Asset::Token(token)), Nat::from(510u64));
        });

        assert_eq!(world.approvals()[1], (token, amm, Nat::from(510u64)));
        assert_eq!(world.balance(Asset::Token(token), world.router()), Nat::from(510u64));
        // Caller paid the pull fee on top
        assert_eq!(world.balance(Asset::Token(token), principal(1)), Nat::from(450u64));
    }

    #[test]
    fn test_rejected_approval_is_transfer_failed() {
        let world = MockState::new();
        let token = principal(10);
        world.fail_transfers_of(Asset::Token(token));

        block_on(async {
            let mut journal = CustodyJournal::open(&world, "test", &ctx());
            let err = grant(&mut journal, token, principal(50), &Nat::from(1u64)).await.unwrap_err();
            assert_eq!(err.kind(), "TransferFailed");
        });
    }
}

//! ICRC ledger adapters
//!
//! Every ledger call carries the router memo and no `created_at_time`: an
//! operation may legitimately issue two identical transfers (e.g. the same
//! refund amount on both sides of a pool), which the ledger's deduplication
//! window would otherwise reject.

use candid::{Nat, Principal};
use serde_bytes::ByteBuf;
use crate::infrastructure::constants::{APPROVAL_EXPIRY_NANOS, ROUTER_MEMO};
use crate::types::icrc::{
    Account, ApproveArgs, ApproveError, TransferArg, TransferError, TransferFromArgs,
    TransferFromError,
};
use crate::_3_AMM_SERVICE::{NativeLedger, ServiceResult, TokenLedger};

fn memo() -> Option<ByteBuf> {
    Some(ByteBuf::from(ROUTER_MEMO.to_vec()))
}

async fn icrc2_transfer_from(ledger: Principal, from: Principal, to: Principal, amount: Nat) -> ServiceResult<()> {
    let args = TransferFromArgs {
        spender_subaccount: None,
        from: Account::from(from),
        to: Account::from(to),
        amount,
        fee: None,
        memo: memo(),
        created_at_time: None,
    };

    let (result,): (std::result::Result<Nat, TransferFromError>,) =
        ic_cdk::call(ledger, "icrc2_transfer_from", (args,))
            .await
            .map_err(|(code, msg)| format!("Inter-canister call failed: {:?} - {}", code, msg))?;

    result.map(|_| ()).map_err(|e| format!("ICRC-2 error: {:?}", e))
}

async fn icrc1_transfer(ledger: Principal, to: Principal, amount: Nat) -> ServiceResult<()> {
    let args = TransferArg {
        from_subaccount: None,
        to: Account::from(to),
        amount,
        fee: None,
        memo: memo(),
        created_at_time: None,
    };

    let (result,): (std::result::Result<Nat, TransferError>,) =
        ic_cdk::call(ledger, "icrc1_transfer", (args,))
            .await
            .map_err(|(code, msg)| format!("Inter-canister call failed: {:?} - {}", code, msg))?;

    result.map(|_| ()).map_err(|e| format!("ICRC-1 error: {:?}", e))
}

async fn icrc1_balance_of(ledger: Principal, owner: Principal) -> ServiceResult<Nat> {
    let (balance,): (Nat,) = ic_cdk::call(ledger, "icrc1_balance_of", (Account::from(owner),))
        .await
        .map_err(|(code, msg)| format!("Balance query failed: {:?} - {}", code, msg))?;
    Ok(balance)
}

async fn icrc1_fee(ledger: Principal) -> ServiceResult<Nat> {
    let (fee,): (Nat,) = ic_cdk::call(ledger, "icrc1_fee", ())
        .await
        .map_err(|(code, msg)| format!("Fee query failed: {:?} - {}", code, msg))?;
    Ok(fee)
}

/// Token ledgers addressed by their canister id
#[derive(Debug, Clone, Default)]
pub struct IcrcLedger;

impl TokenLedger for IcrcLedger {
    async fn transfer_from(&self, token: Principal, from: Principal, to: Principal, amount: Nat) -> ServiceResult<()> {
        icrc2_transfer_from(token, from, to, amount).await
    }

    async fn transfer(&self, token: Principal, to: Principal, amount: Nat) -> ServiceResult<()> {
        icrc1_transfer(token, to, amount).await
    }

    async fn approve(&self, token: Principal, spender: Principal, amount: Nat) -> ServiceResult<()> {
        let args = ApproveArgs {
            from_subaccount: None,
            spender: Account::from(spender),
            amount,
            expected_allowance: None,
            expires_at: Some(ic_cdk::api::time() + APPROVAL_EXPIRY_NANOS),
            fee: None,
            memo: memo(),
            created_at_time: None,
        };

        let (result,): (std::result::Result<Nat, ApproveError>,) =
            ic_cdk::call(token, "icrc2_approve", (args,))
                .await
                .map_err(|(code, msg)| format!("Inter-canister call failed: {:?} - {}", code, msg))?;

        result.map(|_| ()).map_err(|e| format!("Approval rejected: {:?}", e))
    }

    async fn fee(&self, token: Principal) -> ServiceResult<Nat> {
        icrc1_fee(token).await
    }

    async fn balance_of(&self, token: Principal, owner: Principal) -> ServiceResult<Nat> {
        icrc1_balance_of(token, owner).await
    }
}

/// Native currency served by an ICRC ledger
///
/// The caller attaches value by approving the router on this ledger; the
/// router then takes exactly the declared amount with `icrc2_transfer_from`.
#[derive(Debug, Clone)]
pub struct NativeIcrcLedger {
    pub ledger: Principal,
    pub router: Principal,
}

impl NativeLedger for NativeIcrcLedger {
    async fn balance(&self) -> ServiceResult<Nat> {
        icrc1_balance_of(self.ledger, self.router).await
    }

    async fn receive(&self, from: Principal, amount: Nat) -> ServiceResult<()> {
        icrc2_transfer_from(self.ledger, from, self.router, amount).await
    }

    async fn send(&self, to: Principal, amount: Nat) -> ServiceResult<()> {
        icrc1_transfer(self.ledger, to, amount).await
    }

    async fn fee(&self) -> ServiceResult<Nat> {
        icrc1_fee(self.ledger).await
    }
}

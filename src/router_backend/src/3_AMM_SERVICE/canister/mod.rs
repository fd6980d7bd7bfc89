//! Deployed collaborators: real ledger and AMM canisters

pub mod amm;
pub mod ledger;

use candid::Principal;
use crate::infrastructure::stable_storage::{self, RouterConfig};
use super::Collaborators;
use amm::AmmCanister;
use ledger::{IcrcLedger, NativeIcrcLedger};

pub struct IcCollaborators {
    router_id: Principal,
    ledger: IcrcLedger,
    native: NativeIcrcLedger,
    amm: AmmCanister,
}

impl IcCollaborators {
    pub fn from_config(config: &RouterConfig, router_id: Principal) -> Self {
        let native = NativeIcrcLedger {
            ledger: config.native_ledger,
            router: router_id,
        };
        Self {
            router_id,
            ledger: IcrcLedger,
            amm: AmmCanister {
                canister_id: config.amm_canister,
                wrapped_native: config.wrapped_native,
                native: native.clone(),
            },
            native,
        }
    }

    /// Collaborators for the running canister
    pub fn current() -> Self {
        Self::from_config(&stable_storage::read_config(), ic_cdk::id())
    }
}

impl Collaborators for IcCollaborators {
    type Ledger = IcrcLedger;
    type Native = NativeIcrcLedger;
    type Amm = AmmCanister;

    fn router_id(&self) -> Principal {
        self.router_id
    }

    fn ledger(&self) -> &IcrcLedger {
        &self.ledger
    }

    fn native(&self) -> &NativeIcrcLedger {
        &self.native
    }

    fn amm(&self) -> &AmmCanister {
        &self.amm
    }
}

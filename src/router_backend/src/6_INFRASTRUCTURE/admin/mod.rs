//! Admin Controls Module
//!
//! Owner gate, emergency pause and admin action logging for the router.
//!
//! Security Note: there is exactly one owner principal. It is set at install
//! time (defaulting to the installer) and can only be changed by the current
//! owner through `transfer_ownership`.

use candid::{CandidType, Deserialize, Principal};
use std::cell::RefCell;
use crate::infrastructure::constants::MAX_ADMIN_LOG_ENTRIES;
use crate::infrastructure::stable_storage;
use crate::infrastructure::{AuthError, Result, RouterError, SystemError, ValidationError};

/// Capability check: `caller` must be `owner`
pub fn require_owner(caller: &Principal, owner: &Principal, operation: &str) -> Result<()> {
    if caller == owner && *owner != Principal::anonymous() {
        Ok(())
    } else {
        Err(RouterError::Auth(AuthError::Unauthorized {
            principal: caller.to_text(),
            operation: operation.to_string(),
        }))
    }
}

/// Check `caller` against the persisted owner, returning the owner on success
pub fn require_router_owner(caller: &Principal, operation: &str) -> Result<Principal> {
    let owner = stable_storage::read_config().owner;
    require_owner(caller, &owner, operation)?;
    Ok(owner)
}

pub fn get_owner() -> Principal {
    stable_storage::read_config().owner
}

/// Hand the owner role to `new_owner`
pub fn transfer_ownership(caller: Principal, new_owner: Principal, now: u64) -> Result<()> {
    let previous = require_router_owner(&caller, "transfer_ownership")?;

    if new_owner == Principal::anonymous() {
        return Err(RouterError::Validation(ValidationError::InvalidParams {
            field: "new_owner".to_string(),
            reason: "anonymous principal cannot own the router".to_string(),
        }));
    }

    stable_storage::update_config(|config| config.owner = new_owner)?;
    log_admin_action(
        caller,
        format!("OWNERSHIP_TRANSFERRED {} -> {}", previous, new_owner),
        now,
    );
    Ok(())
}

// === EMERGENCY PAUSE ===

/// Fails with `Paused` while the router is paused
pub fn check_not_paused() -> Result<()> {
    if stable_storage::read_config().paused {
        Err(RouterError::System(SystemError::Paused))
    } else {
        Ok(())
    }
}

pub fn set_paused(caller: Principal, paused: bool, now: u64) -> Result<()> {
    require_router_owner(&caller, "set_paused")?;
    stable_storage::update_config(|config| config.paused = paused)?;

    let action = if paused {
        "EMERGENCY_PAUSE_ACTIVATED"
    } else {
        "EMERGENCY_PAUSE_DEACTIVATED"
    };
    log_admin_action(caller, action.to_string(), now);
    Ok(())
}

pub fn is_paused() -> bool {
    stable_storage::read_config().paused
}

// === ADMIN LOG ===

/// Admin action log entry
#[derive(Clone, Debug, CandidType, Deserialize, serde::Serialize)]
pub struct AdminAction {
    pub timestamp: u64,
    pub admin: Principal,
    pub action: String,
}

thread_local! {
    static ADMIN_LOG: RefCell<Vec<AdminAction>> = RefCell::new(Vec::new());
}

pub fn log_admin_action(admin: Principal, action: String, now: u64) {
    crate::log!("📝 Admin action: {} by {}", action, admin);

    ADMIN_LOG.with(|log| {
        let mut log = log.borrow_mut();
        log.push(AdminAction {
            timestamp: now,
            admin,
            action,
        });

        let len = log.len();
        if len > MAX_ADMIN_LOG_ENTRIES {
            log.drain(0..(len - MAX_ADMIN_LOG_ENTRIES));
        }
    });
}

pub fn get_admin_log() -> Vec<AdminAction> {
    ADMIN_LOG.with(|log| log.borrow().clone())
}

//! Reentrancy guard for state-mutating router operations
//!
//! Canister messages interleave at every inter-canister `await`. A hostile
//! ledger (or another caller) can therefore reach the router while an
//! operation is suspended halfway through custody. The router-wide guard
//! rejects any such nested call with `Reentrant`.
//!
//! ## States
//! `Unlocked -> Locked -> Unlocked`
//!
//! Acquisition returns a `GuardLock`; dropping it releases the guard, so the
//! release happens on every exit path including `?` early returns.

use std::cell::Cell;
use std::rc::Rc;
use crate::infrastructure::{Result, RouterError, SystemError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unlocked,
    Locked { operation: &'static str },
}

/// Call-scoped mutual exclusion
#[derive(Debug, Clone)]
pub struct ReentrancyGuard {
    state: Rc<Cell<GuardState>>,
}

impl Default for ReentrancyGuard {
    fn default() -> Self {
        Self {
            state: Rc::new(Cell::new(GuardState::Unlocked)),
        }
    }
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the guard for `operation`
    pub fn acquire(&self, operation: &'static str) -> Result<GuardLock> {
        match self.state.get() {
            GuardState::Locked { operation: active } => {
                crate::log!("🚫 Reentrant call to {} rejected ({} in progress)", operation, active);
                Err(RouterError::System(SystemError::Reentrant {
                    operation: operation.to_string(),
                    active: active.to_string(),
                }))
            }
            GuardState::Unlocked => {
                self.state.set(GuardState::Locked { operation });
                Ok(GuardLock {
                    state: Rc::clone(&self.state),
                })
            }
        }
    }

    pub fn state(&self) -> GuardState {
        self.state.get()
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state.get(), GuardState::Locked { .. })
    }
}

/// Held for the duration of one guarded operation
#[derive(Debug)]
pub struct GuardLock {
    state: Rc<Cell<GuardState>>,
}

impl Drop for GuardLock {
    fn drop(&mut self) {
        self.state.set(GuardState::Unlocked);
    }
}

thread_local! {
    /// One guard for the whole router: custody is shared across all operations
    static ROUTER_GUARD: ReentrancyGuard = ReentrancyGuard::new();
}

/// Acquire the router-wide guard
pub fn acquire_router_lock(operation: &'static str) -> Result<GuardLock> {
    ROUTER_GUARD.with(|guard| guard.acquire(operation))
}

/// Current router guard state (for monitoring)
pub fn router_guard_state() -> GuardState {
    ROUTER_GUARD.with(|guard| guard.state())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_prevents_reentrancy() {
        let guard = ReentrancyGuard::new();

        let lock = guard.acquire("swap").expect("First acquire should succeed");
        assert_eq!(guard.state(), GuardState::Locked { operation: "swap" });

        let nested = guard.acquire("add_liquidity");
        assert!(matches!(
            nested,
            Err(RouterError::System(SystemError::Reentrant { ref operation, ref active }))
                if operation == "add_liquidity" && active == "swap"
        ));

        drop(lock);
        assert_eq!(guard.state(), GuardState::Unlocked);

        let _again = guard.acquire("add_liquidity").expect("Should succeed after drop");
    }

    #[test]
    fn test_guard_released_on_error_path() {
        fn guarded_failure(guard: &ReentrancyGuard) -> Result<()> {
            let _lock = guard.acquire("failing_op")?;
            Err(RouterError::System(SystemError::Paused))
        }

        let guard = ReentrancyGuard::new();
        assert!(guarded_failure(&guard).is_err());
        assert!(!guard.is_locked());
    }

    #[test]
    fn test_router_lock_is_shared() {
        let lock = acquire_router_lock("rescue_asset").expect("Router lock should be free");
        assert!(acquire_router_lock("remove_liquidity").is_err());
        assert_eq!(router_guard_state(), GuardState::Locked { operation: "rescue_asset" });

        drop(lock);
        assert_eq!(router_guard_state(), GuardState::Unlocked);
    }
}

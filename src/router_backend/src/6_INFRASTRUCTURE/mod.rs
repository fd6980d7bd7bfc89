//! Infrastructure - Shared utilities and types
//! Foundation layer for all other modules

pub mod constants;
pub mod errors;
pub mod logging;
pub mod math;
pub mod reentrancy;
pub mod stable_storage;
pub mod events;
pub mod admin;

// Re-export commonly used items
pub use errors::{RouterError, Result, ValidationError, CustodyError, DelegateError, LiquidityError, SystemError, AuthError};
pub use reentrancy::acquire_router_lock;
pub use admin::{require_owner, require_router_owner, check_not_paused, log_admin_action, AdminAction};

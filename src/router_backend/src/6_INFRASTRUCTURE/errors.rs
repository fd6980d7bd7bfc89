//! Error taxonomy for the router
//!
//! Errors are grouped by the stage that raised them so callers can tell
//! "fix your input" (Validation) from "try again later" (Delegate) from
//! "not permitted" (Auth) without parsing messages.

use candid::{CandidType, Deserialize};
use serde::Serialize;
use std::fmt;

pub type Result<T> = std::result::Result<T, RouterError>;

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    Validation(ValidationError),
    Custody(CustodyError),
    Delegate(DelegateError),
    Liquidity(LiquidityError),
    System(SystemError),
    Auth(AuthError),
}

/// Local request checks. Raised before any custody transfer.
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidPath { length: u64, reason: String },
    DeadlinePassed { deadline: u64, now: u64 },
    InsufficientAmount { field: String },
    InvalidParams { field: String, reason: String },
}

/// Asset movement failures reported by a ledger
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    TransferFailed { asset: String, amount: String, operation: String },
    RefundFailed { asset: String, amount: String },
}

/// Delegated AMM call failures. The AMM's own reason is never carried here.
#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum DelegateError {
    SwapFailed { operation: String },
    AddLiquidityFailed { operation: String },
    RemoveLiquidityFailed { operation: String },
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum LiquidityError {
    PairNotFound { token_a: String, token_b: String },
    InsufficientLiquidity { available: String, required: String },
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum SystemError {
    Reentrant { operation: String, active: String },
    Paused,
    StorageFailed { reason: String },
}

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    Unauthorized { principal: String, operation: String },
}

impl RouterError {
    /// Short, stable name of the error kind for logs
    pub fn kind(&self) -> &'static str {
        match self {
            RouterError::Validation(e) => match e {
                ValidationError::InvalidPath { .. } => "InvalidPath",
                ValidationError::DeadlinePassed { .. } => "DeadlinePassed",
                ValidationError::InsufficientAmount { .. } => "InsufficientAmount",
                ValidationError::InvalidParams { .. } => "InvalidParams",
            },
            RouterError::Custody(e) => match e {
                CustodyError::TransferFailed { .. } => "TransferFailed",
                CustodyError::RefundFailed { .. } => "RefundFailed",
            },
            RouterError::Delegate(e) => match e {
                DelegateError::SwapFailed { .. } => "SwapFailed",
                DelegateError::AddLiquidityFailed { .. } => "AddLiquidityFailed",
                DelegateError::RemoveLiquidityFailed { .. } => "RemoveLiquidityFailed",
            },
            RouterError::Liquidity(e) => match e {
                LiquidityError::PairNotFound { .. } => "PairNotFound",
                LiquidityError::InsufficientLiquidity { .. } => "InsufficientLiquidity",
            },
            RouterError::System(e) => match e {
                SystemError::Reentrant { .. } => "Reentrant",
                SystemError::Paused => "Paused",
                SystemError::StorageFailed { .. } => "StorageFailed",
            },
            RouterError::Auth(AuthError::Unauthorized { .. }) => "Unauthorized",
        }
    }

    /// True for failures a caller may retry unchanged on a fresh call
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RouterError::Delegate(_)
                | RouterError::Custody(_)
                | RouterError::System(SystemError::Reentrant { .. })
                | RouterError::System(SystemError::Paused)
        )
    }
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::Validation(e) => write!(f, "Validation error: {}", e),
            RouterError::Custody(e) => write!(f, "Custody error: {}", e),
            RouterError::Delegate(e) => write!(f, "Delegated call error: {}", e),
            RouterError::Liquidity(e) => write!(f, "Liquidity error: {}", e),
            RouterError::System(e) => write!(f, "System error: {}", e),
            RouterError::Auth(e) => write!(f, "Authorization error: {}", e),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidPath { length, reason } => {
                write!(f, "invalid path of length {}: {}", length, reason)
            }
            ValidationError::DeadlinePassed { deadline, now } => {
                write!(f, "deadline {} passed (now {})", deadline, now)
            }
            ValidationError::InsufficientAmount { field } => {
                write!(f, "{} must be greater than zero", field)
            }
            ValidationError::InvalidParams { field, reason } => {
                write!(f, "invalid {}: {}", field, reason)
            }
        }
    }
}

impl fmt::Display for CustodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustodyError::TransferFailed { asset, amount, operation } => {
                write!(f, "{} of {} {} failed", operation, amount, asset)
            }
            CustodyError::RefundFailed { asset, amount } => {
                write!(f, "refund of {} {} failed", amount, asset)
            }
        }
    }
}

impl fmt::Display for DelegateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DelegateError::SwapFailed { operation } => write!(f, "swap failed ({})", operation),
            DelegateError::AddLiquidityFailed { operation } => {
                write!(f, "add liquidity failed ({})", operation)
            }
            DelegateError::RemoveLiquidityFailed { operation } => {
                write!(f, "remove liquidity failed ({})", operation)
            }
        }
    }
}

impl fmt::Display for LiquidityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiquidityError::PairNotFound { token_a, token_b } => {
                write!(f, "no pair for {} / {}", token_a, token_b)
            }
            LiquidityError::InsufficientLiquidity { available, required } => {
                write!(f, "insufficient liquidity: have {}, need {}", available, required)
            }
        }
    }
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemError::Reentrant { operation, active } => {
                write!(f, "{} rejected: {} already in progress", operation, active)
            }
            SystemError::Paused => write!(f, "router is paused"),
            SystemError::StorageFailed { reason } => write!(f, "stable storage failure: {}", reason),
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Unauthorized { principal, operation } => {
                write!(f, "{} is not allowed to call {}", principal, operation)
            }
        }
    }
}

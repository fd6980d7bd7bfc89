//! # Trading Execution Module
//!
//! Everything that talks to the AMM on a caller's behalf.
//!
//! ## Architecture
//! - **approvals/**: reset-then-raise allowance grants and their revocation
//! - **delegate/**: failure boundary around each AMM call
//!
//! ## Delegation Flow
//! 1. **Grant**: router approves the AMM for the exact input amount
//! 2. **Delegate**: AMM pulls the input and pays out
//! 3. **Check reply**: malformed success replies count as failures
//! 4. **Revoke**: allowance back to zero

pub mod approvals;
pub mod delegate;

//! Critical Operations - everything that moves caller value
//!
//! - **swaps/**: the six swap shapes over one execution path
//! - **liquidity/**: add and remove liquidity, token and native variants
//! - **rescue/**: owner-only recovery of stranded assets
//!
//! Every operation here runs validate, pause check, router lock, journaled
//! custody, delegation and settlement in that order.

pub mod liquidity;
pub mod rescue;
pub mod swaps;

//! Pure Nat helpers - no I/O, no async

use candid::Nat;
use num_bigint::BigUint;
use num_traits::{CheckedSub, Zero};

pub fn nat_zero() -> Nat {
    Nat(BigUint::zero())
}

pub fn is_zero(amount: &Nat) -> bool {
    amount.0.is_zero()
}

/// `a - b`, clamped at zero
pub fn saturating_sub(a: &Nat, b: &Nat) -> Nat {
    Nat(a.0.checked_sub(&b.0).unwrap_or_else(BigUint::zero))
}

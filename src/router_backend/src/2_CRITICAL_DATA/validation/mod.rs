//! Request validation
//!
//! Pure checks run before the router touches custody. Order per request:
//! path shape, deadline, amount positivity, then principals.

use candid::{Nat, Principal};
use crate::infrastructure::{Result, RouterError, ValidationError};
use crate::infrastructure::math::is_zero;
use crate::types::{
    AddLiquidityArgs, AddLiquidityNativeArgs, RemoveLiquidityArgs, RemoveLiquidityNativeArgs,
    SwapExactInArgs, SwapExactInForNativeArgs, SwapExactNativeInArgs, SwapExactNativeOutArgs,
    SwapExactOutArgs, SwapNativeForExactOutArgs,
};

// === PRIMITIVE CHECKS ===

pub fn check_path(path: &[Principal]) -> Result<()> {
    if path.len() < 2 {
        return Err(RouterError::Validation(ValidationError::InvalidPath {
            length: path.len() as u64,
            reason: "a path needs at least an input and an output asset".to_string(),
        }));
    }

    if path.windows(2).any(|hop| hop[0] == hop[1]) {
        return Err(RouterError::Validation(ValidationError::InvalidPath {
            length: path.len() as u64,
            reason: "consecutive hops must differ".to_string(),
        }));
    }

    for (index, token) in path.iter().enumerate() {
        check_principal(token, &format!("path[{}]", index))?;
    }

    Ok(())
}

pub fn check_deadline(deadline: u64, now: u64) -> Result<()> {
    if now > deadline {
        return Err(RouterError::Validation(ValidationError::DeadlinePassed { deadline, now }));
    }
    Ok(())
}

pub fn check_positive(amount: &Nat, field: &str) -> Result<()> {
    if is_zero(amount) {
        return Err(RouterError::Validation(ValidationError::InsufficientAmount {
            field: field.to_string(),
        }));
    }
    Ok(())
}

pub fn check_principal(principal: &Principal, field: &str) -> Result<()> {
    if *principal == Principal::anonymous() {
        return Err(RouterError::Validation(ValidationError::InvalidParams {
            field: field.to_string(),
            reason: "anonymous principal".to_string(),
        }));
    }
    Ok(())
}

pub fn check_distinct(token_a: &Principal, token_b: &Principal) -> Result<()> {
    if token_a == token_b {
        return Err(RouterError::Validation(ValidationError::InvalidParams {
            field: "token_b".to_string(),
            reason: "pool tokens must differ".to_string(),
        }));
    }
    Ok(())
}

/// Path for a native-currency swap: `[from, to]` with one side wrapped native
fn check_native_pair(token: &Principal, wrapped_native: &Principal) -> Result<()> {
    check_principal(token, "token")?;
    if token == wrapped_native {
        return Err(RouterError::Validation(ValidationError::InvalidPath {
            length: 2,
            reason: "token is the wrapped native asset itself".to_string(),
        }));
    }
    Ok(())
}

// === SWAPS ===

pub fn validate_swap_exact_in(args: &SwapExactInArgs, now: u64) -> Result<()> {
    check_path(&args.path)?;
    check_deadline(args.deadline, now)?;
    check_positive(&args.amount_in, "amount_in")?;
    check_principal(&args.recipient, "recipient")
}

pub fn validate_swap_exact_out(args: &SwapExactOutArgs, now: u64) -> Result<()> {
    check_path(&args.path)?;
    check_deadline(args.deadline, now)?;
    check_positive(&args.amount_out, "amount_out")?;
    check_positive(&args.amount_in_max, "amount_in_max")?;
    check_principal(&args.recipient, "recipient")
}

/// `value` is the native amount attached to the call
pub fn validate_swap_exact_native_in(args: &SwapExactNativeInArgs, value: &Nat, wrapped_native: &Principal, now: u64) -> Result<()> {
    check_native_pair(&args.token, wrapped_native)?;
    check_deadline(args.deadline, now)?;
    check_positive(value, "value")?;
    check_principal(&args.recipient, "recipient")
}

pub fn validate_swap_exact_native_out(args: &SwapExactNativeOutArgs, wrapped_native: &Principal, now: u64) -> Result<()> {
    check_native_pair(&args.token, wrapped_native)?;
    check_deadline(args.deadline, now)?;
    check_positive(&args.amount_out, "amount_out")?;
    check_positive(&args.amount_in_max, "amount_in_max")?;
    check_principal(&args.recipient, "recipient")
}

pub fn validate_swap_exact_in_for_native(args: &SwapExactInForNativeArgs, wrapped_native: &Principal, now: u64) -> Result<()> {
    check_native_pair(&args.token, wrapped_native)?;
    check_deadline(args.deadline, now)?;
    check_positive(&args.amount_in, "amount_in")?;
    check_principal(&args.recipient, "recipient")
}

pub fn validate_swap_native_for_exact_out(args: &SwapNativeForExactOutArgs, value: &Nat, wrapped_native: &Principal, now: u64) -> Result<()> {
    check_native_pair(&args.token, wrapped_native)?;
    check_deadline(args.deadline, now)?;
    check_positive(&args.amount_out, "amount_out")?;
    check_positive(value, "value")?;
    check_principal(&args.recipient, "recipient")
}

// === LIQUIDITY ===

pub fn validate_add_liquidity(args: &AddLiquidityArgs, now: u64) -> Result<()> {
    check_deadline(args.deadline, now)?;
    check_positive(&args.amount_a_desired, "amount_a_desired")?;
    check_positive(&args.amount_b_desired, "amount_b_desired")?;
    check_principal(&args.token_a, "token_a")?;
    check_principal(&args.token_b, "token_b")?;
    check_distinct(&args.token_a, &args.token_b)?;
    check_principal(&args.recipient, "recipient")
}

pub fn validate_add_liquidity_native(args: &AddLiquidityNativeArgs, value: &Nat, wrapped_native: &Principal, now: u64) -> Result<()> {
    check_deadline(args.deadline, now)?;
    check_positive(&args.amount_token_desired, "amount_token_desired")?;
    check_positive(value, "value")?;
    check_principal(&args.token, "token")?;
    check_distinct(wrapped_native, &args.token)?;
    check_principal(&args.recipient, "recipient")
}

pub fn validate_remove_liquidity(args: &RemoveLiquidityArgs, now: u64) -> Result<()> {
    check_deadline(args.deadline, now)?;
    check_positive(&args.liquidity, "liquidity")?;
    check_principal(&args.token_a, "token_a")?;
    check_principal(&args.token_b, "token_b")?;
    check_distinct(&args.token_a, &args.token_b)?;
    check_principal(&args.recipient, "recipient")
}

pub fn validate_remove_liquidity_native(args: &RemoveLiquidityNativeArgs, wrapped_native: &Principal, now: u64) -> Result<()> {
    check_deadline(args.deadline, now)?;
    check_positive(&args.liquidity, "liquidity")?;
    check_principal(&args.token, "token")?;
    check_distinct(wrapped_native, &args.token)?;
    check_principal(&args.recipient, "recipient")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(n: u8) -> Principal {
        Principal::from_slice(&[n; 29])
    }

    fn exact_in(path: Vec<Principal>, deadline: u64) -> SwapExactInArgs {
        SwapExactInArgs {
            amount_in: Nat::from(100u64),
            amount_out_min: Nat::from(1u64),
            path,
            recipient: p(9),
            deadline,
        }
    }

    #[test]
    fn test_single_hop_path_rejected() {
        let err = validate_swap_exact_in(&exact_in(vec![p(1)], 10), 5).unwrap_err();
        assert_eq!(err.kind(), "InvalidPath");

        let err = validate_swap_exact_in(&exact_in(vec![], 10), 5).unwrap_err();
        assert_eq!(err.kind(), "InvalidPath");
    }

    #[test]
    fn test_repeated_hop_rejected() {
        let err = validate_swap_exact_in(&exact_in(vec![p(1), p(1)], 10), 5).unwrap_err();
        assert_eq!(err.kind(), "InvalidPath");

        // Revisiting a token later in the path is allowed
        assert!(validate_swap_exact_in(&exact_in(vec![p(1), p(2), p(1)], 10), 5).is_ok());
    }

    #[test]
    fn test_deadline_is_inclusive() {
        assert!(validate_swap_exact_in(&exact_in(vec![p(1), p(2)], 10), 10).is_ok());

        let err = validate_swap_exact_in(&exact_in(vec![p(1), p(2)], 10), 11).unwrap_err();
        assert_eq!(
            err,
            RouterError::Validation(ValidationError::DeadlinePassed { deadline: 10, now: 11 })
        );
    }

    #[test]
    fn test_zero_amounts_rejected() {
        let mut args = exact_in(vec![p(1), p(2)], 10);
        args.amount_in = Nat::from(0u64);
        assert_eq!(validate_swap_exact_in(&args, 5).unwrap_err().kind(), "InsufficientAmount");

        let out = SwapExactOutArgs {
            amount_out: Nat::from(10u64),
            amount_in_max: Nat::from(0u64),
            path: vec![p(1), p(2)],
            recipient: p(9),
            deadline: 10,
        };
        assert_eq!(validate_swap_exact_out(&out, 5).unwrap_err().kind(), "InsufficientAmount");
    }

    #[test]
    fn test_anonymous_recipient_rejected() {
        let mut args = exact_in(vec![p(1), p(2)], 10);
        args.recipient = Principal::anonymous();
        assert!(matches!(
            validate_swap_exact_in(&args, 5),
            Err(RouterError::Validation(ValidationError::InvalidParams { .. }))
        ));
    }

    #[test]
    fn test_native_in_requires_attached_value() {
        let args = SwapExactNativeInArgs {
            token: p(2),
            amount_out_min: Nat::from(1u64),
            recipient: p(9),
            deadline: 10,
        };
        let err = validate_swap_exact_native_in(&args, &Nat::from(0u64), &p(7), 5).unwrap_err();
        assert_eq!(err.kind(), "InsufficientAmount");

        let err = validate_swap_exact_native_in(&args, &Nat::from(5u64), &p(2), 5).unwrap_err();
        assert_eq!(err.kind(), "InvalidPath");

        assert!(validate_swap_exact_native_in(&args, &Nat::from(5u64), &p(7), 5).is_ok());
    }

    #[test]
    fn test_pool_tokens_must_differ() {
        let args = AddLiquidityArgs {
            token_a: p(1),
            token_b: p(1),
            amount_a_desired: Nat::from(10u64),
            amount_b_desired: Nat::from(10u64),
            amount_a_min: Nat::from(0u64),
            amount_b_min: Nat::from(0u64),
            recipient: p(9),
            deadline: 10,
        };
        assert_eq!(validate_add_liquidity(&args, 5).unwrap_err().kind(), "InvalidParams");
    }

    #[test]
    fn test_remove_liquidity_needs_shares() {
        let args = RemoveLiquidityArgs {
            token_a: p(1),
            token_b: p(2),
            liquidity: Nat::from(0u64),
            amount_a_min: Nat::from(0u64),
            amount_b_min: Nat::from(0u64),
            recipient: p(9),
            deadline: 10,
        };
        assert_eq!(validate_remove_liquidity(&args, 5).unwrap_err().kind(), "InsufficientAmount");
    }
}

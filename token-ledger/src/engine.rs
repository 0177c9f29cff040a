//! Transfer engine: the state transitions over [`LedgerState`]
//!
//! Every operation validates against the current state, computes all new
//! values, and only then writes them. A failed precondition returns before the
//! first write, so a rejected call leaves the state untouched.
//!
//! Preconditions are checked in a fixed order:
//!
//! - `transfer`: balance
//! - `transfer_from`: allowance, then balance
//! - `burn`: balance
//! - `mint`: authorization, then overflow of balance and supply

use crate::{
    auth::{Caller, MintAuthority},
    state::LedgerState,
    types::{AccountId, Amount, EventKind},
    Error, Result,
};

/// Credit `amount` new units to `to`
pub fn mint(
    state: &mut LedgerState,
    authority: &dyn MintAuthority,
    caller: &Caller,
    to: &AccountId,
    amount: Amount,
) -> Result<EventKind> {
    if !authority.can_mint(caller.account()) {
        return Err(Error::Unauthorized(caller.account().clone()));
    }

    let supply = state
        .total_supply()
        .checked_add(amount)
        .ok_or(Error::Overflow)?;
    let balance = state
        .balance_of(to)
        .checked_add(amount)
        .ok_or(Error::Overflow)?;

    state.set_total_supply(supply);
    state.set_balance(to, balance);

    Ok(EventKind::Mint {
        to: to.clone(),
        amount,
    })
}

/// Move `amount` from the caller to `to`
pub fn transfer(
    state: &mut LedgerState,
    caller: &Caller,
    to: &AccountId,
    amount: Amount,
) -> Result<EventKind> {
    let from = caller.account();
    move_balance(state, from, to, amount)?;

    Ok(EventKind::Transfer {
        from: from.clone(),
        to: to.clone(),
        amount,
        spender: None,
    })
}

/// Set the caller's allowance for `spender` to exactly `amount`
pub fn approve(
    state: &mut LedgerState,
    caller: &Caller,
    spender: &AccountId,
    amount: Amount,
) -> EventKind {
    let owner = caller.account();
    state.set_allowance(owner, spender, amount);

    EventKind::Approval {
        owner: owner.clone(),
        spender: spender.clone(),
        amount,
    }
}

/// Move `amount` from `owner` to `to`, spending the caller's allowance
///
/// The allowance is consulted even when the caller is `owner`: an account
/// spending its own funds through this path must have approved itself.
pub fn transfer_from(
    state: &mut LedgerState,
    caller: &Caller,
    owner: &AccountId,
    to: &AccountId,
    amount: Amount,
) -> Result<EventKind> {
    let spender = caller.account();
    let available = state.allowance(owner, spender);
    let remaining = available
        .checked_sub(amount)
        .ok_or_else(|| Error::InsufficientAllowance {
            owner: owner.clone(),
            spender: spender.clone(),
            available,
            requested: amount,
        })?;

    move_balance(state, owner, to, amount)?;
    state.set_allowance(owner, spender, remaining);

    Ok(EventKind::Transfer {
        from: owner.clone(),
        to: to.clone(),
        amount,
        spender: Some(spender.clone()),
    })
}

/// Destroy `amount` of the caller's balance
pub fn burn(state: &mut LedgerState, caller: &Caller, amount: Amount) -> Result<EventKind> {
    let from = caller.account();
    let balance = debit(state, from, amount)?;
    let supply = state.total_supply().checked_sub(amount).ok_or_else(|| {
        Error::InvariantViolation(format!(
            "burn of {} exceeds total supply {}",
            amount,
            state.total_supply()
        ))
    })?;

    state.set_balance(from, balance);
    state.set_total_supply(supply);

    Ok(EventKind::Burn {
        from: from.clone(),
        amount,
    })
}

/// Balance of `account` after removing `amount`, without writing it
fn debit(state: &LedgerState, account: &AccountId, amount: Amount) -> Result<Amount> {
    let available = state.balance_of(account);
    available
        .checked_sub(amount)
        .ok_or_else(|| Error::InsufficientBalance {
            account: account.clone(),
            available,
            requested: amount,
        })
}

fn move_balance(
    state: &mut LedgerState,
    from: &AccountId,
    to: &AccountId,
    amount: Amount,
) -> Result<()> {
    let from_balance = debit(state, from, amount)?;

    // Self-transfer: validated above, nothing to move.
    if from == to {
        return Ok(());
    }

    let to_balance = state
        .balance_of(to)
        .checked_add(amount)
        .ok_or(Error::Overflow)?;

    state.set_balance(from, from_balance);
    state.set_balance(to, to_balance);
    Ok(())
}

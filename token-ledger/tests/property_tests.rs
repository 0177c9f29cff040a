//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Conservation: transfers never change Σ(balances) or total supply
//! - Atomicity: a rejected operation leaves the state untouched
//! - Bounded delegated spend: allowances only shrink by what was moved
//! - Absolute approvals: the last approve wins

use proptest::prelude::*;
use std::sync::Arc;
use token_ledger::{
    actor::Operation,
    engine, AccountId, AllowAll, Amount, Caller, Config, Error, EventKind, Ledger, LedgerState,
};

const ACCOUNTS: [&str; 4] = ["alice", "bob", "carol", "dave"];

/// Strategy for generating account IDs from a small pool so operations collide
fn account_strategy() -> impl Strategy<Value = AccountId> {
    prop::sample::select(ACCOUNTS.to_vec()).prop_map(AccountId::new)
}

/// Strategy for generating amounts, biased towards the funded range
fn amount_strategy() -> impl Strategy<Value = Amount> {
    prop_oneof![
        3 => (0u128..300).prop_map(Amount::new),
        1 => Just(Amount::ZERO),
        1 => Just(Amount::MAX),
    ]
}

/// Caller plus the operation it issues
fn step_strategy() -> impl Strategy<Value = (AccountId, Operation)> {
    let transfer = (account_strategy(), account_strategy(), amount_strategy())
        .prop_map(|(from, to, amount)| (from, Operation::Transfer { to, amount }));
    let approve = (account_strategy(), account_strategy(), amount_strategy())
        .prop_map(|(owner, spender, amount)| (owner, Operation::Approve { spender, amount }));
    let transfer_from = (
        account_strategy(),
        account_strategy(),
        account_strategy(),
        amount_strategy(),
    )
        .prop_map(|(spender, owner, to, amount)| {
            (spender, Operation::TransferFrom { owner, to, amount })
        });

    prop_oneof![transfer, approve, transfer_from]
}

fn apply(
    state: &mut LedgerState,
    caller: &AccountId,
    op: &Operation,
) -> token_ledger::Result<EventKind> {
    let caller = Caller::authenticated(caller.clone());
    match op {
        Operation::Mint { to, amount } => engine::mint(state, &AllowAll, &caller, to, *amount),
        Operation::Transfer { to, amount } => engine::transfer(state, &caller, to, *amount),
        Operation::Approve { spender, amount } => {
            Ok(engine::approve(state, &caller, spender, *amount))
        }
        Operation::TransferFrom { owner, to, amount } => {
            engine::transfer_from(state, &caller, owner, to, *amount)
        }
        Operation::Burn { amount } => engine::burn(state, &caller, *amount),
    }
}

/// Every account starts with 100 units
fn funded_state() -> LedgerState {
    let mut state = LedgerState::new();
    let minter = Caller::authenticated(AccountId::new("minter"));
    for account in ACCOUNTS {
        engine::mint(&mut state, &AllowAll, &minter, &AccountId::new(account), Amount::new(100))
            .unwrap();
    }
    state
}

fn sum_of_balances(state: &LedgerState) -> u128 {
    ACCOUNTS
        .iter()
        .map(|a| state.balance_of(&AccountId::new(*a)).units())
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: transfers and delegated transfers conserve supply
    #[test]
    fn prop_conservation(steps in prop::collection::vec(step_strategy(), 1..60)) {
        let mut state = funded_state();

        for (caller, op) in &steps {
            let _ = apply(&mut state, caller, op);
            prop_assert_eq!(state.total_supply(), Amount::new(400));
            prop_assert_eq!(sum_of_balances(&state), 400);
            prop_assert!(state.check_invariants().is_ok());
        }
    }

    /// Property: a rejected operation changes nothing
    #[test]
    fn prop_rejection_is_atomic(steps in prop::collection::vec(step_strategy(), 1..60)) {
        let mut state = funded_state();

        for (caller, op) in &steps {
            let before = state.clone();
            if apply(&mut state, caller, op).is_err() {
                prop_assert_eq!(&state, &before);
            }
        }
    }

    /// Property: a debit never exceeds the balance it is taken from
    #[test]
    fn prop_no_overdraft(
        from in account_strategy(),
        to in account_strategy(),
        amount in amount_strategy(),
    ) {
        let mut state = funded_state();
        let available = state.balance_of(&from);

        let result = apply(&mut state, &from, &Operation::Transfer { to: to.clone(), amount });
        if amount <= available {
            prop_assert!(result.is_ok());
            if from != to {
                prop_assert_eq!(state.balance_of(&from).units(), available.units() - amount.units());
            }
        } else {
            let is_insufficient = matches!(result, Err(Error::InsufficientBalance { .. }));
            prop_assert!(is_insufficient);
        }
    }

    /// Property: delegated spend is bounded by the allowance and consumes it exactly
    #[test]
    fn prop_allowance_bounds_spend(approved in 0u128..200, requested in 0u128..200) {
        let mut state = funded_state();
        let owner = AccountId::new("alice");
        let spender = AccountId::new("bob");
        let to = AccountId::new("carol");

        apply(&mut state, &owner, &Operation::Approve { spender: spender.clone(), amount: Amount::new(approved) }).unwrap();
        let result = apply(&mut state, &spender, &Operation::TransferFrom {
            owner: owner.clone(),
            to,
            amount: Amount::new(requested),
        });

        if requested > approved {
            let is_allowance = matches!(result, Err(Error::InsufficientAllowance { .. }));
            prop_assert!(is_allowance);
            prop_assert_eq!(state.allowance(&owner, &spender), Amount::new(approved));
        } else if requested > 100 {
            let is_balance = matches!(result, Err(Error::InsufficientBalance { .. }));
            prop_assert!(is_balance);
            prop_assert_eq!(state.allowance(&owner, &spender), Amount::new(approved));
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(state.allowance(&owner, &spender), Amount::new(approved - requested));
        }
    }

    /// Property: approve sets, it does not add
    #[test]
    fn prop_approve_is_absolute(first in amount_strategy(), second in amount_strategy()) {
        let mut state = LedgerState::new();
        let owner = AccountId::new("alice");
        let spender = AccountId::new("bob");

        apply(&mut state, &owner, &Operation::Approve { spender: spender.clone(), amount: first }).unwrap();
        apply(&mut state, &owner, &Operation::Approve { spender: spender.clone(), amount: second }).unwrap();
        prop_assert_eq!(state.allowance(&owner, &spender), second);
    }

    /// Property: snapshot digest depends only on contents
    #[test]
    fn prop_snapshot_roundtrip_preserves_digest(steps in prop::collection::vec(step_strategy(), 0..30)) {
        let mut state = funded_state();
        for (caller, op) in &steps {
            let _ = apply(&mut state, caller, op);
        }

        let snapshot = state.snapshot();
        let restored = LedgerState::restore(snapshot.clone()).unwrap();
        prop_assert_eq!(&restored, &state);
        prop_assert_eq!(restored.snapshot().digest().unwrap(), snapshot.digest().unwrap());
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn id(s: &str) -> AccountId {
        AccountId::new(s)
    }

    fn as_caller(s: &str) -> Caller {
        Caller::authenticated(id(s))
    }

    async fn create_test_ledger() -> Ledger {
        Ledger::with_authority(Config::default(), Arc::new(AllowAll), LedgerState::new())
            .await
            .unwrap()
    }

    /// Mint 100 to A, A sends 5 to B
    async fn scenario_one(ledger: &Ledger) {
        ledger.mint(&as_caller("deployer"), &id("A"), Amount::new(100)).await.unwrap();
        assert_eq!(ledger.balance_of(&id("A")).await.unwrap(), Amount::new(100));
        assert_eq!(ledger.total_supply().await.unwrap(), Amount::new(100));

        ledger.transfer(&as_caller("A"), &id("B"), Amount::new(5)).await.unwrap();
        assert_eq!(ledger.balance_of(&id("A")).await.unwrap(), Amount::new(95));
        assert_eq!(ledger.balance_of(&id("B")).await.unwrap(), Amount::new(5));
    }

    #[tokio::test]
    async fn test_mint_and_transfer() {
        let ledger = create_test_ledger().await;
        scenario_one(&ledger).await;
        ledger.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_transfer_more_than_balance() {
        let ledger = create_test_ledger().await;
        scenario_one(&ledger).await;

        let err = ledger
            .transfer(&as_caller("A"), &id("B"), Amount::new(500))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientBalance { .. }));
        assert_eq!(ledger.balance_of(&id("A")).await.unwrap(), Amount::new(95));
        assert_eq!(ledger.balance_of(&id("B")).await.unwrap(), Amount::new(5));

        ledger.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_delegated_transfer_consumes_allowance() {
        let ledger = create_test_ledger().await;
        scenario_one(&ledger).await;

        ledger.approve(&as_caller("A"), &id("C"), Amount::new(5)).await.unwrap();
        assert_eq!(ledger.allowance(&id("A"), &id("C")).await.unwrap(), Amount::new(5));

        ledger
            .transfer_from(&as_caller("C"), &id("A"), &id("D"), Amount::new(5))
            .await
            .unwrap();
        assert_eq!(ledger.allowance(&id("A"), &id("C")).await.unwrap(), Amount::ZERO);
        assert_eq!(ledger.balance_of(&id("A")).await.unwrap(), Amount::new(90));
        assert_eq!(ledger.balance_of(&id("D")).await.unwrap(), Amount::new(5));

        // Repeating fails: the allowance is spent.
        let before = ledger.snapshot().await.unwrap();
        let err = ledger
            .transfer_from(&as_caller("C"), &id("A"), &id("D"), Amount::new(5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientAllowance { .. }));
        assert_eq!(ledger.snapshot().await.unwrap(), before);

        ledger.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_over_allowance_fails_even_with_balance() {
        let ledger = create_test_ledger().await;
        scenario_one(&ledger).await;

        ledger.approve(&as_caller("A"), &id("C"), Amount::new(5)).await.unwrap();
        let err = ledger
            .transfer_from(&as_caller("C"), &id("A"), &id("D"), Amount::new(6))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientAllowance {
                owner: id("A"),
                spender: id("C"),
                available: Amount::new(5),
                requested: Amount::new(6),
            }
        );
        assert_eq!(ledger.balance_of(&id("A")).await.unwrap(), Amount::new(95));

        ledger.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_mint_overflow_boundary() {
        let ledger = create_test_ledger().await;
        let deployer = as_caller("deployer");

        ledger.mint(&deployer, &id("A"), Amount::new(u128::MAX - 10)).await.unwrap();
        ledger.mint(&deployer, &id("B"), Amount::new(10)).await.unwrap();
        assert_eq!(ledger.total_supply().await.unwrap(), Amount::MAX);

        let err = ledger.mint(&deployer, &id("C"), Amount::new(1)).await.unwrap_err();
        assert_eq!(err, Error::Overflow);
        assert_eq!(ledger.total_supply().await.unwrap(), Amount::MAX);
        assert_eq!(ledger.balance_of(&id("C")).await.unwrap(), Amount::ZERO);

        ledger.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_self_transfer_keeps_balance() {
        let ledger = create_test_ledger().await;
        ledger.mint(&as_caller("deployer"), &id("A"), Amount::new(7)).await.unwrap();

        ledger.transfer(&as_caller("A"), &id("A"), Amount::new(7)).await.unwrap();
        assert_eq!(ledger.balance_of(&id("A")).await.unwrap(), Amount::new(7));

        ledger.shutdown().await.unwrap();
    }

    /// Deployer-driven flow with ether-style units
    #[tokio::test]
    async fn test_full_token_lifecycle() {
        let mut config = Config::default();
        config.minters.push(id("signer0"));
        let ledger = Ledger::open(config).await.unwrap();
        let decimals = ledger.metadata().decimals;
        let ether = |n: u128| Amount::from_whole(n, decimals).unwrap();

        let signer0 = as_caller("signer0");
        let signer1 = as_caller("signer1");
        ledger.mint(&signer0, &id("signer0"), ether(100)).await.unwrap();

        ledger.transfer(&signer0, &id("signer1"), ether(5)).await.unwrap();
        assert_eq!(ledger.balance_of(&id("signer0")).await.unwrap(), ether(95));
        assert_eq!(
            ledger.balance_of(&id("signer0")).await.unwrap().display_units(decimals),
            "95.0"
        );

        ledger.approve(&signer0, &id("signer1"), ether(5)).await.unwrap();
        ledger
            .transfer_from(&signer1, &id("signer0"), &id("signer2"), ether(5))
            .await
            .unwrap();
        assert_eq!(ledger.balance_of(&id("signer0")).await.unwrap(), ether(90));
        assert_eq!(ledger.balance_of(&id("signer2")).await.unwrap(), ether(5));

        // Allowance is exhausted, so it is reported before the balance.
        let err = ledger
            .transfer_from(&signer1, &id("signer0"), &id("signer2"), ether(95))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientAllowance { .. }));

        // Self-delegated spend needs a self-approval.
        let err = ledger
            .transfer_from(&signer0, &id("signer0"), &id("signer3"), ether(5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientAllowance { .. }));

        ledger.approve(&signer0, &id("signer0"), ether(5)).await.unwrap();
        ledger
            .transfer_from(&signer0, &id("signer0"), &id("signer3"), ether(5))
            .await
            .unwrap();
        assert_eq!(ledger.balance_of(&id("signer0")).await.unwrap(), ether(85));
        assert_eq!(ledger.total_supply().await.unwrap(), ether(100));

        ledger.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_burn_reduces_supply_symmetrically() {
        let ledger = create_test_ledger().await;
        ledger.mint(&as_caller("deployer"), &id("A"), Amount::new(10)).await.unwrap();

        let event = ledger.burn(&as_caller("A"), Amount::new(4)).await.unwrap();
        assert_eq!(event.kind, EventKind::Burn { from: id("A"), amount: Amount::new(4) });
        assert_eq!(ledger.balance_of(&id("A")).await.unwrap(), Amount::new(6));
        assert_eq!(ledger.total_supply().await.unwrap(), Amount::new(6));

        ledger.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_events_follow_total_order() {
        let ledger = create_test_ledger().await;
        let mut events = ledger.subscribe();

        ledger.mint(&as_caller("deployer"), &id("A"), Amount::new(10)).await.unwrap();
        let _ = ledger.transfer(&as_caller("A"), &id("B"), Amount::new(50)).await;
        ledger.transfer(&as_caller("A"), &id("B"), Amount::new(3)).await.unwrap();

        let first = events.recv().await.unwrap();
        let second = events.recv().await.unwrap();
        assert_eq!(first.kind.label(), "mint");
        assert_eq!(second.kind.label(), "transfer");
        assert_eq!(second.sequence, first.sequence + 1);

        ledger.shutdown().await.unwrap();
    }
}

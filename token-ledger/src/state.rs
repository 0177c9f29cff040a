//! Ledger state: balances, allowances and total supply
//!
//! Absent map entries read as zero. Zero entries are pruned on write, so an
//! account that drains its balance is indistinguishable from one never seen.
//!
//! # Invariants
//!
//! - Conservation: Σ(balances) == total_supply
//! - Every balance ≤ total_supply
//! - Allowances are independent of balances

use crate::{
    types::{AccountId, Amount},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Authoritative balances, allowances and aggregate supply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerState {
    balances: HashMap<AccountId, Amount>,
    allowances: HashMap<(AccountId, AccountId), Amount>,
    total_supply: Amount,
}

impl LedgerState {
    /// Empty ledger with zero supply
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `account`, zero if never credited
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Remaining amount `spender` may move out of `owner`'s balance
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        // Tuple keys need owned values for lookup.
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or_default()
    }

    /// Sum of all balances
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Number of accounts holding a non-zero balance
    pub fn holders(&self) -> usize {
        self.balances.len()
    }

    pub(crate) fn set_balance(&mut self, account: &AccountId, amount: Amount) {
        if amount.is_zero() {
            self.balances.remove(account);
        } else {
            self.balances.insert(account.clone(), amount);
        }
    }

    pub(crate) fn set_allowance(&mut self, owner: &AccountId, spender: &AccountId, amount: Amount) {
        let key = (owner.clone(), spender.clone());
        if amount.is_zero() {
            self.allowances.remove(&key);
        } else {
            self.allowances.insert(key, amount);
        }
    }

    pub(crate) fn set_total_supply(&mut self, amount: Amount) {
        self.total_supply = amount;
    }

    /// Recompute Σ(balances) and compare against total supply
    pub fn check_invariants(&self) -> Result<()> {
        let mut sum = Amount::ZERO;
        for (account, balance) in &self.balances {
            if *balance > self.total_supply {
                return Err(Error::InvariantViolation(format!(
                    "balance of {} ({}) exceeds total supply ({})",
                    account, balance, self.total_supply
                )));
            }
            sum = sum.checked_add(*balance).ok_or_else(|| {
                Error::InvariantViolation("sum of balances overflows".to_string())
            })?;
        }

        if sum != self.total_supply {
            return Err(Error::InvariantViolation(format!(
                "sum of balances ({}) != total supply ({})",
                sum, self.total_supply
            )));
        }

        Ok(())
    }

    /// Canonical, sorted copy of the state
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut balances: Vec<(AccountId, Amount)> = self
            .balances
            .iter()
            .map(|(account, amount)| (account.clone(), *amount))
            .collect();
        balances.sort();

        let mut allowances: Vec<AllowanceEntry> = self
            .allowances
            .iter()
            .map(|((owner, spender), amount)| AllowanceEntry {
                owner: owner.clone(),
                spender: spender.clone(),
                amount: *amount,
            })
            .collect();
        allowances.sort();

        LedgerSnapshot {
            balances,
            allowances,
            total_supply: self.total_supply,
        }
    }

    /// Rebuild state from a snapshot
    ///
    /// Only canonical snapshots are accepted: sorted, no duplicate keys, no
    /// zero entries, and conserving supply.
    pub fn restore(snapshot: LedgerSnapshot) -> Result<Self> {
        let mut state = LedgerState::new();
        for (account, amount) in &snapshot.balances {
            state.set_balance(account, *amount);
        }
        for entry in &snapshot.allowances {
            state.set_allowance(&entry.owner, &entry.spender, entry.amount);
        }
        state.total_supply = snapshot.total_supply;

        state.check_invariants()?;

        if state.snapshot() != snapshot {
            return Err(Error::InvariantViolation(
                "snapshot is not canonical (unsorted, duplicate or zero entries)".to_string(),
            ));
        }

        Ok(state)
    }
}

/// One (owner, spender) allowance
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AllowanceEntry {
    /// Owner of the funds
    pub owner: AccountId,
    /// Spender
    pub spender: AccountId,
    /// Remaining allowance
    pub amount: Amount,
}

/// Serializable ledger contents, sorted for deterministic encoding
///
/// This is the handoff format for an external key-value store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Non-zero balances, sorted by account
    pub balances: Vec<(AccountId, Amount)>,
    /// Non-zero allowances, sorted by (owner, spender)
    pub allowances: Vec<AllowanceEntry>,
    /// Total supply
    pub total_supply: Amount,
}

impl LedgerSnapshot {
    /// Encode with bincode
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from bincode
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Encode as JSON for stores that want readable values
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// SHA-256 commitment over the canonical encoding
    pub fn digest(&self) -> Result<[u8; 32]> {
        let bytes = self.to_bytes()?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hasher.finalize().into())
    }
}

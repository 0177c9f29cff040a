//! Caller identity and mint authorization
//!
//! Authentication happens outside the ledger. The boundary layer wraps the
//! identity it verified in a [`Caller`] and hands it to every operation; the
//! ledger never infers identity on its own.

use crate::types::AccountId;
use std::collections::HashSet;
use std::fmt;

/// Identity already authenticated by the boundary layer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Caller(AccountId);

impl Caller {
    /// Wrap an identity the boundary layer has verified
    pub fn authenticated(account: AccountId) -> Self {
        Self(account)
    }

    /// The account acting
    pub fn account(&self) -> &AccountId {
        &self.0
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decides whether a caller may mint
pub trait MintAuthority: Send + Sync {
    /// `true` if `caller` may create new supply
    fn can_mint(&self, caller: &AccountId) -> bool;
}

/// Explicit allow-list of minters
#[derive(Debug, Clone, Default)]
pub struct MinterSet {
    minters: HashSet<AccountId>,
}

impl MinterSet {
    /// Set containing only the deploying account
    pub fn with_owner(owner: AccountId) -> Self {
        let mut minters = HashSet::new();
        minters.insert(owner);
        Self { minters }
    }

    /// Grant mint rights
    pub fn grant(&mut self, account: AccountId) {
        self.minters.insert(account);
    }

    /// Revoke mint rights
    pub fn revoke(&mut self, account: &AccountId) -> bool {
        self.minters.remove(account)
    }

    /// Number of minters
    pub fn len(&self) -> usize {
        self.minters.len()
    }

    /// No minters at all
    pub fn is_empty(&self) -> bool {
        self.minters.is_empty()
    }
}

impl FromIterator<AccountId> for MinterSet {
    fn from_iter<I: IntoIterator<Item = AccountId>>(iter: I) -> Self {
        Self {
            minters: iter.into_iter().collect(),
        }
    }
}

impl MintAuthority for MinterSet {
    fn can_mint(&self, caller: &AccountId) -> bool {
        self.minters.contains(caller)
    }
}

/// Permissionless minting (development and tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl MintAuthority for AllowAll {
    fn can_mint(&self, _caller: &AccountId) -> bool {
        true
    }
}

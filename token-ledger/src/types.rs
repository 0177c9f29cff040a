//! Core types for the ledger
//!
//! All types are designed for:
//! - Deterministic serialization (bincode)
//! - Exact unsigned arithmetic with explicit overflow checks
//! - Cheap cloning of identifiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Account identifier (address, public key hash, etc.)
///
/// Opaque to the ledger: two identifiers are the same account iff they compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create new account ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Quantity of the smallest token unit
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    /// Zero units
    pub const ZERO: Amount = Amount(0);

    /// Largest representable amount
    pub const MAX: Amount = Amount(u128::MAX);

    /// Create from raw units
    pub const fn new(units: u128) -> Self {
        Self(units)
    }

    /// Create from whole tokens scaled by `decimals` (e.g. 100 tokens at 18 decimals)
    pub fn from_whole(whole: u128, decimals: u8) -> Option<Self> {
        10u128
            .checked_pow(u32::from(decimals))
            .and_then(|scale| whole.checked_mul(scale))
            .map(Self)
    }

    /// Raw units
    pub const fn units(&self) -> u128 {
        self.0
    }

    /// Is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition, `None` on overflow
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Checked subtraction, `None` if `rhs > self`
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Render as a fixed-point string with `decimals` fractional digits,
    /// trailing zeros trimmed (`95000000000000000000` at 18 decimals is `95.0`)
    pub fn display_units(&self, decimals: u8) -> String {
        let digits = self.0.to_string();
        let decimals = usize::from(decimals);
        if decimals == 0 {
            return digits;
        }

        let padded = format!("{:0>width$}", digits, width = decimals + 1);
        let (whole, fraction) = padded.split_at(padded.len() - decimals);
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            format!("{}.0", whole)
        } else {
            format!("{}.{}", whole, fraction)
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Self(units)
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self(u128::from(units))
    }
}

/// Human-readable token metadata. Stored, never interpreted by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Token name
    pub name: String,

    /// Ticker symbol
    pub symbol: String,

    /// Fractional digits used for display
    pub decimals: u8,
}

impl Default for TokenMetadata {
    fn default() -> Self {
        Self {
            name: "token".to_string(),
            symbol: "TKN".to_string(),
            decimals: 18,
        }
    }
}

/// What a successful operation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// New supply credited to `to`
    Mint {
        /// Recipient
        to: AccountId,
        /// Minted amount
        amount: Amount,
    },

    /// Supply destroyed from `from`
    Burn {
        /// Account debited
        from: AccountId,
        /// Burned amount
        amount: Amount,
    },

    /// Balance moved between accounts
    Transfer {
        /// Account debited
        from: AccountId,
        /// Account credited
        to: AccountId,
        /// Moved amount (may be zero)
        amount: Amount,
        /// Set when the move consumed an allowance
        spender: Option<AccountId>,
    },

    /// Allowance set (absolute)
    Approval {
        /// Owner of the funds
        owner: AccountId,
        /// Spender allowed to move them
        spender: AccountId,
        /// New allowance
        amount: Amount,
    },
}

impl EventKind {
    /// Operation label (`mint`, `burn`, `transfer`, `transfer_from`, `approve`)
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Mint { .. } => "mint",
            EventKind::Burn { .. } => "burn",
            EventKind::Transfer { spender: None, .. } => "transfer",
            EventKind::Transfer { spender: Some(_), .. } => "transfer_from",
            EventKind::Approval { .. } => "approve",
        }
    }
}

/// Event emitted for every successful state transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Unique event ID (UUIDv7 for time-ordering)
    pub event_id: Uuid,

    /// Position in the ledger's total order of applied operations
    pub sequence: u64,

    /// Time the transition was applied
    pub applied_at: DateTime<Utc>,

    /// The transition itself
    pub kind: EventKind,
}

impl LedgerEvent {
    /// Stamp a transition with identity and ordering
    pub fn new(sequence: u64, kind: EventKind) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            sequence,
            applied_at: Utc::now(),
            kind,
        }
    }
}

//! Token Ledger
//!
//! Fungible-token accounting core: balances, allowances and total supply,
//! mutated only through atomic check-then-apply transitions.
//!
//! # Architecture
//!
//! - **State**: balances, allowances and supply with implicit zeros
//! - **Engine**: `mint`, `transfer`, `approve`, `transfer_from`, `burn`
//! - **Single Writer**: one actor task owns the state and serializes operations
//! - **Events**: every successful transition is broadcast to subscribers
//!
//! # Invariants
//!
//! - Conservation: Σ(balances) == total_supply at every observable state
//! - No negative balances: debits are guarded by the balance precondition
//! - Bounded delegated spend: transfer_from never exceeds the allowance
//! - Linearizable: total ordering of all operations

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    clippy::all
)]

pub mod types;
pub mod state;
pub mod engine;
pub mod auth;
pub mod error;
pub mod actor;
pub mod ledger;
pub mod config;
pub mod metrics;

// Re-exports
pub use auth::{AllowAll, Caller, MintAuthority, MinterSet};
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use state::{LedgerSnapshot, LedgerState};
pub use types::{AccountId, Amount, EventKind, LedgerEvent, TokenMetadata};

//! Main ledger interface
//!
//! Ties the state, engine and actor together behind an async API. Every
//! state-changing call takes the [`Caller`] the boundary layer authenticated.
//!
//! # Example
//!
//! ```no_run
//! use token_ledger::{AccountId, Amount, Caller, Config, Ledger};
//!
//! #[tokio::main]
//! async fn main() -> token_ledger::Result<()> {
//!     let deployer = AccountId::new("deployer");
//!     let mut config = Config::default();
//!     config.minters.push(deployer.clone());
//!
//!     let ledger = Ledger::open(config).await?;
//!     let caller = Caller::authenticated(deployer.clone());
//!     ledger.mint(&caller, &deployer, Amount::new(100)).await?;
//!     ledger.transfer(&caller, &AccountId::new("bob"), Amount::new(5)).await?;
//!
//!     ledger.shutdown().await
//! }
//! ```

use crate::{
    actor::{spawn_ledger_actor, LedgerHandle, Operation, Query},
    auth::{Caller, MintAuthority},
    metrics::Metrics,
    state::{LedgerSnapshot, LedgerState},
    types::{AccountId, Amount, LedgerEvent, TokenMetadata},
    Config, Error, Result,
};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Main ledger interface
pub struct Ledger {
    /// Actor handle
    handle: LedgerHandle,

    /// Token metadata
    metadata: TokenMetadata,

    /// Metrics
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl Ledger {
    /// Open an empty ledger; mint rights come from `config.minters`
    pub async fn open(config: Config) -> Result<Self> {
        let authority = Arc::new(config.minter_set());
        Self::with_authority(config, authority, LedgerState::new()).await
    }

    /// Open over existing state with a custom mint authority
    pub async fn with_authority(
        config: Config,
        authority: Arc<dyn MintAuthority>,
        state: LedgerState,
    ) -> Result<Self> {
        config.validate()?;
        state.check_invariants()?;

        let metrics = Metrics::new()
            .map_err(|e| Error::Config(format!("Failed to register metrics: {}", e)))?;

        let handle = spawn_ledger_actor(
            state,
            authority,
            metrics.clone(),
            config.actor.mailbox_capacity,
            config.actor.event_buffer,
        );

        tracing::info!(
            token = %config.token.symbol,
            service = %config.service_name,
            "Ledger opened"
        );

        Ok(Self {
            handle,
            metadata: config.token.clone(),
            metrics,
            config,
        })
    }

    /// Restore from a snapshot taken earlier
    pub async fn restore(
        config: Config,
        authority: Arc<dyn MintAuthority>,
        snapshot: LedgerSnapshot,
    ) -> Result<Self> {
        let state = LedgerState::restore(snapshot)?;
        Self::with_authority(config, authority, state).await
    }

    /// Create `amount` new units for `to`
    pub async fn mint(
        &self,
        caller: &Caller,
        to: &AccountId,
        amount: Amount,
    ) -> Result<LedgerEvent> {
        self.execute(
            caller,
            Operation::Mint {
                to: to.clone(),
                amount,
            },
        )
        .await
    }

    /// Move `amount` from the caller to `to`
    pub async fn transfer(
        &self,
        caller: &Caller,
        to: &AccountId,
        amount: Amount,
    ) -> Result<LedgerEvent> {
        self.execute(
            caller,
            Operation::Transfer {
                to: to.clone(),
                amount,
            },
        )
        .await
    }

    /// Set the caller's allowance for `spender` to `amount` (overwrites)
    pub async fn approve(
        &self,
        caller: &Caller,
        spender: &AccountId,
        amount: Amount,
    ) -> Result<LedgerEvent> {
        self.execute(
            caller,
            Operation::Approve {
                spender: spender.clone(),
                amount,
            },
        )
        .await
    }

    /// Move `amount` from `owner` to `to`, spending the caller's allowance
    pub async fn transfer_from(
        &self,
        caller: &Caller,
        owner: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<LedgerEvent> {
        self.execute(
            caller,
            Operation::TransferFrom {
                owner: owner.clone(),
                to: to.clone(),
                amount,
            },
        )
        .await
    }

    /// Destroy `amount` of the caller's balance
    pub async fn burn(&self, caller: &Caller, amount: Amount) -> Result<LedgerEvent> {
        self.execute(caller, Operation::Burn { amount }).await
    }

    /// Balance of `account`
    pub async fn balance_of(&self, account: &AccountId) -> Result<Amount> {
        self.handle.query(Query::BalanceOf(account.clone())).await
    }

    /// Remaining allowance from `owner` to `spender`
    pub async fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Result<Amount> {
        self.handle
            .query(Query::Allowance {
                owner: owner.clone(),
                spender: spender.clone(),
            })
            .await
    }

    /// Total supply
    pub async fn total_supply(&self) -> Result<Amount> {
        self.handle.query(Query::TotalSupply).await
    }

    /// Copy of the full state, consistent at a single point in the total order
    pub async fn snapshot(&self) -> Result<LedgerSnapshot> {
        self.handle.snapshot().await
    }

    /// Receive every event applied after this call
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.handle.subscribe()
    }

    /// Token metadata
    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Configuration the ledger was opened with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Cloneable handle for sharing across tasks
    pub fn handle(&self) -> LedgerHandle {
        self.handle.clone()
    }

    /// Shutdown ledger
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await
    }

    async fn execute(&self, caller: &Caller, operation: Operation) -> Result<LedgerEvent> {
        self.handle.execute(caller.clone(), operation).await
    }
}

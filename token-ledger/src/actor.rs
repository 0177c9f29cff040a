//! Actor-based concurrency for the ledger
//!
//! This module implements the single-writer pattern using Tokio actors:
//! - One task owns the [`LedgerState`]; no locks around balances
//! - Operations are applied in mailbox order, which is the ledger's total order
//! - Bounded mailbox gives backpressure to callers
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │            Boundary layer (authenticated)             │
//! │          Many concurrent callers / tasks              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               LedgerHandle (Clone)                    │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              LedgerActor (Single Task)                │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │ LedgerState: balances, allowances, supply      │  │
//! │  │ engine::{mint, transfer, approve, ...}         │  │
//! │  └────────────────────────────────────────────────┘  │
//! │                       │                               │
//! │                       ▼                               │
//! │        broadcast::Sender<LedgerEvent>                 │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! A dequeued operation always runs to completion. If the caller has dropped
//! its reply receiver the result is discarded, but the transition itself is
//! never left half-applied.

use crate::{
    auth::{Caller, MintAuthority},
    engine,
    metrics::Metrics,
    state::{LedgerSnapshot, LedgerState},
    types::{AccountId, Amount, LedgerEvent},
    Error, Result,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc, oneshot};

/// State-changing operation, always performed on behalf of a [`Caller`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create supply for `to` (caller must hold mint authority)
    Mint {
        /// Recipient
        to: AccountId,
        /// Amount
        amount: Amount,
    },

    /// Move caller's funds to `to`
    Transfer {
        /// Recipient
        to: AccountId,
        /// Amount
        amount: Amount,
    },

    /// Set caller's allowance for `spender`
    Approve {
        /// Spender
        spender: AccountId,
        /// New allowance
        amount: Amount,
    },

    /// Move `owner`'s funds to `to` using the caller's allowance
    TransferFrom {
        /// Owner of the funds
        owner: AccountId,
        /// Recipient
        to: AccountId,
        /// Amount
        amount: Amount,
    },

    /// Destroy caller's funds
    Burn {
        /// Amount
        amount: Amount,
    },
}

impl Operation {
    /// Label used in logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Mint { .. } => "mint",
            Operation::Transfer { .. } => "transfer",
            Operation::Approve { .. } => "approve",
            Operation::TransferFrom { .. } => "transfer_from",
            Operation::Burn { .. } => "burn",
        }
    }
}

/// Read-only query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Balance of an account
    BalanceOf(AccountId),
    /// Allowance from owner to spender
    Allowance {
        /// Owner
        owner: AccountId,
        /// Spender
        spender: AccountId,
    },
    /// Total supply
    TotalSupply,
}

/// Message sent to the ledger actor
pub enum LedgerMessage {
    /// Apply an operation
    Execute {
        /// Authenticated caller
        caller: Caller,
        /// Operation to apply
        operation: Operation,
        /// Reply channel
        response: oneshot::Sender<Result<LedgerEvent>>,
    },

    /// Answer a query
    Query {
        /// Query to answer
        query: Query,
        /// Reply channel
        response: oneshot::Sender<Amount>,
    },

    /// Copy the full state
    Snapshot {
        /// Reply channel
        response: oneshot::Sender<LedgerSnapshot>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that owns the ledger state
pub struct LedgerActor {
    /// Ledger contents
    state: LedgerState,

    /// Mint authorization decision
    authority: Arc<dyn MintAuthority>,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,

    /// Event fan-out
    events: broadcast::Sender<LedgerEvent>,

    /// Metrics
    metrics: Metrics,

    /// Sequence number of the last applied operation
    sequence: u64,
}

impl LedgerActor {
    /// Create new actor
    pub fn new(
        state: LedgerState,
        authority: Arc<dyn MintAuthority>,
        mailbox: mpsc::Receiver<LedgerMessage>,
        events: broadcast::Sender<LedgerEvent>,
        metrics: Metrics,
    ) -> Self {
        Self {
            state,
            authority,
            mailbox,
            events,
            metrics,
            sequence: 0,
        }
    }

    /// Run the actor event loop until shutdown or every handle is dropped
    pub async fn run(mut self) {
        tracing::info!(holders = self.state.holders(), "Ledger actor started");

        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                LedgerMessage::Execute {
                    caller,
                    operation,
                    response,
                } => {
                    let result = self.apply(&caller, operation);
                    let _ = response.send(result);
                }

                LedgerMessage::Query { query, response } => {
                    let _ = response.send(self.answer(&query));
                }

                LedgerMessage::Snapshot { response } => {
                    let _ = response.send(self.state.snapshot());
                }

                LedgerMessage::Shutdown => break,
            }
        }

        tracing::info!(sequence = self.sequence, "Ledger actor stopped");
    }

    /// Apply one operation to the state
    fn apply(&mut self, caller: &Caller, operation: Operation) -> Result<LedgerEvent> {
        let op = operation.label();
        let started = Instant::now();

        let result = match operation {
            Operation::Mint { to, amount } => {
                engine::mint(&mut self.state, self.authority.as_ref(), caller, &to, amount)
            }
            Operation::Transfer { to, amount } => {
                engine::transfer(&mut self.state, caller, &to, amount)
            }
            Operation::Approve { spender, amount } => {
                Ok(engine::approve(&mut self.state, caller, &spender, amount))
            }
            Operation::TransferFrom { owner, to, amount } => {
                engine::transfer_from(&mut self.state, caller, &owner, &to, amount)
            }
            Operation::Burn { amount } => engine::burn(&mut self.state, caller, amount),
        };

        match result {
            Ok(kind) => {
                debug_assert!(self.state.check_invariants().is_ok());

                self.sequence += 1;
                let event = LedgerEvent::new(self.sequence, kind);
                tracing::debug!(
                    op,
                    caller = %caller,
                    sequence = event.sequence,
                    "Applied operation"
                );

                self.metrics
                    .record_success(op, started.elapsed().as_secs_f64());
                self.metrics.set_holders(self.state.holders());

                // No subscribers is not an error.
                let _ = self.events.send(event.clone());
                Ok(event)
            }
            Err(err) => {
                tracing::warn!(op, caller = %caller, error = %err, "Rejected operation");
                self.metrics.record_rejection(op, err.reason());
                Err(err)
            }
        }
    }

    fn answer(&self, query: &Query) -> Amount {
        match query {
            Query::BalanceOf(account) => self.state.balance_of(account),
            Query::Allowance { owner, spender } => self.state.allowance(owner, spender),
            Query::TotalSupply => self.state.total_supply(),
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
    events: broadcast::Sender<LedgerEvent>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(
        sender: mpsc::Sender<LedgerMessage>,
        events: broadcast::Sender<LedgerEvent>,
    ) -> Self {
        Self { sender, events }
    }

    /// Apply an operation on behalf of `caller`
    pub async fn execute(&self, caller: Caller, operation: Operation) -> Result<LedgerEvent> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerMessage::Execute {
            caller,
            operation,
            response: tx,
        })
        .await?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Answer a read-only query
    pub async fn query(&self, query: Query) -> Result<Amount> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerMessage::Query {
            query,
            response: tx,
        })
        .await?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Copy the full state
    pub async fn snapshot(&self) -> Result<LedgerSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(LedgerMessage::Snapshot { response: tx }).await?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Receive every event applied after this call
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.send(LedgerMessage::Shutdown).await
    }

    async fn send(&self, msg: LedgerMessage) -> Result<()> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))
    }
}

/// Spawn the ledger actor over `state`
pub fn spawn_ledger_actor(
    state: LedgerState,
    authority: Arc<dyn MintAuthority>,
    metrics: Metrics,
    mailbox_capacity: usize,
    event_buffer: usize,
) -> LedgerHandle {
    let (tx, rx) = mpsc::channel(mailbox_capacity); // Bounded channel for backpressure
    let (events, _) = broadcast::channel(event_buffer);
    let actor = LedgerActor::new(state, authority, rx, events.clone(), metrics);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx, events)
}

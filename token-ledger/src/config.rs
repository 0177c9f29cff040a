//! Configuration for the ledger

use crate::{auth::MinterSet, types::{AccountId, TokenMetadata}};
use serde::{Deserialize, Serialize};

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Log output format
    pub log_format: LogFormat,

    /// Token metadata
    pub token: TokenMetadata,

    /// Actor configuration
    pub actor: ActorConfig,

    /// Accounts allowed to mint
    pub minters: Vec<AccountId>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "token-ledger".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_format: LogFormat::Text,
            token: TokenMetadata::default(),
            actor: ActorConfig::default(),
            minters: Vec::new(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

/// Actor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActorConfig {
    /// Mailbox capacity (pending operations before callers wait)
    pub mailbox_capacity: usize,

    /// Events retained for slow subscribers
    pub event_buffer: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 1000,
            event_buffer: 1024,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(capacity) = std::env::var("TOKEN_LEDGER_MAILBOX_CAPACITY") {
            config.actor.mailbox_capacity = capacity.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid TOKEN_LEDGER_MAILBOX_CAPACITY: {}", e))
            })?;
        }

        if let Ok(minters) = std::env::var("TOKEN_LEDGER_MINTERS") {
            config.minters = parse_minters(&minters);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the actor cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.actor.mailbox_capacity == 0 {
            return Err(crate::Error::Config(
                "actor.mailbox_capacity must be positive".to_string(),
            ));
        }
        if self.actor.event_buffer == 0 {
            return Err(crate::Error::Config(
                "actor.event_buffer must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Mint authority seeded from `minters`
    pub fn minter_set(&self) -> MinterSet {
        self.minters.iter().cloned().collect()
    }
}

fn parse_minters(raw: &str) -> Vec<AccountId> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(AccountId::new)
        .collect()
}

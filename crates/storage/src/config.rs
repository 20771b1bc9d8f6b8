//! Store configuration
//!
//! Loaded from the `[store]` section of `persist.toml`.

use persist_core::Codec;
use serde::{Deserialize, Serialize};

/// Default commit attempts for optimistic transactions
pub const DEFAULT_TRANSACTION_ATTEMPTS: u32 = 3;

/// Configuration for `MemoryStore`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Record encoding: `"message_pack"` (default) or `"json"`
    #[serde(default)]
    pub codec: Codec,
    /// Commit attempts before a contended transaction fails
    #[serde(default = "default_transaction_attempts")]
    pub transaction_attempts: u32,
}

fn default_transaction_attempts() -> u32 {
    DEFAULT_TRANSACTION_ATTEMPTS
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            codec: Codec::default(),
            transaction_attempts: DEFAULT_TRANSACTION_ATTEMPTS,
        }
    }
}

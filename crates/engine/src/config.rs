//! Engine configuration
//!
//! Loaded from the `[engine]` section of `persist.toml`.

use persist_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::derive::KeyPolicy;

/// Page size used when a request names none
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page a request may ask for
pub const MAX_PAGE_SIZE: usize = 1000;

/// Engine settings
///
/// # Example
///
/// ```toml
/// [engine]
/// key_policy = "first_provider"
/// default_page_size = 10
/// max_page_size = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Key policy: `"first_provider"` (default) or `"first_field"`
    #[serde(default = "default_key_policy_str")]
    pub key_policy: String,
    /// Page size when a request does not set a limit
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    /// Upper bound for requested page sizes
    #[serde(default = "max_page_size")]
    pub max_page_size: usize,
}

fn default_key_policy_str() -> String {
    KeyPolicy::default().as_str().to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn max_page_size() -> usize {
    MAX_PAGE_SIZE
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            key_policy: default_key_policy_str(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl EngineConfig {
    /// Parse the key policy string
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if it is not `"first_provider"` or `"first_field"`.
    pub fn key_policy(&self) -> Result<KeyPolicy> {
        self.key_policy.parse()
    }

    /// Check every setting
    pub fn validate(&self) -> Result<()> {
        self.key_policy()?;
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(Error::invalid_argument("page sizes must be positive"));
        }
        if self.default_page_size > self.max_page_size {
            return Err(Error::invalid_argument(format!(
                "default_page_size {} exceeds max_page_size {}",
                self.default_page_size, self.max_page_size
            )));
        }
        Ok(())
    }
}

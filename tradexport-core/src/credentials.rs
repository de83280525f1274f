//! API credentials handed to importers for each remote call.

use std::fmt;

/// KuCoin-style API key triple. Secrets never appear in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub api_passphrase: String,
}

impl Credentials {
    /// Surrounding whitespace from copy/paste is dropped.
    pub fn new(
        api_key: impl AsRef<str>,
        api_secret: impl AsRef<str>,
        api_passphrase: impl AsRef<str>,
    ) -> Self {
        Self {
            api_key: api_key.as_ref().trim().to_string(),
            api_secret: api_secret.as_ref().trim().to_string(),
            api_passphrase: api_passphrase.as_ref().trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.api_key.is_empty() && self.api_secret.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("api_passphrase", &"<redacted>")
            .finish()
    }
}

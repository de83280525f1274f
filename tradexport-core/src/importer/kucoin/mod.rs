//! KuCoin spot trade importer.

pub mod importer;
pub mod payload;
pub mod signer;
pub mod transport;

pub use importer::KuCoinImporter;
pub use transport::{HttpTransport, KuCoinTransport};

use serde::{Deserialize, Serialize};

pub const SYMBOLS_PATH: &str = "/api/v1/symbols";
pub const FILLS_PATH: &str = "/api/v1/fills";

/// Tunables for the KuCoin importer. Every field has a working default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KuCoinOptions {
    pub base_url: String,
    /// Fills per page (the API caps this at 500).
    pub page_size: u32,
    /// Longest time span one fills query may cover.
    pub max_span_days: i64,
    /// How far back an open-ended window reaches.
    pub lookback_days: i64,
    pub timeout_secs: u64,
}

/// Largest span the fills endpoint accepts per query.
pub const MAX_SPAN_DAYS: i64 = 7;
/// Largest page the fills endpoint serves.
pub const MAX_PAGE_SIZE: u32 = 500;

impl KuCoinOptions {
    /// Reject values the exchange would refuse or that select nothing.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base_url must not be empty".into());
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            ));
        }
        if !(1..=MAX_SPAN_DAYS).contains(&self.max_span_days) {
            return Err(format!(
                "max_span_days must be between 1 and {MAX_SPAN_DAYS}, got {}",
                self.max_span_days
            ));
        }
        if self.lookback_days < 1 {
            return Err(format!(
                "lookback_days must be at least 1, got {}",
                self.lookback_days
            ));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be at least 1".into());
        }
        Ok(())
    }
}

impl Default for KuCoinOptions {
    fn default() -> Self {
        Self {
            base_url: "https://api.kucoin.com".into(),
            page_size: MAX_PAGE_SIZE,
            max_span_days: MAX_SPAN_DAYS,
            lookback_days: 365,
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_options_fill_in_defaults() {
        let opts: KuCoinOptions = serde_json::from_str(r#"{"page_size": 100}"#).unwrap();
        assert_eq!(opts.page_size, 100);
        assert_eq!(opts.max_span_days, 7);
        assert_eq!(opts.base_url, "https://api.kucoin.com");
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(KuCoinOptions::default().validate(), Ok(()));
    }

    #[test]
    fn out_of_range_options_are_rejected() {
        let cases = [
            KuCoinOptions { max_span_days: i64::MAX / 1000, ..Default::default() },
            KuCoinOptions { max_span_days: 0, ..Default::default() },
            KuCoinOptions { lookback_days: -5, ..Default::default() },
            KuCoinOptions { page_size: 0, ..Default::default() },
            KuCoinOptions { page_size: 501, ..Default::default() },
            KuCoinOptions { timeout_secs: 0, ..Default::default() },
            KuCoinOptions { base_url: " ".into(), ..Default::default() },
        ];
        for opts in cases {
            assert!(opts.validate().is_err(), "{opts:?} should be rejected");
        }
    }
}

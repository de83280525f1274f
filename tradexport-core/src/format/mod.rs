//! Record model: formats, per-format fields, tagged values, records.

pub mod field;
pub mod record;
pub mod value;

pub use field::{CoinTrackingField, Field, KuCoinField};
pub use record::{Record, RecordBuilder, RecordError};
pub use value::{Value, ValueKind, DATE_FORMAT};

use serde::{Deserialize, Serialize};
use std::fmt;

/// A trade-record schema, either exchange-native or accounting-tool-native.
///
/// Used as the tag on record collections and as the lookup key for
/// conversion tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// KuCoin spot fills.
    KuCoin,
    /// CoinTracking trade import.
    CoinTracking,
}

impl Format {
    /// Human-readable name, also used as the exchange label on converted records.
    pub fn name(self) -> &'static str {
        match self {
            Format::KuCoin => "KuCoin",
            Format::CoinTracking => "CoinTracking",
        }
    }

    /// Every field of this format, in export order.
    pub fn fields(self) -> Vec<Field> {
        match self {
            Format::KuCoin => KuCoinField::ALL.iter().copied().map(Field::KuCoin).collect(),
            Format::CoinTracking => CoinTrackingField::ALL
                .iter()
                .copied()
                .map(Field::CoinTracking)
                .collect(),
        }
    }

    /// Fields a record must carry before it can be exported in this format.
    pub fn required_fields(self) -> Vec<Field> {
        match self {
            // Funds and liquidity are informational; fills predating them omit both.
            Format::KuCoin => self
                .fields()
                .into_iter()
                .filter(|f| {
                    !matches!(
                        f,
                        Field::KuCoin(KuCoinField::Funds | KuCoinField::Liquidity)
                    )
                })
                .collect(),
            Format::CoinTracking => self.fields(),
        }
    }

    /// The header row for this format: its fields in the fixed export order.
    pub fn export_header(self) -> Vec<Field> {
        self.fields()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//! KuCoin REST response shapes and their normalisation into records.

use crate::format::value::timestamp_from_millis;
use crate::format::{Format, KuCoinField, Record, Value};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::str::FromStr;

/// `code` KuCoin returns on success.
pub const SUCCESS_CODE: &str = "200000";

#[derive(Debug, Deserialize)]
struct Envelope {
    code: String,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// Why an envelope could not be opened.
#[derive(Debug, PartialEq, Eq)]
pub enum EnvelopeError {
    /// Well-formed response carrying a non-success code.
    Rejected { code: String, msg: String },
    /// Body or `data` did not decode.
    Malformed(String),
}

/// Decode `{ code, msg, data }` and return `data` as `T`.
pub fn open_envelope<T: DeserializeOwned>(body: &str) -> Result<T, EnvelopeError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| EnvelopeError::Malformed(e.to_string()))?;
    if envelope.code != SUCCESS_CODE {
        return Err(EnvelopeError::Rejected {
            code: envelope.code,
            msg: envelope.msg.unwrap_or_default(),
        });
    }
    let data = envelope
        .data
        .ok_or_else(|| EnvelopeError::Malformed("response has no data".into()))?;
    serde_json::from_value(data).map_err(|e| EnvelopeError::Malformed(e.to_string()))
}

/// One entry of `GET /api/v1/symbols`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default = "enabled")]
    pub enable_trading: bool,
}

fn enabled() -> bool {
    true
}

/// One page of `GET /api/v1/fills`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillsPage {
    pub current_page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_num: u64,
    pub total_page: u32,
    #[serde(default)]
    pub items: Vec<Fill>,
}

/// One executed fill. Amounts arrive as decimal strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    pub symbol: String,
    pub trade_id: String,
    pub order_id: String,
    pub side: String,
    #[serde(default)]
    pub liquidity: Option<String>,
    pub price: String,
    pub size: String,
    #[serde(default)]
    pub funds: Option<String>,
    pub fee: String,
    pub fee_currency: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

fn decimal(field: KuCoinField, raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw.trim())
        .map_err(|e| format!("{}: invalid decimal '{raw}': {e}", field.header()))
}

impl Fill {
    /// Normalise into a KuCoin-tagged record.
    pub fn to_record(&self) -> Result<Record, String> {
        let mut builder = Record::builder(Format::KuCoin)
            .set(KuCoinField::TradeId, self.trade_id.as_str())
            .set(KuCoinField::OrderId, self.order_id.as_str())
            .set(KuCoinField::Symbol, self.symbol.as_str())
            .set(KuCoinField::Side, self.side.to_ascii_lowercase())
            .set(KuCoinField::Price, decimal(KuCoinField::Price, &self.price)?)
            .set(KuCoinField::Size, decimal(KuCoinField::Size, &self.size)?)
            .set(KuCoinField::Fee, decimal(KuCoinField::Fee, &self.fee)?)
            .set(KuCoinField::FeeCurrency, self.fee_currency.as_str())
            .set(
                KuCoinField::CreatedAt,
                Value::Timestamp(timestamp_from_millis(self.created_at)?),
            );
        if let Some(funds) = self.funds.as_deref().filter(|f| !f.is_empty()) {
            builder = builder.set(KuCoinField::Funds, decimal(KuCoinField::Funds, funds)?);
        }
        if let Some(liquidity) = &self.liquidity {
            builder = builder.set(KuCoinField::Liquidity, liquidity.as_str());
        }
        builder.build().map_err(|e| e.to_string())
    }
}

//! KuCoin fills → CoinTracking trades.
//!
//! A KuCoin fill is one side of a `BASE-QUOTE` trade. CoinTracking wants the
//! buy and sell legs spelled out: a `buy` of 0.5 BTC on BTC-USDT buys 0.5 BTC
//! and sells the funds in USDT, a `sell` mirrors that.

use super::{MappingTable, RuleError};
use crate::format::{
    CoinTrackingField as Ct, Field, Format, KuCoinField as Kc, Record, Value, DATE_FORMAT,
};
use rust_decimal::Decimal;

/// CoinTracking's label for spot trades.
pub const TRADE_TYPE: &str = "Trade";

pub fn table() -> MappingTable {
    MappingTable::new(Format::KuCoin, Format::CoinTracking)
        .derive(&[Field::KuCoin(Kc::Side)], trade_type)
        .derive(
            &[
                Field::KuCoin(Kc::Side),
                Field::KuCoin(Kc::Symbol),
                Field::KuCoin(Kc::Size),
                Field::KuCoin(Kc::Price),
            ],
            legs,
        )
        .rename(Kc::Fee, Ct::Fee)
        .rename(Kc::FeeCurrency, Ct::FeeCurrency)
        .constant(Ct::Exchange, Format::KuCoin.name())
        .constant(Ct::Group, "")
        .derive(&[Field::KuCoin(Kc::TradeId)], comment)
        .reformat(Kc::CreatedAt, Ct::Date, calendar_date)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Buy,
    Sell,
}

fn text(record: &Record, field: Kc) -> Result<&str, RuleError> {
    let value = record.get(field).ok_or(RuleError::Missing(field.into()))?;
    value.as_text().ok_or_else(|| RuleError::Invalid {
        field: field.into(),
        reason: format!("expected text, got {:?}", value.kind()),
    })
}

fn decimal(record: &Record, field: Kc) -> Result<Decimal, RuleError> {
    let value = record.get(field).ok_or(RuleError::Missing(field.into()))?;
    value.as_decimal().ok_or_else(|| RuleError::Invalid {
        field: field.into(),
        reason: format!("expected decimal, got {:?}", value.kind()),
    })
}

fn side(record: &Record) -> Result<Side, RuleError> {
    match text(record, Kc::Side)?.to_ascii_lowercase().as_str() {
        "buy" => Ok(Side::Buy),
        "sell" => Ok(Side::Sell),
        other => Err(RuleError::Invalid {
            field: Kc::Side.into(),
            reason: format!("unknown side '{other}'"),
        }),
    }
}

/// `BTC-USDT` → (`BTC`, `USDT`).
fn split_symbol(record: &Record) -> Result<(&str, &str), RuleError> {
    let symbol = text(record, Kc::Symbol)?;
    match symbol.split_once('-') {
        Some((base, quote)) if !base.is_empty() && !quote.is_empty() => Ok((base, quote)),
        _ => Err(RuleError::Invalid {
            field: Kc::Symbol.into(),
            reason: format!("expected BASE-QUOTE, got '{symbol}'"),
        }),
    }
}

fn trade_type(record: &Record) -> Result<Vec<(Field, Value)>, RuleError> {
    side(record)?;
    Ok(vec![(Ct::Type.into(), Value::from(TRADE_TYPE))])
}

fn legs(record: &Record) -> Result<Vec<(Field, Value)>, RuleError> {
    let side = side(record)?;
    let (base, quote) = split_symbol(record)?;
    let size = decimal(record, Kc::Size)?;
    let funds = match record.get(Kc::Funds) {
        Some(_) => decimal(record, Kc::Funds)?,
        None => {
            let price = decimal(record, Kc::Price)?;
            price.checked_mul(size).ok_or_else(|| RuleError::Invalid {
                field: Kc::Price.into(),
                reason: format!("price {price} × size {size} overflows"),
            })?
        }
    };

    let (buy_amount, buy_currency, sell_amount, sell_currency) = match side {
        Side::Buy => (size, base, funds, quote),
        Side::Sell => (funds, quote, size, base),
    };
    Ok(vec![
        (Ct::BuyAmount.into(), Value::Decimal(buy_amount)),
        (Ct::BuyCurrency.into(), Value::from(buy_currency)),
        (Ct::SellAmount.into(), Value::Decimal(sell_amount)),
        (Ct::SellCurrency.into(), Value::from(sell_currency)),
    ])
}

fn comment(record: &Record) -> Result<Vec<(Field, Value)>, RuleError> {
    let mut comment = format!("tradeId {}", text(record, Kc::TradeId)?);
    if let Some(order_id) = record.get(Kc::OrderId).and_then(Value::as_text) {
        comment.push_str(&format!(", order {order_id}"));
    }
    Ok(vec![(Ct::Comment.into(), Value::Text(comment))])
}

fn calendar_date(value: &Value) -> Result<Value, String> {
    value
        .as_timestamp()
        .map(|t| Value::Text(t.format(DATE_FORMAT).to_string()))
        .ok_or_else(|| format!("expected timestamp, got {:?}", value.kind()))
}

//! Per-format fields.
//!
//! Fields are namespaced by format: KuCoin's `createdAt` and CoinTracking's
//! `Date` are different values, and conversion is the explicit mapping
//! between the two namespaces.

use super::value::ValueKind;
use super::Format;
use std::fmt;

/// KuCoin fill attributes, labelled with the API's JSON keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KuCoinField {
    TradeId,
    OrderId,
    Symbol,
    Side,
    Price,
    Size,
    Funds,
    Fee,
    FeeCurrency,
    Liquidity,
    CreatedAt,
}

impl KuCoinField {
    pub const ALL: [KuCoinField; 11] = [
        KuCoinField::TradeId,
        KuCoinField::OrderId,
        KuCoinField::Symbol,
        KuCoinField::Side,
        KuCoinField::Price,
        KuCoinField::Size,
        KuCoinField::Funds,
        KuCoinField::Fee,
        KuCoinField::FeeCurrency,
        KuCoinField::Liquidity,
        KuCoinField::CreatedAt,
    ];

    pub fn header(self) -> &'static str {
        match self {
            KuCoinField::TradeId => "tradeId",
            KuCoinField::OrderId => "orderId",
            KuCoinField::Symbol => "symbol",
            KuCoinField::Side => "side",
            KuCoinField::Price => "price",
            KuCoinField::Size => "size",
            KuCoinField::Funds => "funds",
            KuCoinField::Fee => "fee",
            KuCoinField::FeeCurrency => "feeCurrency",
            KuCoinField::Liquidity => "liquidity",
            KuCoinField::CreatedAt => "createdAt",
        }
    }

    pub fn kind(self) -> ValueKind {
        match self {
            KuCoinField::Price | KuCoinField::Size | KuCoinField::Funds | KuCoinField::Fee => {
                ValueKind::Decimal
            }
            KuCoinField::CreatedAt => ValueKind::Timestamp,
            _ => ValueKind::Text,
        }
    }
}

/// CoinTracking trade-import columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CoinTrackingField {
    Type,
    BuyAmount,
    BuyCurrency,
    SellAmount,
    SellCurrency,
    Fee,
    FeeCurrency,
    Exchange,
    Group,
    Comment,
    Date,
}

impl CoinTrackingField {
    /// Export order expected by CoinTracking's CSV import.
    pub const ALL: [CoinTrackingField; 11] = [
        CoinTrackingField::Type,
        CoinTrackingField::BuyAmount,
        CoinTrackingField::BuyCurrency,
        CoinTrackingField::SellAmount,
        CoinTrackingField::SellCurrency,
        CoinTrackingField::Fee,
        CoinTrackingField::FeeCurrency,
        CoinTrackingField::Exchange,
        CoinTrackingField::Group,
        CoinTrackingField::Comment,
        CoinTrackingField::Date,
    ];

    pub fn header(self) -> &'static str {
        match self {
            CoinTrackingField::Type => "Type",
            CoinTrackingField::BuyAmount => "Buy Amount",
            CoinTrackingField::BuyCurrency => "Buy Currency",
            CoinTrackingField::SellAmount => "Sell Amount",
            CoinTrackingField::SellCurrency => "Sell Currency",
            CoinTrackingField::Fee => "Fee",
            CoinTrackingField::FeeCurrency => "Fee Currency",
            CoinTrackingField::Exchange => "Exchange",
            CoinTrackingField::Group => "Trade-Group",
            CoinTrackingField::Comment => "Comment",
            CoinTrackingField::Date => "Date",
        }
    }

    pub fn kind(self) -> ValueKind {
        match self {
            CoinTrackingField::BuyAmount
            | CoinTrackingField::SellAmount
            | CoinTrackingField::Fee => ValueKind::Decimal,
            _ => ValueKind::Text,
        }
    }
}

/// A named column within one format's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    KuCoin(KuCoinField),
    CoinTracking(CoinTrackingField),
}

impl Field {
    /// The format this field is namespaced under.
    pub fn format(self) -> Format {
        match self {
            Field::KuCoin(_) => Format::KuCoin,
            Field::CoinTracking(_) => Format::CoinTracking,
        }
    }

    /// Display label, used only for header rows.
    pub fn header(self) -> &'static str {
        match self {
            Field::KuCoin(f) => f.header(),
            Field::CoinTracking(f) => f.header(),
        }
    }

    /// The value kind importers parse this field's cells into.
    pub fn kind(self) -> ValueKind {
        match self {
            Field::KuCoin(f) => f.kind(),
            Field::CoinTracking(f) => f.kind(),
        }
    }

    /// Look up a field of `format` by its header label.
    pub fn from_header(format: Format, label: &str) -> Option<Field> {
        format.fields().into_iter().find(|f| f.header() == label)
    }
}

impl From<KuCoinField> for Field {
    fn from(f: KuCoinField) -> Self {
        Field::KuCoin(f)
    }
}

impl From<CoinTrackingField> for Field {
    fn from(f: CoinTrackingField) -> Self {
        Field::CoinTracking(f)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.format(), self.header())
    }
}

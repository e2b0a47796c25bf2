use crate::category::Category;
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;

/// Canonical transaction produced by applying a decision to a record.
///
/// Both amounts are stored as non-negative magnitudes; the category alone
/// encodes direction. Once created it is handed to storage and never mutated
/// by this engine again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub date: DateTime<FixedOffset>,
    pub exchange: String,
    pub category: Category,
    /// Absolute Bitcoin quantity.
    pub btc_amount: Decimal,
    /// Non-negative USD value; zero for non-taxable movements.
    pub usd_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    pub taxable: bool,
    pub is_self_custody: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goods_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_wallet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_exchange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Transaction {
    /// Human-readable type label.
    pub fn label(&self) -> &'static str {
        self.category.label()
    }
}

use crate::category::Category;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Input root for decision JSON
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DecisionInput {
    pub decisions: Vec<Decision>,
}

/// A classification decision for one pending record.
///
/// The category is carried as wire text so an out-of-set value degrades to a
/// validation failure instead of a parse error.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Decision {
    /// Identifier of the record this decision resolves
    pub record_id: String,
    /// Category wire name (e.g., "PURCHASE", "SELF_CUSTODY_WITHDRAWAL")
    pub category: String,
    /// USD value at the time of the transaction, for fair-value categories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub fair_market_value: Option<Decimal>,
    /// Who the coins came from or went to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
    /// What was bought or paid for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goods_description: Option<String>,
    /// Wallet or exchange the coins went to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_wallet: Option<String>,
    /// Exchange the coins came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_exchange: Option<String>,
    /// Explicit sale price per Bitcoin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<f64>")]
    pub sale_price: Option<Decimal>,
    /// Free-text notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Decision {
    /// Bare decision carrying only the chosen category.
    pub fn new(record_id: impl Into<String>, category: Category) -> Decision {
        Decision {
            record_id: record_id.into(),
            category: category.wire_name().to_string(),
            fair_market_value: None,
            counterparty: None,
            goods_description: None,
            destination_wallet: None,
            source_exchange: None,
            sale_price: None,
            notes: None,
        }
    }
}

/// Read decisions from JSON
pub fn read_decisions_json<R: Read>(reader: R) -> anyhow::Result<Vec<Decision>> {
    let input: DecisionInput = serde_json::from_reader(reader)?;
    Ok(input.decisions)
}

use crate::category::{Category, ValueRule};
use crate::decision::Decision;
use crate::record::RawRecord;
use crate::transaction::Transaction;
use crate::validate::{self, DecisionError};
use rust_decimal::Decimal;

/// Apply a classification decision to a record.
///
/// Runs the validation engine first; a rejected decision comes back as `Err`
/// with the user-facing reason and produces no transaction. A valid `Skip`
/// returns `Ok(None)`: intentional exclusion, not an error. Identical inputs
/// always produce an identical transaction.
pub fn apply_decision(
    record: &RawRecord,
    decision: &Decision,
) -> Result<Option<Transaction>, DecisionError> {
    let category = validate::validate(record, decision)?;
    if category == Category::Skip {
        return Ok(None);
    }

    let (usd_amount, price) = synthesize_value(record, category, decision.fair_market_value);

    Ok(Some(Transaction {
        id: record.id.clone(),
        date: record.date,
        exchange: record.exchange.clone(),
        category,
        btc_amount: record.magnitude(),
        usd_amount,
        price,
        taxable: category.is_taxable(),
        is_self_custody: category.is_self_custody(),
        counterparty: decision.counterparty.clone(),
        goods_description: decision.goods_description.clone(),
        destination_wallet: decision.destination_wallet.clone(),
        source_exchange: decision.source_exchange.clone(),
        sale_price: decision.sale_price,
        notes: decision.notes.clone(),
    }))
}

/// Derive the final USD amount and unit price for a validated category.
///
/// Fair-value categories prefer the supplied value and re-derive the unit
/// price over the record's quantity; the fallbacks below marked unreachable
/// are ruled out by validation.
fn synthesize_value(
    record: &RawRecord,
    category: Category,
    fair_market_value: Option<Decimal>,
) -> (Decimal, Option<Decimal>) {
    let magnitude = record.magnitude();

    match category.contract().value {
        ValueRule::DirectCost => {
            if record.usd_amount > Decimal::ZERO {
                (record.usd_amount, record.unit_price())
            } else {
                match record.unit_price() {
                    Some(price) => (price * magnitude, Some(price)),
                    None => (Decimal::ZERO, None), // unreachable after validation
                }
            }
        }
        ValueRule::FairValue => match fair_market_value {
            Some(value) => (value, derive_price(value, magnitude)),
            None => match record.unit_price() {
                Some(price) => (price * magnitude, Some(price)),
                None => (Decimal::ZERO, None), // unreachable after validation
            },
        },
        ValueRule::Proceeds => {
            if record.usd_amount > Decimal::ZERO {
                (record.usd_amount, record.unit_price())
            } else {
                match fair_market_value {
                    Some(value) => (value, derive_price(value, magnitude)),
                    None => (Decimal::ZERO, None), // unreachable after validation
                }
            }
        }
        ValueRule::ZeroUsd => (Decimal::ZERO, record.unit_price()),
        ValueRule::Unconstrained => (Decimal::ZERO, None),
    }
}

fn derive_price(value: Decimal, magnitude: Decimal) -> Option<Decimal> {
    if magnitude.is_zero() {
        None
    } else {
        Some(value / magnitude)
    }
}

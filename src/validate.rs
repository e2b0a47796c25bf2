use crate::category::{Category, Direction, ValueRule};
use crate::decision::Decision;
use crate::record::RawRecord;
use rust_decimal::Decimal;

/// Why a classification decision was rejected.
///
/// The `Display` strings are shown to the reviewing user as-is, so each one
/// names the violated rule in plain language.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecisionError {
    #[error("unknown classification type: {0}")]
    UnknownCategory(String),
    #[error("transaction requires Bitcoin movement")]
    NoBitcoinMovement,
    #[error("{0} requires a positive Bitcoin amount (incoming coins)")]
    RequiresIncoming(&'static str),
    #[error("{0} requires a negative Bitcoin amount (outgoing coins)")]
    RequiresOutgoing(&'static str),
    #[error("{0} requires a USD amount or unit price to establish cost basis")]
    MissingCostBasis(&'static str),
    #[error("{0} requires a fair market value or unit price")]
    MissingFairValue(&'static str),
    #[error("{0} requires a positive fair market value")]
    NonPositiveFairValue(&'static str),
    #[error("Sales require positive USD proceeds to calculate capital gains/losses")]
    MissingProceeds,
    #[error("{0} is a non-taxable movement; USD amount must be zero")]
    MovementWithUsd(&'static str),
}

/// Resolve a decision's category and check the record against its contract.
pub fn validate(record: &RawRecord, decision: &Decision) -> Result<Category, DecisionError> {
    let category = Category::from_wire(&decision.category)
        .ok_or_else(|| DecisionError::UnknownCategory(decision.category.clone()))?;
    validate_category(record, category, decision.fair_market_value)?;
    Ok(category)
}

/// Check a record against a category's sign and value contract.
///
/// `Skip` is valid for any record. Everything else needs Bitcoin movement in
/// the required direction plus whatever the category's value rule demands.
pub fn validate_category(
    record: &RawRecord,
    category: Category,
    fair_market_value: Option<Decimal>,
) -> Result<(), DecisionError> {
    if category == Category::Skip {
        return Ok(());
    }

    if record.btc_amount.is_zero() {
        return Err(DecisionError::NoBitcoinMovement);
    }

    let contract = category.contract();

    match contract.direction {
        Direction::Incoming if record.btc_amount < Decimal::ZERO => {
            return Err(DecisionError::RequiresIncoming(category.label()));
        }
        Direction::Outgoing if record.btc_amount > Decimal::ZERO => {
            return Err(DecisionError::RequiresOutgoing(category.label()));
        }
        _ => {}
    }

    match contract.value {
        ValueRule::DirectCost => {
            if record.usd_amount <= Decimal::ZERO && record.unit_price().is_none() {
                return Err(DecisionError::MissingCostBasis(category.label()));
            }
        }
        ValueRule::FairValue => {
            // A bad supplied value is rejected, not rescued by the record price
            if fair_market_value.is_some_and(|v| v <= Decimal::ZERO) {
                return Err(DecisionError::NonPositiveFairValue(category.label()));
            }
            if fair_market_value.is_none() && record.unit_price().is_none() {
                return Err(DecisionError::MissingFairValue(category.label()));
            }
        }
        ValueRule::Proceeds => {
            let has_proceeds = record.usd_amount > Decimal::ZERO
                || fair_market_value.is_some_and(|v| v > Decimal::ZERO);
            if !has_proceeds {
                return Err(DecisionError::MissingProceeds);
            }
        }
        ValueRule::ZeroUsd => {
            if !record.usd_amount.is_zero() {
                return Err(DecisionError::MovementWithUsd(category.label()));
            }
        }
        ValueRule::Unconstrained => {}
    }

    Ok(())
}

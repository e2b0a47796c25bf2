use crate::category::Category;
use crate::classify::ClassifyRules;
use crate::decision::Decision;
use crate::engine::PendingRecord;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupTheme {
    OutgoingMovement,
    SaleCandidate,
    Other,
}

/// A bulk action offered for a group of pending records.
///
/// Advisory only: expanding it produces plain per-record decisions that each
/// pass validation individually before becoming a transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkSuggestion {
    pub category: Category,
    pub record_ids: Vec<String>,
    pub description: String,
}

/// A themed batch of pending records presented for review together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptGroup {
    pub theme: GroupTheme,
    pub title: String,
    pub records: Vec<PendingRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<BulkSuggestion>,
}

/// Group pending records into themed review batches.
///
/// Uses the same keyword sets the classifier matched against, so a record
/// lands in the group its suggestion came from. Empty groups are omitted.
pub fn build_prompt_groups(pending: &[PendingRecord], rules: &ClassifyRules) -> Vec<PromptGroup> {
    let mut movements = Vec::new();
    let mut sales = Vec::new();
    let mut other = Vec::new();

    for entry in pending {
        let text = entry.record.detected_type.to_lowercase();
        let outgoing = entry.record.btc_amount < Decimal::ZERO;

        if outgoing && (rules.is_withdrawal_like(&text) || rules.is_transfer_like(&text)) {
            movements.push(entry.clone());
        } else if rules.is_sale_like(&text) {
            sales.push(entry.clone());
        } else {
            other.push(entry.clone());
        }
    }

    let mut groups = Vec::new();
    if !movements.is_empty() {
        let suggestion = round_amount_suggestion(&movements, rules);
        groups.push(PromptGroup {
            theme: GroupTheme::OutgoingMovement,
            title: "Outgoing movements needing a destination".to_string(),
            records: movements,
            suggestion,
        });
    }
    if !sales.is_empty() {
        let suggestion = sale_suggestion(&sales);
        groups.push(PromptGroup {
            theme: GroupTheme::SaleCandidate,
            title: "Possible sales".to_string(),
            records: sales,
            suggestion,
        });
    }
    if !other.is_empty() {
        groups.push(PromptGroup {
            theme: GroupTheme::Other,
            title: "Unclassified records".to_string(),
            records: other,
            suggestion: None,
        });
    }
    groups
}

/// Expand a bulk suggestion into one bare decision per member record.
pub fn expand_bulk(suggestion: &BulkSuggestion) -> Vec<Decision> {
    suggestion
        .record_ids
        .iter()
        .map(|id| Decision::new(id.clone(), suggestion.category))
        .collect()
}

fn round_amount_suggestion(
    records: &[PendingRecord],
    rules: &ClassifyRules,
) -> Option<BulkSuggestion> {
    let record_ids: Vec<String> = records
        .iter()
        .filter(|entry| rules.round_amount(entry.record.btc_amount).is_some())
        .map(|entry| entry.record.id.clone())
        .collect();
    if record_ids.is_empty() {
        return None;
    }

    let category = Category::SelfCustodyWithdrawal;
    let description = format!(
        "Apply {} to {} record(s) near a recognized round amount",
        category.label(),
        record_ids.len()
    );
    Some(BulkSuggestion {
        category,
        record_ids,
        description,
    })
}

fn sale_suggestion(records: &[PendingRecord]) -> Option<BulkSuggestion> {
    let record_ids: Vec<String> = records
        .iter()
        .filter(|entry| entry.record.usd_amount > Decimal::ZERO)
        .map(|entry| entry.record.id.clone())
        .collect();
    if record_ids.is_empty() {
        return None;
    }

    let category = Category::Sale;
    let description = format!(
        "Apply {} to {} record(s) with USD proceeds",
        category.label(),
        record_ids.len()
    );
    Some(BulkSuggestion {
        category,
        record_ids,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply_decision;
    use crate::classify::classify;
    use crate::record::RawRecord;
    use chrono::{DateTime, FixedOffset};
    use rust_decimal_macros::dec;

    fn dt() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-01-15T10:30:00+00:00").unwrap()
    }

    fn pending(id: &str, detected_type: &str, btc: Decimal, usd: Decimal) -> PendingRecord {
        let record = RawRecord {
            id: id.to_string(),
            exchange: "coinbase".to_string(),
            date: dt(),
            detected_type: detected_type.to_string(),
            btc_amount: btc,
            usd_amount: usd,
            price: None,
            destination_address: None,
            tx_hash: None,
        };
        let suggestion = classify(&record, &ClassifyRules::default());
        PendingRecord { record, suggestion }
    }

    #[test]
    fn groups_partition_by_theme() {
        let entries = vec![
            pending("w-1", "Withdrawal", dec!(-0.01), Decimal::ZERO),
            pending("t-1", "Transfer", dec!(-0.1), Decimal::ZERO),
            // Sale keyword, but the sign kept the classifier from settling it
            pending("s-1", "Sell order", dec!(0.25), dec!(11000)),
            pending("x-1", "Fork payout", dec!(0.002), Decimal::ZERO),
            // Incoming transfer is not an outgoing movement
            pending("t-2", "Transfer in", dec!(0.1), Decimal::ZERO),
        ];

        let groups = build_prompt_groups(&entries, &ClassifyRules::default());
        assert_eq!(groups.len(), 3);

        assert_eq!(groups[0].theme, GroupTheme::OutgoingMovement);
        let ids: Vec<&str> = groups[0].records.iter().map(|e| e.record.id.as_str()).collect();
        assert_eq!(ids, ["w-1", "t-1"]);

        assert_eq!(groups[1].theme, GroupTheme::SaleCandidate);
        assert_eq!(groups[1].records[0].record.id, "s-1");

        assert_eq!(groups[2].theme, GroupTheme::Other);
        let ids: Vec<&str> = groups[2].records.iter().map(|e| e.record.id.as_str()).collect();
        assert_eq!(ids, ["x-1", "t-2"]);
    }

    #[test]
    fn empty_queue_builds_no_groups() {
        assert!(build_prompt_groups(&[], &ClassifyRules::default()).is_empty());
    }

    #[test]
    fn round_amounts_drive_the_movement_suggestion() {
        let entries = vec![
            pending("w-1", "Withdrawal", dec!(-0.01), Decimal::ZERO),
            pending("w-2", "Withdrawal", dec!(-0.0234), Decimal::ZERO),
            pending("t-1", "Transfer", dec!(-1), Decimal::ZERO),
        ];

        let groups = build_prompt_groups(&entries, &ClassifyRules::default());
        let suggestion = groups[0].suggestion.as_ref().unwrap();
        assert_eq!(suggestion.category, Category::SelfCustodyWithdrawal);
        assert_eq!(suggestion.record_ids, ["w-1", "t-1"]);
        assert!(suggestion.description.contains("2 record(s)"));

        // Expanded decisions each pass validation on their own
        let decisions = expand_bulk(suggestion);
        assert_eq!(decisions.len(), 2);
        for decision in &decisions {
            let entry = entries
                .iter()
                .find(|e| e.record.id == decision.record_id)
                .unwrap();
            let tx = apply_decision(&entry.record, decision).unwrap().unwrap();
            assert!(tx.is_self_custody);
        }
    }

    #[test]
    fn no_suggestion_without_round_amounts() {
        let entries = vec![pending("w-1", "Withdrawal", dec!(-0.0234), Decimal::ZERO)];
        let groups = build_prompt_groups(&entries, &ClassifyRules::default());
        assert_eq!(groups[0].theme, GroupTheme::OutgoingMovement);
        assert!(groups[0].suggestion.is_none());
    }

    #[test]
    fn sale_suggestion_covers_only_priced_records() {
        // Neither auto-classified: one has the wrong sign, one lacks proceeds
        let entries = vec![
            pending("s-1", "Sold", dec!(0.25), dec!(11000)),
            pending("s-2", "Sold", dec!(-0.1), Decimal::ZERO),
        ];

        let groups = build_prompt_groups(&entries, &ClassifyRules::default());
        assert_eq!(groups[0].theme, GroupTheme::SaleCandidate);
        let suggestion = groups[0].suggestion.as_ref().unwrap();
        assert_eq!(suggestion.category, Category::Sale);
        assert_eq!(suggestion.record_ids, ["s-1"]);
    }
}

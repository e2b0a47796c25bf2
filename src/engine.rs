use crate::apply::apply_decision;
use crate::classify::{classify, Classification, ClassifyRules};
use crate::decision::Decision;
use crate::record::RawRecord;
use crate::transaction::Transaction;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A record the classifier could not settle, held for user review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingRecord {
    pub record: RawRecord,
    pub suggestion: Classification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportCounts {
    pub imported: usize,
    /// Skipped plus still-pending records.
    pub ignored: usize,
}

/// Result of classifying a batch: settled transactions plus the review queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub transactions: Vec<Transaction>,
    pub pending: Vec<PendingRecord>,
    pub counts: ImportCounts,
}

/// A decision the validation engine refused, with the user-facing reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedDecision {
    pub record_id: String,
    pub reason: String,
}

/// Result of applying review decisions to a prior import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionOutcome {
    pub transactions: Vec<Transaction>,
    pub rejected: Vec<RejectedDecision>,
    /// Records still awaiting a usable decision.
    pub unresolved: Vec<PendingRecord>,
    pub counts: ImportCounts,
}

/// Classify a batch of records.
///
/// High-confidence suggestions are applied immediately; everything else is
/// queued for review. An auto suggestion that fails validation is demoted to
/// the queue rather than aborting the batch.
pub fn import_records(records: Vec<RawRecord>, rules: &ClassifyRules) -> ImportOutcome {
    let mut transactions = Vec::new();
    let mut pending = Vec::new();
    let mut skipped = 0;

    for record in records {
        let suggestion = classify(&record, rules);
        log::debug!(
            "Classified {} as {} at {:.2}: {}",
            record.id,
            suggestion.category,
            suggestion.confidence,
            suggestion.reason
        );

        if suggestion.is_auto() {
            let decision = Decision::new(record.id.clone(), suggestion.category);
            match apply_decision(&record, &decision) {
                Ok(Some(tx)) => {
                    transactions.push(tx);
                    continue;
                }
                Ok(None) => {
                    skipped += 1;
                    continue;
                }
                Err(err) => {
                    log::warn!(
                        "Auto classification of {} as {} failed validation ({}); queued for review",
                        record.id,
                        suggestion.category,
                        err
                    );
                }
            }
        }

        pending.push(PendingRecord { record, suggestion });
    }

    let counts = ImportCounts {
        imported: transactions.len(),
        ignored: skipped + pending.len(),
    };
    ImportOutcome {
        transactions,
        pending,
        counts,
    }
}

/// Apply review decisions to a prior import outcome.
///
/// Pure over its inputs, so a corrected decision set can be resubmitted
/// against the same outcome. Decisions for unknown records are ignored; the
/// last decision wins when a record gets more than one. A rejected decision
/// leaves its record unresolved.
pub fn complete_import(outcome: &ImportOutcome, decisions: &[Decision]) -> CompletionOutcome {
    let prior_skipped = outcome.counts.ignored.saturating_sub(outcome.pending.len());
    let known: HashSet<&str> = outcome
        .pending
        .iter()
        .map(|p| p.record.id.as_str())
        .collect();

    let mut by_record: HashMap<&str, &Decision> = HashMap::new();
    for decision in decisions {
        if !known.contains(decision.record_id.as_str()) {
            log::warn!("Ignoring decision for unknown record: {}", decision.record_id);
            continue;
        }
        by_record.insert(decision.record_id.as_str(), decision);
    }

    let mut transactions = outcome.transactions.clone();
    let mut rejected = Vec::new();
    let mut unresolved = Vec::new();
    let mut skipped = prior_skipped;

    for entry in &outcome.pending {
        let Some(decision) = by_record.get(entry.record.id.as_str()) else {
            unresolved.push(entry.clone());
            continue;
        };

        match apply_decision(&entry.record, decision) {
            Ok(Some(tx)) => transactions.push(tx),
            Ok(None) => skipped += 1,
            Err(err) => {
                log::warn!("Rejected decision for {}: {}", entry.record.id, err);
                rejected.push(RejectedDecision {
                    record_id: entry.record.id.clone(),
                    reason: err.to_string(),
                });
                unresolved.push(entry.clone());
            }
        }
    }

    let counts = ImportCounts {
        imported: transactions.len(),
        ignored: skipped + unresolved.len(),
    };
    CompletionOutcome {
        transactions,
        rejected,
        unresolved,
        counts,
    }
}

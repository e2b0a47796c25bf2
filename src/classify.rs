use crate::category::Category;
use crate::record::RawRecord;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Confidence scores produced by the classification heuristics.
///
/// Business constants; every boundary behavior is asserted against this one
/// structure, never against literals scattered through call sites.
pub struct Confidence;

impl Confidence {
    /// At or above this score a record is classified without review.
    pub const AUTO_APPLY: f64 = 0.90;

    pub const PURCHASE_KEYWORD: f64 = 0.95;
    pub const PRICED_DEPOSIT: f64 = 0.90;
    pub const UNPRICED_DEPOSIT: f64 = 0.60;
    pub const SALE_KEYWORD: f64 = 0.90;
    pub const WITHDRAWAL_ADDRESS: f64 = 0.90;
    pub const WITHDRAWAL_ROUND_AMOUNT: f64 = 0.85;
    pub const WITHDRAWAL_BARE: f64 = 0.70;
    pub const TRANSFER_KEYWORD: f64 = 0.60;
    pub const NO_MATCH: f64 = 0.10;
}

/// Keyword table and thresholds driving classification.
///
/// New exchange vocabularies are added here, nowhere else. Matching is
/// case-insensitive substring matching against the detected type.
#[derive(Debug, Clone)]
pub struct ClassifyRules {
    pub purchase_keywords: Vec<&'static str>,
    pub sale_keywords: Vec<&'static str>,
    pub withdrawal_keywords: Vec<&'static str>,
    pub transfer_keywords: Vec<&'static str>,
    pub deposit_keywords: Vec<&'static str>,
    /// Quantities people typically withdraw to self-custody.
    pub round_amounts: Vec<Decimal>,
    /// Relative tolerance when matching a round amount.
    pub round_tolerance: Decimal,
    /// Shortest string treated as a real destination address.
    pub min_address_len: usize,
}

impl Default for ClassifyRules {
    fn default() -> Self {
        ClassifyRules {
            purchase_keywords: vec!["buy", "purchase", "bought"],
            sale_keywords: vec!["sell", "sold", "sale"],
            withdrawal_keywords: vec!["withdraw", "sent", "send"],
            transfer_keywords: vec!["transfer", "move"],
            deposit_keywords: vec!["deposit", "receive", "credit"],
            round_amounts: vec![dec!(0.001), dec!(0.01), dec!(0.05), dec!(0.1), dec!(1)],
            round_tolerance: dec!(0.01),
            min_address_len: 26,
        }
    }
}

impl ClassifyRules {
    pub fn is_purchase_like(&self, text: &str) -> bool {
        contains_any(text, &self.purchase_keywords)
    }

    pub fn is_sale_like(&self, text: &str) -> bool {
        contains_any(text, &self.sale_keywords)
    }

    pub fn is_withdrawal_like(&self, text: &str) -> bool {
        contains_any(text, &self.withdrawal_keywords)
    }

    pub fn is_transfer_like(&self, text: &str) -> bool {
        contains_any(text, &self.transfer_keywords)
    }

    pub fn is_deposit_like(&self, text: &str) -> bool {
        contains_any(text, &self.deposit_keywords)
    }

    /// The recognized round quantity `amount` sits within tolerance of, if any.
    pub fn round_amount(&self, amount: Decimal) -> Option<Decimal> {
        let magnitude = amount.abs();
        self.round_amounts
            .iter()
            .copied()
            .find(|round| (magnitude - round).abs() <= round * self.round_tolerance)
    }

    pub fn has_destination_address(&self, record: &RawRecord) -> bool {
        record
            .destination_address
            .as_deref()
            .is_some_and(|addr| addr.trim().len() >= self.min_address_len)
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// Outcome of the keyword and sign heuristics for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub category: Category,
    pub confidence: f64,
    pub reason: String,
}

impl Classification {
    /// Whether the score clears the review threshold.
    pub fn is_auto(&self) -> bool {
        self.confidence >= Confidence::AUTO_APPLY
    }
}

/// Classify a record. Pure function of the record and rules.
pub fn classify(record: &RawRecord, rules: &ClassifyRules) -> Classification {
    let text = record.detected_type.to_lowercase();
    let incoming = record.btc_amount > Decimal::ZERO;
    let outgoing = record.btc_amount < Decimal::ZERO;

    if rules.is_purchase_like(&text) && incoming {
        return Classification {
            category: Category::Purchase,
            confidence: Confidence::PURCHASE_KEYWORD,
            reason: "purchase keyword with incoming Bitcoin".to_string(),
        };
    }

    if rules.is_deposit_like(&text) && incoming {
        // A priced receive usually has a cost basis; an unpriced one needs a
        // fair market value from the user.
        return if record.usd_amount > Decimal::ZERO {
            Classification {
                category: Category::Purchase,
                confidence: Confidence::PRICED_DEPOSIT,
                reason: "deposit with a USD amount, treated as a purchase".to_string(),
            }
        } else {
            Classification {
                category: Category::Purchase,
                confidence: Confidence::UNPRICED_DEPOSIT,
                reason: "deposit without a USD amount".to_string(),
            }
        };
    }

    if rules.is_sale_like(&text) && outgoing && record.usd_amount > Decimal::ZERO {
        return Classification {
            category: Category::Sale,
            confidence: Confidence::SALE_KEYWORD,
            reason: "sale keyword with outgoing Bitcoin and USD proceeds".to_string(),
        };
    }

    if rules.is_withdrawal_like(&text) && outgoing && record.usd_amount.is_zero() {
        return classify_withdrawal(record, rules);
    }

    if rules.is_transfer_like(&text) {
        return Classification {
            category: Category::ExchangeTransfer,
            confidence: Confidence::TRANSFER_KEYWORD,
            reason: "transfer keyword".to_string(),
        };
    }

    Classification {
        category: Category::Skip,
        confidence: Confidence::NO_MATCH,
        reason: "no keyword match".to_string(),
    }
}

/// A destination address is the strongest self-custody signal and beats the
/// amount heuristic; a recognized round quantity comes next.
fn classify_withdrawal(record: &RawRecord, rules: &ClassifyRules) -> Classification {
    if rules.has_destination_address(record) {
        return Classification {
            category: Category::SelfCustodyWithdrawal,
            confidence: Confidence::WITHDRAWAL_ADDRESS,
            reason: "withdrawal with a destination address".to_string(),
        };
    }

    if let Some(round) = rules.round_amount(record.btc_amount) {
        return Classification {
            category: Category::SelfCustodyWithdrawal,
            confidence: Confidence::WITHDRAWAL_ROUND_AMOUNT,
            reason: format!("withdrawal near the round amount {} BTC", round),
        };
    }

    Classification {
        category: Category::SelfCustodyWithdrawal,
        confidence: Confidence::WITHDRAWAL_BARE,
        reason: "withdrawal keyword with outgoing Bitcoin".to_string(),
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tax treatment category assigned to an imported record.
///
/// Wire names use SCREAMING_SNAKE_CASE (`PURCHASE`, `GIFT_RECEIVED`, ...),
/// the vocabulary decision payloads carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Bitcoin bought with USD (direct cost basis)
    Purchase,
    GiftReceived,
    PaymentReceived,
    ReimbursementReceived,
    MiningIncome,
    StakingIncome,
    /// Bitcoin sold for USD proceeds
    Sale,
    GiftSent,
    PaymentSent,
    /// Coins moved to a wallet the user controls
    SelfCustodyWithdrawal,
    /// Coins moved between exchanges
    ExchangeTransfer,
    /// Deliberately excluded from the portfolio
    Skip,
}

/// Tax treatment group a category belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryGroup {
    Acquisition,
    Disposal,
    Movement,
    Omission,
}

/// Required sign of the record's Bitcoin amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
    Any,
}

/// How a category establishes its USD value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRule {
    /// USD amount or unit price on the record (cost basis)
    DirectCost,
    /// Supplied fair market value, or unit price on the record
    FairValue,
    /// Positive USD proceeds on the record, or a supplied fair market value
    Proceeds,
    /// Non-taxable movement; USD amount must be zero
    ZeroUsd,
    /// No value requirement
    Unconstrained,
}

/// Sign and value contract a record must satisfy for a category.
#[derive(Debug, Clone, Copy)]
pub struct CategoryContract {
    pub group: CategoryGroup,
    pub direction: Direction,
    pub value: ValueRule,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Purchase,
        Category::GiftReceived,
        Category::PaymentReceived,
        Category::ReimbursementReceived,
        Category::MiningIncome,
        Category::StakingIncome,
        Category::Sale,
        Category::GiftSent,
        Category::PaymentSent,
        Category::SelfCustodyWithdrawal,
        Category::ExchangeTransfer,
        Category::Skip,
    ];

    /// Sign and value requirements for this category.
    ///
    /// Every per-category invariant lives in this table; the validation
    /// engine and the decision applier both read from it.
    pub fn contract(&self) -> CategoryContract {
        use CategoryGroup::*;

        match self {
            Category::Purchase => CategoryContract {
                group: Acquisition,
                direction: Direction::Incoming,
                value: ValueRule::DirectCost,
            },
            Category::GiftReceived
            | Category::PaymentReceived
            | Category::ReimbursementReceived
            | Category::MiningIncome
            | Category::StakingIncome => CategoryContract {
                group: Acquisition,
                direction: Direction::Incoming,
                value: ValueRule::FairValue,
            },
            Category::Sale => CategoryContract {
                group: Disposal,
                direction: Direction::Outgoing,
                value: ValueRule::Proceeds,
            },
            Category::GiftSent | Category::PaymentSent => CategoryContract {
                group: Disposal,
                direction: Direction::Outgoing,
                value: ValueRule::FairValue,
            },
            Category::SelfCustodyWithdrawal | Category::ExchangeTransfer => CategoryContract {
                group: Movement,
                direction: Direction::Outgoing,
                value: ValueRule::ZeroUsd,
            },
            Category::Skip => CategoryContract {
                group: Omission,
                direction: Direction::Any,
                value: ValueRule::Unconstrained,
            },
        }
    }

    pub fn group(&self) -> CategoryGroup {
        self.contract().group
    }

    /// Acquisitions and disposals are taxable; movements and skips are not.
    pub fn is_taxable(&self) -> bool {
        matches!(
            self.group(),
            CategoryGroup::Acquisition | CategoryGroup::Disposal
        )
    }

    pub fn is_self_custody(&self) -> bool {
        matches!(self, Category::SelfCustodyWithdrawal)
    }

    /// Human-readable label, used in reasons and table output.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Purchase => "Purchase",
            Category::GiftReceived => "Gift Received",
            Category::PaymentReceived => "Payment Received",
            Category::ReimbursementReceived => "Reimbursement Received",
            Category::MiningIncome => "Mining Income",
            Category::StakingIncome => "Staking Income",
            Category::Sale => "Sale",
            Category::GiftSent => "Gift Sent",
            Category::PaymentSent => "Payment Sent",
            Category::SelfCustodyWithdrawal => "Self-Custody Withdrawal",
            Category::ExchangeTransfer => "Exchange Transfer",
            Category::Skip => "Skip",
        }
    }

    /// Wire name as carried in decision payloads.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Category::Purchase => "PURCHASE",
            Category::GiftReceived => "GIFT_RECEIVED",
            Category::PaymentReceived => "PAYMENT_RECEIVED",
            Category::ReimbursementReceived => "REIMBURSEMENT_RECEIVED",
            Category::MiningIncome => "MINING_INCOME",
            Category::StakingIncome => "STAKING_INCOME",
            Category::Sale => "SALE",
            Category::GiftSent => "GIFT_SENT",
            Category::PaymentSent => "PAYMENT_SENT",
            Category::SelfCustodyWithdrawal => "SELF_CUSTODY_WITHDRAWAL",
            Category::ExchangeTransfer => "EXCHANGE_TRANSFER",
            Category::Skip => "SKIP",
        }
    }

    /// Parse a wire name; `None` for anything outside the known set.
    pub fn from_wire(s: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.wire_name() == s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_wire(category.wire_name()), Some(category));
        }
    }

    #[test]
    fn wire_name_matches_serde() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.wire_name()));
        }
    }

    #[test]
    fn unknown_wire_name_is_none() {
        assert_eq!(Category::from_wire("AIRDROP"), None);
        assert_eq!(Category::from_wire("purchase"), None);
        assert_eq!(Category::from_wire(""), None);
    }

    #[test]
    fn taxable_follows_group() {
        for category in Category::ALL {
            let expected = matches!(
                category.group(),
                CategoryGroup::Acquisition | CategoryGroup::Disposal
            );
            assert_eq!(category.is_taxable(), expected, "{category:?}");
        }
    }

    #[test]
    fn only_self_custody_withdrawal_is_self_custody() {
        for category in Category::ALL {
            assert_eq!(
                category.is_self_custody(),
                category == Category::SelfCustodyWithdrawal
            );
        }
    }

    #[test]
    fn movements_require_outgoing_and_zero_usd() {
        for category in [Category::SelfCustodyWithdrawal, Category::ExchangeTransfer] {
            let contract = category.contract();
            assert_eq!(contract.direction, Direction::Outgoing);
            assert_eq!(contract.value, ValueRule::ZeroUsd);
            assert!(!category.is_taxable());
        }
    }
}

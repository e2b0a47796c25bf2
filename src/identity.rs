use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

/// Derive a stable identifier for a normalized record.
///
/// Hashes the (exchange, date, |usd|, |btc|, detected type, price) tuple so
/// re-importing the same export always yields the same id. The storage layer
/// relies on this for merge-by-identifier deduplication.
pub fn record_identity(
    exchange: &str,
    date: &DateTime<FixedOffset>,
    usd_amount: Decimal,
    btc_amount: Decimal,
    detected_type: &str,
    price: Option<Decimal>,
) -> String {
    let fingerprint = format!(
        "{}|{}|{}|{}|{}|{}",
        exchange.trim().to_lowercase(),
        date.to_rfc3339(),
        usd_amount.abs().normalize(),
        btc_amount.abs().normalize(),
        detected_type.trim().to_lowercase(),
        price.map(|p| p.normalize().to_string()).unwrap_or_default(),
    );
    let digest = Sha256::digest(fingerprint.as_bytes());
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn dt(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn same_tuple_same_id() {
        let date = dt("2024-01-15T10:30:00+00:00");
        let a = record_identity("coinbase", &date, dec!(50), dec!(0.001), "Buy", None);
        let b = record_identity("coinbase", &date, dec!(50), dec!(0.001), "Buy", None);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn id_ignores_sign_and_scale() {
        let date = dt("2024-01-15T10:30:00+00:00");
        let negative = record_identity("coinbase", &date, dec!(50), dec!(-0.001), "Buy", None);
        let positive = record_identity("coinbase", &date, dec!(50.00), dec!(0.0010), "Buy", None);
        assert_eq!(negative, positive);
    }

    #[test]
    fn id_changes_with_fields() {
        let date = dt("2024-01-15T10:30:00+00:00");
        let base = record_identity("coinbase", &date, dec!(50), dec!(0.001), "Buy", None);
        let other_amount = record_identity("coinbase", &date, dec!(51), dec!(0.001), "Buy", None);
        let other_type = record_identity("coinbase", &date, dec!(50), dec!(0.001), "Sell", None);
        let priced = record_identity("coinbase", &date, dec!(50), dec!(0.001), "Buy", Some(dec!(50000)));
        assert_ne!(base, other_amount);
        assert_ne!(base, other_type);
        assert_ne!(base, priced);
    }
}

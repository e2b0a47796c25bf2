use crate::identity;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use satsort_derive::CsvSchema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("invalid datetime: {0}")]
    InvalidDatetime(String),
}

/// Column metadata generated by the `CsvSchema` derive.
#[derive(Debug, Clone, Copy)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Input root for normalized record JSON
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecordInput {
    pub records: Vec<RecordRow>,
}

/// Wire row for a normalized record: the CSV column set and the JSON element.
///
/// Amounts arrive as optional so empty CSV cells deserialize; conversion to
/// [`RawRecord`] applies the zero defaults and derives a missing identifier.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, CsvSchema)]
pub struct RecordRow {
    /// Stable identifier; derived from the other fields when blank
    #[serde(default)]
    pub id: Option<String>,
    /// Exchange the export came from (e.g., "coinbase", "kraken")
    pub exchange: String,
    /// When the record occurred (RFC3339 with offset; date-only assumes UTC midnight)
    pub date: String,
    /// Free text the export reported for this row (e.g., "Buy", "Withdrawal")
    pub detected_type: String,
    /// Signed Bitcoin amount; positive = incoming, negative = outgoing
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub btc_amount: Option<Decimal>,
    /// USD amount reported by the exchange, if any
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub usd_amount: Option<Decimal>,
    /// BTC/USD unit price reported by the exchange, if any
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub price: Option<Decimal>,
    /// Destination address for withdrawals, if any
    #[serde(default)]
    pub destination_address: Option<String>,
    /// On-chain transaction hash, if any
    #[serde(default)]
    pub tx_hash: Option<String>,
}

/// Normalized raw record, immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    pub id: String,
    pub exchange: String,
    pub date: DateTime<FixedOffset>,
    pub detected_type: String,
    /// Signed; positive = incoming, negative = outgoing.
    pub btc_amount: Decimal,
    /// Non-negative; zero means the exchange reported no USD amount.
    pub usd_amount: Decimal,
    pub price: Option<Decimal>,
    pub destination_address: Option<String>,
    pub tx_hash: Option<String>,
}

impl RawRecord {
    /// Unit price usable for valuation (present and positive).
    pub fn unit_price(&self) -> Option<Decimal> {
        self.price.filter(|p| *p > Decimal::ZERO)
    }

    /// Absolute Bitcoin quantity.
    pub fn magnitude(&self) -> Decimal {
        self.btc_amount.abs()
    }
}

impl TryFrom<RecordRow> for RawRecord {
    type Error = RecordError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let date = parse_datetime(&row.date)?;
        let btc_amount = row.btc_amount.unwrap_or(Decimal::ZERO);
        let usd_amount = row.usd_amount.unwrap_or(Decimal::ZERO);

        let id = match row.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => identity::record_identity(
                &row.exchange,
                &date,
                usd_amount,
                btc_amount,
                &row.detected_type,
                row.price,
            ),
        };

        Ok(RawRecord {
            id,
            exchange: row.exchange,
            date,
            detected_type: row.detected_type.trim().to_string(),
            btc_amount,
            usd_amount,
            price: row.price,
            destination_address: row.destination_address,
            tx_hash: row.tx_hash,
        })
    }
}

/// Read normalized records from JSON
pub fn read_records_json<R: Read>(reader: R) -> anyhow::Result<Vec<RawRecord>> {
    let input: RecordInput = serde_json::from_reader(reader)?;
    collect_records(input.records)
}

/// Read normalized records from CSV
pub fn read_records_csv<R: Read>(reader: R) -> anyhow::Result<Vec<RawRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let rows: Result<Vec<RecordRow>, _> = rdr.deserialize::<RecordRow>().collect();
    collect_records(rows?)
}

/// Convert rows, dropping the malformed ones the classifier must never see.
fn collect_records(rows: Vec<RecordRow>) -> anyhow::Result<Vec<RawRecord>> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let record = RawRecord::try_from(row)?;
        if record.detected_type.is_empty() {
            log::warn!("Dropping record without a detected type: id={}", record.id);
            continue;
        }
        if record.btc_amount.is_zero() && record.usd_amount.is_zero() {
            log::warn!("Dropping record without amounts: id={}", record.id);
            continue;
        }
        records.push(record);
    }
    records.sort_by_key(|r| r.date);
    Ok(records)
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<FixedOffset>, RecordError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.and_utc().fixed_offset());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc().fixed_offset());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.and_utc().fixed_offset());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).unwrap().and_utc().fixed_offset());
    }
    Err(RecordError::InvalidDatetime(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_csv_records() {
        let csv_data = r#"id,exchange,date,detected_type,btc_amount,usd_amount,price,destination_address,tx_hash
r-1,coinbase,2024-01-15,Buy,0.5,21000,42000,,
r-2,coinbase,2024-02-01T09:30:00,Withdrawal,-0.01,,,bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh,abc123
,kraken,2024-03-05,Sell,-0.25,11000,,,"#;

        let records = read_records_csv(csv_data.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].id, "r-1");
        assert_eq!(records[0].exchange, "coinbase");
        assert_eq!(records[0].detected_type, "Buy");
        assert_eq!(records[0].btc_amount, dec!(0.5));
        assert_eq!(records[0].usd_amount, dec!(21000));
        assert_eq!(records[0].price, Some(dec!(42000)));
        assert_eq!(records[0].destination_address, None);

        // Empty USD cell defaults to zero
        assert_eq!(records[1].usd_amount, Decimal::ZERO);
        assert_eq!(
            records[1].destination_address.as_deref(),
            Some("bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh")
        );

        // Blank id is derived from the record fields
        assert_eq!(records[2].id.len(), 16);
    }

    #[test]
    fn parse_json_records_sorted_by_date() {
        let json_data = r#"{
            "records": [
                {
                    "id": "later",
                    "exchange": "kraken",
                    "date": "2024-06-15",
                    "detected_type": "Sell",
                    "btc_amount": -0.25,
                    "usd_amount": 11000
                },
                {
                    "id": "earlier",
                    "exchange": "coinbase",
                    "date": "2024-01-15T10:30:00+00:00",
                    "detected_type": "Buy",
                    "btc_amount": 0.5,
                    "usd_amount": 21000
                }
            ]
        }"#;

        let records = read_records_json(json_data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "earlier");
        assert_eq!(records[1].id, "later");
    }

    #[test]
    fn drops_rows_without_type_or_amounts() {
        let csv_data = r#"id,exchange,date,detected_type,btc_amount,usd_amount,price,destination_address,tx_hash
r-1,coinbase,2024-01-15,Buy,0.5,21000,,,
r-2,coinbase,2024-01-16,  ,0.5,21000,,,
r-3,coinbase,2024-01-17,Fee,,,,,"#;

        let records = read_records_csv(csv_data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "r-1");
    }

    #[test]
    fn zero_btc_with_usd_survives() {
        // Zero Bitcoin movement is the validation engine's call, not the reader's
        let csv_data = r#"id,exchange,date,detected_type,btc_amount,usd_amount,price,destination_address,tx_hash
r-1,coinbase,2024-01-15,Adjustment,0,50,,,"#;

        let records = read_records_csv(csv_data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].btc_amount, Decimal::ZERO);
        assert_eq!(records[0].usd_amount, dec!(50));
    }

    #[test]
    fn invalid_datetime_is_an_error() {
        let csv_data = r#"id,exchange,date,detected_type,btc_amount,usd_amount,price,destination_address,tx_hash
r-1,coinbase,someday,Buy,0.5,21000,,,"#;

        let err = read_records_csv(csv_data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("invalid datetime"));
    }

    #[test]
    fn datetime_formats() {
        assert!(parse_datetime("2024-01-15T10:30:00+00:00").is_ok());
        assert!(parse_datetime("2024-01-15T10:30:00").is_ok());
        assert!(parse_datetime("2024-01-15 10:30:00").is_ok());
        assert!(parse_datetime("2024-01-15T10:30:00.123").is_ok());

        let midnight = parse_datetime("2024-01-15").unwrap();
        assert_eq!(midnight, parse_datetime("2024-01-15T00:00:00").unwrap());

        assert_eq!(
            parse_datetime("15/01/2024"),
            Err(RecordError::InvalidDatetime("15/01/2024".to_string()))
        );
    }

    #[test]
    fn csv_schema_marks_optional_columns() {
        let schema = RecordRow::csv_schema();
        let names: Vec<&str> = schema.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            [
                "id",
                "exchange",
                "date",
                "detected_type",
                "btc_amount",
                "usd_amount",
                "price",
                "destination_address",
                "tx_hash"
            ]
        );

        let required: Vec<&str> = schema
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();
        assert_eq!(required, ["exchange", "date", "detected_type"]);
    }
}

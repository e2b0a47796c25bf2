//! Classify command - import raw records and apply review decisions

use crate::classify::ClassifyRules;
use crate::cmd::read_records;
use crate::decision::{self, Decision};
use crate::engine::{self, CompletionOutcome, ImportCounts, ImportOutcome};
use crate::transaction::Transaction;
use clap::Args;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ClassifyCommand {
    /// Records file (CSV or JSON). Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// JSON file of review decisions to apply after classification
    #[arg(short, long)]
    decisions: Option<PathBuf>,

    /// Output the full outcome as JSON
    #[arg(long)]
    json: bool,

    /// Output transactions as CSV instead of a formatted table
    #[arg(long)]
    csv: bool,
}

impl ClassifyCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let records = read_records(&self.file)?;
        let rules = ClassifyRules::default();
        let outcome = engine::import_records(records, &rules);

        match self.read_decisions()? {
            Some(decisions) => {
                let completed = engine::complete_import(&outcome, &decisions);
                self.report_completed(&completed)
            }
            None => self.report_import(&outcome),
        }
    }

    fn read_decisions(&self) -> anyhow::Result<Option<Vec<Decision>>> {
        let Some(path) = &self.decisions else {
            return Ok(None);
        };
        let file = File::open(path)?;
        let decisions = decision::read_decisions_json(BufReader::new(file))?;
        Ok(Some(decisions))
    }

    fn report_import(&self, outcome: &ImportOutcome) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(outcome)?);
            return Ok(());
        }

        let rows: Vec<TransactionRow> =
            outcome.transactions.iter().map(TransactionRow::from).collect();
        if self.csv {
            return self.write_csv(&rows);
        }

        self.print_table(&rows);
        print_counts(outcome.counts);
        if !outcome.pending.is_empty() {
            println!(
                "\u{26A0} {} record(s) awaiting review. Run `satsort review` to list them.",
                outcome.pending.len()
            );
        }
        Ok(())
    }

    fn report_completed(&self, completed: &CompletionOutcome) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(completed)?);
            return Ok(());
        }

        let rows: Vec<TransactionRow> =
            completed.transactions.iter().map(TransactionRow::from).collect();
        if self.csv {
            return self.write_csv(&rows);
        }

        self.print_table(&rows);
        print_counts(completed.counts);
        for rejected in &completed.rejected {
            println!("\u{2717} {}: {}", rejected.record_id, rejected.reason);
        }
        if !completed.unresolved.is_empty() {
            println!(
                "\u{26A0} {} record(s) still awaiting review. Run `satsort review` to list them.",
                completed.unresolved.len()
            );
        }
        Ok(())
    }

    fn print_table(&self, rows: &[TransactionRow]) {
        if rows.is_empty() {
            println!("No transactions imported");
            return;
        }

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }

    fn write_csv(&self, rows: &[TransactionRow]) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Row for the transaction table output
#[derive(Debug, Clone, Tabled, serde::Serialize)]
pub struct TransactionRow {
    #[tabled(rename = "Id")]
    pub id: String,

    #[tabled(rename = "Date")]
    pub date: String,

    #[tabled(rename = "Exchange")]
    pub exchange: String,

    #[tabled(rename = "Type")]
    pub category: String,

    #[tabled(rename = "BTC")]
    pub btc_amount: String,

    #[tabled(rename = "USD")]
    pub usd_amount: String,

    #[tabled(rename = "Price")]
    pub price: String,

    #[tabled(rename = "Taxable")]
    pub taxable: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(tx: &Transaction) -> Self {
        TransactionRow {
            id: tx.id.clone(),
            date: tx.date.format("%Y-%m-%d %H:%M").to_string(),
            exchange: tx.exchange.clone(),
            category: tx.label().to_string(),
            btc_amount: format_quantity(tx.btc_amount),
            usd_amount: format_usd(tx.usd_amount),
            price: tx.price.map_or("-".to_string(), format_usd),
            taxable: if tx.taxable { "yes".to_string() } else { "no".to_string() },
        }
    }
}

fn print_counts(counts: ImportCounts) {
    println!("Imported: {}  Ignored: {}", counts.imported, counts.ignored);
}

fn format_quantity(qty: Decimal) -> String {
    let s = format!("{:.8}", qty);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

fn format_usd(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

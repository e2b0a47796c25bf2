//! Review command - list pending records grouped for human classification

use crate::classify::ClassifyRules;
use crate::cmd::read_records;
use crate::decision::{Decision, DecisionInput};
use crate::engine::{self, PendingRecord};
use crate::review::{build_prompt_groups, expand_bulk, PromptGroup};
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ReviewCommand {
    /// Records file (CSV or JSON). Reads from stdin if not specified.
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Output prompt groups as JSON
    #[arg(long)]
    json: bool,

    /// Print a decisions JSON skeleton prefilled from the bulk suggestions,
    /// for editing and passing back via `classify --decisions`
    #[arg(long)]
    emit_decisions: bool,
}

impl ReviewCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let records = read_records(&self.file)?;
        let rules = ClassifyRules::default();
        let outcome = engine::import_records(records, &rules);
        let groups = build_prompt_groups(&outcome.pending, &rules);

        if self.emit_decisions {
            let decisions: Vec<Decision> = groups
                .iter()
                .filter_map(|group| group.suggestion.as_ref())
                .flat_map(expand_bulk)
                .collect();
            println!("{}", serde_json::to_string_pretty(&DecisionInput { decisions })?);
            return Ok(());
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&groups)?);
            return Ok(());
        }

        if groups.is_empty() {
            println!("\u{2713} Nothing to review - all records classified automatically.");
            return Ok(());
        }

        for group in &groups {
            print_group(group);
        }
        Ok(())
    }
}

fn print_group(group: &PromptGroup) {
    println!();
    println!("{} ({} record(s))", group.title, group.records.len());

    let rows: Vec<PendingRow> = group.records.iter().map(PendingRow::from).collect();
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);

    if let Some(suggestion) = &group.suggestion {
        println!("Suggested bulk action: {}", suggestion.description);
    }
}

/// Row for the pending record table output
#[derive(Debug, Clone, Tabled)]
pub struct PendingRow {
    #[tabled(rename = "Id")]
    pub id: String,

    #[tabled(rename = "Date")]
    pub date: String,

    #[tabled(rename = "Type")]
    pub detected_type: String,

    #[tabled(rename = "BTC")]
    pub btc_amount: String,

    #[tabled(rename = "USD")]
    pub usd_amount: String,

    #[tabled(rename = "Suggested")]
    pub suggested: String,

    #[tabled(rename = "Confidence")]
    pub confidence: String,

    #[tabled(rename = "Reason")]
    pub reason: String,
}

impl From<&PendingRecord> for PendingRow {
    fn from(entry: &PendingRecord) -> Self {
        PendingRow {
            id: entry.record.id.clone(),
            date: entry.record.date.format("%Y-%m-%d %H:%M").to_string(),
            detected_type: entry.record.detected_type.clone(),
            btc_amount: format_quantity(entry.record.btc_amount),
            usd_amount: format_usd(entry.record.usd_amount),
            suggested: entry.suggestion.category.label().to_string(),
            confidence: format!("{:.2}", entry.suggestion.confidence),
            reason: entry.suggestion.reason.clone(),
        }
    }
}

fn format_quantity(qty: Decimal) -> String {
    let s = format!("{:.8}", qty);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

fn format_usd(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

//! Schema command - print expected input formats

use crate::decision::DecisionInput;
use crate::record::{RecordInput, RecordRow};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: records-json, decisions-json, csv-header or csv-fields
    #[arg(value_enum, default_value = "records-json")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the records input
    RecordsJson,
    /// JSON Schema for the decisions input
    DecisionsJson,
    /// CSV header row with column names
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::RecordsJson => self.print_records_schema(),
            SchemaFormat::DecisionsJson => self.print_decisions_schema(),
            SchemaFormat::CsvHeader => self.print_csv_header(),
            SchemaFormat::CsvFields => self.print_csv_fields(),
        }
    }

    fn print_records_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(RecordInput);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_decisions_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(DecisionInput);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_csv_header(&self) -> anyhow::Result<()> {
        let names: Vec<&str> = RecordRow::csv_schema().iter().map(|f| f.name).collect();
        println!("{}", names.join(","));
        Ok(())
    }

    fn print_csv_fields(&self) -> anyhow::Result<()> {
        println!("CSV Input Format");
        println!("================");
        println!();
        for field in RecordRow::csv_schema() {
            let req = if field.required { "required" } else { "optional" };
            println!("{:20} ({:8})  {}", field.name, req, field.description);
        }
        println!();
        println!("Sign convention: btc_amount is negative for outgoing coins");
        Ok(())
    }
}

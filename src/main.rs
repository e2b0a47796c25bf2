use clap::{Parser, Subcommand};

mod apply;
mod category;
mod classify;
mod cmd;
mod decision;
mod engine;
mod identity;
mod record;
mod review;
mod transaction;
mod validate;

#[derive(Parser, Debug)]
#[command(name = "satsort", version, about = "Sort Bitcoin exchange records into tax-ready transactions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify raw records and apply review decisions
    Classify(cmd::classify::ClassifyCommand),
    /// Show records needing review, grouped for bulk decisions
    Review(cmd::review::ReviewCommand),
    /// Print expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Classify(cmd) => cmd.exec(),
        Commands::Review(cmd) => cmd.exec(),
        Commands::Schema(cmd) => cmd.exec(),
    }
}

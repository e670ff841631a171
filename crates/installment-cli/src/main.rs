mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::financing::FinancingArgs;

/// Cash or installments?
#[derive(Parser)]
#[command(
    name = "cuotas",
    version,
    about = "Compare paying cash with paying in installments",
    long_about = "Compares an upfront cash price with an installment plan, discounting \
                  every installment by monthly inflation. Optionally simulates investing \
                  the cash price and paying the installments out of the returns."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Full cash vs installments analysis with recommendation
    Compare(FinancingArgs),
    /// Nominal and inflation-adjusted installment schedule
    Schedule(FinancingArgs),
    /// Invest the cash price and pay installments from the balance
    Invest(FinancingArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
    Report,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Compare(args) => commands::financing::run_compare(args),
        Commands::Schedule(args) => commands::financing::run_schedule(args),
        Commands::Invest(args) => commands::financing::run_invest(args),
        Commands::Version => {
            println!("cuotas {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

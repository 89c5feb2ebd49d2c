//! Kharcha CLI - Transaction categorization and spending insights
//!
//! Usage:
//!   kharcha categorize --input tx.csv --output out.json   Categorize and learn
//!   kharcha report --input out.json                       Full spending report
//!   kharcha parse-sms --file alerts.txt                   Alerts to transactions
//!   kharcha teach "Blue Tokai" Food                       Pin a merchant

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use commands::Options;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let opts = Options {
        memory: cli.memory,
        rules: cli.rules,
        config: cli.config,
        json: cli.json,
    };

    match cli.command {
        Commands::Classify {
            text,
            merchant,
            amount,
        } => commands::cmd_classify(&opts, &text, merchant.as_deref(), amount),
        Commands::Categorize { input, output } => {
            commands::cmd_categorize(&opts, &input, output.as_deref())
        }
        Commands::Teach { merchant, category } => commands::cmd_teach(&opts, &merchant, &category),
        Commands::Memory { action } => match action {
            None | Some(MemoryAction::Stats) => commands::cmd_memory_stats(&opts),
            Some(MemoryAction::Show { limit }) => commands::cmd_memory_show(&opts, limit),
            Some(MemoryAction::Reset) => commands::cmd_memory_reset(&opts),
        },
        Commands::Anomalies { input } => commands::cmd_anomalies(&opts, &input),
        Commands::Analyze { input, window_days } => {
            commands::cmd_analyze(&opts, &input, window_days)
        }
        Commands::Recommend {
            input,
            limit,
            window_days,
        } => commands::cmd_recommend(&opts, &input, limit, window_days),
        Commands::Report { input, window_days } => {
            commands::cmd_report(&opts, &input, window_days)
        }
        Commands::Budgets { input } => commands::cmd_budgets(&opts, &input),
        Commands::ParseSms { file, output } => {
            commands::cmd_parse_sms(&opts, &file, output.as_deref())
        }
        Commands::Rules => commands::cmd_rules(&opts),
    }
}

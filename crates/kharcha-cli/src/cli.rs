//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Kharcha - Categorize bank and UPI transactions and explain your spending
#[derive(Parser)]
#[command(name = "kharcha")]
#[command(about = "Transaction categorization and spending insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Merchant memory snapshot (default: ~/.local/share/kharcha/memory.json)
    #[arg(long, global = true)]
    pub memory: Option<PathBuf>,

    /// Category rule set TOML (default: data dir override, then built-in rules)
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Analysis thresholds TOML (default: data dir override, then built-in values)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score a piece of text against the category rules
    Classify {
        /// Description text to classify
        text: String,

        /// Merchant name
        #[arg(short, long)]
        merchant: Option<String>,

        /// Transaction amount (enables amount range bonuses)
        #[arg(short, long, default_value = "0")]
        amount: f64,
    },

    /// Categorize a transaction file using merchant memory, then rules
    ///
    /// Updates and saves the merchant memory snapshot.
    Categorize {
        /// Transactions (.json or .csv)
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write categorized transactions (.json or .csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Pin a merchant to a category
    Teach {
        /// Merchant name
        merchant: String,

        /// Category: Food, Transport, Shopping, Entertainment, Bills, Transfer, Other
        category: String,
    },

    /// Inspect or reset the merchant memory
    Memory {
        #[command(subcommand)]
        action: Option<MemoryAction>,
    },

    /// Detect unusual spending and unusually frequent merchants
    Anomalies {
        /// Categorized transactions (.json or .csv)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Analyze spending trends, concentration and habits
    Analyze {
        /// Categorized transactions (.json or .csv)
        #[arg(short, long)]
        input: PathBuf,

        /// Days of history to analyze, counted back from the latest transaction (0 = all)
        #[arg(short, long, default_value = "90")]
        window_days: u32,
    },

    /// Suggest ways to save, most important first
    Recommend {
        /// Categorized transactions (.json or .csv)
        #[arg(short, long)]
        input: PathBuf,

        /// Maximum recommendations (clamped to 4-8; default from config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Days of history to consider (0 = all)
        #[arg(short, long, default_value = "90")]
        window_days: u32,
    },

    /// Full report: anomalies, patterns, cash flow, recommendations and risk score
    Report {
        /// Categorized transactions (.json or .csv)
        #[arg(short, long)]
        input: PathBuf,

        /// Days of history to analyze (0 = all)
        #[arg(short, long, default_value = "90")]
        window_days: u32,
    },

    /// Suggest monthly budgets and check the latest month against them
    Budgets {
        /// Categorized transactions (.json or .csv)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Convert bank/UPI alert texts (one per line) into transactions
    ParseSms {
        /// Text file with one alert per line
        #[arg(short, long)]
        file: PathBuf,

        /// Where to write the transactions (.json or .csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the active category rules
    Rules,
}

#[derive(Subcommand)]
pub enum MemoryAction {
    /// Show learning statistics
    Stats,

    /// List remembered merchants
    Show {
        /// Maximum entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Forget every merchant
    Reset,
}

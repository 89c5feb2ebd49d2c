//! Alert parsing command

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use kharcha_core::sms::SmsParser;

use super::core::{load_matcher, print_json, save_transactions, Options};
use super::{rupees, truncate};

/// Parse alerts and categorize them with the rule set
///
/// Alerts without a date are stamped with today's date. Merchant memory is
/// left untouched; run `categorize` on the output to learn from it.
pub fn cmd_parse_sms(opts: &Options, file: &Path, output: Option<&Path>) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read alerts from {}", file.display()))?;

    let parser = SmsParser::new()?;
    let mut batch = parser.parse_batch(&content, Utc::now());

    let matcher = load_matcher(opts)?;
    for tx in &mut batch.transactions {
        tx.category = matcher.classify(&tx.description, tx.merchant.as_deref(), tx.amount);
    }

    if let Some(output) = output {
        save_transactions(output, &batch.transactions)?;
    }

    if opts.json {
        return print_json(&batch.transactions);
    }

    println!();
    println!(
        "   {:<12} {:<30} {:>10}  {:<7} {:<10} {}",
        "Date", "Description", "Amount", "Type", "Method", "Category"
    );
    println!("   ────────────────────────────────────────────────────────────────────────────");
    for tx in &batch.transactions {
        println!(
            "   {:<12} {:<30} {:>10}  {:<7} {:<10} {}",
            tx.date.format("%Y-%m-%d"),
            truncate(&tx.description, 30),
            rupees(tx.amount),
            tx.direction.as_str(),
            tx.method.as_str(),
            tx.category
        );
    }

    println!();
    println!(
        "✅ Parsed {} alerts ({} skipped)",
        batch.transactions.len(),
        batch.skipped
    );
    if let Some(output) = output {
        println!("   Wrote {}", output.display());
    }

    Ok(())
}

//! Merchant memory commands

use anyhow::Result;

use super::core::{open_memory, print_json, save_memory, Options};
use super::truncate;

pub fn cmd_memory_stats(opts: &Options) -> Result<()> {
    let (memory, path) = open_memory(opts)?;
    let stats = memory.stats();

    if opts.json {
        return print_json(&stats);
    }

    println!();
    println!("🧠 Merchant Memory ({})", path.display());
    println!("   ─────────────────────────────");
    println!("   Merchants:          {}", stats.total_merchants);
    println!("   Trusted:            {}", stats.trusted_merchants);
    println!("   Average confidence: {:.2}", stats.average_confidence);

    if !stats.category_distribution.is_empty() {
        println!();
        for (category, count) in &stats.category_distribution {
            println!("   {:<14} {}", category.as_str(), count);
        }
    }

    Ok(())
}

pub fn cmd_memory_show(opts: &Options, limit: usize) -> Result<()> {
    let (memory, _) = open_memory(opts)?;
    let entries: Vec<_> = memory.entries().into_iter().take(limit).collect();

    if opts.json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No merchants learned yet. Run 'kharcha categorize' or 'kharcha teach'.");
        return Ok(());
    }

    println!();
    println!(
        "   {:<30} {:<14} {:>10} {:>6}  {}",
        "Merchant", "Category", "Confidence", "Seen", "Trusted"
    );
    println!("   ───────────────────────────────────────────────────────────────────────");
    for entry in &entries {
        println!(
            "   {:<30} {:<14} {:>10.2} {:>6}  {}",
            truncate(&entry.merchant_key, 30),
            entry.category.as_str(),
            entry.confidence,
            entry.frequency,
            if entry.is_trusted() { "yes" } else { "no" }
        );
    }

    if memory.len() > entries.len() {
        println!();
        println!("   ... and {} more", memory.len() - entries.len());
    }

    Ok(())
}

pub fn cmd_memory_reset(opts: &Options) -> Result<()> {
    let (memory, path) = open_memory(opts)?;
    let removed = memory.reset();
    save_memory(&memory, &path)?;

    println!("🗑️  Forgot {} merchants", removed);
    Ok(())
}

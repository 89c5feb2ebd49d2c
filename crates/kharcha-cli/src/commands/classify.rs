//! Classification, categorization and teaching commands

use std::path::Path;

use anyhow::{anyhow, Result};
use kharcha_core::categorizer::{CategorizeCounts, Categorizer};
use kharcha_core::classify::RuleScore;
use kharcha_core::models::{Category, Transaction};
use serde::Serialize;

use super::core::{
    load_matcher, open_memory, print_json, read_transactions, save_memory, save_transactions,
    Options,
};
use super::{rupees, truncate};

#[derive(Serialize)]
struct ClassifyOutput {
    category: Category,
    matched: bool,
    scores: Vec<RuleScore>,
}

#[derive(Serialize)]
struct CategorizeOutput<'a> {
    counts: &'a CategorizeCounts,
    transactions: &'a [Transaction],
}

pub fn cmd_classify(opts: &Options, text: &str, merchant: Option<&str>, amount: f64) -> Result<()> {
    let matcher = load_matcher(opts)?;

    let best = matcher.best_match(text, merchant, amount);
    let category = best.as_ref().map(|b| b.category).unwrap_or(Category::Other);

    let mut scores = matcher.scores(text, merchant, amount);
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));

    if opts.json {
        return print_json(&ClassifyOutput {
            category,
            matched: best.is_some(),
            scores,
        });
    }

    println!();
    match &best {
        Some(best) => println!("🏷️  {} (score {:.3})", category, best.score),
        None => println!("🏷️  {} (no rule matched)", category),
    }
    println!();
    println!(
        "   {:<14} {:>7} {:>9} {:>9} {:>9} {:>9} {:>7}",
        "Category", "Score", "Keywords", "Patterns", "Merchant", "Context", "Amount"
    );
    println!("   ─────────────────────────────────────────────────────────────────────");
    for s in &scores {
        println!(
            "   {:<14} {:>7.3} {:>9.3} {:>9.3} {:>9.3} {:>9.3} {:>7.2}",
            s.category.as_str(),
            s.score,
            s.keyword_share,
            s.pattern_share,
            s.merchant_pattern_share,
            s.context_share,
            s.amount_bonus
        );
    }

    Ok(())
}

pub fn cmd_categorize(opts: &Options, input: &Path, output: Option<&Path>) -> Result<()> {
    let matcher = load_matcher(opts)?;
    let (memory, memory_path) = open_memory(opts)?;
    let mut transactions = read_transactions(input)?;

    let counts = Categorizer::new(&matcher, &memory).categorize_all(&mut transactions);
    save_memory(&memory, &memory_path)?;

    if let Some(output) = output {
        save_transactions(output, &transactions)?;
    }

    if opts.json {
        return print_json(&CategorizeOutput {
            counts: &counts,
            transactions: &transactions,
        });
    }

    if output.is_none() {
        println!();
        println!(
            "   {:<12} {:<32} {:>10}  {}",
            "Date", "Description", "Amount", "Category"
        );
        println!("   ─────────────────────────────────────────────────────────────────");
        for tx in &transactions {
            println!(
                "   {:<12} {:<32} {:>10}  {}",
                tx.date.format("%Y-%m-%d"),
                truncate(&tx.description, 32),
                rupees(tx.amount),
                tx.category
            );
        }
    }

    println!();
    println!("✅ Categorized {} transactions", counts.total);
    println!("   From merchant memory: {}", counts.by_learned);
    println!("   From rules:           {}", counts.by_rules);
    println!("   Fell back to Other:   {}", counts.fallback_to_other);
    if let Some(output) = output {
        println!("   Wrote {}", output.display());
    }
    println!("   Memory: {} merchants ({})", memory.len(), memory_path.display());

    Ok(())
}

pub fn cmd_teach(opts: &Options, merchant: &str, category: &str) -> Result<()> {
    let category: Category = category.parse().map_err(|e: String| anyhow!(e))?;
    let (memory, memory_path) = open_memory(opts)?;

    let entry = memory.teach(merchant, category)?;
    save_memory(&memory, &memory_path)?;

    if opts.json {
        return print_json(&entry);
    }

    println!("✅ '{}' will now be categorized as {}", entry.merchant_key, entry.category);
    Ok(())
}

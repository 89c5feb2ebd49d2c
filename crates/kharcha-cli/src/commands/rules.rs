//! Rule set listing

use anyhow::Result;
use serde::Serialize;

use super::core::{load_rules, print_json, Options};

#[derive(Serialize)]
struct RuleSummary {
    category: String,
    weight: f64,
    keywords: Vec<String>,
    patterns: Vec<String>,
    merchant_patterns: Vec<String>,
    context_keywords: Vec<String>,
    amount_range: Option<(f64, f64, f64)>,
}

pub fn cmd_rules(opts: &Options) -> Result<()> {
    let rules = load_rules(opts)?;

    if opts.json {
        let summaries: Vec<RuleSummary> = rules
            .rules()
            .iter()
            .map(|r| RuleSummary {
                category: r.category.to_string(),
                weight: r.weight,
                keywords: r.keywords.clone(),
                patterns: r.patterns.iter().map(|p| p.as_str().to_string()).collect(),
                merchant_patterns: r
                    .merchant_patterns
                    .iter()
                    .map(|p| p.as_str().to_string())
                    .collect(),
                context_keywords: r.context_keywords.clone(),
                amount_range: r.amount_range.map(|a| (a.min, a.max, a.bonus)),
            })
            .collect();
        return print_json(&summaries);
    }

    println!();
    println!("📋 Category Rules ({})", rules.source());
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:<14} {:>6} {:>9} {:>9} {:>9} {:>8}  {}",
        "Category", "Weight", "Keywords", "Patterns", "Merchant", "Context", "Amount range"
    );
    for rule in rules.rules() {
        let range = rule
            .amount_range
            .map(|a| format!("₹{:.0}-₹{:.0} (+{:.2})", a.min, a.max, a.bonus))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:<14} {:>6.2} {:>9} {:>9} {:>9} {:>8}  {}",
            rule.category.as_str(),
            rule.weight,
            rule.keywords.len(),
            rule.patterns.len(),
            rule.merchant_patterns.len(),
            rule.context_keywords.len(),
            range
        );
    }

    Ok(())
}

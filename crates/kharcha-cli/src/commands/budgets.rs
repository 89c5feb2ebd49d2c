//! Budget suggestion command

use std::path::Path;

use anyhow::Result;
use kharcha_core::budget::{
    latest_month_spending, BudgetAlert, BudgetAlertLevel, BudgetPlanner, BudgetSuggestion,
};
use kharcha_core::patterns::SpendingAnalyzer;
use serde::Serialize;

use super::core::{load_analysis_config, print_json, read_transactions, Options};
use super::rupees;

#[derive(Serialize)]
struct BudgetOutput {
    suggestions: Vec<BudgetSuggestion>,
    alerts: Vec<BudgetAlert>,
}

pub fn cmd_budgets(opts: &Options, input: &Path) -> Result<()> {
    let config = load_analysis_config(opts)?;
    let transactions = read_transactions(input)?;

    let analysis = SpendingAnalyzer::with_config(config.patterns).analyze(&transactions, 0);
    let planner = BudgetPlanner::with_config(config.budgets);
    let suggestions = planner.suggest(&transactions, &analysis);
    let alerts = planner.check(&suggestions, &latest_month_spending(&transactions));

    if opts.json {
        return print_json(&BudgetOutput {
            suggestions,
            alerts,
        });
    }

    println!();
    if suggestions.is_empty() {
        println!("Not enough spending history to suggest budgets.");
        return Ok(());
    }

    println!("🎯 Suggested Monthly Budgets");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:<14} {:>10} {:>10} {:>6} {:>6}",
        "Category", "Budget", "Current", "Alert", "Conf"
    );
    for s in &suggestions {
        println!(
            "   {:<14} {:>10} {:>10} {:>5.0}% {:>5.0}%",
            s.category.as_str(),
            rupees(s.suggested_budget),
            rupees(s.current_monthly_spending),
            s.alert_threshold,
            s.confidence * 100.0
        );
        println!("      {}", s.reasoning);
    }

    if !alerts.is_empty() {
        println!();
        println!("🚨 This Month");
        for alert in &alerts {
            let icon = match alert.level {
                BudgetAlertLevel::Exceeded => "🔴",
                BudgetAlertLevel::Warning => "🟠",
                BudgetAlertLevel::Approaching => "🟡",
            };
            println!("   {} {}", icon, alert.message);
        }
    }

    Ok(())
}

//! Anomaly, analysis, recommendation and report commands

use std::path::Path;

use anyhow::Result;
use kharcha_core::detect::{Anomaly, AnomalyDetector, Severity};
use kharcha_core::insights::{Priority, Recommendation};
use kharcha_core::patterns::{SpendingAnalysis, SpendingAnalyzer, SpendingHabits};
use kharcha_core::report::ReportBuilder;
use kharcha_core::stats::CashFlowSummary;

use super::core::{load_analysis_config, print_json, read_transactions, Options};
use super::{rupees, truncate};

pub fn cmd_anomalies(opts: &Options, input: &Path) -> Result<()> {
    let config = load_analysis_config(opts)?;
    let transactions = read_transactions(input)?;

    let anomalies = AnomalyDetector::with_config(config.detection).detect(&transactions);

    if opts.json {
        return print_json(&anomalies);
    }

    print_anomalies(&anomalies);
    Ok(())
}

pub fn cmd_analyze(opts: &Options, input: &Path, window_days: u32) -> Result<()> {
    let config = load_analysis_config(opts)?;
    let transactions = read_transactions(input)?;

    let analysis = SpendingAnalyzer::with_config(config.patterns).analyze(&transactions, window_days);

    if opts.json {
        return print_json(&analysis);
    }

    print_analysis(&analysis);
    Ok(())
}

pub fn cmd_recommend(
    opts: &Options,
    input: &Path,
    limit: Option<usize>,
    window_days: u32,
) -> Result<()> {
    let config = load_analysis_config(opts)?;
    let transactions = read_transactions(input)?;

    let report = ReportBuilder::new(config).build(&transactions, window_days, limit);

    if opts.json {
        return print_json(&report.recommendations);
    }

    print_recommendations(&report.recommendations);
    if report.savings_opportunity > 0.0 {
        println!();
        println!(
            "💰 Potential savings: {}",
            rupees(report.savings_opportunity)
        );
    }
    Ok(())
}

pub fn cmd_report(opts: &Options, input: &Path, window_days: u32) -> Result<()> {
    let config = load_analysis_config(opts)?;
    let transactions = read_transactions(input)?;

    let report = ReportBuilder::new(config).build(&transactions, window_days, None);

    if opts.json {
        return print_json(&report);
    }

    println!();
    println!("📊 Kharcha Report");
    println!("   ─────────────────────────────");
    match (report.window_start, report.window_end) {
        (Some(start), Some(end)) => println!(
            "   Period: {} to {}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        ),
        _ => println!("   Period: no transactions"),
    }
    println!("   Risk score: {}/100", report.risk_score);
    println!(
        "   Savings opportunity: {}",
        rupees(report.savings_opportunity)
    );

    print_cash_flow(&report.cash_flow);
    print_analysis(&report.analysis);
    print_anomalies(&report.anomalies);
    print_recommendations(&report.recommendations);

    Ok(())
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "🔴",
        Severity::Medium => "🟠",
        Severity::Low => "🟡",
    }
}

fn priority_icon(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "🔴",
        Priority::Medium => "🟠",
        Priority::Low => "🟢",
    }
}

fn print_anomalies(anomalies: &[Anomaly]) {
    println!();
    if anomalies.is_empty() {
        println!("✅ No anomalies detected.");
        return;
    }

    println!("⚠️  {} anomalies", anomalies.len());
    println!("   ─────────────────────────────────────────────────────────────");
    for anomaly in anomalies {
        println!(
            "   {} [{}] {} (confidence {:.0}%)",
            severity_icon(anomaly.severity),
            anomaly.severity,
            anomaly.description,
            anomaly.confidence * 100.0
        );
        println!("      → {}", anomaly.recommendation);
    }
}

fn print_cash_flow(cash_flow: &CashFlowSummary) {
    println!();
    println!("💵 Cash Flow");
    println!("   ─────────────────────────────");
    println!("   Income:   {}", rupees(cash_flow.total_income));
    println!("   Spending: {}", rupees(cash_flow.total_spending));
    match cash_flow.savings_rate {
        Some(rate) => println!("   Savings rate: {:.1}%", rate * 100.0),
        None => println!("   Savings rate: n/a (no income in period)"),
    }
    if cash_flow.subscription_charges > 0 {
        println!("   Subscription charges: {}", cash_flow.subscription_charges);
    }
}

fn print_analysis(analysis: &SpendingAnalysis) {
    println!();
    println!(
        "📈 Spending Patterns ({} debits, {})",
        analysis.debit_count,
        rupees(analysis.total_spending)
    );
    println!("   ─────────────────────────────────────────────────────────────");

    if analysis.concentration.is_empty() {
        println!("   No spending in this period.");
        return;
    }

    println!(
        "   {:<14} {:>10} {:>7}  {:<11} {:>10}",
        "Category", "Total", "Share", "Trend", "Next"
    );
    for c in &analysis.concentration {
        let trend = analysis
            .trend_for(c.category)
            .map(|t| t.as_str())
            .unwrap_or("-");
        let next = analysis
            .predictions
            .iter()
            .find(|p| p.category == c.category)
            .map(|p| rupees(p.predicted_amount))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:<14} {:>10} {:>6.1}%  {:<11} {:>10}",
            c.category.as_str(),
            rupees(c.total),
            c.percent,
            trend,
            next
        );
    }

    let skew = &analysis.weekend_skew;
    println!();
    println!(
        "   Weekend: {}  Weekday: {}{}",
        rupees(skew.weekend_total),
        rupees(skew.weekday_total),
        if skew.high { "  (weekend-heavy)" } else { "" }
    );

    if let Some(top) = &analysis.top_merchant {
        println!(
            "   Top merchant: {} ({} payments, {})",
            truncate(&top.merchant, 30),
            top.count,
            rupees(top.total)
        );
    }

    if let Some(change) = &analysis.monthly_change {
        println!(
            "   {} vs {}: {:+.1}%{}",
            change.current_month,
            change.previous_month,
            change.change_percent,
            if change.significant { " (significant)" } else { "" }
        );
    }

    if let Some(habits) = &analysis.habits {
        print_habits(habits);
    }
}

fn print_habits(habits: &SpendingHabits) {
    println!();
    println!("🕒 Spending Habits");
    println!("   ─────────────────────────────");
    println!("   Peak day:  {} around {:02}:00 UTC", habits.peak_day, habits.peak_hour);
    println!("   Average payment: {}", rupees(habits.average_transaction));
    println!("   Most frequent: {}", habits.most_frequent_category);
    println!("   Pattern: {}", habits.consistency);
}

fn print_recommendations(recommendations: &[Recommendation]) {
    println!();
    if recommendations.is_empty() {
        println!("✅ No recommendations. Your spending looks balanced!");
        return;
    }

    println!("💡 Recommendations");
    println!("   ─────────────────────────────────────────────────────────────");
    for rec in recommendations {
        let savings = rec
            .potential_savings
            .map(|s| format!(" (save ~{})", rupees(s)))
            .unwrap_or_default();
        println!("   {} {}{}", priority_icon(rec.priority), rec.title, savings);
        println!("      {}", rec.description);
    }
}
